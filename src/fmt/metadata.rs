/*!
Parsing of metadata strings, typestrings and metadata records.

The canonical metadata grammar is a bracketed unit with an optional
multiplier and an optional divisor:

```text
metadata := "" | "[" extended "]"
extended := [ multiplier ] unit [ "/" divisor ]
unit     := "Y" | "M" | "W" | "B" | "D" | "h" | "m" | "s"
          | "ms" | "us" | "ns" | "ps" | "fs" | "as"
```

The multiplier and divisor are unsigned decimal integers of at least `1`. An
empty string means generic units. A divisor is folded into the multiplier of
a finer unit with [`Metadata::divisor_to_multiple`], so `[D/24]` is the same
as `[h]`.

A typestring is a tag followed directly by a metadata string. The tags `M8`
and `datetime64` name instants, while `m8` and `timedelta64` name durations.

# Example

```
use scaledtime::{Kind, Metadata, TemporalType, Unit};

let meta: Metadata = "[10us/4]".parse()?;
assert_eq!(meta.to_string(), "[2500ns]");

let ty: TemporalType = "m8[15m]".parse()?;
assert_eq!(ty.kind(), Kind::Timedelta);
assert_eq!(ty.meta(), Metadata::new(Unit::Minute, 15)?);

# Ok::<(), Box<dyn std::error::Error>>(())
```
*/

use crate::{
    error::{fmt::metadata::Error as E, Error, ErrorContext},
    host::Value,
    util::parse,
    Kind, Metadata, TemporalType, Unit,
};

impl core::str::FromStr for Metadata {
    type Err = Error;

    fn from_str(s: &str) -> Result<Metadata, Error> {
        parse_bracketed(s.as_bytes())
    }
}

impl core::str::FromStr for TemporalType {
    type Err = Error;

    fn from_str(s: &str) -> Result<TemporalType, Error> {
        parse_typestr(s.as_bytes())
    }
}

impl Metadata {
    /// Converts an external value into metadata.
    ///
    /// Text starting with `[` is parsed as a bracketed metadata string.
    /// Other text is parsed in the bare form, like `5ms` or `us/4`. Records
    /// are handled by [`Metadata::from_record`].
    ///
    /// # Errors
    ///
    /// This returns a type error for values that are neither text nor a
    /// record, and a parse error for malformed text.
    ///
    /// # Example
    ///
    /// ```
    /// use scaledtime::{host::Value, Metadata};
    ///
    /// let meta = Metadata::from_value(Value::Text(b"25ms"))?;
    /// assert_eq!(meta.to_string(), "[25ms]");
    /// let meta = Metadata::from_value(Value::Text(b"[25ms]"))?;
    /// assert_eq!(meta.to_string(), "[25ms]");
    ///
    /// let record = [Value::Text(b"s"), Value::Integer(30)];
    /// let meta = Metadata::from_value(Value::Record(&record))?;
    /// assert_eq!(meta.to_string(), "[30s]");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_value(value: Value<'_>) -> Result<Metadata, Error> {
        match value {
            Value::Record(fields) => Metadata::from_record(fields),
            Value::Text(text) if text.first() == Some(&b'[') => {
                parse_bracketed(text)
            }
            Value::Text(text) => parse_extended(text),
            _ => Err(E::ExpectedTextOrRecord.into()),
        }
    }

    /// Converts a record of 2 to 4 fields into metadata.
    ///
    /// The first field is a unit code, the second is the multiplier and the
    /// optional third is a divisor. A fourth field is permitted and ignored.
    /// The multiplier and divisor must both be positive.
    ///
    /// # Example
    ///
    /// ```
    /// use scaledtime::{host::Value, Metadata};
    ///
    /// let record = [Value::Text(b"D"), Value::Integer(1), Value::Integer(4)];
    /// assert_eq!(Metadata::from_record(&record)?.to_string(), "[6h]");
    ///
    /// let record = [Value::Text(b"D"), Value::Integer(0)];
    /// assert!(Metadata::from_record(&record).unwrap_err().is_type());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_record(fields: &[Value<'_>]) -> Result<Metadata, Error> {
        if !(2..=4).contains(&fields.len()) {
            return Err(E::RecordSize { len: fields.len() }.into());
        }
        let Value::Text(code) = fields[0] else {
            return Err(E::RecordUnit.into());
        };
        let unit = if code == b"generic" {
            Unit::Generic
        } else {
            Unit::from_code(code).ok_or_else(|| E::UnknownUnit {
                unit: code.into(),
                text: None,
            })?
        };
        let integer = |index: usize| match fields[index] {
            Value::Integer(n) => Ok(n),
            _ => Err(E::RecordInteger { index }),
        };
        let multiplier = integer(1)?;
        let den = if fields.len() >= 3 { integer(2)? } else { 1 };
        let (Ok(multiplier), Ok(den)) =
            (i32::try_from(multiplier), i32::try_from(den))
        else {
            return Err(E::RecordValues { multiplier, den }.into());
        };
        if multiplier < 1 || den < 1 {
            return Err(E::RecordValues {
                multiplier: i64::from(multiplier),
                den: i64::from(den),
            }
            .into());
        }
        Metadata::new(unit, multiplier)?.divisor_to_multiple(den)
    }

    /// Converts this metadata into a record of its unit code and multiplier.
    ///
    /// Generic metadata uses the code `generic` with a multiplier of `1`.
    /// The record is always accepted by [`Metadata::from_record`], which
    /// gives back the same metadata.
    ///
    /// # Example
    ///
    /// ```
    /// use scaledtime::{host::Value, Metadata};
    ///
    /// let meta: Metadata = "[25ms]".parse()?;
    /// let record = meta.to_record();
    /// assert!(matches!(record, [Value::Text(b"ms"), Value::Integer(25)]));
    /// assert_eq!(Metadata::from_record(&record)?, meta);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn to_record(self) -> [Value<'static>; 2] {
        [
            Value::Text(self.unit().code().as_bytes()),
            Value::Integer(i64::from(self.multiplier())),
        ]
    }
}

/// Parses a bracketed metadata string, like `[5ms]`, or the empty string.
pub(crate) fn parse_bracketed(text: &[u8]) -> Result<Metadata, Error> {
    if text.is_empty() {
        return Ok(Metadata::GENERIC);
    }
    if text.len() < 3 || text[0] != b'[' {
        return Err(E::invalid_at(text, 0).into());
    }
    let Some(close) = text.iter().position(|&b| b == b']') else {
        return Err(E::invalid_at(text, text.len()).into());
    };
    if close == 1 {
        return Err(E::invalid_at(text, close).into());
    }
    let meta = MetadataParser { text }.parse_extended(1, close)?;
    if close + 1 != text.len() {
        return Err(E::invalid_at(text, close + 1).into());
    }
    Ok(meta)
}

/// Parses an unbracketed metadata string, like `5ms` or `us/4`.
pub(crate) fn parse_extended(text: &[u8]) -> Result<Metadata, Error> {
    MetadataParser { text }.parse_extended(0, text.len())
}

/// Parses a typestring, like `M8[5ms]` or `timedelta64`.
pub(crate) fn parse_typestr(text: &[u8]) -> Result<TemporalType, Error> {
    let invalid = || Error::from(E::InvalidTypestr { text: text.into() });
    if text.len() < 2 {
        return Err(invalid());
    }
    let (kind, rest) = if let Some(rest) = text.strip_prefix(b"m8") {
        (Kind::Timedelta, rest)
    } else if let Some(rest) = text.strip_prefix(b"M8") {
        (Kind::Datetime, rest)
    } else if let Some(rest) = text.strip_prefix(b"timedelta64") {
        (Kind::Timedelta, rest)
    } else if let Some(rest) = text.strip_prefix(b"datetime64") {
        (Kind::Datetime, rest)
    } else {
        return Err(invalid());
    };
    let meta = parse_bracketed(rest)
        .with_context(|| E::InvalidTypestr { text: text.into() })?;
    Ok(TemporalType::new(kind, meta))
}

/// A parser for the extended unit grammar that reports positions relative
/// to the full text given.
struct MetadataParser<'i> {
    text: &'i [u8],
}

impl<'i> MetadataParser<'i> {
    /// Parses `[multiplier] unit [/divisor]` from `text[start..end]`.
    ///
    /// The divisor, if present, must run to `end`.
    #[cfg_attr(feature = "perf-inline", inline(always))]
    fn parse_extended(
        &self,
        start: usize,
        end: usize,
    ) -> Result<Metadata, Error> {
        let input = &self.text[start..end];

        let ndigits = parse::digits_len(input);
        let multiplier = if ndigits == 0 {
            1
        } else {
            self.positive(&input[..ndigits])
                .ok_or_else(|| self.invalid_at(start))?
        };

        let unit_start = ndigits;
        let unit_end = input[unit_start..]
            .iter()
            .position(|&b| b == b'/')
            .map_or(input.len(), |i| unit_start + i);
        if unit_start == unit_end {
            return Err(self.invalid_at(start + unit_start));
        }
        let code = &input[unit_start..unit_end];
        let unit = Unit::from_code(code).ok_or_else(|| E::UnknownUnit {
            unit: code.into(),
            text: Some(self.text.into()),
        })?;
        let meta = Metadata::new(unit, multiplier)?;
        if unit_end == input.len() {
            return Ok(meta);
        }

        let den_start = unit_end + 1;
        let den = &input[den_start..];
        if den.is_empty() || parse::digits_len(den) != den.len() {
            return Err(self.invalid_at(start + den_start));
        }
        let den = self
            .positive(den)
            .ok_or_else(|| self.invalid_at(start + den_start))?;
        meta.divisor_to_multiple_in(den, Some(self.text))
    }

    /// Parses a string of digits into a positive `i32`.
    fn positive(&self, digits: &[u8]) -> Option<i32> {
        let n = parse::i64(digits).ok()?;
        i32::try_from(n).ok().filter(|&n| n >= 1)
    }

    fn invalid_at(&self, pos: usize) -> Error {
        E::invalid_at(self.text, pos).into()
    }
}
