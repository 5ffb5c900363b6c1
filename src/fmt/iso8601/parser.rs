use crate::{
    cast::{self, Casting},
    civil::{self, DateTime},
    error::{fmt::iso8601::Error as E, Error, ErrorContext},
    fmt::Parsed,
    util::parse,
    Kind, Unit,
};

/// The result of parsing an ISO 8601 datetime.
///
/// This contains the calendar fields exactly as written, the UTC offset (if
/// one was written) and the finest unit present in the text.
///
/// # Example
///
/// ```
/// use scaledtime::{civil::DateTime, fmt::iso8601::DateTimeParser, Unit};
///
/// let parsed = DateTimeParser::new().parse("2011-03-15T10:30+05:30")?;
/// let expected = DateTime::date(2011, 3, 15).at(10, 30, 0, 0);
/// assert_eq!(parsed.datetime(), expected);
/// assert_eq!(parsed.offset(), Some(330));
/// assert_eq!(parsed.unit(), Unit::Minute);
/// assert_eq!(parsed.to_utc()?, DateTime::date(2011, 3, 15).at(5, 0, 0, 0));
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ParsedDateTime {
    datetime: DateTime,
    offset: Option<i32>,
    unit: Unit,
}

impl ParsedDateTime {
    const NAT: ParsedDateTime = ParsedDateTime {
        datetime: DateTime::NAT,
        offset: None,
        unit: Unit::Generic,
    };

    /// Returns the calendar fields as written, without applying any offset.
    #[inline]
    pub fn datetime(&self) -> DateTime {
        self.datetime
    }

    /// Returns the UTC offset in minutes, if one was written. `Z` is an
    /// offset of zero. Positive offsets are east of UTC.
    #[inline]
    pub fn offset(&self) -> Option<i32> {
        self.offset
    }

    /// Returns the finest unit present in the text. This is generic for
    /// NaT.
    #[inline]
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Returns true when the text was empty or `NaT`.
    #[inline]
    pub fn is_nat(&self) -> bool {
        self.datetime.is_nat()
    }

    /// Returns the parsed datetime in UTC, with the offset (if any)
    /// subtracted from it.
    ///
    /// # Errors
    ///
    /// This returns an error when applying the offset carries the year out
    /// of range.
    pub fn to_utc(&self) -> Result<DateTime, Error> {
        let mut dt = self.datetime;
        if let Some(offset) = self.offset {
            dt.add_minutes(-offset)?;
        }
        Ok(dt)
    }
}

/// A parser for ISO 8601 datetimes.
///
/// The accepted grammar is:
///
/// ```text
/// input    := ws* ( nat | datetime ) ws*
/// nat      := "" | "NaT" (case-insensitive)
/// datetime := year [ "-" month [ "-" day [ sep hour [ ":" minute
///             [ ":" second [ "." fraction ] ] ] [ zone ] ] ] ]
/// year     := [ "-" | "+" ] digit+
/// sep      := "T" | " "
/// fraction := digit{1,18}
/// zone     := "Z" | ( "+" | "-" ) digit digit [ [ ":" ] digit digit ]
/// ```
///
/// Every other field is exactly two digits. The parsed unit is the finest
/// field present, where 1 to 3 fraction digits mean milliseconds, 4 to 6
/// mean microseconds and so on down to attoseconds.
///
/// A unit ceiling may be set with [`DateTimeParser::unit`]. Then the parsed
/// unit must be castable to the ceiling under the parser's
/// [`Casting`] rule, using the rules for instants. This prevents silently
/// dropping precision under [`Casting::Safe`]. The ceiling is not applied to
/// NaT.
///
/// # Example
///
/// ```
/// use scaledtime::{cast::Casting, fmt::iso8601::DateTimeParser, Unit};
///
/// static PARSER: DateTimeParser = DateTimeParser::new()
///     .unit(Some(Unit::Second))
///     .casting(Casting::Safe);
///
/// assert_eq!(PARSER.parse("2011-03-15T10:30")?.unit(), Unit::Minute);
/// assert!(PARSER.parse("2011-03-15T10:30:45.5").unwrap_err().is_casting());
/// assert!(PARSER.parse("nat")?.is_nat());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct DateTimeParser {
    unit: Option<Unit>,
    casting: Casting,
}

impl DateTimeParser {
    /// Create a new parser with no unit ceiling and
    /// [`Casting::SameKind`].
    #[inline]
    pub const fn new() -> DateTimeParser {
        DateTimeParser { unit: None, casting: Casting::SameKind }
    }

    /// Set the unit ceiling. By default there is none.
    #[inline]
    pub const fn unit(self, unit: Option<Unit>) -> DateTimeParser {
        DateTimeParser { unit, ..self }
    }

    /// Set the casting rule used to check the parsed unit against the
    /// ceiling.
    #[inline]
    pub const fn casting(self, casting: Casting) -> DateTimeParser {
        DateTimeParser { casting, ..self }
    }

    /// Parse an ISO 8601 datetime from the given bytes.
    ///
    /// # Errors
    ///
    /// This returns a parse error for input that doesn't match the grammar,
    /// a value error for out of range fields and a casting error when the
    /// parsed unit violates the ceiling.
    pub fn parse<I: AsRef<[u8]>>(
        &self,
        input: I,
    ) -> Result<ParsedDateTime, Error> {
        let text = input.as_ref();
        self.parse_text(text).with_context(|| E::Failed { text: text.into() })
    }

    fn parse_text(&self, text: &[u8]) -> Result<ParsedDateTime, Error> {
        let lead = text.iter().take_while(|b| b.is_ascii_whitespace()).count();
        let trail = text[lead..]
            .iter()
            .rev()
            .take_while(|b| b.is_ascii_whitespace())
            .count();
        let input = &text[lead..text.len() - trail];
        if input.is_empty() || input.eq_ignore_ascii_case(b"nat") {
            return Ok(ParsedDateTime::NAT);
        }

        let Parsed { value: parsed, input: rest } =
            self.parse_datetime(input)?;
        if !rest.is_empty() {
            let pos = lead + (input.len() - rest.len());
            return Err(E::Trailing { pos }.into());
        }
        if let Some(ceiling) = self.unit {
            let ok = cast::can_cast_units(
                Kind::Datetime,
                parsed.unit,
                ceiling,
                self.casting,
            );
            if !ok {
                return Err(E::UnitCast {
                    unit: parsed.unit,
                    ceiling,
                    casting: self.casting,
                }
                .into());
            }
        }
        Ok(parsed)
    }

    // datetime := year [ "-" month [ "-" day [ sep time ] ] ]
    #[cfg_attr(feature = "perf-inline", inline(always))]
    fn parse_datetime<'i>(
        &self,
        input: &'i [u8],
    ) -> Result<Parsed<'i, ParsedDateTime>, Error> {
        let Parsed { value: year, input } = self.parse_year(input)?;
        let mut parsed = ParsedDateTime {
            datetime: DateTime::date(year, 1, 1),
            offset: None,
            unit: Unit::Year,
        };

        let Some(input) = input.strip_prefix(b"-") else {
            return Ok(Parsed { value: parsed, input });
        };
        let Parsed { value: month, input } =
            self.parse_field(input, "month", 1, 12)?;
        parsed.datetime.month = month;
        parsed.unit = Unit::Month;

        let Some(input) = input.strip_prefix(b"-") else {
            return Ok(Parsed { value: parsed, input });
        };
        let Parsed { value: day, input } = self.parse_day(input, year, month)?;
        parsed.datetime.day = day;
        parsed.unit = Unit::Day;

        let Some(input) =
            input.strip_prefix(b"T").or_else(|| input.strip_prefix(b" "))
        else {
            return Ok(Parsed { value: parsed, input });
        };
        let Parsed { value: unit, input } =
            self.parse_time(input, &mut parsed.datetime)?;
        parsed.unit = unit;

        let Parsed { value: offset, input } = self.parse_offset(input)?;
        parsed.offset = offset;
        Ok(Parsed { value: parsed, input })
    }

    // year := [ "-" | "+" ] digit+
    #[cfg_attr(feature = "perf-inline", inline(always))]
    fn parse_year<'i>(
        &self,
        input: &'i [u8],
    ) -> Result<Parsed<'i, i64>, Error> {
        let (negative, input) = match input.first() {
            Some(&b'-') => (true, &input[1..]),
            Some(&b'+') => (false, &input[1..]),
            _ => (false, input),
        };
        let ndigits = parse::digits_len(input);
        if ndigits == 0 {
            return Err(E::ExpectedYear.into());
        }
        let (digits, input) = input.split_at(ndigits);
        let year = parse::i64(digits).context(E::FailedYear)?;
        let year = if negative { -year } else { year };
        Ok(Parsed { value: year, input })
    }

    // day := digit digit, bounded by the length of the month.
    #[cfg_attr(feature = "perf-inline", inline(always))]
    fn parse_day<'i>(
        &self,
        input: &'i [u8],
        year: i64,
        month: i32,
    ) -> Result<Parsed<'i, i32>, Error> {
        let Parsed { value: day, input } =
            self.parse_field(input, "day", 1, 31)?;
        if day > civil::days_in_month(year, month) {
            return Err(E::InvalidDay {
                year,
                month: i64::from(month),
                day: i64::from(day),
            }
            .into());
        }
        Ok(Parsed { value: day, input })
    }

    // time := hour [ ":" minute [ ":" second [ "." fraction ] ] ]
    //
    // The fields parsed are written to `dt` and the finest unit seen is
    // returned.
    #[cfg_attr(feature = "perf-inline", inline(always))]
    fn parse_time<'i>(
        &self,
        input: &'i [u8],
        dt: &mut DateTime,
    ) -> Result<Parsed<'i, Unit>, Error> {
        let Parsed { value: hour, input } =
            self.parse_field(input, "hour", 0, 23)?;
        dt.hour = hour;

        let Some(input) = input.strip_prefix(b":") else {
            return Ok(Parsed { value: Unit::Hour, input });
        };
        let Parsed { value: minute, input } =
            self.parse_field(input, "minute", 0, 59)?;
        dt.minute = minute;

        let Some(input) = input.strip_prefix(b":") else {
            return Ok(Parsed { value: Unit::Minute, input });
        };
        let Parsed { value: second, input } =
            self.parse_field(input, "second", 0, 59)?;
        dt.second = second;

        let Some(input) = input.strip_prefix(b".") else {
            return Ok(Parsed { value: Unit::Second, input });
        };
        self.parse_fraction(input, dt)
    }

    // fraction := digit{1,18}
    //
    // The fraction is split into microseconds, picoseconds and attoseconds.
    // The unit is chosen from the number of digits written, in groups of
    // three.
    #[cfg_attr(feature = "perf-inline", inline(always))]
    fn parse_fraction<'i>(
        &self,
        input: &'i [u8],
        dt: &mut DateTime,
    ) -> Result<Parsed<'i, Unit>, Error> {
        let len = parse::digits_len(input);
        if len == 0 {
            return Err(E::ExpectedFractionDigits.into());
        }
        if len > 18 {
            return Err(E::FractionTooLong { len }.into());
        }
        let (digits, input) = input.split_at(len);
        let mut attos = parse::i64(digits)?;
        for _ in len..18 {
            attos *= 10;
        }
        // OK because `attos` is less than 10^18.
        dt.microsecond = (attos / 1_000_000_000_000) as i32;
        dt.picosecond = ((attos / 1_000_000) % 1_000_000) as i32;
        dt.attosecond = (attos % 1_000_000) as i32;

        let unit = match len {
            1..=3 => Unit::Millisecond,
            4..=6 => Unit::Microsecond,
            7..=9 => Unit::Nanosecond,
            10..=12 => Unit::Picosecond,
            13..=15 => Unit::Femtosecond,
            _ => Unit::Attosecond,
        };
        Ok(Parsed { value: unit, input })
    }

    // zone := "Z" | ( "+" | "-" ) digit digit [ [ ":" ] digit digit ]
    #[cfg_attr(feature = "perf-inline", inline(always))]
    fn parse_offset<'i>(
        &self,
        input: &'i [u8],
    ) -> Result<Parsed<'i, Option<i32>>, Error> {
        let (sign, input) = match input.first() {
            Some(&b'Z') => {
                return Ok(Parsed { value: Some(0), input: &input[1..] })
            }
            Some(&b'+') => (1, &input[1..]),
            Some(&b'-') => (-1, &input[1..]),
            _ => return Ok(Parsed { value: None, input }),
        };
        let Parsed { value: hours, input } =
            self.parse_field(input, "offset hour", 0, 23)?;
        let rest = input.strip_prefix(b":").unwrap_or(input);
        let has_minutes = rest.first().map_or(false, u8::is_ascii_digit);
        let (minutes, input) = if has_minutes {
            let Parsed { value, input } =
                self.parse_field(rest, "offset minute", 0, 59)?;
            (value, input)
        } else {
            (0, input)
        };
        Ok(Parsed { value: Some(sign * (hours * 60 + minutes)), input })
    }

    /// Parses exactly two digits and checks that they're in `min..=max`.
    #[cfg_attr(feature = "perf-inline", inline(always))]
    fn parse_field<'i>(
        &self,
        input: &'i [u8],
        what: &'static str,
        min: i32,
        max: i32,
    ) -> Result<Parsed<'i, i32>, Error> {
        let (digits, input) =
            parse::split(input, 2).ok_or(E::ExpectedTwoDigits { what })?;
        let value =
            parse::i64(digits).context(E::ExpectedTwoDigits { what })?;
        // OK because two digits always fit.
        let value = value as i32;
        if !(min..=max).contains(&value) {
            return Err(
                E::InvalidField { what, value: i64::from(value) }.into()
            );
        }
        Ok(Parsed { value, input })
    }
}

impl Default for DateTimeParser {
    fn default() -> DateTimeParser {
        DateTimeParser::new()
    }
}
