/*!
Conversion of host values into instants and timedeltas.

A [`Converter`] turns a single host [`Value`] into an [`Instant`] or a
[`Timedelta`]. It can be configured with the metadata to convert into and
with the [`Casting`] rule that governs how much precision may be lost on the
way. When no metadata is given, the converter detects it from the value:
the finest unit present in ISO 8601 text, days for calendar dates,
microseconds for calendar datetimes and durations, and the value's own
metadata for already typed scalars.

[`Converter::values`] converts several values at once into one shared
metadata, and [`infer_type`] finds the metadata that a whole (possibly
nested) host container would need without converting anything.

# Example

```
use scaledtime::{
    cast::Casting, host::Value, ingest::Converter, Metadata, Unit,
};

let instant = Converter::new().instant(Value::from("2011-03-15T10:30"))?;
assert_eq!(instant.metadata(), Metadata::from_unit(Unit::Minute));

// Converting to a coarser unit under `safe` casting would lose precision.
let day = Metadata::from_unit(Unit::Day);
let converter = Converter::new().metadata(Some(day)).casting(Casting::Safe);
let err = converter.instant(Value::from("2011-03-15T10:30")).unwrap_err();
assert!(err.is_casting());
assert_eq!(converter.instant(Value::from("2011-03-15"))?.value(), 15_048);

# Ok::<(), Box<dyn std::error::Error>>(())
```
*/

use alloc::vec::Vec;

use crate::{
    cast::{self, Casting},
    civil::{self, DateTime},
    error::{civil::Error as CE, host::Error as E, Error, ErrorContext},
    fmt::iso8601::DateTimeParser,
    host::{self, CalendarLike, DurationLike, Value},
    util::parse,
    Instant, Kind, Metadata, TemporalType, Timedelta, Unit, NAT,
};

/// A converter from host values to instants and timedeltas.
///
/// By default, a converter detects metadata from each value and uses
/// [`Casting::SameKind`].
///
/// Under [`Casting::Unsafe`], values that can't be converted at all become
/// NaT. Under [`Casting::SameKind`], only [`Value::Missing`] becomes NaT.
#[derive(Clone, Copy, Debug, Default)]
pub struct Converter {
    meta: Option<Metadata>,
    casting: Casting,
}

impl Converter {
    /// Create a new converter that detects metadata and uses
    /// [`Casting::SameKind`].
    #[inline]
    pub const fn new() -> Converter {
        Converter { meta: None, casting: Casting::SameKind }
    }

    /// Set the metadata to convert into. `None` means the metadata is
    /// detected from each value.
    #[inline]
    pub const fn metadata(self, meta: Option<Metadata>) -> Converter {
        Converter { meta, ..self }
    }

    /// Set the casting rule applied when a value must change units.
    #[inline]
    pub const fn casting(self, casting: Casting) -> Converter {
        Converter { casting, ..self }
    }

    /// Converts a host value into an instant.
    ///
    /// Text is parsed as ISO 8601. When metadata is set, the parsed unit
    /// must be castable to it. Integers are taken as tick counts and need
    /// non-generic metadata. Calendar values are validated, shifted to UTC
    /// by their offset and converted. Instants are cast.
    ///
    /// # Errors
    ///
    /// This returns an error when the value can't be converted, when the
    /// casting rule rejects the conversion, or on overflow.
    ///
    /// # Example
    ///
    /// ```
    /// use scaledtime::{
    ///     host::{CalendarLike, Value},
    ///     ingest::Converter,
    ///     Metadata,
    /// };
    ///
    /// let ms: Metadata = "[ms]".parse()?;
    /// let converter = Converter::new().metadata(Some(ms));
    ///
    /// let cal = CalendarLike::date(1970, 1, 1).at(1, 0, 0, 0).offset(60);
    /// assert_eq!(converter.instant(Value::Calendar(cal))?.value(), 0);
    /// assert_eq!(converter.instant(Value::Integer(5))?.value(), 5);
    /// assert!(converter.instant(Value::Missing)?.is_nat());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn instant(&self, value: Value<'_>) -> Result<Instant, Error> {
        match value {
            Value::Text(text) => self.instant_from_text(text),
            Value::Integer(n) => match self.meta {
                Some(meta) if !meta.is_generic() => Ok(Instant::new(meta, n)),
                _ => Err(E::IntegerNeedsUnit.into()),
            },
            Value::Instant(instant) => match self.meta {
                None => Ok(instant),
                Some(meta) => instant.cast(meta, self.casting),
            },
            Value::Calendar(ref cal) => self.instant_from_calendar(cal),
            _ => {
                let (meta, nat) = self.fallback(Kind::Datetime, &value)?;
                Ok(Instant::new(meta, nat))
            }
        }
    }

    /// Converts a host value into a timedelta.
    ///
    /// Text must be empty, `NaT` or a decimal integer. Text and integers
    /// are taken as tick counts in the configured metadata, or generic
    /// metadata when none is set. Duration values are converted from
    /// microseconds. Timedeltas are cast.
    ///
    /// # Errors
    ///
    /// This returns an error when the value can't be converted, when the
    /// casting rule rejects the conversion, or on overflow.
    ///
    /// # Example
    ///
    /// ```
    /// use scaledtime::{
    ///     cast::Casting,
    ///     host::{DurationLike, Value},
    ///     ingest::Converter,
    /// };
    ///
    /// let dur = DurationLike { days: 0, seconds: 90, microseconds: 0 };
    /// let td = Converter::new().timedelta(Value::Duration(dur))?;
    /// assert_eq!(td.to_string(), "90000000[us]");
    ///
    /// // 90 seconds is exact in seconds, so a safe cast is allowed.
    /// let converter = Converter::new()
    ///     .metadata(Some("[s]".parse()?))
    ///     .casting(Casting::Safe);
    /// assert_eq!(converter.timedelta(Value::Duration(dur))?.value(), 90);
    ///
    /// let td = Converter::new().timedelta(Value::from("-12"))?;
    /// assert_eq!(td.to_string(), "-12");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn timedelta(&self, value: Value<'_>) -> Result<Timedelta, Error> {
        let meta = self.meta.unwrap_or(Metadata::GENERIC);
        match value {
            Value::Text(text) => match timedelta_from_text(text) {
                Ok(ticks) => Ok(Timedelta::new(meta, ticks)),
                Err(_) if self.casting == Casting::Unsafe => {
                    let (meta, nat) = self.fallback(Kind::Timedelta, &value)?;
                    Ok(Timedelta::new(meta, nat))
                }
                Err(err) => Err(err),
            },
            Value::Integer(n) => Ok(Timedelta::new(meta, n)),
            Value::Timedelta(td) => match self.meta {
                None => Ok(td),
                Some(meta) => td.cast(meta, self.casting),
            },
            Value::Duration(ref dur) => self.timedelta_from_duration(dur),
            _ => {
                let (meta, nat) = self.fallback(Kind::Timedelta, &value)?;
                Ok(Timedelta::new(meta, nat))
            }
        }
    }

    /// Converts several values, each tagged with the kind to convert it to,
    /// into tick counts under one shared metadata.
    ///
    /// When metadata is set, every value is converted into it directly.
    /// Otherwise each value is converted with its detected metadata, the
    /// metadata are combined left to right with [`Metadata::gcd`] and every
    /// value is cast into the result. Durations combine strictly, so that,
    /// for example, a duration in months and one in days can't be unified.
    /// [`Value::Missing`] becomes NaT with generic metadata.
    ///
    /// # Errors
    ///
    /// This returns an error when any value fails to convert, when the
    /// metadata can't be combined, or when a cast overflows.
    ///
    /// # Example
    ///
    /// ```
    /// use scaledtime::{host::Value, ingest::Converter, Kind, Metadata};
    ///
    /// let (meta, ticks) = Converter::new().values(&[
    ///     (Kind::Datetime, Value::from("2011-03-15")),
    ///     (Kind::Timedelta, Value::Missing),
    ///     (Kind::Datetime, Value::from("2011-03-15T12")),
    /// ])?;
    /// assert_eq!(meta, "[h]".parse::<Metadata>()?);
    /// assert_eq!(ticks, [361_152, scaledtime::NAT, 361_164]);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn values(
        &self,
        values: &[(Kind, Value<'_>)],
    ) -> Result<(Metadata, Vec<i64>), Error> {
        if let Some(meta) = self.meta {
            let ticks = values
                .iter()
                .map(|&(kind, value)| match value {
                    Value::Missing => Ok(NAT),
                    _ => self.convert(kind, value).map(|(_, ticks)| ticks),
                })
                .collect::<Result<Vec<i64>, Error>>()?;
            return Ok((meta, ticks));
        }

        let converted = values
            .iter()
            .map(|&(kind, value)| match value {
                Value::Missing => Ok((Metadata::GENERIC, NAT)),
                _ => self.convert(kind, value),
            })
            .collect::<Result<Vec<(Metadata, i64)>, Error>>()?;
        let Some(&(first, _)) = converted.first() else {
            return Ok((Metadata::GENERIC, Vec::new()));
        };
        let mut meta = first;
        let mut strict = values[0].0 == Kind::Timedelta;
        for (&(kind, _), &(found, _)) in values.iter().zip(&converted).skip(1)
        {
            let timedelta = kind == Kind::Timedelta;
            meta = Metadata::gcd(found, meta, timedelta, strict)?;
            strict = strict || timedelta;
        }
        trace!(
            "unified {len} values into metadata [{meta}]",
            len = values.len(),
            meta = meta.bare(),
        );
        let ticks = values
            .iter()
            .zip(&converted)
            .map(|(&(kind, _), &(found, ticks))| match kind {
                Kind::Datetime => cast::datetime(found, meta, ticks),
                Kind::Timedelta => cast::timedelta(found, meta, ticks),
            })
            .collect::<Result<Vec<i64>, Error>>()?;
        Ok((meta, ticks))
    }

    /// Converts a value to the given kind, returning its metadata and tick
    /// count.
    fn convert(
        &self,
        kind: Kind,
        value: Value<'_>,
    ) -> Result<(Metadata, i64), Error> {
        match kind {
            Kind::Datetime => {
                self.instant(value).map(|i| (i.metadata(), i.value()))
            }
            Kind::Timedelta => {
                self.timedelta(value).map(|td| (td.metadata(), td.value()))
            }
        }
    }

    fn instant_from_text(&self, text: &[u8]) -> Result<Instant, Error> {
        let parser = DateTimeParser::new()
            .unit(self.meta.map(|meta| meta.unit()))
            .casting(self.casting);
        let parsed = parser.parse(text)?;
        let meta =
            self.meta.unwrap_or_else(|| Metadata::from_unit(parsed.unit()));
        Instant::from_datetime(meta, &parsed.to_utc()?)
    }

    fn instant_from_calendar(
        &self,
        cal: &CalendarLike,
    ) -> Result<Instant, Error> {
        let (dt, unit) = calendar_to_datetime(cal)?;
        let meta = match self.meta {
            None => Metadata::from_unit(unit),
            Some(meta) => {
                let what = if cal.is_datetime() {
                    "calendar datetime"
                } else {
                    "calendar date"
                };
                let found = Metadata::from_unit(unit);
                cast::check_cast(
                    Kind::Datetime,
                    what,
                    found,
                    meta,
                    self.casting,
                )?;
                meta
            }
        };
        Instant::from_datetime(meta, &dt)
    }

    fn timedelta_from_duration(
        &self,
        dur: &DurationLike,
    ) -> Result<Timedelta, Error> {
        let us = Metadata::from_unit(Unit::Microsecond);
        let ticks = dur.total_microseconds()?;
        let Some(meta) = self.meta else {
            return Ok(Timedelta::new(us, ticks));
        };
        // Casting rules are checked from the coarsest unit that represents
        // the duration exactly, so that, e.g., a whole number of seconds
        // safely casts to seconds.
        let exact = Metadata::from_unit(coarsest_exact_unit(ticks));
        cast::check_cast(
            Kind::Timedelta,
            "duration-like value",
            exact,
            meta,
            self.casting,
        )?;
        Ok(Timedelta::new(meta, cast::timedelta(us, meta, ticks)?))
    }

    /// Handles values that have no conversion.
    ///
    /// Under the unsafe rule these become NaT, as does a missing value under
    /// the same kind rule. Everything else is an error.
    fn fallback(
        &self,
        kind: Kind,
        value: &Value<'_>,
    ) -> Result<(Metadata, i64), Error> {
        let to_nat = match self.casting {
            Casting::Unsafe => true,
            Casting::SameKind => matches!(*value, Value::Missing),
            _ => false,
        };
        if to_nat {
            debug!(
                "converting {shape} to NaT {kind} under casting rule \
                 '{casting}'",
                shape = value.shape(),
                casting = self.casting,
            );
            return Ok((self.meta.unwrap_or(Metadata::GENERIC), NAT));
        }
        if value.is_container() {
            return Err(E::WrongShape { kind, shape: value.shape() }.into());
        }
        Err(E::Unconvertible { kind }.into())
    }
}

/// Validates a host calendar value and converts it to a UTC datetime.
///
/// The unit returned is days for a date and microseconds for a datetime.
fn calendar_to_datetime(
    cal: &CalendarLike,
) -> Result<(DateTime, Unit), Error> {
    let date = || CE::InvalidDate {
        year: cal.year,
        month: cal.month,
        day: cal.day,
    };
    if cal.year == NAT {
        return Err(Error::from(CE::FieldOutOfRange {
            what: "year",
            value: cal.year,
        }))
        .with_context(date);
    }
    let month = field("month", cal.month, 1, 12).with_context(date)?;
    let days = i64::from(civil::days_in_month(cal.year, month));
    let day = field("day", cal.day, 1, days).with_context(date)?;
    let mut dt = DateTime::date(cal.year, month, day);

    let Some(time) = cal.time else {
        return Ok((dt, Unit::Day));
    };
    let invalid_time = || CE::InvalidTime {
        hour: time.hour,
        minute: time.minute,
        second: time.second,
        microsecond: time.microsecond,
    };
    dt.hour = field("hour", time.hour, 0, 23).with_context(invalid_time)?;
    dt.minute =
        field("minute", time.minute, 0, 59).with_context(invalid_time)?;
    dt.second =
        field("second", time.second, 0, 59).with_context(invalid_time)?;
    dt.microsecond = field("microsecond", time.microsecond, 0, 999_999)
        .with_context(invalid_time)?;
    if let Some(offset) = cal.offset_minutes {
        dt.add_minutes(offset.checked_neg().ok_or(E::OffsetOverflow)?)?;
    }
    Ok((dt, Unit::Microsecond))
}

/// Returns `value` as an `i32` when it's in `min..=max`.
fn field(
    what: &'static str,
    value: i64,
    min: i64,
    max: i64,
) -> Result<i32, Error> {
    if !(min..=max).contains(&value) {
        return Err(CE::FieldOutOfRange { what, value }.into());
    }
    // OK because every field range fits in an `i32`.
    Ok(value as i32)
}

/// Parses timedelta text: empty or `NaT` for NaT, otherwise an optionally
/// signed decimal integer.
fn timedelta_from_text(text: &[u8]) -> Result<i64, Error> {
    if text.is_empty() || text.eq_ignore_ascii_case(b"nat") {
        return Ok(NAT);
    }
    let parse_signed = || -> Result<i64, Error> {
        let trimmed = match text.iter().position(|b| !b.is_ascii_whitespace())
        {
            Some(start) => &text[start..],
            None => &text[text.len()..],
        };
        match trimmed.split_first() {
            Some((&b'-', digits)) => Ok(-parse::i64(digits)?),
            Some((&b'+', digits)) => parse::i64(digits),
            _ => parse::i64(trimmed),
        }
    };
    parse_signed().with_context(|| E::TimedeltaText { text: text.into() })
}

/// Returns the coarsest unit, up to weeks, in which the given number of
/// microseconds is a whole number.
fn coarsest_exact_unit(us: i64) -> Unit {
    const STEPS: &[(i64, Unit)] = &[
        (1_000, Unit::Microsecond),
        (1_000_000, Unit::Millisecond),
        (60_000_000, Unit::Second),
        (3_600_000_000, Unit::Minute),
        (86_400_000_000, Unit::Hour),
        (604_800_000_000, Unit::Day),
    ];
    for &(per, unit) in STEPS {
        if us % per != 0 {
            return unit;
        }
    }
    Unit::Week
}

/// Finds the temporal type needed to hold every value in `value`, treating
/// its leaves as values of the given kind.
///
/// The search starts from generic metadata and combines every metadata
/// found with the non-strict [`Metadata::gcd`]. Sequences and records are
/// searched recursively. A sequence that contains itself is searched only up
/// to the element that is itself.
///
/// For instants, ISO 8601 text contributes its parsed unit (text that fails
/// to parse is skipped, but every element of a text array must parse),
/// calendar dates contribute days and calendar datetimes microseconds.
/// For timedeltas, text is skipped, durations contribute microseconds and
/// timedeltas contribute their metadata strictly. For both, typed arrays
/// and scalars of the kind contribute their metadata. Everything else is
/// skipped.
///
/// # Errors
///
/// This returns an error when combining metadata fails or when an element
/// of a text array fails to parse.
///
/// # Example
///
/// ```
/// use scaledtime::{host::{CalendarLike, Value}, ingest, Kind};
///
/// let items = [
///     Value::from("2011-03-15T10"),
///     Value::Calendar(CalendarLike::date(2011, 3, 15)),
///     Value::from("not a date"),
/// ];
/// let ty = ingest::infer_type(Value::Sequence(&items), Kind::Datetime)?;
/// assert_eq!(ty.to_string(), "datetime64[h]");
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn infer_type(
    value: Value<'_>,
    kind: Kind,
) -> Result<TemporalType, Error> {
    let mut meta = Metadata::GENERIC;
    match kind {
        Kind::Datetime => infer_instant(&value, &mut meta)?,
        Kind::Timedelta => infer_timedelta(&value, &mut meta)?,
    }
    Ok(TemporalType::new(kind, meta))
}

fn infer_instant(value: &Value<'_>, meta: &mut Metadata) -> Result<(), Error> {
    match *value {
        Value::Array(ty) => merge(meta, ty.meta(), false, value),
        Value::Instant(instant) => {
            merge(meta, instant.metadata(), false, value)
        }
        Value::Text(_) => {
            let converter = Converter::new().casting(Casting::Unsafe);
            match converter.instant(*value) {
                Ok(instant) => merge(meta, instant.metadata(), false, value),
                Err(err) if err.is_parse() || err.is_value() => {
                    trace!("skipping text during inference: {err}");
                    Ok(())
                }
                Err(err) => Err(err),
            }
        }
        Value::TextArray(arr) => {
            let parser = DateTimeParser::new().casting(Casting::Unsafe);
            for text in arr.iter() {
                let unit = parser.parse(text)?.unit();
                merge(meta, Metadata::from_unit(unit), false, value)?;
            }
            Ok(())
        }
        Value::Calendar(ref cal) => {
            let unit =
                if cal.is_datetime() { Unit::Microsecond } else { Unit::Day };
            merge(meta, Metadata::from_unit(unit), false, value)
        }
        Value::Sequence(seq) => {
            for i in 0..seq.len() {
                let item = seq.get(i);
                if host::is_same_sequence(seq, &item) {
                    break;
                }
                infer_instant(&item, meta)?;
            }
            Ok(())
        }
        Value::Record(items) => {
            items.iter().try_for_each(|item| infer_instant(item, meta))
        }
        _ => Ok(()),
    }
}

fn infer_timedelta(
    value: &Value<'_>,
    meta: &mut Metadata,
) -> Result<(), Error> {
    match *value {
        Value::Array(ty) => merge(meta, ty.meta(), false, value),
        Value::Timedelta(td) => merge(meta, td.metadata(), true, value),
        Value::Duration(_) => {
            let us = Metadata::from_unit(Unit::Microsecond);
            merge(meta, us, false, value)
        }
        Value::Sequence(seq) => {
            for i in 0..seq.len() {
                let item = seq.get(i);
                if host::is_same_sequence(seq, &item) {
                    break;
                }
                infer_timedelta(&item, meta)?;
            }
            Ok(())
        }
        Value::Record(items) => {
            items.iter().try_for_each(|item| infer_timedelta(item, meta))
        }
        _ => Ok(()),
    }
}

/// Combines `found` into `meta`, handling nonlinear units strictly on both
/// sides when `strict` is set.
fn merge(
    meta: &mut Metadata,
    found: Metadata,
    strict: bool,
    from: &Value<'_>,
) -> Result<(), Error> {
    trace!(
        "inferred [{found}] from {shape}",
        found = found.bare(),
        shape = from.shape(),
    );
    // Only the log message reads this.
    #[cfg(not(feature = "logging"))]
    let _ = from;
    *meta = Metadata::gcd(*meta, found, strict, strict)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use crate::host::{Sequence, TextArray, TimeOfDay};

    use super::*;

    fn meta(s: &str) -> Metadata {
        s.parse().unwrap()
    }

    fn with(m: &str, casting: Casting) -> Converter {
        Converter::new().metadata(Some(meta(m))).casting(casting)
    }

    #[test]
    fn instant_from_text() {
        let i = Converter::new().instant(Value::from("2011-03-15")).unwrap();
        assert_eq!(i, Instant::new(meta("[D]"), 15_048));

        let i = Converter::new().instant(Value::from("NaT")).unwrap();
        assert_eq!(i, Instant::NAT);

        let i = Converter::new()
            .instant(Value::from("1970-01-01T00:00+01:00"))
            .unwrap();
        assert_eq!(i, Instant::new(meta("[m]"), -60));

        let i = with("[s]", Casting::Safe)
            .instant(Value::from("2011-03-15T10:30"))
            .unwrap();
        assert_eq!(i.value(), 1_300_185_000);

        let i = with("[D]", Casting::Unsafe)
            .instant(Value::from("2011-03-15T10:30"))
            .unwrap();
        assert_eq!(i.value(), 15_048);

        let err =
            Converter::new().instant(Value::from("2011-02-29")).unwrap_err();
        assert!(err.is_value());
        let err = Converter::new().instant(Value::from("today")).unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn instant_from_integer() {
        let i = with("[5s]", Casting::SameKind)
            .instant(Value::Integer(7))
            .unwrap();
        assert_eq!(i, Instant::new(meta("[5s]"), 7));

        let err = Converter::new().instant(Value::Integer(7)).unwrap_err();
        assert!(err.is_value());
        insta::assert_snapshot!(
            err,
            @"converting an integer to an instant requires a specified unit",
        );
        let err = Converter::new()
            .metadata(Some(Metadata::GENERIC))
            .instant(Value::Integer(7))
            .unwrap_err();
        assert!(err.is_value());
    }

    #[test]
    fn instant_from_calendar() {
        let date = CalendarLike::date(2011, 3, 15);
        let i = Converter::new().instant(Value::Calendar(date)).unwrap();
        assert_eq!(i, Instant::new(meta("[D]"), 15_048));

        let dt = date.at(10, 30, 45, 250_000);
        let i = Converter::new().instant(Value::Calendar(dt)).unwrap();
        assert_eq!(i, Instant::new(meta("[us]"), 1_300_185_045_250_000));

        // Shifting by the offset crosses into the previous year.
        let dt = CalendarLike::date(2011, 1, 1).at(0, 30, 0, 0).offset(60);
        let i = with("[m]", Casting::SameKind)
            .instant(Value::Calendar(dt))
            .unwrap();
        assert_eq!(i.to_string(), "2010-12-31T23:30");

        // The most negative offset can't be undone.
        let dt = date.at(0, 0, 0, 0).offset(i32::MIN);
        let err = Converter::new().instant(Value::Calendar(dt)).unwrap_err();
        assert!(err.is_overflow());
        insta::assert_snapshot!(
            err,
            @"time zone offset overflows a 32-bit minute count",
        );
        let dt = date.at(0, 0, 0, 0).offset(i32::MAX);
        let i = with("[D]", Casting::Unsafe)
            .instant(Value::Calendar(dt))
            .unwrap();
        assert!(i.value() < 0);

        let err = with("[D]", Casting::Safe)
            .instant(Value::Calendar(date.at(0, 0, 0, 0)))
            .unwrap_err();
        insta::assert_snapshot!(
            err,
            @"cannot cast calendar datetime from metadata [us] to [D] according to the rule 'safe'",
        );
        let err = with("[h]", Casting::SameKind)
            .instant(Value::Calendar(date))
            .unwrap_err();
        insta::assert_snapshot!(
            err,
            @"cannot cast calendar date from metadata [D] to [h] according to the rule 'same_kind'",
        );
    }

    #[test]
    fn invalid_calendar_fields() {
        let convert = |cal| {
            Converter::new().instant(Value::Calendar(cal)).unwrap_err()
        };

        let err = convert(CalendarLike::date(2011, 2, 29));
        assert!(err.is_value());
        insta::assert_snapshot!(
            err,
            @"invalid date (2011,2,29) when converting to an instant: day 29 is out of range",
        );
        insta::assert_snapshot!(
            convert(CalendarLike::date(2011, 13, 1)),
            @"invalid date (2011,13,1) when converting to an instant: month 13 is out of range",
        );
        let mut cal = CalendarLike::date(2011, 3, 1);
        cal.time =
            Some(TimeOfDay { hour: 1, minute: 60, ..TimeOfDay::default() });
        insta::assert_snapshot!(
            convert(cal),
            @"invalid time (1,60,0,0) when converting to an instant: minute 60 is out of range",
        );
    }

    #[test]
    fn instant_from_instant() {
        let hours = Instant::new(meta("[h]"), 25);
        assert_eq!(
            Converter::new().instant(Value::Instant(hours)).unwrap(),
            hours,
        );

        let days = with("[D]", Casting::Unsafe)
            .instant(Value::Instant(hours))
            .unwrap();
        assert_eq!(days, Instant::new(meta("[D]"), 1));

        let err = with("[D]", Casting::SameKind)
            .instant(Value::Instant(hours))
            .unwrap_err();
        assert!(err.is_casting());

        let nat = Instant::new(meta("[h]"), NAT);
        let got =
            with("[D]", Casting::No).instant(Value::Instant(nat)).unwrap();
        assert_eq!(got, Instant::new(meta("[D]"), NAT));
    }

    #[test]
    fn fallbacks() {
        let i = Converter::new().instant(Value::Missing).unwrap();
        assert_eq!(i, Instant::NAT);
        let i = with("[D]", Casting::Unsafe).instant(Value::Other).unwrap();
        assert_eq!(i, Instant::new(meta("[D]"), NAT));

        let err = Converter::new().instant(Value::Other).unwrap_err();
        assert!(err.is_value());
        insta::assert_snapshot!(err, @"could not convert value to datetime64");

        let err = Converter::new()
            .casting(Casting::Safe)
            .timedelta(Value::Missing)
            .unwrap_err();
        assert!(err.is_value());

        let items = [Value::Integer(1)];
        let err = Converter::new()
            .timedelta(Value::Sequence(&items))
            .unwrap_err();
        assert!(err.is_type());
        insta::assert_snapshot!(err, @"cannot convert a sequence to a single timedelta64");
    }

    #[test]
    fn timedelta_from_text_and_integers() {
        let c = Converter::new();
        assert_eq!(c.timedelta(Value::from("")).unwrap(), Timedelta::NAT);
        assert_eq!(c.timedelta(Value::from("nAt")).unwrap(), Timedelta::NAT);
        assert_eq!(
            c.timedelta(Value::from(" +42")).unwrap(),
            Timedelta::new(Metadata::GENERIC, 42),
        );
        assert_eq!(
            with("[ms]", Casting::No).timedelta(Value::from("-7")).unwrap(),
            Timedelta::new(meta("[ms]"), -7),
        );
        assert_eq!(
            c.timedelta(Value::Integer(9)).unwrap(),
            Timedelta::new(Metadata::GENERIC, 9),
        );

        let err = c.timedelta(Value::from("12x")).unwrap_err();
        assert!(err.is_parse());
        insta::assert_snapshot!(
            err,
            @r###"could not convert text "12x" to a timedelta: invalid digit, expected 0-9 but got x"###,
        );
        let td = Converter::new()
            .casting(Casting::Unsafe)
            .timedelta(Value::from("12x"))
            .unwrap();
        assert!(td.is_nat());
    }

    #[test]
    fn timedelta_from_duration() {
        let dur = |days, seconds, microseconds| {
            Value::Duration(DurationLike { days, seconds, microseconds })
        };

        let td = Converter::new().timedelta(dur(1, 1, 1)).unwrap();
        assert_eq!(td, Timedelta::new(meta("[us]"), 86_401_000_001));

        let td = with("[h]", Casting::Safe).timedelta(dur(7, 0, 0)).unwrap();
        assert_eq!(td, Timedelta::new(meta("[h]"), 168));
        let td =
            with("[m]", Casting::Safe).timedelta(dur(0, 3_600, 0)).unwrap();
        assert_eq!(td.value(), 60);

        let err =
            with("[s]", Casting::Safe).timedelta(dur(0, 1, 500)).unwrap_err();
        insta::assert_snapshot!(
            err,
            @"cannot cast duration-like value from metadata [us] to [s] according to the rule 'safe'",
        );
        let td =
            with("[s]", Casting::SameKind).timedelta(dur(0, 1, 500)).unwrap();
        assert_eq!(td.value(), 1);

        let err = Converter::new().timedelta(dur(i64::MAX, 0, 0)).unwrap_err();
        assert!(err.is_overflow());
    }

    #[test]
    fn exact_units() {
        assert_eq!(coarsest_exact_unit(1), Unit::Microsecond);
        assert_eq!(coarsest_exact_unit(2_000), Unit::Millisecond);
        assert_eq!(coarsest_exact_unit(-3_000_000), Unit::Second);
        assert_eq!(coarsest_exact_unit(120_000_000), Unit::Minute);
        assert_eq!(coarsest_exact_unit(7_200_000_000), Unit::Hour);
        assert_eq!(coarsest_exact_unit(172_800_000_000), Unit::Day);
        assert_eq!(coarsest_exact_unit(1_209_600_000_000), Unit::Week);
        assert_eq!(coarsest_exact_unit(0), Unit::Week);
    }

    #[test]
    fn unify_values() {
        let td = |m: &str, v| Value::Timedelta(Timedelta::new(meta(m), v));

        let (m, ticks) = Converter::new()
            .values(&[
                (Kind::Datetime, Value::from("2011-03-15")),
                (Kind::Timedelta, Value::Integer(3)),
            ])
            .unwrap();
        assert_eq!(m, meta("[D]"));
        assert_eq!(ticks, [15_048, 3]);

        let (m, ticks) = Converter::new()
            .values(&[
                (Kind::Timedelta, td("[2h]", 1)),
                (Kind::Timedelta, td("[3h]", 1)),
            ])
            .unwrap();
        assert_eq!(m, meta("[h]"));
        assert_eq!(ticks, [2, 3]);

        let err = Converter::new()
            .values(&[
                (Kind::Timedelta, td("[M]", 1)),
                (Kind::Timedelta, td("[D]", 1)),
            ])
            .unwrap_err();
        assert!(err.is_casting());

        // An instant in months combines loosely with a duration in days.
        let (m, _) = Converter::new()
            .values(&[
                (Kind::Datetime, Value::from("2011-03")),
                (Kind::Timedelta, td("[D]", 1)),
            ])
            .unwrap();
        assert_eq!(m, meta("[D]"));

        let (m, ticks) = with("[h]", Casting::SameKind)
            .values(&[
                (Kind::Datetime, Value::from("1970-01-02T00")),
                (Kind::Timedelta, Value::Missing),
            ])
            .unwrap();
        assert_eq!(m, meta("[h]"));
        assert_eq!(ticks, [24, NAT]);

        let (m, ticks) = Converter::new().values(&[]).unwrap();
        assert_eq!(m, Metadata::GENERIC);
        assert!(ticks.is_empty());
    }

    #[test]
    fn infer_instants() {
        let infer = |v| infer_type(v, Kind::Datetime).unwrap().meta();

        assert_eq!(infer(Value::from("2011-03-15T10:30")), meta("[m]"));
        assert_eq!(infer(Value::from("garbage")), Metadata::GENERIC);
        assert_eq!(
            infer(Value::Array(TemporalType::new(
                Kind::Datetime,
                meta("[6h]"),
            ))),
            meta("[6h]"),
        );
        let nested = [Value::from("2011-03-15T10:30:45"), Value::Missing];
        let items = [
            Value::Instant(Instant::new(meta("[4s]"), 0)),
            Value::Sequence(&nested),
            Value::Calendar(CalendarLike::date(2011, 3, 15)),
        ];
        assert_eq!(infer(Value::Sequence(&items)), meta("[s]"));

        let midnight = CalendarLike::date(2011, 3, 15).at(0, 0, 0, 0);
        let items = [Value::Calendar(midnight)];
        assert_eq!(infer(Value::Record(&items)), meta("[us]"));

        let arr = TextArray::new(b"2011\0\0\0\0\0\0NaT\0\0\0\0\0\0\0", 10);
        assert_eq!(infer(Value::TextArray(arr)), meta("[Y]"));
        let arr = TextArray::new(b"2011\0\0\0garbage", 7);
        let err =
            infer_type(Value::TextArray(arr), Kind::Datetime).unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn infer_timedeltas() {
        let infer = |v| infer_type(v, Kind::Timedelta);

        let items = [
            Value::from("ignored"),
            Value::Duration(DurationLike::default()),
            Value::Timedelta(Timedelta::new(meta("[ms]"), 1)),
            Value::Calendar(CalendarLike::date(2011, 3, 15)),
        ];
        let ty = infer(Value::Sequence(&items)).unwrap();
        assert_eq!(ty, TemporalType::new(Kind::Timedelta, meta("[us]")));

        let items = [
            Value::Timedelta(Timedelta::new(meta("[Y]"), 1)),
            Value::Timedelta(Timedelta::new(meta("[D]"), 1)),
        ];
        assert!(infer(Value::Sequence(&items)).unwrap_err().is_casting());
    }

    #[test]
    fn infer_stops_at_self_reference() {
        struct Looped;

        impl Sequence for Looped {
            fn len(&self) -> usize {
                3
            }

            fn get(&self, index: usize) -> Value<'_> {
                match index {
                    0 => Value::from("2011-03-15"),
                    1 => Value::Sequence(self),
                    _ => Value::from("2011-03-15T10:30:45.5"),
                }
            }
        }

        let ty = infer_type(Value::Sequence(&Looped), Kind::Datetime).unwrap();
        assert_eq!(ty.meta(), meta("[D]"));
    }
}
