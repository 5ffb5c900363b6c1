use crate::{
    cast::{self, Casting},
    civil::DateTime,
    error::Error,
    fmt::iso8601::DateTimePrinter,
    host::{CalendarLike, Value},
    Kind, Metadata, Unit, NAT,
};

/// A point in time, stored as a tick count since 1970-01-01T00:00:00 under
/// some [`Metadata`].
///
/// An instant with a tick count of [`NAT`](crate::NAT) is "not a time".
/// NaT is an ordinary value: it survives casts to any metadata and converts
/// to a missing host value. A non-NaT instant can't meaningfully have
/// generic metadata, and most operations report an error for one.
///
/// `Display` writes the instant in ISO 8601 at the resolution of its unit.
///
/// # Example
///
/// ```
/// use scaledtime::{cast::Casting, civil::DateTime, Instant, Metadata, Unit};
///
/// let ms: Metadata = "[ms]".parse()?;
/// let dt = DateTime::date(2011, 3, 15).at(10, 30, 45, 250_000);
/// let instant = Instant::from_datetime(ms, &dt)?;
/// assert_eq!(instant.value(), 1_300_185_045_250);
/// assert_eq!(instant.to_string(), "2011-03-15T10:30:45.250");
///
/// // Casting to a coarser unit requires a permissive rule.
/// let day = Metadata::from_unit(Unit::Day);
/// assert!(instant.cast(day, Casting::Safe).is_err());
/// let day_instant = instant.cast(day, Casting::Unsafe)?;
/// assert_eq!(day_instant.to_string(), "2011-03-15");
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Instant {
    meta: Metadata,
    value: i64,
}

impl Instant {
    /// NaT with generic metadata.
    pub const NAT: Instant = Instant { meta: Metadata::GENERIC, value: NAT };

    /// Creates an instant from a tick count under the given metadata.
    #[inline]
    pub const fn new(meta: Metadata, value: i64) -> Instant {
        Instant { meta, value }
    }

    /// Creates an instant from a calendar datetime, truncated to the
    /// precision of `meta`.
    ///
    /// # Errors
    ///
    /// This returns an error when `meta` is generic and the datetime isn't
    /// NaT, or when the tick count overflows.
    pub fn from_datetime(
        meta: Metadata,
        dt: &DateTime,
    ) -> Result<Instant, Error> {
        Ok(Instant::new(meta, dt.to_scaled(meta)?))
    }

    /// Returns the metadata of this instant.
    #[inline]
    pub const fn metadata(self) -> Metadata {
        self.meta
    }

    /// Returns the tick count of this instant.
    #[inline]
    pub const fn value(self) -> i64 {
        self.value
    }

    /// Returns true when this instant is NaT.
    #[inline]
    pub const fn is_nat(self) -> bool {
        self.value == NAT
    }

    /// Decomposes this instant into a calendar datetime.
    ///
    /// # Errors
    ///
    /// This returns an error when the metadata is generic and the instant
    /// isn't NaT.
    pub fn to_datetime(self) -> Result<DateTime, Error> {
        DateTime::from_scaled(self.meta, self.value)
    }

    /// Casts this instant to the given metadata under a casting rule.
    ///
    /// NaT casts to NaT under every rule.
    ///
    /// # Errors
    ///
    /// This returns a casting error when the rule forbids the cast and an
    /// overflow error when the result doesn't fit.
    pub fn cast(
        self,
        meta: Metadata,
        casting: Casting,
    ) -> Result<Instant, Error> {
        if self.is_nat() {
            return Ok(Instant::new(meta, NAT));
        }
        cast::check_cast(Kind::Datetime, "instant", self.meta, meta, casting)?;
        Ok(Instant::new(meta, cast::datetime(self.meta, meta, self.value)?))
    }

    /// Converts this instant into the closest host value.
    ///
    /// NaT and generic instants become [`Value::Missing`]. Instants with
    /// units finer than microseconds, or whose year is outside `1..=9999`,
    /// become their tick count. Otherwise, units finer than days give a
    /// calendar datetime and the rest give a calendar date.
    ///
    /// # Example
    ///
    /// ```
    /// use scaledtime::{host::{CalendarLike, Value}, Instant, Metadata};
    ///
    /// let instant = Instant::new("[h]".parse()?, 361_162);
    /// let Value::Calendar(cal) = instant.to_value() else { unreachable!() };
    /// assert_eq!(cal, CalendarLike::date(2011, 3, 15).at(10, 0, 0, 0));
    ///
    /// let instant = Instant::new("[ns]".parse()?, 5);
    /// assert!(matches!(instant.to_value(), Value::Integer(5)));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn to_value(self) -> Value<'static> {
        if self.is_nat() || self.meta.is_generic() {
            return Value::Missing;
        }
        let unit = self.meta.unit();
        if unit > Unit::Microsecond {
            return Value::Integer(self.value);
        }
        let dt = match self.to_datetime() {
            Ok(dt) if (1..=9999).contains(&dt.year) => dt,
            _ => return Value::Integer(self.value),
        };
        let cal = CalendarLike::date(
            dt.year,
            i64::from(dt.month),
            i64::from(dt.day),
        );
        if unit <= Unit::Day {
            return Value::Calendar(cal);
        }
        Value::Calendar(cal.at(
            i64::from(dt.hour),
            i64::from(dt.minute),
            i64::from(dt.second),
            i64::from(dt.microsecond),
        ))
    }
}

impl core::fmt::Display for Instant {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if self.is_nat() {
            return f.write_str("NaT");
        }
        match self.to_datetime() {
            Ok(dt) => DateTimePrinter::new()
                .unit(Some(self.meta.unit()))
                .print_datetime(&dt, f)
                .map_err(|_| core::fmt::Error),
            Err(_) => write!(f, "{}{}", self.value, self.meta),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    fn meta(s: &str) -> Metadata {
        s.parse().unwrap()
    }

    #[test]
    fn display() {
        let at = |m: &str, v| Instant::new(meta(m), v).to_string();

        insta::assert_snapshot!(at("[Y]", 41), @"2011");
        insta::assert_snapshot!(at("[M]", 494), @"2011-03");
        insta::assert_snapshot!(at("[W]", 2149), @"2011-03-10");
        insta::assert_snapshot!(at("[B]", 10748), @"2011-03-15");
        insta::assert_snapshot!(at("[D]", -1), @"1969-12-31");
        insta::assert_snapshot!(at("[3h]", 1), @"1970-01-01T03");
        insta::assert_snapshot!(at("[ns]", -1), @"1969-12-31T23:59:59.999999999");
        insta::assert_snapshot!(Instant::NAT, @"NaT");
        insta::assert_snapshot!(Instant::new(Metadata::GENERIC, 5), @"5");
    }

    #[test]
    fn casts() {
        let day = meta("[D]");
        let hour = meta("[h]");
        let minute = meta("[m]");

        let i = Instant::new(hour, 73);
        assert_eq!(
            i.cast(minute, Casting::Safe).unwrap(),
            Instant::new(minute, 4380),
        );
        let err =
            Instant::new(minute, 4380).cast(hour, Casting::Safe).unwrap_err();
        assert!(err.is_casting());
        insta::assert_snapshot!(
            err,
            @"cannot cast instant from metadata [m] to [h] according to the rule 'safe'",
        );
        // Days and hours sit on opposite sides of the date/time divide.
        assert!(i.cast(day, Casting::SameKind).unwrap_err().is_casting());
        assert_eq!(
            i.cast(day, Casting::Unsafe).unwrap(),
            Instant::new(day, 3),
        );

        let nat = Instant::new(hour, NAT).cast(day, Casting::No).unwrap();
        assert!(nat.is_nat());
        assert_eq!(nat.metadata(), day);
    }

    #[test]
    fn to_value() {
        let v = Instant::new(meta("[D]"), 15048).to_value();
        assert!(matches!(
            v,
            Value::Calendar(c) if c == CalendarLike::date(2011, 3, 15),
        ));

        let v = Instant::new(meta("[10us]"), 130_018_504_525_012).to_value();
        let expected = CalendarLike::date(2011, 3, 15).at(10, 30, 45, 250_120);
        assert!(matches!(v, Value::Calendar(c) if c == expected));

        // Year 10000.
        let v = Instant::new(meta("[Y]"), 8030).to_value();
        assert!(matches!(v, Value::Integer(8030)));
        // Year 0.
        let v = Instant::new(meta("[Y]"), -1970).to_value();
        assert!(matches!(v, Value::Integer(-1970)));

        assert!(matches!(Instant::NAT.to_value(), Value::Missing));
        assert!(matches!(
            Instant::new(Metadata::GENERIC, 5).to_value(),
            Value::Missing,
        ));
        assert!(matches!(
            Instant::new(meta("[ps]"), 5).to_value(),
            Value::Integer(5),
        ));
    }
}
