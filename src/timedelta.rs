use crate::{
    cast::{self, Casting},
    error::Error,
    host::{DurationLike, Value},
    Kind, Metadata, Unit, NAT,
};

/// The number of microseconds in a day.
const MICROS_PER_DAY: i128 = 86_400_000_000;

/// A signed span of time, stored as a tick count under some [`Metadata`].
///
/// A timedelta with a tick count of [`NAT`](crate::NAT) is "not a time" and
/// passes through every cast unchanged. Unlike instants, a timedelta may
/// have generic metadata: it is then a plain count that takes on the units
/// of whatever it is combined with.
///
/// `Display` writes the tick count followed by the bracketed metadata, e.g.,
/// `90[m]`.
///
/// # Example
///
/// ```
/// use scaledtime::{cast::Casting, Metadata, Timedelta};
///
/// let td = Timedelta::new("[m]".parse()?, 90);
/// assert_eq!(td.to_string(), "90[m]");
///
/// let secs = td.cast("[s]".parse()?, Casting::Safe)?;
/// assert_eq!(secs.value(), 5_400);
///
/// let hours = td.cast("[h]".parse()?, Casting::SameKind)?;
/// assert_eq!(hours.value(), 1);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Timedelta {
    meta: Metadata,
    value: i64,
}

impl Timedelta {
    /// NaT with generic metadata.
    pub const NAT: Timedelta =
        Timedelta { meta: Metadata::GENERIC, value: NAT };

    /// Creates a timedelta from a tick count under the given metadata.
    #[inline]
    pub const fn new(meta: Metadata, value: i64) -> Timedelta {
        Timedelta { meta, value }
    }

    /// Returns the metadata of this timedelta.
    #[inline]
    pub const fn metadata(self) -> Metadata {
        self.meta
    }

    /// Returns the tick count of this timedelta.
    #[inline]
    pub const fn value(self) -> i64 {
        self.value
    }

    /// Returns true when this timedelta is NaT.
    #[inline]
    pub const fn is_nat(self) -> bool {
        self.value == NAT
    }

    /// Casts this timedelta to the given metadata under a casting rule,
    /// rounding toward negative infinity.
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
    ) -> Result<Timedelta, Error> {
        if self.is_nat() {
            return Ok(Timedelta::new(meta, NAT));
        }
        cast::check_cast(
            Kind::Timedelta,
            "timedelta",
            self.meta,
            meta,
            casting,
        )?;
        Ok(Timedelta::new(meta, cast::timedelta(self.meta, meta, self.value)?))
    }

    /// Converts this timedelta into the closest host value.
    ///
    /// NaT becomes [`Value::Missing`]. Years, months, business days, generic
    /// units and units finer than microseconds have no exact duration
    /// object, so they become their tick count. Otherwise the result is a
    /// duration of days, seconds and microseconds, where only the day count
    /// is negative for negative durations. Durations with more than
    /// 999,999,999 days in either direction become their tick count.
    ///
    /// # Example
    ///
    /// ```
    /// use scaledtime::{host::{DurationLike, Value}, Timedelta};
    ///
    /// let td = Timedelta::new("[ms]".parse()?, -1);
    /// let Value::Duration(dur) = td.to_value() else { unreachable!() };
    /// assert_eq!(
    ///     dur,
    ///     DurationLike { days: -1, seconds: 86_399, microseconds: 999_000 },
    /// );
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn to_value(self) -> Value<'static> {
        use self::Unit::*;

        if self.is_nat() {
            return Value::Missing;
        }
        let micros_per_unit: i128 = match self.meta.unit() {
            Week => 7 * MICROS_PER_DAY,
            Day => MICROS_PER_DAY,
            Hour => 3_600_000_000,
            Minute => 60_000_000,
            Second => 1_000_000,
            Millisecond => 1_000,
            Microsecond => 1,
            _ => return Value::Integer(self.value),
        };
        // An `i64` times an `i32` times a week of microseconds always fits.
        let total = i128::from(self.value)
            * i128::from(self.meta.multiplier())
            * micros_per_unit;
        let days = total.div_euclid(MICROS_PER_DAY);
        let rem = total.rem_euclid(MICROS_PER_DAY);
        if !(-999_999_999..=999_999_999).contains(&days) {
            return Value::Integer(self.value);
        }
        // OK because of the bounds check above and because the remainder is
        // less than a day.
        Value::Duration(DurationLike {
            days: days as i64,
            seconds: (rem / 1_000_000) as i64,
            microseconds: (rem % 1_000_000) as i64,
        })
    }
}

impl core::fmt::Display for Timedelta {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if self.is_nat() {
            return f.write_str("NaT");
        }
        write!(f, "{}{}", self.value, self.meta)
    }
}
