/// A unit of time.
///
/// Units are ordered from coarsest to finest, with the special
/// [`Unit::Generic`] unit sorting before all others. This ordering is
/// significant: casting rules compare units to decide whether a conversion
/// can lose precision.
///
/// Years and months are _nonlinear_ units: their length in days depends on
/// where they fall in the calendar. Business days are nonlinear too, since
/// they skip weekends. Every other unit is _linear_ and has a fixed ratio to
/// its neighbors (a week is always 7 days, a day is always 24 hours and so
/// on).
///
/// # Example: ordering
///
/// ```
/// use scaledtime::Unit;
///
/// assert!(Unit::Year < Unit::Day);
/// assert!(Unit::Day < Unit::Hour);
/// assert!(Unit::Nanosecond < Unit::Attosecond);
/// assert!(Unit::Generic < Unit::Year);
/// ```
///
/// # Example: unit codes
///
/// ```
/// use scaledtime::Unit;
///
/// assert_eq!(Unit::Millisecond.code(), "ms");
/// assert_eq!(Unit::from_code(b"B"), Some(Unit::BusinessDay));
/// assert_eq!(Unit::from_code(b"xs"), None);
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum Unit {
    /// The unit is not known. The only value representable with generic units
    /// is NaT. Generic units adopt whatever unit they are combined with.
    Generic = 0,
    /// A Gregorian calendar year.
    Year = 1,
    /// A Gregorian calendar month.
    Month = 2,
    /// Seven days. Weeks are counted from Thursday, 1970-01-01.
    Week = 3,
    /// A weekday, Monday through Friday.
    BusinessDay = 4,
    /// A calendar day of exactly 24 hours.
    Day = 5,
    /// An hour is always 60 minutes.
    Hour = 6,
    /// A minute is always 60 seconds. Leap seconds are not modeled.
    Minute = 7,
    /// A second is always 1,000 milliseconds.
    Second = 8,
    /// A millisecond is always 1,000 microseconds.
    Millisecond = 9,
    /// A microsecond is always 1,000 nanoseconds.
    Microsecond = 10,
    /// A nanosecond is always 1,000 picoseconds.
    Nanosecond = 11,
    /// A picosecond is always 1,000 femtoseconds.
    Picosecond = 12,
    /// A femtosecond is always 1,000 attoseconds.
    Femtosecond = 13,
    /// An attosecond is the finest unit supported.
    Attosecond = 14,
}

/// The factor between each unit and the next finer one.
///
/// Nonlinear units have a placeholder factor of `1` so that a product over a
/// range of units starting at a week or a business day still comes out right
/// (a week is 7 days, a business day is treated as 1 day). Generic units
/// have no conversion at all.
const FACTORS: [u64; 15] = [
    0,    // generic
    1,    // years, not used
    1,    // months, not used
    7,    // weeks -> days
    1,    // business days, not used
    24,   // days -> hours
    60,   // hours -> minutes
    60,   // minutes -> seconds
    1000, // seconds -> milliseconds
    1000, // milliseconds -> microseconds
    1000, // microseconds -> nanoseconds
    1000, // nanoseconds -> picoseconds
    1000, // picoseconds -> femtoseconds
    1000, // femtoseconds -> attoseconds
    1,    // attoseconds
];

impl Unit {
    /// Returns the short code for this unit, as used in metadata strings.
    ///
    /// Generic units have no code in the metadata grammar. For them, this
    /// returns `generic`, which is what appears when generic metadata is
    /// rendered without brackets.
    pub fn code(self) -> &'static str {
        match self {
            Unit::Generic => "generic",
            Unit::Year => "Y",
            Unit::Month => "M",
            Unit::Week => "W",
            Unit::BusinessDay => "B",
            Unit::Day => "D",
            Unit::Hour => "h",
            Unit::Minute => "m",
            Unit::Second => "s",
            Unit::Millisecond => "ms",
            Unit::Microsecond => "us",
            Unit::Nanosecond => "ns",
            Unit::Picosecond => "ps",
            Unit::Femtosecond => "fs",
            Unit::Attosecond => "as",
        }
    }

    /// Parses a unit from its short code.
    ///
    /// The codes are `Y`, `M`, `W`, `B`, `D`, `h`, `m` and `s` for the
    /// single letter units, and `ms`, `us`, `ns`, `ps`, `fs` and `as` for the
    /// sub-second units. Generic units have no code, so this never returns
    /// [`Unit::Generic`].
    pub fn from_code(code: &[u8]) -> Option<Unit> {
        match *code {
            [b'Y'] => Some(Unit::Year),
            [b'M'] => Some(Unit::Month),
            [b'W'] => Some(Unit::Week),
            [b'B'] => Some(Unit::BusinessDay),
            [b'D'] => Some(Unit::Day),
            [b'h'] => Some(Unit::Hour),
            [b'm'] => Some(Unit::Minute),
            [b's'] => Some(Unit::Second),
            // All the two-letter units are fractions of a second.
            [prefix, b's'] => match prefix {
                b'm' => Some(Unit::Millisecond),
                b'u' => Some(Unit::Microsecond),
                b'n' => Some(Unit::Nanosecond),
                b'p' => Some(Unit::Picosecond),
                b'f' => Some(Unit::Femtosecond),
                b'a' => Some(Unit::Attosecond),
                _ => None,
            },
            _ => None,
        }
    }

    /// A human readable singular description of this unit of time.
    pub fn singular(self) -> &'static str {
        match self {
            Unit::Generic => "generic unit",
            Unit::Year => "year",
            Unit::Month => "month",
            Unit::Week => "week",
            Unit::BusinessDay => "business day",
            Unit::Day => "day",
            Unit::Hour => "hour",
            Unit::Minute => "minute",
            Unit::Second => "second",
            Unit::Millisecond => "millisecond",
            Unit::Microsecond => "microsecond",
            Unit::Nanosecond => "nanosecond",
            Unit::Picosecond => "picosecond",
            Unit::Femtosecond => "femtosecond",
            Unit::Attosecond => "attosecond",
        }
    }

    /// A human readable plural description of this unit of time.
    pub fn plural(self) -> &'static str {
        match self {
            Unit::Generic => "generic units",
            Unit::Year => "years",
            Unit::Month => "months",
            Unit::Week => "weeks",
            Unit::BusinessDay => "business days",
            Unit::Day => "days",
            Unit::Hour => "hours",
            Unit::Minute => "minutes",
            Unit::Second => "seconds",
            Unit::Millisecond => "milliseconds",
            Unit::Microsecond => "microseconds",
            Unit::Nanosecond => "nanoseconds",
            Unit::Picosecond => "picoseconds",
            Unit::Femtosecond => "femtoseconds",
            Unit::Attosecond => "attoseconds",
        }
    }

    /// Returns true if this unit's length depends on the calendar.
    ///
    /// This is true for years, months and business days.
    pub fn is_nonlinear(self) -> bool {
        matches!(self, Unit::Year | Unit::Month | Unit::BusinessDay)
    }

    /// Returns the factor that converts a count of `self` into a count of
    /// `little`.
    ///
    /// This is the product of the fixed factors of every unit from `self` up
    /// to (but not including) `little`. If `little` is not finer than `self`,
    /// then the empty product `1` is returned.
    ///
    /// This does not check that the units in between are linear. Years and
    /// months contribute a factor of `1`, which is not meaningful, so callers
    /// handle them separately. Business days also contribute `1`, i.e., they
    /// are treated as days.
    ///
    /// This returns `None` when either unit is generic, or when the product
    /// gets too big. Specifically, the product must keep its top 8 bits
    /// clear, which leaves room to scale it further by small multipliers.
    ///
    /// # Example
    ///
    /// ```
    /// use scaledtime::Unit;
    ///
    /// assert_eq!(Unit::Week.factor_to(Unit::Hour), Some(168));
    /// assert_eq!(
    ///     Unit::Second.factor_to(Unit::Nanosecond),
    ///     Some(1_000_000_000),
    /// );
    /// assert_eq!(Unit::Day.factor_to(Unit::Attosecond), None);
    /// ```
    pub fn factor_to(self, little: Unit) -> Option<u64> {
        const OVERFLOW: u64 = 0xff00_0000_0000_0000;

        if self == Unit::Generic || little == Unit::Generic {
            return None;
        }
        let mut factor: u64 = 1;
        let mut unit = self;
        while unit < little {
            factor = factor.checked_mul(FACTORS[unit as usize])?;
            if factor & OVERFLOW != 0 {
                return None;
            }
            unit = unit.finer()?;
        }
        Some(factor)
    }

    /// Returns the next finer unit, if one exists.
    pub(crate) fn finer(self) -> Option<Unit> {
        Unit::from_usize(self as usize + 1)
    }

    /// Returns true when this unit is on the "date" side of the same-kind
    /// barrier for the given kind of value.
    ///
    /// For instants, days and coarser are dates. For durations, the
    /// barrier sits between months and weeks, since a duration in weeks can
    /// be exactly converted to hours but a duration in months cannot.
    pub(crate) fn is_date_side(self, kind: crate::Kind) -> bool {
        match kind {
            crate::Kind::Datetime => self <= Unit::Day,
            crate::Kind::Timedelta => self <= Unit::Month,
        }
    }

    pub(crate) fn from_usize(n: usize) -> Option<Unit> {
        match n {
            0 => Some(Unit::Generic),
            1 => Some(Unit::Year),
            2 => Some(Unit::Month),
            3 => Some(Unit::Week),
            4 => Some(Unit::BusinessDay),
            5 => Some(Unit::Day),
            6 => Some(Unit::Hour),
            7 => Some(Unit::Minute),
            8 => Some(Unit::Second),
            9 => Some(Unit::Millisecond),
            10 => Some(Unit::Microsecond),
            11 => Some(Unit::Nanosecond),
            12 => Some(Unit::Picosecond),
            13 => Some(Unit::Femtosecond),
            14 => Some(Unit::Attosecond),
            _ => None,
        }
    }
}

impl core::fmt::Display for Unit {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Unit {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Unit {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Unit, D::Error> {
        use serde::de;

        struct UnitVisitor;

        impl<'de> de::Visitor<'de> for UnitVisitor {
            type Value = Unit;

            fn expecting(
                &self,
                f: &mut core::fmt::Formatter,
            ) -> core::fmt::Result {
                f.write_str("a time unit code like 'D' or 'ms'")
            }

            #[inline]
            fn visit_bytes<E: de::Error>(
                self,
                value: &[u8],
            ) -> Result<Unit, E> {
                if value == b"generic" {
                    return Ok(Unit::Generic);
                }
                Unit::from_code(value).ok_or_else(|| {
                    de::Error::invalid_value(
                        de::Unexpected::Bytes(value),
                        &self,
                    )
                })
            }

            #[inline]
            fn visit_str<E: de::Error>(self, value: &str) -> Result<Unit, E> {
                self.visit_bytes(value.as_bytes())
            }
        }

        deserializer.deserialize_str(UnitVisitor)
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for Unit {
    fn arbitrary(g: &mut quickcheck::Gen) -> Unit {
        use quickcheck::Arbitrary;

        // Generic is excluded. It takes part in no arithmetic, so properties
        // over units are almost always about the concrete ones.
        Unit::from_usize(1 + usize::arbitrary(g) % 14).unwrap()
    }

    fn shrink(&self) -> alloc::boxed::Box<dyn Iterator<Item = Self>> {
        use quickcheck::Arbitrary;

        alloc::boxed::Box::new(
            (*self as usize)
                .shrink()
                .filter(|&n| n >= 1)
                .filter_map(Unit::from_usize),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for n in 1..15 {
            let unit = Unit::from_usize(n).unwrap();
            assert_eq!(Unit::from_code(unit.code().as_bytes()), Some(unit));
        }
        assert_eq!(Unit::from_code(b"generic"), None);
        assert_eq!(Unit::from_code(b""), None);
        assert_eq!(Unit::from_code(b"s "), None);
    }

    #[test]
    fn factors() {
        assert_eq!(Unit::Day.factor_to(Unit::Day), Some(1));
        assert_eq!(Unit::Hour.factor_to(Unit::Day), Some(1));
        assert_eq!(Unit::Week.factor_to(Unit::Day), Some(7));
        assert_eq!(Unit::BusinessDay.factor_to(Unit::Hour), Some(24));
        assert_eq!(Unit::Day.factor_to(Unit::Second), Some(86400));
        assert_eq!(
            Unit::Day.factor_to(Unit::Nanosecond),
            Some(86_400_000_000_000),
        );
        assert_eq!(
            Unit::Millisecond.factor_to(Unit::Attosecond),
            Some(1_000_000_000_000_000),
        );
        // 10^18 sets bits in the top byte.
        assert_eq!(Unit::Second.factor_to(Unit::Attosecond), None);
        assert_eq!(Unit::Minute.factor_to(Unit::Attosecond), None);
        assert_eq!(Unit::Generic.factor_to(Unit::Second), None);
    }

    #[test]
    fn barrier() {
        use crate::Kind;

        assert!(Unit::Day.is_date_side(Kind::Datetime));
        assert!(!Unit::Hour.is_date_side(Kind::Datetime));
        assert!(Unit::Month.is_date_side(Kind::Timedelta));
        assert!(!Unit::Week.is_date_side(Kind::Timedelta));
    }

    quickcheck::quickcheck! {
        fn prop_factor_is_transitive(a: Unit, b: Unit, c: Unit) -> bool {
            let mut units = [a, b, c];
            units.sort();
            let [a, b, c] = units;
            match (a.factor_to(b), b.factor_to(c), a.factor_to(c)) {
                (Some(ab), Some(bc), Some(ac)) => ab * bc == ac,
                _ => true,
            }
        }
    }
}
