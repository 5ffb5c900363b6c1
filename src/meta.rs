/*!
The `(unit, multiplier)` metadata attached to every scaled value.

A [`Metadata`] value says what one integer tick means. For example,
`[5ms]` means each tick is five milliseconds, so a tick count of `3` is 15
milliseconds. This module provides the arithmetic between metadata values:
exact conversion factors, divisibility, the greatest common divisor used for
type promotion and the rule for folding a divisor like `[us/4]` into a whole
multiple of a finer unit.

Parsing and printing metadata strings is handled in
[`fmt::metadata`](crate::fmt::metadata).
*/

use crate::{
    error::{unit::Error as E, Error},
    Unit,
};

/// The number of days in 400 Gregorian years.
const DAYS_PER_400_YEARS: u64 = 146_097;

/// A time unit paired with a positive multiplier.
///
/// Metadata is what gives meaning to the integer tick count of an
/// [`Instant`](crate::Instant) or a [`Timedelta`](crate::Timedelta). The
/// multiplier is always at least `1`. Generic metadata always has a
/// multiplier of `1`, so that all generic metadata compare equal.
///
/// `Display` renders the canonical bracketed form (`[5ms]`, or the empty
/// string for generic metadata). Use [`Metadata::bare`] for the form without
/// brackets. `FromStr` accepts the bracketed form and the empty string.
///
/// # Example
///
/// ```
/// use scaledtime::{Metadata, Unit};
///
/// let meta: Metadata = "[5ms]".parse()?;
/// assert_eq!(meta.unit(), Unit::Millisecond);
/// assert_eq!(meta.multiplier(), 5);
/// assert_eq!(meta.to_string(), "[5ms]");
/// assert_eq!(meta.bare().to_string(), "5ms");
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Metadata {
    unit: Unit,
    multiplier: i32,
}

impl Metadata {
    /// Generic metadata. The only value representable with it is NaT.
    pub const GENERIC: Metadata =
        Metadata { unit: Unit::Generic, multiplier: 1 };

    /// Creates new metadata from a unit and a multiplier.
    ///
    /// The multiplier of generic metadata is ignored.
    ///
    /// # Errors
    ///
    /// This returns an error when the multiplier is less than `1`.
    ///
    /// # Example
    ///
    /// ```
    /// use scaledtime::{Metadata, Unit};
    ///
    /// let meta = Metadata::new(Unit::Day, 7)?;
    /// assert_eq!(meta.to_string(), "[7D]");
    /// assert!(Metadata::new(Unit::Day, 0).is_err());
    /// assert_eq!(Metadata::new(Unit::Generic, 5)?, Metadata::GENERIC);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(unit: Unit, multiplier: i32) -> Result<Metadata, Error> {
        if unit == Unit::Generic {
            return Ok(Metadata::GENERIC);
        }
        if multiplier < 1 {
            return Err(E::InvalidMultiplier {
                multiplier: i64::from(multiplier),
            }
            .into());
        }
        Ok(Metadata { unit, multiplier })
    }

    /// Creates metadata for the given unit with a multiplier of `1`.
    #[inline]
    pub const fn from_unit(unit: Unit) -> Metadata {
        Metadata { unit, multiplier: 1 }
    }

    /// Returns the unit of this metadata.
    #[inline]
    pub const fn unit(self) -> Unit {
        self.unit
    }

    /// Returns the multiplier of this metadata. This is always at least `1`.
    #[inline]
    pub const fn multiplier(self) -> i32 {
        self.multiplier
    }

    /// Returns true when this metadata has generic units.
    #[inline]
    pub fn is_generic(self) -> bool {
        self.unit == Unit::Generic
    }

    /// Returns a value that displays this metadata without brackets.
    ///
    /// A multiplier of `1` is omitted and generic metadata displays as
    /// `generic`.
    #[inline]
    pub fn bare(self) -> Bare {
        Bare(self)
    }

    /// Folds a divisor into this metadata by switching to a finer unit.
    ///
    /// Metadata like `[D/24]` means "one 24th of a day." Such metadata
    /// isn't representable directly, so it is resolved by searching a short
    /// list of finer units for one whose size evenly divides by the
    /// divisor. For days, the candidates are hours (24 per day), minutes
    /// (1,440) and seconds (86,400). The first candidate that works is used,
    /// and the multiplier is scaled accordingly. Sub-second units try the
    /// next two finer units.
    ///
    /// A divisor of `1` returns this metadata unchanged.
    ///
    /// # Errors
    ///
    /// This returns an error when this metadata is generic, when `den` is
    /// less than `1`, when no candidate unit divides evenly or when the
    /// resulting multiplier overflows.
    ///
    /// # Example
    ///
    /// ```
    /// use scaledtime::{Metadata, Unit};
    ///
    /// let day = Metadata::from_unit(Unit::Day);
    /// assert_eq!(day.divisor_to_multiple(24)?.to_string(), "[h]");
    /// assert_eq!(day.divisor_to_multiple(48)?.to_string(), "[30m]");
    ///
    /// let ms = Metadata::new(Unit::Millisecond, 3)?;
    /// assert_eq!(ms.divisor_to_multiple(8)?.to_string(), "[375us]");
    ///
    /// // A microsecond can't be split into thirds of any finer unit that
    /// // is tried.
    /// let us = Metadata::from_unit(Unit::Microsecond);
    /// assert!(us.divisor_to_multiple(3).is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn divisor_to_multiple(self, den: i32) -> Result<Metadata, Error> {
        self.divisor_to_multiple_in(den, None)
    }

    /// Like `divisor_to_multiple`, but reports the metadata text the divisor
    /// came from in the error message.
    pub(crate) fn divisor_to_multiple_in(
        self,
        den: i32,
        text: Option<&[u8]>,
    ) -> Result<Metadata, Error> {
        if self.is_generic() {
            return Err(E::DivisorWithGeneric.into());
        }
        if den < 1 {
            return Err(E::InvalidDivisor { den: i64::from(den) }.into());
        }
        if den == 1 {
            return Ok(self);
        }
        let Some(&(size, unit)) =
            multiples(self.unit).iter().find(|&&(size, _)| size % den == 0)
        else {
            let text = text.map(|text| {
                alloc::string::String::from_utf8_lossy(text).into()
            });
            return Err(E::DivisorNotMultiple { den, text }.into());
        };
        let multiplier = self
            .multiplier
            .checked_mul(size / den)
            .ok_or(E::DivisorOverflow { meta: self, den })?;
        trace!(
            "resolved divisor {den} of [{meta}] to [{multiplier}{unit}]",
            meta = self.bare(),
        );
        Ok(Metadata { unit, multiplier })
    }

    /// Returns the reduced fraction `(numerator, denominator)` that converts
    /// a tick count under this metadata into a tick count under `dst`.
    ///
    /// That is, `dst_ticks = src_ticks * numerator / denominator`. Years and
    /// months are converted using their average length over the 400 year
    /// Gregorian cycle, which is exactly 146,097 days. This makes every
    /// factor an exact rational number.
    ///
    /// When this metadata is generic, the factor is `(1, 1)`. Generic units
    /// take on whatever unit they are converted to.
    ///
    /// # Errors
    ///
    /// This returns an error when `dst` is generic but this metadata is not,
    /// or when the factor overflows 64-bit integers. The numerator of a
    /// successful result is never zero.
    ///
    /// # Example
    ///
    /// ```
    /// use scaledtime::{Metadata, Unit};
    ///
    /// let year = Metadata::from_unit(Unit::Year);
    /// let day = Metadata::from_unit(Unit::Day);
    /// assert_eq!(year.conversion_factor(day)?, (146_097, 400));
    ///
    /// let ms5: Metadata = "[5ms]".parse()?;
    /// let us2: Metadata = "[2us]".parse()?;
    /// assert_eq!(ms5.conversion_factor(us2)?, (2_500, 1));
    /// assert_eq!(us2.conversion_factor(ms5)?, (1, 2_500));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn conversion_factor(
        self,
        dst: Metadata,
    ) -> Result<(i64, i64), Error> {
        if self.is_generic() {
            return Ok((1, 1));
        }
        if dst.is_generic() {
            return Err(E::ToGeneric { src: self }.into());
        }
        let (src_unit, dst_unit, swapped) = if self.unit <= dst.unit {
            (self.unit, dst.unit, false)
        } else {
            (dst.unit, self.unit, true)
        };
        let overflow = || {
            Error::from(E::ConversionOverflow { src: src_unit, dst: dst_unit })
        };
        let (mut num, mut den) = unit_conversion_factor(src_unit, dst_unit)
            .ok_or_else(overflow)?;
        if swapped {
            core::mem::swap(&mut num, &mut den);
        }
        let num = num
            .checked_mul(u64::from(self.multiplier.unsigned_abs()))
            .ok_or_else(overflow)?;
        let den = den
            .checked_mul(u64::from(dst.multiplier.unsigned_abs()))
            .ok_or_else(overflow)?;
        let gcd = gcd_u64(num, den);
        let num = i64::try_from(num / gcd).map_err(|_| overflow())?;
        let den = i64::try_from(den / gcd).map_err(|_| overflow())?;
        Ok((num, den))
    }

    /// Returns true when `divisor` divides evenly into this metadata.
    ///
    /// That is, when every tick of this metadata is a whole number of
    /// `divisor` ticks. Generic metadata divides into anything, but nothing
    /// other than generic metadata divides into generic metadata.
    ///
    /// Business days don't divide into or by any other unit. Years and
    /// months divide into each other (a year is 12 months), but their
    /// relationship to the linear units depends on the calendar. When
    /// `strict` is true, a year or month mixed with a linear unit never
    /// divides. When it is false, it always does.
    ///
    /// This also returns false when the comparison would overflow.
    ///
    /// # Example
    ///
    /// ```
    /// use scaledtime::{Metadata, Unit};
    ///
    /// let day = Metadata::from_unit(Unit::Day);
    /// let hour = Metadata::from_unit(Unit::Hour);
    /// assert!(day.divides(hour, true));
    /// assert!(!hour.divides(day, true));
    ///
    /// let year = Metadata::from_unit(Unit::Year);
    /// assert!(!year.divides(day, true));
    /// assert!(year.divides(day, false));
    /// ```
    pub fn divides(self, divisor: Metadata, strict: bool) -> bool {
        if divisor.is_generic() {
            return true;
        } else if self.is_generic() {
            return false;
        }

        let mut num1 = u64::from(self.multiplier.unsigned_abs());
        let mut num2 = u64::from(divisor.multiplier.unsigned_abs());
        if self.unit != divisor.unit {
            match (self.unit, divisor.unit) {
                (Unit::BusinessDay, _) | (_, Unit::BusinessDay) => {
                    return false
                }
                (Unit::Year, Unit::Month) => num1 *= 12,
                (Unit::Month, Unit::Year) => num2 *= 12,
                (Unit::Year | Unit::Month, _)
                | (_, Unit::Year | Unit::Month) => return !strict,
                _ => {}
            }
            // The coarser side is scaled into the finer unit.
            let scaled = if self.unit > divisor.unit {
                divisor
                    .unit
                    .factor_to(self.unit)
                    .and_then(|factor| num2.checked_mul(factor))
                    .map(|n| num2 = n)
            } else {
                self.unit
                    .factor_to(divisor.unit)
                    .and_then(|factor| num1.checked_mul(factor))
                    .map(|n| num1 = n)
            };
            if scaled.is_none() {
                return false;
            }
        }
        const OVERFLOW: u64 = 0xff00_0000_0000_0000;
        if num1 & OVERFLOW != 0 || num2 & OVERFLOW != 0 {
            return false;
        }
        num1 % num2 == 0
    }

    /// Returns the finest metadata that both `meta1` and `meta2` are whole
    /// multiples of.
    ///
    /// This is the metadata two temporal types are promoted to when they are
    /// combined. If either side is generic, the other side is returned
    /// unchanged.
    ///
    /// Years and months combine with each other exactly. When either is
    /// combined with a linear unit, the linear unit is used and the year or
    /// month multiplier is taken as is, since there is no exact factor. This
    /// is an error when the side with the year or month is `strict`.
    ///
    /// Business days combined with any other unit produce the finer of the
    /// two units, except that business days themselves become days (and
    /// thus lose their "weekdays only" meaning). This is an error when
    /// either side is `strict`.
    ///
    /// # Errors
    ///
    /// This returns a casting error for incompatible nonlinear units, as
    /// described above, and an overflow error when the combined multiplier
    /// doesn't fit.
    ///
    /// # Example
    ///
    /// ```
    /// use scaledtime::{Metadata, Unit};
    ///
    /// let ms5: Metadata = "[5ms]".parse()?;
    /// let us2: Metadata = "[2us]".parse()?;
    /// assert_eq!(Metadata::gcd(ms5, us2, true, true)?.to_string(), "[2us]");
    ///
    /// let y2: Metadata = "[2Y]".parse()?;
    /// let m3: Metadata = "[3M]".parse()?;
    /// assert_eq!(Metadata::gcd(y2, m3, true, true)?.to_string(), "[3M]");
    ///
    /// let day = Metadata::from_unit(Unit::Day);
    /// assert!(Metadata::gcd(y2, day, true, false).unwrap_err().is_casting());
    /// assert_eq!(Metadata::gcd(y2, day, false, false)?, day);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn gcd(
        meta1: Metadata,
        meta2: Metadata,
        strict1: bool,
        strict2: bool,
    ) -> Result<Metadata, Error> {
        use self::Unit::*;

        if meta1.is_generic() {
            return Ok(meta2);
        } else if meta2.is_generic() {
            return Ok(meta1);
        }

        let incompatible =
            || Error::from(E::IncompatibleNonlinear { meta1, meta2 });
        let overflow = || Error::from(E::GcdOverflow { meta1, meta2 });
        let mut num1 = u64::from(meta1.multiplier.unsigned_abs());
        let mut num2 = u64::from(meta2.multiplier.unsigned_abs());
        let mut unit = meta1.unit;
        if meta1.unit != meta2.unit {
            // Years and months have no exact factor to the other units, so
            // their multipliers are never scaled.
            let scale1 = !matches!(meta1.unit, Year | Month);
            let scale2 = !matches!(meta2.unit, Year | Month);
            match (meta1.unit, meta2.unit) {
                (Year, Month) => num1 *= 12,
                (Year, _) if strict1 => return Err(incompatible()),
                (Year, _) => {}
                (BusinessDay, _) | (_, BusinessDay) if strict1 || strict2 => {
                    return Err(incompatible())
                }
                (BusinessDay, _) | (_, BusinessDay) => {}
                (Month, Year) => num2 *= 12,
                (_, Year) if strict2 => return Err(incompatible()),
                (Month, _) if strict1 => return Err(incompatible()),
                (_, Month) if strict2 => return Err(incompatible()),
                _ => {}
            }
            // Take the finer unit and scale the coarser multiplier into it.
            if meta1.unit > meta2.unit {
                unit = meta1.unit;
                if scale2 {
                    let factor =
                        meta2.unit.factor_to(meta1.unit).ok_or_else(overflow)?;
                    num2 = num2.checked_mul(factor).ok_or_else(overflow)?;
                }
            } else {
                unit = meta2.unit;
                if scale1 {
                    let factor =
                        meta1.unit.factor_to(meta2.unit).ok_or_else(overflow)?;
                    num1 = num1.checked_mul(factor).ok_or_else(overflow)?;
                }
            }
            if unit == BusinessDay {
                debug!(
                    "combining [{meta1}] with [{meta2}] turned business \
                     days into days",
                    meta1 = meta1.bare(),
                    meta2 = meta2.bare(),
                );
                unit = Day;
            }
        }
        let multiplier = i32::try_from(gcd_u64(num1, num2))
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(overflow)?;
        Ok(Metadata { unit, multiplier })
    }
}

impl Default for Metadata {
    fn default() -> Metadata {
        Metadata::GENERIC
    }
}

impl core::fmt::Display for Metadata {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if self.is_generic() {
            return Ok(());
        }
        write!(f, "[{}]", self.bare())
    }
}

/// Displays metadata without brackets.
///
/// This is returned by [`Metadata::bare`].
#[derive(Clone, Copy, Debug)]
pub struct Bare(Metadata);

impl core::fmt::Display for Bare {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let Metadata { unit, multiplier } = self.0;
        if unit == Unit::Generic {
            f.write_str("generic")
        } else if multiplier == 1 {
            write!(f, "{unit}")
        } else {
            write!(f, "{multiplier}{unit}")
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Metadata {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Metadata {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Metadata, D::Error> {
        use serde::de;

        struct MetadataVisitor;

        impl<'de> de::Visitor<'de> for MetadataVisitor {
            type Value = Metadata;

            fn expecting(
                &self,
                f: &mut core::fmt::Formatter,
            ) -> core::fmt::Result {
                f.write_str("a metadata string like '[5ms]'")
            }

            #[inline]
            fn visit_bytes<E: de::Error>(
                self,
                value: &[u8],
            ) -> Result<Metadata, E> {
                crate::fmt::metadata::parse_bracketed(value)
                    .map_err(de::Error::custom)
            }

            #[inline]
            fn visit_str<E: de::Error>(
                self,
                value: &str,
            ) -> Result<Metadata, E> {
                self.visit_bytes(value.as_bytes())
            }
        }

        deserializer.deserialize_str(MetadataVisitor)
    }
}

/// Returns the finer units tried, in order, when resolving a divisor of the
/// given unit. Each candidate is the number of that finer unit in one of the
/// given unit.
fn multiples(unit: Unit) -> &'static [(i32, Unit)] {
    use self::Unit::*;

    match unit {
        Generic | Attosecond => &[],
        Year => &[(12, Month), (52, Week), (365, Day)],
        Month => &[(4, Week), (30, Day), (720, Hour)],
        Week => &[(5, BusinessDay), (7, Day), (168, Hour), (10_080, Minute)],
        BusinessDay | Day => &[(24, Hour), (1_440, Minute), (86_400, Second)],
        Hour => &[(60, Minute), (3_600, Second)],
        Minute => &[(60, Second), (60_000, Millisecond)],
        Second => &[(1_000, Millisecond), (1_000_000, Microsecond)],
        Millisecond => &[(1_000, Microsecond), (1_000_000, Nanosecond)],
        Microsecond => &[(1_000, Nanosecond), (1_000_000, Picosecond)],
        Nanosecond => &[(1_000, Picosecond), (1_000_000, Femtosecond)],
        Picosecond => &[(1_000, Femtosecond), (1_000_000, Attosecond)],
        Femtosecond => &[(1_000, Attosecond)],
    }
}

/// Returns the unreduced `(numerator, denominator)` converting a count of
/// `src` into a count of `dst`, where `src` is not finer than `dst` and
/// neither is generic.
fn unit_conversion_factor(src: Unit, dst: Unit) -> Option<(u64, u64)> {
    use self::Unit::*;

    if src == dst {
        return Some((1, 1));
    }
    let (num, den) = match (src, dst) {
        (Year, Month) => (12, 1),
        (Year, Week) => (DAYS_PER_400_YEARS, 400 * 7),
        // 146,097 is divisible by 7, so the number of business days in 400
        // years is exact.
        (Year, BusinessDay) => (DAYS_PER_400_YEARS * 5 / 7, 400),
        (Year, _) => {
            (DAYS_PER_400_YEARS.checked_mul(Day.factor_to(dst)?)?, 400)
        }
        (Month, Week) => (DAYS_PER_400_YEARS, 400 * 12 * 7),
        (Month, BusinessDay) => (DAYS_PER_400_YEARS * 5, 400 * 12 * 7),
        (Month, _) => (
            DAYS_PER_400_YEARS.checked_mul(Day.factor_to(dst)?)?,
            400 * 12,
        ),
        _ => (src.factor_to(dst)?, 1),
    };
    Some((num, den))
}

/// Euclid's algorithm on two positive integers.
fn gcd_u64(mut x: u64, mut y: u64) -> u64 {
    while y != 0 {
        (x, y) = (y, x % y);
    }
    x
}

#[cfg(test)]
impl quickcheck::Arbitrary for Metadata {
    fn arbitrary(g: &mut quickcheck::Gen) -> Metadata {
        use quickcheck::Arbitrary;

        let unit = Unit::arbitrary(g);
        // Small multipliers are the interesting ones, and `1` is the most
        // common of all.
        let multiplier = match u8::arbitrary(g) % 4 {
            0 => 1,
            _ => 1 + i32::from(u16::arbitrary(g) % 1_000),
        };
        Metadata { unit, multiplier }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(s: &str) -> Metadata {
        s.parse().unwrap()
    }

    #[test]
    fn divisor_candidates() {
        assert_eq!(meta("[Y]").divisor_to_multiple(12).unwrap(), meta("[M]"));
        assert_eq!(meta("[Y]").divisor_to_multiple(73).unwrap(), meta("[5D]"));
        assert_eq!(meta("[W]").divisor_to_multiple(5).unwrap(), meta("[B]"));
        assert_eq!(meta("[W]").divisor_to_multiple(7).unwrap(), meta("[D]"));
        let divided = |m: &str, den| meta(m).divisor_to_multiple(den).unwrap();
        assert_eq!(divided("[W]", 16), meta("[630m]"));
        assert_eq!(divided("[2h]", 9), meta("[800s]"));
        assert!(meta("[m]").divisor_to_multiple(7).is_err());
        assert_eq!(
            meta("[fs]").divisor_to_multiple(4).unwrap(),
            meta("[250as]")
        );
        assert_eq!(meta("[s]").divisor_to_multiple(1).unwrap(), meta("[s]"));

        let err = meta("[as]").divisor_to_multiple(2).unwrap_err();
        assert!(err.is_value());
        insta::assert_snapshot!(
            err,
            @"divisor (2) is not a multiple of a lower unit in metadata",
        );
        let err = Metadata::GENERIC.divisor_to_multiple(2).unwrap_err();
        insta::assert_snapshot!(err, @"cannot use a divisor with generic units");
        let err = meta("[s]").divisor_to_multiple(0).unwrap_err();
        insta::assert_snapshot!(err, @"divisor must be at least 1, but got 0");
        let err = Metadata::new(Unit::Second, i32::MAX)
            .unwrap()
            .divisor_to_multiple(2)
            .unwrap_err();
        assert!(err.is_overflow());
    }

    #[test]
    fn conversion_factors() {
        let f = |a: &str, b: &str| meta(a).conversion_factor(meta(b));

        assert_eq!(f("[Y]", "[D]").unwrap(), (146_097, 400));
        assert_eq!(f("[D]", "[Y]").unwrap(), (400, 146_097));
        assert_eq!(f("[Y]", "[M]").unwrap(), (12, 1));
        assert_eq!(f("[Y]", "[W]").unwrap(), (20_871, 400));
        assert_eq!(f("[Y]", "[B]").unwrap(), (20_871, 80));
        assert_eq!(f("[M]", "[W]").unwrap(), (6_957, 1_600));
        assert_eq!(f("[W]", "[D]").unwrap(), (7, 1));
        assert_eq!(f("[D]", "[h]").unwrap(), (24, 1));
        assert_eq!(f("[h]", "[D]").unwrap(), (1, 24));
        assert_eq!(f("[5ms]", "[2us]").unwrap(), (2_500, 1));
        assert_eq!(f("[3s]", "[3s]").unwrap(), (1, 1));
        assert_eq!(f("", "[ns]").unwrap(), (1, 1));
        assert_eq!(f("", "").unwrap(), (1, 1));

        let err = f("[s]", "").unwrap_err();
        assert!(err.is_value());
        insta::assert_snapshot!(
            err,
            @"cannot convert from specific units [s] to generic units",
        );
        let err = f("[Y]", "[as]").unwrap_err();
        assert!(err.is_overflow());
        insta::assert_snapshot!(
            err,
            @"integer overflow while computing the conversion factor between units Y and as",
        );
    }

    #[test]
    fn divisibility() {
        let d = |a: &str, b: &str, strict| meta(a).divides(meta(b), strict);

        assert!(d("[D]", "[h]", true));
        assert!(!d("[h]", "[D]", true));
        assert!(d("[48h]", "[D]", true));
        assert!(!d("[36h]", "[D]", true));
        assert!(d("[Y]", "[M]", true));
        assert!(!d("[M]", "[Y]", true));
        assert!(d("[12M]", "[Y]", true));
        assert!(!d("[Y]", "[D]", true));
        assert!(d("[Y]", "[D]", false));
        assert!(!d("[D]", "[M]", true));
        assert!(!d("[B]", "[D]", false));
        assert!(!d("[D]", "[B]", false));
        assert!(d("[D]", "", true));
        assert!(!d("", "[D]", false));
        assert!(d("", "", true));
        assert!(!d("[D]", "[as]", true));
    }

    #[test]
    fn common_divisors() {
        let g = |a: &str, b: &str, s1, s2| {
            Metadata::gcd(meta(a), meta(b), s1, s2)
        };

        assert_eq!(g("[5ms]", "[2us]", true, true).unwrap(), meta("[2us]"));
        assert_eq!(g("[4h]", "[6h]", true, true).unwrap(), meta("[2h]"));
        assert_eq!(g("[W]", "[3D]", true, true).unwrap(), meta("[D]"));
        assert_eq!(g("[2W]", "[7D]", true, true).unwrap(), meta("[7D]"));
        assert_eq!(g("[Y]", "[M]", true, true).unwrap(), meta("[M]"));
        assert_eq!(g("[M]", "[2Y]", true, true).unwrap(), meta("[M]"));
        assert_eq!(g("", "[7s]", true, true).unwrap(), meta("[7s]"));
        assert_eq!(g("[7s]", "", true, true).unwrap(), meta("[7s]"));

        // Nonlinear units only mix with linear units when permitted, and
        // then without scaling.
        assert_eq!(g("[Y]", "[7D]", false, false).unwrap(), meta("[D]"));
        assert_eq!(g("[D]", "[2M]", true, false).unwrap(), meta("[D]"));
        let err = g("[Y]", "[D]", true, false).unwrap_err();
        assert!(err.is_casting());
        insta::assert_snapshot!(
            err,
            @"cannot get a common metadata divisor for metadata [Y] and [D] because they have incompatible nonlinear base time units",
        );
        assert!(g("[D]", "[M]", false, true).unwrap_err().is_casting());

        // Business days become days when mixed with anything else.
        assert_eq!(g("[B]", "[B]", true, true).unwrap(), meta("[B]"));
        assert_eq!(g("[B]", "[W]", false, false).unwrap(), meta("[D]"));
        assert_eq!(g("[2B]", "[h]", false, false).unwrap(), meta("[h]"));
        assert!(g("[B]", "[D]", false, true).unwrap_err().is_casting());

        let err = g("[h]", "[as]", true, true).unwrap_err();
        assert!(err.is_overflow());
        insta::assert_snapshot!(
            err,
            @"integer overflow getting a common metadata divisor for metadata [h] and [as]",
        );
    }

    #[test]
    fn divides_matches_lossless_casts() {
        use crate::cast::timedelta;

        let round_trip = |a: &str, b: &str, v: i64| {
            let there = timedelta(meta(a), meta(b), v).unwrap();
            timedelta(meta(b), meta(a), there).unwrap()
        };
        assert!(meta("[3h]").divides(meta("[90m]"), true));
        assert_eq!(round_trip("[3h]", "[90m]", 5), 5);
        assert!(!meta("[h]").divides(meta("[90m]"), true));
        assert_eq!(round_trip("[h]", "[90m]", 1), 0);
        assert!(!meta("[W]").divides(meta("[5D]"), true));
        assert_eq!(round_trip("[W]", "[5D]", 1), 0);
    }

    quickcheck::quickcheck! {
        fn prop_conversion_factor_inverts(a: Metadata, b: Metadata) -> bool {
            match (a.conversion_factor(b), b.conversion_factor(a)) {
                (Ok((n1, d1)), Ok((n2, d2))) => n1 == d2 && d1 == n2,
                _ => true,
            }
        }

        fn prop_gcd_divides_both(a: Metadata, b: Metadata) -> bool {
            let linear = |m: Metadata| !m.unit().is_nonlinear();
            if !linear(a) || !linear(b) {
                return true;
            }
            // Both sides must convert into the common divisor without a
            // remainder, whenever the conversion factor itself fits.
            let exact = |m: Metadata, g: Metadata| {
                m.conversion_factor(g).map_or(true, |(_, den)| den == 1)
            };
            match Metadata::gcd(a, b, true, true) {
                Ok(g) => exact(a, g) && exact(b, g),
                Err(err) => err.is_overflow(),
            }
        }

        fn prop_divides_iff_safe_cast_is_lossless(
            src: Metadata,
            dst: Metadata
        ) -> bool {
            use crate::cast::timedelta;

            let linear = |m: Metadata| {
                !m.is_generic() && !m.unit().is_nonlinear()
            };
            if !linear(src) || !linear(dst) {
                return true;
            }
            // Keep the scaled multipliers clear of the overflow guard in
            // `divides`.
            let (big, little) = if src.unit() <= dst.unit() {
                (src.unit(), dst.unit())
            } else {
                (dst.unit(), src.unit())
            };
            match big.factor_to(little) {
                Some(factor) if factor <= 1_000_000_000 => {}
                _ => return true,
            }
            // One tick is enough: when `dst` doesn't divide `src`, one tick
            // of `src` is a fraction of some `dst` tick and rounds down.
            let round_trip = timedelta(src, dst, 1)
                .and_then(|there| timedelta(dst, src, there));
            src.divides(dst, true) == (round_trip.ok() == Some(1))
        }
    }
}
