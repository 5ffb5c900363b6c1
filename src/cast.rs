/*!
Casting rules between temporal metadata, and the casts themselves.

A [`Casting`] rule says how much a cast is allowed to change a value:

* [`Casting::No`] and [`Casting::Equiv`] only permit identical metadata.
* [`Casting::Safe`] permits a cast to a finer unit on the same side of the
same-kind barrier, provided the source metadata is a whole multiple of the
destination metadata. No precision is ever dropped.
* [`Casting::SameKind`] permits any cast that stays on the same side of the
same-kind barrier.
* [`Casting::Unsafe`] permits everything.

The same-kind barrier separates date units from time units. For instants,
days and everything coarser are date units. For durations, the barrier sits
between months and weeks instead, since a duration in weeks has a fixed
length and a duration in months doesn't.

NaT is never subject to these rules. The casting functions in this module
pass it through unchanged.

# Example

```
use scaledtime::{cast::{self, Casting}, Kind, Metadata, Unit};

let hour = Metadata::from_unit(Unit::Hour);
let day = Metadata::from_unit(Unit::Day);

// 25 hours can't be safely expressed in days.
assert!(!cast::can_cast_metadata(Kind::Datetime, hour, day, Casting::Safe));
assert!(cast::can_cast_metadata(Kind::Datetime, hour, day, Casting::Unsafe));
// An unsafe cast of an instant floors to the start of the day.
assert_eq!(cast::datetime(hour, day, 25)?, 1);

# Ok::<(), Box<dyn std::error::Error>>(())
```
*/

use crate::{
    civil::DateTime,
    error::{cast::Error as E, Error, ErrorContext},
    Kind, Metadata, Unit, NAT,
};

/// A rule governing which casts between metadata are permitted.
///
/// The variants are ordered from strictest to most permissive. The default
/// is [`Casting::SameKind`].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum Casting {
    /// Only identical metadata.
    No,
    /// Only identical metadata. There is no byte order for tick counts, so
    /// this is the same as [`Casting::No`].
    Equiv,
    /// Only casts that never lose precision.
    Safe,
    /// Only casts that stay on one side of the same-kind barrier.
    #[default]
    SameKind,
    /// Any cast at all.
    Unsafe,
}

impl Casting {
    /// Returns the name of this rule, e.g., `same_kind`.
    pub fn as_str(self) -> &'static str {
        match self {
            Casting::No => "no",
            Casting::Equiv => "equiv",
            Casting::Safe => "safe",
            Casting::SameKind => "same_kind",
            Casting::Unsafe => "unsafe",
        }
    }
}

impl core::fmt::Display for Casting {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Casting {
    type Err = Error;

    fn from_str(s: &str) -> Result<Casting, Error> {
        match s {
            "no" => Ok(Casting::No),
            "equiv" => Ok(Casting::Equiv),
            "safe" => Ok(Casting::Safe),
            "same_kind" => Ok(Casting::SameKind),
            "unsafe" => Ok(Casting::Unsafe),
            _ => Err(E::UnknownCasting.into()),
        }
    }
}

/// Returns true when a value of the given kind may be cast from the `src`
/// unit to the `dst` unit under the given rule.
///
/// Generic units may only be cast to generic units, except under
/// [`Casting::Unsafe`].
///
/// # Example
///
/// ```
/// use scaledtime::{cast::{self, Casting}, Kind, Unit};
///
/// let (week, hour) = (Unit::Week, Unit::Hour);
/// let (m8, dt) = (Kind::Timedelta, Kind::Datetime);
/// assert!(!cast::can_cast_units(dt, week, hour, Casting::SameKind));
/// assert!(cast::can_cast_units(m8, week, hour, Casting::SameKind));
/// assert!(!cast::can_cast_units(m8, hour, week, Casting::Safe));
/// ```
pub fn can_cast_units(
    kind: Kind,
    src: Unit,
    dst: Unit,
    casting: Casting,
) -> bool {
    let same_kind = || {
        if src == Unit::Generic || dst == Unit::Generic {
            src == dst
        } else {
            src.is_date_side(kind) == dst.is_date_side(kind)
        }
    };
    match casting {
        Casting::Unsafe => true,
        Casting::SameKind => same_kind(),
        Casting::Safe => same_kind() && src <= dst,
        Casting::No | Casting::Equiv => src == dst,
    }
}

/// Returns true when a value of the given kind may be cast from the `src`
/// metadata to the `dst` metadata under the given rule.
///
/// This composes [`can_cast_units`] with [`Metadata::divides`] for
/// [`Casting::Safe`]. Nonlinear units are handled strictly for durations
/// and optimistically for instants.
///
/// # Example
///
/// ```
/// use scaledtime::{cast::{self, Casting}, Kind, Metadata};
///
/// let ms10: Metadata = "[10ms]".parse()?;
/// let ms4: Metadata = "[4ms]".parse()?;
/// let ms5: Metadata = "[5ms]".parse()?;
/// let m8 = Kind::Timedelta;
/// assert!(cast::can_cast_metadata(m8, ms10, ms5, Casting::Safe));
/// assert!(!cast::can_cast_metadata(m8, ms10, ms4, Casting::Safe));
/// assert!(!cast::can_cast_metadata(m8, ms10, ms5, Casting::No));
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn can_cast_metadata(
    kind: Kind,
    src: Metadata,
    dst: Metadata,
    casting: Casting,
) -> bool {
    match casting {
        Casting::Unsafe => true,
        Casting::SameKind => {
            can_cast_units(kind, src.unit(), dst.unit(), casting)
        }
        Casting::Safe => {
            can_cast_units(kind, src.unit(), dst.unit(), casting)
                && src.divides(dst, kind == Kind::Timedelta)
        }
        Casting::No | Casting::Equiv => src == dst,
    }
}

/// Returns an error when [`can_cast_metadata`] rejects the cast.
///
/// `what` describes the value being cast, e.g., `"calendar date"`. It is
/// used only in the error message.
///
/// # Errors
///
/// This returns a casting error naming both metadata and the rule.
///
/// # Example
///
/// ```
/// use scaledtime::{cast::{self, Casting}, Kind, Metadata, Unit};
///
/// let hour = Metadata::from_unit(Unit::Hour);
/// let day = Metadata::from_unit(Unit::Day);
/// let err = cast::check_cast(
///     Kind::Datetime, "instant", hour, day, Casting::Safe,
/// ).unwrap_err();
/// assert_eq!(
///     err.to_string(),
///     "cannot cast instant from metadata [h] to [D] \
///      according to the rule 'safe'",
/// );
/// ```
pub fn check_cast(
    kind: Kind,
    what: &'static str,
    src: Metadata,
    dst: Metadata,
    casting: Casting,
) -> Result<(), Error> {
    if can_cast_metadata(kind, src, dst, casting) {
        return Ok(());
    }
    Err(E::Metadata { what, src, dst, casting }.into())
}

/// Casts an instant's tick count from `src` metadata to `dst` metadata.
///
/// This routes through the calendar, so it is exact wherever the
/// destination can represent the instant and floors otherwise. For example,
/// casting an instant to months truncates it to the start of its month.
/// Casting rules are not checked here. Use [`check_cast`] first.
///
/// NaT is returned unchanged.
///
/// # Errors
///
/// This returns an error when a non-NaT value has generic metadata on
/// either side, or when the result overflows.
///
/// # Example
///
/// ```
/// use scaledtime::{cast, Metadata, Unit, NAT};
///
/// let day = Metadata::from_unit(Unit::Day);
/// let month = Metadata::from_unit(Unit::Month);
/// // 2000-03-01 is in the 362nd month since the epoch.
/// assert_eq!(cast::datetime(day, month, 11_017)?, 362);
/// assert_eq!(cast::datetime(month, day, 362)?, 11_017);
/// assert_eq!(cast::datetime(Metadata::GENERIC, day, NAT)?, NAT);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn datetime(
    src: Metadata,
    dst: Metadata,
    value: i64,
) -> Result<i64, Error> {
    if src == dst {
        return Ok(value);
    }
    let dt = DateTime::from_scaled(src, value).context(E::Instant)?;
    dt.to_scaled(dst).context(E::Instant)
}

/// Casts a duration's tick count from `src` metadata to `dst` metadata.
///
/// This scales by the exact [`Metadata::conversion_factor`], rounding toward
/// negative infinity. Generic source metadata is taken as already being in
/// the destination units. Casting rules are not checked here. Use
/// [`check_cast`] first.
///
/// NaT is returned unchanged.
///
/// # Errors
///
/// This returns an error when `dst` is generic but `src` isn't, or when the
/// conversion factor or the result overflows.
///
/// # Example
///
/// ```
/// use scaledtime::{cast, Metadata, Unit};
///
/// let hour = Metadata::from_unit(Unit::Hour);
/// let day = Metadata::from_unit(Unit::Day);
/// assert_eq!(cast::timedelta(hour, day, 25)?, 1);
/// assert_eq!(cast::timedelta(hour, day, -25)?, -2);
/// assert_eq!(cast::timedelta(day, hour, -2)?, -48);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn timedelta(
    src: Metadata,
    dst: Metadata,
    value: i64,
) -> Result<i64, Error> {
    if src == dst || value == NAT {
        return Ok(value);
    }
    let (num, den) = src.conversion_factor(dst).context(E::Timedelta)?;
    let scaled =
        (i128::from(value) * i128::from(num)).div_euclid(i128::from(den));
    i64::try_from(scaled)
        .ok()
        .filter(|&scaled| scaled != NAT)
        .ok_or_else(|| E::Overflow { src, dst, value }.into())
}
