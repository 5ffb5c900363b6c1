/*!
Conversion between calendar datetimes and tick counts.

Every unit conversion of an instant passes through a
[`DateTime`](crate::civil::DateTime). Years and months are linear in the
year and month fields, so they don't need the day count. Weeks and business
days are affine transforms of the day count. Everything finer than a day
layers the time of day on top of the day count.

Tick counts are floored toward negative infinity when divided by a
multiplier, so that the tick containing an instant is always the one at or
before it.
*/

use crate::{
    civil::{self, DateTime},
    error::{civil::Error as E, Error},
    Metadata, Unit, NAT,
};

/// Converts a calendar datetime into a tick count under `meta`.
///
/// The datetime is truncated to the precision of `meta`. A NaT datetime
/// yields [`NAT`](crate::NAT) for any metadata.
///
/// # Errors
///
/// This returns an error for a non-NaT datetime with generic metadata, and
/// when the tick count doesn't fit in an `i64`.
///
/// # Example
///
/// ```
/// use scaledtime::{civil::DateTime, convert, Metadata, Unit};
///
/// let dt = DateTime::date(2000, 3, 1).at(12, 0, 0, 0);
/// let day = Metadata::from_unit(Unit::Day);
/// assert_eq!(convert::calendar_to_scaled(day, &dt)?, 11_017);
///
/// let hours: Metadata = "[5h]".parse()?;
/// let dt = DateTime::date(1969, 12, 31).at(23, 0, 0, 0);
/// assert_eq!(convert::calendar_to_scaled(hours, &dt)?, -1);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn calendar_to_scaled(
    meta: Metadata,
    dt: &DateTime,
) -> Result<i64, Error> {
    if dt.is_nat() {
        return Ok(NAT);
    }
    if meta.is_generic() {
        return Err(E::GenericToTicks.into());
    }
    ticks_in_unit(meta.unit(), dt)
        .map(|ticks| ticks.div_euclid(i64::from(meta.multiplier())))
        .filter(|&ticks| ticks != NAT)
        .ok_or_else(|| E::OverflowToTicks { meta }.into())
}

/// Converts a tick count under `meta` into a calendar datetime.
///
/// The result is the instant at the start of the tick. [`NAT`](crate::NAT)
/// yields [`DateTime::NAT`] for any metadata.
///
/// # Errors
///
/// This returns an error for a non-NaT value with generic metadata, and
/// when applying the multiplier overflows.
///
/// # Example
///
/// ```
/// use scaledtime::{civil::DateTime, convert, Metadata, Unit};
///
/// let ms: Metadata = "[ms]".parse()?;
/// let dt = convert::scaled_to_calendar(ms, -1)?;
/// assert_eq!(dt, DateTime::date(1969, 12, 31).at(23, 59, 59, 999_000));
///
/// let business: Metadata = "[B]".parse()?;
/// let dt = convert::scaled_to_calendar(business, 2)?;
/// assert_eq!(dt, DateTime::date(1970, 1, 5));
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn scaled_to_calendar(
    meta: Metadata,
    value: i64,
) -> Result<DateTime, Error> {
    use self::Unit::*;

    if value == NAT {
        return Ok(DateTime::NAT);
    }
    let overflow = || Error::from(E::OverflowToCalendar { meta, value });
    let ticks = value
        .checked_mul(i64::from(meta.multiplier()))
        .ok_or_else(overflow)?;

    let mut dt = DateTime::EPOCH;
    match meta.unit() {
        Generic => return Err(E::GenericToCalendar.into()),
        Year => {
            dt.year = ticks.checked_add(1970).ok_or_else(overflow)?;
        }
        Month => {
            dt.year =
                ticks.div_euclid(12).checked_add(1970).ok_or_else(overflow)?;
            // OK because `rem_euclid` is within `0..12`.
            dt.month = ticks.rem_euclid(12) as i32 + 1;
        }
        Week => {
            let days = ticks.checked_mul(7).ok_or_else(overflow)?;
            set_days(&mut dt, days);
        }
        BusinessDay => {
            let days = business_days_to_days(ticks).ok_or_else(overflow)?;
            trace!("business day {ticks} falls on epoch day {days}");
            set_days(&mut dt, days);
        }
        Day => set_days(&mut dt, ticks),
        Femtosecond => {
            const PER_MINUTE: i64 = 60_000_000_000_000_000;

            // The whole range of an `i64` in femtoseconds is about 2.6 hours
            // on either side of the epoch.
            let rem = ticks.rem_euclid(PER_MINUTE);
            // OK because this is at most 154 in magnitude.
            dt.add_minutes(ticks.div_euclid(PER_MINUTE) as i32)?;
            // OK because `rem` is less than a minute.
            dt.second = (rem / 1_000_000_000_000_000) as i32;
            dt.microsecond = ((rem / 1_000_000_000) % 1_000_000) as i32;
            dt.picosecond = ((rem / 1_000) % 1_000_000) as i32;
            dt.attosecond = ((rem % 1_000) * 1_000) as i32;
        }
        Attosecond => {
            const PER_SECOND: i64 = 1_000_000_000_000_000_000;

            // And in attoseconds, it's about 9.2 seconds.
            let rem = ticks.rem_euclid(PER_SECOND);
            // OK because this is at most 10 in magnitude.
            dt.add_seconds(ticks.div_euclid(PER_SECOND) as i32)?;
            // OK because `rem` is less than a second.
            dt.microsecond = (rem / 1_000_000_000_000) as i32;
            dt.picosecond = ((rem / 1_000_000) % 1_000_000) as i32;
            dt.attosecond = (rem % 1_000_000) as i32;
        }
        unit => {
            let (per_day, picos_per_tick) = sub_day_factors(unit);
            set_days(&mut dt, ticks.div_euclid(per_day));
            let picos = ticks.rem_euclid(per_day) * picos_per_tick;
            // OK because `picos` is less than a day.
            dt.hour = (picos / 3_600_000_000_000_000) as i32;
            dt.minute = ((picos / 60_000_000_000_000) % 60) as i32;
            dt.second = ((picos / 1_000_000_000_000) % 60) as i32;
            dt.microsecond = ((picos / 1_000_000) % 1_000_000) as i32;
            dt.picosecond = (picos % 1_000_000) as i32;
        }
    }
    Ok(dt)
}

/// Returns the number of whole `unit` ticks between the epoch and `dt`,
/// rounded toward negative infinity.
fn ticks_in_unit(unit: Unit, dt: &DateTime) -> Option<i64> {
    use self::Unit::*;

    let years = dt.year.checked_sub(1970)?;
    match unit {
        Year => return Some(years),
        Month => {
            return years.checked_mul(12)?.checked_add(i64::from(dt.month - 1))
        }
        _ => {}
    }

    let days = civil::days_since_epoch(dt)?;
    match unit {
        Week => return Some(days.div_euclid(7)),
        BusinessDay => {
            let business = civil::business_days_between(0, days);
            trace!("epoch day {days} is business day {business}");
            return Some(business);
        }
        Day => return Some(days),
        _ => {}
    }

    let step = |ticks: i64, factor: i64, field: i32| {
        ticks.checked_mul(factor)?.checked_add(i64::from(field))
    };
    let hours = step(days, 24, dt.hour)?;
    let minutes = step(hours, 60, dt.minute)?;
    let seconds = step(minutes, 60, dt.second)?;
    match unit {
        Hour => return Some(hours),
        Minute => return Some(minutes),
        Second => return Some(seconds),
        Millisecond => return step(seconds, 1_000, dt.microsecond / 1_000),
        _ => {}
    }
    let micros = step(seconds, 1_000_000, dt.microsecond)?;
    match unit {
        Microsecond => return Some(micros),
        Nanosecond => return step(micros, 1_000, dt.picosecond / 1_000),
        _ => {}
    }
    let picos = step(micros, 1_000_000, dt.picosecond)?;
    match unit {
        Picosecond => Some(picos),
        Femtosecond => step(picos, 1_000, dt.attosecond / 1_000),
        _ => step(picos, 1_000_000, dt.attosecond),
    }
}

/// Returns the number of ticks per day and the number of picoseconds per
/// tick for the units from hours to picoseconds.
fn sub_day_factors(unit: Unit) -> (i64, i64) {
    match unit {
        Unit::Hour => (24, 3_600_000_000_000_000),
        Unit::Minute => (1_440, 60_000_000_000_000),
        Unit::Second => (86_400, 1_000_000_000_000),
        Unit::Millisecond => (86_400_000, 1_000_000_000),
        Unit::Microsecond => (86_400_000_000, 1_000_000),
        Unit::Nanosecond => (86_400_000_000_000, 1_000),
        _ => (86_400_000_000_000_000, 1),
    }
}

/// Maps a count of business days since the epoch to a count of days.
///
/// Business day `0` is the epoch itself, which was a Thursday.
fn business_days_to_days(business: i64) -> Option<i64> {
    // Shift so that Monday is at a multiple of 5.
    let shifted = business.checked_add(3)?;
    7i64.checked_mul(shifted.div_euclid(5))?
        .checked_add(shifted.rem_euclid(5) - 3)
}

fn set_days(dt: &mut DateTime, days: i64) {
    let (year, month, day) = civil::epoch_days_to_calendar(days);
    dt.year = year;
    dt.month = month;
    dt.day = day;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(s: &str) -> Metadata {
        s.parse().unwrap()
    }

    fn to(s: &str, dt: DateTime) -> i64 {
        calendar_to_scaled(meta(s), &dt).unwrap()
    }

    fn from(s: &str, value: i64) -> DateTime {
        scaled_to_calendar(meta(s), value).unwrap()
    }

    #[test]
    fn to_ticks() {
        let dt = DateTime::date(2011, 3, 15).at(10, 30, 45, 250_123);

        assert_eq!(to("[Y]", dt), 41);
        assert_eq!(to("[M]", dt), 494);
        assert_eq!(to("[W]", dt), 2149);
        assert_eq!(to("[D]", dt), 15_048);
        assert_eq!(to("[B]", dt), 10_748);
        assert_eq!(to("[h]", dt), 361_162);
        assert_eq!(to("[m]", dt), 21_669_750);
        assert_eq!(to("[s]", dt), 1_300_185_045);
        assert_eq!(to("[ms]", dt), 1_300_185_045_250);
        assert_eq!(to("[us]", dt), 1_300_185_045_250_123);
        assert_eq!(to("[ns]", dt), 1_300_185_045_250_123_000);
        let err = calendar_to_scaled(meta("[ps]"), &dt).unwrap_err();
        assert!(err.is_overflow());

        let mut dt = DateTime::EPOCH.at(0, 0, 1, 2);
        dt.picosecond = 3_004;
        dt.attosecond = 5_006;
        assert_eq!(to("[ps]", dt), 1_000_002_003_004);
        assert_eq!(to("[fs]", dt), 1_000_002_003_004_005);
        assert_eq!(to("[as]", dt), 1_000_002_003_004_005_006);
    }

    #[test]
    fn multipliers_floor() {
        let before = DateTime::date(1969, 12, 31).at(23, 0, 0, 0);
        assert_eq!(to("[2h]", before), -1);
        assert_eq!(to("[2h]", DateTime::EPOCH.at(1, 59, 0, 0)), 0);
        assert_eq!(to("[3D]", DateTime::date(1969, 12, 29)), -1);
        assert_eq!(to("[3D]", DateTime::date(1969, 12, 28)), -2);
        assert_eq!(to("[10Y]", DateTime::date(1969, 1, 1)), -1);
    }

    #[test]
    fn from_ticks() {
        assert_eq!(from("[Y]", -1), DateTime::date(1969, 1, 1));
        assert_eq!(from("[M]", -1), DateTime::date(1969, 12, 1));
        assert_eq!(from("[M]", 494), DateTime::date(2011, 3, 1));
        assert_eq!(from("[W]", -1), DateTime::date(1969, 12, 25));
        assert_eq!(from("[B]", -1), DateTime::date(1969, 12, 31));
        assert_eq!(from("[B]", -3), DateTime::date(1969, 12, 29));
        assert_eq!(from("[B]", -4), DateTime::date(1969, 12, 26));
        assert_eq!(from("[D]", 11_017), DateTime::date(2000, 3, 1));
        assert_eq!(
            from("[h]", -1),
            DateTime::date(1969, 12, 31).at(23, 0, 0, 0),
        );
        assert_eq!(from("[90m]", 1), DateTime::EPOCH.at(1, 30, 0, 0));
        assert_eq!(
            from("[us]", 1_300_185_045_250_123),
            DateTime::date(2011, 3, 15).at(10, 30, 45, 250_123),
        );

        let mut expected =
            DateTime::date(1969, 12, 31).at(23, 59, 59, 999_999);
        expected.picosecond = 999_000;
        assert_eq!(from("[ns]", -1), expected);

        let mut expected =
            DateTime::date(1969, 12, 31).at(23, 59, 59, 999_999);
        expected.picosecond = 999_999;
        expected.attosecond = 999_000;
        assert_eq!(from("[fs]", -1), expected);
        expected.attosecond = 999_999;
        assert_eq!(from("[as]", -1), expected);

        // The largest femtosecond tick is a little after 2:33am.
        let dt = from("[fs]", i64::MAX);
        assert_eq!((dt.hour, dt.minute, dt.second), (2, 33, 43));
    }

    #[test]
    fn nat_and_generic() {
        let generic = Metadata::GENERIC;
        assert_eq!(calendar_to_scaled(generic, &DateTime::NAT).unwrap(), NAT);
        assert_eq!(scaled_to_calendar(generic, NAT).unwrap(), DateTime::NAT);
        assert_eq!(
            scaled_to_calendar(meta("[D]"), NAT).unwrap(),
            DateTime::NAT,
        );

        let err = calendar_to_scaled(Metadata::GENERIC, &DateTime::EPOCH)
            .unwrap_err();
        assert!(err.is_value());
        insta::assert_snapshot!(
            err,
            @"cannot create an instant other than NaT with generic units",
        );
        let err = scaled_to_calendar(Metadata::GENERIC, 0).unwrap_err();
        assert!(err.is_value());
    }

    #[test]
    fn overflow() {
        let err = scaled_to_calendar(meta("[2D]"), i64::MAX).unwrap_err();
        assert!(err.is_overflow());
        insta::assert_snapshot!(
            err,
            @"value 9223372036854775807 with metadata [2D] overflows when converted to a calendar datetime",
        );
        let err = scaled_to_calendar(meta("[Y]"), i64::MAX).unwrap_err();
        assert!(err.is_overflow());

        let dt = DateTime::date(2262, 4, 12);
        let err = calendar_to_scaled(meta("[ns]"), &dt).unwrap_err();
        assert!(err.is_overflow());
        insta::assert_snapshot!(
            err,
            @"calendar datetime overflows when converted to a tick count with metadata [ns]",
        );
        let last = DateTime::date(2262, 4, 11);
        assert!(calendar_to_scaled(meta("[ns]"), &last).is_ok());
    }

    quickcheck::quickcheck! {
        fn prop_days_round_trip(days: i32) -> bool {
            let days = i64::from(days);
            let day = Metadata::from_unit(Unit::Day);
            scaled_to_calendar(day, days)
                .and_then(|dt| calendar_to_scaled(day, &dt))
                .ok() == Some(days)
        }

        fn prop_business_days_round_trip(business: i32) -> bool {
            let business = i64::from(business);
            let meta = Metadata::from_unit(Unit::BusinessDay);
            scaled_to_calendar(meta, business)
                .and_then(|dt| calendar_to_scaled(meta, &dt))
                .ok() == Some(business)
        }

        fn prop_linear_round_trip(meta: Metadata, value: i32) -> bool {
            let value = i64::from(value);
            let Ok(dt) = scaled_to_calendar(meta, value) else { return true };
            calendar_to_scaled(meta, &dt).ok() == Some(value)
        }
    }
}
