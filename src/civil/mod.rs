/*!
Proleptic Gregorian calendar arithmetic.

This module provides the pure functions that every unit conversion in this
crate routes through: counting the days between a calendar date and the Unix
epoch (1970-01-01), decomposing a day count back into a date, and counting
weekdays. It also provides [`DateTime`], the decomposed calendar struct that
acts as the intermediate form when converting between units.

None of the routines here have a limited year range. Years are signed 64-bit
integers and day counts are signed 64-bit integers. Any arithmetic that could
overflow is checked.

# Example

```
use scaledtime::civil::{self, DateTime};

let days = civil::days_since_epoch(&DateTime::date(2000, 3, 1)).unwrap();
assert_eq!(days, 11017);
assert_eq!(civil::epoch_days_to_calendar(days), (2000, 3, 1));
// 2000-03-01 was a Wednesday.
assert_eq!(civil::weekday_index(days), 2);
```
*/

pub use self::datetime::DateTime;

mod datetime;

/// The number of days in 400 Gregorian years. The calendar repeats exactly
/// on this period.
const DAYS_PER_400_YEARS: i64 = 146_097;

/// The number of days from 1970-01-01 to 2000-01-01. The latter is the start
/// of a 400 year cycle.
const DAYS_FROM_1970_TO_2000: i64 = 10_957;

/// The number of days in each month, indexed by leap year and then by the
/// zero based month.
const DAYS_PER_MONTH: [[i32; 12]; 2] = [
    [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31],
    [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31],
];

/// Returns true if and only if the given year is a leap year.
///
/// A leap year is a year with 366 days. Typical years have 365 days.
///
/// # Example
///
/// ```
/// use scaledtime::civil::is_leap_year;
///
/// assert!(is_leap_year(2024));
/// assert!(is_leap_year(2000));
/// assert!(!is_leap_year(1900));
/// assert!(!is_leap_year(2023));
/// assert!(is_leap_year(-4));
/// ```
#[inline]
pub const fn is_leap_year(year: i64) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Returns the number of days in the given month of the given year.
///
/// The month should be in the range `1..=12`. Months outside that range are
/// clamped into it.
///
/// # Example
///
/// ```
/// use scaledtime::civil::days_in_month;
///
/// assert_eq!(days_in_month(2024, 2), 29);
/// assert_eq!(days_in_month(2023, 2), 28);
/// assert_eq!(days_in_month(2023, 12), 31);
/// ```
#[inline]
pub fn days_in_month(year: i64, month: i32) -> i32 {
    debug_assert!((1..=12).contains(&month), "invalid month {month}");
    let month = month.clamp(1, 12);
    DAYS_PER_MONTH[usize::from(is_leap_year(year))][(month - 1) as usize]
}

/// Returns the number of days from 1970-01-01 to the date in `dt`.
///
/// Only the year, month and day of `dt` are used. The month and day are
/// assumed to be valid. Dates before the epoch return a negative count.
///
/// This returns `None` when the year is so far from 1970 that the number of
/// days doesn't fit in a signed 64-bit integer.
///
/// # Example
///
/// ```
/// use scaledtime::civil::{days_since_epoch, DateTime};
///
/// assert_eq!(days_since_epoch(&DateTime::date(1970, 1, 1)), Some(0));
/// assert_eq!(days_since_epoch(&DateTime::date(1969, 12, 31)), Some(-1));
/// assert_eq!(days_since_epoch(&DateTime::date(2000, 3, 1)), Some(11017));
/// assert_eq!(days_since_epoch(&DateTime::date(i64::MAX, 1, 1)), None);
/// ```
pub fn days_since_epoch(dt: &DateTime) -> Option<i64> {
    // Every intermediate value fits in an `i128`, even for the extreme
    // years. Only the final count is checked.
    let mut year = i128::from(dt.year) - 1970;
    let mut days = year * 365;
    // Leap days are counted from the nearest cycle boundaries on the same
    // side of the epoch, so that truncating division never has to round a
    // negative quotient.
    if days >= 0 {
        // 1968 is the last leap year before 1970. The current year is
        // excluded.
        year += 1;
        days += year / 4;
        // 1900 is the last year before 1970 divisible by 100.
        year += 68;
        days -= year / 100;
        // 1600 is the last year before 1970 divisible by 400.
        year += 300;
        days += year / 400;
    } else {
        // 1972 is the first leap year after 1970. The current year is
        // included.
        year -= 2;
        days += year / 4;
        // 2000 is the first year after 1970 divisible by 100, and by 400.
        year -= 28;
        days -= year / 100;
        days += year / 400;
    }
    let leap = usize::from(is_leap_year(dt.year));
    let month = dt.month.clamp(1, 12) as usize;
    for &len in &DAYS_PER_MONTH[leap][..month - 1] {
        days += i128::from(len);
    }
    days += i128::from(dt.day) - 1;
    i64::try_from(days).ok()
}

/// Decomposes a number of days since 1970-01-01 into a `(year, month, day)`
/// triple.
///
/// This is the inverse of [`days_since_epoch`] and is defined for every
/// `i64`.
///
/// # Example
///
/// ```
/// use scaledtime::civil::epoch_days_to_calendar;
///
/// assert_eq!(epoch_days_to_calendar(0), (1970, 1, 1));
/// assert_eq!(epoch_days_to_calendar(-1), (1969, 12, 31));
/// assert_eq!(epoch_days_to_calendar(11017), (2000, 3, 1));
/// assert_eq!(epoch_days_to_calendar(-719_528), (0, 1, 1));
/// ```
pub fn epoch_days_to_calendar(days: i64) -> (i64, i32, i32) {
    let (year, mut day_of_year) = days_to_year_and_day(days);
    let lengths = &DAYS_PER_MONTH[usize::from(is_leap_year(year))];
    let mut month = 1;
    for &len in lengths.iter() {
        if day_of_year < len {
            break;
        }
        day_of_year -= len;
        month += 1;
    }
    (year, month, day_of_year + 1)
}

/// Splits a number of days since 1970-01-01 into a year and a zero based day
/// of that year.
///
/// This works by cascading through the 400, 100, 4 and 1 year periods of
/// the Gregorian calendar, starting at 2000-01-01.
fn days_to_year_and_day(days: i64) -> (i64, i32) {
    // Splitting off whole cycles first keeps every intermediate value small,
    // so this is defined for all of `i64`.
    let cycles = days.div_euclid(DAYS_PER_400_YEARS);
    let mut days =
        days.rem_euclid(DAYS_PER_400_YEARS) - DAYS_FROM_1970_TO_2000;
    let mut year = 2000 + 400 * cycles;
    if days < 0 {
        days += DAYS_PER_400_YEARS;
        year -= 400;
    }
    // The first year of a 400 year cycle is a leap year, and so is the first
    // year of every 4 year period. The first year of the other 100 year
    // periods is not.
    if days >= 366 {
        year += 100 * ((days - 1) / 36_524);
        days = (days - 1) % 36_524;
        if days >= 365 {
            year += 4 * ((days + 1) / 1_461);
            days = (days + 1) % 1_461;
            if days >= 366 {
                year += (days - 1) / 365;
                days = (days - 1) % 365;
            }
        }
    }
    trace!("decomposed epoch days into year {year} and day of year {days}");
    // OK because `days` is now less than 366.
    (year, days as i32)
}

/// Returns the day of the week for the given number of days since
/// 1970-01-01, where Monday is `0` and Sunday is `6`.
///
/// # Example
///
/// ```
/// use scaledtime::civil::weekday_index;
///
/// // 1970-01-01 was a Thursday.
/// assert_eq!(weekday_index(0), 3);
/// assert_eq!(weekday_index(4), 0);
/// assert_eq!(weekday_index(-1), 2);
/// assert_eq!(weekday_index(i64::MIN), 2);
/// ```
#[inline]
pub fn weekday_index(days: i64) -> i32 {
    // OK because `rem_euclid` is in `0..7`.
    ((days.rem_euclid(7) + 3) % 7) as i32
}

/// Returns the number of weekdays (Monday through Friday) after `first` up
/// to and including `second`, where both are days since 1970-01-01.
///
/// When `second` comes before `first`, the count is negated. A Saturday or a
/// Sunday counts the same as the Friday before it, so this is also the
/// number of business days to move from `first` to reach `second` (rounded
/// down when `second` is on a weekend).
///
/// # Example
///
/// ```
/// use scaledtime::civil::business_days_between;
///
/// // Thursday to the following Thursday.
/// assert_eq!(business_days_between(0, 7), 5);
/// // Thursday to Monday.
/// assert_eq!(business_days_between(0, 4), 2);
/// // Thursday to Saturday.
/// assert_eq!(business_days_between(0, 2), 1);
/// // Saturday to Sunday.
/// assert_eq!(business_days_between(2, 3), 0);
/// assert_eq!(business_days_between(4, 0), -2);
/// ```
pub fn business_days_between(first: i64, second: i64) -> i64 {
    let (first, second, sign) =
        if second < first { (second, first, -1) } else { (first, second, 1) };
    let (first, dow_first) = back_to_friday(first);
    let (second, mut dow_second) = back_to_friday(second);
    if dow_second < dow_first {
        dow_second += 5;
    }
    let weeks = (second - first) / 7;
    let count = sign * (weeks * 5 + i128::from(dow_second - dow_first));
    trace!("counted {count} weekdays between epoch days {first} and {second}");
    // Only day counts more than `i64::MAX` apart can saturate.
    i64::try_from(count)
        .unwrap_or(if count < 0 { i64::MIN } else { i64::MAX })
}

/// Moves a Saturday or Sunday back to the Friday before it, and returns the
/// adjusted day along with its weekday index.
fn back_to_friday(days: i64) -> (i128, i32) {
    let dow = weekday_index(days);
    let shift = (dow - 4).max(0);
    (i128::from(days) - i128::from(shift), dow - shift)
}
