/*!
The boundary between this crate and a host's dynamic values.

Conversions in [`ingest`](crate::ingest) and [`range`](crate::range) accept
arbitrary host values: text, integers, calendar and duration objects from a
host date library, already typed temporal scalars, containers and so on. A
host describes each of its values to this crate as a [`Value`], which
borrows whatever it needs from the host.

Containers are described through the [`Sequence`] trait (for generic
sequences that may even contain themselves) and [`TextArray`] (for packed
fixed-width text). Host time zones are described through [`FromUtc`].

# Example

```
use scaledtime::{host::{CalendarLike, Value}, ingest::Converter, Unit};

let value = Value::Calendar(CalendarLike::date(2011, 3, 15).at(10, 30, 0, 0));
let instant = Converter::new().instant(value)?;
assert_eq!(instant.metadata().unit(), Unit::Microsecond);
assert_eq!(instant.to_string(), "2011-03-15T10:30:00.000000");

# Ok::<(), Box<dyn std::error::Error>>(())
```
*/

use alloc::vec::Vec;

use crate::{
    civil::{self, DateTime},
    error::{host::Error as E, Error},
    Instant, TemporalType, Timedelta, NAT,
};

/// A host value, as seen by this crate.
///
/// Values are cheap to copy. Anything that isn't a plain scalar is borrowed
/// from the host.
#[derive(Clone, Copy)]
pub enum Value<'a> {
    /// The host's "no value" (e.g., `None`).
    Missing,
    /// A text or byte string.
    Text(&'a [u8]),
    /// A plain integer.
    Integer(i64),
    /// A calendar date or datetime object.
    Calendar(CalendarLike),
    /// A duration object made of days, seconds and microseconds.
    Duration(DurationLike),
    /// An already typed instant scalar.
    Instant(Instant),
    /// An already typed duration scalar.
    Timedelta(Timedelta),
    /// A typed array of temporal values. Only its element type matters to
    /// this crate.
    Array(TemporalType),
    /// A packed array of fixed-width text elements.
    TextArray(TextArray<'a>),
    /// A generic sequence of values.
    Sequence(&'a dyn Sequence),
    /// A fixed-size record (tuple) of values.
    Record(&'a [Value<'a>]),
    /// Anything else.
    Other,
}

impl<'a> Value<'a> {
    /// Returns a short name for the shape of this value, as used in error
    /// messages.
    pub(crate) fn shape(&self) -> &'static str {
        match *self {
            Value::Missing => "missing value",
            Value::Text(_) => "text value",
            Value::Integer(_) => "integer",
            Value::Calendar(_) => "calendar value",
            Value::Duration(_) => "duration value",
            Value::Instant(_) => "instant",
            Value::Timedelta(_) => "timedelta",
            Value::Array(_) => "typed array",
            Value::TextArray(_) => "text array",
            Value::Sequence(_) => "sequence",
            Value::Record(_) => "record",
            Value::Other => "unrecognized value",
        }
    }

    /// Returns true for container shapes.
    pub(crate) fn is_container(&self) -> bool {
        matches!(
            *self,
            Value::Array(_)
                | Value::TextArray(_)
                | Value::Sequence(_)
                | Value::Record(_)
        )
    }
}

impl<'a> core::fmt::Debug for Value<'a> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use crate::util::escape;

        match *self {
            Value::Missing => f.write_str("Missing"),
            Value::Text(text) => {
                f.debug_tuple("Text").field(&escape::Bytes(text)).finish()
            }
            Value::Integer(n) => f.debug_tuple("Integer").field(&n).finish(),
            Value::Calendar(ref c) => {
                f.debug_tuple("Calendar").field(c).finish()
            }
            Value::Duration(ref d) => {
                f.debug_tuple("Duration").field(d).finish()
            }
            Value::Instant(ref i) => {
                f.debug_tuple("Instant").field(i).finish()
            }
            Value::Timedelta(ref t) => {
                f.debug_tuple("Timedelta").field(t).finish()
            }
            Value::Array(ref ty) => f.debug_tuple("Array").field(ty).finish(),
            Value::TextArray(ref arr) => {
                f.debug_tuple("TextArray").field(arr).finish()
            }
            Value::Sequence(seq) => f
                .debug_struct("Sequence")
                .field("len", &seq.len())
                .finish_non_exhaustive(),
            Value::Record(values) => {
                f.debug_tuple("Record").field(&values).finish()
            }
            Value::Other => f.write_str("Other"),
        }
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(text: &'a str) -> Value<'a> {
        Value::Text(text.as_bytes())
    }
}

impl<'a> From<&'a [u8]> for Value<'a> {
    fn from(text: &'a [u8]) -> Value<'a> {
        Value::Text(text)
    }
}

impl From<i64> for Value<'static> {
    fn from(n: i64) -> Value<'static> {
        Value::Integer(n)
    }
}

impl From<CalendarLike> for Value<'static> {
    fn from(cal: CalendarLike) -> Value<'static> {
        Value::Calendar(cal)
    }
}

impl From<DurationLike> for Value<'static> {
    fn from(dur: DurationLike) -> Value<'static> {
        Value::Duration(dur)
    }
}

impl From<Instant> for Value<'static> {
    fn from(instant: Instant) -> Value<'static> {
        Value::Instant(instant)
    }
}

impl From<Timedelta> for Value<'static> {
    fn from(td: Timedelta) -> Value<'static> {
        Value::Timedelta(td)
    }
}

/// A host calendar date, or a calendar datetime when it has a time of day.
///
/// The fields are exactly what the host object carries and are validated
/// during ingestion, not here. The offset, when present, is the number of
/// minutes east of UTC that the fields are expressed in. A host with time
/// zone objects can compute it with [`tz_offset_minutes`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CalendarLike {
    pub year: i64,
    pub month: i64,
    pub day: i64,
    pub time: Option<TimeOfDay>,
    pub offset_minutes: Option<i32>,
}

impl CalendarLike {
    /// Creates a calendar date.
    pub const fn date(year: i64, month: i64, day: i64) -> CalendarLike {
        CalendarLike { year, month, day, time: None, offset_minutes: None }
    }

    /// Returns this value as a calendar datetime at the given time of day.
    pub const fn at(
        self,
        hour: i64,
        minute: i64,
        second: i64,
        microsecond: i64,
    ) -> CalendarLike {
        let time = TimeOfDay { hour, minute, second, microsecond };
        CalendarLike { time: Some(time), ..self }
    }

    /// Returns this value with the given UTC offset, in minutes east of UTC.
    pub const fn offset(self, minutes: i32) -> CalendarLike {
        CalendarLike { offset_minutes: Some(minutes), ..self }
    }

    /// Returns true when this is a datetime rather than a date.
    pub fn is_datetime(&self) -> bool {
        self.time.is_some()
    }
}

/// The time of day of a host calendar datetime.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TimeOfDay {
    pub hour: i64,
    pub minute: i64,
    pub second: i64,
    pub microsecond: i64,
}

/// A host duration, made of days, seconds and microseconds.
///
/// When produced by this crate, `seconds` is in `0..86_400` and
/// `microseconds` is in `0..1_000_000`, so that negative durations have a
/// negative day count.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DurationLike {
    pub days: i64,
    pub seconds: i64,
    pub microseconds: i64,
}

impl DurationLike {
    /// Returns the total number of microseconds in this duration.
    ///
    /// # Errors
    ///
    /// This returns an overflow error when the total doesn't fit in an
    /// `i64` or collides with the NaT sentinel.
    ///
    /// # Example
    ///
    /// ```
    /// use scaledtime::host::DurationLike;
    ///
    /// let dur =
    ///     DurationLike { days: -1, seconds: 86_399, microseconds: 500_000 };
    /// assert_eq!(dur.total_microseconds()?, -500_000);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn total_microseconds(&self) -> Result<i64, Error> {
        let DurationLike { days, seconds, microseconds } = *self;
        days.checked_mul(86_400_000_000)
            .and_then(|us| us.checked_add(seconds.checked_mul(1_000_000)?))
            .and_then(|us| us.checked_add(microseconds))
            .filter(|&us| us != NAT)
            .ok_or_else(|| {
                E::DurationOverflow { days, seconds, microseconds }.into()
            })
    }
}

/// A host sequence of values.
///
/// A sequence may contain itself. Routines that walk sequences stop when
/// they find an element that is the sequence being walked.
pub trait Sequence {
    /// Returns the number of elements in this sequence.
    fn len(&self) -> usize;

    /// Returns the element at the given index.
    ///
    /// This is only called with an index less than `len()`.
    fn get(&self, index: usize) -> Value<'_>;
}

impl<'a, const N: usize> Sequence for [Value<'a>; N] {
    fn len(&self) -> usize {
        N
    }

    fn get(&self, index: usize) -> Value<'_> {
        self[index]
    }
}

impl<'a> Sequence for Vec<Value<'a>> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get(&self, index: usize) -> Value<'_> {
        self[index]
    }
}

/// Returns true when `value` is the sequence `seq` itself.
pub(crate) fn is_same_sequence(seq: &dyn Sequence, value: &Value<'_>) -> bool {
    match *value {
        Value::Sequence(other) => core::ptr::eq(
            seq as *const dyn Sequence as *const u8,
            other as *const dyn Sequence as *const u8,
        ),
        _ => false,
    }
}

/// A packed array of fixed-width text elements.
///
/// Each element occupies exactly `width` bytes. Elements shorter than the
/// width are padded with NUL bytes, which are not part of the element. A
/// trailing partial element is ignored.
///
/// # Example
///
/// ```
/// use scaledtime::host::TextArray;
///
/// let arr = TextArray::new(b"2011\0\0\0NaT\0\0\0\02011-03", 7);
/// assert_eq!(arr.len(), 3);
/// assert_eq!(arr.get(0), Some(&b"2011"[..]));
/// assert_eq!(arr.get(1), Some(&b"NaT"[..]));
/// assert_eq!(arr.get(2), Some(&b"2011-03"[..]));
/// assert_eq!(arr.get(3), None);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct TextArray<'a> {
    data: &'a [u8],
    width: usize,
}

impl<'a> TextArray<'a> {
    /// Creates a text array over `data` with elements of `width` bytes.
    pub const fn new(data: &'a [u8], width: usize) -> TextArray<'a> {
        TextArray { data, width }
    }

    /// Returns the width, in bytes, of each element.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.data.len().checked_div(self.width).unwrap_or(0)
    }

    /// Returns true when there are no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the element at the given index, without its NUL padding.
    pub fn get(&self, index: usize) -> Option<&'a [u8]> {
        if index >= self.len() {
            return None;
        }
        let start = index * self.width;
        let field = &self.data[start..start + self.width];
        let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
        Some(&field[..end])
    }

    /// Returns an iterator over every element, without NUL padding.
    pub fn iter(&self) -> impl Iterator<Item = &'a [u8]> + 'a {
        let arr = *self;
        (0..arr.len()).filter_map(move |i| arr.get(i))
    }
}

/// A host time zone that can convert a UTC datetime into local time.
///
/// Closures of the right shape implement this trait.
pub trait FromUtc {
    /// Returns the local datetime corresponding to the UTC datetime given,
    /// or `None` when the zone cannot convert it.
    fn from_utc(&self, utc: &DateTime) -> Option<DateTime>;
}

impl<F: Fn(&DateTime) -> Option<DateTime>> FromUtc for F {
    fn from_utc(&self, utc: &DateTime) -> Option<DateTime> {
        self(utc)
    }
}

/// Returns the UTC offset, in minutes east of UTC, of the time zone `tz` at
/// the given UTC datetime.
///
/// The datetime is truncated to the minute before it is given to the zone.
///
/// # Errors
///
/// This returns a value error when the zone fails to convert the datetime,
/// and an overflow error when the offset doesn't fit in an `i32`.
///
/// # Example
///
/// ```
/// use scaledtime::{civil::DateTime, host};
///
/// // A fixed zone five and a half hours east of UTC.
/// let zone = |utc: &DateTime| {
///     let mut local = *utc;
///     local.add_minutes(330).ok()?;
///     Some(local)
/// };
/// let utc = DateTime::date(2011, 3, 15).at(23, 59, 59, 999_999);
/// assert_eq!(host::tz_offset_minutes(&zone, &utc)?, 330);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn tz_offset_minutes(
    tz: &dyn FromUtc,
    utc: &DateTime,
) -> Result<i32, Error> {
    let utc = DateTime {
        second: 0,
        microsecond: 0,
        picosecond: 0,
        attosecond: 0,
        ..*utc
    };
    let local =
        tz.from_utc(&utc).ok_or_else(|| E::ZoneConversion { utc })?;
    let minutes = |dt: &DateTime| -> Option<i64> {
        civil::days_since_epoch(dt)?
            .checked_mul(1440)?
            .checked_add(i64::from(dt.hour) * 60 + i64::from(dt.minute))
    };
    minutes(&local)
        .zip(minutes(&utc))
        .and_then(|(local, utc)| local.checked_sub(utc))
        .and_then(|diff| i32::try_from(diff).ok())
        .ok_or_else(|| E::OffsetOverflow.into())
}
