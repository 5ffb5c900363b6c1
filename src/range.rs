/*!
Evenly spaced ranges of instants and timedeltas.

[`arange`] is the temporal counterpart of an integer range: it converts its
endpoints and step into one shared metadata and then steps from the start
toward the stop, excluding the stop.

# Example

```
use scaledtime::{host::Value, range, Instant, Metadata};

let day: Metadata = "[D]".parse()?;
let range = range::arange(
    Some(Value::Instant(Instant::new(day, 0))),
    Some(Value::Instant(Instant::new(day, 10))),
    Some(Value::Integer(3)),
    None,
)?;
assert_eq!(range.ty().to_string(), "datetime64[D]");
assert_eq!(range.values(), [0, 3, 6, 9]);

# Ok::<(), Box<dyn std::error::Error>>(())
```
*/

use alloc::vec::Vec;

use crate::{
    cast::Casting,
    error::{range::Error as E, Error},
    host::Value,
    ingest::Converter,
    Kind, TemporalType, NAT,
};

/// The output of [`arange`]: the temporal type of the range and its tick
/// counts.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Range {
    ty: TemporalType,
    values: Vec<i64>,
}

impl Range {
    /// Returns the temporal type that every value in this range has.
    #[inline]
    pub fn ty(&self) -> TemporalType {
        self.ty
    }

    /// Returns the tick counts of this range.
    #[inline]
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    /// Returns the tick counts of this range, consuming it.
    #[inline]
    pub fn into_values(self) -> Vec<i64> {
        self.values
    }

    /// Returns the number of values in this range.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when this range has no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Generates the values from `start` up to, but excluding, `stop` in
/// increments of `step`.
///
/// A missing value (either `None` or [`Value::Missing`]) counts as absent.
/// When only one endpoint is given, it is the stop. The step defaults to
/// one tick.
///
/// When `ty` is given with non-generic metadata, every value is converted
/// into that metadata. Otherwise the metadata is detected from the values,
/// as [`Converter::values`] does. The kind of range comes from `ty` when
/// given, and otherwise is an instant range when either endpoint is an
/// instant, a calendar value or an instant array, and a timedelta range
/// otherwise.
///
/// An instant range needs a start. Its stop may be an integer or a duration
/// instead of an instant, in which case the stop is that far past the
/// start. A timedelta range without a start starts at zero. All conversions
/// use [`Casting::SameKind`].
///
/// # Errors
///
/// This returns a value error when there is no stop, when the step is an
/// instant, when an instant range has no start, when any bound is NaT or
/// when the step is zero. Errors from converting the values are returned as
/// is. Overflow while computing the bounds is an overflow error.
///
/// # Example
///
/// ```
/// use scaledtime::{host::{DurationLike, Value}, range, TemporalType};
///
/// // A start as text needs a type to be read as an instant.
/// let ty: TemporalType = "datetime64".parse()?;
/// let hour = DurationLike { days: 0, seconds: 3_600, microseconds: 0 };
/// let range = range::arange(
///     Some(Value::from("2011-03-15T10:30")),
///     Some(Value::from("2011-03-15T13:00")),
///     Some(Value::Duration(hour)),
///     Some(ty),
/// )?;
/// assert_eq!(range.ty().to_string(), "datetime64[us]");
/// assert_eq!(range.len(), 3);
///
/// // A single value is the stop of a range starting at zero.
/// let range = range::arange(Some(Value::Integer(4)), None, None, None)?;
/// assert_eq!(range.ty().to_string(), "timedelta64");
/// assert_eq!(range.values(), [0, 1, 2, 3]);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn arange<'a>(
    start: Option<Value<'a>>,
    stop: Option<Value<'a>>,
    step: Option<Value<'a>>,
    ty: Option<TemporalType>,
) -> Result<Range, Error> {
    let (mut start, mut stop, step) =
        (present(start), present(stop), present(step));
    if stop.is_none() {
        stop = start.take();
    }
    let Some(stop) = stop else {
        return Err(E::NeedsStop.into());
    };
    if step.map_or(false, |step| is_instant_like(&step)) {
        return Err(E::InstantStep.into());
    }

    let (kind, meta) = match ty {
        Some(ty) if ty.meta().is_generic() => (ty.kind(), None),
        Some(ty) => (ty.kind(), Some(ty.meta())),
        None => {
            let instant = start.map_or(false, |v| is_instant_like(&v))
                || is_instant_like(&stop);
            let kind = if instant { Kind::Datetime } else { Kind::Timedelta };
            (kind, None)
        }
    };
    if kind == Kind::Datetime && start.is_none() {
        return Err(E::InstantNeedsStart.into());
    }
    let stop_kind = match kind {
        Kind::Datetime if is_timedelta_like(&stop) => Kind::Timedelta,
        kind => kind,
    };

    let converter =
        Converter::new().metadata(meta).casting(Casting::SameKind);
    let (meta, ticks) = converter.values(&[
        (kind, start.unwrap_or(Value::Missing)),
        (stop_kind, stop),
        (Kind::Timedelta, step.unwrap_or(Value::Missing)),
    ])?;
    let start = if start.is_some() { ticks[0] } else { 0 };
    let mut stop = ticks[1];
    let step = if step.is_some() { ticks[2] } else { 1 };
    if start == NAT || stop == NAT || step == NAT {
        return Err(E::Nat.into());
    }
    if kind != stop_kind {
        stop = stop
            .checked_add(start)
            .filter(|&stop| stop != NAT)
            .ok_or(E::Overflow)?;
    }

    let (start, stop, step) =
        (i128::from(start), i128::from(stop), i128::from(step));
    let len = if step > 0 && stop > start {
        (stop - start + step - 1) / step
    } else if step < 0 && stop < start {
        (stop - start + step + 1) / step
    } else if step != 0 {
        0
    } else {
        return Err(E::ZeroStep.into());
    };
    let len = i64::try_from(len).map_err(|_| E::Overflow)?;
    trace!("arange of {len} values from {start} by {step}");

    let mut values = Vec::new();
    usize::try_from(len)
        .ok()
        .and_then(|n| values.try_reserve_exact(n).ok())
        .ok_or(E::TooLong { len })?;
    // OK because every value lies between the start and the stop.
    values.extend((0..i128::from(len)).map(|i| (start + i * step) as i64));
    Ok(Range { ty: TemporalType::new(kind, meta), values })
}

/// Drops a missing host value, so that it counts the same as `None`.
fn present<'a>(value: Option<Value<'a>>) -> Option<Value<'a>> {
    value.filter(|v| !matches!(*v, Value::Missing))
}

/// Returns true for values that describe an instant.
fn is_instant_like(value: &Value<'_>) -> bool {
    match *value {
        Value::Instant(_) | Value::Calendar(_) => true,
        Value::Array(ty) => ty.kind() == Kind::Datetime,
        _ => false,
    }
}

/// Returns true for values that an instant range reads as an offset from
/// its start.
fn is_timedelta_like(value: &Value<'_>) -> bool {
    match *value {
        Value::Integer(_) | Value::Timedelta(_) | Value::Duration(_) => true,
        Value::Array(ty) => ty.kind() == Kind::Timedelta,
        _ => false,
    }
}
