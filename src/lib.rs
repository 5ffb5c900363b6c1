/*!
Scaledtime is a typed temporal-value engine. Instants and durations are
stored as signed 64-bit tick counts tagged with [`Metadata`]: a time [`Unit`]
and a positive multiplier. A value of `5` under `[10ms]` is fifty
milliseconds, either past the Unix epoch (an [`Instant`]) or as a length of
time (a [`Timedelta`]).

The crate provides:

* The [`Unit`] ladder from years down to attoseconds, with exact conversion
factors between units.
* The metadata string grammar (`[5ms]`, `us/3`, `M8[D]`) via
[`FromStr`](core::str::FromStr) and [`Display`](core::fmt::Display) on
[`Metadata`] and [`TemporalType`].
* Casting policies ([`cast::Casting`]) that decide whether one metadata may
be converted into another.
* Promotion of two temporal types to a common one
([`TemporalType::promote`]).
* Exact conversion between tick counts and calendar datetimes
([`convert`], [`civil`]).
* ISO 8601 parsing and printing ([`fmt::iso8601`]).
* Conversion of loosely typed host values into tick counts, with detection of
the finest unit needed ([`host`], [`ingest`]).
* Evenly spaced ranges of instants and timedeltas ([`range`]).

There is no time zone database here. A host may supply a time zone through
[`host::FromUtc`]; everything else is in UTC.

# Example

```
use scaledtime::{cast::Casting, Instant, Metadata, TemporalType};

let instant: Instant = Instant::new("[h]".parse()?, 361_162);
assert_eq!(instant.to_string(), "2011-03-15T10");

let minutes = instant.cast("[m]".parse()?, Casting::Safe)?;
assert_eq!(minutes.value(), 21_669_720);

let a: TemporalType = "M8[5ms]".parse()?;
let b: TemporalType = "m8[2us]".parse()?;
assert_eq!(TemporalType::promote(a, b)?.to_string(), "datetime64[2us]");

# Ok::<(), Box<dyn std::error::Error>>(())
```

# Not-a-time

The smallest `i64` is reserved as [`NAT`], the "not-a-time" sentinel. It
converts to NaT under every metadata, prints as `NaT` and is never the result
of a successful arithmetic operation. Computations that would produce it
report overflow instead.

# Crate features

* **std** (enabled by default) - Provides an implementation of
`std::error::Error` for [`Error`].
* **logging** - Emits messages through the [`log`](https://docs.rs/log)
crate. Unit promotion and value ingestion log surprising decisions at
`debug` level, and calendar decomposition logs at `trace` level.
* **serde** - Provides `serde` implementations for [`Unit`], [`Metadata`]
and [`TemporalType`] in their canonical string forms.
* **perf-inline** - Forcefully inlines hot paths of the parsers.
*/

#![no_std]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
// We generally want all types to impl Debug.
#![warn(missing_debug_implementations)]

#[cfg(not(any(target_pointer_width = "32", target_pointer_width = "64")))]
compile_error!("scaledtime currently not supported on non-{32,64}");

#[cfg(any(test, feature = "std"))]
extern crate std;

// Errors and ranges are heap allocated, so there is no core-only mode.
extern crate alloc;

pub use crate::{
    error::Error,
    instant::Instant,
    meta::Metadata,
    temporal::{Kind, TemporalType},
    timedelta::Timedelta,
    unit::Unit,
};

#[macro_use]
mod logging;

pub mod cast;
pub mod civil;
pub mod convert;
mod error;
pub mod fmt;
pub mod host;
pub mod ingest;
mod instant;
mod meta;
pub mod range;
mod temporal;
mod timedelta;
mod unit;
mod util;

/// The "not-a-time" sentinel tick count.
///
/// This is shared by instants and timedeltas under every metadata.
pub const NAT: i64 = i64::MIN;

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn nat_everywhere() {
        let _ = env_logger::try_init();

        for s in ["[Y]", "[3M]", "[W]", "[B]", "[D]", "[25s]", "[as]"] {
            let meta: Metadata = s.parse().unwrap();
            let dt = convert::scaled_to_calendar(meta, NAT).unwrap();
            assert!(dt.is_nat(), "{s}");
            assert_eq!(convert::calendar_to_scaled(meta, &dt).unwrap(), NAT);
            assert_eq!(Instant::new(meta, NAT).to_string(), "NaT");
            assert_eq!(Timedelta::new(meta, NAT).to_string(), "NaT");
        }
    }
}
