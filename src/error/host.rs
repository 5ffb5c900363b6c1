use alloc::boxed::Box;

use crate::{civil::DateTime, error, util::escape, Kind};

#[derive(Clone, Debug)]
pub(crate) enum Error {
    DurationOverflow { days: i64, seconds: i64, microseconds: i64 },
    IntegerNeedsUnit,
    OffsetOverflow,
    TimedeltaText { text: Box<[u8]> },
    Unconvertible { kind: Kind },
    WrongShape { kind: Kind, shape: &'static str },
    ZoneConversion { utc: DateTime },
}

impl Error {
    pub(crate) fn is_value(&self) -> bool {
        use self::Error::*;

        matches!(
            *self,
            IntegerNeedsUnit | Unconvertible { .. }
                | ZoneConversion { .. }
        )
    }

    pub(crate) fn is_type(&self) -> bool {
        matches!(*self, Error::WrongShape { .. })
    }

    pub(crate) fn is_overflow(&self) -> bool {
        matches!(*self, Error::DurationOverflow { .. } | Error::OffsetOverflow)
    }
}

impl From<Error> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: Error) -> error::Error {
        error::ErrorKind::Host(err).into()
    }
}

impl error::IntoError for Error {
    fn into_error(self) -> error::Error {
        self.into()
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::Error::*;

        match *self {
            DurationOverflow { days, seconds, microseconds } => write!(
                f,
                "duration of {days} days, {seconds} seconds and \
                 {microseconds} microseconds overflows when converted \
                 to microseconds",
            ),
            IntegerNeedsUnit => f.write_str(
                "converting an integer to an instant requires a specified \
                 unit",
            ),
            OffsetOverflow => {
                f.write_str("time zone offset overflows a 32-bit minute count")
            }
            TimedeltaText { ref text } => write!(
                f,
                "could not convert text \"{text}\" to a timedelta",
                text = escape::Bytes(text),
            ),
            Unconvertible { kind } => write!(
                f,
                "could not convert value to {kind}",
                kind = kind.tag(),
            ),
            WrongShape { kind, shape } => write!(
                f,
                "cannot convert a {shape} to a single {kind}",
                kind = kind.tag(),
            ),
            ZoneConversion { utc } => {
                write!(f, "time zone failed to convert {utc} from UTC")
            }
        }
    }
}
