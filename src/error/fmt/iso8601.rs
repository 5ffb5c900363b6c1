use alloc::boxed::Box;

use crate::{cast::Casting, error, util::escape, Unit};

#[derive(Clone, Debug)]
pub(crate) enum Error {
    ExpectedFractionDigits,
    ExpectedTwoDigits { what: &'static str },
    ExpectedYear,
    Failed { text: Box<[u8]> },
    FailedYear,
    FractionTooLong { len: usize },
    InvalidDay { year: i64, month: i64, day: i64 },
    InvalidField { what: &'static str, value: i64 },
    PrintFailed,
    Trailing { pos: usize },
    UnitCast { unit: Unit, ceiling: Unit, casting: Casting },
}

impl Error {
    pub(crate) fn is_parse(&self) -> bool {
        !self.is_value() && !self.is_casting()
    }

    pub(crate) fn is_value(&self) -> bool {
        matches!(*self, Error::InvalidDay { .. } | Error::InvalidField { .. })
    }

    pub(crate) fn is_casting(&self) -> bool {
        matches!(*self, Error::UnitCast { .. })
    }
}

impl From<Error> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: Error) -> error::Error {
        error::ErrorKind::FmtIso8601(err).into()
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
            ExpectedFractionDigits => f.write_str(
                "expected at least one digit after the decimal point",
            ),
            ExpectedTwoDigits { what } => {
                write!(f, "expected two digit {what}")
            }
            ExpectedYear => f.write_str("expected year digits"),
            Failed { ref text } => write!(
                f,
                "failed to parse \"{text}\" as an ISO 8601 datetime",
                text = escape::Bytes(text),
            ),
            FailedYear => f.write_str("failed to parse year"),
            FractionTooLong { len } => write!(
                f,
                "fractional seconds have at most 18 digits, but got {len}",
            ),
            InvalidDay { year, month, day } => write!(
                f,
                "invalid day {day} for month {month} of year {year}",
            ),
            InvalidField { what, value } => {
                write!(f, "{what} {value} is out of range")
            }
            PrintFailed => {
                f.write_str("an error occurred when formatting an argument")
            }
            Trailing { pos } => {
                write!(f, "unexpected input at position {pos}")
            }
            UnitCast { unit, ceiling, casting } => write!(
                f,
                "cannot parse a datetime with unit '{unit}' as unit \
                 '{ceiling}' using casting rule '{casting}'",
                unit = unit.code(),
                ceiling = ceiling.code(),
            ),
        }
    }
}
