use crate::{error, Metadata};

#[derive(Clone, Debug)]
pub(crate) enum Error {
    GenericToTicks,
    GenericToCalendar,
    FieldOutOfRange { what: &'static str, value: i64 },
    InvalidDate { year: i64, month: i64, day: i64 },
    InvalidTime { hour: i64, minute: i64, second: i64, microsecond: i64 },
    OverflowToCalendar { meta: Metadata, value: i64 },
    OverflowToTicks { meta: Metadata },
    YearOutOfRange { year: i64 },
}

impl Error {
    pub(crate) fn is_overflow(&self) -> bool {
        use self::Error::*;

        matches!(
            *self,
            OverflowToCalendar { .. }
                | OverflowToTicks { .. }
                | YearOutOfRange { .. }
        )
    }
}

impl From<Error> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: Error) -> error::Error {
        error::ErrorKind::Civil(err).into()
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
            GenericToTicks => f.write_str(
                "cannot create an instant other than NaT with generic units",
            ),
            GenericToCalendar => f.write_str(
                "cannot convert an instant other than NaT \
                 with generic units to a calendar datetime",
            ),
            FieldOutOfRange { what, value } => {
                write!(f, "{what} {value} is out of range")
            }
            InvalidDate { year, month, day } => write!(
                f,
                "invalid date ({year},{month},{day}) \
                 when converting to an instant",
            ),
            InvalidTime { hour, minute, second, microsecond } => write!(
                f,
                "invalid time ({hour},{minute},{second},{microsecond}) \
                 when converting to an instant",
            ),
            OverflowToCalendar { meta, value } => write!(
                f,
                "value {value} with metadata {meta} overflows \
                 when converted to a calendar datetime",
            ),
            OverflowToTicks { meta } => write!(
                f,
                "calendar datetime overflows when converted to \
                 a tick count with metadata {meta}",
            ),
            YearOutOfRange { year } => write!(
                f,
                "carrying out of year {year} overflows",
            ),
        }
    }
}
