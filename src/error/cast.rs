use crate::{cast::Casting, error, Metadata};

#[derive(Clone, Debug)]
pub(crate) enum Error {
    Instant,
    Metadata {
        what: &'static str,
        src: Metadata,
        dst: Metadata,
        casting: Casting,
    },
    Overflow { src: Metadata, dst: Metadata, value: i64 },
    Timedelta,
    UnknownCasting,
}

impl Error {
    pub(crate) fn is_overflow(&self) -> bool {
        matches!(*self, Error::Overflow { .. })
    }

    pub(crate) fn is_value(&self) -> bool {
        matches!(*self, Error::UnknownCasting)
    }

    pub(crate) fn is_casting(&self) -> bool {
        !self.is_overflow() && !self.is_value()
    }
}

impl From<Error> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: Error) -> error::Error {
        error::ErrorKind::Cast(err).into()
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
            Instant => f.write_str("failed to cast instant"),
            Metadata { what, src, dst, casting } => write!(
                f,
                "cannot cast {what} from metadata [{src}] to [{dst}] \
                 according to the rule '{casting}'",
                src = src.bare(),
                dst = dst.bare(),
            ),
            Overflow { src, dst, value } => write!(
                f,
                "integer overflow casting {value} from metadata [{src}] \
                 to [{dst}]",
                src = src.bare(),
                dst = dst.bare(),
            ),
            Timedelta => f.write_str("failed to cast timedelta"),
            UnknownCasting => f.write_str(
                "unrecognized casting rule, expected one of \
                 'no', 'equiv', 'safe', 'same_kind' or 'unsafe'",
            ),
        }
    }
}
