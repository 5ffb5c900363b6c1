use crate::error;

#[derive(Clone, Debug)]
pub(crate) enum Error {
    InstantNeedsStart,
    InstantStep,
    Nat,
    NeedsStop,
    Overflow,
    TooLong { len: i64 },
    ZeroStep,
}

impl Error {
    pub(crate) fn is_overflow(&self) -> bool {
        matches!(*self, Error::Overflow)
    }
}

impl From<Error> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: Error) -> error::Error {
        error::ErrorKind::Range(err).into()
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
            InstantNeedsStart => f.write_str(
                "arange requires both a start and a stop for an instant range",
            ),
            InstantStep => {
                f.write_str("cannot use an instant as a step in arange")
            }
            Nat => f.write_str("arange: cannot use NaT (not-a-time) values"),
            NeedsStop => f.write_str("arange needs at least a stopping value"),
            Overflow => f.write_str(
                "arange: integer overflow while computing the range bounds",
            ),
            TooLong { len } => write!(
                f,
                "arange: cannot allocate a range of {len} values",
            ),
            ZeroStep => f.write_str("arange: step cannot be zero"),
        }
    }
}
