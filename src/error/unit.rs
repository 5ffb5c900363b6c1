use alloc::boxed::Box;

use crate::{error, Metadata, Unit};

#[derive(Clone, Debug)]
pub(crate) enum Error {
    ConversionOverflow { src: Unit, dst: Unit },
    DivisorNotMultiple { den: i32, text: Option<Box<str>> },
    DivisorOverflow { meta: Metadata, den: i32 },
    DivisorWithGeneric,
    GcdOverflow { meta1: Metadata, meta2: Metadata },
    IncompatibleNonlinear { meta1: Metadata, meta2: Metadata },
    InvalidDivisor { den: i64 },
    InvalidMultiplier { multiplier: i64 },
    ToGeneric { src: Metadata },
}

impl Error {
    pub(crate) fn is_value(&self) -> bool {
        use self::Error::*;

        matches!(
            *self,
            DivisorNotMultiple { .. }
                | DivisorWithGeneric
                | InvalidDivisor { .. }
                | InvalidMultiplier { .. }
                | ToGeneric { .. }
        )
    }

    pub(crate) fn is_overflow(&self) -> bool {
        use self::Error::*;

        matches!(
            *self,
            ConversionOverflow { .. }
                | DivisorOverflow { .. }
                | GcdOverflow { .. }
        )
    }

    pub(crate) fn is_casting(&self) -> bool {
        matches!(*self, Error::IncompatibleNonlinear { .. })
    }
}

impl From<Error> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: Error) -> error::Error {
        error::ErrorKind::Unit(err).into()
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
            ConversionOverflow { src, dst } => write!(
                f,
                "integer overflow while computing the conversion \
                 factor between units {src} and {dst}",
            ),
            DivisorNotMultiple { den, text: None } => write!(
                f,
                "divisor ({den}) is not a multiple of a lower unit \
                 in metadata",
            ),
            DivisorNotMultiple { den, text: Some(ref text) } => write!(
                f,
                "divisor ({den}) is not a multiple of a lower unit \
                 in metadata \"{text}\"",
            ),
            DivisorOverflow { meta, den } => write!(
                f,
                "multiplier overflows when applying divisor ({den}) \
                 to metadata [{meta}]",
                meta = meta.bare(),
            ),
            DivisorWithGeneric => {
                f.write_str("cannot use a divisor with generic units")
            }
            GcdOverflow { meta1, meta2 } => write!(
                f,
                "integer overflow getting a common metadata divisor \
                 for metadata [{meta1}] and [{meta2}]",
                meta1 = meta1.bare(),
                meta2 = meta2.bare(),
            ),
            IncompatibleNonlinear { meta1, meta2 } => write!(
                f,
                "cannot get a common metadata divisor for metadata \
                 [{meta1}] and [{meta2}] because they have incompatible \
                 nonlinear base time units",
                meta1 = meta1.bare(),
                meta2 = meta2.bare(),
            ),
            InvalidDivisor { den } => {
                write!(f, "divisor must be at least 1, but got {den}")
            }
            InvalidMultiplier { multiplier } => write!(
                f,
                "multiplier must be at least 1, but got {multiplier}",
            ),
            ToGeneric { src } => write!(
                f,
                "cannot convert from specific units [{src}] \
                 to generic units",
                src = src.bare(),
            ),
        }
    }
}
