use alloc::boxed::Box;

use crate::{error, util::escape};

#[derive(Clone, Debug)]
pub(crate) enum Error {
    ExpectedTextOrRecord,
    InvalidAt { text: Box<[u8]>, pos: usize },
    InvalidTypestr { text: Box<[u8]> },
    RecordInteger { index: usize },
    RecordSize { len: usize },
    RecordUnit,
    RecordValues { multiplier: i64, den: i64 },
    UnknownUnit { unit: Box<[u8]>, text: Option<Box<[u8]>> },
}

impl Error {
    pub(crate) fn invalid_at(text: &[u8], pos: usize) -> Error {
        Error::InvalidAt { text: text.into(), pos }
    }

    pub(crate) fn is_parse(&self) -> bool {
        use self::Error::*;

        matches!(
            *self,
            InvalidAt { .. } | InvalidTypestr { .. } | UnknownUnit { .. }
        )
    }

    pub(crate) fn is_type(&self) -> bool {
        !self.is_parse()
    }
}

impl From<Error> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: Error) -> error::Error {
        error::ErrorKind::FmtMetadata(err).into()
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
            ExpectedTextOrRecord => f.write_str(
                "invalid value for specifying metadata, \
                 expected text or a record",
            ),
            InvalidAt { ref text, pos } => write!(
                f,
                "invalid metadata string \"{text}\" at position {pos}",
                text = escape::Bytes(text),
            ),
            InvalidTypestr { ref text } => write!(
                f,
                "invalid typestring \"{text}\", expected a prefix of \
                 'M8', 'm8', 'datetime64' or 'timedelta64'",
                text = escape::Bytes(text),
            ),
            RecordInteger { index } => write!(
                f,
                "expected an integer for element {index} of metadata record",
            ),
            RecordSize { len } => write!(
                f,
                "expected a metadata record of 2 to 4 elements, \
                 but got {len}",
            ),
            RecordUnit => f.write_str(
                "expected a unit string for the first element \
                 of metadata record",
            ),
            RecordValues { multiplier, den } => write!(
                f,
                "invalid metadata record values, multiplier ({multiplier}) \
                 and denominator ({den}) must both be positive",
            ),
            UnknownUnit { ref unit, text: None } => write!(
                f,
                "invalid unit \"{unit}\" in metadata",
                unit = escape::Bytes(unit),
            ),
            UnknownUnit { ref unit, text: Some(ref text) } => write!(
                f,
                "invalid unit \"{unit}\" in metadata string \"{text}\"",
                unit = escape::Bytes(unit),
                text = escape::Bytes(text),
            ),
        }
    }
}
