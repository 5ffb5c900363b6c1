use alloc::sync::Arc;

pub(crate) mod cast;
pub(crate) mod civil;
pub(crate) mod fmt;
pub(crate) mod host;
pub(crate) mod range;
pub(crate) mod unit;
pub(crate) mod util;

/// An error that can occur in this crate.
///
/// Every fallible operation in this crate returns this one error type. Each
/// error belongs to exactly one of five categories, which can be queried with
/// the predicates on this type:
///
/// * [`Error::is_parse`] for malformed metadata strings, typestrings and
/// timestamps.
/// * [`Error::is_value`] for values that are well formed but unusable, like
/// an invalid calendar date, a zero range step or a generic unit where a
/// concrete one is required.
/// * [`Error::is_type`] for external values of the wrong shape, like a
/// metadata record with the wrong number of fields.
/// * [`Error::is_overflow`] for 64-bit overflow while computing conversion
/// factors, common divisors or tick counts.
/// * [`Error::is_casting`] for metadata that cannot be converted into one
/// another under the requested casting rule.
///
/// The category is determined by the root cause of the error. Errors may
/// carry additional context describing what was being attempted when the
/// root cause occurred. The `Display` implementation shows the full chain,
/// separated by `: `.
///
/// Not-a-time (NaT) is never an error. It is an ordinary value that passes
/// through every conversion.
#[derive(Clone)]
pub struct Error {
    /// The internal representation of an error.
    ///
    /// This is in an `Arc` to make an `Error` cloneable and to keep its size
    /// at one word. A `Result<T, Error>` is returned from nearly every
    /// routine, so the size matters.
    inner: Arc<ErrorInner>,
}

#[derive(Clone, Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

impl Error {
    /// Creates a new error value from `core::fmt::Arguments`.
    ///
    /// It is expected to use [`format_args!`](format_args) from
    /// Rust's standard library (available in `core`) to create a
    /// `core::fmt::Arguments`.
    ///
    /// Errors built this way don't belong to any of the categories reported
    /// by the `is_*` predicates.
    ///
    /// # Example
    ///
    /// ```
    /// use scaledtime::Error;
    ///
    /// let err = Error::from_args(format_args!("something failed"));
    /// assert_eq!(err.to_string(), "something failed");
    /// ```
    pub fn from_args<'a>(message: core::fmt::Arguments<'a>) -> Error {
        Error::from(ErrorKind::Adhoc(AdhocError::from_args(message)))
    }

    /// Returns true when this error originated from malformed text.
    ///
    /// # Example
    ///
    /// ```
    /// use scaledtime::Metadata;
    ///
    /// assert!("[5xs]".parse::<Metadata>().unwrap_err().is_parse());
    /// ```
    pub fn is_parse(&self) -> bool {
        use self::ErrorKind::*;

        match *self.root().kind() {
            FmtIso8601(ref err) => err.is_parse(),
            FmtMetadata(ref err) => err.is_parse(),
            ParseInt(_) => true,
            _ => false,
        }
    }

    /// Returns true when this error originated from a value that is well
    /// formed but cannot be used.
    ///
    /// # Example
    ///
    /// ```
    /// use scaledtime::{civil::DateTime, Metadata, Unit};
    ///
    /// // There are no datetimes with generic units, other than NaT.
    /// let dt = DateTime::date(2024, 2, 29);
    /// let err = dt.to_scaled(Metadata::GENERIC).unwrap_err();
    /// assert!(err.is_value());
    /// ```
    pub fn is_value(&self) -> bool {
        use self::ErrorKind::*;

        match *self.root().kind() {
            Cast(ref err) => err.is_value(),
            Civil(ref err) => !err.is_overflow(),
            FmtIso8601(ref err) => err.is_value(),
            Host(ref err) => err.is_value(),
            Range(ref err) => !err.is_overflow(),
            Unit(ref err) => err.is_value(),
            _ => false,
        }
    }

    /// Returns true when this error originated from an external value that
    /// has the wrong shape.
    ///
    /// # Example
    ///
    /// ```
    /// use scaledtime::{host::Value, Metadata};
    ///
    /// let err = Metadata::from_value(Value::Integer(5)).unwrap_err();
    /// assert!(err.is_type());
    /// ```
    pub fn is_type(&self) -> bool {
        use self::ErrorKind::*;

        match *self.root().kind() {
            FmtMetadata(ref err) => err.is_type(),
            Host(ref err) => err.is_type(),
            _ => false,
        }
    }

    /// Returns true when this error originated from 64-bit integer overflow.
    ///
    /// # Example
    ///
    /// ```
    /// use scaledtime::{Metadata, Unit};
    ///
    /// let a = Metadata::new(Unit::Year, 1).unwrap();
    /// let b = Metadata::new(Unit::Attosecond, 1).unwrap();
    /// assert!(a.conversion_factor(b).unwrap_err().is_overflow());
    /// ```
    pub fn is_overflow(&self) -> bool {
        use self::ErrorKind::*;

        match *self.root().kind() {
            Cast(ref err) => err.is_overflow(),
            Civil(ref err) => err.is_overflow(),
            Host(ref err) => err.is_overflow(),
            Range(ref err) => err.is_overflow(),
            Unit(ref err) => err.is_overflow(),
            _ => false,
        }
    }

    /// Returns true when this error originated from two metadata (or units)
    /// that are incompatible under a casting rule.
    ///
    /// # Example
    ///
    /// ```
    /// use scaledtime::{cast::{self, Casting}, Kind, Metadata, Unit};
    ///
    /// let hour = Metadata::from_unit(Unit::Hour);
    /// let day = Metadata::from_unit(Unit::Day);
    /// let err = cast::check_cast(
    ///     Kind::Datetime, "instant", hour, day, Casting::Safe,
    /// ).unwrap_err();
    /// assert!(err.is_casting());
    /// ```
    pub fn is_casting(&self) -> bool {
        use self::ErrorKind::*;

        match *self.root().kind() {
            Cast(ref err) => err.is_casting(),
            FmtIso8601(ref err) => err.is_casting(),
            Unit(ref err) => err.is_casting(),
            _ => false,
        }
    }
}

impl Error {
    /// Contextualizes this error with the given consequent.
    ///
    /// That is, the returned error is the consequent and this error is its
    /// cause.
    #[cfg_attr(feature = "perf-inline", inline(always))]
    pub(crate) fn context(self, consequent: impl IntoError) -> Error {
        self.context_impl(consequent.into_error())
    }

    #[inline(never)]
    #[cold]
    fn context_impl(self, consequent: Error) -> Error {
        let mut err = consequent;
        let inner = Arc::make_mut(&mut err.inner);
        debug_assert!(
            inner.cause.is_none(),
            "cause of consequence must be `None`"
        );
        inner.cause = Some(self);
        err
    }

    /// Returns the root error in this chain.
    fn root(&self) -> &Error {
        let mut err = self;
        while let Some(ref cause) = err.inner.cause {
            err = cause;
        }
        err
    }

    /// Returns a chain of error values.
    ///
    /// This starts with the most recent error added to the chain. That is,
    /// the highest level context. The last error in the chain is always the
    /// root cause.
    fn chain(&self) -> impl Iterator<Item = &Error> {
        let mut err = self;
        core::iter::once(err).chain(core::iter::from_fn(move || {
            err = err.inner.cause.as_ref()?;
            Some(err)
        }))
    }

    /// Returns the kind of this error.
    fn kind(&self) -> &ErrorKind {
        &self.inner.kind
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut it = self.chain().peekable();
        while let Some(err) = it.next() {
            core::fmt::Display::fmt(err.kind(), f)?;
            if it.peek().is_some() {
                f.write_str(": ")?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if !f.alternate() {
            core::fmt::Display::fmt(self, f)
        } else {
            f.debug_struct("Error")
                .field("kind", &self.inner.kind)
                .field("cause", &self.inner.cause)
                .finish()
        }
    }
}

/// The underlying kind of a [`Error`].
#[derive(Clone, Debug)]
enum ErrorKind {
    Adhoc(AdhocError),
    Cast(self::cast::Error),
    Civil(self::civil::Error),
    FmtIso8601(self::fmt::iso8601::Error),
    FmtMetadata(self::fmt::metadata::Error),
    Host(self::host::Error),
    ParseInt(self::util::ParseIntError),
    Range(self::range::Error),
    Unit(self::unit::Error),
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::ErrorKind::*;

        match *self {
            Adhoc(ref msg) => msg.fmt(f),
            Cast(ref err) => err.fmt(f),
            Civil(ref err) => err.fmt(f),
            FmtIso8601(ref err) => err.fmt(f),
            FmtMetadata(ref err) => err.fmt(f),
            Host(ref err) => err.fmt(f),
            ParseInt(ref err) => err.fmt(f),
            Range(ref err) => err.fmt(f),
            Unit(ref err) => err.fmt(f),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error { inner: Arc::new(ErrorInner { kind, cause: None }) }
    }
}

/// A generic error message.
///
/// This supports the `Error::from_args` public API, which permits callers to
/// manifest their own `Error` values from an arbitrary message.
#[derive(Clone)]
struct AdhocError {
    message: alloc::boxed::Box<str>,
}

impl AdhocError {
    fn from_args<'a>(message: core::fmt::Arguments<'a>) -> AdhocError {
        use alloc::string::ToString;

        let message = message.to_string().into_boxed_str();
        AdhocError { message }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AdhocError {}

impl core::fmt::Display for AdhocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.message, f)
    }
}

impl core::fmt::Debug for AdhocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.message, f)
    }
}

/// A simple trait to encapsulate automatic conversion to `Error`.
///
/// This exists to make `Error::context` work with the internal sub-error
/// types without public `From` impls for each of them.
pub(crate) trait IntoError {
    fn into_error(self) -> Error;
}

impl IntoError for Error {
    #[inline(always)]
    fn into_error(self) -> Error {
        self
    }
}

/// A trait for contextualizing error values.
///
/// This makes it easy to contextualize either `Error` or `Result<T, Error>`
/// without calling `map_err` everywhere.
pub(crate) trait ErrorContext<T, E> {
    /// Contextualize the given consequent error with this (`self`) error as
    /// the cause.
    ///
    /// This is equivalent to saying that "consequent is caused by self."
    fn context(self, consequent: impl IntoError) -> Result<T, Error>;

    /// Like `context`, but hides error construction within a closure.
    ///
    /// This is useful when building the consequent allocates, since the
    /// closure is only called on the error path.
    fn with_context<C: IntoError>(
        self,
        consequent: impl FnOnce() -> C,
    ) -> Result<T, Error>;
}

impl<T, E> ErrorContext<T, E> for Result<T, E>
where
    E: IntoError,
{
    #[cfg_attr(feature = "perf-inline", inline(always))]
    fn context(self, consequent: impl IntoError) -> Result<T, Error> {
        self.map_err(|err| {
            err.into_error().context_impl(consequent.into_error())
        })
    }

    #[cfg_attr(feature = "perf-inline", inline(always))]
    fn with_context<C: IntoError>(
        self,
        consequent: impl FnOnce() -> C,
    ) -> Result<T, Error> {
        self.map_err(|err| {
            err.into_error().context_impl(consequent().into_error())
        })
    }
}
