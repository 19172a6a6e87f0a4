//! Errors annotated with the source location they were raised from.
//!
//! An [`AnnotatedError`] wraps any error value together with the file and
//! line of the call that raised it. Its display string is a fixed,
//! line-oriented format that log scrapers match on:
//!
//! ```text
//! Error occurred in python script name [src/demo.rs] line number [42] error message [division by zero]
//! ```
//!
//! The location is captured explicitly at construction, either through
//! `#[track_caller]` ([`AnnotatedError::new`], [`ResultExt::annotate`]) or
//! from `file!()`/`line!()` via the [`annotate!`](crate::annotate) macro.
//!
//! ```rust
//! use us_visa::{AnnotatedError, ResultExt};
//!
//! fn parse(input: &str) -> Result<u32, AnnotatedError> {
//!     let n = input.parse::<u32>().annotate()?;
//!     Ok(n)
//! }
//!
//! let err = parse("x").unwrap_err();
//! assert!(err.to_string().contains("invalid digit found in string"));
//! ```

use std::{error::Error as StdError, fmt, panic::Location};

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// File and line of the call site that raised an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    file: &'static str,
    line: u32,
}

impl SourceLocation {
    pub const fn new(file: &'static str, line: u32) -> Self {
        Self { file, line }
    }

    /// Location of the caller. Propagates through other `#[track_caller]`
    /// functions up to the first untracked frame.
    #[track_caller]
    pub fn caller() -> Self {
        let loc = Location::caller();
        Self::new(loc.file(), loc.line())
    }

    pub fn file(&self) -> &'static str {
        self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// An error value enriched with the location it was raised from.
///
/// The message is rendered from the wrapped error once, at construction, and
/// never changes afterwards. The wrapped error stays reachable through
/// [`std::error::Error::source`] and [`AnnotatedError::downcast_ref`].
pub struct AnnotatedError {
    location: SourceLocation,
    message: String,
    source: BoxError,
}

impl AnnotatedError {
    /// Wrap `error`, recording the caller's file and line.
    #[track_caller]
    pub fn new(error: impl Into<BoxError>) -> Self {
        Self::at(error, SourceLocation::caller())
    }

    /// Wrap `error` with an explicit location.
    pub fn at(error: impl Into<BoxError>, location: SourceLocation) -> Self {
        let source = error.into();
        Self {
            location,
            message: source.to_string(),
            source,
        }
    }

    pub fn location(&self) -> SourceLocation {
        self.location
    }

    pub fn file(&self) -> &'static str {
        self.location.file
    }

    pub fn line(&self) -> u32 {
        self.location.line
    }

    /// Display text of the wrapped error.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_ref(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.source.as_ref()
    }

    /// Borrow the wrapped error as its concrete type, if it is a `T`.
    pub fn downcast_ref<T: StdError + 'static>(&self) -> Option<&T> {
        self.source.downcast_ref::<T>()
    }

    pub fn into_source(self) -> BoxError {
        self.source
    }
}

impl fmt::Display for AnnotatedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error occurred in python script name [{}] line number [{}] error message [{}]",
            self.location.file, self.location.line, self.message
        )
    }
}

impl fmt::Debug for AnnotatedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "AnnotatedError at {}", self.location)?;
        writeln!(f)?;
        writeln!(f, "    Message: {}", self.message)?;
        writeln!(f)?;
        write!(f, "    Source: {:?}", self.source)
    }
}

impl StdError for AnnotatedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.source.as_ref() as &(dyn StdError + 'static))
    }
}

/// Annotate the `Err` side of a `Result` at the caller's location.
pub trait ResultExt<T> {
    fn annotate(self) -> Result<T, AnnotatedError>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<BoxError>,
{
    #[track_caller]
    fn annotate(self) -> Result<T, AnnotatedError> {
        // Not `map_err`: the closure would become the tracked caller.
        match self {
            Ok(value) => Ok(value),
            Err(e) => Err(AnnotatedError::new(e)),
        }
    }
}

/// Build an [`AnnotatedError`] located at the macro call site.
///
/// ```rust
/// let err = us_visa::annotate!("disk full");
/// assert_eq!(err.line(), line!() - 1);
/// ```
#[macro_export]
macro_rules! annotate {
    ($err:expr) => {
        $crate::AnnotatedError::at($err, $crate::SourceLocation::new(file!(), line!()))
    };
}
