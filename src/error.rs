//! Error types for the public interface of the crate.
//!
//! Internally the crate uses `anyhow` and the `Res` alias. At the command boundary errors are
//! tagged with an `ErrorType` so that `main` can decide how to report them.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// The result type used inside the crate.
pub(crate) type Res<T> = anyhow::Result<T>;

/// The result type returned by public functions.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies what went wrong.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Credentials or the name lookup were missing or malformed.
    Config,
    /// The expense service failed or returned something we could not understand.
    Upstream,
    /// The output table could not be written.
    Export,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// The public error type. It carries the `ErrorType` along with the full `anyhow` context chain.
pub struct Error {
    error_type: ErrorType,
    inner: anyhow::Error,
}

impl Error {
    pub(crate) fn new(error_type: ErrorType, inner: impl Into<anyhow::Error>) -> Self {
        Self {
            error_type,
            inner: inner.into(),
        }
    }

    /// What kind of failure this is.
    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.error_type, self.inner)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:#}", self.error_type, self.inner)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

/// Converts an internal result into a public `Result` tagged with an `ErrorType`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}
