//! Error types surfaced by the finman commands.
//!
//! Internally, functions return `Res<T>` (an `anyhow::Result`) so that context can be layered onto
//! failures as they bubble up. At the command boundary, failures are classified with an
//! `ErrorType` by calling `pub_result` and become the public `Error` type.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// The internal result type used below the command layer.
pub(crate) type Res<T> = anyhow::Result<T>;

/// The public result type returned by commands.
pub type Result<T> = std::result::Result<T, Error>;

/// The broad category of a failure, used by callers to decide how to present it.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// A user-entered amount was empty, non-numeric or negative.
    InvalidAmount,
    /// The exchange rate feed could not be reached or returned a failure.
    Fetch,
    /// Reading or writing the local blob store failed.
    Storage,
    /// The data directory or its configuration file is missing or invalid.
    Config,
    /// Some other user input could not be understood.
    Request,
    /// Anything not classified at a command boundary.
    Internal,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// A classified error. The wrapped `anyhow::Error` carries the full context chain.
pub struct Error {
    error_type: ErrorType,
    inner: anyhow::Error,
}

impl Error {
    pub fn new(error_type: ErrorType, inner: impl Into<anyhow::Error>) -> Self {
        Self {
            error_type,
            inner: inner.into(),
        }
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // The alternate form prints the whole context chain on one line.
        write!(f, "{:#}", self.inner)
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.error_type, self.inner)
    }
}

impl From<anyhow::Error> for Error {
    fn from(value: anyhow::Error) -> Self {
        Error::new(ErrorType::Internal, value)
    }
}

/// Converts an internal result into a public `Result` with the given classification.
pub trait IntoResult<T> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_pub_result_classifies() {
        let res: Res<()> = Err(anyhow::anyhow!("disk on fire")).context("Unable to save");
        let err = res.pub_result(ErrorType::Storage).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Storage);
        assert_eq!(err.to_string(), "Unable to save: disk on fire");
    }

    #[test]
    fn test_error_type_display() {
        assert_eq!(ErrorType::InvalidAmount.to_string(), "invalid_amount");
        assert_eq!("fetch".parse::<ErrorType>().unwrap(), ErrorType::Fetch);
    }

    #[test]
    fn test_from_anyhow_is_internal() {
        let err: Error = anyhow::anyhow!("boom").into();
        assert_eq!(err.error_type(), ErrorType::Internal);
    }
}
