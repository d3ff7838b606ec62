//! Error conversion implementations.
//!
//! This module contains From trait implementations to convert from dependency
//! error types to the unified Error type.

use super::types::Error;

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            other => Error::ZipError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Error::Serialization(format!("XML write error: {}", err))
    }
}

impl Error {
    /// Whether this error came from the underlying stream or filesystem.
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io(_) | Error::ZipError(_))
    }
}
