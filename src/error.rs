//! Error types.

use std::io;

pub type Result<T> = core::result::Result<T, Error>;

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::IoError(e.to_string())
    }
}

/// Crate-wide error type.
///
/// Ruby syntax problems are not errors in this sense, they are part of a
/// `Reflection`.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error("io error: {0}")]
    IoError(String),

    #[error("unknown prompt mode: {0} (expected default, simple or null)")]
    InvalidPromptMode(String),
    #[error("unknown log level: {0}")]
    InvalidLogLevel(String),
}
