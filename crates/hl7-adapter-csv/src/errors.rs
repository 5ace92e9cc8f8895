//! Error types for CSV output

use thiserror::Error;

/// Errors that can occur when writing CSV
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CsvError {
    /// CSV write error
    #[error("CSV write error: {0}")]
    Write(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CsvError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<std::io::Error> for CsvError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<csv::Error> for CsvError {
    fn from(e: csv::Error) -> Self {
        if e.is_io_error() {
            Self::Io(e.to_string())
        } else {
            Self::Write(e.to_string())
        }
    }
}

/// Result type alias for CSV operations
pub type CsvResult<T> = std::result::Result<T, CsvError>;
