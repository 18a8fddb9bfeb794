//! Error types for the calcsv pipeline.

use thiserror::Error;

/// Errors that can occur while acquiring, parsing or rendering a calendar.
#[derive(Error, Debug)]
pub enum CalCsvError {
    /// No input was supplied, or the remote calendar could not be fetched.
    #[error("{0}")]
    InputUnavailable(String),

    #[error("ICS parse error: {0}")]
    Parse(String),

    #[error("CSV encoding error: {0}")]
    Encoding(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CalCsvError {
    /// True for failures caused by the caller's input rather than by processing it.
    pub fn is_input_error(&self) -> bool {
        matches!(self, CalCsvError::InputUnavailable(_))
    }
}

/// Result type alias for calcsv operations.
pub type CalCsvResult<T> = Result<T, CalCsvError>;
