//! Error types for the worksheet writer.
//!
//! Every public mutating call validates its input before touching worksheet
//! state, so an `Err` leaves the worksheet exactly as it was.
use thiserror::Error;

/// Main error type for worksheet construction and serialization.
#[derive(Error, Debug)]
pub enum Error {
    /// Row or column outside the format's grid.
    #[error("Dimension error: cell ({row}, {col}) is outside the worksheet limits")]
    Dimension { row: u32, col: u32 },

    /// A required argument was missing or empty.
    #[error("Insufficient arguments: {0}")]
    InsufficientArgument(String),

    /// Unknown or invalid value for an enumerated option.
    #[error("Invalid value '{value}' for parameter '{param}' in {method}()")]
    OptionParameter {
        method: &'static str,
        param: &'static str,
        value: String,
    },

    /// A required option was not supplied.
    #[error("Parameter '{param}' is required in {method}()")]
    MissingParameter {
        method: &'static str,
        param: &'static str,
    },

    /// Malformed A1-style cell, range or column reference.
    #[error("Invalid cell reference: '{0}'")]
    InvalidReference(String),

    /// A date/time string that could not be converted to a serial date.
    #[error("Invalid date/time value: '{0}'")]
    InvalidDateTime(String),

    /// A file-format limit or structural constraint was violated.
    #[error("{0}")]
    Limit(String),

    /// Failure while writing XML into the output buffer.
    #[error("XML write error: {0}")]
    Xml(#[from] std::fmt::Error),
}

/// Result type for worksheet operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn option(method: &'static str, param: &'static str, value: impl Into<String>) -> Self {
        Error::OptionParameter {
            method,
            param,
            value: value.into(),
        }
    }
}
