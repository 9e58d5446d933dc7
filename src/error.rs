//! Error types for the venturegrid command line

use thiserror::Error;

/// Problems with how the program was invoked.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("{0}")]
    Usage(String),

    #[error("{0} requires a value")]
    MissingValue(String),

    #[error("{flag} expects a finite number, got '{value}'")]
    InvalidNumber { flag: String, value: String },

    #[error("Invalid cell reference: {0}")]
    InvalidCellRef(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
