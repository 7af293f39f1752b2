//! Centralized error handling for nc2na
//!
//! Every fallible operation in the crate returns [`Result`], so the binary can
//! report a single error type no matter which stage of a conversion failed.

use std::path::PathBuf;

/// Main error type for nc2na operations
#[derive(Debug, thiserror::Error)]
pub enum Nc2NaError {
    /// NetCDF file operation errors
    #[error("NetCDF error: {0}")]
    NetCDF(#[from] netcdf::Error),

    /// I/O operation errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be read or parsed
    #[error("invalid configuration {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    /// Variable not found in NetCDF file
    #[error("Variable '{var}' not found in file")]
    VariableNotFound { var: String },

    /// Dimension not found in NetCDF file
    #[error("Dimension '{dim}' not found in file")]
    DimensionNotFound { dim: String },

    /// The time dimension exists but holds no values
    #[error("time axis '{key}' is empty")]
    EmptyTimeAxis { key: String },

    /// Time values or units that cannot be decoded
    #[error("invalid time: {reason}")]
    InvalidTime { reason: String },

    /// Malformed NASA Ames content; `line` is 1-based, 0 when not tied to a line
    #[error("invalid NASA Ames format in line {line}: {message}")]
    Format { line: usize, message: String },

    /// Text that cannot be represented in the required encoding
    #[error("encoding error: {message}")]
    Encoding { message: String },

    /// Header fields and data blocks that do not agree with each other
    #[error("inconsistent NASA Ames data: {message}")]
    InconsistentData { message: String },

    /// Input path does not exist
    #[error("path '{}' does not exist", path.display())]
    PathNotFound { path: PathBuf },

    /// Input directory contains no netCDF files
    #[error("no nc files found in '{}'", path.display())]
    NoInputFiles { path: PathBuf },

    /// Thread pool configuration error
    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),
}

impl Nc2NaError {
    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        Nc2NaError::Format {
            line,
            message: message.into(),
        }
    }
}

/// Result type alias for nc2na operations
pub type Result<T> = std::result::Result<T, Nc2NaError>;
