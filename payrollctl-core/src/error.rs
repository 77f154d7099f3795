/// Structured error types for payrollctl-core.
///
/// Uses `thiserror` so the server and ETL crates can match on variants.
/// The binary (payrollctl-cli) wraps these in `anyhow` for reporting.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for payrollctl-core operations
#[derive(Error, Debug)]
pub enum PayrollError {
    /// No dataset resource is known for the requested year
    #[error("No resource ID for year {year}")]
    UnknownYear { year: i32 },

    /// Earnings component name outside the fixed allowlist
    #[error("Unknown earnings component '{value}'")]
    UnknownComponent { value: String },

    /// Configuration file could not be read or parsed
    #[error("Configuration error in {path:?}: {reason}")]
    Config { path: PathBuf, reason: String },
}

/// Result type alias for payrollctl-core operations
pub type Result<T> = std::result::Result<T, PayrollError>;

impl PayrollError {
    /// Create an unknown component error
    pub fn unknown_component(value: impl Into<String>) -> Self {
        Self::UnknownComponent {
            value: value.into(),
        }
    }

    /// Create a config error
    pub fn config(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
