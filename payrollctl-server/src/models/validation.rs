//! Validation error types

use std::fmt;

/// Validation error for request parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Year outside the range the dataset covers
    YearOutOfRange { year: i32, min: i32, max: i32 },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// Query string could not be deserialized (e.g. `limit=abc`)
    InvalidQuery { reason: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::YearOutOfRange { year, min, max } => {
                write!(f, "year {} is outside the available range {}-{}", year, min, max)
            }
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::InvalidQuery { reason } => write!(f, "invalid query string: {}", reason),
        }
    }
}

impl std::error::Error for ValidationError {}
