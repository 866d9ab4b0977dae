//! Error type for kernel parameter validation.

use std::fmt;

/// Error returned when a numeric range is malformed.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeError {
    /// A bound is NaN or infinite
    NotFinite,
    /// Lower bound is not strictly below the upper bound
    Inverted {
        /// Declared lower bound
        min: f64,
        /// Declared upper bound
        max: f64,
    },
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeError::NotFinite => write!(f, "range bounds must be finite"),
            RangeError::Inverted { min, max } => {
                write!(f, "range minimum {} is not below maximum {}", min, max)
            }
        }
    }
}

impl std::error::Error for RangeError {}
