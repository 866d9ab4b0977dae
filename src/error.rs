use crate::registry::Kind;
use thiserror::Error;

/// Errors reported by registration, lookup and resolution.
///
/// Buffer-sizing violations in [`Fish::process`](crate::Fish::process) are
/// not represented here: they are caller bugs and panic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FishError {
    #[error("Duplicate {kind} name: {name}")]
    DuplicateName { kind: Kind, name: String },

    #[error("{kind} not found: {name}")]
    NotFound { kind: Kind, name: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No path from {from} to {to}: {reason}")]
    NoPathFound {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Context not initialized")]
    NotInitialized,
}

impl FishError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        FishError::InvalidArgument(message.into())
    }

    pub(crate) fn not_found(kind: Kind, name: impl Into<String>) -> Self {
        FishError::NotFound {
            kind,
            name: name.into(),
        }
    }
}

impl From<pixel_kernels::RangeError> for FishError {
    fn from(e: pixel_kernels::RangeError) -> Self {
        FishError::InvalidArgument(e.to_string())
    }
}
