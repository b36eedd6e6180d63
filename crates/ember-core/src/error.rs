//! Error types for the ember engines.

use thiserror::Error;

/// Failures raised by the countdown and particle engines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// A constructor argument violated its precondition.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// The host could not provide a timer or frame primitive.
    #[error("host primitive unavailable: {0}")]
    HostUnavailable(String),
}

impl CoreError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        CoreError::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, CoreError>;
