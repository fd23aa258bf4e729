//! Error types for the state-distribution core.

use fixcast_types::FixError;

/// Errors raised by the device store, the hub, and the ingestion path.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The candidate fix was malformed. Nothing was stored or broadcast.
    #[error("invalid fix: {reason}")]
    InvalidFix {
        /// Human-readable description of what was wrong.
        reason: String,
    },

    /// No record exists for the requested device.
    #[error("device not found: {device_id}")]
    NotFound {
        /// The id that was looked up.
        device_id: String,
    },

    /// Writing to a subscriber failed. Only ever ends that subscriber.
    #[error("subscriber transport failed: {reason}")]
    Transport {
        /// Description of the failed write.
        reason: String,
    },

    /// Unexpected failure while applying an ingestion.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the failure.
        message: String,
    },
}

impl CoreError {
    /// Shorthand for an [`CoreError::InvalidFix`] with the given reason.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidFix {
            reason: reason.into(),
        }
    }
}

impl From<FixError> for CoreError {
    fn from(source: FixError) -> Self {
        Self::InvalidFix {
            reason: source.to_string(),
        }
    }
}
