//! Error types for validation operations.

use feedcheck_store::StoreError;
use thiserror::Error;

/// Result type for a single check.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Reasons a check could not be evaluated.
///
/// These never escape a validator: each is folded into an ERROR record for
/// the unit (column or table) being checked.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The store could not be reached, described or queried
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Metadata refers to something that does not exist
    #[error("{0}")]
    Configuration(String),

    /// Request mode is neither Insert nor Append
    #[error("Unknown request type: {0}")]
    UnknownRequestMode(String),
}

impl ValidationError {
    /// Creates a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates a new unknown-request-mode error.
    pub fn unknown_request_mode(mode: impl Into<String>) -> Self {
        Self::UnknownRequestMode(mode.into())
    }

    /// Message carried by the ERROR record.
    ///
    /// Store failures are prefixed with the activity that hit them; metadata
    /// problems are reported verbatim.
    pub fn record_message(&self, activity: &str) -> String {
        match self {
            ValidationError::Store(err) => format!("Error {activity}: {err}"),
            other => other.to_string(),
        }
    }
}
