//! Error types for the metadata model.
//!
//! Metadata rows come from hand-edited spreadsheets, so a row missing one of
//! its identifying fields is reported as a [`MetadataError`] and skipped
//! rather than aborting the whole load.

use thiserror::Error;

/// Result type for metadata operations.
pub type Result<T> = std::result::Result<T, MetadataError>;

/// Errors raised while building metadata records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    /// A required identifying field is absent or blank
    #[error("Malformed {kind} metadata: missing required field '{field}'")]
    Malformed {
        /// Record kind (feed, staging, enumeration)
        kind: &'static str,
        /// Name of the missing field
        field: &'static str,
    },
}

impl MetadataError {
    /// Creates a new malformed-record error.
    pub fn malformed(kind: &'static str, field: &'static str) -> Self {
        Self::Malformed { kind, field }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display() {
        let err = MetadataError::malformed("feed", "module");
        assert_eq!(
            err.to_string(),
            "Malformed feed metadata: missing required field 'module'"
        );
    }
}
