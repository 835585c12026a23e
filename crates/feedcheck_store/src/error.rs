//! Error types for store access.

use thiserror::Error;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised while probing a store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store cannot be opened or reached
    #[error("Cannot connect to store '{store}': {message}")]
    Connectivity { store: String, message: String },

    /// The store is reachable but the table cannot be described
    #[error("Cannot describe table '{table}' in store '{store}': {message}")]
    Introspection {
        store: String,
        table: String,
        message: String,
    },

    /// A probe query failed
    #[error("Query failed on store '{store}': {message}")]
    Query { store: String, message: String },

    /// Store configuration is invalid
    #[error("Invalid store configuration: {0}")]
    Configuration(String),

    /// I/O failure while reading configuration or starting the runtime
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Creates a new connectivity error.
    pub fn connectivity(store: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connectivity {
            store: store.into(),
            message: message.into(),
        }
    }

    /// Creates a new introspection error.
    pub fn introspection(
        store: impl Into<String>,
        table: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Introspection {
            store: store.into(),
            table: table.into(),
            message: message.into(),
        }
    }

    /// Creates a new query error.
    pub fn query(store: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Query {
            store: store.into(),
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::introspection("warehouse", "orders", "table not found");
        assert_eq!(
            err.to_string(),
            "Cannot describe table 'orders' in store 'warehouse': table not found"
        );

        let err = StoreError::connectivity("archive", "unknown store");
        assert_eq!(
            err.to_string(),
            "Cannot connect to store 'archive': unknown store"
        );
    }
}
