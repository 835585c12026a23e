//! Data access layer for feedcheck.
//!
//! A [`DataStore`] manages a fixed set of named relational stores and exposes
//! the introspection and counting primitives the validators need. Every call
//! is synchronous and blocking; failures propagate as [`StoreError`] and the
//! caller decides how to contain them.
//!
//! [`DataFusionStore`] is the concrete backend: each named store is a
//! DataFusion session over CSV, Parquet or JSON files.
//!
//! # Example
//!
//! ```no_run
//! use feedcheck_store::{DataFusionStore, DataStore, StoreConfig};
//!
//! # fn example() -> Result<(), feedcheck_store::StoreError> {
//! let config = StoreConfig::from_file("stores.toml")?;
//! let store = DataFusionStore::new(config)?;
//!
//! if store.test_connection("warehouse") {
//!     let rows = store.get_row_count("warehouse", "orders", None)?;
//!     println!("orders: {rows} rows");
//! }
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod error;
#[cfg(any(test, feature = "testing"))]
pub mod fixture;
pub mod sql;
pub mod types;

pub use backend::DataFusionStore;
pub use config::{
    ColumnSpec, FileFormat, StoreConfig, StoreConfigBuilder, StoreDefinition, TableSource,
};
pub use error::{Result, StoreError};
#[cfg(any(test, feature = "testing"))]
pub use fixture::{FixtureColumn, FixtureStore, FixtureTable};
pub use types::{TypeBucket, type_compatible};

use serde::Serialize;

/// One column as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    /// Store-native type name
    pub data_type: String,
    pub nullable: bool,
}

/// Description of a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub columns: Vec<ColumnInfo>,
    pub primary_keys: Vec<String>,
    pub foreign_keys: Vec<String>,
    pub indexes: Vec<String>,
}

impl TableSchema {
    /// Looks up a column by exact name.
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|column| column.name == name)
    }
}

/// Rows outside a declared range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RangeCounts {
    pub below_range: u64,
    pub above_range: u64,
}

impl RangeCounts {
    pub fn total(&self) -> u64 {
        self.below_range + self.above_range
    }
}

/// Introspection and counting primitives over named stores.
///
/// Implementations open connections lazily and reuse them for the run.
pub trait DataStore: Send + Sync {
    /// Names of the stores this instance manages.
    fn store_names(&self) -> Vec<String>;

    /// Returns false on any failure; never errors.
    fn test_connection(&self, store: &str) -> bool;

    fn table_exists(&self, store: &str, table: &str) -> Result<bool>;

    /// # Errors
    ///
    /// Returns [`StoreError::Introspection`] if the store is unreachable or
    /// the table cannot be described.
    fn get_schema(&self, store: &str, table: &str) -> Result<TableSchema>;

    /// Counts rows, optionally restricted by a SQL filter expression.
    fn get_row_count(&self, store: &str, table: &str, filter: Option<&str>) -> Result<u64>;

    /// Returns the schema nullable flag and the number of null values.
    fn check_nullable(&self, store: &str, table: &str, column: &str) -> Result<(bool, u64)>;

    /// Returns `(total_count, distinct_count)`; distinct excludes nulls.
    fn check_unique(&self, store: &str, table: &str, column: &str) -> Result<(u64, u64)>;

    /// Counts rows outside the given bounds. Only present bounds are checked.
    fn check_range(
        &self,
        store: &str,
        table: &str,
        column: &str,
        bottom: Option<&str>,
        top: Option<&str>,
    ) -> Result<RangeCounts>;

    /// Counts non-null values not in `allowed`.
    fn check_enumeration(
        &self,
        store: &str,
        table: &str,
        column: &str,
        allowed: &[String],
    ) -> Result<u64>;

    /// Returns true if the two type names are equal or share a [`TypeBucket`].
    fn type_compatible(&self, actual_type: &str, expected_type: &str) -> bool {
        types::type_compatible(actual_type, expected_type)
    }
}
