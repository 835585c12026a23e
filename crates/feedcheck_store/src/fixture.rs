//! In-memory [`DataStore`] with canned statistics.
//!
//! Tables are described by their row count and per-column statistics rather
//! than by data. Stores can be marked unreachable and tables can be made to
//! fail every probe. Every trait call is logged so tests can assert what was
//! (and was not) queried.

use crate::{ColumnInfo, DataStore, RangeCounts, Result, StoreError, TableSchema};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

/// Canned statistics for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureColumn {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub null_count: u64,
    /// Defaults to every non-null value being distinct
    pub distinct_count: Option<u64>,
    pub below_range: u64,
    pub above_range: u64,
    pub invalid_count: u64,
}

impl FixtureColumn {
    /// A nullable column with no nulls and no violations.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            null_count: 0,
            distinct_count: None,
            below_range: 0,
            above_range: 0,
            invalid_count: 0,
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn null_count(mut self, null_count: u64) -> Self {
        self.null_count = null_count;
        self
    }

    pub fn distinct_count(mut self, distinct_count: u64) -> Self {
        self.distinct_count = Some(distinct_count);
        self
    }

    pub fn out_of_range(mut self, below: u64, above: u64) -> Self {
        self.below_range = below;
        self.above_range = above;
        self
    }

    pub fn invalid_count(mut self, invalid_count: u64) -> Self {
        self.invalid_count = invalid_count;
        self
    }
}

/// Canned table: a row count and its columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixtureTable {
    pub row_count: u64,
    pub columns: Vec<FixtureColumn>,
    pub primary_keys: Vec<String>,
}

impl FixtureTable {
    pub fn new(row_count: u64) -> Self {
        Self {
            row_count,
            ..Default::default()
        }
    }

    pub fn column(mut self, column: FixtureColumn) -> Self {
        self.columns.push(column);
        self
    }

    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_keys.push(column.into());
        self
    }

    fn find(&self, column: &str) -> Option<&FixtureColumn> {
        self.columns.iter().find(|c| c.name == column)
    }
}

/// Test double for [`DataStore`].
#[derive(Debug, Default)]
pub struct FixtureStore {
    tables: HashMap<(String, String), FixtureTable>,
    stores: Vec<String>,
    unreachable: HashSet<String>,
    failing: HashMap<(String, String), String>,
    calls: Mutex<Vec<String>>,
}

impl FixtureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table, registering its store.
    pub fn with_table(
        mut self,
        store: impl Into<String>,
        table: impl Into<String>,
        fixture: FixtureTable,
    ) -> Self {
        let store = store.into();
        self.register_store(&store);
        self.tables.insert((store, table.into()), fixture);
        self
    }

    /// Registers a store that cannot be reached.
    pub fn with_unreachable_store(mut self, store: impl Into<String>) -> Self {
        let store = store.into();
        self.register_store(&store);
        self.unreachable.insert(store);
        self
    }

    /// Makes every probe of a table fail with `message`.
    pub fn with_failing_table(
        mut self,
        store: impl Into<String>,
        table: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let store = store.into();
        self.register_store(&store);
        self.failing.insert((store, table.into()), message.into());
        self
    }

    /// Calls made so far, formatted `"<method> <store>.<table>[.<column>]"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn register_store(&mut self, store: &str) {
        if !self.stores.iter().any(|s| s == store) {
            self.stores.push(store.to_string());
        }
    }

    fn log(&self, entry: String) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    fn table(&self, store: &str, table: &str) -> Result<&FixtureTable> {
        if self.unreachable.contains(store) || !self.stores.iter().any(|s| s == store) {
            return Err(StoreError::connectivity(store, "connection refused"));
        }

        let key = (store.to_string(), table.to_string());
        if let Some(message) = self.failing.get(&key) {
            return Err(StoreError::query(store, message.clone()));
        }

        self.tables
            .get(&key)
            .ok_or_else(|| StoreError::query(store, format!("table '{table}' not found")))
    }

    fn column(&self, store: &str, table: &str, column: &str) -> Result<(&FixtureTable, &FixtureColumn)> {
        let fixture = self.table(store, table)?;
        let found = fixture.find(column).ok_or_else(|| {
            StoreError::query(store, format!("column '{column}' not found in '{table}'"))
        })?;
        Ok((fixture, found))
    }
}

impl DataStore for FixtureStore {
    fn store_names(&self) -> Vec<String> {
        self.stores.clone()
    }

    fn test_connection(&self, store: &str) -> bool {
        self.log(format!("test_connection {store}"));
        self.stores.iter().any(|s| s == store) && !self.unreachable.contains(store)
    }

    fn table_exists(&self, store: &str, table: &str) -> Result<bool> {
        self.log(format!("table_exists {store}.{table}"));
        if self.unreachable.contains(store) {
            return Err(StoreError::connectivity(store, "connection refused"));
        }
        let key = (store.to_string(), table.to_string());
        Ok(self.tables.contains_key(&key) || self.failing.contains_key(&key))
    }

    fn get_schema(&self, store: &str, table: &str) -> Result<TableSchema> {
        self.log(format!("get_schema {store}.{table}"));
        let fixture = self
            .table(store, table)
            .map_err(|e| StoreError::introspection(store, table, e.to_string()))?;

        Ok(TableSchema {
            columns: fixture
                .columns
                .iter()
                .map(|c| ColumnInfo {
                    name: c.name.clone(),
                    data_type: c.data_type.clone(),
                    nullable: c.nullable,
                })
                .collect(),
            primary_keys: fixture.primary_keys.clone(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        })
    }

    fn get_row_count(&self, store: &str, table: &str, _filter: Option<&str>) -> Result<u64> {
        self.log(format!("get_row_count {store}.{table}"));
        Ok(self.table(store, table)?.row_count)
    }

    fn check_nullable(&self, store: &str, table: &str, column: &str) -> Result<(bool, u64)> {
        self.log(format!("check_nullable {store}.{table}.{column}"));
        let (_, found) = self.column(store, table, column)?;
        Ok((found.nullable, found.null_count))
    }

    fn check_unique(&self, store: &str, table: &str, column: &str) -> Result<(u64, u64)> {
        self.log(format!("check_unique {store}.{table}.{column}"));
        let (fixture, found) = self.column(store, table, column)?;
        let distinct = found
            .distinct_count
            .unwrap_or_else(|| fixture.row_count.saturating_sub(found.null_count));
        Ok((fixture.row_count, distinct))
    }

    fn check_range(
        &self,
        store: &str,
        table: &str,
        column: &str,
        bottom: Option<&str>,
        top: Option<&str>,
    ) -> Result<RangeCounts> {
        self.log(format!("check_range {store}.{table}.{column}"));
        let (_, found) = self.column(store, table, column)?;
        Ok(RangeCounts {
            below_range: if bottom.is_some() { found.below_range } else { 0 },
            above_range: if top.is_some() { found.above_range } else { 0 },
        })
    }

    fn check_enumeration(
        &self,
        store: &str,
        table: &str,
        column: &str,
        allowed: &[String],
    ) -> Result<u64> {
        self.log(format!("check_enumeration {store}.{table}.{column}"));
        if allowed.is_empty() {
            return Err(StoreError::configuration("empty allowed-value set"));
        }
        let (_, found) = self.column(store, table, column)?;
        Ok(found.invalid_count)
    }
}
