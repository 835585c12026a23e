//! DataFusion-backed store registry.
//!
//! Each named store is one [`SessionContext`] with its configured tables
//! registered under bare names. Sessions open on first use and are cached for
//! the lifetime of the store. A source file that has not landed leaves its
//! table unregistered; only a missing root makes the whole store unreachable.
//! The async DataFusion API is driven from a
//! private current-thread runtime, so callers must not already be inside a
//! tokio runtime.

use crate::config::{FileFormat, StoreConfig, StoreDefinition, TableSource};
use crate::{ColumnInfo, DataStore, RangeCounts, Result, StoreError, TableSchema, sql};
use arrow_array::{Array, Int64Array, RecordBatch};
use arrow_schema::Schema;
use datafusion::common::TableReference;
use datafusion::prelude::{CsvReadOptions, NdJsonReadOptions, ParquetReadOptions, SessionContext};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

const PING: &str = "SELECT 1 AS ping";

/// [`DataStore`] over DataFusion sessions.
pub struct DataFusionStore {
    config: StoreConfig,
    runtime: Runtime,
    sessions: Mutex<HashMap<String, SessionContext>>,
}

impl DataFusionStore {
    /// Creates a store registry. No session is opened until first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the runtime cannot start.
    pub fn new(config: StoreConfig) -> Result<Self> {
        config.validate()?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        Ok(Self {
            config,
            runtime,
            sessions: Mutex::new(HashMap::new()),
        })
    }

    /// Registers a pre-built session under `store`, replacing any lazy one.
    pub fn with_session(self, store: impl Into<String>, ctx: SessionContext) -> Self {
        self.lock_sessions().insert(store.into(), ctx);
        self
    }

    /// The configuration this registry was built from.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn lock_sessions(&self) -> MutexGuard<'_, HashMap<String, SessionContext>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn session(&self, store: &str) -> Result<SessionContext> {
        if let Some(ctx) = self.lock_sessions().get(store) {
            return Ok(ctx.clone());
        }

        let definition = self
            .config
            .store(store)
            .ok_or_else(|| StoreError::connectivity(store, "store is not configured"))?;

        let ctx = self.open_session(definition)?;
        self.lock_sessions().insert(store.to_string(), ctx.clone());
        Ok(ctx)
    }

    fn open_session(&self, definition: &StoreDefinition) -> Result<SessionContext> {
        info!(
            "Opening store '{}' with {} table(s)",
            definition.name,
            definition.tables.len()
        );

        if let Some(root) = definition.root.as_ref().filter(|root| !root.is_dir()) {
            return Err(StoreError::connectivity(
                &definition.name,
                format!("root directory not found: {}", root.display()),
            ));
        }

        let ctx = SessionContext::new();
        for table in &definition.tables {
            let path = definition.table_path(table);
            // A feed that has not landed leaves its table unregistered
            if !path.exists() {
                warn!(
                    store = %definition.name,
                    table = %table.name,
                    path = %path.display(),
                    "Table source not found, skipping"
                );
                continue;
            }
            let schema = table.arrow_schema()?;
            let delimiter = table.delimiter_byte()?;

            debug!(
                store = %definition.name,
                table = %table.name,
                path = %path.display(),
                "Registering table"
            );

            self.runtime
                .block_on(register_table(&ctx, table, &path, schema.as_ref(), delimiter))
                .map_err(|e| {
                    StoreError::connectivity(
                        &definition.name,
                        format!(
                            "cannot register table '{}' from {}: {}",
                            table.name,
                            path.display(),
                            e
                        ),
                    )
                })?;
        }

        Ok(ctx)
    }

    fn query_counts(&self, store: &str, statement: &str) -> Result<Vec<u64>> {
        let ctx = self.session(store)?;
        debug!(store, statement, "Executing probe");

        let batches = self
            .runtime
            .block_on(async { ctx.sql(statement).await?.collect().await })
            .map_err(|e| StoreError::query(store, e.to_string()))?;

        let batch = batches
            .iter()
            .find(|batch| batch.num_rows() > 0)
            .ok_or_else(|| StoreError::query(store, format!("no rows returned by: {statement}")))?;

        (0..batch.num_columns())
            .map(|index| {
                count_at(batch, index).ok_or_else(|| {
                    StoreError::query(
                        store,
                        format!("column {index} is not a count in: {statement}"),
                    )
                })
            })
            .collect()
    }

    fn query_count(&self, store: &str, statement: &str) -> Result<u64> {
        self.query_counts(store, statement)?
            .first()
            .copied()
            .ok_or_else(|| StoreError::query(store, format!("empty result for: {statement}")))
    }
}

impl DataStore for DataFusionStore {
    fn store_names(&self) -> Vec<String> {
        let mut names = self.config.store_names();
        let mut injected: Vec<String> = self
            .lock_sessions()
            .keys()
            .filter(|name| !names.contains(*name))
            .cloned()
            .collect();
        injected.sort();
        names.extend(injected);
        names
    }

    fn test_connection(&self, store: &str) -> bool {
        match self.query_count(store, PING) {
            Ok(_) => true,
            Err(err) => {
                warn!("Connection test failed for store '{}': {}", store, err);
                false
            }
        }
    }

    fn table_exists(&self, store: &str, table: &str) -> Result<bool> {
        let ctx = self.session(store)?;
        ctx.table_exist(TableReference::bare(table))
            .map_err(|e| StoreError::introspection(store, table, e.to_string()))
    }

    fn get_schema(&self, store: &str, table: &str) -> Result<TableSchema> {
        let ctx = self
            .session(store)
            .map_err(|e| StoreError::introspection(store, table, e.to_string()))?;

        let frame = self
            .runtime
            .block_on(ctx.table(TableReference::bare(table)))
            .map_err(|e| StoreError::introspection(store, table, e.to_string()))?;

        let source = self
            .config
            .store(store)
            .and_then(|definition| definition.find_table(table));

        let columns = frame
            .schema()
            .fields()
            .iter()
            .map(|field| ColumnInfo {
                name: field.name().clone(),
                data_type: field.data_type().to_string(),
                nullable: source
                    .and_then(|source| source.declared_nullable(field.name()))
                    .unwrap_or_else(|| field.is_nullable()),
            })
            .collect();

        let primary_keys = source
            .map(|source| source.primary_key.clone())
            .unwrap_or_default();

        debug!(store, table, "Described table");
        Ok(TableSchema {
            columns,
            primary_keys,
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        })
    }

    fn get_row_count(&self, store: &str, table: &str, filter: Option<&str>) -> Result<u64> {
        self.query_count(store, &sql::row_count(table, filter))
    }

    fn check_nullable(&self, store: &str, table: &str, column: &str) -> Result<(bool, u64)> {
        let schema = self.get_schema(store, table)?;
        let nullable = schema
            .column(column)
            .map(|info| info.nullable)
            .ok_or_else(|| {
                StoreError::introspection(store, table, format!("column '{column}' not found"))
            })?;

        let null_count = self.query_count(store, &sql::null_count(table, column))?;
        Ok((nullable, null_count))
    }

    fn check_unique(&self, store: &str, table: &str, column: &str) -> Result<(u64, u64)> {
        match self.query_counts(store, &sql::distinct_count(table, column))?[..] {
            [total, distinct, ..] => Ok((total, distinct)),
            _ => Err(StoreError::query(
                store,
                format!("distinct count for '{table}.{column}' returned too few columns"),
            )),
        }
    }

    fn check_range(
        &self,
        store: &str,
        table: &str,
        column: &str,
        bottom: Option<&str>,
        top: Option<&str>,
    ) -> Result<RangeCounts> {
        let mut counts = RangeCounts::default();
        if let Some(bottom) = bottom {
            counts.below_range = self.query_count(store, &sql::below_range(table, column, bottom))?;
        }
        if let Some(top) = top {
            counts.above_range = self.query_count(store, &sql::above_range(table, column, top))?;
        }
        Ok(counts)
    }

    fn check_enumeration(
        &self,
        store: &str,
        table: &str,
        column: &str,
        allowed: &[String],
    ) -> Result<u64> {
        if allowed.is_empty() {
            return Err(StoreError::configuration(format!(
                "empty allowed-value set for '{store}.{table}.{column}'"
            )));
        }
        self.query_count(store, &sql::invalid_enumeration(table, column, allowed))
    }
}

async fn register_table(
    ctx: &SessionContext,
    table: &TableSource,
    path: &Path,
    schema: Option<&Schema>,
    delimiter: u8,
) -> datafusion::error::Result<()> {
    let location = path.to_string_lossy();
    let location: &str = &location;
    let extension = file_extension(path, table.format);
    let reference = TableReference::bare(table.name.as_str());

    match table.format {
        FileFormat::Csv => {
            let mut options = CsvReadOptions::new()
                .has_header(table.has_header)
                .delimiter(delimiter)
                .file_extension(&extension);
            if let Some(schema) = schema {
                options = options.schema(schema);
            }
            ctx.register_csv(reference, location, options).await
        }
        FileFormat::Parquet => {
            let options = ParquetReadOptions {
                file_extension: &extension,
                ..Default::default()
            };
            ctx.register_parquet(reference, location, options).await
        }
        FileFormat::Json => {
            let mut options = NdJsonReadOptions::default().file_extension(&extension);
            if let Some(schema) = schema {
                options = options.schema(schema);
            }
            ctx.register_json(reference, location, options).await
        }
    }
}

/// Extension filter for the listing: the file's own for single files.
fn file_extension(path: &Path, format: FileFormat) -> String {
    if path.is_dir() {
        return match format {
            FileFormat::Csv => ".csv",
            FileFormat::Parquet => ".parquet",
            FileFormat::Json => ".json",
        }
        .to_string();
    }

    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

fn count_at(batch: &RecordBatch, index: usize) -> Option<u64> {
    let array = batch.column(index).as_any().downcast_ref::<Int64Array>()?;
    if array.is_empty() || array.is_null(0) {
        return Some(0);
    }
    u64::try_from(array.value(0)).ok()
}
