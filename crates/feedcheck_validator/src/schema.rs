//! Table structure validation.
//!
//! - Table existence: the store is reachable and the table is registered
//! - Data types: every declared column exists with a compatible type

use crate::group::{TableGroup, group_by_table};
use crate::outcome::evaluate;
use crate::ValidationError;
use feedcheck_core::{
    CheckDetail, ColumnTypeCheck, DataTypeDetail, FeedMetadata, TableExistenceDetail,
    ValidationContext, ValidationRecord,
};
use feedcheck_store::{DataStore, StoreError};
use tracing::info;

/// Validates that tables exist and match their declared column types.
pub struct SchemaValidator<'a> {
    store: &'a dyn DataStore,
}

impl<'a> SchemaValidator<'a> {
    /// Creates a new schema validator over `store`.
    pub fn new(store: &'a dyn DataStore) -> Self {
        Self { store }
    }

    /// One record per table: PASS if it exists, FAIL if not, ERROR if the
    /// store is unreachable.
    pub fn validate_table_existence(
        &self,
        metadata: &[FeedMetadata],
        context: &ValidationContext,
    ) -> Vec<ValidationRecord> {
        info!("Starting table existence validation");
        let selected = context.filter_feeds(metadata);

        let records: Vec<_> = group_by_table(&selected)
            .iter()
            .map(|group| self.check_existence(group))
            .collect();

        info!("Table existence validation completed: {} table(s)", records.len());
        records
    }

    fn check_existence(&self, group: &TableGroup<'_>) -> ValidationRecord {
        let (db, table) = (group.db_name(), group.table_name());

        evaluate(
            group.lead,
            "checking table existence",
            TableExistenceDetail::default(),
            CheckDetail::TableExistence,
            |detail| {
                let reachable = self.store.test_connection(db);
                detail.store_reachable = Some(reachable);
                if !reachable {
                    return Err(StoreError::connectivity(db, "connection test failed").into());
                }

                let exists = self.store.table_exists(db, table)?;
                detail.table_exists = Some(exists);

                Ok(if exists {
                    vec![]
                } else {
                    vec![format!("Table {} does not exist in {}", table, db)]
                })
            },
        )
    }

    /// One record per table listing each declared column's type check.
    pub fn validate_data_types(
        &self,
        metadata: &[FeedMetadata],
        context: &ValidationContext,
    ) -> Vec<ValidationRecord> {
        info!("Starting data type validation");
        let selected = context.filter_feeds(metadata);

        let records: Vec<_> = group_by_table(&selected)
            .iter()
            .map(|group| self.check_types(group))
            .collect();

        info!("Data type validation completed: {} table(s)", records.len());
        records
    }

    fn check_types(&self, group: &TableGroup<'_>) -> ValidationRecord {
        evaluate(
            group.lead,
            "validating data types",
            DataTypeDetail::default(),
            CheckDetail::DataType,
            |detail| {
                let schema = self
                    .store
                    .get_schema(group.db_name(), group.table_name())
                    .map_err(ValidationError::from)?;

                let mut failures = Vec::new();
                for meta in &group.columns {
                    let check = match schema.column(&meta.column_name) {
                        None => ColumnTypeCheck {
                            column_name: meta.column_name.clone(),
                            expected_type: meta.data_type.clone(),
                            actual_type: None,
                            validation_passed: false,
                            error_message: Some(format!(
                                "Column {} not found in table",
                                meta.column_name
                            )),
                        },
                        Some(column) => {
                            let compatible =
                                self.store.type_compatible(&column.data_type, &meta.data_type);
                            ColumnTypeCheck {
                                column_name: meta.column_name.clone(),
                                expected_type: meta.data_type.clone(),
                                actual_type: Some(column.data_type.clone()),
                                validation_passed: compatible,
                                error_message: (!compatible).then(|| {
                                    format!(
                                        "Data type mismatch for column {}: expected {}, got {}",
                                        meta.column_name, meta.data_type, column.data_type
                                    )
                                }),
                            }
                        }
                    };

                    if let Some(message) = &check.error_message {
                        failures.push(message.clone());
                    }
                    detail.column_validations.push(check);
                }

                Ok(failures)
            },
        )
    }
}
