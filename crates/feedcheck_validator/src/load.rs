//! Insert/Append load-mode classification.
//!
//! Each table's declared request mode is classified and its current row count
//! recorded. The mode is read from the first column record of the table.
//! No truncation or additive-growth check is made against the data.

use crate::ValidationError;
use crate::group::{TableGroup, group_by_table};
use crate::outcome::evaluate;
use feedcheck_core::{
    CheckDetail, FeedMetadata, InsertAppendDetail, RequestMode, ValidationContext,
    ValidationRecord,
};
use feedcheck_store::DataStore;
use tracing::info;

const INSERT_BEHAVIOR: &str = "Fresh data load - table should be truncated before insert";
const APPEND_BEHAVIOR: &str = "Data should be appended to existing data";

/// Classifies the declared load mode of each table.
pub struct LoadValidator<'a> {
    store: &'a dyn DataStore,
}

impl<'a> LoadValidator<'a> {
    /// Creates a new load validator over `store`.
    pub fn new(store: &'a dyn DataStore) -> Self {
        Self { store }
    }

    pub fn validate_insert_append(
        &self,
        metadata: &[FeedMetadata],
        context: &ValidationContext,
    ) -> Vec<ValidationRecord> {
        info!("Starting insert/append logic validation");
        let selected = context.filter_feeds(metadata);

        let records: Vec<_> = group_by_table(&selected)
            .iter()
            .map(|group| self.check_request(group))
            .collect();

        info!("Insert/append validation completed: {} table(s)", records.len());
        records
    }

    fn check_request(&self, group: &TableGroup<'_>) -> ValidationRecord {
        let request = &group.lead.request;
        let detail = InsertAppendDetail {
            request_type: request.to_string(),
            current_row_count: None,
            expected_behavior: None,
        };

        evaluate(
            group.lead,
            "validating insert/append logic",
            detail,
            CheckDetail::InsertAppend,
            |detail| {
                let behavior = match request {
                    RequestMode::Insert => INSERT_BEHAVIOR,
                    RequestMode::Append => APPEND_BEHAVIOR,
                    RequestMode::Other(raw) => {
                        return Err(ValidationError::unknown_request_mode(raw.clone()));
                    }
                };
                detail.expected_behavior = Some(behavior.to_string());

                let rows = self
                    .store
                    .get_row_count(group.db_name(), group.table_name(), None)?;
                detail.current_row_count = Some(rows);

                Ok(vec![])
            },
        )
    }
}
