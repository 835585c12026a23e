//! Table-level data quality validation.
//!
//! - Count: the table holds rows, and as many as expected when an
//!   expectation is supplied for it
//! - Completeness: the share of non-null values across declared columns

use crate::group::{TableGroup, group_by_table};
use crate::outcome::evaluate;
use feedcheck_core::{
    CheckDetail, ColumnCompleteness, CompletenessDetail, CountDetail, FeedMetadata,
    ValidationContext, ValidationRecord,
};
use feedcheck_store::DataStore;
use tracing::info;

/// Minimum overall completeness, in percent, for a table to pass.
pub const COMPLETENESS_THRESHOLD: f64 = 95.0;

/// Validates row counts and completeness per table.
pub struct QualityValidator<'a> {
    store: &'a dyn DataStore,
}

impl<'a> QualityValidator<'a> {
    /// Creates a new quality validator over `store`.
    pub fn new(store: &'a dyn DataStore) -> Self {
        Self { store }
    }

    /// One record per table comparing its row count against
    /// `context.expected_count("<store>.<table>")`.
    pub fn validate_count(
        &self,
        metadata: &[FeedMetadata],
        context: &ValidationContext,
    ) -> Vec<ValidationRecord> {
        info!("Starting count validation");
        let selected = context.filter_feeds(metadata);

        let records: Vec<_> = group_by_table(&selected)
            .iter()
            .map(|group| self.check_count(group, context.expected_count(&group.key())))
            .collect();

        info!("Count validation completed: {} table(s)", records.len());
        records
    }

    fn check_count(&self, group: &TableGroup<'_>, expected: Option<u64>) -> ValidationRecord {
        let detail = CountDetail {
            actual_count: None,
            expected_count: expected,
        };

        evaluate(
            group.lead,
            "validating count checks",
            detail,
            CheckDetail::Count,
            |detail| {
                let actual = self
                    .store
                    .get_row_count(group.db_name(), group.table_name(), None)?;
                detail.actual_count = Some(actual);

                // An empty table is reported as such even when a count was expected
                if actual == 0 {
                    return Ok(vec!["Table is empty".to_string()]);
                }

                Ok(match expected {
                    Some(expected) if expected != actual => vec![format!(
                        "Count mismatch: expected {}, got {}",
                        expected, actual
                    )],
                    _ => vec![],
                })
            },
        )
    }

    /// One record per table scoring the completeness of its declared columns.
    pub fn validate_completeness(
        &self,
        metadata: &[FeedMetadata],
        context: &ValidationContext,
    ) -> Vec<ValidationRecord> {
        info!("Starting completeness validation");
        let selected = context.filter_feeds(metadata);

        let records: Vec<_> = group_by_table(&selected)
            .iter()
            .map(|group| self.check_completeness(group))
            .collect();

        info!("Completeness validation completed: {} table(s)", records.len());
        records
    }

    fn check_completeness(&self, group: &TableGroup<'_>) -> ValidationRecord {
        let (db, table) = (group.db_name(), group.table_name());

        evaluate(
            group.lead,
            "validating completeness checks",
            CompletenessDetail::default(),
            CheckDetail::Completeness,
            |detail| {
                let total = self.store.get_row_count(db, table, None)?;
                detail.total_rows = Some(total);

                if total == 0 {
                    return Ok(vec![
                        "Table is empty - cannot check completeness".to_string(),
                    ]);
                }

                let mut raw_scores = Vec::with_capacity(group.columns.len());
                for meta in &group.columns {
                    let (_, nulls) = self.store.check_nullable(db, table, &meta.column_name)?;
                    let nulls = nulls.min(total);
                    let score = (total - nulls) as f64 / total as f64 * 100.0;

                    raw_scores.push(score);
                    detail.column_completeness.push(ColumnCompleteness {
                        column_name: meta.column_name.clone(),
                        total_rows: total,
                        null_count: nulls,
                        completeness_percentage: round2(score),
                        is_mandatory: meta.mandatory.is_yes(),
                    });
                }

                let overall = if raw_scores.is_empty() {
                    100.0
                } else {
                    round2(raw_scores.iter().sum::<f64>() / raw_scores.len() as f64)
                };
                detail.overall_completeness_score = Some(overall);

                let mut failures = Vec::new();
                if overall < COMPLETENESS_THRESHOLD {
                    failures.push(format!("Low completeness score: {}%", overall));
                }

                let incomplete: Vec<&str> = detail
                    .column_completeness
                    .iter()
                    .filter(|c| c.is_mandatory && c.completeness_percentage < 100.0)
                    .map(|c| c.column_name.as_str())
                    .collect();
                if !incomplete.is_empty() {
                    failures.push(format!(
                        "Mandatory columns not fully populated: {}",
                        incomplete.join(", ")
                    ));
                }

                Ok(failures)
            },
        )
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedcheck_core::{FeedMetadataBuilder, ValidationStatus};
    use feedcheck_store::{FixtureColumn, FixtureStore, FixtureTable};
    use pretty_assertions::assert_eq;

    fn column(table: &str, name: &str) -> FeedMetadataBuilder {
        FeedMetadataBuilder::new("Sales", &format!("{table}.csv"), "warehouse", table, name)
    }

    fn store() -> FixtureStore {
        FixtureStore::new()
            .with_table(
                "warehouse",
                "orders",
                FixtureTable::new(200)
                    .column(FixtureColumn::new("order_id", "Int64"))
                    .column(FixtureColumn::new("note", "Utf8").null_count(30)),
            )
            .with_table(
                "warehouse",
                "customers",
                FixtureTable::new(3).column(FixtureColumn::new("id", "Int64")),
            )
            .with_table("warehouse", "staging", FixtureTable::new(0))
    }

    #[test]
    fn test_count_against_expectation() {
        let store = store();
        let validator = QualityValidator::new(&store);
        let metadata = vec![
            column("orders", "order_id").build(),
            column("orders", "note").build(),
            column("customers", "id").build(),
        ];
        let context = ValidationContext::new()
            .with_expected_count("warehouse.orders", 200)
            .with_expected_count("warehouse.customers", 5);

        let records = validator.validate_count(&metadata, &context);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].status, ValidationStatus::Pass);
        assert_eq!(records[1].status, ValidationStatus::Fail);
        assert_eq!(
            records[1].error_message.as_deref(),
            Some("Count mismatch: expected 5, got 3")
        );
    }

    #[test]
    fn test_count_without_expectation_only_needs_rows() {
        let store = store();
        let validator = QualityValidator::new(&store);
        let metadata = vec![column("customers", "id").build()];

        let records = validator.validate_count(&metadata, &ValidationContext::new());

        assert_eq!(records[0].status, ValidationStatus::Pass);
        assert_eq!(
            records[0].detail,
            CheckDetail::Count(CountDetail {
                actual_count: Some(3),
                expected_count: None,
            })
        );
    }

    #[test]
    fn test_empty_table_overrides_mismatch() {
        let store = store();
        let validator = QualityValidator::new(&store);
        let metadata = vec![column("staging", "id").build()];
        let context = ValidationContext::new().with_expected_count("warehouse.staging", 10);

        let records = validator.validate_count(&metadata, &context);

        assert_eq!(records[0].status, ValidationStatus::Fail);
        assert_eq!(records[0].error_message.as_deref(), Some("Table is empty"));
    }

    #[test]
    fn test_completeness_scores() {
        let store = store();
        let validator = QualityValidator::new(&store);
        let metadata = vec![
            column("orders", "order_id").mandatory(true).build(),
            column("orders", "note").build(),
        ];

        let records = validator.validate_completeness(&metadata, &ValidationContext::new());

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.status, ValidationStatus::Fail);
        assert_eq!(
            record.error_message.as_deref(),
            Some("Low completeness score: 92.5%")
        );

        let CheckDetail::Completeness(detail) = &record.detail else {
            panic!("expected completeness detail");
        };
        assert_eq!(detail.total_rows, Some(200));
        assert_eq!(detail.overall_completeness_score, Some(92.5));
        assert_eq!(detail.column_completeness[0].completeness_percentage, 100.0);
        assert_eq!(detail.column_completeness[1].completeness_percentage, 85.0);
        assert!(detail.column_completeness[0].is_mandatory);
    }

    #[test]
    fn test_completeness_mandatory_column_with_nulls() {
        let store = FixtureStore::new().with_table(
            "warehouse",
            "orders",
            FixtureTable::new(1000).column(FixtureColumn::new("note", "Utf8").null_count(1)),
        );
        let validator = QualityValidator::new(&store);
        let metadata = vec![column("orders", "note").mandatory(true).build()];

        let records = validator.validate_completeness(&metadata, &ValidationContext::new());

        assert_eq!(records[0].status, ValidationStatus::Fail);
        assert_eq!(
            records[0].error_message.as_deref(),
            Some("Mandatory columns not fully populated: note")
        );
    }

    #[test]
    fn test_completeness_mandatory_column_rounding_to_full() {
        let store = FixtureStore::new().with_table(
            "warehouse",
            "orders",
            FixtureTable::new(1_000_000).column(FixtureColumn::new("note", "Utf8").null_count(1)),
        );
        let validator = QualityValidator::new(&store);
        let metadata = vec![column("orders", "note").mandatory(true).build()];

        let records = validator.validate_completeness(&metadata, &ValidationContext::new());

        assert_eq!(records[0].status, ValidationStatus::Pass);
        assert_eq!(records[0].error_message, None);
        let CheckDetail::Completeness(detail) = &records[0].detail else {
            panic!("expected completeness detail");
        };
        assert_eq!(detail.column_completeness[0].null_count, 1);
        assert_eq!(detail.column_completeness[0].completeness_percentage, 100.0);
        assert_eq!(detail.overall_completeness_score, Some(100.0));
    }

    #[test]
    fn test_completeness_empty_table() {
        let store = store();
        let validator = QualityValidator::new(&store);
        let metadata = vec![column("staging", "id").build()];

        let records = validator.validate_completeness(&metadata, &ValidationContext::new());

        assert_eq!(records[0].status, ValidationStatus::Fail);
        assert_eq!(
            records[0].error_message.as_deref(),
            Some("Table is empty - cannot check completeness")
        );
        assert!(store.calls().iter().all(|c| !c.starts_with("check_nullable")));
    }

    #[test]
    fn test_completeness_missing_column_is_error() {
        let store = store();
        let validator = QualityValidator::new(&store);
        let metadata = vec![
            column("customers", "id").build(),
            column("customers", "ghost").build(),
        ];

        let records = validator.validate_completeness(&metadata, &ValidationContext::new());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, ValidationStatus::Error);
        let CheckDetail::Completeness(detail) = &records[0].detail else {
            panic!("expected completeness detail");
        };
        assert_eq!(detail.column_completeness.len(), 1);
        assert_eq!(detail.overall_completeness_score, None);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(66.666_666), 66.67);
        assert_eq!(round2(100.0), 100.0);
        assert_eq!(round2(0.004), 0.0);
    }
}
