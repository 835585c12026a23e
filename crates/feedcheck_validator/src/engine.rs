//! Main validation engine.
//!
//! This module provides the `DataValidator` that runs the selected kinds of
//! check over a metadata set and gathers their records into one report.

use crate::{ConstraintValidator, LoadValidator, QualityValidator, SchemaValidator};
use feedcheck_core::{
    MetadataSet, ValidationContext, ValidationKind, ValidationRecord, ValidationReport,
};
use feedcheck_store::DataStore;
use std::time::Instant;
use tracing::info;

/// Main validation engine for feed metadata.
///
/// Every check is isolated per column or per table: a bad unit becomes an
/// ERROR record and the run carries on.
///
/// # Example
///
/// ```rust
/// use feedcheck_core::{FeedMetadataBuilder, MetadataSet, ValidationContext, ValidationKind};
/// use feedcheck_store::{FixtureColumn, FixtureStore, FixtureTable};
/// use feedcheck_validator::DataValidator;
///
/// let store = FixtureStore::new().with_table(
///     "warehouse",
///     "orders",
///     FixtureTable::new(10).column(FixtureColumn::new("order_id", "Int64")),
/// );
/// let metadata = MetadataSet {
///     feeds: vec![
///         FeedMetadataBuilder::new("Orders", "orders.csv", "warehouse", "orders", "order_id")
///             .data_type("INTEGER")
///             .unique(true)
///             .build(),
///     ],
///     ..Default::default()
/// };
///
/// let validator = DataValidator::new(&store);
/// let context = ValidationContext::new().with_checks([ValidationKind::UniqueConstraint]);
/// let report = validator.validate(&metadata, &context);
///
/// assert!(report.is_clean());
/// assert_eq!(report.records.len(), 1);
/// ```
pub struct DataValidator<'a> {
    schema_validator: SchemaValidator<'a>,
    constraint_validator: ConstraintValidator<'a>,
    load_validator: LoadValidator<'a>,
    quality_validator: QualityValidator<'a>,
}

impl<'a> DataValidator<'a> {
    /// Creates a new data validator over `store`.
    pub fn new(store: &'a dyn DataStore) -> Self {
        Self {
            schema_validator: SchemaValidator::new(store),
            constraint_validator: ConstraintValidator::new(store),
            load_validator: LoadValidator::new(store),
            quality_validator: QualityValidator::new(store),
        }
    }

    /// Runs every selected kind, in canonical order, and reports the records.
    ///
    /// # Arguments
    ///
    /// * `metadata` - Feed metadata and enumeration catalog to check against
    /// * `context` - Feed filter, selected kinds and expected row counts
    pub fn validate(&self, metadata: &MetadataSet, context: &ValidationContext) -> ValidationReport {
        let start = Instant::now();
        let kinds = context.selected_kinds();
        info!(
            "Validating {} column record(s) across {} check kind(s)",
            metadata.feeds.len(),
            kinds.len()
        );

        let mut records = Vec::new();
        for kind in kinds {
            records.extend(self.run(kind, metadata, context));
        }

        let report = ValidationReport::new(records, start.elapsed());
        info!(
            "Validation finished: {} passed, {} failed, {} errors in {}ms",
            report.summary.overall.passed,
            report.summary.overall.failed,
            report.summary.overall.errors,
            report.duration_ms
        );
        report
    }

    /// Runs a single kind of check.
    pub fn run(
        &self,
        kind: ValidationKind,
        metadata: &MetadataSet,
        context: &ValidationContext,
    ) -> Vec<ValidationRecord> {
        let feeds = &metadata.feeds;
        match kind {
            ValidationKind::TableExistence => {
                self.schema_validator.validate_table_existence(feeds, context)
            }
            ValidationKind::DataType => self.schema_validator.validate_data_types(feeds, context),
            ValidationKind::NullableConstraint => {
                self.constraint_validator.validate_nullable(feeds, context)
            }
            ValidationKind::UniqueConstraint => {
                self.constraint_validator.validate_unique(feeds, context)
            }
            ValidationKind::RangeConstraint => {
                self.constraint_validator.validate_range(feeds, context)
            }
            ValidationKind::EnumerationConstraint => self
                .constraint_validator
                .validate_enumeration(feeds, &metadata.enumerations, context),
            ValidationKind::InsertAppendLogic => {
                self.load_validator.validate_insert_append(feeds, context)
            }
            ValidationKind::CountCheck => self.quality_validator.validate_count(feeds, context),
            ValidationKind::CompletenessCheck => {
                self.quality_validator.validate_completeness(feeds, context)
            }
        }
    }
}
