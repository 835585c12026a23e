//! Column constraint validation.
//!
//! Each check emits one record per column it applies to:
//! - Nullable: mandatory columns hold no nulls and the schema flag matches
//! - Unique: total count equals distinct count
//! - Range: no values below `range_bottom` or above `range_top`
//! - Enumeration: every non-null value is in the referenced catalog
//!
//! A failing column never stops the remaining columns from being checked.

use crate::ValidationError;
use crate::outcome::evaluate;
use feedcheck_core::{
    CheckDetail, EnumerationCatalog, EnumerationDetail, EnumerationMetadata, FeedMetadata,
    NullableDetail, RangeDetail, UniqueDetail, ValidationContext, ValidationRecord,
};
use feedcheck_store::DataStore;
use tracing::info;

/// Validates per-column constraints against live data.
pub struct ConstraintValidator<'a> {
    store: &'a dyn DataStore,
}

impl<'a> ConstraintValidator<'a> {
    /// Creates a new constraint validator over `store`.
    pub fn new(store: &'a dyn DataStore) -> Self {
        Self { store }
    }

    /// Checks every column's nullability and mandatory-null rule.
    pub fn validate_nullable(
        &self,
        metadata: &[FeedMetadata],
        context: &ValidationContext,
    ) -> Vec<ValidationRecord> {
        info!("Starting nullable constraints validation");

        let records: Vec<_> = context
            .filter_feeds(metadata)
            .into_iter()
            .map(|meta| self.check_nullable(meta))
            .collect();

        info!("Nullable validation completed: {} column(s)", records.len());
        records
    }

    fn check_nullable(&self, meta: &FeedMetadata) -> ValidationRecord {
        let detail = NullableDetail {
            column_name: meta.column_name.clone(),
            expected_nullable: meta.nullable,
            expected_mandatory: meta.mandatory,
            actual_nullable: None,
            null_count: None,
        };

        evaluate(
            meta,
            "validating nullable constraints",
            detail,
            CheckDetail::Nullable,
            |detail| {
                let (actual_nullable, null_count) =
                    self.store
                        .check_nullable(&meta.db_name, &meta.table_name, &meta.column_name)?;
                detail.actual_nullable = Some(actual_nullable);
                detail.null_count = Some(null_count);

                let mut failures = Vec::new();
                if meta.mandatory.is_yes() && null_count > 0 {
                    failures.push(format!("Mandatory field has {} null values", null_count));
                }

                let expected_nullable = meta.nullable.is_yes();
                if actual_nullable != expected_nullable {
                    failures.push(format!(
                        "Nullable setting mismatch: expected {}, got {}",
                        expected_nullable, actual_nullable
                    ));
                }

                Ok(failures)
            },
        )
    }

    /// Checks distinctness of columns flagged unique.
    pub fn validate_unique(
        &self,
        metadata: &[FeedMetadata],
        context: &ValidationContext,
    ) -> Vec<ValidationRecord> {
        info!("Starting unique constraints validation");

        let records: Vec<_> = context
            .filter_feeds(metadata)
            .into_iter()
            .filter(|meta| meta.unique.is_yes())
            .map(|meta| self.check_unique(meta))
            .collect();

        info!("Unique validation completed: {} column(s)", records.len());
        records
    }

    fn check_unique(&self, meta: &FeedMetadata) -> ValidationRecord {
        let detail = UniqueDetail {
            column_name: meta.column_name.clone(),
            expected_unique: meta.unique,
            total_count: None,
            distinct_count: None,
            duplicate_count: None,
        };

        evaluate(
            meta,
            "validating unique constraints",
            detail,
            CheckDetail::Unique,
            |detail| {
                let (total, distinct) =
                    self.store
                        .check_unique(&meta.db_name, &meta.table_name, &meta.column_name)?;
                let duplicates = total.saturating_sub(distinct);

                detail.total_count = Some(total);
                detail.distinct_count = Some(distinct);
                detail.duplicate_count = Some(duplicates);

                Ok(if duplicates > 0 {
                    vec![format!(
                        "Column should be unique but has {} duplicates",
                        duplicates
                    )]
                } else {
                    vec![]
                })
            },
        )
    }

    /// Checks columns with a declared range bound.
    pub fn validate_range(
        &self,
        metadata: &[FeedMetadata],
        context: &ValidationContext,
    ) -> Vec<ValidationRecord> {
        info!("Starting range constraints validation");

        let records: Vec<_> = context
            .filter_feeds(metadata)
            .into_iter()
            .filter(|meta| meta.has_range())
            .map(|meta| self.check_range(meta))
            .collect();

        info!("Range validation completed: {} column(s)", records.len());
        records
    }

    fn check_range(&self, meta: &FeedMetadata) -> ValidationRecord {
        let detail = RangeDetail {
            column_name: meta.column_name.clone(),
            range_bottom: meta.range_bottom.clone(),
            range_top: meta.range_top.clone(),
            below_range_count: None,
            above_range_count: None,
        };

        evaluate(
            meta,
            "validating range constraints",
            detail,
            CheckDetail::Range,
            |detail| {
                let counts = self.store.check_range(
                    &meta.db_name,
                    &meta.table_name,
                    &meta.column_name,
                    meta.range_bottom.as_deref(),
                    meta.range_top.as_deref(),
                )?;

                detail.below_range_count = Some(counts.below_range);
                detail.above_range_count = Some(counts.above_range);

                Ok(if counts.total() > 0 {
                    vec![format!(
                        "Range violations: {} below range, {} above range",
                        counts.below_range, counts.above_range
                    )]
                } else {
                    vec![]
                })
            },
        )
    }

    /// Checks columns referencing an enumeration.
    ///
    /// A reference that resolves to no allowed values is an ERROR, and the
    /// store is not queried for it.
    pub fn validate_enumeration(
        &self,
        metadata: &[FeedMetadata],
        enumerations: &[EnumerationMetadata],
        context: &ValidationContext,
    ) -> Vec<ValidationRecord> {
        info!("Starting enumeration constraints validation");
        let catalog = EnumerationCatalog::from_records(enumerations);

        let records: Vec<_> = context
            .filter_feeds(metadata)
            .into_iter()
            .filter_map(|meta| {
                meta.enumeration
                    .as_deref()
                    .map(|name| self.check_enumeration(meta, name, &catalog))
            })
            .collect();

        info!("Enumeration validation completed: {} column(s)", records.len());
        records
    }

    fn check_enumeration(
        &self,
        meta: &FeedMetadata,
        name: &str,
        catalog: &EnumerationCatalog,
    ) -> ValidationRecord {
        let detail = EnumerationDetail {
            column_name: meta.column_name.clone(),
            enumeration_name: name.to_string(),
            allowed_values: Vec::new(),
            invalid_count: None,
        };

        evaluate(
            meta,
            "validating enumeration constraints",
            detail,
            CheckDetail::Enumeration,
            |detail| {
                let allowed = catalog.resolve(name).ok_or_else(|| {
                    ValidationError::configuration(format!(
                        "Enumeration {} not found in metadata",
                        name
                    ))
                })?;
                detail.allowed_values = allowed.to_vec();

                let invalid = self.store.check_enumeration(
                    &meta.db_name,
                    &meta.table_name,
                    &meta.column_name,
                    allowed,
                )?;
                detail.invalid_count = Some(invalid);

                Ok(if invalid > 0 {
                    vec![format!(
                        "Found {} values not in allowed enumeration",
                        invalid
                    )]
                } else {
                    vec![]
                })
            },
        )
    }
}
