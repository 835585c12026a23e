//! Uniform validation result records.
//!
//! Every check produces one [`ValidationRecord`]: a status plus the common
//! identifying fields, and a per-kind [`CheckDetail`] payload. Records flatten
//! to a single keyed map for reporting, with a stable key set per kind.

use crate::Flag;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// The closed set of checks the engine can run.
///
/// Declaration order is the canonical execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    TableExistence,
    DataType,
    NullableConstraint,
    UniqueConstraint,
    RangeConstraint,
    EnumerationConstraint,
    InsertAppendLogic,
    CountCheck,
    CompletenessCheck,
}

impl ValidationKind {
    /// Every kind, in canonical order.
    pub const ALL: [ValidationKind; 9] = [
        ValidationKind::TableExistence,
        ValidationKind::DataType,
        ValidationKind::NullableConstraint,
        ValidationKind::UniqueConstraint,
        ValidationKind::RangeConstraint,
        ValidationKind::EnumerationConstraint,
        ValidationKind::InsertAppendLogic,
        ValidationKind::CountCheck,
        ValidationKind::CompletenessCheck,
    ];

    /// Stable wire name, e.g. `"count_check"`.
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationKind::TableExistence => "table_existence",
            ValidationKind::DataType => "data_type",
            ValidationKind::NullableConstraint => "nullable_constraint",
            ValidationKind::UniqueConstraint => "unique_constraint",
            ValidationKind::RangeConstraint => "range_constraint",
            ValidationKind::EnumerationConstraint => "enumeration_constraint",
            ValidationKind::InsertAppendLogic => "insert_append_logic",
            ValidationKind::CountCheck => "count_check",
            ValidationKind::CompletenessCheck => "completeness_check",
        }
    }
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        ValidationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| {
                let known: Vec<&str> = ValidationKind::ALL.iter().map(|k| k.as_str()).collect();
                format!(
                    "Unknown validation kind '{}'. Expected one of: {}",
                    s,
                    known.join(", ")
                )
            })
    }
}

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidationStatus {
    /// Data satisfies the declared rule
    Pass,
    /// Data violates the declared rule
    Fail,
    /// The check could not be evaluated
    Error,
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValidationStatus::Pass => "PASS",
            ValidationStatus::Fail => "FAIL",
            ValidationStatus::Error => "ERROR",
        })
    }
}

/// Type check outcome for one declared column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnTypeCheck {
    pub column_name: String,
    pub expected_type: String,
    /// Type reported by the store, `None` when the column is missing
    pub actual_type: Option<String>,
    pub validation_passed: bool,
    pub error_message: Option<String>,
}

/// Completeness measurement for one declared column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnCompleteness {
    pub column_name: String,
    pub total_rows: u64,
    pub null_count: u64,
    /// Rounded to two decimals
    pub completeness_percentage: f64,
    pub is_mandatory: bool,
}

/// Existence probe result for a table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableExistenceDetail {
    pub store_reachable: Option<bool>,
    pub table_exists: Option<bool>,
}

/// Declared-versus-actual column types for a table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTypeDetail {
    pub column_validations: Vec<ColumnTypeCheck>,
}

/// Nullability and mandatory-null measurement for a column.
#[derive(Debug, Clone, PartialEq)]
pub struct NullableDetail {
    pub column_name: String,
    pub expected_nullable: Flag,
    pub expected_mandatory: Flag,
    pub actual_nullable: Option<bool>,
    pub null_count: Option<u64>,
}

/// Distinctness measurement for a column.
#[derive(Debug, Clone, PartialEq)]
pub struct UniqueDetail {
    pub column_name: String,
    pub expected_unique: Flag,
    pub total_count: Option<u64>,
    pub distinct_count: Option<u64>,
    pub duplicate_count: Option<u64>,
}

/// Out-of-range counts for a column.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeDetail {
    pub column_name: String,
    pub range_bottom: Option<String>,
    pub range_top: Option<String>,
    pub below_range_count: Option<u64>,
    pub above_range_count: Option<u64>,
}

/// Values outside an enumeration for a column.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumerationDetail {
    pub column_name: String,
    pub enumeration_name: String,
    pub allowed_values: Vec<String>,
    pub invalid_count: Option<u64>,
}

/// Load-mode classification for a table.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertAppendDetail {
    pub request_type: String,
    pub current_row_count: Option<u64>,
    pub expected_behavior: Option<String>,
}

/// Row count against an optional expectation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountDetail {
    pub actual_count: Option<u64>,
    pub expected_count: Option<u64>,
}

/// Per-column and overall completeness for a table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletenessDetail {
    pub total_rows: Option<u64>,
    pub column_completeness: Vec<ColumnCompleteness>,
    pub overall_completeness_score: Option<f64>,
}

/// Kind-specific payload of a [`ValidationRecord`].
#[derive(Debug, Clone, PartialEq)]
pub enum CheckDetail {
    TableExistence(TableExistenceDetail),
    DataType(DataTypeDetail),
    Nullable(NullableDetail),
    Unique(UniqueDetail),
    Range(RangeDetail),
    Enumeration(EnumerationDetail),
    InsertAppend(InsertAppendDetail),
    Count(CountDetail),
    Completeness(CompletenessDetail),
}

impl CheckDetail {
    /// The validation kind this payload belongs to.
    pub fn kind(&self) -> ValidationKind {
        match self {
            CheckDetail::TableExistence(_) => ValidationKind::TableExistence,
            CheckDetail::DataType(_) => ValidationKind::DataType,
            CheckDetail::Nullable(_) => ValidationKind::NullableConstraint,
            CheckDetail::Unique(_) => ValidationKind::UniqueConstraint,
            CheckDetail::Range(_) => ValidationKind::RangeConstraint,
            CheckDetail::Enumeration(_) => ValidationKind::EnumerationConstraint,
            CheckDetail::InsertAppend(_) => ValidationKind::InsertAppendLogic,
            CheckDetail::Count(_) => ValidationKind::CountCheck,
            CheckDetail::Completeness(_) => ValidationKind::CompletenessCheck,
        }
    }

    /// Column the payload refers to, for column-level kinds.
    pub fn column_name(&self) -> Option<&str> {
        match self {
            CheckDetail::Nullable(d) => Some(&d.column_name),
            CheckDetail::Unique(d) => Some(&d.column_name),
            CheckDetail::Range(d) => Some(&d.column_name),
            CheckDetail::Enumeration(d) => Some(&d.column_name),
            _ => None,
        }
    }

    fn write_into(&self, map: &mut Map<String, Value>) {
        let mut put = |key: &str, value: Value| {
            map.insert(key.to_string(), value);
        };

        match self {
            CheckDetail::TableExistence(d) => {
                put("store_reachable", json!(d.store_reachable));
                put("table_exists", json!(d.table_exists));
            }
            CheckDetail::DataType(d) => {
                put("column_validations", json!(d.column_validations));
            }
            CheckDetail::Nullable(d) => {
                put("column_name", json!(d.column_name));
                put("expected_nullable", json!(d.expected_nullable));
                put("expected_mandatory", json!(d.expected_mandatory));
                put("actual_nullable", json!(d.actual_nullable));
                put("null_count", json!(d.null_count));
            }
            CheckDetail::Unique(d) => {
                put("column_name", json!(d.column_name));
                put("expected_unique", json!(d.expected_unique));
                put("total_count", json!(d.total_count));
                put("distinct_count", json!(d.distinct_count));
                put("duplicate_count", json!(d.duplicate_count));
            }
            CheckDetail::Range(d) => {
                put("column_name", json!(d.column_name));
                put("range_bottom", json!(d.range_bottom));
                put("range_top", json!(d.range_top));
                put("below_range_count", json!(d.below_range_count));
                put("above_range_count", json!(d.above_range_count));
            }
            CheckDetail::Enumeration(d) => {
                put("column_name", json!(d.column_name));
                put("enumeration_name", json!(d.enumeration_name));
                put("allowed_values", json!(d.allowed_values));
                put("invalid_count", json!(d.invalid_count));
            }
            CheckDetail::InsertAppend(d) => {
                put("request_type", json!(d.request_type));
                put("current_row_count", json!(d.current_row_count));
                put("expected_behavior", json!(d.expected_behavior));
            }
            CheckDetail::Count(d) => {
                put("actual_count", json!(d.actual_count));
                put("expected_count", json!(d.expected_count));
            }
            CheckDetail::Completeness(d) => {
                put("total_rows", json!(d.total_rows));
                put("column_completeness", json!(d.column_completeness));
                put(
                    "overall_completeness_score",
                    json!(d.overall_completeness_score),
                );
            }
        }
    }
}

/// One check outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRecord {
    pub status: ValidationStatus,
    pub feed_name: String,
    pub db_name: String,
    pub table_name: String,
    pub error_message: Option<String>,
    pub detail: CheckDetail,
}

impl ValidationRecord {
    /// Creates a passing record. Validators downgrade it as checks fail.
    pub fn pass(
        feed_name: impl Into<String>,
        db_name: impl Into<String>,
        table_name: impl Into<String>,
        detail: CheckDetail,
    ) -> Self {
        Self {
            status: ValidationStatus::Pass,
            feed_name: feed_name.into(),
            db_name: db_name.into(),
            table_name: table_name.into(),
            error_message: None,
            detail,
        }
    }

    /// Marks the record FAIL with the given message.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.status = ValidationStatus::Fail;
        self.error_message = Some(message.into());
        self
    }

    /// Marks the record ERROR with the given message.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.status = ValidationStatus::Error;
        self.error_message = Some(message.into());
        self
    }

    /// Kind of check this record reports.
    pub fn validation_type(&self) -> ValidationKind {
        self.detail.kind()
    }

    pub fn is_pass(&self) -> bool {
        self.status == ValidationStatus::Pass
    }

    /// Flattens the record to the uniform reporting key set.
    ///
    /// Kind-specific keys are always present; unmeasured values are `null`.
    pub fn to_flat_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(
            "validation_type".to_string(),
            json!(self.validation_type().as_str()),
        );
        map.insert("validation_status".to_string(), json!(self.status));
        map.insert("feed_name".to_string(), json!(self.feed_name));
        map.insert("db_name".to_string(), json!(self.db_name));
        map.insert("table_name".to_string(), json!(self.table_name));
        map.insert("error_message".to_string(), json!(self.error_message));
        self.detail.write_into(&mut map);
        map
    }
}

impl Serialize for ValidationRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_flat_map().serialize(serializer)
    }
}

/// PASS/FAIL/ERROR tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
}

impl StatusCounts {
    fn record(&mut self, status: ValidationStatus) {
        self.total += 1;
        match status {
            ValidationStatus::Pass => self.passed += 1,
            ValidationStatus::Fail => self.failed += 1,
            ValidationStatus::Error => self.errors += 1,
        }
    }

    /// Percentage of passing checks, 0 when nothing ran.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 / self.total as f64 * 100.0
        }
    }
}

/// Aggregated outcome counts for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationSummary {
    pub overall: StatusCounts,
    pub by_kind: BTreeMap<ValidationKind, StatusCounts>,
    pub by_feed: BTreeMap<String, StatusCounts>,
}

impl ValidationSummary {
    /// Tallies records by kind and by feed.
    pub fn from_records(records: &[ValidationRecord]) -> Self {
        let mut summary = Self::default();
        for record in records {
            summary.overall.record(record.status);
            summary
                .by_kind
                .entry(record.validation_type())
                .or_default()
                .record(record.status);
            summary
                .by_feed
                .entry(record.feed_name.clone())
                .or_default()
                .record(record.status);
        }
        summary
    }
}

/// Records, summary and timing for one run.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub records: Vec<ValidationRecord>,
    pub summary: ValidationSummary,
    pub duration_ms: u64,
    pub generated_at: DateTime<Utc>,
}

impl ValidationReport {
    /// Builds a report, deriving the summary from `records`.
    pub fn new(records: Vec<ValidationRecord>, duration: Duration) -> Self {
        let summary = ValidationSummary::from_records(&records);
        Self {
            records,
            summary,
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            generated_at: Utc::now(),
        }
    }

    /// Returns true when no record is FAIL or ERROR.
    pub fn is_clean(&self) -> bool {
        self.records.iter().all(ValidationRecord::is_pass)
    }

    /// Records of one kind, in emission order.
    pub fn records_of(&self, kind: ValidationKind) -> impl Iterator<Item = &ValidationRecord> {
        self.records
            .iter()
            .filter(move |record| record.validation_type() == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn unique_record(total: Option<u64>, distinct: Option<u64>) -> ValidationRecord {
        ValidationRecord::pass(
            "orders.csv",
            "warehouse",
            "orders",
            CheckDetail::Unique(UniqueDetail {
                column_name: "order_id".to_string(),
                expected_unique: Flag::Yes,
                total_count: total,
                distinct_count: distinct,
                duplicate_count: total.zip(distinct).map(|(t, d)| t.saturating_sub(d)),
            }),
        )
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!(
            "count_check".parse::<ValidationKind>(),
            Ok(ValidationKind::CountCheck)
        );
        assert_eq!(
            "Range-Constraint".parse::<ValidationKind>(),
            Ok(ValidationKind::RangeConstraint)
        );
        assert!("freshness".parse::<ValidationKind>().is_err());
    }

    #[test]
    fn test_kind_round_trips_through_as_str() {
        for kind in ValidationKind::ALL {
            assert_eq!(kind.as_str().parse::<ValidationKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_flat_map_common_keys() {
        let record = unique_record(Some(10), Some(9)).with_failure("Column should be unique but has 1 duplicates");
        let map = record.to_flat_map();

        assert_eq!(map["validation_type"], json!("unique_constraint"));
        assert_eq!(map["validation_status"], json!("FAIL"));
        assert_eq!(map["feed_name"], json!("orders.csv"));
        assert_eq!(map["db_name"], json!("warehouse"));
        assert_eq!(map["table_name"], json!("orders"));
        assert_eq!(map["column_name"], json!("order_id"));
        assert_eq!(map["expected_unique"], json!("Y"));
        assert_eq!(map["duplicate_count"], json!(1));
    }

    #[test]
    fn test_flat_map_keeps_unmeasured_keys_as_null() {
        let record = ValidationRecord::pass(
            "cust.csv",
            "warehouse",
            "customers",
            CheckDetail::Enumeration(EnumerationDetail {
                column_name: "status".to_string(),
                enumeration_name: "X".to_string(),
                allowed_values: vec![],
                invalid_count: None,
            }),
        )
        .with_error("Enumeration X not found in metadata");

        let map = record.to_flat_map();
        assert!(map.contains_key("invalid_count"));
        assert_eq!(map["invalid_count"], Value::Null);
        assert_eq!(map["validation_status"], json!("ERROR"));
    }

    #[test]
    fn test_serialize_matches_flat_map() {
        let record = unique_record(Some(3), Some(3));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, Value::Object(record.to_flat_map()));
    }

    #[test]
    fn test_summary_tallies() {
        let records = vec![
            unique_record(Some(3), Some(3)),
            unique_record(Some(3), Some(2)).with_failure("dup"),
            ValidationRecord::pass(
                "other.csv",
                "warehouse",
                "other",
                CheckDetail::Count(CountDetail::default()),
            )
            .with_error("boom"),
        ];

        let summary = ValidationSummary::from_records(&records);

        assert_eq!(
            summary.overall,
            StatusCounts {
                total: 3,
                passed: 1,
                failed: 1,
                errors: 1
            }
        );
        assert_eq!(summary.by_kind[&ValidationKind::UniqueConstraint].total, 2);
        assert_eq!(summary.by_kind[&ValidationKind::CountCheck].errors, 1);
        assert_eq!(summary.by_feed["orders.csv"].failed, 1);
        assert_eq!(summary.by_feed["other.csv"].errors, 1);
    }

    #[test]
    fn test_report_is_clean() {
        let clean = ValidationReport::new(vec![unique_record(Some(1), Some(1))], Duration::ZERO);
        assert!(clean.is_clean());

        let dirty = ValidationReport::new(
            vec![unique_record(Some(2), Some(1)).with_failure("dup")],
            Duration::from_millis(5),
        );
        assert!(!dirty.is_clean());
        assert_eq!(dirty.duration_ms, 5);
        assert_eq!(dirty.records_of(ValidationKind::UniqueConstraint).count(), 1);
    }

    #[test]
    fn test_success_rate_empty() {
        assert_eq!(StatusCounts::default().success_rate(), 0.0);
    }
}
