//! Validation of a CSV-backed store through DataFusion.

use feedcheck_core::{
    EnumerationMetadata, FeedMetadataBuilder, MetadataSet, ValidationContext, ValidationKind,
    ValidationStatus,
};
use feedcheck_store::{ColumnSpec, DataFusionStore, StoreConfig, StoreDefinition, TableSource};
use feedcheck_validator::DataValidator;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

fn landed_customers() -> (TempDir, DataFusionStore) {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("customers.csv"),
        "customer_id,name,country,balance\n\
         1,Ada,IT,100.5\n\
         2,Grace,US,\n\
         3,Linus,FI,-20\n\
         3,Linus,XX,5000\n",
    )
    .unwrap();

    let config = StoreConfig::builder()
        .store(
            StoreDefinition::new("crm").root(dir.path()).table(
                TableSource::csv("customers", "customers.csv")
                    .column(ColumnSpec::new("customer_id", "INTEGER", false))
                    .column(ColumnSpec::new("name", "VARCHAR", false))
                    .column(ColumnSpec::new("country", "CHAR(2)", true))
                    .column(ColumnSpec::new("balance", "DECIMAL(12,2)", true)),
            ),
        )
        .build()
        .unwrap();

    let store = DataFusionStore::new(config).unwrap();
    (dir, store)
}

fn customers_metadata() -> MetadataSet {
    let column =
        |name: &str| FeedMetadataBuilder::new("CRM", "customers.csv", "crm", "customers", name);

    MetadataSet {
        feeds: vec![
            column("customer_id")
                .data_type("INTEGER")
                .mandatory(true)
                .unique(true)
                .build(),
            column("name").data_type("VARCHAR").mandatory(true).build(),
            column("country")
                .data_type("VARCHAR")
                .nullable(true)
                .enumeration("country_code")
                .build(),
            column("balance")
                .data_type("DECIMAL")
                .nullable(true)
                .range_bottom("0")
                .range_top("1000")
                .build(),
        ],
        staging: Vec::new(),
        enumerations: ["IT", "US", "FI"]
            .into_iter()
            .map(|code| EnumerationMetadata::new("country_code", code))
            .collect(),
    }
}

fn status_of(
    report: &feedcheck_core::ValidationReport,
    kind: ValidationKind,
) -> Vec<ValidationStatus> {
    report.records_of(kind).map(|r| r.status).collect()
}

#[test]
fn test_full_run_over_csv() {
    let (_dir, store) = landed_customers();
    let validator = DataValidator::new(&store);
    let context = ValidationContext::new().with_expected_count("crm.customers", 4);

    let report = validator.validate(&customers_metadata(), &context);

    use ValidationStatus::*;
    assert_eq!(status_of(&report, ValidationKind::TableExistence), vec![Pass]);
    assert_eq!(status_of(&report, ValidationKind::DataType), vec![Pass]);
    assert_eq!(
        status_of(&report, ValidationKind::NullableConstraint),
        vec![Pass, Pass, Pass, Pass]
    );
    assert_eq!(status_of(&report, ValidationKind::UniqueConstraint), vec![Fail]);
    assert_eq!(status_of(&report, ValidationKind::RangeConstraint), vec![Fail]);
    assert_eq!(
        status_of(&report, ValidationKind::EnumerationConstraint),
        vec![Fail]
    );
    assert_eq!(status_of(&report, ValidationKind::InsertAppendLogic), vec![Pass]);
    assert_eq!(status_of(&report, ValidationKind::CountCheck), vec![Pass]);
    assert_eq!(
        status_of(&report, ValidationKind::CompletenessCheck),
        vec![Fail]
    );

    let messages: Vec<&str> = report
        .records
        .iter()
        .filter_map(|r| r.error_message.as_deref())
        .collect();
    assert_eq!(
        messages,
        vec![
            "Column should be unique but has 1 duplicates",
            "Range violations: 1 below range, 1 above range",
            "Found 1 values not in allowed enumeration",
            "Low completeness score: 93.75%",
        ]
    );
}

#[test]
fn test_missing_table_fails_existence_and_errors_elsewhere() {
    let (_dir, store) = landed_customers();
    let validator = DataValidator::new(&store);
    let metadata = MetadataSet {
        feeds: vec![
            FeedMetadataBuilder::new("CRM", "leads.csv", "crm", "leads", "lead_id")
                .data_type("INTEGER")
                .build(),
        ],
        ..Default::default()
    };
    let context = ValidationContext::new().with_checks([
        ValidationKind::TableExistence,
        ValidationKind::CountCheck,
    ]);

    let report = validator.validate(&metadata, &context);

    assert_eq!(report.records[0].status, ValidationStatus::Fail);
    assert_eq!(
        report.records[0].error_message.as_deref(),
        Some("Table leads does not exist in crm")
    );
    assert_eq!(report.records[1].status, ValidationStatus::Error);
    assert!(
        report.records[1]
            .error_message
            .as_deref()
            .unwrap()
            .starts_with("Error validating count checks:")
    );
}

#[test]
fn test_nulls_in_column_declared_not_null_are_caught() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("stock.csv"), "id,qty\n1,5\n2,\n3,7\n").unwrap();

    let config = StoreConfig::builder()
        .store(
            StoreDefinition::new("inventory").root(dir.path()).table(
                TableSource::csv("stock", "stock.csv")
                    .column(ColumnSpec::new("id", "INTEGER", false))
                    .column(ColumnSpec::new("qty", "INTEGER", false)),
            ),
        )
        .build()
        .unwrap();
    let store = DataFusionStore::new(config).unwrap();
    let validator = DataValidator::new(&store);

    let metadata = MetadataSet {
        feeds: vec![
            FeedMetadataBuilder::new("Stock", "stock.csv", "inventory", "stock", "qty")
                .data_type("INTEGER")
                .mandatory(true)
                .build(),
        ],
        ..Default::default()
    };
    let context = ValidationContext::new().with_checks([
        ValidationKind::NullableConstraint,
        ValidationKind::CompletenessCheck,
    ]);

    let report = validator.validate(&metadata, &context);

    assert_eq!(report.records.len(), 2);
    assert_eq!(report.records[0].status, ValidationStatus::Fail);
    assert_eq!(
        report.records[0].error_message.as_deref(),
        Some("Mandatory field has 1 null values")
    );
    assert_eq!(report.records[1].status, ValidationStatus::Fail);
    assert_eq!(
        report.records[1].error_message.as_deref(),
        Some("Low completeness score: 66.67%; Mandatory columns not fully populated: qty")
    );
}

#[test]
fn test_missing_source_file_only_affects_its_table() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.csv"), "id\n1\n2\n").unwrap();

    let config = StoreConfig::builder()
        .store(
            StoreDefinition::new("crm")
                .root(dir.path())
                .table(TableSource::csv("a", "a.csv"))
                .table(TableSource::csv("b", "b.csv")),
        )
        .build()
        .unwrap();
    let store = DataFusionStore::new(config).unwrap();
    let validator = DataValidator::new(&store);

    let metadata = MetadataSet {
        feeds: vec![
            FeedMetadataBuilder::new("CRM", "a.csv", "crm", "a", "id")
                .data_type("INTEGER")
                .build(),
            FeedMetadataBuilder::new("CRM", "b.csv", "crm", "b", "id")
                .data_type("INTEGER")
                .build(),
        ],
        ..Default::default()
    };
    let context = ValidationContext::new().with_checks([
        ValidationKind::TableExistence,
        ValidationKind::CountCheck,
    ]);

    let report = validator.validate(&metadata, &context);

    use ValidationStatus::*;
    assert_eq!(status_of(&report, ValidationKind::TableExistence), vec![Pass, Fail]);
    assert_eq!(status_of(&report, ValidationKind::CountCheck), vec![Pass, Error]);
    assert_eq!(
        report.records[1].error_message.as_deref(),
        Some("Table b does not exist in crm")
    );
}
