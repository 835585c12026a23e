use feedcheck_parser::{ParserError, parse_file};
use pretty_assertions::assert_eq;
use std::fs;

const FEEDS_YAML: &str = r#"
feeds:
  - module: Sales
    feed: in/orders.csv
    field_name: order_id
    db_name: warehouse
    db_table: orders
    data_type: INTEGER
    mandatory: Y
    unique: Y
  - module: Sales
    feed: in/orders.csv
    field_name: status
    db_name: warehouse
    db_table: orders
    data_type: VARCHAR
    enumeration: order_status
  - module: Crm
    feed: in/customers.csv
    field_name: customer_id
    db_name: crm
    db_table: customers
    data_type: INTEGER
enumerations:
  - enumeration_name: order_status
    enum_value: NEW
"#;

#[test]
fn test_parse_yaml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("feeds.yml");
    fs::write(&path, FEEDS_YAML).unwrap();

    let parsed = parse_file(&path).unwrap();

    assert_eq!(parsed.metadata.feeds.len(), 3);
    assert_eq!(
        parsed.metadata.unique_feeds(),
        vec!["in/customers.csv", "in/orders.csv"]
    );
    assert_eq!(parsed.metadata.unique_modules(), vec!["Crm", "Sales"]);
    assert_eq!(parsed.metadata.feeds_for("in/orders.csv").len(), 2);
}

#[test]
fn test_same_metadata_in_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("feeds.json");
    fs::write(
        &path,
        r#"{"Feed_to_staging": [{"Modules": "Sales", "Feed": "in/orders.csv", "FieldName": "order_id",
            "DBName": "warehouse", "DB Table": "orders", "DataType": "INTEGER", "Unique": "Y"}]}"#,
    )
    .unwrap();

    let parsed = parse_file(&path).unwrap();

    assert_eq!(parsed.metadata.feeds[0].table_key(), "warehouse.orders");
    assert!(parsed.metadata.feeds[0].unique.is_yes());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = parse_file(&dir.path().join("absent.yml"));
    assert!(matches!(result, Err(ParserError::IoError(_))));
}
