//! Parser for feedcheck metadata documents (YAML/TOML/JSON formats).
//!
//! A metadata document carries one array per workbook sheet: `feeds`,
//! `staging` and `enumerations`. Rows use either snake_case keys or the
//! original spreadsheet headers (`Feed_to_staging`, `DB Table`, ...). Rows
//! missing an identifying field are skipped and reported, never fatal.
//!
//! # Example
//!
//! ```rust
//! use feedcheck_parser::parse_yaml;
//!
//! let yaml = r#"
//! feeds:
//!   - module: Orders
//!     feed: in/orders.csv
//!     field_name: order_id
//!     db_name: warehouse
//!     db_table: orders
//!     data_type: INTEGER
//!     mandatory: Y
//!     unique: Y
//! enumerations:
//!   - enumeration_name: order_status
//!     enum_value: NEW
//! "#;
//!
//! let parsed = parse_yaml(yaml).expect("Failed to parse metadata");
//! assert_eq!(parsed.metadata.feeds.len(), 1);
//! assert!(parsed.skipped.is_empty());
//! ```

use feedcheck_core::{MetadataError, MetadataSet, RawMetadata};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while reading a metadata document.
#[derive(Debug, Error)]
pub enum ParserError {
    /// YAML parsing or deserialization failed
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    /// TOML parsing or deserialization failed
    #[error("Failed to parse TOML: {0}")]
    TomlError(String),

    /// JSON parsing or deserialization failed
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File I/O error
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Unsupported file format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Invalid file extension
    #[error("Invalid or missing file extension")]
    InvalidExtension,
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;

/// Supported metadata document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataFormat {
    /// YAML format (.yml, .yaml)
    Yaml,
    /// TOML format (.toml)
    Toml,
    /// JSON format (.json)
    Json,
}

/// A parsed document: the usable records and the rows that were dropped.
#[derive(Debug, Clone, Default)]
pub struct ParsedMetadata {
    pub metadata: MetadataSet,
    /// One entry per skipped row
    pub skipped: Vec<MetadataError>,
}

impl ParsedMetadata {
    fn from_raw(raw: RawMetadata) -> Self {
        let (metadata, skipped) = MetadataSet::from_raw(raw);
        for err in &skipped {
            warn!("Skipping metadata row: {}", err);
        }
        debug!(
            feeds = metadata.feeds.len(),
            staging = metadata.staging.len(),
            enumerations = metadata.enumerations.len(),
            skipped = skipped.len(),
            "Loaded metadata"
        );
        Self { metadata, skipped }
    }
}

/// Parse metadata from a YAML string.
pub fn parse_yaml(content: &str) -> Result<ParsedMetadata> {
    let raw: RawMetadata = serde_yaml_ng::from_str(content)?;
    Ok(ParsedMetadata::from_raw(raw))
}

/// Parse metadata from a TOML string.
///
/// # Example
///
/// ```rust
/// use feedcheck_parser::parse_toml;
///
/// let toml = r#"
/// [[Feed_to_staging]]
/// Modules = "Orders"
/// Feed = "in/orders.csv"
/// FieldName = "order_id"
/// DBName = "warehouse"
/// "DB Table" = "orders"
/// DataType = "INTEGER"
/// "#;
///
/// let parsed = parse_toml(toml).unwrap();
/// assert_eq!(parsed.metadata.feeds[0].table_name, "orders");
/// ```
pub fn parse_toml(content: &str) -> Result<ParsedMetadata> {
    let raw: RawMetadata =
        toml::from_str(content).map_err(|e| ParserError::TomlError(e.to_string()))?;
    Ok(ParsedMetadata::from_raw(raw))
}

/// Parse metadata from a JSON string.
pub fn parse_json(content: &str) -> Result<ParsedMetadata> {
    let raw: RawMetadata = serde_json::from_str(content)?;
    Ok(ParsedMetadata::from_raw(raw))
}

/// Detect the document format from a file path based on its extension.
///
/// # Supported Extensions
///
/// * `.yaml`, `.yml` → `MetadataFormat::Yaml`
/// * `.toml` → `MetadataFormat::Toml`
/// * `.json` → `MetadataFormat::Json`
///
/// # Errors
///
/// Returns `ParserError::InvalidExtension` if the file has no extension.
/// Returns `ParserError::UnsupportedFormat` if the extension is not recognized.
pub fn detect_format(path: &Path) -> Result<MetadataFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(ParserError::InvalidExtension)?;

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(MetadataFormat::Yaml),
        "toml" => Ok(MetadataFormat::Toml),
        "json" => Ok(MetadataFormat::Json),
        other => Err(ParserError::UnsupportedFormat(other.to_string())),
    }
}

/// Parse a metadata document with automatic format detection.
///
/// # Example
///
/// ```no_run
/// use feedcheck_parser::parse_file;
/// use std::path::Path;
///
/// let parsed = parse_file(Path::new("metadata/feeds.yml")).unwrap();
/// println!("Loaded {} column records", parsed.metadata.feeds.len());
/// ```
pub fn parse_file(path: &Path) -> Result<ParsedMetadata> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    debug!(path = %path.display(), ?format, "Parsing metadata document");

    match format {
        MetadataFormat::Yaml => parse_yaml(&content),
        MetadataFormat::Toml => parse_toml(&content),
        MetadataFormat::Json => parse_json(&content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedcheck_core::{Flag, RequestMode};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_yaml_snake_case() {
        let yaml = r#"
feeds:
  - module: Sales
    feed: "in/orders.csv | in/orders_eu.csv"
    field_name: amount
    db_name: warehouse
    db_table: orders
    data_type: DECIMAL
    nullable: Y
    request: Append
    range_bottom: 0
    range_top: 10000.5
    mandatory: N
staging:
  - module: Sales
    stg_db_name: staging
    stg_db_table: orders_stg
    stg_field_name: amount
    trg_db_name: warehouse
    trg_db_table: orders
    trg_field_name: amount
"#;

        let parsed = parse_yaml(yaml).expect("Failed to parse YAML");
        assert!(parsed.skipped.is_empty());

        let amount = &parsed.metadata.feeds[0];
        assert_eq!(amount.feed_list, vec!["in/orders.csv", "in/orders_eu.csv"]);
        assert_eq!(amount.table_name, "orders");
        assert_eq!(amount.nullable, Flag::Yes);
        assert_eq!(amount.mandatory, Flag::No);
        assert_eq!(amount.unique, Flag::No);
        assert_eq!(amount.request, RequestMode::Append);
        assert_eq!(amount.range_bottom.as_deref(), Some("0"));
        assert_eq!(amount.range_top.as_deref(), Some("10000.5"));

        assert_eq!(parsed.metadata.staging.len(), 1);
        assert_eq!(parsed.metadata.staging_for_module("Sales").len(), 1);
    }

    #[test]
    fn test_parse_yaml_spreadsheet_headers() {
        let yaml = r#"
Feed_to_staging:
  - Modules: Sales
    Feed: in/orders.csv
    FieldName: status
    DBName: warehouse
    DB Table: orders
    DataType: VARCHAR
    Enumeration: order_status
    Mandatory: true
Enumeration:
  - EnumerationName: order_status
    EnumValues: NEW
  - EnumerationName: order_status
    EnumValues: SHIPPED
"#;

        let parsed = parse_yaml(yaml).expect("Failed to parse YAML");

        let status = &parsed.metadata.feeds[0];
        assert_eq!(status.enumeration.as_deref(), Some("order_status"));
        assert_eq!(status.mandatory, Flag::Yes);
        assert_eq!(status.request, RequestMode::Insert);

        let catalog = parsed.metadata.enumeration_catalog();
        assert_eq!(
            catalog.resolve("order_status"),
            Some(&["NEW".to_string(), "SHIPPED".to_string()][..])
        );
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let yaml = r#"
feeds:
  - module: Sales
    feed: in/orders.csv
    field_name: order_id
    db_name: warehouse
    db_table: orders
    data_type: INTEGER
  - module: Sales
    feed: "  "
    field_name: status
    db_name: warehouse
    db_table: orders
    data_type: VARCHAR
enumerations:
  - enum_value: NEW
"#;

        let parsed = parse_yaml(yaml).expect("Failed to parse YAML");

        assert_eq!(parsed.metadata.feeds.len(), 1);
        assert!(parsed.metadata.enumerations.is_empty());
        assert_eq!(parsed.skipped.len(), 2);
        assert_eq!(parsed.skipped[0], MetadataError::malformed("feed", "feed"));
        assert_eq!(
            parsed.skipped[1],
            MetadataError::malformed("enumeration", "enumeration_name")
        );
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[[feeds]]
module = "Sales"
feed = "in/orders.csv"
field_name = "order_id"
db_name = "warehouse"
db_table = "orders"
data_type = "INTEGER"
unique = "Y"
range_bottom = 1

[[enumerations]]
enumeration_name = "codes"
enum_value = 42
"#;

        let parsed = parse_toml(toml).expect("Failed to parse TOML");

        let order_id = &parsed.metadata.feeds[0];
        assert_eq!(order_id.unique, Flag::Yes);
        assert_eq!(order_id.range_bottom.as_deref(), Some("1"));
        assert_eq!(parsed.metadata.enumerations[0].value, "42");
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{
  "feeds": [
    {
      "module": "Sales",
      "feed": "in/orders.csv",
      "field_name": "order_id",
      "db_name": "warehouse",
      "db_table": "orders",
      "data_type": "INTEGER",
      "nullable": null,
      "mandatory": "y"
    }
  ]
}"#;

        let parsed = parse_json(json).expect("Failed to parse JSON");

        let order_id = &parsed.metadata.feeds[0];
        assert_eq!(order_id.nullable, Flag::No);
        assert_eq!(order_id.mandatory, Flag::Yes);
        assert!(parsed.metadata.staging.is_empty());
    }

    #[test]
    fn test_parse_invalid_documents() {
        assert!(matches!(
            parse_yaml("feeds: [unclosed"),
            Err(ParserError::YamlError(_))
        ));
        assert!(matches!(
            parse_toml("feeds = 3 = 4"),
            Err(ParserError::TomlError(_))
        ));
        assert!(matches!(parse_json("{"), Err(ParserError::JsonError(_))));
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(
            detect_format(Path::new("meta.YML")).unwrap(),
            MetadataFormat::Yaml
        );
        assert_eq!(
            detect_format(Path::new("meta.toml")).unwrap(),
            MetadataFormat::Toml
        );
        assert_eq!(
            detect_format(Path::new("meta.json")).unwrap(),
            MetadataFormat::Json
        );
        assert!(matches!(
            detect_format(Path::new("meta.xlsx")),
            Err(ParserError::UnsupportedFormat(ext)) if ext == "xlsx"
        ));
        assert!(matches!(
            detect_format(Path::new("meta")),
            Err(ParserError::InvalidExtension)
        ));
    }
}
