//! Metadata model for feed validation.
//!
//! Metadata describes what a landed table is expected to look like: one
//! [`FeedMetadata`] record per (feed, table, column), enumeration catalogs
//! shared between columns, and staging-to-target mappings.
//!
//! Records are built from loosely typed [`RawFeedRecord`]-style rows, which is
//! the shape produced by spreadsheet or document ingestion. Rows missing an
//! identifying field fail construction with [`MetadataError::Malformed`].

use crate::{MetadataError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Characters separating sub-paths inside a raw feed string.
const FEED_SEPARATORS: [char; 3] = [',', '|', ';'];

/// A Y/N metadata flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Flag {
    /// `Y`
    Yes,
    /// `N`
    #[default]
    No,
}

impl Flag {
    /// Parses a flag cell. Anything other than `Y`/`YES` (or a boolean
    /// `true` from a typed document) reads as `No`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "Y" | "YES" | "TRUE" => Flag::Yes,
            _ => Flag::No,
        }
    }

    /// Returns true for `Y`.
    pub fn is_yes(self) -> bool {
        matches!(self, Flag::Yes)
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Flag::Yes => "Y",
            Flag::No => "N",
        })
    }
}

impl From<Flag> for String {
    fn from(flag: Flag) -> Self {
        flag.to_string()
    }
}

impl From<String> for Flag {
    fn from(value: String) -> Self {
        Flag::parse(&value)
    }
}

/// Declared load semantics for a table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum RequestMode {
    /// Fresh load; the table is truncated before the load
    #[default]
    Insert,
    /// Additive load on top of existing rows
    Append,
    /// A value that is neither of the known modes, kept verbatim
    Other(String),
}

impl RequestMode {
    /// Parses a request cell, case-insensitively.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("insert") {
            RequestMode::Insert
        } else if trimmed.eq_ignore_ascii_case("append") {
            RequestMode::Append
        } else {
            RequestMode::Other(trimmed.to_string())
        }
    }
}

impl fmt::Display for RequestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestMode::Insert => f.write_str("Insert"),
            RequestMode::Append => f.write_str("Append"),
            RequestMode::Other(raw) => f.write_str(raw),
        }
    }
}

impl From<RequestMode> for String {
    fn from(mode: RequestMode) -> Self {
        mode.to_string()
    }
}

impl From<String> for RequestMode {
    fn from(value: String) -> Self {
        RequestMode::parse(&value)
    }
}

/// Splits a raw feed string into its ordered, trimmed, non-empty sub-paths.
///
/// ```rust
/// use feedcheck_core::parse_feed_list;
///
/// let feeds = parse_feed_list("in/a.csv | in/b.csv;;in/c.csv,");
/// assert_eq!(feeds, vec!["in/a.csv", "in/b.csv", "in/c.csv"]);
/// ```
pub fn parse_feed_list(raw: &str) -> Vec<String> {
    raw.split(FEED_SEPARATORS)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(String::from)
        .collect()
}

/// Expected constraints for one column of a landed feed table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedMetadata {
    /// Owning module
    pub module: String,

    /// Raw feed identifier as authored
    pub feed: String,

    /// Feed sub-paths parsed from `feed`
    pub feed_list: Vec<String>,

    /// Column name in the target table
    pub column_name: String,

    /// Store holding the table
    pub db_name: String,

    /// Target table
    pub table_name: String,

    /// Declared data-type category (e.g. "VARCHAR", "INTEGER")
    pub data_type: String,

    /// Whether the column is declared nullable
    pub nullable: Flag,

    /// Declared load mode for the table
    pub request: RequestMode,

    /// Declared default value
    pub default_value: Option<String>,

    /// Enumeration catalog reference
    pub enumeration: Option<String>,

    /// Lower bound, as store-comparable text
    pub range_bottom: Option<String>,

    /// Upper bound, as store-comparable text
    pub range_top: Option<String>,

    /// Whether the column must never be null
    pub mandatory: Flag,

    /// Whether the column must hold distinct values
    pub unique: Flag,
}

impl FeedMetadata {
    /// Builds a record from a raw ingestion row.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::Malformed`] if `module` or `feed` is absent.
    pub fn from_raw(raw: RawFeedRecord) -> Result<Self> {
        let module = required(raw.module, "feed", "module")?;
        let feed = required(raw.feed, "feed", "feed")?;
        let feed_list = parse_feed_list(&feed);

        Ok(Self {
            module,
            feed,
            feed_list,
            column_name: raw.field_name.unwrap_or_default(),
            db_name: raw.db_name.unwrap_or_default(),
            table_name: raw.db_table.unwrap_or_default(),
            data_type: raw.data_type.unwrap_or_default(),
            nullable: flag(raw.nullable),
            request: raw
                .request
                .as_deref()
                .map(RequestMode::parse)
                .unwrap_or_default(),
            default_value: raw.default_value,
            enumeration: raw.enumeration,
            range_bottom: raw.range_bottom,
            range_top: raw.range_top,
            mandatory: flag(raw.mandatory),
            unique: flag(raw.unique),
        })
    }

    /// Returns the `"<store>.<table>"` key used for grouping and expected counts.
    pub fn table_key(&self) -> String {
        format!("{}.{}", self.db_name, self.table_name)
    }

    /// Returns true if either range bound is declared.
    pub fn has_range(&self) -> bool {
        self.range_bottom.is_some() || self.range_top.is_some()
    }

    /// Returns true if this record belongs to any of the named feeds.
    ///
    /// A record matches on its raw feed string or on any of its sub-paths.
    pub fn matches_feed<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().any(|name| {
            let name = name.as_ref();
            self.feed == name || self.feed_list.iter().any(|token| token == name)
        })
    }
}

/// Staging-to-target column mapping with its own constraint set.
///
/// Modelled for completeness of the metadata workbook; no validator reads it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StagingMetadata {
    pub module: String,
    pub stg_db_name: String,
    pub stg_table_name: String,
    pub stg_where_clause: Option<String>,
    pub stg_column_name: String,
    pub trg_db_name: String,
    pub trg_table_name: String,
    pub trg_where_clause: Option<String>,
    pub trg_column_name: String,
    pub trg_data_type: String,
    pub nullable: Flag,
    pub request: RequestMode,
    pub default_value: Option<String>,
    pub enumeration: Option<String>,
    pub range_bottom: Option<String>,
    pub range_top: Option<String>,
    pub mandatory: Flag,
    pub unique: Flag,
}

impl StagingMetadata {
    /// Builds a record from a raw ingestion row.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::Malformed`] if `module` is absent.
    pub fn from_raw(raw: RawStagingRecord) -> Result<Self> {
        Ok(Self {
            module: required(raw.module, "staging", "module")?,
            stg_db_name: raw.stg_db_name.unwrap_or_default(),
            stg_table_name: raw.stg_db_table.unwrap_or_default(),
            stg_where_clause: raw.where_clause_stg,
            stg_column_name: raw.stg_field_name.unwrap_or_default(),
            trg_db_name: raw.trg_db_name.unwrap_or_default(),
            trg_table_name: raw.trg_db_table.unwrap_or_default(),
            trg_where_clause: raw.where_clause_trg,
            trg_column_name: raw.trg_field_name.unwrap_or_default(),
            trg_data_type: raw.trg_data_type.unwrap_or_default(),
            nullable: flag(raw.nullable),
            request: raw
                .request
                .as_deref()
                .map(RequestMode::parse)
                .unwrap_or_default(),
            default_value: raw.default_value,
            enumeration: raw.enumeration,
            range_bottom: raw.range_bottom,
            range_top: raw.range_top,
            mandatory: flag(raw.mandatory),
            unique: flag(raw.unique),
        })
    }
}

/// One allowed value of a named enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumerationMetadata {
    /// Enumeration name, shared by every value of the set
    pub enumeration_name: String,
    /// A single allowed value
    pub value: String,
}

impl EnumerationMetadata {
    /// Creates an enumeration entry.
    pub fn new(enumeration_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            enumeration_name: enumeration_name.into(),
            value: value.into(),
        }
    }

    /// Builds an entry from a raw ingestion row.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::Malformed`] if the enumeration name is absent.
    pub fn from_raw(raw: RawEnumerationRecord) -> Result<Self> {
        Ok(Self {
            enumeration_name: required(raw.enumeration_name, "enumeration", "enumeration_name")?,
            value: raw.enum_value.unwrap_or_default(),
        })
    }
}

/// Allowed-value sets indexed by enumeration name.
#[derive(Debug, Clone, Default)]
pub struct EnumerationCatalog {
    values: HashMap<String, Vec<String>>,
}

impl EnumerationCatalog {
    /// Indexes enumeration rows by exact name, keeping authored order.
    pub fn from_records(records: &[EnumerationMetadata]) -> Self {
        let mut values: HashMap<String, Vec<String>> = HashMap::new();
        for record in records {
            values
                .entry(record.enumeration_name.clone())
                .or_default()
                .push(record.value.clone());
        }
        Self { values }
    }

    /// Returns the allowed values for `name`, or `None` if nothing resolves.
    pub fn resolve(&self, name: &str) -> Option<&[String]> {
        self.values
            .get(name)
            .map(Vec::as_slice)
            .filter(|values| !values.is_empty())
    }

    /// Number of distinct enumeration names.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the catalog holds no enumerations.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// All metadata loaded for one validation run.
#[derive(Debug, Clone, Default)]
pub struct MetadataSet {
    pub feeds: Vec<FeedMetadata>,
    pub staging: Vec<StagingMetadata>,
    pub enumerations: Vec<EnumerationMetadata>,
}

impl MetadataSet {
    /// Converts raw rows into records, skipping malformed ones.
    ///
    /// Returns the set together with one error per skipped row.
    pub fn from_raw(raw: RawMetadata) -> (Self, Vec<MetadataError>) {
        let mut skipped = Vec::new();

        let feeds = keep_valid(raw.feeds, FeedMetadata::from_raw, &mut skipped);
        let staging = keep_valid(raw.staging, StagingMetadata::from_raw, &mut skipped);
        let enumerations = keep_valid(
            raw.enumerations,
            EnumerationMetadata::from_raw,
            &mut skipped,
        );

        (
            Self {
                feeds,
                staging,
                enumerations,
            },
            skipped,
        )
    }

    /// Builds the enumeration lookup for this set.
    pub fn enumeration_catalog(&self) -> EnumerationCatalog {
        EnumerationCatalog::from_records(&self.enumerations)
    }

    /// Feed metadata whose raw feed string equals `feed`.
    pub fn feeds_for(&self, feed: &str) -> Vec<&FeedMetadata> {
        self.feeds.iter().filter(|meta| meta.feed == feed).collect()
    }

    /// Staging metadata for a module.
    pub fn staging_for_module(&self, module: &str) -> Vec<&StagingMetadata> {
        self.staging
            .iter()
            .filter(|meta| meta.module == module)
            .collect()
    }

    /// Distinct raw feed strings, sorted.
    pub fn unique_feeds(&self) -> Vec<String> {
        self.feeds
            .iter()
            .map(|meta| meta.feed.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct modules across feed and staging metadata, sorted.
    pub fn unique_modules(&self) -> Vec<String> {
        self.feeds
            .iter()
            .map(|meta| meta.module.clone())
            .chain(self.staging.iter().map(|meta| meta.module.clone()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Raw metadata document: one array per workbook sheet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMetadata {
    #[serde(default, alias = "Feed_to_staging")]
    pub feeds: Vec<RawFeedRecord>,
    #[serde(default, alias = "Staging_to_GRI")]
    pub staging: Vec<RawStagingRecord>,
    #[serde(default, alias = "Enumeration")]
    pub enumerations: Vec<RawEnumerationRecord>,
}

/// A feed row as ingested. Blank cells are `None`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFeedRecord {
    #[serde(default, alias = "Modules", deserialize_with = "cell")]
    pub module: Option<String>,
    #[serde(default, alias = "Feed", deserialize_with = "cell")]
    pub feed: Option<String>,
    #[serde(default, alias = "FieldName", deserialize_with = "cell")]
    pub field_name: Option<String>,
    #[serde(default, alias = "DBName", deserialize_with = "cell")]
    pub db_name: Option<String>,
    #[serde(default, alias = "DB Table", deserialize_with = "cell")]
    pub db_table: Option<String>,
    #[serde(default, alias = "DataType", deserialize_with = "cell")]
    pub data_type: Option<String>,
    #[serde(default, alias = "Nullable", deserialize_with = "cell")]
    pub nullable: Option<String>,
    #[serde(default, alias = "Request", deserialize_with = "cell")]
    pub request: Option<String>,
    #[serde(default, rename = "default", alias = "Default", deserialize_with = "cell")]
    pub default_value: Option<String>,
    #[serde(default, alias = "Enumeration", deserialize_with = "cell")]
    pub enumeration: Option<String>,
    #[serde(default, alias = "RangeBottom", deserialize_with = "cell")]
    pub range_bottom: Option<String>,
    #[serde(default, alias = "RangeTop", deserialize_with = "cell")]
    pub range_top: Option<String>,
    #[serde(default, alias = "Mandatory", deserialize_with = "cell")]
    pub mandatory: Option<String>,
    #[serde(default, alias = "Unique", deserialize_with = "cell")]
    pub unique: Option<String>,
}

/// A staging row as ingested.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStagingRecord {
    #[serde(default, alias = "Modules", deserialize_with = "cell")]
    pub module: Option<String>,
    #[serde(default, alias = "Stg_DBName", deserialize_with = "cell")]
    pub stg_db_name: Option<String>,
    #[serde(default, alias = "Stg_DB Table", deserialize_with = "cell")]
    pub stg_db_table: Option<String>,
    #[serde(default, alias = "Where_Clause_Stg", deserialize_with = "cell")]
    pub where_clause_stg: Option<String>,
    #[serde(default, alias = "STG_FieldName", deserialize_with = "cell")]
    pub stg_field_name: Option<String>,
    #[serde(default, alias = "Trg_DBName", deserialize_with = "cell")]
    pub trg_db_name: Option<String>,
    #[serde(default, alias = "Trg _DB Table", deserialize_with = "cell")]
    pub trg_db_table: Option<String>,
    #[serde(default, alias = "Where_Clause_Trg", deserialize_with = "cell")]
    pub where_clause_trg: Option<String>,
    #[serde(default, alias = "Trg _FieldName", deserialize_with = "cell")]
    pub trg_field_name: Option<String>,
    #[serde(default, alias = "Trg _DataType", deserialize_with = "cell")]
    pub trg_data_type: Option<String>,
    #[serde(default, alias = "Nullable", deserialize_with = "cell")]
    pub nullable: Option<String>,
    #[serde(default, alias = "Request", deserialize_with = "cell")]
    pub request: Option<String>,
    #[serde(default, rename = "default", alias = "Default", deserialize_with = "cell")]
    pub default_value: Option<String>,
    #[serde(default, alias = "Enumeration", deserialize_with = "cell")]
    pub enumeration: Option<String>,
    #[serde(default, alias = "RangeBottom", deserialize_with = "cell")]
    pub range_bottom: Option<String>,
    #[serde(default, alias = "RangeTop", deserialize_with = "cell")]
    pub range_top: Option<String>,
    #[serde(default, alias = "Mandatory", deserialize_with = "cell")]
    pub mandatory: Option<String>,
    #[serde(default, alias = "Unique", deserialize_with = "cell")]
    pub unique: Option<String>,
}

/// An enumeration row as ingested.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEnumerationRecord {
    #[serde(default, alias = "EnumerationName", deserialize_with = "cell")]
    pub enumeration_name: Option<String>,
    #[serde(default, alias = "EnumValues", deserialize_with = "cell")]
    pub enum_value: Option<String>,
}

/// Spreadsheet cell: text, number or boolean, rendered as trimmed text.
#[derive(Deserialize)]
#[serde(untagged)]
enum Cell {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

fn cell<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Cell>::deserialize(deserializer)?;
    Ok(value.and_then(|cell| {
        let text = match cell {
            Cell::Text(s) => s.trim().to_string(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Bool(b) => b.to_string(),
        };
        (!text.is_empty()).then_some(text)
    }))
}

fn required(value: Option<String>, kind: &'static str, field: &'static str) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| MetadataError::malformed(kind, field))
}

fn flag(value: Option<String>) -> Flag {
    value.as_deref().map(Flag::parse).unwrap_or_default()
}

fn keep_valid<R, T>(
    rows: Vec<R>,
    build: impl Fn(R) -> Result<T>,
    skipped: &mut Vec<MetadataError>,
) -> Vec<T> {
    let mut kept = Vec::with_capacity(rows.len());
    for row in rows {
        match build(row) {
            Ok(record) => kept.push(record),
            Err(err) => skipped.push(err),
        }
    }
    kept
}
