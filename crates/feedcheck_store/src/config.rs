//! Configuration for the named stores.
//!
//! A store is a named set of file-backed tables. Configuration is read from
//! TOML or YAML; relative paths resolve against the configuration file's
//! directory, and `FEEDCHECK_STORE_<NAME>_ROOT` overrides a store's root.

use crate::{Result, StoreError, types};
use arrow_schema::{Field, Schema};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

/// On-disk format of a table source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    #[default]
    Csv,
    Parquet,
    Json,
}

/// Declared column of a table source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,

    /// Type name, bucketed onto an Arrow type when reading
    #[serde(rename = "type")]
    pub data_type: String,

    #[serde(default = "default_true")]
    pub nullable: bool,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable,
        }
    }
}

/// A table registered in a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSource {
    /// Table name as queried
    pub name: String,

    /// File or directory holding the data
    pub path: PathBuf,

    #[serde(default)]
    pub format: FileFormat,

    /// CSV only
    #[serde(default = "default_true")]
    pub has_header: bool,

    /// CSV only
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Explicit schema; inferred (all nullable) when absent
    #[serde(default)]
    pub columns: Option<Vec<ColumnSpec>>,

    #[serde(default)]
    pub primary_key: Vec<String>,
}

impl TableSource {
    /// Creates a table source with default read options.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, format: FileFormat) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            format,
            has_header: true,
            delimiter: default_delimiter(),
            columns: None,
            primary_key: Vec::new(),
        }
    }

    /// Creates a CSV table source.
    pub fn csv(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::new(name, path, FileFormat::Csv)
    }

    /// Creates a Parquet table source.
    pub fn parquet(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::new(name, path, FileFormat::Parquet)
    }

    /// Creates a newline-delimited JSON table source.
    pub fn json(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::new(name, path, FileFormat::Json)
    }

    /// Adds a declared column.
    pub fn column(mut self, column: ColumnSpec) -> Self {
        self.columns.get_or_insert_with(Vec::new).push(column);
        self
    }

    pub fn primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Delimiter as the single byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                StoreError::configuration(format!(
                    "Delimiter '{}' for table '{}' must be a single ASCII character",
                    self.delimiter, self.name
                ))
            })
    }

    /// Declared nullability of `column`, if the table declares its columns.
    pub fn declared_nullable(&self, column: &str) -> Option<bool> {
        self.columns
            .as_ref()?
            .iter()
            .find(|spec| spec.name == column)
            .map(|spec| spec.nullable)
    }

    /// Arrow schema for reading the declared columns, if any.
    ///
    /// Every field is read as nullable. A non-nullable field lets the planner
    /// fold `IS NULL` to false, which would hide nulls in the landed file.
    pub fn arrow_schema(&self) -> Result<Option<Schema>> {
        let Some(columns) = &self.columns else {
            return Ok(None);
        };

        let fields = columns
            .iter()
            .map(|column| -> Result<Field> {
                Ok(Field::new(
                    &column.name,
                    types::arrow_type(&column.data_type)?,
                    true,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(Schema::new(fields)))
    }
}

/// A named store and its tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDefinition {
    pub name: String,

    /// Base directory for relative table paths
    #[serde(default)]
    pub root: Option<PathBuf>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub tables: Vec<TableSource>,
}

impl StoreDefinition {
    /// Creates an empty store definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: None,
            description: None,
            tables: Vec::new(),
        }
    }

    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a table source.
    pub fn table(mut self, table: TableSource) -> Self {
        self.tables.push(table);
        self
    }

    /// Looks up a table source by name.
    pub fn find_table(&self, name: &str) -> Option<&TableSource> {
        self.tables.iter().find(|table| table.name == name)
    }

    /// Resolves a table's path against the store root.
    pub fn table_path(&self, table: &TableSource) -> PathBuf {
        match &self.root {
            Some(root) if table.path.is_relative() => root.join(&table.path),
            _ => table.path.clone(),
        }
    }

    /// Name of the environment variable overriding this store's root.
    pub fn root_env_var(&self) -> String {
        let normalized: String = self
            .name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("FEEDCHECK_STORE_{}_ROOT", normalized)
    }
}

/// Configuration for every store available to a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub stores: Vec<StoreDefinition>,
}

impl StoreConfig {
    /// Creates a new builder for `StoreConfig`.
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }

    /// Loads configuration from a `.toml`, `.yaml` or `.yml` file.
    ///
    /// Relative paths are resolved against the file's directory and
    /// environment overrides are applied before validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let mut config: StoreConfig = match extension.as_deref() {
            Some("toml") => toml::from_str(&content)
                .map_err(|e| StoreError::configuration(format!("{}: {}", path.display(), e)))?,
            Some("yaml") | Some("yml") => serde_yaml_ng::from_str(&content)
                .map_err(|e| StoreError::configuration(format!("{}: {}", path.display(), e)))?,
            _ => {
                return Err(StoreError::configuration(format!(
                    "Unsupported store configuration format: {}",
                    path.display()
                )));
            }
        };

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.resolve_relative_to(base);
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        info!(
            "Loaded {} store(s) from {}",
            config.stores.len(),
            path.display()
        );
        Ok(config)
    }

    /// Anchors relative store roots at `base`; stores without a root get `base`.
    pub fn resolve_relative_to(&mut self, base: &Path) {
        for store in &mut self.stores {
            store.root = Some(match store.root.take() {
                Some(root) if root.is_relative() => base.join(root),
                Some(root) => root,
                None => base.to_path_buf(),
            });
        }
    }

    /// Replaces store roots from `FEEDCHECK_STORE_<NAME>_ROOT` values.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for store in &mut self.stores {
            if let Some(root) = lookup(&store.root_env_var()).filter(|v| !v.trim().is_empty()) {
                info!("Overriding root of store '{}' with {}", store.name, root);
                store.root = Some(PathBuf::from(root));
            }
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();

        for store in &self.stores {
            if store.name.trim().is_empty() {
                return Err(StoreError::configuration("store name cannot be empty"));
            }
            if !names.insert(store.name.as_str()) {
                return Err(StoreError::configuration(format!(
                    "duplicate store name '{}'",
                    store.name
                )));
            }

            let mut tables = HashSet::new();
            for table in &store.tables {
                if table.name.trim().is_empty() {
                    return Err(StoreError::configuration(format!(
                        "table name cannot be empty in store '{}'",
                        store.name
                    )));
                }
                if !tables.insert(table.name.as_str()) {
                    return Err(StoreError::configuration(format!(
                        "duplicate table '{}' in store '{}'",
                        table.name, store.name
                    )));
                }
                table.delimiter_byte()?;
            }
        }

        Ok(())
    }

    /// Looks up a store by name.
    pub fn store(&self, name: &str) -> Option<&StoreDefinition> {
        self.stores.iter().find(|store| store.name == name)
    }

    /// Configured store names, in declaration order.
    pub fn store_names(&self) -> Vec<String> {
        self.stores.iter().map(|store| store.name.clone()).collect()
    }
}

/// Builder for `StoreConfig`.
#[derive(Debug, Clone, Default)]
pub struct StoreConfigBuilder {
    stores: Vec<StoreDefinition>,
}

impl StoreConfigBuilder {
    /// Adds a store.
    pub fn store(mut self, store: StoreDefinition) -> Self {
        self.stores.push(store);
        self
    }

    /// Builds and validates the `StoreConfig`.
    pub fn build(self) -> Result<StoreConfig> {
        let config = StoreConfig {
            stores: self.stores,
        };
        config.validate()?;
        Ok(config)
    }
}

fn default_true() -> bool {
    true
}

fn default_delimiter() -> char {
    ','
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_schema::DataType;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_builder_validates() {
        let config = StoreConfig::builder()
            .store(StoreDefinition::new("warehouse").table(TableSource::csv("orders", "orders.csv")))
            .build()
            .unwrap();
        assert_eq!(config.store_names(), vec!["warehouse"]);

        let duplicate = StoreConfig::builder()
            .store(StoreDefinition::new("warehouse"))
            .store(StoreDefinition::new("warehouse"))
            .build();
        assert!(duplicate.is_err());

        let duplicate_table = StoreConfig::builder()
            .store(
                StoreDefinition::new("warehouse")
                    .table(TableSource::csv("orders", "a.csv"))
                    .table(TableSource::csv("orders", "b.csv")),
            )
            .build();
        assert!(duplicate_table.is_err());

        assert!(StoreConfig::builder().store(StoreDefinition::new(" ")).build().is_err());
    }

    #[test]
    fn test_delimiter_must_be_ascii() {
        let table = TableSource::csv("orders", "orders.csv").delimiter('§');
        assert!(table.delimiter_byte().is_err());
        assert_eq!(TableSource::csv("t", "t.csv").delimiter(';').delimiter_byte().unwrap(), b';');
    }

    #[test]
    fn test_arrow_schema_from_columns() {
        let table = TableSource::csv("orders", "orders.csv")
            .column(ColumnSpec::new("order_id", "INTEGER", false))
            .column(ColumnSpec::new("note", "VARCHAR", true));

        let schema = table.arrow_schema().unwrap().unwrap();
        assert_eq!(schema.fields().len(), 2);
        assert_eq!(schema.field(0).data_type(), &DataType::Int64);
        assert!(schema.fields().iter().all(|field| field.is_nullable()));
        assert_eq!(table.declared_nullable("order_id"), Some(false));
        assert_eq!(table.declared_nullable("note"), Some(true));
        assert_eq!(table.declared_nullable("ghost"), None);

        assert!(TableSource::csv("t", "t.csv").arrow_schema().unwrap().is_none());
    }

    #[test]
    fn test_table_path_resolution() {
        let store = StoreDefinition::new("warehouse").root("/data/landing");
        let relative = TableSource::csv("orders", "orders.csv");
        let absolute = TableSource::csv("events", "/archive/events.csv");

        assert_eq!(
            store.table_path(&relative),
            PathBuf::from("/data/landing/orders.csv")
        );
        assert_eq!(
            store.table_path(&absolute),
            PathBuf::from("/archive/events.csv")
        );
    }

    #[test]
    fn test_env_override() {
        let mut config = StoreConfig::builder()
            .store(StoreDefinition::new("sales-db").root("/data/sales"))
            .store(StoreDefinition::new("hr").root("/data/hr"))
            .build()
            .unwrap();

        assert_eq!(config.stores[0].root_env_var(), "FEEDCHECK_STORE_SALES_DB_ROOT");

        config.apply_overrides(|key| {
            (key == "FEEDCHECK_STORE_SALES_DB_ROOT").then(|| "/mnt/sales".to_string())
        });

        assert_eq!(config.stores[0].root, Some(PathBuf::from("/mnt/sales")));
        assert_eq!(config.stores[1].root, Some(PathBuf::from("/data/hr")));
    }

    #[test]
    fn test_from_toml_file_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stores.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[[stores]]
name = "warehouse"
root = "data"

[[stores.tables]]
name = "orders"
path = "orders.csv"
primary_key = ["order_id"]

[[stores.tables.columns]]
name = "order_id"
type = "INTEGER"
nullable = false
"#
        )
        .unwrap();

        let config = StoreConfig::from_file(&path).unwrap();
        let store = config.store("warehouse").unwrap();
        let table = store.find_table("orders").unwrap();

        assert_eq!(store.root, Some(dir.path().join("data")));
        assert_eq!(store.table_path(table), dir.path().join("data").join("orders.csv"));
        assert_eq!(table.format, FileFormat::Csv);
        assert!(table.has_header);
        assert_eq!(table.primary_key, vec!["order_id"]);
        assert_eq!(table.columns.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stores.yml");
        std::fs::write(
            &path,
            "stores:\n  - name: archive\n    tables:\n      - name: events\n        path: events.json\n        format: json\n",
        )
        .unwrap();

        let config = StoreConfig::from_file(&path).unwrap();
        let store = config.store("archive").unwrap();

        assert_eq!(store.root, Some(dir.path().to_path_buf()));
        assert_eq!(store.tables[0].format, FileFormat::Json);
    }

    #[test]
    fn test_from_file_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stores.ini");
        std::fs::write(&path, "").unwrap();

        let err = StoreConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, StoreError::Configuration(_)));
    }
}
