use anyhow::{Context, Result};
use feedcheck_core::MetadataSet;
use feedcheck_parser::parse_file;
use serde_json::json;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

use crate::output::{self, OutputFormat};

pub fn execute(metadata_path: &str, format: OutputFormat) -> Result<()> {
    info!("Checking metadata: {}", metadata_path);

    let parsed = parse_file(Path::new(metadata_path))
        .with_context(|| format!("Failed to parse metadata file: {}", metadata_path))?;
    let metadata = &parsed.metadata;

    let tables: BTreeSet<String> = metadata.feeds.iter().map(|m| m.table_key()).collect();
    let enumerations: BTreeSet<&str> = metadata
        .enumerations
        .iter()
        .map(|e| e.enumeration_name.as_str())
        .collect();
    let unresolved = unresolved_enumerations(metadata);
    let skipped: Vec<String> = parsed.skipped.iter().map(|e| e.to_string()).collect();

    if format == OutputFormat::Json {
        return output::print_json(&json!({
            "modules": metadata.unique_modules(),
            "feeds": metadata.unique_feeds(),
            "tables": tables,
            "column_records": metadata.feeds.len(),
            "staging_records": metadata.staging.len(),
            "enumerations": enumerations,
            "unresolved_enumerations": unresolved,
            "skipped": skipped,
        }));
    }

    output::print_success("Metadata parsed successfully");

    println!("\nMetadata Summary:");
    println!("  Modules:        {}", metadata.unique_modules().join(", "));
    println!("  Feeds:          {}", metadata.unique_feeds().len());
    println!("  Tables:         {}", tables.len());
    println!("  Columns:        {}", metadata.feeds.len());
    println!("  Staging rows:   {}", metadata.staging.len());
    println!("  Enumerations:   {}", enumerations.len());

    if !tables.is_empty() {
        println!("\nTables:");
        for table in &tables {
            println!("  {}", table);
        }
    }

    if !unresolved.is_empty() {
        println!();
        for name in &unresolved {
            output::print_warning(&format!(
                "Enumeration {} is referenced but has no values",
                name
            ));
        }
    }

    if !skipped.is_empty() {
        println!("\nSkipped rows: {}", skipped.len());
        for reason in &skipped {
            output::print_warning(reason);
        }
    }

    Ok(())
}

/// Enumeration names referenced by feed columns that resolve to nothing.
fn unresolved_enumerations(metadata: &MetadataSet) -> Vec<String> {
    let catalog = metadata.enumeration_catalog();
    metadata
        .feeds
        .iter()
        .filter_map(|m| m.enumeration.as_deref())
        .filter(|name| catalog.resolve(name).is_none())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
