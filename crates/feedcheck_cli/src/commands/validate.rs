use anyhow::{Context, Result};
use feedcheck_core::{ValidationContext, ValidationKind};
use feedcheck_parser::parse_file;
use feedcheck_store::{DataFusionStore, StoreConfig};
use feedcheck_validator::DataValidator;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use crate::output::{self, OutputFormat};

pub fn execute(
    metadata_path: &str,
    stores_path: &str,
    feeds: Vec<String>,
    checks: Vec<ValidationKind>,
    expected_counts: HashMap<String, u64>,
    format: OutputFormat,
) -> Result<()> {
    info!("Validating metadata: {}", metadata_path);
    info!("Store configuration: {}", stores_path);

    let parsed = parse_file(Path::new(metadata_path))
        .with_context(|| format!("Failed to parse metadata file: {}", metadata_path))?;
    for skipped in &parsed.skipped {
        output::print_warning(&format!("Skipped metadata row: {}", skipped));
    }

    let config = StoreConfig::from_file(stores_path)
        .with_context(|| format!("Failed to load store configuration: {}", stores_path))?;
    let store = DataFusionStore::new(config).context("Failed to initialize data stores")?;

    if format == OutputFormat::Text {
        output::print_info(&format!(
            "Metadata loaded: {} column record(s) across {} feed(s)",
            parsed.metadata.feeds.len(),
            parsed.metadata.unique_feeds().len()
        ));
    }

    let mut context = ValidationContext::new().with_expected_counts(expected_counts);
    if !feeds.is_empty() {
        context = context.with_feeds(feeds);
    }
    if !checks.is_empty() {
        context = context.with_checks(checks);
    }

    let validator = DataValidator::new(&store);
    let report = validator.validate(&parsed.metadata, &context);

    output::print_validation_report(&report, format)?;

    if !report.is_clean() {
        std::process::exit(1);
    }

    Ok(())
}
