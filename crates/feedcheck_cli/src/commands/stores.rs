use anyhow::{Context, Result};
use feedcheck_store::{DataFusionStore, DataStore, StoreConfig};
use serde_json::json;
use tracing::info;

use crate::output::{self, OutputFormat};

pub fn execute(stores_path: &str, format: OutputFormat) -> Result<()> {
    info!("Testing stores from: {}", stores_path);

    let config = StoreConfig::from_file(stores_path)
        .with_context(|| format!("Failed to load store configuration: {}", stores_path))?;
    let store = DataFusionStore::new(config).context("Failed to initialize data stores")?;

    let results: Vec<(String, usize, bool)> = store
        .config()
        .stores
        .iter()
        .map(|definition| {
            (
                definition.name.clone(),
                definition.tables.len(),
                store.test_connection(&definition.name),
            )
        })
        .collect();
    let all_reachable = results.iter().all(|(_, _, reachable)| *reachable);

    match format {
        OutputFormat::Json => {
            let stores: Vec<_> = results
                .iter()
                .map(|(name, tables, reachable)| {
                    json!({ "store": name, "tables": tables, "reachable": reachable })
                })
                .collect();
            output::print_json(&json!({ "stores": stores }))?;
        }
        OutputFormat::Text => {
            for (name, tables, reachable) in &results {
                let message = format!("{} ({} table(s))", name, tables);
                if *reachable {
                    output::print_success(&message);
                } else {
                    output::print_failure(&format!("{} unreachable", message));
                }
            }
        }
    }

    if !all_reachable {
        std::process::exit(1);
    }

    Ok(())
}
