mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use feedcheck_core::ValidationKind;
use output::OutputFormat;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "feedcheck")]
#[command(version, about = "Metadata-driven feed validation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate landed tables against feed metadata
    Validate {
        /// Path to the metadata document (YAML, TOML or JSON)
        metadata: String,

        /// Path to the store configuration (TOML or YAML)
        #[arg(short, long, env = "FEEDCHECK_STORES")]
        stores: String,

        /// Only validate these feeds (comma-separated)
        #[arg(long, value_delimiter = ',')]
        feeds: Vec<String>,

        /// Only run these checks (comma-separated, e.g. unique_constraint,count_check)
        #[arg(short, long, value_delimiter = ',')]
        checks: Vec<ValidationKind>,

        /// Expected row count for a table, as store.table=N (repeatable)
        #[arg(short, long, value_parser = parse_expected)]
        expected: Vec<(String, u64)>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Parse and summarize metadata without touching any store
    Check {
        /// Path to the metadata document (YAML, TOML or JSON)
        metadata: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Test connectivity of every configured store
    Stores {
        /// Path to the store configuration (TOML or YAML)
        #[arg(short, long, env = "FEEDCHECK_STORES")]
        stores: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG takes precedence over --verbose
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = std::env::var_os("RUST_LOG").map(|_| EnvFilter::from_default_env());
    let level_filter = env_filter
        .is_none()
        .then(|| LevelFilter::from_level(log_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .with(level_filter)
        .with(env_filter)
        .init();

    // Execute command
    match cli.command {
        Commands::Validate {
            metadata,
            stores,
            feeds,
            checks,
            expected,
            format,
        } => commands::validate::execute(
            &metadata,
            &stores,
            feeds,
            checks,
            expected.into_iter().collect(),
            format,
        ),

        Commands::Check { metadata, format } => commands::check::execute(&metadata, format),

        Commands::Stores { stores, format } => commands::stores::execute(&stores, format),
    }
}

/// Parses `store.table=N`.
fn parse_expected(raw: &str) -> std::result::Result<(String, u64), String> {
    let (key, count) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected store.table=N, got '{raw}'"))?;

    let key = key.trim();
    if !key.contains('.') {
        return Err(format!("table key must be store.table, got '{key}'"));
    }

    let count = count
        .trim()
        .parse::<u64>()
        .map_err(|e| format!("invalid row count '{}': {}", count.trim(), e))?;

    Ok((key.to_string(), count))
}
