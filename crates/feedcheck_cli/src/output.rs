use anyhow::Result;
use clap::ValueEnum;
use colored::*;
use feedcheck_core::{ValidationReport, ValidationStatus};
use serde_json::Value;

/// How command results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub fn print_validation_report(report: &ValidationReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&serde_json::to_value(report)?),
        OutputFormat::Text => {
            print_text_report(report);
            Ok(())
        }
    }
}

fn print_text_report(report: &ValidationReport) {
    println!("\n{}", "═".repeat(60));
    println!("{}", "  VALIDATION REPORT".bold());
    println!("{}", "═".repeat(60));

    if report.is_clean() {
        println!(
            "\n{} {}",
            "✓".green().bold(),
            "Validation PASSED".green().bold()
        );
    } else {
        println!(
            "\n{} {}",
            "✗".red().bold(),
            "Validation FAILED".red().bold()
        );
    }

    if !report.records.is_empty() {
        println!("\n{}", "Results:".bold());
        for record in &report.records {
            let mut target = format!("{}.{}", record.db_name, record.table_name);
            if let Some(column) = record.detail.column_name() {
                target.push('.');
                target.push_str(column);
            }

            let line = format!(
                "  {} {:<24} {}",
                status_label(record.status),
                record.validation_type().as_str(),
                target
            );
            match &record.error_message {
                Some(message) => println!("{}\n      {}", line, message.dimmed()),
                None => println!("{}", line),
            }
        }
    }

    if !report.summary.by_kind.is_empty() {
        println!("\n{}", "By check:".bold());
        for (kind, counts) in &report.summary.by_kind {
            println!(
                "  {:<24} {} passed, {} failed, {} errors",
                kind.as_str(),
                counts.passed,
                counts.failed,
                counts.errors
            );
        }
    }

    let overall = &report.summary.overall;
    println!("\n{}", "Summary:".bold());
    println!("  Total checks:  {}", overall.total);
    println!("  Passed:        {}", overall.passed.to_string().green());
    println!("  Failed:        {}", overall.failed.to_string().red());
    println!("  Errors:        {}", overall.errors.to_string().yellow());
    println!("  Success rate:  {:.1}%", overall.success_rate());
    println!("  Duration:      {}ms", report.duration_ms);
    println!("{}", "═".repeat(60));
}

fn status_label(status: ValidationStatus) -> ColoredString {
    match status {
        ValidationStatus::Pass => "[PASS] ".green().bold(),
        ValidationStatus::Fail => "[FAIL] ".red().bold(),
        ValidationStatus::Error => "[ERROR]".yellow().bold(),
    }
}

pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

pub fn print_failure(message: &str) {
    println!("{} {}", "✗".red().bold(), message.red());
}

pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}
