//! Probe statements issued against a store.
//!
//! Identifiers are always double-quoted so mixed-case column names survive.

/// Quotes an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quotes a string literal, doubling embedded single quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Renders a range bound: bare when numeric, quoted otherwise.
pub fn bound_literal(value: &str) -> String {
    let trimmed = value.trim();
    match trimmed.parse::<f64>() {
        Ok(number) if number.is_finite() => trimmed.to_string(),
        _ => quote_literal(trimmed),
    }
}

pub fn row_count(table: &str, filter: Option<&str>) -> String {
    let mut sql = format!("SELECT COUNT(*) AS row_count FROM {}", quote_ident(table));
    if let Some(filter) = filter.map(str::trim).filter(|f| !f.is_empty()) {
        sql.push_str(" WHERE ");
        sql.push_str(filter);
    }
    sql
}

pub fn null_count(table: &str, column: &str) -> String {
    format!(
        "SELECT COUNT(*) AS null_count FROM {} WHERE {} IS NULL",
        quote_ident(table),
        quote_ident(column)
    )
}

/// Total rows and distinct non-null values in one pass.
pub fn distinct_count(table: &str, column: &str) -> String {
    format!(
        "SELECT COUNT(*) AS total_count, COUNT(DISTINCT {}) AS distinct_count FROM {}",
        quote_ident(column),
        quote_ident(table)
    )
}

pub fn below_range(table: &str, column: &str, bottom: &str) -> String {
    format!(
        "SELECT COUNT(*) AS below_range FROM {} WHERE {} < {}",
        quote_ident(table),
        quote_ident(column),
        bound_literal(bottom)
    )
}

pub fn above_range(table: &str, column: &str, top: &str) -> String {
    format!(
        "SELECT COUNT(*) AS above_range FROM {} WHERE {} > {}",
        quote_ident(table),
        quote_ident(column),
        bound_literal(top)
    )
}

/// Counts non-null values outside `allowed`. Callers reject an empty set.
pub fn invalid_enumeration(table: &str, column: &str, allowed: &[String]) -> String {
    let values: Vec<String> = allowed.iter().map(|v| quote_literal(v)).collect();
    format!(
        "SELECT COUNT(*) AS invalid_count FROM {} WHERE CAST({} AS VARCHAR) NOT IN ({})",
        quote_ident(table),
        quote_ident(column),
        values.join(", ")
    )
}
