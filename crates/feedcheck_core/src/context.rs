//! Run-level options handed to the validation engine.

use crate::{FeedMetadata, ValidationKind};
use std::collections::HashMap;

/// Options for one validation run.
///
/// # Example
///
/// ```rust
/// use feedcheck_core::{ValidationContext, ValidationKind};
///
/// let context = ValidationContext::new()
///     .with_feeds(["orders.csv"])
///     .with_expected_count("warehouse.orders", 1_000)
///     .with_checks([ValidationKind::CountCheck]);
///
/// assert_eq!(context.expected_count("warehouse.orders"), Some(1_000));
/// assert_eq!(context.selected_kinds(), vec![ValidationKind::CountCheck]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    /// Feed filter; `None` validates every feed
    pub feeds: Option<Vec<String>>,

    /// Expected row counts keyed by `"<store>.<table>"`
    pub expected_counts: HashMap<String, u64>,

    /// Kinds to run; `None` runs all of them
    pub checks: Option<Vec<ValidationKind>>,
}

impl ValidationContext {
    /// Creates a context that runs every check over every feed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the run to the named feeds.
    pub fn with_feeds<I, S>(mut self, feeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.feeds = Some(feeds.into_iter().map(Into::into).collect());
        self
    }

    /// Adds an expected row count for `"<store>.<table>"`.
    pub fn with_expected_count(mut self, table_key: impl Into<String>, count: u64) -> Self {
        self.expected_counts.insert(table_key.into(), count);
        self
    }

    /// Replaces the expected row counts.
    pub fn with_expected_counts(mut self, counts: HashMap<String, u64>) -> Self {
        self.expected_counts = counts;
        self
    }

    /// Restricts the run to the given kinds.
    pub fn with_checks(mut self, checks: impl IntoIterator<Item = ValidationKind>) -> Self {
        self.checks = Some(checks.into_iter().collect());
        self
    }

    /// Selected kinds in canonical order, without duplicates.
    pub fn selected_kinds(&self) -> Vec<ValidationKind> {
        match &self.checks {
            Some(checks) => ValidationKind::ALL
                .into_iter()
                .filter(|kind| checks.contains(kind))
                .collect(),
            None => ValidationKind::ALL.to_vec(),
        }
    }

    /// Expected row count for a table key, if one was supplied.
    pub fn expected_count(&self, table_key: &str) -> Option<u64> {
        self.expected_counts.get(table_key).copied()
    }

    /// Applies the feed filter.
    ///
    /// An absent or empty filter keeps every record.
    pub fn filter_feeds<'a>(&self, metadata: &'a [FeedMetadata]) -> Vec<&'a FeedMetadata> {
        match &self.feeds {
            Some(names) if !names.is_empty() => metadata
                .iter()
                .filter(|meta| meta.matches_feed(names))
                .collect(),
            _ => metadata.iter().collect(),
        }
    }
}
