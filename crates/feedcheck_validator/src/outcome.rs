//! Folding a single check into exactly one record.

use crate::Result;
use feedcheck_core::{CheckDetail, FeedMetadata, ValidationRecord};
use tracing::{debug, error, warn};

/// Runs `check` for one unit and folds its outcome into a record.
///
/// The check fills in `detail` as it measures and returns the rule violations
/// it found. No violations is PASS, any violation is FAIL (messages joined by
/// `"; "`), and an `Err` is ERROR. Whatever the check measured before failing
/// stays in the record.
pub(crate) fn evaluate<D>(
    subject: &FeedMetadata,
    activity: &str,
    mut detail: D,
    wrap: impl FnOnce(D) -> CheckDetail,
    check: impl FnOnce(&mut D) -> Result<Vec<String>>,
) -> ValidationRecord {
    let outcome = check(&mut detail);
    let record = ValidationRecord::pass(
        &subject.feed,
        &subject.db_name,
        &subject.table_name,
        wrap(detail),
    );

    let label = match record.detail.column_name() {
        Some(column) => format!("{}.{}", subject.table_key(), column),
        None => subject.table_key(),
    };

    match outcome {
        Ok(failures) if failures.is_empty() => {
            debug!("{} passed for {}", record.validation_type(), label);
            record
        }
        Ok(failures) => {
            let message = failures.join("; ");
            warn!("{} failed for {}: {}", record.validation_type(), label, message);
            record.with_failure(message)
        }
        Err(err) => {
            let message = err.record_message(activity);
            error!("{} errored for {}: {}", record.validation_type(), label, message);
            record.with_error(message)
        }
    }
}
