// src/engine/dedup.rs

//! Latest attempt per candidate.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::{error::AppError, models::attempt::AttemptRecord, source::RecordSource};

/// Case-insensitive substring match of a candidate id against an optional
/// filter. A missing or blank filter matches everything.
pub fn matches_candidate(candidate_id: &str, filter: Option<&str>) -> bool {
    match filter.map(str::trim).filter(|f| !f.is_empty()) {
        None => true,
        Some(needle) => candidate_id
            .to_lowercase()
            .contains(&needle.to_lowercase()),
    }
}

/// Newest first: effective submission time, then creation time, then storage key.
fn newest_first(a: &AttemptRecord, b: &AttemptRecord) -> Ordering {
    b.effective_submitted_at()
        .cmp(&a.effective_submitted_at())
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| b.id.cmp(&a.id))
}

/// Keeps one record per candidate id: the first under [`newest_first`].
/// Output order is the same newest-first order.
pub fn group_latest(mut records: Vec<AttemptRecord>) -> Vec<AttemptRecord> {
    records.sort_by(newest_first);

    let mut seen = HashSet::new();
    records.retain(|record| seen.insert(record.candidate_id.clone()));
    records
}

/// Final presentation order of deduplicated records: effective submission
/// time descending, candidate id ascending among equal times.
pub fn order_by_submission_desc(records: &mut [AttemptRecord]) {
    records.sort_by(|a, b| {
        b.effective_submitted_at()
            .cmp(&a.effective_submitted_at())
            .then_with(|| a.candidate_id.cmp(&b.candidate_id))
    });
}

/// One record per candidate whose id contains `filter` (ignoring case), the
/// most recently submitted one, newest candidates first.
///
/// Grouping is delegated to the source, which may do it server-side.
pub async fn latest_per_candidate(
    source: &dyn RecordSource,
    filter: Option<&str>,
) -> Result<Vec<AttemptRecord>, AppError> {
    let filter = filter.map(str::trim).filter(|f| !f.is_empty());
    let mut records = source.latest_attempts(filter).await?;
    order_by_submission_desc(&mut records);
    Ok(records)
}
