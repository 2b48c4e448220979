// src/engine/rank.rs

//! Leaderboard ordering and dense ranking.

use std::cmp::Ordering;

use crate::models::attempt::{AttemptRecord, LeaderboardEntry, display_or_dash};

/// Time key used for ordering. A missing or zero time sorts after every real time.
fn ordering_time(record: &AttemptRecord) -> i64 {
    match record.time_taken_seconds {
        Some(t) if t != 0 => t,
        _ => i64::MAX,
    }
}

/// Leaderboard order: higher score, then faster time, then earlier
/// submission, then candidate id.
pub fn leaderboard_order(a: &AttemptRecord, b: &AttemptRecord) -> Ordering {
    b.summary
        .score
        .cmp(&a.summary.score)
        .then_with(|| ordering_time(a).cmp(&ordering_time(b)))
        .then_with(|| {
            a.effective_submitted_at()
                .cmp(&b.effective_submitted_at())
        })
        .then_with(|| a.candidate_id.cmp(&b.candidate_id))
}

pub fn reason(score: i64, time_taken_seconds: i64) -> String {
    format!("Score {}, Time {}s", score, time_taken_seconds)
}

/// Builds the leaderboard from deduplicated records.
///
/// Ranks are dense: an entry shares the previous entry's rank exactly when
/// its score and displayed time (missing read as 0) are both equal to it, and
/// is one higher otherwise. Ties are decided on the displayed values, so a
/// missing time and an explicit 0 tie with each other even though both sort last.
pub fn rank(records: &[AttemptRecord]) -> Vec<LeaderboardEntry> {
    let mut sorted: Vec<&AttemptRecord> = records.iter().collect();
    sorted.sort_by(|a, b| leaderboard_order(a, b));

    let mut entries: Vec<LeaderboardEntry> = Vec::with_capacity(sorted.len());
    for record in sorted {
        let score = record.summary.score;
        let time_taken_seconds = record.display_time_taken();

        let rank = match entries.last() {
            None => 1,
            Some(prev) if prev.score == score && prev.time_taken_seconds == time_taken_seconds => {
                prev.rank
            }
            Some(prev) => prev.rank + 1,
        };

        entries.push(LeaderboardEntry {
            rank,
            candidate_id: display_or_dash(&record.candidate_id),
            score,
            time_taken_seconds,
            reason: reason(score, time_taken_seconds),
        });
    }
    entries
}
