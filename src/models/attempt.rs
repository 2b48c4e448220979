// src/models/attempt.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Score breakdown stored with an attempt.
/// Any field absent, null or non-numeric in storage reads as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AttemptSummary {
    #[serde(deserialize_with = "count_or_zero")]
    pub total_questions: i64,
    #[serde(deserialize_with = "count_or_zero")]
    pub answered: i64,
    #[serde(deserialize_with = "count_or_zero")]
    pub unanswered: i64,
    #[serde(deserialize_with = "count_or_zero")]
    pub correct: i64,
    #[serde(deserialize_with = "count_or_zero")]
    pub wrong: i64,
    #[serde(deserialize_with = "count_or_zero")]
    pub score: i64,
}

fn count_or_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

/// One exam submission event. Owned by the record store; never mutated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    /// Storage-assigned key.
    pub id: i64,
    pub attempt_id: Option<String>,
    /// Roll number of the candidate; groups retries together.
    pub candidate_id: String,
    pub status: Option<String>,
    pub exam_started_at: Option<DateTime<Utc>>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub duration_seconds: Option<i64>,
    pub time_taken_seconds: Option<i64>,
    #[serde(default)]
    pub summary: AttemptSummary,
}

impl AttemptRecord {
    /// Submission time, falling back to creation time.
    pub fn effective_submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at.unwrap_or(self.created_at)
    }

    /// Time taken as shown to people: missing reads as 0.
    pub fn display_time_taken(&self) -> i64 {
        self.time_taken_seconds.unwrap_or(0)
    }
}

/// A row of the results table: the latest attempt of one candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub candidate_id: String,
    pub status: String,
    pub submitted_at: DateTime<Utc>,
    pub time_taken_seconds: i64,
    pub total_questions: i64,
    pub answered: i64,
    pub unanswered: i64,
    pub correct: i64,
    pub wrong: i64,
    pub score: i64,
}

impl From<&AttemptRecord> for ResultSummary {
    fn from(record: &AttemptRecord) -> Self {
        let summary = record.summary;
        Self {
            candidate_id: display_or_dash(&record.candidate_id),
            status: record
                .status
                .as_deref()
                .map(display_or_dash)
                .unwrap_or_else(|| "-".to_string()),
            submitted_at: record.effective_submitted_at(),
            time_taken_seconds: record.display_time_taken(),
            total_questions: summary.total_questions,
            answered: summary.answered,
            unanswered: summary.unanswered,
            correct: summary.correct,
            wrong: summary.wrong,
            score: summary.score,
        }
    }
}

/// One line of the leaderboard. Derived on every computation, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub candidate_id: String,
    pub score: i64,
    pub time_taken_seconds: i64,
    pub reason: String,
}

/// What the dashboard serves for one search key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardPayload {
    pub results: Vec<ResultSummary>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// Query string of the dashboard endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

pub(crate) fn display_or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}
