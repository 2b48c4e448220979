// src/source/postgres.rs

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, postgres::PgPoolOptions, types::Json};

use crate::{
    error::AppError,
    models::{
        attempt::{AttemptRecord, AttemptSummary},
        question::{QuestionContent, QuestionOption, QuestionRecord},
    },
    source::RecordSource,
};

const CONNECT_RETRIES: u32 = 5;

/// Record source backed by the `attempts` and `questions` tables.
#[derive(Clone)]
pub struct PgRecordSource {
    pool: PgPool,
}

/// Helper struct for reading `attempts` rows.
#[derive(sqlx::FromRow)]
struct AttemptRow {
    id: i64,
    attempt_id: Option<String>,
    candidate_id: String,
    status: Option<String>,
    exam_started_at: Option<DateTime<Utc>>,
    submitted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    duration_seconds: Option<i64>,
    time_taken_seconds: Option<i64>,
    summary: Option<Json<AttemptSummary>>,
}

impl From<AttemptRow> for AttemptRecord {
    fn from(row: AttemptRow) -> Self {
        Self {
            id: row.id,
            attempt_id: row.attempt_id,
            candidate_id: row.candidate_id,
            status: row.status,
            exam_started_at: row.exam_started_at,
            submitted_at: row.submitted_at,
            created_at: row.created_at,
            duration_seconds: row.duration_seconds,
            time_taken_seconds: row.time_taken_seconds,
            summary: row.summary.map(|s| s.0).unwrap_or_default(),
        }
    }
}

/// Helper struct for reading `questions` rows.
#[derive(sqlx::FromRow)]
struct QuestionRow {
    id: i64,
    external_id: String,
    question: String,
    image: Option<String>,
    options: Json<Vec<QuestionOption>>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<QuestionRow> for QuestionRecord {
    fn from(row: QuestionRow) -> Self {
        Self {
            internal_id: row.id.to_string(),
            external_id: row.external_id,
            text: row.question,
            image: row.image,
            options: row.options.0,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl PgRecordSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Connects, retrying while the database is still coming up.
    pub async fn connect(database_url: &str, acquire_timeout: Duration) -> Result<Self, AppError> {
        let mut retry_count = 0;
        let pool = loop {
            match PgPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(acquire_timeout)
                .connect(database_url)
                .await
            {
                Ok(pool) => break pool,
                Err(e) => {
                    retry_count += 1;
                    if retry_count > CONNECT_RETRIES {
                        return Err(AppError::SourceUnavailable(format!(
                            "failed to connect after {} retries: {}",
                            CONNECT_RETRIES, e
                        )));
                    }
                    tracing::warn!(
                        "Database not ready, retrying in 2s... (Attempt {})",
                        retry_count
                    );
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
        };

        tracing::info!("Database connected...");
        Ok(Self { pool })
    }
}

/// Storage keys are integers here; anything else cannot match.
fn parse_internal_id(internal_id: &str) -> Option<i64> {
    internal_id.trim().parse().ok()
}

fn blank_to_none(filter: Option<&str>) -> Option<&str> {
    filter.map(str::trim).filter(|f| !f.is_empty())
}

#[async_trait]
impl RecordSource for PgRecordSource {
    async fn find_attempts(&self, filter: Option<&str>) -> Result<Vec<AttemptRecord>, AppError> {
        let rows = sqlx::query_as::<_, AttemptRow>(
            r#"
            SELECT
                id, attempt_id, candidate_id, status, exam_started_at, submitted_at,
                created_at, duration_seconds, time_taken_seconds, summary
            FROM attempts
            WHERE ($1::TEXT IS NULL OR strpos(lower(candidate_id), lower($1)) > 0)
            "#,
        )
        .bind(blank_to_none(filter))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch attempts: {:?}", e);
            AppError::from(e)
        })?;

        Ok(rows.into_iter().map(AttemptRecord::from).collect())
    }

    /// Groups server-side: `DISTINCT ON` keeps the first row per candidate
    /// under the explicit newest-first ordering.
    async fn latest_attempts(&self, filter: Option<&str>) -> Result<Vec<AttemptRecord>, AppError> {
        let rows = sqlx::query_as::<_, AttemptRow>(
            r#"
            SELECT DISTINCT ON (candidate_id)
                id, attempt_id, candidate_id, status, exam_started_at, submitted_at,
                created_at, duration_seconds, time_taken_seconds, summary
            FROM attempts
            WHERE ($1::TEXT IS NULL OR strpos(lower(candidate_id), lower($1)) > 0)
            ORDER BY
                candidate_id,
                COALESCE(submitted_at, created_at) DESC,
                created_at DESC,
                id DESC
            "#,
        )
        .bind(blank_to_none(filter))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to group latest attempts: {:?}", e);
            AppError::from(e)
        })?;

        Ok(rows.into_iter().map(AttemptRecord::from).collect())
    }

    async fn list_active_questions(&self) -> Result<Vec<QuestionRecord>, AppError> {
        let rows = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT id, external_id, question, image, options, is_active, created_at, updated_at
            FROM questions
            WHERE is_active
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list questions: {:?}", e);
            AppError::from(e)
        })?;

        Ok(rows.into_iter().map(QuestionRecord::from).collect())
    }

    async fn count_active_questions(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE is_active")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn find_active_question(
        &self,
        internal_id: &str,
    ) -> Result<Option<QuestionRecord>, AppError> {
        let Some(id) = parse_internal_id(internal_id) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT id, external_id, question, image, options, is_active, created_at, updated_at
            FROM questions
            WHERE id = $1 AND is_active
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(QuestionRecord::from))
    }

    async fn find_active_question_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<QuestionRecord>, AppError> {
        let row = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT id, external_id, question, image, options, is_active, created_at, updated_at
            FROM questions
            WHERE external_id = $1 AND is_active
            "#,
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(QuestionRecord::from))
    }

    async fn insert_question(&self, content: QuestionContent) -> Result<QuestionRecord, AppError> {
        let row = sqlx::query_as::<_, QuestionRow>(
            r#"
            INSERT INTO questions (external_id, question, image, options)
            VALUES ($1, $2, $3, $4)
            RETURNING id, external_id, question, image, options, is_active, created_at, updated_at
            "#,
        )
        .bind(&content.external_id)
        .bind(&content.text)
        .bind(&content.image)
        .bind(Json(&content.options))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create question: {:?}", e);
            AppError::from(e)
        })?;

        Ok(row.into())
    }

    async fn update_question(
        &self,
        internal_id: &str,
        content: QuestionContent,
    ) -> Result<Option<QuestionRecord>, AppError> {
        let Some(id) = parse_internal_id(internal_id) else {
            return Ok(None);
        };

        // external_id is deliberately absent from the SET list
        let row = sqlx::query_as::<_, QuestionRow>(
            r#"
            UPDATE questions
            SET question = $1, image = $2, options = $3, updated_at = NOW()
            WHERE id = $4 AND is_active
            RETURNING id, external_id, question, image, options, is_active, created_at, updated_at
            "#,
        )
        .bind(&content.text)
        .bind(&content.image)
        .bind(Json(&content.options))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update question: {:?}", e);
            AppError::from(e)
        })?;

        Ok(row.map(QuestionRecord::from))
    }

    async fn soft_delete_question(&self, internal_id: &str) -> Result<bool, AppError> {
        let Some(id) = parse_internal_id(internal_id) else {
            return Ok(false);
        };

        let result = sqlx::query(
            "UPDATE questions SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND is_active",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete question: {:?}", e);
            AppError::from(e)
        })?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_numeric_keys_never_match() {
        assert_eq!(parse_internal_id("42"), Some(42));
        assert_eq!(parse_internal_id(" 7 "), Some(7));
        assert_eq!(parse_internal_id("q-1700000000000-a1b2c3"), None);
    }

    #[test]
    fn blank_filter_selects_everything() {
        assert_eq!(blank_to_none(None), None);
        assert_eq!(blank_to_none(Some("   ")), None);
        assert_eq!(blank_to_none(Some(" r1 ")), Some("r1"));
    }
}
