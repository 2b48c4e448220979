// src/source/mod.rs

//! The durable record store, seen through the queries the core issues.
//!
//! Attempts are read-only from here. Questions are written only through the
//! catalog, which validates before calling any mutation on this trait.

use async_trait::async_trait;

use crate::{
    engine::dedup,
    error::AppError,
    models::{
        attempt::AttemptRecord,
        question::{QuestionContent, QuestionRecord},
    },
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryRecordSource;
pub use postgres::PgRecordSource;

#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Every attempt whose candidate id contains `filter`, ignoring case.
    /// `None` selects all attempts.
    async fn find_attempts(&self, filter: Option<&str>) -> Result<Vec<AttemptRecord>, AppError>;

    /// One attempt per candidate: the one with the greatest effective
    /// submission time. Output order is unspecified.
    ///
    /// Stores that can group server-side should override this.
    async fn latest_attempts(&self, filter: Option<&str>) -> Result<Vec<AttemptRecord>, AppError> {
        let records = self.find_attempts(filter).await?;
        Ok(dedup::group_latest(records))
    }

    /// Active questions ordered by creation time, oldest first.
    async fn list_active_questions(&self) -> Result<Vec<QuestionRecord>, AppError>;

    async fn count_active_questions(&self) -> Result<i64, AppError>;

    /// Looks up an active question by its storage-assigned key.
    async fn find_active_question(
        &self,
        internal_id: &str,
    ) -> Result<Option<QuestionRecord>, AppError>;

    /// Looks up an active question by its business key.
    async fn find_active_question_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<QuestionRecord>, AppError>;

    async fn insert_question(&self, content: QuestionContent) -> Result<QuestionRecord, AppError>;

    /// Replaces text, image and options of an active question.
    /// `None` when no active question has that key.
    async fn update_question(
        &self,
        internal_id: &str,
        content: QuestionContent,
    ) -> Result<Option<QuestionRecord>, AppError>;

    /// Marks an active question inactive. `false` when there was none to mark.
    async fn soft_delete_question(&self, internal_id: &str) -> Result<bool, AppError>;
}
