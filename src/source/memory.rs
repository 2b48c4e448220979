// src/source/memory.rs

use std::sync::{
    Arc, PoisonError, RwLock,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;

use crate::{
    engine::dedup,
    error::AppError,
    models::{
        attempt::AttemptRecord,
        question::{QuestionContent, QuestionRecord},
    },
    source::RecordSource,
    utils::clock::{Clock, SystemClock},
};

#[derive(Default)]
struct Tables {
    attempts: Vec<AttemptRecord>,
    /// Kept in insertion order, which is also storage key order.
    questions: Vec<QuestionRecord>,
    next_question_id: u64,
}

/// Record source held entirely in process memory.
///
/// Backs the integration tests and local runs without a database. Can be
/// switched into an "unreachable" mode to exercise the retryable error path.
#[derive(Clone)]
pub struct MemoryRecordSource {
    tables: Arc<RwLock<Tables>>,
    clock: Arc<dyn Clock>,
    unavailable: Arc<AtomicBool>,
}

impl Default for MemoryRecordSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRecordSource {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            clock,
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Stores an attempt as the exam app would.
    pub fn add_attempt(&self, record: AttemptRecord) {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        tables.attempts.push(record);
    }

    /// Every question ever stored, inactive ones included.
    pub fn all_questions(&self) -> Vec<QuestionRecord> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        tables.questions.clone()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::SourceUnavailable(
                "in-memory source switched off".to_string(),
            ));
        }
        Ok(())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>, AppError> {
        self.check_available()?;
        Ok(self.tables.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>, AppError> {
        self.check_available()?;
        Ok(self.tables.write().unwrap_or_else(PoisonError::into_inner))
    }
}

#[async_trait]
impl RecordSource for MemoryRecordSource {
    async fn find_attempts(&self, filter: Option<&str>) -> Result<Vec<AttemptRecord>, AppError> {
        let tables = self.read()?;
        Ok(tables
            .attempts
            .iter()
            .filter(|record| dedup::matches_candidate(&record.candidate_id, filter))
            .cloned()
            .collect())
    }

    async fn list_active_questions(&self) -> Result<Vec<QuestionRecord>, AppError> {
        let tables = self.read()?;
        let mut active: Vec<QuestionRecord> = tables
            .questions
            .iter()
            .filter(|q| q.is_active)
            .cloned()
            .collect();
        // stable: equal timestamps keep storage key order
        active.sort_by_key(|q| q.created_at);
        Ok(active)
    }

    async fn count_active_questions(&self) -> Result<i64, AppError> {
        let tables = self.read()?;
        Ok(tables.questions.iter().filter(|q| q.is_active).count() as i64)
    }

    async fn find_active_question(
        &self,
        internal_id: &str,
    ) -> Result<Option<QuestionRecord>, AppError> {
        let tables = self.read()?;
        Ok(tables
            .questions
            .iter()
            .find(|q| q.is_active && q.internal_id == internal_id)
            .cloned())
    }

    async fn find_active_question_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<QuestionRecord>, AppError> {
        let tables = self.read()?;
        Ok(tables
            .questions
            .iter()
            .find(|q| q.is_active && q.external_id == external_id)
            .cloned())
    }

    async fn insert_question(&self, content: QuestionContent) -> Result<QuestionRecord, AppError> {
        let now = self.clock.now();
        let mut tables = self.write()?;

        if tables
            .questions
            .iter()
            .any(|q| q.external_id == content.external_id)
        {
            return Err(AppError::InternalServerError(format!(
                "duplicate question id {}",
                content.external_id
            )));
        }

        tables.next_question_id += 1;
        let record = QuestionRecord {
            internal_id: tables.next_question_id.to_string(),
            external_id: content.external_id,
            text: content.text,
            image: content.image,
            options: content.options,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        tables.questions.push(record.clone());
        Ok(record)
    }

    async fn update_question(
        &self,
        internal_id: &str,
        content: QuestionContent,
    ) -> Result<Option<QuestionRecord>, AppError> {
        let now = self.clock.now();
        let mut tables = self.write()?;

        let Some(existing) = tables
            .questions
            .iter_mut()
            .find(|q| q.is_active && q.internal_id == internal_id)
        else {
            return Ok(None);
        };

        existing.text = content.text;
        existing.image = content.image;
        existing.options = content.options;
        existing.updated_at = now;
        Ok(Some(existing.clone()))
    }

    async fn soft_delete_question(&self, internal_id: &str) -> Result<bool, AppError> {
        let now = self.clock.now();
        let mut tables = self.write()?;

        match tables
            .questions
            .iter_mut()
            .find(|q| q.is_active && q.internal_id == internal_id)
        {
            Some(existing) => {
                existing.is_active = false;
                existing.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
