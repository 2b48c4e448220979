// src/services/catalog.rs

//! The question bank: validated writes, soft deletes, numbering on read.

use std::sync::Arc;

use chrono::Utc;
use rand::{RngCore, rngs::OsRng};
use validator::Validate;

use crate::{
    error::AppError,
    models::question::{
        NumberedQuestion, QuestionContent, QuestionDraft, QuestionOption, QuestionRecord,
    },
    source::RecordSource,
};

/// Fresh business key: `q-{unix millis}-{6 hex chars}`.
pub fn generate_external_id() -> String {
    let mut suffix = [0u8; 3];
    OsRng.fill_bytes(&mut suffix);
    format!("q-{}-{}", Utc::now().timestamp_millis(), hex::encode(suffix))
}

pub fn option_id(external_id: &str, position: usize) -> String {
    format!("{}-opt-{}", external_id, position + 1)
}

fn parse_correct_index(raw: Option<&serde_json::Value>) -> Option<i64> {
    match raw? {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Validates a draft and turns it into storable content under `external_id`.
///
/// Blank option texts are dropped before counting, so `["a", " ", "b"]` has
/// two options and `correctOptionIndex` refers to positions after the drop.
pub fn normalize_draft(draft: &QuestionDraft, external_id: &str) -> Result<QuestionContent, AppError> {
    draft.validate()?;

    let text = draft.question.trim();
    if text.is_empty() {
        return Err(AppError::Validation("Question text is required.".to_string()));
    }

    let option_texts: Vec<&str> = draft
        .options
        .iter()
        .map(|option| option.text().trim())
        .filter(|t| !t.is_empty())
        .collect();

    if option_texts.len() < 2 {
        return Err(AppError::Validation(
            "At least two options are required.".to_string(),
        ));
    }

    let correct = parse_correct_index(draft.correct_option_index.as_ref())
        .filter(|i| *i >= 0 && (*i as usize) < option_texts.len())
        .ok_or_else(|| AppError::Validation("Select a valid correct option.".to_string()))?
        as usize;

    let options = option_texts
        .into_iter()
        .enumerate()
        .map(|(position, text)| QuestionOption {
            id: option_id(external_id, position),
            text: text.to_string(),
            is_correct: position == correct,
        })
        .collect();

    let image = draft
        .image
        .as_deref()
        .map(str::trim)
        .filter(|i| !i.is_empty())
        .map(str::to_string);

    Ok(QuestionContent {
        external_id: external_id.to_string(),
        text: text.to_string(),
        image,
        options,
    })
}

/// Numbers active questions 1..N in the order given (creation order).
pub fn number_questions(questions: Vec<QuestionRecord>) -> Vec<NumberedQuestion> {
    questions
        .into_iter()
        .filter(|q| q.is_active)
        .enumerate()
        .map(|(index, q)| NumberedQuestion {
            correct_option_index: q.correct_option_index(),
            internal_id: q.internal_id,
            question_number: index + 1,
            external_id: q.external_id,
            question: q.text,
            image: q.image,
            options: q.options,
        })
        .collect()
}

/// Question CRUD with the edit lock in front of every mutation.
#[derive(Clone)]
pub struct QuestionCatalog {
    source: Arc<dyn RecordSource>,
    edit_lock: bool,
}

impl QuestionCatalog {
    pub fn new(source: Arc<dyn RecordSource>, edit_lock: bool) -> Self {
        Self { source, edit_lock }
    }

    pub fn edit_locked(&self) -> bool {
        self.edit_lock
    }

    /// Fails with `Locked` while the edit lock is on, whatever the request carries.
    pub fn ensure_unlocked(&self) -> Result<(), AppError> {
        if self.edit_lock {
            return Err(AppError::Locked);
        }
        Ok(())
    }

    /// Storage key first, business key second.
    async fn resolve(&self, id: &str) -> Result<Option<QuestionRecord>, AppError> {
        let id = id.trim();
        if id.is_empty() {
            return Ok(None);
        }
        if let Some(found) = self.source.find_active_question(id).await? {
            return Ok(Some(found));
        }
        self.source.find_active_question_by_external_id(id).await
    }

    pub async fn list(&self) -> Result<Vec<NumberedQuestion>, AppError> {
        let active = self.source.list_active_questions().await?;
        Ok(number_questions(active))
    }

    pub async fn active_count(&self) -> Result<i64, AppError> {
        self.source.count_active_questions().await
    }

    pub async fn create(&self, draft: &QuestionDraft) -> Result<QuestionRecord, AppError> {
        self.ensure_unlocked()?;
        let content = normalize_draft(draft, &generate_external_id())?;

        let created = self.source.insert_question(content).await?;
        tracing::info!(
            internal_id = %created.internal_id,
            external_id = %created.external_id,
            "Question created"
        );
        Ok(created)
    }

    pub async fn update(&self, id: &str, draft: &QuestionDraft) -> Result<QuestionRecord, AppError> {
        self.ensure_unlocked()?;

        let existing = self
            .resolve(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Question not found.".to_string()))?;

        // The business key is carried forward so option ids stay stable.
        let content = normalize_draft(draft, &existing.external_id)?;

        let updated = self
            .source
            .update_question(&existing.internal_id, content)
            .await?
            .ok_or_else(|| AppError::NotFound("Question not found.".to_string()))?;

        tracing::info!(internal_id = %updated.internal_id, "Question updated");
        Ok(updated)
    }

    /// Marks the question inactive and returns its storage key.
    pub async fn soft_delete(&self, id: &str) -> Result<String, AppError> {
        self.ensure_unlocked()?;

        let existing = self
            .resolve(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Question not found.".to_string()))?;

        if !self.source.soft_delete_question(&existing.internal_id).await? {
            return Err(AppError::NotFound("Question not found.".to_string()));
        }

        tracing::info!(internal_id = %existing.internal_id, "Question soft-deleted");
        Ok(existing.internal_id)
    }
}
