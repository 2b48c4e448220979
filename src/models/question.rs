// src/models/question.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Upper bound for an inline image, matching the 12 MB request body limit.
pub const MAX_IMAGE_LEN: u64 = 12 * 1024 * 1024;
pub const MAX_QUESTION_LEN: u64 = 2000;

/// One answer choice. Ids are `{externalId}-opt-{n}`, n counting from 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOption {
    pub id: String,
    pub text: String,
    pub is_correct: bool,
}

/// Represents the 'questions' collection in the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    /// Storage-assigned key.
    #[serde(rename = "_id")]
    pub internal_id: String,

    /// Business key. Assigned once at creation and carried through every update.
    #[serde(rename = "id")]
    pub external_id: String,

    #[serde(rename = "question")]
    pub text: String,

    pub image: Option<String>,

    pub options: Vec<QuestionOption>,

    /// `false` once soft-deleted. Inactive records are never shown or numbered.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuestionRecord {
    /// Position of the correct option, 0 when none is flagged.
    pub fn correct_option_index(&self) -> usize {
        self.options
            .iter()
            .position(|option| option.is_correct)
            .unwrap_or(0)
    }
}

/// Validated content ready to be written: what create and update hand to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionContent {
    pub external_id: String,
    pub text: String,
    pub image: Option<String>,
    pub options: Vec<QuestionOption>,
}

/// A question as listed: numbered by its position among active questions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberedQuestion {
    #[serde(rename = "_id")]
    pub internal_id: String,
    pub question_number: usize,
    #[serde(rename = "id")]
    pub external_id: String,
    pub question: String,
    pub image: Option<String>,
    pub options: Vec<QuestionOption>,
    pub correct_option_index: usize,
}

/// An option as the admin UI sends it: a bare string or an object with `text`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionInput {
    Text(String),
    Object {
        #[serde(default)]
        text: Option<String>,
    },
    Other(serde_json::Value),
}

impl OptionInput {
    pub fn text(&self) -> &str {
        match self {
            OptionInput::Text(text) => text,
            OptionInput::Object { text: Some(text) } => text,
            OptionInput::Object { text: None } | OptionInput::Other(_) => "",
        }
    }
}

/// DTO for creating or updating a question.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    #[serde(default, deserialize_with = "lenient_string")]
    #[validate(length(max = MAX_QUESTION_LEN, message = "Question text is too long."))]
    pub question: String,

    #[serde(default, deserialize_with = "lenient_opt_string")]
    #[validate(length(max = MAX_IMAGE_LEN, message = "Image is too large."))]
    pub image: Option<String>,

    #[serde(default)]
    #[validate(
        length(max = 20, message = "At most 20 options are allowed."),
        custom(function = validate_option_lengths)
    )]
    pub options: Vec<OptionInput>,

    /// Kept loose so that `"1"` and `1` are both accepted, and anything else
    /// is reported as a validation error rather than a body rejection.
    #[serde(default)]
    pub correct_option_index: Option<serde_json::Value>,
}

/// Convenience for building drafts from plain strings.
impl QuestionDraft {
    pub fn from_texts(question: &str, options: &[&str], correct_option_index: i64) -> Self {
        Self {
            question: question.to_string(),
            image: None,
            options: options
                .iter()
                .map(|o| OptionInput::Text(o.to_string()))
                .collect(),
            correct_option_index: Some(serde_json::json!(correct_option_index)),
        }
    }
}

/// Scalars are taken as their text form (`5` becomes `"5"`), null as empty.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s)),
        serde_json::Value::Number(n) => Ok(Some(n.to_string())),
        serde_json::Value::Bool(b) => Ok(Some(b.to_string())),
        _ => Err(D::Error::custom("expected text")),
    }
}

fn validate_option_lengths(options: &[OptionInput]) -> Result<(), validator::ValidationError> {
    for opt in options {
        if opt.text().chars().count() > 500 {
            return Err(validator::ValidationError::new("option_too_long")
                .with_message("Each option must be at most 500 characters.".into()));
        }
    }
    Ok(())
}
