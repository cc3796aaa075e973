//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record shared by persistence and services.
//! - Provide validation and derived-field helpers (word counts, reading
//!   times).
//!
//! # Invariants
//! - `uuid` is stable and never reused for another note.
//! - `owner` is immutable after creation.
//! - `word_count`/`summary_word_count` always reflect the persisted
//!   `content`/`summary` text.
//! - Reading times are derived on read and never persisted.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a note.
pub type NoteId = Uuid;

/// Opaque reference to the owning user identity.
///
/// Identity issuance and credential checks belong to an external
/// collaborator; core only scopes queries and mutations by this value.
pub type OwnerId = Uuid;

/// Maximum title length in Unicode scalar values.
pub const TITLE_MAX_CHARS: usize = 100;
/// Maximum content length in Unicode scalar values.
pub const CONTENT_MAX_CHARS: usize = 10_000;
/// Maximum summary length in Unicode scalar values.
pub const SUMMARY_MAX_CHARS: usize = 2_000;
/// Maximum length of a single tag in Unicode scalar values.
pub const TAG_MAX_CHARS: usize = 20;

/// Average reading speed used for reading-time derivation.
const WORDS_PER_MINUTE: u32 = 200;

/// Model identifier recorded when the caller gives no explicit hint.
pub const DEFAULT_AI_MODEL: &str = "standard-model";

/// Canonical note record.
///
/// `created_at`/`updated_at` are assigned by storage on insert/update;
/// services return notes read back from storage, so callers always see
/// the persisted values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Stable note id.
    pub uuid: NoteId,
    /// Owning user identity. Never reassigned.
    pub owner: OwnerId,
    /// Required display title, trimmed, non-empty.
    pub title: String,
    /// Required note body, trimmed, non-empty.
    pub content: String,
    /// AI-generated summary. `None` until the first successful summarize.
    pub summary: Option<String>,
    /// Ordered tag list. Duplicates are allowed.
    pub tags: Vec<String>,
    /// Whether the note is shared publicly.
    pub is_public: bool,
    /// Whitespace-token count of `content`.
    pub word_count: u32,
    /// Whitespace-token count of `summary`; 0 when absent.
    pub summary_word_count: u32,
    /// Epoch milliseconds of the last successful summarize.
    pub last_summarized: Option<i64>,
    /// Identifier of the model used for the last summarize.
    pub ai_model: String,
    /// Creation timestamp in epoch milliseconds.
    pub created_at: i64,
    /// Last-write timestamp in epoch milliseconds.
    pub updated_at: i64,
}

/// Caller-supplied fields for note creation.
///
/// `title` and `tags` are optional: when omitted the enrichment pipeline
/// derives them from `content` on a best-effort basis.
#[derive(Debug, Clone, Default)]
pub struct NoteDraft {
    pub title: Option<String>,
    pub content: String,
    pub tags: Option<Vec<String>>,
    pub is_public: bool,
}

/// Partial-update shape: only provided fields are applied.
#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
}

impl NotePatch {
    /// Returns whether the patch carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.tags.is_none()
            && self.is_public.is_none()
    }
}

/// Field-level validation error. Always names the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Required field is empty after trimming.
    EmptyField { field: &'static str },
    /// Field exceeds its length cap.
    FieldTooLong {
        field: &'static str,
        max_chars: usize,
    },
}

impl NoteValidationError {
    /// Name of the field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyField { field } => field,
            Self::FieldTooLong { field, .. } => field,
        }
    }
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField { field } => write!(f, "note {field} is required"),
            Self::FieldTooLong { field, max_chars } => {
                write!(f, "note {field} cannot exceed {max_chars} characters")
            }
        }
    }
}

impl Error for NoteValidationError {}

impl Note {
    /// Creates a note with a generated stable id and derived word counts.
    ///
    /// Timestamps start at zero and are assigned by storage on insert.
    pub fn new(
        owner: OwnerId,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let content = content.into();
        let count = word_count(&content);
        Self {
            uuid: Uuid::new_v4(),
            owner,
            title: title.into(),
            content,
            summary: None,
            tags: Vec::new(),
            is_public: false,
            word_count: count,
            summary_word_count: 0,
            last_summarized: None,
            ai_model: DEFAULT_AI_MODEL.to_string(),
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Recomputes `word_count` and `summary_word_count` from current text.
    ///
    /// Write paths must call this before handing the note to storage.
    pub fn refresh_word_counts(&mut self) {
        self.word_count = word_count(&self.content);
        self.summary_word_count = self
            .summary
            .as_deref()
            .map(word_count)
            .unwrap_or(0);
    }

    /// Estimated reading time of the content, in whole minutes.
    pub fn reading_time(&self) -> u32 {
        reading_time_minutes(self.word_count)
    }

    /// Estimated reading time of the summary, in whole minutes.
    pub fn summary_reading_time(&self) -> u32 {
        reading_time_minutes(self.summary_word_count)
    }

    /// Returns whether the note carries a non-empty summary.
    pub fn has_summary(&self) -> bool {
        self.summary.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Validates all field constraints.
    ///
    /// Repository write paths call this before SQL mutations, so invalid
    /// state never reaches storage.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_title(&self.title)?;
        validate_content(&self.content)?;
        if let Some(summary) = self.summary.as_deref() {
            validate_summary(summary)?;
        }
        validate_tags(&self.tags)?;
        Ok(())
    }
}

/// Counts non-empty whitespace-delimited tokens.
pub fn word_count(text: &str) -> u32 {
    text.split_whitespace().count() as u32
}

/// `ceil(words / 200)` minutes.
pub fn reading_time_minutes(words: u32) -> u32 {
    words.div_ceil(WORDS_PER_MINUTE)
}

/// Validates a trimmed title: non-empty and within the cap.
pub fn validate_title(title: &str) -> Result<(), NoteValidationError> {
    validate_required_text(title, "title", TITLE_MAX_CHARS)
}

/// Validates trimmed content: non-empty and within the cap.
pub fn validate_content(content: &str) -> Result<(), NoteValidationError> {
    validate_required_text(content, "content", CONTENT_MAX_CHARS)
}

/// Validates a summary: within the cap. Empty summaries are allowed.
pub fn validate_summary(summary: &str) -> Result<(), NoteValidationError> {
    if summary.chars().count() > SUMMARY_MAX_CHARS {
        return Err(NoteValidationError::FieldTooLong {
            field: "summary",
            max_chars: SUMMARY_MAX_CHARS,
        });
    }
    Ok(())
}

/// Validates a tag list: every tag non-empty and within the per-tag cap.
///
/// Order and duplicates are deliberately untouched.
pub fn validate_tags(tags: &[String]) -> Result<(), NoteValidationError> {
    for tag in tags {
        if tag.trim().is_empty() {
            return Err(NoteValidationError::EmptyField { field: "tags" });
        }
        if tag.chars().count() > TAG_MAX_CHARS {
            return Err(NoteValidationError::FieldTooLong {
                field: "tags",
                max_chars: TAG_MAX_CHARS,
            });
        }
    }
    Ok(())
}

fn validate_required_text(
    value: &str,
    field: &'static str,
    max_chars: usize,
) -> Result<(), NoteValidationError> {
    if value.trim().is_empty() {
        return Err(NoteValidationError::EmptyField { field });
    }
    if value.chars().count() > max_chars {
        return Err(NoteValidationError::FieldTooLong { field, max_chars });
    }
    Ok(())
}
