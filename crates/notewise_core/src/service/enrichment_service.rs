//! AI enrichment pipeline.
//!
//! # Responsibility
//! - Derive title/tags/summary from note content via the injected
//!   Summarization Service provider.
//! - Apply the two failure policies: creation-time enrichment is
//!   best-effort and never raises; on-demand summarize surfaces true
//!   failure and never leaves a partial write.
//!
//! # Invariants
//! - `auto_title`/`auto_tags` swallow provider errors and fall back.
//! - `summarize_note` mutates the stored note only after the provider
//!   call fully succeeded.

use crate::ai::{AiServiceError, SummaryProvider};
use crate::model::note::{
    word_count, Note, NoteId, OwnerId, DEFAULT_AI_MODEL, SUMMARY_MAX_CHARS, TITLE_MAX_CHARS,
};
use crate::repo::note_repo::NoteRepository;
use crate::service::note_service::NoteServiceError;
use log::{info, warn};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Fixed title used when title generation fails or yields nothing.
pub const FALLBACK_TITLE: &str = "Untitled Note";

/// Enrichment pipeline over an injected Summarization Service.
pub struct EnrichmentService {
    provider: Arc<dyn SummaryProvider>,
    default_model: String,
}

impl EnrichmentService {
    /// Creates a pipeline using `"standard-model"` as the default model.
    pub fn new(provider: Arc<dyn SummaryProvider>) -> Self {
        Self::with_default_model(provider, DEFAULT_AI_MODEL)
    }

    /// Creates a pipeline with an explicit default model identifier.
    pub fn with_default_model(
        provider: Arc<dyn SummaryProvider>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            default_model: default_model.into(),
        }
    }

    /// Model identifier used when the caller gives no hint.
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Derives a title from content, best-effort.
    ///
    /// Provider failures and blank results fall back to
    /// [`FALLBACK_TITLE`]; generated titles are trimmed and clamped to
    /// the title cap so creation is never blocked by enrichment output.
    pub fn auto_title(&self, content: &str) -> String {
        match self.provider.generate_title(content) {
            Ok(title) => {
                let trimmed = title.trim();
                if trimmed.is_empty() {
                    return FALLBACK_TITLE.to_string();
                }
                trimmed.chars().take(TITLE_MAX_CHARS).collect()
            }
            Err(err) => {
                warn!("event=auto_title module=enrichment status=fallback error={err}");
                FALLBACK_TITLE.to_string()
            }
        }
    }

    /// Derives tags from content, best-effort.
    ///
    /// Provider failures yield an empty list. Successful tags are
    /// trimmed; empty tags and tags over the per-tag cap are dropped,
    /// not truncated.
    pub fn auto_tags(&self, content: &str) -> Vec<String> {
        match self.provider.extract_tags(content) {
            Ok(tags) => sanitize_generated_tags(tags),
            Err(err) => {
                warn!("event=auto_tags module=enrichment status=fallback error={err}");
                Vec::new()
            }
        }
    }

    /// Summarizes one stored note on demand.
    ///
    /// Fails with `NoteNotFound` when the note is absent or not owned by
    /// `owner`, with `EmptyContent` when there is nothing to summarize,
    /// and with `Summary` when the provider fails, in which case the
    /// stored note is left untouched.
    pub fn summarize_note<R: NoteRepository>(
        &self,
        repo: &mut R,
        owner: OwnerId,
        id: NoteId,
        model_hint: Option<&str>,
    ) -> Result<Note, NoteServiceError> {
        let mut note = repo
            .get_note(owner, id)?
            .ok_or(NoteServiceError::NoteNotFound(id))?;

        if note.content.trim().is_empty() {
            return Err(NoteServiceError::EmptyContent(id));
        }

        let model = match model_hint.map(str::trim).filter(|hint| !hint.is_empty()) {
            Some(hint) => hint,
            None => self.default_model.as_str(),
        };

        let summary = self
            .provider
            .summarize(&note.content, model)
            .map_err(NoteServiceError::Summary)?;
        let summary = summary.trim().to_string();

        // A blank or over-cap result counts as a provider failure and
        // nothing is persisted.
        if summary.is_empty() {
            return Err(NoteServiceError::Summary(AiServiceError::new(
                "provider returned an empty summary",
            )));
        }
        if summary.chars().count() > SUMMARY_MAX_CHARS {
            return Err(NoteServiceError::Summary(AiServiceError::new(format!(
                "provider summary exceeds {SUMMARY_MAX_CHARS} characters"
            ))));
        }

        note.summary_word_count = word_count(&summary);
        note.summary = Some(summary);
        note.last_summarized = Some(now_epoch_ms());
        note.ai_model = model.to_string();
        repo.update_note(&note)?;

        info!(
            "event=summarize module=enrichment status=ok note={} model={model} summary_words={}",
            note.uuid, note.summary_word_count
        );

        repo.get_note(owner, id)?
            .ok_or(NoteServiceError::InconsistentState(
                "summarized note not found in read-back",
            ))
    }
}

/// Trims generated tags and drops empties and over-cap values.
pub fn sanitize_generated_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| {
            !tag.is_empty() && tag.chars().count() <= crate::model::note::TAG_MAX_CHARS
        })
        .collect()
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
