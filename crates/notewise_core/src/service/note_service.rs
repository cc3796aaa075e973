//! Note store use-case service.
//!
//! # Responsibility
//! - Provide owner-scoped create/get/update/delete APIs over the
//!   repository.
//! - Fill missing title/tags at creation time via the enrichment
//!   pipeline (best-effort).
//! - Expose the on-demand summarize entry point.
//!
//! # Invariants
//! - Title/content are trimmed and validated before every persisted
//!   write; word counts are recomputed alongside.
//! - `update_note` applies only the fields present in the patch.
//! - Cross-owner access yields `NoteNotFound`, never a forbidden signal.

use crate::ai::AiServiceError;
use crate::model::note::{
    validate_content, validate_tags, validate_title, Note, NoteDraft, NoteId, NotePatch,
    NoteValidationError, OwnerId,
};
use crate::repo::note_repo::{NoteRepository, RepoError};
use crate::service::enrichment_service::EnrichmentService;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error shared by note, query and stats use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Caller input violates a field constraint; names the field.
    Validation(NoteValidationError),
    /// Target note is absent or not owned by the caller.
    NoteNotFound(NoteId),
    /// Summarize was requested for a note without content.
    EmptyContent(NoteId),
    /// Summarization Service failed; the stored note is unchanged.
    Summary(AiServiceError),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::EmptyContent(id) => write!(f, "note {id} has no content to summarize"),
            Self::Summary(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent note state: {details}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Summary(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NoteNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<NoteValidationError> for NoteServiceError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Note store facade over a repository and the enrichment pipeline.
pub struct NoteService<R: NoteRepository> {
    repo: R,
    enrichment: EnrichmentService,
}

impl<R: NoteRepository> NoteService<R> {
    pub fn new(repo: R, enrichment: EnrichmentService) -> Self {
        Self { repo, enrichment }
    }

    /// Creates one note for `owner`.
    ///
    /// A missing or blank title/tag list is filled from content by the
    /// enrichment pipeline; enrichment failure falls back silently and
    /// never blocks creation. Caller-supplied fields are validated
    /// strictly.
    pub fn create_note(
        &mut self,
        owner: OwnerId,
        draft: NoteDraft,
    ) -> Result<Note, NoteServiceError> {
        let content = draft.content.trim().to_string();
        validate_content(&content)?;

        let title = match draft
            .title
            .map(|title| title.trim().to_string())
            .filter(|title| !title.is_empty())
        {
            Some(title) => {
                validate_title(&title)?;
                title
            }
            None => self.enrichment.auto_title(&content),
        };

        let tags = match draft.tags {
            Some(tags) => {
                let tags: Vec<String> =
                    tags.into_iter().map(|tag| tag.trim().to_string()).collect();
                validate_tags(&tags)?;
                tags
            }
            None => self.enrichment.auto_tags(&content),
        };

        let mut note = Note::new(owner, title, content);
        note.tags = tags;
        note.is_public = draft.is_public;
        note.refresh_word_counts();

        let id = self.repo.create_note(&note)?;
        self.repo
            .get_note(owner, id)?
            .ok_or(NoteServiceError::InconsistentState(
                "created note not found in read-back",
            ))
    }

    /// Gets one note within the owner's scope.
    pub fn get_note(&self, owner: OwnerId, id: NoteId) -> Result<Note, NoteServiceError> {
        self.repo
            .get_note(owner, id)?
            .ok_or(NoteServiceError::NoteNotFound(id))
    }

    /// Applies a partial update and returns the stored result.
    ///
    /// A patch carrying no fields is a no-op: the stored note is returned
    /// without a write, so `updated_at` stays put.
    pub fn update_note(
        &mut self,
        owner: OwnerId,
        id: NoteId,
        patch: NotePatch,
    ) -> Result<Note, NoteServiceError> {
        let mut note = self
            .repo
            .get_note(owner, id)?
            .ok_or(NoteServiceError::NoteNotFound(id))?;

        if patch.is_empty() {
            return Ok(note);
        }

        if let Some(title) = patch.title {
            let title = title.trim().to_string();
            validate_title(&title)?;
            note.title = title;
        }
        if let Some(content) = patch.content {
            let content = content.trim().to_string();
            validate_content(&content)?;
            note.content = content;
        }
        if let Some(tags) = patch.tags {
            let tags: Vec<String> = tags.into_iter().map(|tag| tag.trim().to_string()).collect();
            validate_tags(&tags)?;
            note.tags = tags;
        }
        if let Some(is_public) = patch.is_public {
            note.is_public = is_public;
        }

        note.refresh_word_counts();
        self.repo.update_note(&note)?;
        self.repo
            .get_note(owner, id)?
            .ok_or(NoteServiceError::InconsistentState(
                "updated note not found in read-back",
            ))
    }

    /// Permanently deletes one note.
    pub fn delete_note(&mut self, owner: OwnerId, id: NoteId) -> Result<(), NoteServiceError> {
        self.repo.delete_note(owner, id)?;
        Ok(())
    }

    /// Summarizes one note on demand via the enrichment pipeline.
    ///
    /// `model_hint` overrides the pipeline's default model identifier.
    pub fn summarize(
        &mut self,
        owner: OwnerId,
        id: NoteId,
        model_hint: Option<&str>,
    ) -> Result<Note, NoteServiceError> {
        self.enrichment
            .summarize_note(&mut self.repo, owner, id, model_hint)
    }
}
