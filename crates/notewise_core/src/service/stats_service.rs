//! Per-owner statistics aggregation.
//!
//! # Responsibility
//! - Expose aggregate counters and top-tag frequency for one owner.
//!
//! # Invariants
//! - Read-only; recomputed on every call, no caching layer.
//! - `notes_with_summary` counts non-empty summaries only.

use crate::model::note::OwnerId;
use crate::repo::note_repo::{NoteRepository, OwnerStats, TagCount};
use crate::service::note_service::NoteServiceError;

/// Default number of top tags returned.
pub const TOP_TAGS_DEFAULT_LIMIT: u32 = 10;

/// Statistics facade over repository aggregation queries.
pub struct StatsService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> StatsService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Aggregate counters over the owner's notes, in a single pass.
    ///
    /// An owner without notes yields all-zero counters, not an error.
    pub fn stats(&self, owner: OwnerId) -> Result<OwnerStats, NoteServiceError> {
        let stats = self.repo.owner_stats(owner)?;
        Ok(stats)
    }

    /// The owner's most used tags, descending by count.
    ///
    /// Tie order among equal counts is unspecified.
    pub fn top_tags(
        &self,
        owner: OwnerId,
        limit: Option<u32>,
    ) -> Result<Vec<TagCount>, NoteServiceError> {
        let limit = limit.unwrap_or(TOP_TAGS_DEFAULT_LIMIT);
        let counts = self.repo.top_tags(owner, limit)?;
        Ok(counts)
    }
}
