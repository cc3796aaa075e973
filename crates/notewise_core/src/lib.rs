//! Core domain logic for notewise: owner-scoped notes with AI-derived
//! titles, tags and summaries.
//! This crate is the single source of truth for business invariants.

pub mod ai;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use ai::{AiResult, AiServiceError, SummaryProvider};
pub use logging::{default_log_level, init_logging};
pub use model::note::{Note, NoteDraft, NoteId, NotePatch, NoteValidationError, OwnerId};
pub use repo::note_repo::{
    NoteListQuery, NoteRepository, OwnerStats, RepoError, RepoResult, SortField, SortOrder,
    SqliteNoteRepository, TagCount,
};
pub use service::enrichment_service::{EnrichmentService, FALLBACK_TITLE};
pub use service::note_service::{NoteService, NoteServiceError};
pub use service::query_service::{ListRequest, NotePage, QueryService};
pub use service::stats_service::StatsService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
