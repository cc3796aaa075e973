//! Filtered/paginated note listing.
//!
//! # Responsibility
//! - Normalize caller list requests (page, limit, tag filter string)
//!   into repository queries.
//! - Assemble the page envelope with totals.
//!
//! # Invariants
//! - `page` is 1-indexed; values below 1 clamp to 1.
//! - `limit` defaults to 10 and clamps to 100.
//! - A page beyond range yields an empty item list with correct totals,
//!   never an error.

use crate::model::note::{Note, OwnerId};
use crate::repo::note_repo::{
    NoteListQuery, NoteRepository, SortField, SortOrder, PAGE_SIZE_DEFAULT, PAGE_SIZE_MAX,
};
use crate::service::note_service::NoteServiceError;

/// Caller-facing list request. Unset options fall back to defaults.
#[derive(Debug, Clone, Default)]
pub struct ListRequest {
    /// Case-insensitive substring matched against title, content and
    /// summary.
    pub search: Option<String>,
    /// Comma-separated tag names; a note matches when its tag list
    /// intersects the set (at least one, not all).
    pub tags: Option<String>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
    /// 1-indexed page number.
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// One page of a filtered, sorted note collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotePage {
    pub items: Vec<Note>,
    /// Notes matching the filter across all pages.
    pub total_count: u64,
    /// `ceil(total_count / limit)`.
    pub page_count: u32,
    /// The requested page, after clamping to 1.
    pub current_page: u32,
}

/// Query facade over repository list/count.
pub struct QueryService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> QueryService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists the owner's notes for one page of the filtered collection.
    pub fn list(
        &self,
        owner: OwnerId,
        request: &ListRequest,
    ) -> Result<NotePage, NoteServiceError> {
        let limit = normalize_page_size(request.limit);
        let page = request.page.unwrap_or(1).max(1);
        let query = NoteListQuery {
            search: request
                .search
                .as_deref()
                .filter(|term| !term.trim().is_empty())
                .map(str::to_string),
            tags: parse_tag_filter(request.tags.as_deref()),
            sort_by: request.sort_by.unwrap_or_default(),
            sort_order: request.sort_order.unwrap_or_default(),
            limit,
            offset: u64::from(page - 1) * u64::from(limit),
        };

        let total_count = self.repo.count_notes(owner, &query)?;
        let items = self.repo.list_notes(owner, &query)?;
        Ok(NotePage {
            items,
            total_count,
            page_count: total_count.div_ceil(u64::from(limit)) as u32,
            current_page: page,
        })
    }
}

/// Normalizes page size: absent or zero falls back to the default and
/// oversized values clamp to the cap.
pub fn normalize_page_size(limit: Option<u32>) -> u32 {
    match limit {
        None | Some(0) => PAGE_SIZE_DEFAULT,
        Some(value) if value > PAGE_SIZE_MAX => PAGE_SIZE_MAX,
        Some(value) => value,
    }
}

/// Splits a comma-separated tag filter, trimming entries and dropping
/// empties.
pub fn parse_tag_filter(tags: Option<&str>) -> Vec<String> {
    match tags {
        Some(raw) => raw
            .split(',')
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect(),
        None => Vec::new(),
    }
}
