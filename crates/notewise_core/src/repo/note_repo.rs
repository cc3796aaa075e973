//! Note repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide owner-scoped note persistence on top of `notes`/`note_tags`.
//! - Own filtered list/count SQL and per-owner aggregation queries.
//!
//! # Invariants
//! - All statements carry an `owner_uuid` conjunct; cross-owner access on
//!   an existing id yields `NotFound`, never a distinct forbidden signal.
//! - Note and tag rows are written in a single transaction.
//! - Tag order and duplicates are preserved via `note_tags.position`.

use crate::db::DbError;
use crate::model::note::{Note, NoteId, NoteValidationError, OwnerId};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

/// Default page size when the caller gives none.
pub const PAGE_SIZE_DEFAULT: u32 = 10;
/// Hard cap on page size.
pub const PAGE_SIZE_MAX: u32 = 100;

const NOTE_SELECT_SQL: &str = "SELECT
    uuid,
    owner_uuid,
    title,
    content,
    summary,
    is_public,
    word_count,
    summary_word_count,
    last_summarized,
    ai_model,
    created_at,
    updated_at
FROM notes";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(NoteValidationError),
    Db(DbError),
    NotFound(NoteId),
    MissingRequiredTable(&'static str),
    InvalidData(String),
}

impl std::fmt::Display for RepoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing; run migrations first")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
        }
    }
}

impl std::error::Error for RepoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NoteValidationError> for RepoError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Whitelisted sort fields for note listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    WordCount,
}

impl SortField {
    /// Parses the external field name; `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "createdAt" | "created_at" => Some(Self::CreatedAt),
            "updatedAt" | "updated_at" => Some(Self::UpdatedAt),
            "title" => Some(Self::Title),
            "wordCount" | "word_count" => Some(Self::WordCount),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::Title => "title",
            Self::WordCount => "word_count",
        }
    }
}

/// Sort direction; defaults to newest-first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Parses the external direction name; `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Filter/sort/pagination options for note listing.
///
/// `search` matches as a case-insensitive substring over title, content
/// and summary. `tags` matches notes whose tag list intersects the given
/// set (at least one tag, not all).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteListQuery {
    pub search: Option<String>,
    pub tags: Vec<String>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub limit: u32,
    /// Wider than `limit` so `page * limit` never wraps.
    pub offset: u64,
}

impl Default for NoteListQuery {
    fn default() -> Self {
        Self {
            search: None,
            tags: Vec::new(),
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
            limit: PAGE_SIZE_DEFAULT,
            offset: 0,
        }
    }
}

/// Per-owner aggregate counters, computed in a single SQL pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OwnerStats {
    pub total_notes: u64,
    pub total_words: u64,
    pub total_summary_words: u64,
    /// Notes whose summary is non-empty, not merely set.
    pub notes_with_summary: u64,
}

/// One tag with its usage count across an owner's notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCount {
    pub tag: String,
    pub count: u64,
}

/// Repository interface for owner-scoped note operations.
pub trait NoteRepository {
    /// Persists one new note with its tags and returns its stable id.
    fn create_note(&mut self, note: &Note) -> RepoResult<NoteId>;
    /// Gets one note within the owner's scope.
    fn get_note(&self, owner: OwnerId, id: NoteId) -> RepoResult<Option<Note>>;
    /// Replaces all mutable fields and tags of one note.
    fn update_note(&mut self, note: &Note) -> RepoResult<()>;
    /// Permanently deletes one note. No soft delete.
    fn delete_note(&mut self, owner: OwnerId, id: NoteId) -> RepoResult<()>;
    /// Lists notes matching the query, sorted and paginated.
    fn list_notes(&self, owner: OwnerId, query: &NoteListQuery) -> RepoResult<Vec<Note>>;
    /// Counts all notes matching the query, ignoring pagination.
    fn count_notes(&self, owner: OwnerId, query: &NoteListQuery) -> RepoResult<u64>;
    /// Computes aggregate counters over the owner's notes.
    fn owner_stats(&self, owner: OwnerId) -> RepoResult<OwnerStats>;
    /// Returns the owner's most used tags, descending by count.
    fn top_tags(&self, owner: OwnerId, limit: u32) -> RepoResult<Vec<TagCount>>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        for table in ["notes", "note_tags"] {
            if !table_exists(conn, table)? {
                return Err(RepoError::MissingRequiredTable(table));
            }
        }
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn create_note(&mut self, note: &Note) -> RepoResult<NoteId> {
        note.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO notes (
                uuid,
                owner_uuid,
                title,
                content,
                summary,
                is_public,
                word_count,
                summary_word_count,
                last_summarized,
                ai_model
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                note.uuid.to_string(),
                note.owner.to_string(),
                note.title.as_str(),
                note.content.as_str(),
                note.summary.as_deref(),
                bool_to_int(note.is_public),
                note.word_count,
                note.summary_word_count,
                note.last_summarized,
                note.ai_model.as_str(),
            ],
        )?;
        replace_tags_in_tx(&tx, note.uuid, &note.tags)?;
        tx.commit()?;

        Ok(note.uuid)
    }

    fn get_note(&self, owner: OwnerId, id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             WHERE uuid = ?1
               AND owner_uuid = ?2;"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), owner.to_string()])?;
        if let Some(row) = rows.next()? {
            let note = parse_note_row(self.conn, row)?;
            return Ok(Some(note));
        }

        Ok(None)
    }

    fn update_note(&mut self, note: &Note) -> RepoResult<()> {
        note.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE notes
             SET
                title = ?3,
                content = ?4,
                summary = ?5,
                is_public = ?6,
                word_count = ?7,
                summary_word_count = ?8,
                last_summarized = ?9,
                ai_model = ?10,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1
               AND owner_uuid = ?2;",
            params![
                note.uuid.to_string(),
                note.owner.to_string(),
                note.title.as_str(),
                note.content.as_str(),
                note.summary.as_deref(),
                bool_to_int(note.is_public),
                note.word_count,
                note.summary_word_count,
                note.last_summarized,
                note.ai_model.as_str(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(note.uuid));
        }

        replace_tags_in_tx(&tx, note.uuid, &note.tags)?;
        tx.commit()?;
        Ok(())
    }

    fn delete_note(&mut self, owner: OwnerId, id: NoteId) -> RepoResult<()> {
        // note_tags rows go with the note via ON DELETE CASCADE.
        let changed = self.conn.execute(
            "DELETE FROM notes WHERE uuid = ?1 AND owner_uuid = ?2;",
            params![id.to_string(), owner.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn list_notes(&self, owner: OwnerId, query: &NoteListQuery) -> RepoResult<Vec<Note>> {
        let (filter_sql, mut bind_values) = build_filter(owner, query);
        let mut sql = format!("{NOTE_SELECT_SQL} WHERE {filter_sql}");

        // Ties fall back to rowid, the store's natural insertion order.
        sql.push_str(&format!(
            " ORDER BY {} {}, rowid ASC",
            query.sort_by.column(),
            query.sort_order.keyword()
        ));
        sql.push_str(" LIMIT ? OFFSET ?");
        bind_values.push(Value::Integer(i64::from(query.limit)));
        bind_values.push(Value::Integer(query.offset as i64));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(self.conn, row)?);
        }

        Ok(notes)
    }

    fn count_notes(&self, owner: OwnerId, query: &NoteListQuery) -> RepoResult<u64> {
        let (filter_sql, bind_values) = build_filter(owner, query);
        let sql = format!("SELECT COUNT(*) FROM notes WHERE {filter_sql}");

        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), |row| row.get(0))?;
        Ok(count as u64)
    }

    fn owner_stats(&self, owner: OwnerId) -> RepoResult<OwnerStats> {
        let stats = self.conn.query_row(
            "SELECT
                COUNT(*),
                COALESCE(SUM(word_count), 0),
                COALESCE(SUM(summary_word_count), 0),
                COALESCE(SUM(CASE WHEN summary IS NOT NULL AND summary <> '' THEN 1 ELSE 0 END), 0)
             FROM notes
             WHERE owner_uuid = ?1;",
            [owner.to_string()],
            |row| {
                Ok(OwnerStats {
                    total_notes: row.get::<_, i64>(0)? as u64,
                    total_words: row.get::<_, i64>(1)? as u64,
                    total_summary_words: row.get::<_, i64>(2)? as u64,
                    notes_with_summary: row.get::<_, i64>(3)? as u64,
                })
            },
        )?;
        Ok(stats)
    }

    fn top_tags(&self, owner: OwnerId, limit: u32) -> RepoResult<Vec<TagCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT nt.name, COUNT(*) AS uses
             FROM note_tags nt
             INNER JOIN notes n ON n.uuid = nt.note_uuid
             WHERE n.owner_uuid = ?1
             GROUP BY nt.name
             ORDER BY uses DESC
             LIMIT ?2;",
        )?;

        let mut rows = stmt.query(params![owner.to_string(), limit])?;
        let mut counts = Vec::new();
        while let Some(row) = rows.next()? {
            counts.push(TagCount {
                tag: row.get(0)?,
                count: row.get::<_, i64>(1)? as u64,
            });
        }
        Ok(counts)
    }
}

/// Builds the shared WHERE clause for list/count so both always agree.
fn build_filter(owner: OwnerId, query: &NoteListQuery) -> (String, Vec<Value>) {
    let mut sql = String::from("owner_uuid = ?");
    let mut bind_values = vec![Value::Text(owner.to_string())];

    if let Some(term) = query.search.as_deref() {
        let pattern = like_pattern(term);
        sql.push_str(
            " AND (title LIKE ? ESCAPE '\\'
               OR content LIKE ? ESCAPE '\\'
               OR COALESCE(summary, '') LIKE ? ESCAPE '\\')",
        );
        for _ in 0..3 {
            bind_values.push(Value::Text(pattern.clone()));
        }
    }

    if !query.tags.is_empty() {
        let placeholders = vec!["?"; query.tags.len()].join(", ");
        sql.push_str(&format!(
            " AND EXISTS (
                SELECT 1
                FROM note_tags
                WHERE note_tags.note_uuid = notes.uuid
                  AND note_tags.name IN ({placeholders})
            )"
        ));
        for tag in &query.tags {
            bind_values.push(Value::Text(tag.clone()));
        }
    }

    (sql, bind_values)
}

/// Wraps a search term into a `%term%` pattern with LIKE metacharacters
/// escaped. SQLite LIKE is case-insensitive for ASCII, which is the
/// substring-matching contract here.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn replace_tags_in_tx(tx: &Transaction<'_>, note_id: NoteId, tags: &[String]) -> RepoResult<()> {
    let note_uuid = note_id.to_string();
    tx.execute(
        "DELETE FROM note_tags WHERE note_uuid = ?1;",
        [note_uuid.as_str()],
    )?;

    for (position, tag) in tags.iter().enumerate() {
        tx.execute(
            "INSERT INTO note_tags (note_uuid, position, name) VALUES (?1, ?2, ?3);",
            params![note_uuid.as_str(), position as i64, tag.as_str()],
        )?;
    }

    Ok(())
}

fn load_tags_for_note(conn: &Connection, note_uuid: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name
         FROM note_tags
         WHERE note_uuid = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([note_uuid])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(row.get(0)?);
    }
    Ok(tags)
}

fn parse_note_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Note> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid(&uuid_text, "notes.uuid")?;
    let owner_text: String = row.get("owner_uuid")?;
    let owner = parse_uuid(&owner_text, "notes.owner_uuid")?;

    let is_public = match row.get::<_, i64>("is_public")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_public value `{other}` in notes.is_public"
            )));
        }
    };

    // Structural integrity only: rows written outside this API (or under
    // older rules) must still load, e.g. so summarize can reject an
    // empty-content note with the right error instead of a decode error.
    let tags = load_tags_for_note(conn, &uuid_text)?;
    Ok(Note {
        uuid,
        owner,
        title: row.get("title")?,
        content: row.get("content")?,
        summary: row.get("summary")?,
        tags,
        is_public,
        word_count: row.get("word_count")?,
        summary_word_count: row.get("summary_word_count")?,
        last_summarized: row.get("last_summarized")?,
        ai_model: row.get("ai_model")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

fn parse_uuid(value: &str, column: &str) -> RepoResult<NoteId> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
