use notewise_core::db::open_db_in_memory;
use notewise_core::{
    AiResult, AiServiceError, EnrichmentService, NoteDraft, NotePatch, NoteService,
    NoteServiceError, NoteValidationError, SqliteNoteRepository, SummaryProvider,
};
use rusqlite::Connection;
use std::sync::Arc;
use uuid::Uuid;

/// Provider stand-in for tests that always supply title and tags
/// themselves; enrichment should never be reached.
struct UnusedProvider;

impl SummaryProvider for UnusedProvider {
    fn summarize(&self, _content: &str, _model_id: &str) -> AiResult<String> {
        Err(AiServiceError::new("unexpected provider call"))
    }

    fn generate_title(&self, _content: &str) -> AiResult<String> {
        Err(AiServiceError::new("unexpected provider call"))
    }

    fn extract_tags(&self, _content: &str) -> AiResult<Vec<String>> {
        Err(AiServiceError::new("unexpected provider call"))
    }
}

fn service(conn: &mut Connection) -> NoteService<SqliteNoteRepository<'_>> {
    let repo = SqliteNoteRepository::try_new(conn).unwrap();
    NoteService::new(repo, EnrichmentService::new(Arc::new(UnusedProvider)))
}

fn draft(title: &str, content: &str) -> NoteDraft {
    NoteDraft {
        title: Some(title.to_string()),
        content: content.to_string(),
        tags: Some(Vec::new()),
        is_public: false,
    }
}

#[test]
fn create_trims_and_computes_word_count() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let owner = Uuid::new_v4();

    let created = service
        .create_note(owner, draft("  My Note  ", "  hello   world  "))
        .unwrap();
    assert_eq!(created.title, "My Note");
    assert_eq!(created.content, "hello   world");
    assert_eq!(created.word_count, 2);
    assert_eq!(created.summary, None);
    assert_eq!(created.summary_word_count, 0);
    assert_eq!(created.ai_model, "standard-model");
    assert!(!created.is_public);
    assert!(created.created_at > 0);
    assert_eq!(created.reading_time(), 1);
    assert_eq!(created.summary_reading_time(), 0);

    let loaded = service.get_note(owner, created.uuid).unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn create_rejects_blank_content_naming_the_field() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);

    let err = service
        .create_note(Uuid::new_v4(), draft("title", "   "))
        .unwrap_err();
    match err {
        NoteServiceError::Validation(inner) => assert_eq!(inner.field(), "content"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn create_rejects_overlong_title_and_tags() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let owner = Uuid::new_v4();

    let err = service
        .create_note(owner, draft(&"x".repeat(101), "content"))
        .unwrap_err();
    match err {
        NoteServiceError::Validation(inner) => assert_eq!(inner.field(), "title"),
        other => panic!("unexpected error: {other}"),
    }

    let mut with_tags = draft("title", "content");
    with_tags.tags = Some(vec!["ok".to_string(), "y".repeat(21)]);
    let err = service.create_note(owner, with_tags).unwrap_err();
    match err {
        NoteServiceError::Validation(inner) => assert_eq!(
            inner,
            NoteValidationError::FieldTooLong {
                field: "tags",
                max_chars: 20
            }
        ),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn tags_preserve_order_and_duplicates() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let owner = Uuid::new_v4();

    let mut d = draft("title", "content");
    d.tags = Some(vec![
        "beta".to_string(),
        "alpha".to_string(),
        "beta".to_string(),
    ]);
    let created = service.create_note(owner, d).unwrap();
    assert_eq!(created.tags, vec!["beta", "alpha", "beta"]);

    let loaded = service.get_note(owner, created.uuid).unwrap();
    assert_eq!(loaded.tags, vec!["beta", "alpha", "beta"]);
}

#[test]
fn update_applies_only_provided_fields_and_recomputes_counts() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let owner = Uuid::new_v4();

    let created = service
        .create_note(owner, draft("Original", "one two three"))
        .unwrap();
    assert_eq!(created.word_count, 3);

    let updated = service
        .update_note(
            owner,
            created.uuid,
            NotePatch {
                content: Some("one two three four five".to_string()),
                ..NotePatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.title, "Original");
    assert_eq!(updated.word_count, 5);

    let updated = service
        .update_note(
            owner,
            created.uuid,
            NotePatch {
                is_public: Some(true),
                ..NotePatch::default()
            },
        )
        .unwrap();
    assert!(updated.is_public);
    assert_eq!(updated.content, "one two three four five");
    assert_eq!(updated.word_count, 5);
}

#[test]
fn empty_patch_is_a_no_op_and_keeps_updated_at() {
    let mut conn = open_db_in_memory().unwrap();
    let owner = Uuid::new_v4();

    let created = {
        let mut service = service(&mut conn);
        service.create_note(owner, draft("title", "content")).unwrap()
    };

    // Pin the write timestamp so a spurious write would be visible.
    conn.execute(
        "UPDATE notes SET updated_at = 1111 WHERE uuid = ?1;",
        [created.uuid.to_string()],
    )
    .unwrap();

    let mut service = service(&mut conn);
    let updated = service
        .update_note(owner, created.uuid, NotePatch::default())
        .unwrap();
    assert_eq!(updated.updated_at, 1111);

    let loaded = service.get_note(owner, created.uuid).unwrap();
    assert_eq!(loaded, updated);
}

#[test]
fn update_rejects_blank_title() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let owner = Uuid::new_v4();

    let created = service.create_note(owner, draft("keep", "content")).unwrap();
    let err = service
        .update_note(
            owner,
            created.uuid,
            NotePatch {
                title: Some("   ".to_string()),
                ..NotePatch::default()
            },
        )
        .unwrap_err();
    match err {
        NoteServiceError::Validation(inner) => assert_eq!(inner.field(), "title"),
        other => panic!("unexpected error: {other}"),
    }

    // The rejected write left the stored note untouched.
    let loaded = service.get_note(owner, created.uuid).unwrap();
    assert_eq!(loaded.title, "keep");
}

#[test]
fn delete_then_get_returns_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let owner = Uuid::new_v4();

    let created = service.create_note(owner, draft("title", "content")).unwrap();
    service.delete_note(owner, created.uuid).unwrap();

    let err = service.get_note(owner, created.uuid).unwrap_err();
    assert!(matches!(err, NoteServiceError::NoteNotFound(id) if id == created.uuid));

    let err = service.delete_note(owner, created.uuid).unwrap_err();
    assert!(matches!(err, NoteServiceError::NoteNotFound(_)));
}

#[test]
fn cross_owner_access_is_indistinguishable_from_missing() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = service(&mut conn);
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();

    let created = service.create_note(owner, draft("secret", "content")).unwrap();

    let err = service.get_note(stranger, created.uuid).unwrap_err();
    assert!(matches!(err, NoteServiceError::NoteNotFound(_)));

    let err = service
        .update_note(
            stranger,
            created.uuid,
            NotePatch {
                title: Some("hijack".to_string()),
                ..NotePatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, NoteServiceError::NoteNotFound(_)));

    let err = service.delete_note(stranger, created.uuid).unwrap_err();
    assert!(matches!(err, NoteServiceError::NoteNotFound(_)));

    // The owner still sees the unmodified note.
    let loaded = service.get_note(owner, created.uuid).unwrap();
    assert_eq!(loaded.title, "secret");
}
