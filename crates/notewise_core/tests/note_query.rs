use notewise_core::db::open_db_in_memory;
use notewise_core::{
    ListRequest, Note, NoteRepository, QueryService, SortField, SortOrder, SqliteNoteRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn insert_note(conn: &mut Connection, owner: Uuid, title: &str, content: &str, tags: &[&str]) -> Uuid {
    let mut repo = SqliteNoteRepository::try_new(conn).unwrap();
    let mut note = Note::new(owner, title, content);
    note.tags = tags.iter().map(|tag| tag.to_string()).collect();
    note.refresh_word_counts();
    repo.create_note(&note).unwrap()
}

fn list(conn: &mut Connection, owner: Uuid, request: &ListRequest) -> notewise_core::NotePage {
    let repo = SqliteNoteRepository::try_new(conn).unwrap();
    QueryService::new(repo).list(owner, request).unwrap()
}

#[test]
fn pagination_returns_partial_last_page_with_totals() {
    let mut conn = open_db_in_memory().unwrap();
    let owner = Uuid::new_v4();
    for idx in 0..25 {
        insert_note(&mut conn, owner, &format!("note {idx}"), "body", &[]);
    }

    let page = list(
        &mut conn,
        owner,
        &ListRequest {
            page: Some(3),
            limit: Some(10),
            ..ListRequest::default()
        },
    );
    assert_eq!(page.items.len(), 5);
    assert_eq!(page.total_count, 25);
    assert_eq!(page.page_count, 3);
    assert_eq!(page.current_page, 3);
}

#[test]
fn page_beyond_range_is_empty_not_an_error() {
    let mut conn = open_db_in_memory().unwrap();
    let owner = Uuid::new_v4();
    for idx in 0..4 {
        insert_note(&mut conn, owner, &format!("note {idx}"), "body", &[]);
    }

    let page = list(
        &mut conn,
        owner,
        &ListRequest {
            page: Some(9),
            limit: Some(3),
            ..ListRequest::default()
        },
    );
    assert!(page.items.is_empty());
    assert_eq!(page.total_count, 4);
    assert_eq!(page.page_count, 2);
    assert_eq!(page.current_page, 9);
}

#[test]
fn huge_page_numbers_yield_an_empty_page_not_a_panic() {
    let mut conn = open_db_in_memory().unwrap();
    let owner = Uuid::new_v4();
    insert_note(&mut conn, owner, "only", "body", &[]);

    let page = list(
        &mut conn,
        owner,
        &ListRequest {
            page: Some(u32::MAX),
            limit: Some(100),
            ..ListRequest::default()
        },
    );
    assert!(page.items.is_empty());
    assert_eq!(page.total_count, 1);
    assert_eq!(page.page_count, 1);
    assert_eq!(page.current_page, u32::MAX);
}

#[test]
fn limit_defaults_to_ten() {
    let mut conn = open_db_in_memory().unwrap();
    let owner = Uuid::new_v4();
    for idx in 0..12 {
        insert_note(&mut conn, owner, &format!("note {idx}"), "body", &[]);
    }

    let page = list(&mut conn, owner, &ListRequest::default());
    assert_eq!(page.items.len(), 10);
    assert_eq!(page.total_count, 12);
    assert_eq!(page.page_count, 2);
}

#[test]
fn search_matches_case_insensitive_substring_across_fields() {
    let mut conn = open_db_in_memory().unwrap();
    let owner = Uuid::new_v4();
    let in_content = insert_note(&mut conn, owner, "animals", "The quick brown FOX", &[]);
    let in_title = insert_note(&mut conn, owner, "Foxhunt plans", "nothing relevant", &[]);
    let in_summary = insert_note(&mut conn, owner, "misc", "nothing relevant", &[]);
    insert_note(&mut conn, owner, "other", "unrelated body", &[]);

    conn.execute(
        "UPDATE notes SET summary = 'mentions a fox in passing' WHERE uuid = ?1;",
        [in_summary.to_string()],
    )
    .unwrap();

    let page = list(
        &mut conn,
        owner,
        &ListRequest {
            search: Some("fox".to_string()),
            ..ListRequest::default()
        },
    );
    let found: Vec<Uuid> = page.items.iter().map(|note| note.uuid).collect();
    assert_eq!(page.total_count, 3);
    assert!(found.contains(&in_content));
    assert!(found.contains(&in_title));
    assert!(found.contains(&in_summary));
}

#[test]
fn search_treats_like_metacharacters_literally() {
    let mut conn = open_db_in_memory().unwrap();
    let owner = Uuid::new_v4();
    let with_percent = insert_note(&mut conn, owner, "progress", "about 50% done", &[]);
    insert_note(&mut conn, owner, "other", "about 500 done", &[]);

    let page = list(
        &mut conn,
        owner,
        &ListRequest {
            search: Some("50%".to_string()),
            ..ListRequest::default()
        },
    );
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].uuid, with_percent);
}

#[test]
fn tag_filter_matches_any_intersection_not_all() {
    let mut conn = open_db_in_memory().unwrap();
    let owner = Uuid::new_v4();
    let work_note = insert_note(&mut conn, owner, "a", "body", &["work", "rust"]);
    let home_note = insert_note(&mut conn, owner, "b", "body", &["home"]);
    insert_note(&mut conn, owner, "c", "body", &["cooking"]);

    let page = list(
        &mut conn,
        owner,
        &ListRequest {
            tags: Some("work, garden".to_string()),
            ..ListRequest::default()
        },
    );
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].uuid, work_note);

    let page = list(
        &mut conn,
        owner,
        &ListRequest {
            tags: Some("rust,home".to_string()),
            ..ListRequest::default()
        },
    );
    let found: Vec<Uuid> = page.items.iter().map(|note| note.uuid).collect();
    assert_eq!(found.len(), 2);
    assert!(found.contains(&work_note));
    assert!(found.contains(&home_note));
}

#[test]
fn default_sort_is_created_at_descending() {
    let mut conn = open_db_in_memory().unwrap();
    let owner = Uuid::new_v4();
    let older = insert_note(&mut conn, owner, "older", "body", &[]);
    let newest = insert_note(&mut conn, owner, "newest", "body", &[]);
    let middle = insert_note(&mut conn, owner, "middle", "body", &[]);

    for (id, created_at) in [(older, 1_000), (newest, 3_000), (middle, 2_000)] {
        conn.execute(
            "UPDATE notes SET created_at = ?1 WHERE uuid = ?2;",
            rusqlite::params![created_at, id.to_string()],
        )
        .unwrap();
    }

    let page = list(&mut conn, owner, &ListRequest::default());
    let order: Vec<Uuid> = page.items.iter().map(|note| note.uuid).collect();
    assert_eq!(order, vec![newest, middle, older]);
}

#[test]
fn equal_sort_keys_fall_back_to_insertion_order() {
    let mut conn = open_db_in_memory().unwrap();
    let owner = Uuid::new_v4();
    let first = insert_note(&mut conn, owner, "first", "body", &[]);
    let second = insert_note(&mut conn, owner, "second", "body", &[]);

    conn.execute("UPDATE notes SET created_at = 5000;", []).unwrap();

    let page = list(&mut conn, owner, &ListRequest::default());
    let order: Vec<Uuid> = page.items.iter().map(|note| note.uuid).collect();
    assert_eq!(order, vec![first, second]);
}

#[test]
fn sort_by_title_ascending() {
    let mut conn = open_db_in_memory().unwrap();
    let owner = Uuid::new_v4();
    let banana = insert_note(&mut conn, owner, "banana", "body", &[]);
    let apple = insert_note(&mut conn, owner, "apple", "body", &[]);

    let page = list(
        &mut conn,
        owner,
        &ListRequest {
            sort_by: Some(SortField::Title),
            sort_order: Some(SortOrder::Asc),
            ..ListRequest::default()
        },
    );
    let order: Vec<Uuid> = page.items.iter().map(|note| note.uuid).collect();
    assert_eq!(order, vec![apple, banana]);
}

#[test]
fn listing_is_scoped_to_the_owner() {
    let mut conn = open_db_in_memory().unwrap();
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    insert_note(&mut conn, owner, "mine", "body", &[]);
    insert_note(&mut conn, stranger, "theirs", "body", &[]);

    let page = list(&mut conn, owner, &ListRequest::default());
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].title, "mine");
}
