use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::db::{new_id, now_timestamp};
use crate::error::AppError;
use crate::models::note::course_tag_or_default;
use crate::models::{NewNoteRequest, Note, NoteSelection, UpdateNoteRequest, required};

const NOTE_COLUMNS: &str =
    "id, owner_id, title, content, course_tag, is_pinned, is_archived, is_deleted, created_at";

/// Notes of a single owner. A note owned by someone else behaves exactly
/// like a note that does not exist.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Pinned first, then newest first.
    async fn list(&self, owner: &str, selection: &NoteSelection) -> Result<Vec<Note>, AppError>;
    async fn create(&self, owner: &str, req: NewNoteRequest) -> Result<Note, AppError>;
    async fn get(&self, owner: &str, id: &str) -> Result<Note, AppError>;
    async fn update(&self, owner: &str, id: &str, req: UpdateNoteRequest) -> Result<Note, AppError>;
    async fn permanently_delete(&self, owner: &str, id: &str) -> Result<(), AppError>;
    async fn distinct_tags(&self, owner: &str) -> Result<Vec<String>, AppError>;

    /// Moves the note to the trash; reversible.
    async fn soft_delete(&self, owner: &str, id: &str) -> Result<Note, AppError> {
        self.update(owner, id, UpdateNoteRequest::soft_delete()).await
    }

    async fn archive(&self, owner: &str, id: &str) -> Result<Note, AppError> {
        self.update(owner, id, UpdateNoteRequest::archived(true)).await
    }

    async fn unarchive(&self, owner: &str, id: &str) -> Result<Note, AppError> {
        self.update(owner, id, UpdateNoteRequest::archived(false)).await
    }

    /// Takes the note out of the trash and back into the active view.
    async fn restore(&self, owner: &str, id: &str) -> Result<Note, AppError> {
        self.update(owner, id, UpdateNoteRequest::restore()).await
    }
}

pub struct SqliteNoteStore {
    db: SqlitePool,
}

impl SqliteNoteStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NoteStore for SqliteNoteStore {
    async fn list(&self, owner: &str, selection: &NoteSelection) -> Result<Vec<Note>, AppError> {
        let (filter, tag) = match selection {
            NoteSelection::Trashed => ("is_deleted = 1", None),
            NoteSelection::Archived => ("is_archived = 1 AND is_deleted = 0", None),
            NoteSelection::ActiveTagged(tag) => (
                "course_tag = ?2 AND is_archived = 0 AND is_deleted = 0",
                Some(tag.as_str()),
            ),
            NoteSelection::Active => ("is_archived = 0 AND is_deleted = 0", None),
        };

        // rowid breaks ties between notes created within the same microsecond
        let sql = format!(
            "SELECT {NOTE_COLUMNS} FROM notes
            WHERE owner_id = ?1 AND {filter}
            ORDER BY is_pinned DESC, created_at DESC, rowid DESC"
        );

        let mut query = sqlx::query_as::<_, Note>(&sql).bind(owner);
        if let Some(tag) = tag {
            query = query.bind(tag);
        }
        let notes = query.fetch_all(&self.db).await?;

        debug!("listed {} notes for {} ({:?})", notes.len(), owner, selection);
        Ok(notes)
    }

    async fn create(&self, owner: &str, req: NewNoteRequest) -> Result<Note, AppError> {
        let note = Note {
            id: new_id(),
            owner_id: owner.to_string(),
            title: required("title", req.title)?,
            content: required("content", req.content)?,
            course_tag: course_tag_or_default(req.course_tag),
            is_pinned: false,
            is_archived: false,
            is_deleted: false,
            created_at: now_timestamp(),
        };

        sqlx::query(
            r#"
            INSERT INTO notes
                (id, owner_id, title, content, course_tag,
                is_pinned, is_archived, is_deleted, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, 0, 0, 0, ?6)
            "#,
        )
        .bind(&note.id)
        .bind(&note.owner_id)
        .bind(&note.title)
        .bind(&note.content)
        .bind(&note.course_tag)
        .bind(&note.created_at)
        .execute(&self.db)
        .await?;

        info!("created note {} for {}", note.id, owner);
        Ok(note)
    }

    async fn get(&self, owner: &str, id: &str) -> Result<Note, AppError> {
        let sql = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?1 AND owner_id = ?2");
        sqlx::query_as::<_, Note>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn update(&self, owner: &str, id: &str, req: UpdateNoteRequest) -> Result<Note, AppError> {
        let req = req.normalized()?;

        // One statement, so the patch lands atomically; concurrent patches
        // to the same note are last-write-wins.
        let sql = format!(
            "UPDATE notes
            SET title = COALESCE(?1, title),
                content = COALESCE(?2, content),
                course_tag = COALESCE(?3, course_tag),
                is_pinned = COALESCE(?4, is_pinned),
                is_archived = COALESCE(?5, is_archived),
                is_deleted = COALESCE(?6, is_deleted)
            WHERE id = ?7 AND owner_id = ?8
            RETURNING {NOTE_COLUMNS}"
        );

        let note = sqlx::query_as::<_, Note>(&sql)
            .bind(req.title)
            .bind(req.content)
            .bind(req.course_tag)
            .bind(req.is_pinned)
            .bind(req.is_archived)
            .bind(req.is_deleted)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        debug!("updated note {} for {}", id, owner);
        Ok(note)
    }

    async fn permanently_delete(&self, owner: &str, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ?1 AND owner_id = ?2")
            .bind(id)
            .bind(owner)
            .execute(&self.db)
            .await?
            .rows_affected();

        if result == 0 {
            return Err(AppError::NotFound);
        }
        info!("permanently deleted note {} for {}", id, owner);
        Ok(())
    }

    async fn distinct_tags(&self, owner: &str) -> Result<Vec<String>, AppError> {
        let tags = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT course_tag FROM notes
            WHERE owner_id = ?1
                AND is_archived = 0
                AND is_deleted = 0
                AND TRIM(course_tag) <> ''
            ORDER BY course_tag
            "#,
        )
        .bind(owner)
        .fetch_all(&self.db)
        .await?;

        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::setup_test_db;
    use crate::models::NoteView;

    const ALICE: &str = "alice";
    const BOB: &str = "bob";

    fn new_note(title: &str, course_tag: Option<&str>) -> NewNoteRequest {
        NewNoteRequest {
            title: Some(title.to_string()),
            content: Some(format!("{title} body")),
            course_tag: course_tag.map(str::to_string),
        }
    }

    async fn titles(store: &SqliteNoteStore, owner: &str, view: NoteView) -> Vec<String> {
        store
            .list(owner, &NoteSelection::resolve(view, None))
            .await
            .expect("Failed to list notes")
            .into_iter()
            .map(|n| n.title)
            .collect()
    }

    #[tokio::test]
    async fn test_create_defaults() {
        let store = SqliteNoteStore::new(setup_test_db().await);

        let note = store
            .create(ALICE, new_note("Limits", Some("  ")))
            .await
            .expect("Failed to create note");

        assert_eq!(note.owner_id, ALICE);
        assert_eq!(note.course_tag, "General");
        assert!(!note.is_pinned && !note.is_archived && !note.is_deleted);

        let fetched = store.get(ALICE, &note.id).await.expect("Failed to get note");
        assert_eq!(fetched.title, "Limits");
        assert_eq!(fetched.created_at, note.created_at);
    }

    #[tokio::test]
    async fn test_create_requires_title_and_content() {
        let store = SqliteNoteStore::new(setup_test_db().await);

        let missing_title = NewNoteRequest {
            title: None,
            content: Some("body".to_string()),
            course_tag: None,
        };
        assert!(matches!(
            store.create(ALICE, missing_title).await,
            Err(AppError::InvalidInput(_))
        ));

        let blank_content = NewNoteRequest {
            title: Some("Title".to_string()),
            content: Some("".to_string()),
            course_tag: None,
        };
        assert!(matches!(
            store.create(ALICE, blank_content).await,
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_list_orders_pinned_then_newest() {
        let store = SqliteNoteStore::new(setup_test_db().await);

        let mut ids = Vec::new();
        for title in ["n1", "n2", "n3", "n4", "n5"] {
            let note = store.create(ALICE, new_note(title, None)).await.unwrap();
            ids.push(note.id);
        }
        // pin n1 and n3
        for id in [&ids[0], &ids[2]] {
            let pin = UpdateNoteRequest {
                is_pinned: Some(true),
                ..UpdateNoteRequest::default()
            };
            store.update(ALICE, id, pin).await.unwrap();
        }

        assert_eq!(
            titles(&store, ALICE, NoteView::Default).await,
            vec!["n3", "n1", "n5", "n4", "n2"]
        );
    }

    #[tokio::test]
    async fn test_list_by_course_tag() {
        let store = SqliteNoteStore::new(setup_test_db().await);

        store.create(ALICE, new_note("derivatives", Some("Math"))).await.unwrap();
        let archived = store.create(ALICE, new_note("integrals", Some("Math"))).await.unwrap();
        store.create(ALICE, new_note("rome", Some("History"))).await.unwrap();
        store.archive(ALICE, &archived.id).await.unwrap();

        let math = store
            .list(ALICE, &NoteSelection::resolve(NoteView::Default, Some("Math")))
            .await
            .unwrap();
        assert_eq!(math.len(), 1);
        assert_eq!(math[0].title, "derivatives");

        // the archive view ignores the tag
        let archive = store
            .list(ALICE, &NoteSelection::resolve(NoteView::Archive, Some("History")))
            .await
            .unwrap();
        assert_eq!(archive.len(), 1);
        assert_eq!(archive[0].title, "integrals");
    }

    #[tokio::test]
    async fn test_soft_delete_and_restore() {
        let store = SqliteNoteStore::new(setup_test_db().await);

        let active = store.create(ALICE, new_note("active", None)).await.unwrap();
        let archived = store.create(ALICE, new_note("archived", None)).await.unwrap();
        store.archive(ALICE, &archived.id).await.unwrap();

        store.soft_delete(ALICE, &active.id).await.unwrap();
        let trashed = store.soft_delete(ALICE, &archived.id).await.unwrap();
        assert!(trashed.is_archived && trashed.is_deleted);

        assert!(titles(&store, ALICE, NoteView::Default).await.is_empty());
        assert!(titles(&store, ALICE, NoteView::Archive).await.is_empty());
        assert_eq!(titles(&store, ALICE, NoteView::Deleted).await.len(), 2);

        // plain patch only clears the deleted flag
        let undeleted = store
            .update(
                ALICE,
                &archived.id,
                UpdateNoteRequest {
                    is_deleted: Some(false),
                    ..UpdateNoteRequest::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(undeleted.view(), NoteView::Archive);

        let restored = store.restore(ALICE, &active.id).await.unwrap();
        assert_eq!(restored.view(), NoteView::Default);
        assert_eq!(titles(&store, ALICE, NoteView::Default).await, vec!["active"]);
        assert_eq!(titles(&store, ALICE, NoteView::Archive).await, vec!["archived"]);
        assert!(titles(&store, ALICE, NoteView::Deleted).await.is_empty());
    }

    #[tokio::test]
    async fn test_update_is_a_merge_patch() {
        let store = SqliteNoteStore::new(setup_test_db().await);
        let note = store.create(ALICE, new_note("draft", Some("Biology"))).await.unwrap();

        let patch = UpdateNoteRequest {
            content: Some("revised".to_string()),
            is_pinned: Some(true),
            ..UpdateNoteRequest::default()
        };
        let updated = store.update(ALICE, &note.id, patch).await.unwrap();

        assert_eq!(updated.title, "draft");
        assert_eq!(updated.content, "revised");
        assert_eq!(updated.course_tag, "Biology");
        assert!(updated.is_pinned);
        assert!(!updated.is_archived && !updated.is_deleted);
        assert_eq!(updated.created_at, note.created_at);

        let unchanged = store
            .update(ALICE, &note.id, UpdateNoteRequest::default())
            .await
            .unwrap();
        assert_eq!(unchanged.content, "revised");
    }

    #[tokio::test]
    async fn test_other_owner_sees_not_found() {
        let store = SqliteNoteStore::new(setup_test_db().await);
        let note = store.create(ALICE, new_note("private", None)).await.unwrap();

        assert!(matches!(store.get(BOB, &note.id).await, Err(AppError::NotFound)));
        assert!(matches!(
            store.update(BOB, &note.id, UpdateNoteRequest::soft_delete()).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            store.permanently_delete(BOB, &note.id).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            store.permanently_delete(BOB, "no-such-id").await,
            Err(AppError::NotFound)
        ));
        assert!(titles(&store, BOB, NoteView::Default).await.is_empty());

        let still_there = store.get(ALICE, &note.id).await.unwrap();
        assert!(!still_there.is_deleted);
    }

    #[tokio::test]
    async fn test_permanent_delete_from_any_state() {
        let store = SqliteNoteStore::new(setup_test_db().await);
        let trashed = store.create(ALICE, new_note("trashed", None)).await.unwrap();
        let active = store.create(ALICE, new_note("active", None)).await.unwrap();
        store.soft_delete(ALICE, &trashed.id).await.unwrap();

        store.permanently_delete(ALICE, &trashed.id).await.unwrap();
        store.permanently_delete(ALICE, &active.id).await.unwrap();

        assert!(matches!(store.get(ALICE, &trashed.id).await, Err(AppError::NotFound)));
        assert!(matches!(
            store.restore(ALICE, &trashed.id).await,
            Err(AppError::NotFound)
        ));
        assert!(titles(&store, ALICE, NoteView::Deleted).await.is_empty());
    }

    #[tokio::test]
    async fn test_distinct_tags() {
        let store = SqliteNoteStore::new(setup_test_db().await);

        store.create(ALICE, new_note("a", Some("Math"))).await.unwrap();
        store.create(ALICE, new_note("b", Some("Math"))).await.unwrap();
        store.create(ALICE, new_note("c", None)).await.unwrap();
        let archived = store.create(ALICE, new_note("d", Some("Art"))).await.unwrap();
        let trashed = store.create(ALICE, new_note("e", Some("Chemistry"))).await.unwrap();
        store.create(BOB, new_note("f", Some("Law"))).await.unwrap();
        store.archive(ALICE, &archived.id).await.unwrap();
        store.soft_delete(ALICE, &trashed.id).await.unwrap();

        // a stored empty tag never shows up
        sqlx::query("INSERT INTO notes (id, owner_id, title, content, course_tag, created_at) VALUES ('raw', ?1, 't', 'c', '', '2026-01-01T00:00:00.000000Z')")
            .bind(ALICE)
            .execute(&store.db)
            .await
            .unwrap();

        let mut tags = store.distinct_tags(ALICE).await.unwrap();
        tags.sort();
        assert_eq!(tags, vec!["General", "Math"]);
    }

    #[tokio::test]
    async fn test_concurrent_updates_to_different_notes() {
        let store = SqliteNoteStore::new(setup_test_db().await);
        let first = store.create(ALICE, new_note("first", None)).await.unwrap();
        let second = store.create(ALICE, new_note("second", None)).await.unwrap();

        let (a, b) = tokio::join!(
            store.archive(ALICE, &first.id),
            store.update(
                ALICE,
                &second.id,
                UpdateNoteRequest {
                    is_pinned: Some(true),
                    ..UpdateNoteRequest::default()
                },
            ),
        );
        assert!(a.unwrap().is_archived);
        let b = b.unwrap();
        assert!(b.is_pinned && !b.is_archived);
    }
}
