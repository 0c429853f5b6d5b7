use std::sync::Arc;

use sqlx::SqlitePool;

use crate::db::{
    GradeStore, NoteStore, SqliteGradeStore, SqliteNoteStore, SqliteUserStore, UserStore,
};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub notes: Arc<dyn NoteStore>,
    pub grades: Arc<dyn GradeStore>,
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            notes: Arc::new(SqliteNoteStore::new(db.clone())),
            grades: Arc::new(SqliteGradeStore::new(db.clone())),
            users: Arc::new(SqliteUserStore::new(db.clone())),
            db,
        }
    }
}
