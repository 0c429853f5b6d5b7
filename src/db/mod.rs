pub mod grades;
pub mod notes;
pub mod users;

use chrono::{SecondsFormat, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use uuid::Uuid;

pub use grades::{GradeStore, SqliteGradeStore};
pub use notes::{NoteStore, SqliteNoteStore};
pub use users::{SqliteUserStore, UserStore};

/// Opens the pool and brings the schema up to date.
///
/// An in-memory database lives per connection, so `sqlite::memory:`
/// should be paired with `max_connections = 1`.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Fixed-width UTC timestamp; lexical order is chronological order.
pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
pub(crate) async fn setup_test_db() -> SqlitePool {
    connect("sqlite::memory:", 1)
        .await
        .expect("Failed to create test db")
}
