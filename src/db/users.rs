use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::info;

use crate::db::now_timestamp;
use crate::error::AppError;
use crate::models::{RegisterUserRequest, User, required};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Idempotent: the first registration's `created_at` is kept.
    async fn register(&self, user_id: &str, req: RegisterUserRequest) -> Result<User, AppError>;
    async fn me(&self, user_id: &str) -> Result<User, AppError>;
}

pub struct SqliteUserStore {
    db: SqlitePool,
}

impl SqliteUserStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn register(&self, user_id: &str, req: RegisterUserRequest) -> Result<User, AppError> {
        let email = required("email", req.email)?.trim().to_string();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_id, email, created_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (user_id) DO UPDATE SET email = excluded.email
            RETURNING user_id, email, created_at
            "#,
        )
        .bind(user_id)
        .bind(&email)
        .bind(now_timestamp())
        .fetch_one(&self.db)
        .await?;

        info!("registered user {}", user.user_id);
        Ok(user)
    }

    async fn me(&self, user_id: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>("SELECT user_id, email, created_at FROM users WHERE user_id = ?1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }
}
