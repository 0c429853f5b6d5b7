use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::db::{new_id, now_timestamp};
use crate::error::AppError;
use crate::models::{GpaSummary, GradeRecord, NewGradeRequest, required};
use crate::services::{band_for, cumulative_gpa};

#[async_trait]
pub trait GradeStore: Send + Sync {
    async fn create(&self, owner: &str, req: NewGradeRequest) -> Result<GradeRecord, AppError>;
    async fn list(&self, owner: &str) -> Result<Vec<GradeRecord>, AppError>;
    /// Hard delete; grade records have no trash.
    async fn delete(&self, owner: &str, id: &str) -> Result<(), AppError>;

    /// Cumulative GPA over whatever records exist right now.
    async fn summary(&self, owner: &str) -> Result<GpaSummary, AppError> {
        let records = self.list(owner).await?;
        Ok(cumulative_gpa(&records))
    }
}

pub struct SqliteGradeStore {
    db: SqlitePool,
}

impl SqliteGradeStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GradeStore for SqliteGradeStore {
    async fn create(&self, owner: &str, req: NewGradeRequest) -> Result<GradeRecord, AppError> {
        let course = required("course", req.course)?;
        let score = req.score.ok_or_else(|| AppError::invalid("score is required"))?;
        let credit_hours = match req.credit_hours {
            Some(hours) if hours.is_finite() && hours > 0.0 => hours,
            Some(_) => return Err(AppError::invalid("creditHours must be a positive number")),
            None => return Err(AppError::invalid("creditHours is required")),
        };

        let band = band_for(score);
        let record = GradeRecord {
            id: new_id(),
            owner_id: owner.to_string(),
            course,
            score,
            credit_hours,
            grade: band.grade,
            gpa: band.points,
            created_at: now_timestamp(),
        };

        sqlx::query(
            r#"
            INSERT INTO grades
                (id, owner_id, course, score, credit_hours, grade, gpa, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&record.id)
        .bind(&record.owner_id)
        .bind(&record.course)
        .bind(record.score)
        .bind(record.credit_hours)
        .bind(record.grade.as_str())
        .bind(record.gpa)
        .bind(&record.created_at)
        .execute(&self.db)
        .await?;

        info!(
            "recorded {} ({}) for {} in {}",
            record.grade, record.score, owner, record.course
        );
        Ok(record)
    }

    async fn list(&self, owner: &str) -> Result<Vec<GradeRecord>, AppError> {
        let records = sqlx::query_as::<_, GradeRecord>(
            r#"
            SELECT id, owner_id, course, score, credit_hours, grade, gpa, created_at
            FROM grades
            WHERE owner_id = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.db)
        .await?;

        debug!("listed {} grade records for {}", records.len(), owner);
        Ok(records)
    }

    async fn delete(&self, owner: &str, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM grades WHERE id = ?1 AND owner_id = ?2")
            .bind(id)
            .bind(owner)
            .execute(&self.db)
            .await?
            .rows_affected();

        if result == 0 {
            return Err(AppError::NotFound);
        }
        info!("deleted grade record {} for {}", id, owner);
        Ok(())
    }
}
