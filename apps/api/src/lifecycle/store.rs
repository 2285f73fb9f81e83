//! Record store seam for match records.
//!
//! Lifecycle code never touches the database directly — it goes through
//! `MatchStore`, whose only write primitives are insert and a
//! compare-and-swap keyed by `version`. Unrelated records proceed fully in
//! parallel; there are no long-lived locks.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::match_record::MatchRecordRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A record for the (job post, candidate) pair already exists.
    DuplicatePair,
}

#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<MatchRecordRow>, AppError>;

    async fn find_by_pair(
        &self,
        job_post_id: Uuid,
        candidate_id: Uuid,
    ) -> Result<Option<MatchRecordRow>, AppError>;

    /// Inserts a new record, reporting (not failing on) a pair collision so
    /// the caller can recover the winner of an insert race.
    async fn insert(&self, record: &MatchRecordRow) -> Result<InsertOutcome, AppError>;

    /// Writes `record` only if the stored version still equals
    /// `expected_version`. `Ok(false)` signals a version conflict.
    async fn compare_and_swap(
        &self,
        expected_version: i32,
        record: &MatchRecordRow,
    ) -> Result<bool, AppError>;

    async fn list_by_job(&self, job_post_id: Uuid) -> Result<Vec<MatchRecordRow>, AppError>;
}

/// Postgres-backed store. The unique index on (job_post_id, candidate_id)
/// backs the one-record-per-pair invariant at the storage layer.
pub struct PgMatchStore {
    pool: PgPool,
}

impl PgMatchStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MatchStore for PgMatchStore {
    async fn get(&self, id: Uuid) -> Result<Option<MatchRecordRow>, AppError> {
        Ok(
            sqlx::query_as::<_, MatchRecordRow>("SELECT * FROM matches WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_by_pair(
        &self,
        job_post_id: Uuid,
        candidate_id: Uuid,
    ) -> Result<Option<MatchRecordRow>, AppError> {
        Ok(sqlx::query_as::<_, MatchRecordRow>(
            "SELECT * FROM matches WHERE job_post_id = $1 AND candidate_id = $2",
        )
        .bind(job_post_id)
        .bind(candidate_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert(&self, record: &MatchRecordRow) -> Result<InsertOutcome, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO matches
                (id, job_post_id, candidate_id, composite_score, breakdown,
                 status, feedback, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(record.id)
        .bind(record.job_post_id)
        .bind(record.candidate_id)
        .bind(record.composite_score)
        .bind(&record.breakdown)
        .bind(record.status)
        .bind(record.feedback)
        .bind(record.version)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::DuplicatePair),
            Err(e) => Err(e.into()),
        }
    }

    async fn compare_and_swap(
        &self,
        expected_version: i32,
        record: &MatchRecordRow,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE matches
            SET composite_score = $1, breakdown = $2, status = $3,
                feedback = $4, version = $5, updated_at = $6
            WHERE id = $7 AND version = $8
            "#,
        )
        .bind(record.composite_score)
        .bind(&record.breakdown)
        .bind(record.status)
        .bind(record.feedback)
        .bind(record.version)
        .bind(record.updated_at)
        .bind(record.id)
        .bind(expected_version)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_by_job(&self, job_post_id: Uuid) -> Result<Vec<MatchRecordRow>, AppError> {
        Ok(sqlx::query_as::<_, MatchRecordRow>(
            "SELECT * FROM matches WHERE job_post_id = $1 ORDER BY created_at",
        )
        .bind(job_post_id)
        .fetch_all(&self.pool)
        .await?)
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}
