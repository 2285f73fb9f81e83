//! Scoring run orchestration.
//!
//! Each run is an independent unit of work for one (job post, candidate)
//! pair: validate the job's skill set, ask the oracle for evidence under a
//! deadline, fold evidence into a composite score, and create the match
//! record in `proposed`. Runs share no mutable in-process state; the only
//! shared resource is the record store.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use tokio::sync::Semaphore;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::lifecycle::store::{InsertOutcome, MatchStore};
use crate::matching::scoring::compute_match;
use crate::matching::skills::validate_requirements;
use crate::models::candidate::CandidateRow;
use crate::models::job::JobPostRow;
use crate::models::match_record::{MatchRecordRow, MatchStatus};
use crate::oracle::EvidenceScorer;

pub async fn fetch_job(pool: &PgPool, id: Uuid) -> Result<JobPostRow, AppError> {
    sqlx::query_as::<_, JobPostRow>("SELECT * FROM job_posts WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job post {id} not found")))
}

pub async fn fetch_candidate(pool: &PgPool, id: Uuid) -> Result<CandidateRow, AppError> {
    sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {id} not found")))
}

/// Scores a (job post, candidate) pair and creates its match record.
///
/// A pair that already has a record gets it back unchanged — records
/// mutate only through lifecycle transitions, re-scoring never rewrites.
/// `permits` caps in-flight oracle calls; runs beyond the cap queue here
/// rather than fail.
pub async fn score_pair(
    store: &dyn MatchStore,
    scorer: &dyn EvidenceScorer,
    permits: &Arc<Semaphore>,
    deadline: Duration,
    job: &JobPostRow,
    candidate: &CandidateRow,
) -> Result<MatchRecordRow, AppError> {
    if let Some(existing) = store.find_by_pair(job.id, candidate.id).await? {
        return Ok(existing);
    }

    validate_requirements(&job.skills)?;

    let evidence = {
        let _permit = permits
            .acquire()
            .await
            .map_err(|_| AppError::Internal(anyhow::anyhow!("oracle permit semaphore closed")))?;
        scorer.score(job, candidate, deadline).await?
    };

    let draft = compute_match(&job.skills, &evidence)?;

    let now = Utc::now();
    let record = MatchRecordRow {
        id: Uuid::new_v4(),
        job_post_id: job.id,
        candidate_id: candidate.id,
        composite_score: draft.composite_score,
        breakdown: Json(draft.breakdown),
        status: MatchStatus::Proposed,
        feedback: None,
        version: 1,
        created_at: now,
        updated_at: now,
    };

    match store.insert(&record).await? {
        InsertOutcome::Inserted => {
            info!(
                match_id = %record.id,
                job_post_id = %job.id,
                candidate_id = %candidate.id,
                composite_score = record.composite_score,
                "match record created"
            );
            Ok(record)
        }
        // Lost an insert race to a concurrent run for the same pair.
        InsertOutcome::DuplicatePair => store
            .find_by_pair(job.id, candidate.id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!(
                    "match record vanished after duplicate-pair insert"
                ))
            }),
    }
}
