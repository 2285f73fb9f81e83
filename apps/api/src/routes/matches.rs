//! Match endpoints — a thin edge over the engine contracts. Each handler
//! maps one-to-one onto a scoring run, a lifecycle transition, or a
//! feedback operation, and returns the updated match record.

use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::lifecycle::feedback::{submit_feedback, summarize_feedback, FeedbackSummary};
use crate::lifecycle::store::MatchStore;
use crate::lifecycle::{apply_transition, TransitionEvent};
use crate::matching::run::{fetch_candidate, fetch_job, score_pair};
use crate::models::match_record::MatchRecordRow;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ScoreRequest {
    pub job_post_id: Uuid,
    pub candidate_id: Uuid,
}

#[derive(Deserialize)]
pub struct CompleteRequest {
    #[serde(default)]
    pub feedback: Option<i16>,
}

#[derive(Deserialize)]
pub struct FeedbackRequest {
    pub value: i16,
}

/// POST /api/v1/matches/score
pub async fn handle_score(
    State(state): State<AppState>,
    Json(req): Json<ScoreRequest>,
) -> Result<Json<MatchRecordRow>, AppError> {
    let job = fetch_job(&state.db, req.job_post_id).await?;
    let candidate = fetch_candidate(&state.db, req.candidate_id).await?;
    let deadline = Duration::from_millis(state.config.oracle_timeout_ms);

    let record = score_pair(
        state.store.as_ref(),
        state.oracle.as_ref(),
        &state.oracle_permits,
        deadline,
        &job,
        &candidate,
    )
    .await?;
    Ok(Json(record))
}

/// GET /api/v1/matches/:id
pub async fn handle_get_match(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchRecordRow>, AppError> {
    let record = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Match {id} not found")))?;
    Ok(Json(record))
}

/// POST /api/v1/matches/:id/confirm
pub async fn handle_confirm(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchRecordRow>, AppError> {
    let record = apply_transition(
        state.store.as_ref(),
        state.notifier.clone(),
        id,
        TransitionEvent::ConfirmInterview,
    )
    .await?;
    Ok(Json(record))
}

/// POST /api/v1/matches/:id/decline
pub async fn handle_decline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchRecordRow>, AppError> {
    let record = apply_transition(
        state.store.as_ref(),
        state.notifier.clone(),
        id,
        TransitionEvent::Decline,
    )
    .await?;
    Ok(Json(record))
}

/// POST /api/v1/matches/:id/complete
pub async fn handle_complete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CompleteRequest>,
) -> Result<Json<MatchRecordRow>, AppError> {
    let record = apply_transition(
        state.store.as_ref(),
        state.notifier.clone(),
        id,
        TransitionEvent::Complete {
            feedback: req.feedback,
        },
    )
    .await?;
    Ok(Json(record))
}

/// POST /api/v1/matches/:id/feedback
pub async fn handle_feedback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<FeedbackRequest>,
) -> Result<Json<MatchRecordRow>, AppError> {
    let record = submit_feedback(state.store.as_ref(), id, req.value).await?;
    Ok(Json(record))
}

/// GET /api/v1/jobs/:id/feedback
pub async fn handle_job_feedback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FeedbackSummary>, AppError> {
    let records = state.store.list_by_job(id).await?;
    Ok(Json(summarize_feedback(&records)))
}
