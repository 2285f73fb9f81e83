//! Feedback submission and aggregation.
//!
//! Feedback is a signed vote (-1 or 1) on a match, allowed while the match
//! is interviewing or completed. Re-submitting the same value is a no-op;
//! a different value overwrites as a correction — last write wins, the
//! engine never averages conflicting feedback. Aggregates count final
//! values only; recalibrating scoring weights from them is an external,
//! offline process.

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use super::store::MatchStore;
use super::TransitionError;
use crate::errors::AppError;
use crate::models::match_record::{MatchRecordRow, MatchStatus};

/// Signed feedback totals across a job post's matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeedbackSummary {
    pub positive_count: u32,
    pub negative_count: u32,
}

/// Records feedback on a match via compare-and-swap.
pub async fn submit_feedback(
    store: &dyn MatchStore,
    id: Uuid,
    value: i16,
) -> Result<MatchRecordRow, AppError> {
    if value != -1 && value != 1 {
        return Err(TransitionError::InvalidFeedbackValue { value }.into());
    }

    let record = store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Match {id} not found")))?;

    if !matches!(
        record.status,
        MatchStatus::Interviewing | MatchStatus::Completed
    ) {
        return Err(TransitionError::FeedbackNotAllowed {
            current: record.status,
        }
        .into());
    }

    // Idempotent re-submission.
    if record.feedback == Some(value) {
        return Ok(record);
    }

    let mut updated = record.clone();
    updated.feedback = Some(value);
    updated.version += 1;
    updated.updated_at = Utc::now();

    if store.compare_and_swap(record.version, &updated).await? {
        return Ok(updated);
    }

    // A concurrent writer won the race; only an identical value resolves
    // cleanly, anything else is for the caller to reload and retry.
    let reloaded = store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Match {id} not found")))?;
    if reloaded.feedback == Some(value) {
        Ok(reloaded)
    } else {
        Err(TransitionError::StaleTransition.into())
    }
}

/// Folds final feedback values into per-job totals.
pub fn summarize_feedback(records: &[MatchRecordRow]) -> FeedbackSummary {
    let mut summary = FeedbackSummary::default();
    for record in records {
        match record.feedback {
            Some(1) => summary.positive_count += 1,
            Some(-1) => summary.negative_count += 1,
            _ => {}
        }
    }
    summary
}
