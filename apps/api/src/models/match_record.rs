use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle status of a match. `completed` and `declined` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "match_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Proposed,
    Interviewing,
    Completed,
    Declined,
}

impl MatchStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Declined)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchStatus::Proposed => "proposed",
            MatchStatus::Interviewing => "interviewing",
            MatchStatus::Completed => "completed",
            MatchStatus::Declined => "declined",
        };
        f.write_str(s)
    }
}

/// Per-skill scoring detail. One entry per job-post requirement, in
/// requirement order; skills without evidence appear with score 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub skill: String,
    pub weight: i16,
    pub evidence_score: f64,
    /// weight * evidence_score
    pub contribution: f64,
}

/// One match per (job_post_id, candidate_id) pair — the engine enforces
/// this, storage backs it with a unique index. Mutated only through
/// lifecycle transitions; `version` is the optimistic-concurrency token.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MatchRecordRow {
    pub id: Uuid,
    pub job_post_id: Uuid,
    pub candidate_id: Uuid,
    pub composite_score: f64,
    pub breakdown: Json<Vec<ScoreBreakdown>>,
    pub status: MatchStatus,
    /// -1 or 1 once recorded; corrections overwrite (last write wins).
    pub feedback: Option<i16>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
