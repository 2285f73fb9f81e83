use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A candidate as produced by upstream profile extraction.
/// `profile` is the structured-text summary handed to the scoring oracle.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub full_name: String,
    pub headline: Option<String>,
    pub profile: String,
    pub created_at: DateTime<Utc>,
}
