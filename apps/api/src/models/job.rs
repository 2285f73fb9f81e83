use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Whether a skill is a hard technical requirement or a soft signal.
///
/// Kind is carried through scoring for display and filtering only — both
/// kinds use the identical weight formula. A hard/soft multiplier is a
/// possible extension, deliberately not implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillKind {
    Hard,
    Soft,
}

/// A single weighted skill requirement on a job post.
/// Immutable once the job post's skill set is finalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRequirement {
    pub name: String,
    /// 1..=10, validated before any scoring run.
    pub weight: i16,
    pub kind: SkillKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobPostRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub skills: Json<Vec<SkillRequirement>>,
    pub created_at: DateTime<Utc>,
}
