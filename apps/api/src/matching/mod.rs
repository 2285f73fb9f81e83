// Matching engine: skill validation, composite scoring, scoring runs.
// All oracle calls go through the `oracle` module — no direct model calls here.

pub mod run;
pub mod scoring;
pub mod skills;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoreError {
    #[error("job post declares no skill requirements")]
    NoRequirements,

    #[error("skill requirement has an empty name")]
    EmptySkillName,

    #[error("skill '{skill}' has weight {weight}, expected 1..=10")]
    InvalidSkillWeight { skill: String, weight: i16 },

    #[error("total skill weight is zero, composite score undefined")]
    DegenerateWeights,
}
