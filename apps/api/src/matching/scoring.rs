//! Composite match scoring.
//!
//! `composite = Σ(weight · evidence) / Σ(weight)`, bounded to [0,1] because
//! every evidence value is clamped to [0,1] upstream. Hard and soft skills
//! use the identical formula — kind is display metadata, not a multiplier.

use crate::matching::ScoreError;
use crate::models::job::SkillRequirement;
use crate::models::match_record::ScoreBreakdown;
use crate::oracle::parse::SkillEvidence;

/// Scoring output before a MatchRecord exists: the composite plus the
/// per-skill breakdown, in requirement order.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchDraft {
    pub composite_score: f64,
    pub breakdown: Vec<ScoreBreakdown>,
}

/// Combines oracle evidence with skill weights into a composite score.
///
/// Deterministic for fixed inputs: breakdown order follows requirement
/// order, and every requirement appears exactly once — skills the oracle
/// was silent about contribute with evidence 0.
pub fn compute_match(
    requirements: &[SkillRequirement],
    evidence: &SkillEvidence,
) -> Result<MatchDraft, ScoreError> {
    let total_weight: i64 = requirements.iter().map(|r| i64::from(r.weight)).sum();
    // Unreachable after validate_requirements.
    if total_weight == 0 {
        return Err(ScoreError::DegenerateWeights);
    }

    let mut breakdown = Vec::with_capacity(requirements.len());
    let mut total_contribution = 0.0_f64;

    for req in requirements {
        let evidence_score = evidence.get(&req.name);
        let contribution = f64::from(req.weight) * evidence_score;
        total_contribution += contribution;
        breakdown.push(ScoreBreakdown {
            skill: req.name.clone(),
            weight: req.weight,
            evidence_score,
            contribution,
        });
    }

    Ok(MatchDraft {
        composite_score: total_contribution / total_weight as f64,
        breakdown,
    })
}
