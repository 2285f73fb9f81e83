//! Skill model validation. Pure — no side effects, no I/O.

use crate::matching::ScoreError;
use crate::models::job::SkillRequirement;

pub const MIN_WEIGHT: i16 = 1;
pub const MAX_WEIGHT: i16 = 10;

/// Validates a job post's skill requirement set before any scoring run.
/// A job post must declare at least one skill to be matchable.
pub fn validate_requirements(requirements: &[SkillRequirement]) -> Result<(), ScoreError> {
    if requirements.is_empty() {
        return Err(ScoreError::NoRequirements);
    }
    for req in requirements {
        if req.name.trim().is_empty() {
            return Err(ScoreError::EmptySkillName);
        }
        if !(MIN_WEIGHT..=MAX_WEIGHT).contains(&req.weight) {
            return Err(ScoreError::InvalidSkillWeight {
                skill: req.name.clone(),
                weight: req.weight,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::SkillKind;

    fn req(name: &str, weight: i16) -> SkillRequirement {
        SkillRequirement {
            name: name.to_string(),
            weight,
            kind: SkillKind::Hard,
        }
    }

    #[test]
    fn test_valid_requirements_pass() {
        let reqs = vec![req("Rust", 1), req("SQL", 10), req("Mentoring", 5)];
        assert_eq!(validate_requirements(&reqs), Ok(()));
    }

    #[test]
    fn test_empty_list_rejected() {
        assert_eq!(validate_requirements(&[]), Err(ScoreError::NoRequirements));
    }

    #[test]
    fn test_blank_name_rejected() {
        let reqs = vec![req("Rust", 5), req("   ", 5)];
        assert_eq!(validate_requirements(&reqs), Err(ScoreError::EmptySkillName));
    }

    #[test]
    fn test_weight_zero_rejected() {
        let reqs = vec![req("Rust", 0)];
        assert_eq!(
            validate_requirements(&reqs),
            Err(ScoreError::InvalidSkillWeight {
                skill: "Rust".to_string(),
                weight: 0
            })
        );
    }

    #[test]
    fn test_weight_eleven_rejected() {
        let reqs = vec![req("Rust", 11)];
        assert_eq!(
            validate_requirements(&reqs),
            Err(ScoreError::InvalidSkillWeight {
                skill: "Rust".to_string(),
                weight: 11
            })
        );
    }

    #[test]
    fn test_negative_weight_rejected() {
        let reqs = vec![req("Rust", -3)];
        assert!(matches!(
            validate_requirements(&reqs),
            Err(ScoreError::InvalidSkillWeight { weight: -3, .. })
        ));
    }
}
