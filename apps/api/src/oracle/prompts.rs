// Prompt constants for the scoring oracle. The reply contract is a single
// JSON object mapping skill name to an evidence float in [0,1]; the parser
// in `oracle::parse` tolerates prose and fences anyway.

use crate::models::candidate::CandidateRow;
use crate::models::job::{JobPostRow, SkillKind};

/// System prompt for skill-evidence scoring — enforces JSON-only output.
pub const SCORING_SYSTEM: &str = "You are an expert technical recruiter assessing \
    how strongly a candidate's profile evidences each required skill. \
    You MUST respond with valid JSON only — a single JSON object. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Scoring prompt template. Replace `{job_title}`, `{job_description}`,
/// `{skill_list}`, `{candidate_profile}` before sending.
const SCORING_PROMPT_TEMPLATE: &str = r#"Assess the candidate below against each required skill of the job post.

For EVERY skill, estimate the strength of evidence in the candidate's profile
as a float between 0.0 (no evidence) and 1.0 (strong, direct evidence).

Return a JSON object with EXACTLY one member per skill, keyed by the skill
name as written in the list (copy it verbatim, including capitalization):
{
  "Rust": 0.9,
  "SQL": 0.3
}

Rules:
1. Use ONLY the skill names from the list — no extra keys, no renaming
2. Score from profile evidence only — never assume unstated experience
3. Omitting a skill is treated as 0.0; prefer an explicit low score
4. Values outside [0.0, 1.0] are invalid

JOB TITLE:
{job_title}

JOB DESCRIPTION:
{job_description}

REQUIRED SKILLS:
{skill_list}

CANDIDATE PROFILE:
{candidate_profile}"#;

/// Builds the full scoring prompt for a (job post, candidate) pair.
pub fn build_scoring_prompt(job: &JobPostRow, candidate: &CandidateRow) -> String {
    let skill_list = job
        .skills
        .iter()
        .map(|s| {
            let kind = match s.kind {
                SkillKind::Hard => "hard",
                SkillKind::Soft => "soft",
            };
            format!("- {} ({kind}, weight {})", s.name, s.weight)
        })
        .collect::<Vec<_>>()
        .join("\n");

    let profile = match &candidate.headline {
        Some(headline) => format!("{}\n{}\n\n{}", candidate.full_name, headline, candidate.profile),
        None => format!("{}\n\n{}", candidate.full_name, candidate.profile),
    };

    SCORING_PROMPT_TEMPLATE
        .replace("{job_title}", &job.title)
        .replace("{job_description}", &job.description)
        .replace("{skill_list}", &skill_list)
        .replace("{candidate_profile}", &profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sqlx::types::Json;
    use uuid::Uuid;

    use crate::models::job::SkillRequirement;

    #[test]
    fn test_prompt_contains_skills_and_profile() {
        let job = JobPostRow {
            id: Uuid::new_v4(),
            title: "Backend Engineer".to_string(),
            description: "Build services.".to_string(),
            skills: Json(vec![
                SkillRequirement {
                    name: "Go".to_string(),
                    weight: 8,
                    kind: SkillKind::Hard,
                },
                SkillRequirement {
                    name: "Mentoring".to_string(),
                    weight: 3,
                    kind: SkillKind::Soft,
                },
            ]),
            created_at: Utc::now(),
        };
        let candidate = CandidateRow {
            id: Uuid::new_v4(),
            full_name: "Ada Example".to_string(),
            headline: Some("Staff engineer".to_string()),
            profile: "Ten years of Go in production.".to_string(),
            created_at: Utc::now(),
        };

        let prompt = build_scoring_prompt(&job, &candidate);
        assert!(prompt.contains("- Go (hard, weight 8)"));
        assert!(prompt.contains("- Mentoring (soft, weight 3)"));
        assert!(prompt.contains("Backend Engineer"));
        assert!(prompt.contains("Ten years of Go in production."));
        assert!(prompt.contains("Staff engineer"));
        assert!(!prompt.contains("{skill_list}"));
    }
}
