//! Evidence extraction from free-form oracle replies.
//!
//! The oracle is prompted for a bare JSON object mapping skill name to an
//! evidence float, but models wrap payloads in prose or markdown fences
//! often enough that the parser must dig the object out itself. The result
//! is an explicit parse outcome — callers handle malformed output, they
//! never see an exception-style surprise.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::models::job::SkillRequirement;

/// Per-candidate evidence strengths keyed by skill name, each in [0,1].
/// Transient — recomputed per scoring run, never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillEvidence {
    scores: HashMap<String, f64>,
}

impl SkillEvidence {
    /// Evidence for a skill; 0 when the oracle was silent about it.
    pub fn get(&self, skill: &str) -> f64 {
        self.scores.get(skill).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, f64)]) -> Self {
        Self {
            scores: pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("no JSON object recoverable from oracle reply")]
    NoJsonObject,
}

/// Extracts a skill→evidence map from an oracle reply.
///
/// - Markdown fences are stripped, then the first balanced `{...}` that
///   parses as JSON wins.
/// - Skill names not present in `requirements` are dropped, not errors.
/// - Evidence values are clamped to [0,1]; non-numeric members are ignored
///   (equivalent to the oracle staying silent about that skill).
pub fn extract_evidence(
    text: &str,
    requirements: &[SkillRequirement],
) -> Result<SkillEvidence, ParseFailure> {
    let text = strip_json_fences(text);
    let object = extract_json_object(text).ok_or(ParseFailure::NoJsonObject)?;

    let known: HashSet<&str> = requirements.iter().map(|r| r.name.as_str()).collect();
    let mut scores = HashMap::new();
    for (skill, value) in &object {
        if !known.contains(skill.as_str()) {
            continue;
        }
        if let Some(raw) = value.as_f64() {
            scores.insert(skill.clone(), raw.clamp(0.0, 1.0));
        }
    }

    Ok(SkillEvidence { scores })
}

/// Finds the first balanced `{...}` span that parses as a JSON object.
fn extract_json_object(text: &str) -> Option<serde_json::Map<String, serde_json::Value>> {
    let mut from = 0;
    while let Some(pos) = text[from..].find('{') {
        let start = from + pos;
        if let Some(span) = balanced_object(&text[start..]) {
            if let Ok(serde_json::Value::Object(object)) = serde_json::from_str(span) {
                return Some(object);
            }
        }
        from = start + 1;
    }
    None
}

/// Returns the prefix of `text` (which starts at `{`) up to the matching
/// closing brace, respecting string literals and escapes.
fn balanced_object(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in text.bytes().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Strips ```json ... ``` or ``` ... ``` code fences from oracle output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::SkillKind;

    fn reqs(names: &[&str]) -> Vec<SkillRequirement> {
        names
            .iter()
            .map(|n| SkillRequirement {
                name: n.to_string(),
                weight: 5,
                kind: SkillKind::Hard,
            })
            .collect()
    }

    #[test]
    fn test_bare_json_object() {
        let evidence = extract_evidence(r#"{"Go": 0.9, "SQL": 0.4}"#, &reqs(&["Go", "SQL"])).unwrap();
        assert_eq!(evidence.get("Go"), 0.9);
        assert_eq!(evidence.get("SQL"), 0.4);
    }

    #[test]
    fn test_json_wrapped_in_prose() {
        let text = r#"Here you go: {"Go": 0.9, "Unknown skill": 0.5}"#;
        let evidence = extract_evidence(text, &reqs(&["Go", "SQL"])).unwrap();
        assert_eq!(evidence.get("Go"), 0.9);
        // Unknown skills are dropped, not errors.
        assert_eq!(evidence.len(), 1);
        // Requirements the oracle was silent about read as 0.
        assert_eq!(evidence.get("SQL"), 0.0);
    }

    #[test]
    fn test_json_in_markdown_fences() {
        let text = "```json\n{\"Go\": 0.7}\n```";
        let evidence = extract_evidence(text, &reqs(&["Go"])).unwrap();
        assert_eq!(evidence.get("Go"), 0.7);
    }

    #[test]
    fn test_prose_brace_before_payload() {
        let text = r#"Scores below {not json} then {"Go": 0.5}"#;
        let evidence = extract_evidence(text, &reqs(&["Go"])).unwrap();
        assert_eq!(evidence.get("Go"), 0.5);
    }

    #[test]
    fn test_evidence_clamped_to_unit_interval() {
        let text = r#"{"Go": 1.7, "SQL": -0.3}"#;
        let evidence = extract_evidence(text, &reqs(&["Go", "SQL"])).unwrap();
        assert_eq!(evidence.get("Go"), 1.0);
        assert_eq!(evidence.get("SQL"), 0.0);
    }

    #[test]
    fn test_non_numeric_member_ignored() {
        let text = r#"{"Go": "strong", "SQL": 0.6}"#;
        let evidence = extract_evidence(text, &reqs(&["Go", "SQL"])).unwrap();
        assert_eq!(evidence.get("Go"), 0.0);
        assert_eq!(evidence.get("SQL"), 0.6);
    }

    #[test]
    fn test_no_json_object_is_a_parse_failure() {
        let err = extract_evidence("I cannot help with that.", &reqs(&["Go"])).unwrap_err();
        assert_eq!(err, ParseFailure::NoJsonObject);
    }

    #[test]
    fn test_unclosed_brace_is_a_parse_failure() {
        let err = extract_evidence(r#"{"Go": 0.9"#, &reqs(&["Go"])).unwrap_err();
        assert_eq!(err, ParseFailure::NoJsonObject);
    }

    #[test]
    fn test_braces_inside_strings_do_not_confuse_the_scanner() {
        let text = r#"{"Go": 0.9, "note": "uses {braces} and \"quotes\""}"#;
        let evidence = extract_evidence(text, &reqs(&["Go"])).unwrap();
        assert_eq!(evidence.get("Go"), 0.9);
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": 1}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": 1}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": 1}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": 1}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": 1}";
        assert_eq!(strip_json_fences(input), "{\"key\": 1}");
    }
}
