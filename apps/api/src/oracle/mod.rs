/// Scoring Oracle Client — the single point of entry for all scoring-model
/// calls in the engine.
///
/// ARCHITECTURAL RULE: No other module may call the model endpoint directly.
/// The oracle is a stateless, replaceable black box behind this contract:
/// prompt in, skill-evidence map out.
///
/// Model: claude-sonnet-4-5 (hardcoded — do not make configurable to prevent drift)
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};

pub mod parse;
pub mod prompts;

use crate::models::candidate::CandidateRow;
use crate::models::job::{JobPostRow, SkillRequirement};
use parse::SkillEvidence;

const ORACLE_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all scoring calls.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 1024;

/// Transport-level retries beyond the first attempt. Parse failures are
/// never retried — the same prompt yields the same malformed prose.
const MAX_TRANSPORT_RETRIES: u32 = 2;
const BACKOFF_BASE_MS: u64 = 500;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("oracle unavailable after {attempts} attempts: {last_error}")]
    Unavailable { attempts: u32, last_error: String },

    #[error("oracle rejected credentials")]
    Unauthenticated,

    #[error("oracle call exceeded its deadline")]
    Timeout,

    #[error("oracle returned no content")]
    EmptyResponse,

    #[error("oracle reply is malformed: {reason}")]
    MalformedResponse { reason: String },
}

impl OracleError {
    /// Transient transport conditions only. Everything else is surfaced
    /// immediately — retrying a deterministic reply changes nothing.
    fn is_retryable(&self) -> bool {
        matches!(self, OracleError::Http(_) | OracleError::Api { .. })
    }
}

#[derive(Debug, Serialize)]
struct OracleRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<OracleMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct OracleMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct OracleResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl OracleResponse {
    /// Extracts the text content from the first text block.
    fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct OracleApiError {
    error: OracleApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OracleApiErrorBody {
    message: String,
}

/// Seam for the scoring call, so lifecycle and scoring-run code can be
/// exercised without the network. Held in `AppState` as
/// `Arc<dyn EvidenceScorer>`; `OracleClient` is the production impl.
#[async_trait]
pub trait EvidenceScorer: Send + Sync {
    async fn score(
        &self,
        job: &JobPostRow,
        candidate: &CandidateRow,
        deadline: Duration,
    ) -> Result<SkillEvidence, OracleError>;
}

/// HTTP client for the external scoring model.
/// One logical scoring request per (job post, candidate) pair.
#[derive(Clone)]
pub struct OracleClient {
    client: Client,
    api_key: String,
}

impl OracleClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Makes the raw model call, retrying transient transport failures with
    /// exponential backoff and full jitter under the caller's deadline.
    /// Deadline expiry cancels the in-flight request and never retries.
    async fn call_text(
        &self,
        prompt: &str,
        system: &str,
        deadline: Duration,
    ) -> Result<String, OracleError> {
        let request_body = OracleRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![OracleMessage {
                role: "user",
                content: prompt,
            }],
        };

        let started = Instant::now();
        let mut last_error: Option<OracleError> = None;

        for attempt in 0..=MAX_TRANSPORT_RETRIES {
            if attempt > 0 {
                let delay = backoff_delay(attempt);
                warn!(
                    "oracle call attempt {} failed, retrying after {}ms",
                    attempt,
                    delay.as_millis()
                );
                let remaining = deadline
                    .checked_sub(started.elapsed())
                    .ok_or(OracleError::Timeout)?;
                tokio::time::sleep(delay.min(remaining)).await;
            }

            let remaining = deadline
                .checked_sub(started.elapsed())
                .ok_or(OracleError::Timeout)?;

            // Timing out drops the attempt future, which aborts the
            // outbound request.
            match tokio::time::timeout(remaining, self.attempt(&request_body)).await {
                Err(_) => return Err(OracleError::Timeout),
                Ok(Ok(text)) => return Ok(text),
                Ok(Err(e)) if e.is_retryable() => {
                    warn!("oracle transport failure: {e}");
                    last_error = Some(e);
                }
                Ok(Err(e)) => return Err(e),
            }
        }

        Err(OracleError::Unavailable {
            attempts: MAX_TRANSPORT_RETRIES + 1,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    async fn attempt(&self, body: &OracleRequest<'_>) -> Result<String, OracleError> {
        let response = self
            .client
            .post(ORACLE_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(OracleError::Unauthenticated);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OracleApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(OracleError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: OracleResponse = response.json().await?;

        debug!(
            "oracle call succeeded: input_tokens={}, output_tokens={}",
            parsed.usage.input_tokens, parsed.usage.output_tokens
        );

        parsed
            .text()
            .map(str::to_owned)
            .ok_or(OracleError::EmptyResponse)
    }
}

#[async_trait]
impl EvidenceScorer for OracleClient {
    async fn score(
        &self,
        job: &JobPostRow,
        candidate: &CandidateRow,
        deadline: Duration,
    ) -> Result<SkillEvidence, OracleError> {
        let prompt = prompts::build_scoring_prompt(job, candidate);
        let text = self
            .call_text(&prompt, prompts::SCORING_SYSTEM, deadline)
            .await?;
        evidence_from_reply(&text, &job.skills)
    }
}

/// Validates and parses a raw oracle reply into skill evidence.
fn evidence_from_reply(
    text: &str,
    requirements: &[SkillRequirement],
) -> Result<SkillEvidence, OracleError> {
    if text.trim().is_empty() {
        return Err(OracleError::EmptyResponse);
    }
    parse::extract_evidence(text, requirements)
        .map_err(|e| OracleError::MalformedResponse {
            reason: e.to_string(),
        })
}

/// Full-jitter exponential backoff: uniform in [0, base * 2^(attempt-1)].
fn backoff_delay(attempt: u32) -> Duration {
    let cap_ms = BACKOFF_BASE_MS * 2u64.pow(attempt.saturating_sub(1));
    let jittered = rand::thread_rng().gen_range(0..=cap_ms);
    Duration::from_millis(jittered)
}
