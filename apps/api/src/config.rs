use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Deadline for one logical oracle scoring call, retries included.
    pub oracle_timeout_ms: u64,
    /// Cap on concurrent in-flight oracle calls; runs beyond it queue.
    pub oracle_max_in_flight: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            oracle_timeout_ms: std::env::var("ORACLE_TIMEOUT_MS")
                .unwrap_or_else(|_| "30000".to_string())
                .parse::<u64>()
                .context("ORACLE_TIMEOUT_MS must be a duration in milliseconds")?,
            oracle_max_in_flight: std::env::var("ORACLE_MAX_IN_FLIGHT")
                .unwrap_or_else(|_| "4".to_string())
                .parse::<usize>()
                .context("ORACLE_MAX_IN_FLIGHT must be a positive integer")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
