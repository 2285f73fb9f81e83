use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::lifecycle::TransitionError;
use crate::matching::ScoreError;
use crate::oracle::OracleError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Skill validation error: {0}")]
    Score(#[from] ScoreError),

    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("Lifecycle error: {0}")]
    Transition(#[from] TransitionError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),

            AppError::Score(e) => match e {
                // Unreachable after validation; surfaces as a 500 if it happens.
                ScoreError::DegenerateWeights => {
                    tracing::error!("scoring error: {e}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "DEGENERATE_WEIGHTS",
                        e.to_string(),
                    )
                }
                _ => (StatusCode::BAD_REQUEST, "INVALID_SKILLS", e.to_string()),
            },

            AppError::Oracle(e) => {
                let (status, code) = match e {
                    OracleError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "ORACLE_TIMEOUT"),
                    OracleError::EmptyResponse => {
                        (StatusCode::BAD_GATEWAY, "ORACLE_EMPTY_RESPONSE")
                    }
                    OracleError::MalformedResponse { .. } => {
                        (StatusCode::BAD_GATEWAY, "ORACLE_MALFORMED_RESPONSE")
                    }
                    OracleError::Unauthenticated => {
                        (StatusCode::BAD_GATEWAY, "ORACLE_UNAUTHENTICATED")
                    }
                    _ => (StatusCode::BAD_GATEWAY, "ORACLE_UNAVAILABLE"),
                };
                tracing::error!("oracle error: {e}");
                (status, code, e.to_string())
            }

            // State errors report the current actual status in the message
            // so the caller can reconcile its view.
            AppError::Transition(e) => {
                let (status, code) = match e {
                    TransitionError::StaleTransition => (StatusCode::CONFLICT, "STALE_TRANSITION"),
                    TransitionError::TerminalStateViolation { .. } => {
                        (StatusCode::CONFLICT, "TERMINAL_STATE_VIOLATION")
                    }
                    TransitionError::InvalidTransition { .. } => {
                        (StatusCode::CONFLICT, "INVALID_TRANSITION")
                    }
                    TransitionError::FeedbackNotAllowed { .. } => {
                        (StatusCode::CONFLICT, "FEEDBACK_NOT_ALLOWED")
                    }
                    TransitionError::FeedbackRequired => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "FEEDBACK_REQUIRED")
                    }
                    TransitionError::InvalidFeedbackValue { .. } => {
                        (StatusCode::BAD_REQUEST, "INVALID_FEEDBACK_VALUE")
                    }
                };
                (status, code, e.to_string())
            }

            AppError::Database(e) => {
                tracing::error!("database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }

            AppError::Internal(e) => {
                tracing::error!("internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
