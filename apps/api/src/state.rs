use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::Semaphore;

use crate::config::Config;
use crate::lifecycle::store::MatchStore;
use crate::notify::Notifier;
use crate::oracle::EvidenceScorer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Scoring oracle seam. Production: `OracleClient`.
    pub oracle: Arc<dyn EvidenceScorer>,
    /// Match record store seam. Production: `PgMatchStore`.
    pub store: Arc<dyn MatchStore>,
    /// Post-confirmation notification seam. Default: `LogNotifier`.
    pub notifier: Arc<dyn Notifier>,
    /// Caps in-flight oracle calls (ORACLE_MAX_IN_FLIGHT); scoring runs
    /// beyond the cap queue on a permit rather than fail.
    pub oracle_permits: Arc<Semaphore>,
}
