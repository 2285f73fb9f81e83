//! Post-confirmation notification seam.
//!
//! Delivery transport (email, calendar) is an external collaborator. The
//! engine fires the event after a successful interview confirmation and
//! never waits on or rolls back for delivery.

use async_trait::async_trait;
use tracing::info;

use crate::models::match_record::MatchRecordRow;

/// Carried in `AppState` as `Arc<dyn Notifier>`.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn interview_confirmed(&self, record: &MatchRecordRow);
}

/// Default notifier: emits a structured log event. Swap for a real
/// transport at startup without touching lifecycle code.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn interview_confirmed(&self, record: &MatchRecordRow) {
        info!(
            match_id = %record.id,
            job_post_id = %record.job_post_id,
            candidate_id = %record.candidate_id,
            "interview confirmed, notification dispatched"
        );
    }
}
