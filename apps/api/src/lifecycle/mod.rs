//! Match lifecycle state machine.
//!
//! Status only advances forward through the graph:
//!
//! ```text
//! PROPOSED ── confirm_interview ──▶ INTERVIEWING ── complete ──▶ COMPLETED
//!     │                                  │
//!     └────────── decline ──────────────▶┴──────────▶ DECLINED
//! ```
//!
//! The table lives in `next_status` and is matched exhaustively — every
//! (status, event) pair is enumerable and testable, there are no scattered
//! conditional updates. Re-applying an already-applied event is a no-op,
//! never an error. Writes go through the store's compare-and-swap, so
//! transitions serialize per record without any global lock.

pub mod feedback;
pub mod store;

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::match_record::{MatchRecordRow, MatchStatus};
use crate::notify::Notifier;
use store::MatchStore;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("match is in terminal status '{current}', no further transitions allowed")]
    TerminalStateViolation { current: MatchStatus },

    #[error("cannot apply '{event}' to a match in status '{from}'")]
    InvalidTransition {
        from: MatchStatus,
        event: &'static str,
    },

    #[error("match was modified concurrently, reload and retry")]
    StaleTransition,

    #[error("completion requires feedback, none recorded or supplied")]
    FeedbackRequired,

    #[error("feedback is not allowed while match is in status '{current}'")]
    FeedbackNotAllowed { current: MatchStatus },

    #[error("feedback value must be -1 or 1, got {value}")]
    InvalidFeedbackValue { value: i16 },
}

/// External trigger driving a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEvent {
    ConfirmInterview,
    /// Feedback may be supplied atomically with completion when none is
    /// recorded yet.
    Complete { feedback: Option<i16> },
    Decline,
}

/// The transition table. `Ok(None)` is an idempotent no-op: the event was
/// already applied and the record must be returned unchanged.
pub fn next_status(
    record: &MatchRecordRow,
    event: TransitionEvent,
) -> Result<Option<MatchStatus>, TransitionError> {
    if let TransitionEvent::Complete {
        feedback: Some(value),
    } = event
    {
        if value != -1 && value != 1 {
            return Err(TransitionError::InvalidFeedbackValue { value });
        }
    }

    use MatchStatus::*;
    use TransitionEvent::*;

    match (record.status, event) {
        (Completed, _) | (Declined, _) => Err(TransitionError::TerminalStateViolation {
            current: record.status,
        }),
        (Proposed, ConfirmInterview) => Ok(Some(Interviewing)),
        (Interviewing, ConfirmInterview) => Ok(None),
        (Interviewing, Complete { feedback }) => {
            if record.feedback.is_some() || feedback.is_some() {
                Ok(Some(Completed))
            } else {
                Err(TransitionError::FeedbackRequired)
            }
        }
        (Proposed, Complete { .. }) => Err(TransitionError::InvalidTransition {
            from: Proposed,
            event: "complete",
        }),
        (Proposed, Decline) | (Interviewing, Decline) => Ok(Some(Declined)),
    }
}

#[derive(Debug)]
pub(crate) enum Outcome {
    Applied(MatchRecordRow),
    NoOp(MatchRecordRow),
}

/// Applies a lifecycle event to the record as a single atomic
/// read-modify-write. On success returns the stored record; an idempotent
/// re-application returns it unchanged.
pub async fn apply_transition(
    store: &dyn MatchStore,
    notifier: Arc<dyn Notifier>,
    id: Uuid,
    event: TransitionEvent,
) -> Result<MatchRecordRow, AppError> {
    let record = store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Match {id} not found")))?;

    match apply_to_snapshot(store, record, event).await? {
        Outcome::Applied(updated) => {
            if matches!(event, TransitionEvent::ConfirmInterview) {
                // Fire-and-forget: delivery failure never rolls back the
                // transition.
                let confirmed = updated.clone();
                tokio::spawn(async move { notifier.interview_confirmed(&confirmed).await });
            }
            Ok(updated)
        }
        Outcome::NoOp(unchanged) => Ok(unchanged),
    }
}

/// CAS attempt against a specific snapshot. On version conflict the record
/// is reloaded once: if the event is a no-op against the fresh record a
/// concurrent caller already applied it and the reload is returned;
/// otherwise the snapshot was genuinely stale and the caller must reload
/// and retry.
pub(crate) async fn apply_to_snapshot(
    store: &dyn MatchStore,
    record: MatchRecordRow,
    event: TransitionEvent,
) -> Result<Outcome, AppError> {
    let Some(next) = next_status(&record, event)? else {
        return Ok(Outcome::NoOp(record));
    };

    let mut updated = record.clone();
    updated.status = next;
    if let TransitionEvent::Complete {
        feedback: Some(value),
    } = event
    {
        updated.feedback = Some(value);
    }
    updated.version += 1;
    updated.updated_at = Utc::now();

    if store.compare_and_swap(record.version, &updated).await? {
        return Ok(Outcome::Applied(updated));
    }

    let reloaded = store
        .get(record.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Match {} not found", record.id)))?;
    match next_status(&reloaded, event) {
        Ok(None) => Ok(Outcome::NoOp(reloaded)),
        _ => Err(TransitionError::StaleTransition.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::store::testing::{record_fixture, MemoryMatchStore};
    use super::*;
    use crate::notify::testing::RecordingNotifier;

    fn confirm() -> TransitionEvent {
        TransitionEvent::ConfirmInterview
    }

    // ── transition table ────────────────────────────────────────────────

    #[test]
    fn test_confirm_from_proposed_moves_to_interviewing() {
        let record = record_fixture(MatchStatus::Proposed);
        assert_eq!(
            next_status(&record, confirm()),
            Ok(Some(MatchStatus::Interviewing))
        );
    }

    #[test]
    fn test_confirm_from_interviewing_is_a_no_op() {
        let record = record_fixture(MatchStatus::Interviewing);
        assert_eq!(next_status(&record, confirm()), Ok(None));
    }

    #[test]
    fn test_decline_allowed_from_proposed_and_interviewing() {
        for status in [MatchStatus::Proposed, MatchStatus::Interviewing] {
            let record = record_fixture(status);
            assert_eq!(
                next_status(&record, TransitionEvent::Decline),
                Ok(Some(MatchStatus::Declined))
            );
        }
    }

    #[test]
    fn test_complete_requires_feedback() {
        let record = record_fixture(MatchStatus::Interviewing);
        assert_eq!(
            next_status(&record, TransitionEvent::Complete { feedback: None }),
            Err(TransitionError::FeedbackRequired)
        );
    }

    #[test]
    fn test_complete_with_recorded_feedback() {
        let mut record = record_fixture(MatchStatus::Interviewing);
        record.feedback = Some(1);
        assert_eq!(
            next_status(&record, TransitionEvent::Complete { feedback: None }),
            Ok(Some(MatchStatus::Completed))
        );
    }

    #[test]
    fn test_complete_with_atomic_feedback() {
        let record = record_fixture(MatchStatus::Interviewing);
        assert_eq!(
            next_status(&record, TransitionEvent::Complete { feedback: Some(-1) }),
            Ok(Some(MatchStatus::Completed))
        );
    }

    #[test]
    fn test_complete_rejects_out_of_range_feedback() {
        let record = record_fixture(MatchStatus::Interviewing);
        assert_eq!(
            next_status(&record, TransitionEvent::Complete { feedback: Some(2) }),
            Err(TransitionError::InvalidFeedbackValue { value: 2 })
        );
    }

    #[test]
    fn test_complete_from_proposed_is_invalid() {
        let record = record_fixture(MatchStatus::Proposed);
        assert_eq!(
            next_status(&record, TransitionEvent::Complete { feedback: Some(1) }),
            Err(TransitionError::InvalidTransition {
                from: MatchStatus::Proposed,
                event: "complete"
            })
        );
    }

    #[test]
    fn test_terminal_states_reject_every_event() {
        let events = [
            confirm(),
            TransitionEvent::Complete { feedback: Some(1) },
            TransitionEvent::Decline,
        ];
        for status in [MatchStatus::Completed, MatchStatus::Declined] {
            for event in events {
                let record = record_fixture(status);
                assert_eq!(
                    next_status(&record, event),
                    Err(TransitionError::TerminalStateViolation { current: status }),
                    "{status} must reject {event:?}"
                );
            }
        }
    }

    // ── apply_transition ────────────────────────────────────────────────

    #[tokio::test]
    async fn test_confirm_then_idempotent_reconfirm() {
        let record = record_fixture(MatchStatus::Proposed);
        let id = record.id;
        let store = MemoryMatchStore::with_record(record);
        let notifier: Arc<dyn Notifier> = Arc::new(RecordingNotifier::default());

        let first = apply_transition(&store, notifier.clone(), id, confirm())
            .await
            .unwrap();
        assert_eq!(first.status, MatchStatus::Interviewing);
        assert_eq!(first.version, 2);

        let second = apply_transition(&store, notifier, id, confirm())
            .await
            .unwrap();
        assert_eq!(second.status, MatchStatus::Interviewing);
        assert_eq!(second.version, 2, "no-op must not write");
    }

    #[tokio::test]
    async fn test_stale_confirm_resolves_as_no_op() {
        let record = record_fixture(MatchStatus::Proposed);
        let store = MemoryMatchStore::with_record(record.clone());

        // Two callers read the same PROPOSED snapshot.
        let first = apply_to_snapshot(&store, record.clone(), confirm())
            .await
            .unwrap();
        assert!(matches!(first, Outcome::Applied(_)));

        // The loser's CAS fails; the reload shows the event already applied.
        let second = apply_to_snapshot(&store, record, confirm()).await.unwrap();
        match second {
            Outcome::NoOp(r) => {
                assert_eq!(r.status, MatchStatus::Interviewing);
                assert_eq!(r.version, 2);
            }
            Outcome::Applied(_) => panic!("second confirm must not write"),
        }
    }

    #[tokio::test]
    async fn test_stale_snapshot_with_conflicting_event_fails() {
        let record = record_fixture(MatchStatus::Proposed);
        let store = MemoryMatchStore::with_record(record.clone());

        // Another caller declines first.
        let declined = apply_to_snapshot(&store, record.clone(), TransitionEvent::Decline)
            .await
            .unwrap();
        assert!(matches!(declined, Outcome::Applied(_)));

        // The stale confirm cannot resolve idempotently.
        let err = apply_to_snapshot(&store, record, confirm())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Transition(TransitionError::StaleTransition)
        ));
    }

    #[tokio::test]
    async fn test_concurrent_confirms_yield_one_write() {
        let record = record_fixture(MatchStatus::Proposed);
        let id = record.id;
        let store = Arc::new(MemoryMatchStore::with_record(record));
        let notifier: Arc<dyn Notifier> = Arc::new(RecordingNotifier::default());

        let (a, b) = tokio::join!(
            apply_transition(store.as_ref(), notifier.clone(), id, confirm()),
            apply_transition(store.as_ref(), notifier.clone(), id, confirm()),
        );

        let a = a.unwrap();
        let b = b.unwrap();
        assert_eq!(a.status, MatchStatus::Interviewing);
        assert_eq!(b.status, MatchStatus::Interviewing);

        let stored = store.get(id).await.unwrap().unwrap();
        assert_eq!(stored.status, MatchStatus::Interviewing);
        assert_eq!(stored.version, 2, "exactly one write");
    }

    #[tokio::test]
    async fn test_terminal_record_left_unmodified() {
        let record = record_fixture(MatchStatus::Declined);
        let id = record.id;
        let store = MemoryMatchStore::with_record(record.clone());
        let notifier: Arc<dyn Notifier> = Arc::new(RecordingNotifier::default());

        let err = apply_transition(&store, notifier, id, confirm())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Transition(TransitionError::TerminalStateViolation {
                current: MatchStatus::Declined
            })
        ));

        let stored = store.get(id).await.unwrap().unwrap();
        assert_eq!(stored.status, MatchStatus::Declined);
        assert_eq!(stored.version, record.version);
    }

    #[tokio::test]
    async fn test_notifier_fires_once_on_real_confirm_only() {
        let record = record_fixture(MatchStatus::Proposed);
        let id = record.id;
        let store = MemoryMatchStore::with_record(record);
        let recording = Arc::new(RecordingNotifier::default());
        let notifier: Arc<dyn Notifier> = recording.clone();

        apply_transition(&store, notifier.clone(), id, confirm())
            .await
            .unwrap();
        apply_transition(&store, notifier, id, confirm())
            .await
            .unwrap();

        // Let the spawned notification task run.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(recording.confirmed.lock().unwrap().as_slice(), &[id]);
    }

    #[tokio::test]
    async fn test_complete_applies_atomic_feedback() {
        let record = record_fixture(MatchStatus::Interviewing);
        let id = record.id;
        let store = MemoryMatchStore::with_record(record);
        let notifier: Arc<dyn Notifier> = Arc::new(RecordingNotifier::default());

        let updated = apply_transition(
            &store,
            notifier,
            id,
            TransitionEvent::Complete { feedback: Some(1) },
        )
        .await
        .unwrap();
        assert_eq!(updated.status, MatchStatus::Completed);
        assert_eq!(updated.feedback, Some(1));
    }

    #[tokio::test]
    async fn test_unknown_match_is_not_found() {
        let store = MemoryMatchStore::new();
        let notifier: Arc<dyn Notifier> = Arc::new(RecordingNotifier::default());
        let err = apply_transition(&store, notifier, Uuid::new_v4(), confirm())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
