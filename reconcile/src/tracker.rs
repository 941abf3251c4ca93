//! Per-submission reconciliation tracker.

use daovote_indexer::SubmissionStatus;
use daovote_types::{Identity, SubmissionRecord, Timestamp};
use tracing::{debug, info};

use crate::sequencer::PollSequencer;
use crate::state::{ReconciliationState, SubmissionPhase};

/// Result of offering a poll response to a tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    /// The response confirmed the submission.
    Confirmed,
    /// Applied, but the indexer has not seen the submission yet.
    NotYet,
    /// A newer poll has been issued; the response was dropped.
    Stale,
}

#[derive(Clone, Debug)]
pub struct SubmissionTracker {
    record: SubmissionRecord,
    subject: Identity,
    phase: SubmissionPhase,
    state: ReconciliationState,
    sequencer: PollSequencer,
}

impl SubmissionTracker {
    pub fn new(record: SubmissionRecord, subject: Identity) -> Self {
        let state = ReconciliationState::Optimistic {
            chosen_index: record.chosen_index,
        };
        Self {
            record,
            subject,
            phase: SubmissionPhase::Submitted,
            state,
            sequencer: PollSequencer::new(),
        }
    }

    pub fn record(&self) -> &SubmissionRecord {
        &self.record
    }

    pub fn subject(&self) -> &Identity {
        &self.subject
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    pub fn state(&self) -> &ReconciliationState {
        &self.state
    }

    pub fn last_applied(&self) -> Option<u64> {
        self.sequencer.last_applied()
    }

    /// Start a poll, returning its sequence number.
    pub fn issue_poll(&mut self) -> u64 {
        if self.phase == SubmissionPhase::Submitted {
            self.phase = SubmissionPhase::AwaitingConfirmation;
        }
        self.sequencer.issue()
    }

    /// Whether `status` reports this submission: the confirmed tx when the
    /// indexer names one, otherwise the chosen index.
    fn reports_this_submission(&self, status: &SubmissionStatus) -> bool {
        match (status.confirmed_tx_id, status.chosen_index) {
            (Some(tx), _) => tx == self.record.tx_id,
            (None, Some(index)) => index == self.record.chosen_index,
            (None, None) => false,
        }
    }

    /// Offer the response to poll `seq`.
    pub fn apply_status(&mut self, seq: u64, status: &SubmissionStatus, now: Timestamp) -> Applied {
        if !self.sequencer.try_apply(seq) {
            debug!(seq, latest = self.sequencer.latest_issued(), "stale poll response dropped");
            return Applied::Stale;
        }
        if !self.reports_this_submission(status) {
            return Applied::NotYet;
        }
        let chosen_index = status.chosen_index.unwrap_or(self.record.chosen_index);
        let was_pending = self.state.is_pending();
        self.state = ReconciliationState::Confirmed {
            chosen_index,
            confirmed_at: now,
            tx_id: status.confirmed_tx_id,
        };
        self.phase = SubmissionPhase::Confirmed;
        info!(
            context = %self.record.context_id,
            tx = %self.record.tx_id,
            seq,
            chosen_index,
            after_timeout = !was_pending,
            "submission confirmed"
        );
        Applied::Confirmed
    }

    /// The confirmation budget ran out. Only a pending submission times
    /// out; the chosen index is kept.
    pub fn time_out(&mut self) {
        if self.state.is_pending() {
            self.state = ReconciliationState::TimedOut {
                chosen_index: self.record.chosen_index,
            };
            self.phase = SubmissionPhase::TimedOut;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daovote_types::{Byte32, ContextId};

    fn tracker() -> SubmissionTracker {
        SubmissionTracker::new(
            SubmissionRecord {
                context_id: ContextId::new("c"),
                tx_id: Byte32::new([1; 32]),
                chosen_index: 1,
                signer: Identity::new("s"),
                submitted_at: Timestamp::new(10),
            },
            Identity::new("s"),
        )
    }

    fn confirmed(index: u32, tx: Option<Byte32>) -> SubmissionStatus {
        SubmissionStatus {
            chosen_index: Some(index),
            confirmed_tx_id: tx,
        }
    }

    #[test]
    fn newest_response_wins() {
        let mut t = tracker();
        let seqs: Vec<u64> = (0..5).map(|_| t.issue_poll()).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4, 5]);

        assert_eq!(
            t.apply_status(5, &SubmissionStatus::default(), Timestamp::new(20)),
            Applied::NotYet
        );
        assert_eq!(
            t.apply_status(4, &confirmed(1, None), Timestamp::new(21)),
            Applied::Stale
        );
        assert!(t.state().is_pending());
        assert_eq!(t.last_applied(), Some(5));
        assert_eq!(t.phase(), SubmissionPhase::AwaitingConfirmation);
    }

    #[test]
    fn confirmation_by_tx_id() {
        let mut t = tracker();
        let seq = t.issue_poll();
        let applied = t.apply_status(seq, &confirmed(1, Some(Byte32::new([1; 32]))), Timestamp::new(30));
        assert_eq!(applied, Applied::Confirmed);
        assert_eq!(t.state().confirmed_at(), Some(Timestamp::new(30)));
        assert_eq!(t.phase(), SubmissionPhase::Confirmed);
    }

    #[test]
    fn other_transaction_is_not_a_confirmation() {
        let mut t = tracker();
        let seq = t.issue_poll();
        let applied = t.apply_status(seq, &confirmed(1, Some(Byte32::new([9; 32]))), Timestamp::new(30));
        assert_eq!(applied, Applied::NotYet);
        assert!(t.state().is_pending());
    }

    #[test]
    fn timeout_keeps_choice_and_late_poll_confirms() {
        let mut t = tracker();
        t.issue_poll();
        t.time_out();
        assert_eq!(*t.state(), ReconciliationState::TimedOut { chosen_index: 1 });
        assert_eq!(t.phase(), SubmissionPhase::TimedOut);

        let seq = t.issue_poll();
        assert_eq!(
            t.apply_status(seq, &confirmed(1, None), Timestamp::new(99)),
            Applied::Confirmed
        );
        // a confirmed submission never times out
        t.time_out();
        assert!(matches!(t.state(), ReconciliationState::Confirmed { .. }));
    }
}
