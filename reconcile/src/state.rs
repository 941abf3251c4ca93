//! Optimistic-then-reconciled submission state.

use daovote_types::{Byte32, Timestamp};
use serde::Serialize;
use std::fmt;

/// What the UI shows for a submission.
///
/// Starts `Optimistic` at broadcast and leaves it exactly once, on the
/// first of a confirmed read-back or the timeout. A later poll may still
/// move `TimedOut` to `Confirmed`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReconciliationState {
    /// Broadcast; the choice is shown locally but not yet confirmed.
    Optimistic { chosen_index: u32 },
    /// The indexer reports the submission.
    Confirmed {
        chosen_index: u32,
        confirmed_at: Timestamp,
        tx_id: Option<Byte32>,
    },
    /// No confirmation within the budget. The local choice is kept.
    TimedOut { chosen_index: u32 },
}

impl ReconciliationState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Optimistic { .. })
    }

    pub fn chosen_index(&self) -> u32 {
        match self {
            Self::Optimistic { chosen_index }
            | Self::Confirmed { chosen_index, .. }
            | Self::TimedOut { chosen_index } => *chosen_index,
        }
    }

    pub fn confirmed_at(&self) -> Option<Timestamp> {
        match self {
            Self::Confirmed { confirmed_at, .. } => Some(*confirmed_at),
            _ => None,
        }
    }
}

/// Lifecycle of one submission.
///
/// `Submitted -> AwaitingConfirmation -> {Confirmed | TimedOut | Failed}`;
/// `Failed` applies to registrations only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPhase {
    Submitted,
    AwaitingConfirmation,
    Confirmed,
    TimedOut,
    Failed,
}

impl SubmissionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::TimedOut | Self::Failed)
    }
}

impl fmt::Display for SubmissionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Submitted => "submitted",
            Self::AwaitingConfirmation => "awaiting_confirmation",
            Self::Confirmed => "confirmed",
            Self::TimedOut => "timed_out",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_optimistic_is_pending() {
        assert!(ReconciliationState::Optimistic { chosen_index: 1 }.is_pending());
        let timed_out = ReconciliationState::TimedOut { chosen_index: 1 };
        assert!(!timed_out.is_pending());
        assert_eq!(timed_out.chosen_index(), 1);
        assert_eq!(timed_out.confirmed_at(), None);
    }
}
