//! Lifecycle state of a voting or registration context.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a context is in its lifecycle.
///
/// Contexts only move forward: `Opened -> Anchored -> Closed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextState {
    /// Created by a proposer; the meta cell is not yet on chain.
    Opened,
    /// The meta cell is committed; the context has an anchor out-point.
    Anchored,
    /// The voting window is over.
    Closed,
}

impl ContextState {
    /// Whether the context can move to `next`.
    pub fn can_advance_to(&self, next: ContextState) -> bool {
        matches!(
            (self, next),
            (Self::Opened, Self::Anchored) | (Self::Anchored, Self::Closed)
        )
    }

    /// Whether submissions against the context may be accepted at all.
    pub fn accepts_submissions(&self) -> bool {
        matches!(self, Self::Anchored)
    }
}

impl fmt::Display for ContextState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Opened => "opened",
            Self::Anchored => "anchored",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}
