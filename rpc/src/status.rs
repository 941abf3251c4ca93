//! Transaction status as seen by the ledger.

use std::fmt;
use std::time::Duration;

/// Where a broadcast transaction is in the ledger's pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxStatus {
    /// In the pool, not yet proposed.
    Pending,
    Proposed,
    /// Included in a block, `confirmations` deep (1 = in the tip block).
    Committed { confirmations: u64 },
    /// The node has never seen the transaction or has dropped it.
    Unknown,
    Rejected { reason: String },
}

impl TxStatus {
    /// Committed with at least `min_confirmations` blocks on top.
    pub fn is_confirmed(&self, min_confirmations: u64) -> bool {
        matches!(self, Self::Committed { confirmations } if *confirmations >= min_confirmations.max(1))
    }

    /// Included in a block at any depth.
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }

    /// No further change is expected without outside action.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Proposed => f.write_str("proposed"),
            Self::Committed { confirmations } => write!(f, "committed ({confirmations} conf)"),
            Self::Unknown => f.write_str("unknown"),
            Self::Rejected { reason } => write!(f, "rejected: {reason}"),
        }
    }
}

/// Parameters for [`crate::LedgerRpc::wait_for_transaction`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaitOptions {
    pub min_confirmations: u64,
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            min_confirmations: 1,
            timeout: Duration::from_secs(120),
            poll_interval: Duration::from_secs(3),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_depth() {
        let s = TxStatus::Committed { confirmations: 2 };
        assert!(s.is_confirmed(1));
        assert!(s.is_confirmed(2));
        assert!(!s.is_confirmed(3));
        // zero is treated as "committed at all"
        assert!(s.is_confirmed(0));
        assert!(!TxStatus::Proposed.is_confirmed(0));
        assert!(s.is_committed());
        assert!(!TxStatus::Unknown.is_committed());
    }
}
