//! Error classification shared across crates.

use std::fmt;
use thiserror::Error;

/// Discriminated error kind carried by every error in the workspace.
///
/// Callers branch on the kind (retry, show shortfall, re-derive inputs)
/// and print the error's `Display` for the human-readable detail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No standing in the context, or the indexer could not be reached.
    Entitlement,
    /// Malformed proof, address, script args or binary layout.
    Encoding,
    /// Not enough spendable capacity for outputs plus fee.
    Capacity,
    /// The signer declined or is unavailable.
    Signing,
    /// The network rejected the transaction.
    Broadcast,
    /// Confirmation could not be reconciled with the indexer or ledger.
    Reconciliation,
    /// A compensating rollback call failed.
    Rollback,
    /// Invalid local configuration or caller input.
    Config,
}

impl ErrorKind {
    /// Whether an operation failing with this kind may succeed when retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Entitlement | Self::Signing | Self::Broadcast | Self::Reconciliation
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entitlement => "entitlement",
            Self::Encoding => "encoding",
            Self::Capacity => "capacity",
            Self::Signing => "signing",
            Self::Broadcast => "broadcast",
            Self::Reconciliation => "reconciliation",
            Self::Rollback => "rollback",
            Self::Config => "config",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while constructing or parsing the basic types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("unknown script hash type: {0}")]
    UnknownHashType(String),

    #[error("context state cannot move from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

impl TypesError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTransition { .. } => ErrorKind::Config,
            _ => ErrorKind::Encoding,
        }
    }
}
