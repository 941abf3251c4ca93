use daovote_crypto::AddressError;
use daovote_governance::ContextError;
use daovote_indexer::IndexerError;
use daovote_reconcile::ReconcileError;
use daovote_rpc::RpcError;
use daovote_transactions::{AssembleError, CapacityShortfall};
use daovote_types::{ContextId, ErrorKind, ShapeError};
use thiserror::Error;

/// Failure reported by a key holder.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignerError {
    /// The user declined to sign.
    #[error("signing rejected: {0}")]
    Rejected(String),

    /// The signer could not be reached or could not produce a signature.
    #[error("signer unavailable: {0}")]
    Unavailable(String),
}

impl SignerError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Signing
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BroadcastError {
    #[error("transaction not ready for signing: {0}")]
    Shape(#[from] ShapeError),

    #[error("user rejected the signature request: {0}")]
    UserRejected(String),

    #[error("signer unavailable: {0}")]
    SignerUnavailable(String),

    /// The node refused the transaction; its error is carried as is.
    #[error("broadcast rejected: {0}")]
    BroadcastRejected(RpcError),
}

impl BroadcastError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Shape(e) => e.kind(),
            Self::UserRejected(_) | Self::SignerUnavailable(_) => ErrorKind::Signing,
            Self::BroadcastRejected(_) => ErrorKind::Broadcast,
        }
    }
}

impl From<SignerError> for BroadcastError {
    fn from(e: SignerError) -> Self {
        match e {
            SignerError::Rejected(msg) => Self::UserRejected(msg),
            SignerError::Unavailable(msg) => Self::SignerUnavailable(msg),
        }
    }
}

/// Errors from the encrypted key file.
#[derive(Debug, Error)]
pub enum KeyFileError {
    #[error("unsupported key file version: {0}")]
    UnsupportedVersion(u32),

    #[error("wrong password or corrupted key file")]
    Decrypt,

    #[error("invalid key file: {0}")]
    Invalid(String),

    #[error("key file I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("key file JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl KeyFileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Config,
            _ => ErrorKind::Signing,
        }
    }
}

/// Anything that can end a vote or registration attempt.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("a submission for context {0} is already in flight")]
    SubmissionInFlight(ContextId),

    #[error("insufficient capacity: {0}")]
    InsufficientCapacity(CapacityShortfall),

    #[error("not configured: {0}")]
    NotConfigured(&'static str),

    #[error("indexer: {0}")]
    Indexer(#[from] IndexerError),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Assemble(#[from] AssembleError),

    #[error(transparent)]
    Broadcast(#[from] BroadcastError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error("ledger: {0}")]
    Ledger(#[from] RpcError),

    #[error("address: {0}")]
    Address(#[from] AddressError),

    #[error(transparent)]
    Signer(#[from] SignerError),
}

impl SubmitError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SubmissionInFlight(_) => ErrorKind::Broadcast,
            Self::InsufficientCapacity(_) => ErrorKind::Capacity,
            Self::NotConfigured(_) => ErrorKind::Config,
            Self::Indexer(e) => e.kind(),
            Self::Context(e) => e.kind(),
            Self::Assemble(e) => e.kind(),
            Self::Broadcast(e) => e.kind(),
            Self::Reconcile(e) => e.kind(),
            Self::Ledger(e) => e.kind(),
            Self::Address(_) => ErrorKind::Encoding,
            Self::Signer(e) => e.kind(),
        }
    }

    /// The capacity shortfall, for either the up-front balance check or
    /// input selection.
    pub fn shortfall(&self) -> Option<daovote_types::Capacity> {
        match self {
            Self::InsufficientCapacity(s) => Some(s.shortfall()),
            Self::Assemble(e) => e.shortfall(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signer_errors_map_to_broadcast_variants() {
        let e: BroadcastError = SignerError::Rejected("closed popup".into()).into();
        assert_eq!(e, BroadcastError::UserRejected("closed popup".into()));
        assert_eq!(e.kind(), ErrorKind::Signing);
    }

    #[test]
    fn node_rejection_is_broadcast_kind() {
        let e = BroadcastError::BroadcastRejected(RpcError::Node {
            code: -301,
            message: "TransactionFailedToResolve".into(),
        });
        assert_eq!(e.kind(), ErrorKind::Broadcast);
        assert!(e.to_string().contains("TransactionFailedToResolve"));
    }
}
