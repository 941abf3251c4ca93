use daovote_rpc::RpcError;
use daovote_types::{ErrorKind, Identity};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReconcileError {
    /// The compensating delete failed on every attempt. The provisional
    /// identity is left at the indexer for an operator to remove.
    #[error("rollback of identity {subject} failed after {attempts} attempts: {last_error}")]
    RollbackFailed {
        subject: Identity,
        attempts: u32,
        last_error: String,
    },

    #[error("ledger error: {0}")]
    Ledger(#[from] RpcError),
}

impl ReconcileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RollbackFailed { .. } => ErrorKind::Rollback,
            Self::Ledger(_) => ErrorKind::Reconciliation,
        }
    }
}
