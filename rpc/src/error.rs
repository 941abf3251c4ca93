//! Ledger RPC error types.

use daovote_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RpcError {
    /// The node could not be reached.
    #[error("ledger unreachable: {0}")]
    Unreachable(String),

    #[error("ledger request timed out: {0}")]
    Timeout(String),

    /// The node answered with a JSON-RPC error object. The message is kept
    /// verbatim so broadcast rejections reach the caller unchanged.
    #[error("ledger error {code}: {message}")]
    Node { code: i64, message: String },

    #[error("invalid ledger response: {0}")]
    InvalidResponse(String),
}

impl RpcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidResponse(_) => ErrorKind::Encoding,
            _ => ErrorKind::Broadcast,
        }
    }

    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RpcError::Timeout(e.to_string())
        } else if e.is_connect() {
            RpcError::Unreachable(format!("connection failed: {e}"))
        } else if e.is_decode() {
            RpcError::InvalidResponse(e.to_string())
        } else {
            RpcError::Unreachable(e.to_string())
        }
    }
}
