use daovote_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IndexerError {
    /// The subject has no standing in the context, or the context is not
    /// in a state that accepts votes. Retrying will not help.
    #[error("entitlement unavailable: {0}")]
    EntitlementUnavailable(String),

    /// Network failure, timeout or 5xx. Never means "no entitlement".
    #[error("transient indexer error: {0}")]
    Transient(String),

    #[error("indexer rejected request (HTTP {status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("invalid response from indexer: {0}")]
    InvalidResponse(String),
}

impl IndexerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EntitlementUnavailable(_) | Self::Transient(_) => ErrorKind::Entitlement,
            Self::Rejected { .. } => ErrorKind::Reconciliation,
            Self::InvalidResponse(_) => ErrorKind::Encoding,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            IndexerError::Transient(format!("request timed out: {e}"))
        } else if e.is_connect() {
            IndexerError::Transient(format!("connection failed: {e}"))
        } else if e.is_decode() {
            IndexerError::InvalidResponse(e.to_string())
        } else {
            IndexerError::Transient(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_is_retryable_but_unavailable_is_not() {
        assert!(IndexerError::Transient("503".into()).is_transient());
        assert!(!IndexerError::EntitlementUnavailable("no standing".into()).is_transient());
        assert_eq!(
            IndexerError::Transient("x".into()).kind(),
            ErrorKind::Entitlement
        );
    }
}
