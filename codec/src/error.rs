use daovote_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("input too short: need at least {min} bytes, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("malformed {what}: {reason}")]
    Malformed { what: &'static str, reason: String },

    #[error("candidate index {index} out of range (limit {limit})")]
    CandidateOutOfRange { index: u32, limit: u32 },
}

impl CodecError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Encoding
    }

    pub(crate) fn malformed(what: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            what,
            reason: reason.into(),
        }
    }
}
