use daovote_types::{ContextState, ErrorKind, Timestamp, TypesError};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("context is {0}, votes need an anchored context")]
    NotAnchored(ContextState),

    #[error("anchored context has no anchor out-point")]
    MissingAnchor,

    #[error("voting opens at {starts_at} (now {now})")]
    NotYetOpen { starts_at: Timestamp, now: Timestamp },

    #[error("voting closed at {ended_at} (now {now})")]
    WindowClosed { ended_at: Timestamp, now: Timestamp },

    #[error("candidate {index} out of range: context has {count} candidates")]
    CandidateOutOfRange { index: u32, count: usize },

    #[error("invalid window: start {start} is not before end {end}")]
    InvalidWindow { start: Timestamp, end: Timestamp },

    #[error(transparent)]
    Transition(#[from] TypesError),
}

impl ContextError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAnchored(_) | Self::NotYetOpen { .. } | Self::WindowClosed { .. } => {
                ErrorKind::Entitlement
            }
            Self::MissingAnchor => ErrorKind::Encoding,
            Self::CandidateOutOfRange { .. } | Self::InvalidWindow { .. } => ErrorKind::Config,
            Self::Transition(e) => e.kind(),
        }
    }
}
