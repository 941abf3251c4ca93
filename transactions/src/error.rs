use daovote_codec::CodecError;
use daovote_crypto::{AddressError, DeriveError};
use daovote_rpc::RpcError;
use daovote_types::{Capacity, ErrorKind, NetworkId, ShapeError};
use std::fmt;
use thiserror::Error;

/// How far the spendable capacity falls short of what a transaction needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CapacityShortfall {
    pub needed: Capacity,
    pub available: Capacity,
}

impl CapacityShortfall {
    pub fn new(needed: Capacity, available: Capacity) -> Self {
        Self { needed, available }
    }

    pub fn shortfall(&self) -> Capacity {
        self.needed.saturating_sub(self.available)
    }
}

impl fmt::Display for CapacityShortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "need {}, have {} (short by {})",
            self.needed,
            self.available,
            self.shortfall()
        )
    }
}

#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("insufficient capacity: {0}")]
    InsufficientCapacity(CapacityShortfall),

    #[error("entitlement carries no proof")]
    MissingEntitlementProof,

    #[error("{what} args are {actual} bytes, expected {expected}")]
    ArgsLengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("context {0} has no anchor cell")]
    MissingAnchor(String),

    #[error("address is for {found:?}, client is configured for {expected:?}")]
    NetworkMismatch { expected: NetworkId, found: NetworkId },

    #[error("no {0} contract deployment configured")]
    MissingDeployment(&'static str),

    #[error("address: {0}")]
    Address(#[from] AddressError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Derive(#[from] DeriveError),

    #[error("ledger: {0}")]
    Rpc(#[from] RpcError),

    #[error("transaction shape: {0}")]
    Shape(#[from] ShapeError),
}

impl AssembleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientCapacity(_) => ErrorKind::Capacity,
            Self::MissingEntitlementProof => ErrorKind::Entitlement,
            Self::ArgsLengthMismatch { .. }
            | Self::MissingAnchor(_)
            | Self::Address(_)
            | Self::Derive(_)
            | Self::Shape(_) => ErrorKind::Encoding,
            Self::NetworkMismatch { .. } | Self::MissingDeployment(_) => ErrorKind::Config,
            Self::Codec(e) => e.kind(),
            Self::Rpc(e) => e.kind(),
        }
    }

    /// The shortfall, when the failure is a capacity one.
    pub fn shortfall(&self) -> Option<Capacity> {
        match self {
            Self::InsufficientCapacity(s) => Some(s.shortfall()),
            _ => None,
        }
    }
}
