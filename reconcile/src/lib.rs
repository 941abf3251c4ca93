//! Reconciliation of submissions after broadcast.
//!
//! A vote is shown optimistically as soon as it is broadcast, then
//! confirmed by polling the indexer. Each poll carries a sequence number
//! and only the response to the latest poll is applied. After a fixed
//! budget the submission is reported `TimedOut`; a later poll may still
//! confirm it. Identity registrations are confirmed on the ledger instead
//! and rolled back at the indexer when they do not commit.

pub mod error;
pub mod registration;
pub mod sequencer;
pub mod service;
pub mod state;
pub mod tally_cache;
pub mod tracker;

pub use error::ReconcileError;
pub use registration::{RegistrationOutcome, RegistrationReconciler, RollbackPolicy};
pub use sequencer::PollSequencer;
pub use service::{
    ReconcileConfig, ReconciliationService, DEFAULT_CONFIRMATION_TIMEOUT, DEFAULT_POLL_INTERVAL,
    DEFAULT_POLL_TIMEOUT,
};
pub use state::{ReconciliationState, SubmissionPhase};
pub use tally_cache::TallyCache;
pub use tracker::{Applied, SubmissionTracker};
