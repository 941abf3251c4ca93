//! Nullable collaborators for deterministic testing.
//!
//! Each one stands in for an external system behind the crate's traits:
//! - return scripted values
//! - record every call for assertions
//! - never touch the network or the filesystem
//!
//! Swap them in for the HTTP clients and the local key holder in tests.

pub mod clock;
pub mod indexer;
pub mod key_holder;
pub mod ledger;

pub use clock::NullClock;
pub use indexer::{IndexerCall, NullIndexer};
pub use key_holder::NullKeyHolder;
pub use ledger::NullLedger;
