//! Fundamental types for the DAO vote client.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! hashes, capacities, scripts, cells, unsigned transactions, voting contexts,
//! entitlements, submission records and the shared error classification.

pub mod amount;
pub mod cell;
pub mod context;
pub mod error;
pub mod hash;
pub mod hex_serde;
pub mod identity;
pub mod keys;
pub mod network;
pub mod script;
pub mod state;
pub mod time;
pub mod transaction;

pub use amount::Capacity;
pub use cell::{CellDep, CellInput, CellOutput, DepType, LiveCell, OutPoint};
pub use context::{Context, ContextId, Entitlement, SubmissionRecord};
pub use error::{ErrorKind, TypesError};
pub use hash::Byte32;
pub use identity::Identity;
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use network::NetworkId;
pub use script::{Script, ScriptHashType};
pub use state::ContextState;
pub use time::{Clock, SystemClock, Timestamp};
pub use transaction::{ShapeError, SignedTransaction, UnsignedTransaction};
