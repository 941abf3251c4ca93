//! Transaction assembly for the DAO vote client.
//!
//! Three transactions are built here:
//! - **Vote**: one cell typed by the vote contract, bound to the context's
//!   anchor, with the choice bitmask as data and the entitlement proof in
//!   the witness. Fees are completed in two passes.
//! - **Vote meta**: the proposer's meta cell at output 0, which becomes the
//!   context's anchor.
//! - **Registration**: an identity cell carrying a 32-byte commitment.
//!
//! All three share input selection ([`CellPool`]), cell-dep resolution and
//! the fee completer ([`Balancer`]).

pub mod assembler;
pub mod capacity;
pub mod completer;
pub mod deps;
pub mod error;
pub mod fee;
pub mod registration;
pub mod vote_meta;

pub use assembler::{AssembledTransaction, AssemblerConfig, TransactionAssembler};
pub use capacity::CellPool;
pub use completer::{
    BalanceConfig, Balancer, Draft, PassReport, DEFAULT_LOCK_PLACEHOLDER_LEN,
    DEFAULT_MAX_ABSORBED_FEE,
};
pub use deps::{resolve_cell_deps, ContractDeployment, LockDeployment};
pub use error::{AssembleError, CapacityShortfall};
pub use fee::{FeeRate, DEFAULT_FEE_RATE};
pub use registration::{IdentityRegistry, RegistrationBuilder};
pub use vote_meta::{meta_anchor, VoteMetaBuilder, META_OUTPUT_INDEX};
