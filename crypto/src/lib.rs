//! Cryptographic primitives for the DAO vote client.
//!
//! - **Blake2b-256** personalised with `ckb-default-hash` for every ledger hash
//!   (transaction hashes, script hashes, type-script args)
//! - **Bech32m** full-format addresses carrying a lock script
//! - **Type-args derivation**: 20-byte args bound to a context's anchor cell
//! - **Ed25519** for the local key holder and submission attestations

pub mod address;
pub mod hash;
pub mod keys;
pub mod sighash;
pub mod sign;
pub mod type_args;

pub use address::{decode_address, encode_address, AddressError};
pub use hash::{blake2b_256, blake2b_256_multi, script_hash, tx_hash};
pub use keys::{generate_keypair, keypair_from_private, keypair_from_seed, public_from_private};
pub use sighash::signing_message;
pub use sign::{sign_message, verify_signature};
pub use type_args::{derive_type_args, DeriveError, TypeArgs, TYPE_ARGS_LEN};
