//! Binary codec for structures exchanged with the ledger.
//!
//! Every layout here is checked by on-chain scripts, so encodings are
//! byte-exact and decoding is the strict inverse:
//! - **molecule**: the ledger's length-prefixed table/vector format
//! - **WitnessArgs**: the `{lock, input_type, output_type}` witness table
//! - **VoteProofEnvelope**: `script_hash (32 bytes) || merkle_proof`
//! - **ChoiceBitmask**: 4-byte little-endian `1 << candidate_index`
//! - **VoteMeta**: the data of a context's anchor cell
//! - transaction serialization, used for hashing and fee estimation

pub mod bitmask;
pub mod error;
pub mod molecule;
pub mod transaction;
pub mod vote_meta;
pub mod vote_proof;
pub mod witness;

pub use bitmask::ChoiceBitmask;
pub use error::CodecError;
pub use transaction::{
    serialize_out_point, serialize_raw_transaction, serialize_script, serialize_transaction,
    serialized_size_in_block, OUT_POINT_SIZE,
};
pub use vote_meta::VoteMeta;
pub use vote_proof::{VoteProofEnvelope, SCRIPT_HASH_LEN};
pub use witness::WitnessArgs;
