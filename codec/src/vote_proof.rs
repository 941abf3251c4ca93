//! The vote proof envelope placed in a witness's `output_type` field.
//!
//! Layout: `script_hash (32 bytes) || merkle_proof (rest)`. The verifying
//! script reads the first 32 bytes as the voter's lock script hash and the
//! remainder as the sparse Merkle tree proof of the voter's entitlement.

use crate::error::CodecError;

pub const SCRIPT_HASH_LEN: usize = 32;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteProofEnvelope {
    pub script_hash: [u8; SCRIPT_HASH_LEN],
    pub merkle_proof: Vec<u8>,
}

impl VoteProofEnvelope {
    pub fn new(script_hash: [u8; SCRIPT_HASH_LEN], merkle_proof: Vec<u8>) -> Self {
        Self {
            script_hash,
            merkle_proof,
        }
    }

    pub fn encoded_len(&self) -> usize {
        SCRIPT_HASH_LEN + self.merkle_proof.len()
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&self.script_hash);
        out.extend_from_slice(&self.merkle_proof);
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < SCRIPT_HASH_LEN {
            return Err(CodecError::TooShort {
                min: SCRIPT_HASH_LEN,
                actual: bytes.len(),
            });
        }
        let (hash, proof) = bytes.split_at(SCRIPT_HASH_LEN);
        let mut script_hash = [0u8; SCRIPT_HASH_LEN];
        script_hash.copy_from_slice(hash);
        Ok(Self {
            script_hash,
            merkle_proof: proof.to_vec(),
        })
    }
}
