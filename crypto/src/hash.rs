//! Blake2b-256 hashing with the ledger's personalization.

use blake2::digest::core_api::{Buffer, UpdateCore, VariableOutputCore};
use blake2::Blake2bVarCore;
use daovote_codec::{serialize_raw_transaction, serialize_script};
use daovote_types::{Byte32, Script, UnsignedTransaction};

/// Personalization the ledger applies to every Blake2b hash.
const PERSONALIZATION: &[u8; 16] = b"ckb-default-hash";
const OUTPUT_LEN: usize = 32;

/// Incremental personalised Blake2b-256.
struct LedgerHasher {
    core: Blake2bVarCore,
    buffer: Buffer<Blake2bVarCore>,
}

impl LedgerHasher {
    fn new() -> Self {
        Self {
            core: Blake2bVarCore::new_with_params(&[], PERSONALIZATION, 0, OUTPUT_LEN),
            buffer: Default::default(),
        }
    }

    fn update(&mut self, data: &[u8]) {
        let core = &mut self.core;
        self.buffer
            .digest_blocks(data, |blocks| core.update_blocks(blocks));
    }

    fn finalize(mut self) -> [u8; 32] {
        let mut full = Default::default();
        self.core
            .finalize_variable_core(&mut self.buffer, &mut full);
        let mut output = [0u8; OUTPUT_LEN];
        output.copy_from_slice(&full[..OUTPUT_LEN]);
        output
    }
}

/// Compute the ledger's 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = LedgerHasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = LedgerHasher::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize()
}

/// Hash of a script's serialization; identifies a lock or type script.
pub fn script_hash(script: &Script) -> Byte32 {
    Byte32::new(blake2b_256(&serialize_script(script)))
}

/// Transaction hash: the hash of the raw transaction (witnesses excluded).
pub fn tx_hash(tx: &UnsignedTransaction) -> Byte32 {
    Byte32::new(blake2b_256(&serialize_raw_transaction(tx)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use daovote_types::ScriptHashType;

    #[test]
    fn empty_input_matches_ledger_blank_hash() {
        assert_eq!(
            hex::encode(blake2b_256(b"")),
            "44f4c69744d5f8c55d642062949dcae49bc4e7ef43d388c5a12f42b5633d163e"
        );
    }

    #[test]
    fn blake2b_deterministic() {
        assert_eq!(blake2b_256(b"hello dao"), blake2b_256(b"hello dao"));
        assert_ne!(blake2b_256(b"hello"), blake2b_256(b"world"));
    }

    #[test]
    fn long_input_spans_blocks() {
        let data = vec![0x5a; 1000];
        assert_eq!(
            blake2b_256(&data),
            blake2b_256_multi(&[&data[..129], &data[129..]])
        );
    }

    #[test]
    fn blake2b_multi_equivalent() {
        let single = blake2b_256(b"helloworld");
        let multi = blake2b_256_multi(&[b"hello", b"world"]);
        assert_eq!(single, multi);
    }

    #[test]
    fn script_hash_depends_on_args() {
        let a = Script::new(Byte32::ZERO, ScriptHashType::Type, vec![1]);
        let b = Script::new(Byte32::ZERO, ScriptHashType::Type, vec![2]);
        assert_ne!(script_hash(&a), script_hash(&b));
    }

    #[test]
    fn tx_hash_ignores_witnesses() {
        let mut tx = UnsignedTransaction::new();
        let before = tx_hash(&tx);
        tx.witnesses.push(vec![1, 2, 3]);
        assert_eq!(tx_hash(&tx), before);
    }
}
