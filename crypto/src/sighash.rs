//! The message a lock signature commits to.
//!
//! `message = blake2b(tx_hash || len(w0) as u64 LE || w0 || len(wi) || wi ...)`
//! where `w0` is the first witness with its lock field zero-filled and `wi`
//! are the remaining witnesses. Every witness is covered, so the embedded
//! vote proof cannot be swapped after signing.

use daovote_codec::{witness, CodecError, WitnessArgs};
use daovote_types::UnsignedTransaction;

use crate::hash::{blake2b_256_multi, tx_hash};

/// Compute the signing message for `tx`, whose first witness must carry a
/// lock placeholder of the final signature length.
pub fn signing_message(tx: &UnsignedTransaction) -> Result<[u8; 32], CodecError> {
    let hash = tx_hash(tx);
    let first = tx.witnesses.first().map(Vec::as_slice).unwrap_or_default();
    let lock_len = WitnessArgs::from_witness(first)?
        .lock
        .map(|l| l.len())
        .unwrap_or(0);
    let zeroed = witness::patch_lock(first, vec![0u8; lock_len])?;

    let mut lengths = Vec::with_capacity(tx.witnesses.len());
    lengths.push((zeroed.len() as u64).to_le_bytes());
    for w in tx.witnesses.iter().skip(1) {
        lengths.push((w.len() as u64).to_le_bytes());
    }

    let mut parts: Vec<&[u8]> = Vec::with_capacity(1 + 2 * tx.witnesses.len());
    parts.push(hash.as_bytes());
    parts.push(&lengths[0]);
    parts.push(&zeroed);
    for (w, len) in tx.witnesses.iter().skip(1).zip(lengths.iter().skip(1)) {
        parts.push(len);
        parts.push(w);
    }
    Ok(blake2b_256_multi(&parts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use daovote_types::{Byte32, CellInput, OutPoint};

    fn tx_with_witness(w0: Vec<u8>) -> UnsignedTransaction {
        let mut tx = UnsignedTransaction::new();
        tx.push_input(CellInput::new(OutPoint::new(Byte32::ZERO, 0)), w0);
        tx.push_input(CellInput::new(OutPoint::new(Byte32::ZERO, 1)), vec![]);
        tx
    }

    #[test]
    fn lock_contents_do_not_affect_message() {
        let placeholder = WitnessArgs::with_lock_placeholder(65).encode();
        let signed = WitnessArgs {
            lock: Some(vec![0xff; 65]),
            ..WitnessArgs::default()
        }
        .encode();
        assert_eq!(
            signing_message(&tx_with_witness(placeholder)).unwrap(),
            signing_message(&tx_with_witness(signed)).unwrap()
        );
    }

    #[test]
    fn output_type_is_covered() {
        let a = WitnessArgs {
            lock: Some(vec![0; 65]),
            input_type: None,
            output_type: Some(vec![1; 40]),
        };
        let b = WitnessArgs {
            output_type: Some(vec![2; 40]),
            ..a.clone()
        };
        assert_ne!(
            signing_message(&tx_with_witness(a.encode())).unwrap(),
            signing_message(&tx_with_witness(b.encode())).unwrap()
        );
    }
}
