//! Type-script args bound to a context's anchor cell.
//!
//! `args = blake2b_256(serialize(anchor_out_point))[..20]`
//!
//! Derived only from public data, so every client building a transaction for
//! the same context arrives at the same type script. The out-point index is
//! part of the preimage: output 0 and output 1 of one transaction are
//! different anchors.

use daovote_codec::{serialize_out_point, OUT_POINT_SIZE};
use daovote_types::{ErrorKind, OutPoint};
use std::fmt;
use thiserror::Error;

use crate::hash::blake2b_256;

pub const TYPE_ARGS_LEN: usize = 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeriveError {
    #[error("malformed anchor reference: serialized to {actual} bytes, expected {expected}")]
    MalformedAnchorReference { expected: usize, actual: usize },
}

impl DeriveError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Encoding
    }
}

/// A 20-byte type-script argument.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeArgs([u8; TYPE_ARGS_LEN]);

impl TypeArgs {
    pub fn as_bytes(&self) -> &[u8; TYPE_ARGS_LEN] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl fmt::Debug for TypeArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeArgs(")?;
        for b in &self.0[..4] {
            write!(f, "{b:02x}")?;
        }
        write!(f, "..)")
    }
}

/// Derive the type-script args for everything anchored at `anchor`.
pub fn derive_type_args(anchor: &OutPoint) -> Result<TypeArgs, DeriveError> {
    derive_from_serialized(&serialize_out_point(anchor))
}

fn derive_from_serialized(serialized: &[u8]) -> Result<TypeArgs, DeriveError> {
    if serialized.len() != OUT_POINT_SIZE {
        return Err(DeriveError::MalformedAnchorReference {
            expected: OUT_POINT_SIZE,
            actual: serialized.len(),
        });
    }
    let digest = blake2b_256(serialized);
    let mut args = [0u8; TYPE_ARGS_LEN];
    args.copy_from_slice(&digest[..TYPE_ARGS_LEN]);
    Ok(TypeArgs(args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use daovote_types::Byte32;

    fn anchor(index: u32) -> OutPoint {
        OutPoint::new(Byte32::new([0x42; 32]), index)
    }

    #[test]
    fn derivation_is_pure() {
        let a = derive_type_args(&anchor(0)).unwrap();
        let b = derive_type_args(&anchor(0)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_bytes().len(), TYPE_ARGS_LEN);
    }

    #[test]
    fn index_selects_a_different_cell() {
        let first = derive_type_args(&anchor(0)).unwrap();
        let second = derive_type_args(&anchor(1)).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn args_are_prefix_of_hash_over_le_index() {
        let mut preimage = vec![0x42; 32];
        preimage.extend_from_slice(&[1, 0, 0, 0]);
        let digest = blake2b_256(&preimage);
        let args = derive_type_args(&anchor(1)).unwrap();
        assert_eq!(&args.as_bytes()[..], &digest[..20]);
    }

    #[test]
    fn big_endian_index_would_differ() {
        // Guards the index byte order: 0x01000000 LE is index 1, not 2^24.
        let le = derive_type_args(&anchor(1)).unwrap();
        let be = derive_type_args(&anchor(1 << 24)).unwrap();
        assert_ne!(le, be);
    }

    #[test]
    fn wrong_width_is_loud() {
        assert_eq!(
            derive_from_serialized(&[0u8; 35]),
            Err(DeriveError::MalformedAnchorReference {
                expected: 36,
                actual: 35
            })
        );
        assert!(derive_from_serialized(&[0u8; 37]).is_err());
    }
}
