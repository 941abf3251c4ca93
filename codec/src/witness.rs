//! `WitnessArgs`: the structured witness of an input.
//!
//! ```text
//! table WitnessArgs {
//!     lock:        BytesOpt,  // signature of the lock script
//!     input_type:  BytesOpt,  // data for the input's type script
//!     output_type: BytesOpt,  // data for output type scripts (the vote proof)
//! }
//! ```

use crate::error::CodecError;
use crate::molecule::{pack_bytes_opt, pack_table, unpack_bytes_opt, unpack_table};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WitnessArgs {
    pub lock: Option<Vec<u8>>,
    pub input_type: Option<Vec<u8>>,
    pub output_type: Option<Vec<u8>>,
}

impl WitnessArgs {
    /// Witness args with a zero-filled lock of `len` bytes, used to size the
    /// transaction before the real signature exists.
    pub fn with_lock_placeholder(len: usize) -> Self {
        Self {
            lock: Some(vec![0u8; len]),
            ..Self::default()
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        pack_table(&[
            pack_bytes_opt(self.lock.as_deref()),
            pack_bytes_opt(self.input_type.as_deref()),
            pack_bytes_opt(self.output_type.as_deref()),
        ])
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let fields = unpack_table(bytes, 3, "WitnessArgs")?;
        Ok(Self {
            lock: unpack_bytes_opt(fields[0])?,
            input_type: unpack_bytes_opt(fields[1])?,
            output_type: unpack_bytes_opt(fields[2])?,
        })
    }

    /// Decode a raw witness slot. An empty slot is an empty `WitnessArgs`.
    pub fn from_witness(witness: &[u8]) -> Result<Self, CodecError> {
        if witness.is_empty() {
            return Ok(Self::default());
        }
        Self::decode(witness)
    }
}

/// Parse `witness`, replace only its `output_type` field, and re-encode.
///
/// Existing `lock` and `input_type` fields survive untouched. A witness that
/// is not valid `WitnessArgs` is an error, never silently overwritten.
pub fn patch_output_type(witness: &[u8], output_type: Vec<u8>) -> Result<Vec<u8>, CodecError> {
    let mut args = WitnessArgs::from_witness(witness)?;
    args.output_type = Some(output_type);
    Ok(args.encode())
}

/// Parse `witness` and replace only its `lock` field.
pub fn patch_lock(witness: &[u8], lock: Vec<u8>) -> Result<Vec<u8>, CodecError> {
    let mut args = WitnessArgs::from_witness(witness)?;
    args.lock = Some(lock);
    Ok(args.encode())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_witness_args_layout() {
        // header only: total 16, three offsets of 16
        assert_eq!(
            WitnessArgs::default().encode(),
            vec![16, 0, 0, 0, 16, 0, 0, 0, 16, 0, 0, 0, 16, 0, 0, 0]
        );
    }

    #[test]
    fn placeholder_lock_size() {
        let encoded = WitnessArgs::with_lock_placeholder(65).encode();
        // 16 header + 4 length + 65 bytes
        assert_eq!(encoded.len(), 85);
    }

    #[test]
    fn decode_inverts_encode() {
        let args = WitnessArgs {
            lock: Some(vec![1; 65]),
            input_type: None,
            output_type: Some(vec![7; 10]),
        };
        assert_eq!(WitnessArgs::decode(&args.encode()).unwrap(), args);
    }

    #[test]
    fn patch_preserves_lock_and_input_type() {
        let original = WitnessArgs {
            lock: Some(vec![0xaa; 65]),
            input_type: Some(vec![0xbb; 3]),
            output_type: None,
        };
        let patched = patch_output_type(&original.encode(), vec![0xcc; 5]).unwrap();
        let decoded = WitnessArgs::decode(&patched).unwrap();
        assert_eq!(decoded.lock, original.lock);
        assert_eq!(decoded.input_type, original.input_type);
        assert_eq!(decoded.output_type, Some(vec![0xcc; 5]));
    }

    #[test]
    fn patch_replaces_previous_output_type() {
        let original = WitnessArgs {
            lock: None,
            input_type: None,
            output_type: Some(vec![1]),
        };
        let patched = patch_output_type(&original.encode(), vec![2, 2]).unwrap();
        assert_eq!(
            WitnessArgs::decode(&patched).unwrap().output_type,
            Some(vec![2, 2])
        );
    }

    #[test]
    fn patch_of_empty_slot_creates_args() {
        let patched = patch_output_type(&[], vec![9]).unwrap();
        let decoded = WitnessArgs::decode(&patched).unwrap();
        assert_eq!(decoded.lock, None);
        assert_eq!(decoded.output_type, Some(vec![9]));
    }

    #[test]
    fn patch_refuses_garbage() {
        assert!(patch_output_type(&[1, 2, 3, 4, 5], vec![9]).is_err());
    }

    #[test]
    fn patch_lock_keeps_output_type() {
        let original = WitnessArgs {
            lock: Some(vec![0; 65]),
            input_type: None,
            output_type: Some(vec![5; 40]),
        };
        let patched = patch_lock(&original.encode(), vec![1; 65]).unwrap();
        let decoded = WitnessArgs::decode(&patched).unwrap();
        assert_eq!(decoded.lock, Some(vec![1; 65]));
        assert_eq!(decoded.output_type, Some(vec![5; 40]));
    }
}
