//! Data stored in a context's anchor cell.
//!
//! ```text
//! table VoteMeta {
//!     smt_root_hash: Byte32Opt,
//!     candidates:    BytesVec,
//!     start_time:    Uint64,
//!     end_time:      Uint64,
//!     extra:         BytesOpt,
//! }
//! ```

use crate::error::CodecError;
use crate::molecule::{
    pack_bytes, pack_bytes_opt, pack_dynvec, pack_table, pack_u64, read_u64, unpack_bytes,
    unpack_bytes_opt, unpack_dynvec, unpack_table,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VoteMeta {
    /// Root of the entitlement tree the indexer's proofs are checked against.
    pub smt_root_hash: Option<[u8; 32]>,
    pub candidates: Vec<Vec<u8>>,
    pub start_time: u64,
    pub end_time: u64,
    pub extra: Option<Vec<u8>>,
}

impl VoteMeta {
    pub fn encode(&self) -> Vec<u8> {
        let candidates: Vec<Vec<u8>> = self.candidates.iter().map(|c| pack_bytes(c)).collect();
        pack_table(&[
            self.smt_root_hash.map(|h| h.to_vec()).unwrap_or_default(),
            pack_dynvec(&candidates),
            pack_u64(self.start_time).to_vec(),
            pack_u64(self.end_time).to_vec(),
            pack_bytes_opt(self.extra.as_deref()),
        ])
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let fields = unpack_table(bytes, 5, "VoteMeta")?;

        let smt_root_hash = match fields[0].len() {
            0 => None,
            32 => {
                let mut h = [0u8; 32];
                h.copy_from_slice(fields[0]);
                Some(h)
            }
            n => {
                return Err(CodecError::LengthMismatch {
                    expected: 32,
                    actual: n,
                })
            }
        };

        let candidates = unpack_dynvec(fields[1], "VoteMeta.candidates")?
            .into_iter()
            .map(|c| unpack_bytes(c).map(<[u8]>::to_vec))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            smt_root_hash,
            candidates,
            start_time: read_u64(fields[2])?,
            end_time: read_u64(fields[3])?,
            extra: unpack_bytes_opt(fields[4])?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> VoteMeta {
        VoteMeta {
            smt_root_hash: Some([9; 32]),
            candidates: vec![b"yes".to_vec(), b"no".to_vec(), b"abstain".to_vec()],
            start_time: 1_700_000_000,
            end_time: 1_700_086_400,
            extra: None,
        }
    }

    #[test]
    fn decode_inverts_encode() {
        let m = meta();
        assert_eq!(VoteMeta::decode(&m.encode()).unwrap(), m);
    }

    #[test]
    fn absent_root_and_extra() {
        let m = VoteMeta {
            smt_root_hash: None,
            extra: Some(vec![1, 2]),
            ..meta()
        };
        assert_eq!(VoteMeta::decode(&m.encode()).unwrap(), m);
    }

    #[test]
    fn bad_root_length_rejected() {
        let bytes = pack_table(&[
            vec![1u8; 31],
            pack_dynvec::<Vec<u8>>(&[]),
            pack_u64(0).to_vec(),
            pack_u64(0).to_vec(),
            vec![],
        ]);
        assert_eq!(
            VoteMeta::decode(&bytes),
            Err(CodecError::LengthMismatch {
                expected: 32,
                actual: 31
            })
        );
    }
}
