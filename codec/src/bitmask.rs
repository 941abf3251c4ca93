//! The choice bitmask stored as a vote cell's data.
//!
//! Exactly 4 bytes, little-endian. Bit `i` set means candidate `i` was chosen.
//! Single-choice votes set one bit; the type supports several for
//! multi-select contexts.

use crate::error::CodecError;

pub const BITMASK_LEN: usize = 4;
/// Number of candidates a 32-bit mask can address.
pub const MAX_CANDIDATES: u32 = 32;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChoiceBitmask(u32);

impl ChoiceBitmask {
    /// Mask selecting exactly `index`.
    pub fn single(index: u32) -> Result<Self, CodecError> {
        check_index(index)?;
        Ok(Self(1u32 << index))
    }

    /// Mask selecting every index in `indices`.
    pub fn multi(indices: &[u32]) -> Result<Self, CodecError> {
        let mut mask = 0u32;
        for &i in indices {
            check_index(i)?;
            mask |= 1u32 << i;
        }
        Ok(Self(mask))
    }

    /// Mask for `index` in a context offering `candidate_count` candidates.
    pub fn for_candidate(index: u32, candidate_count: usize) -> Result<Self, CodecError> {
        let limit = (candidate_count as u32).min(MAX_CANDIDATES);
        if index >= limit {
            return Err(CodecError::CandidateOutOfRange { index, limit });
        }
        Self::single(index)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// Selected candidate indices in ascending order.
    pub fn indices(&self) -> Vec<u32> {
        (0..MAX_CANDIDATES).filter(|i| self.0 & (1 << i) != 0).collect()
    }

    pub fn encode(&self) -> [u8; BITMASK_LEN] {
        self.0.to_le_bytes()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let arr: [u8; BITMASK_LEN] =
            bytes
                .try_into()
                .map_err(|_| CodecError::LengthMismatch {
                    expected: BITMASK_LEN,
                    actual: bytes.len(),
                })?;
        Ok(Self(u32::from_le_bytes(arr)))
    }
}

fn check_index(index: u32) -> Result<(), CodecError> {
    if index >= MAX_CANDIDATES {
        return Err(CodecError::CandidateOutOfRange {
            index,
            limit: MAX_CANDIDATES,
        });
    }
    Ok(())
}
