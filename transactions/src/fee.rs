//! Transaction fees.
//!
//! Fees are charged per byte of the transaction as it sits in a block
//! (serialized size plus a 4-byte offset), at a rate in shannons per
//! 1000 bytes, rounded up.

use daovote_codec::serialized_size_in_block;
use daovote_types::{Capacity, UnsignedTransaction};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The node's default minimum relay fee rate.
pub const DEFAULT_FEE_RATE: u64 = 1_000;

/// Fee rate in shannons per 1000 bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeRate(u64);

impl FeeRate {
    pub fn new(shannons_per_kb: u64) -> Self {
        Self(shannons_per_kb)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Fee for `size` bytes.
    pub fn fee_for_size(&self, size: usize) -> Capacity {
        let product = u128::from(self.0) * size as u128;
        let fee = product.div_ceil(1_000);
        Capacity::shannons(u64::try_from(fee).unwrap_or(u64::MAX))
    }

    /// Fee for `tx` as it stands.
    pub fn fee_for(&self, tx: &UnsignedTransaction) -> Capacity {
        self.fee_for_size(serialized_size_in_block(tx))
    }
}

impl Default for FeeRate {
    fn default() -> Self {
        Self(DEFAULT_FEE_RATE)
    }
}

impl fmt::Display for FeeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} shannons/KB", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_up() {
        let rate = FeeRate::new(1_000);
        assert_eq!(rate.fee_for_size(1), Capacity::shannons(1));
        assert_eq!(rate.fee_for_size(1_000), Capacity::shannons(1_000));

        let slow = FeeRate::new(3);
        // 3 * 100 / 1000 = 0.3, rounded up
        assert_eq!(slow.fee_for_size(100), Capacity::shannons(1));
        assert_eq!(slow.fee_for_size(0), Capacity::ZERO);
    }

    #[test]
    fn empty_transaction_fee() {
        // empty tx serializes to 68 bytes, plus 4 in a block
        let fee = FeeRate::default().fee_for(&UnsignedTransaction::new());
        assert_eq!(fee, Capacity::shannons(72));
    }
}
