//! Cell capacity amounts.
//!
//! Capacities are fixed-point integers in shannons (1 CKB = 10^8 shannons) to
//! avoid floating-point errors. A cell's capacity must cover the bytes it
//! occupies, so the same unit measures both value and storage.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

/// Shannons per whole CKB.
pub const SHANNONS_PER_CKB: u64 = 100_000_000;

/// A capacity amount in shannons.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Capacity(u64);

impl Capacity {
    pub const ZERO: Self = Self(0);

    pub fn shannons(raw: u64) -> Self {
        Self(raw)
    }

    /// Capacity for a whole number of CKB (saturating).
    pub fn ckb(units: u64) -> Self {
        Self(units.saturating_mul(SHANNONS_PER_CKB))
    }

    /// Capacity needed to store `bytes` bytes on chain.
    pub fn bytes(bytes: usize) -> Self {
        Self::ckb(bytes as u64)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl Add for Capacity {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Capacity {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Sum for Capacity {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, c| acc + c)
    }
}

impl<'a> Sum<&'a Capacity> for Capacity {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / SHANNONS_PER_CKB;
        let frac = self.0 % SHANNONS_PER_CKB;
        if frac == 0 {
            write!(f, "{whole} CKB")
        } else {
            let frac = format!("{frac:08}");
            write!(f, "{whole}.{} CKB", frac.trim_end_matches('0'))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ckb_conversion() {
        assert_eq!(Capacity::ckb(61).as_u64(), 6_100_000_000);
        assert_eq!(Capacity::bytes(4), Capacity::ckb(4));
    }

    #[test]
    fn display_trims_fraction() {
        assert_eq!(Capacity::ckb(142).to_string(), "142 CKB");
        assert_eq!(Capacity::shannons(150_000_000).to_string(), "1.5 CKB");
        assert_eq!(Capacity::shannons(1_000).to_string(), "0.00001 CKB");
    }

    #[test]
    fn checked_sub_underflow() {
        assert_eq!(Capacity::ckb(1).checked_sub(Capacity::ckb(2)), None);
        assert_eq!(Capacity::ckb(1).saturating_sub(Capacity::ckb(2)), Capacity::ZERO);
    }

    #[test]
    fn sums() {
        let total: Capacity = [Capacity::ckb(1), Capacity::ckb(2)].iter().sum();
        assert_eq!(total, Capacity::ckb(3));
    }
}
