use proptest::prelude::*;

use daovote_types::{Byte32, Capacity, Timestamp};

proptest! {
    /// Byte32 hex roundtrip: to_hex -> parse produces identical hash.
    #[test]
    fn byte32_hex_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let hash = Byte32::new(bytes);
        let parsed: Byte32 = hash.to_hex().parse().unwrap();
        prop_assert_eq!(parsed, hash);
    }

    /// Byte32::is_zero is true only for all-zero bytes.
    #[test]
    fn byte32_is_zero_correct(bytes in prop::array::uniform32(0u8..)) {
        let hash = Byte32::new(bytes);
        prop_assert_eq!(hash.is_zero(), bytes == [0u8; 32]);
    }

    /// Timestamp elapsed_since: elapsed_since(now) = now - self (saturating).
    #[test]
    fn timestamp_elapsed_since(base in 0u64..1_000_000, offset in 0u64..1_000_000) {
        let t = Timestamp::new(base);
        let now = Timestamp::new(base + offset);
        prop_assert_eq!(t.elapsed_since(now), offset);
    }

    /// Timestamp has_expired agrees with manual arithmetic.
    #[test]
    fn timestamp_has_expired_correct(
        start in 0u64..500_000,
        duration in 1u64..500_000,
        offset in 0u64..1_000_000,
    ) {
        let t = Timestamp::new(start);
        let now = Timestamp::new(start.saturating_add(offset));
        prop_assert_eq!(t.has_expired(duration, now), offset >= duration);
    }

    /// Capacity: checked_add(a, b) == Some(a + b) when no overflow.
    #[test]
    fn capacity_checked_add(a in 0u64..u64::MAX / 2, b in 0u64..u64::MAX / 2) {
        let sum = Capacity::shannons(a).checked_add(Capacity::shannons(b));
        prop_assert_eq!(sum, Some(Capacity::shannons(a + b)));
    }

    /// Capacity: checked_sub fails exactly when b > a.
    #[test]
    fn capacity_checked_sub(a in 0u64..1_000_000_000, b in 0u64..1_000_000_000) {
        let diff = Capacity::shannons(a).checked_sub(Capacity::shannons(b));
        prop_assert_eq!(diff.is_none(), b > a);
    }

    /// Storage capacity is one CKB per byte.
    #[test]
    fn capacity_bytes_is_linear(n in 0usize..100_000) {
        prop_assert_eq!(Capacity::bytes(n).as_u64(), n as u64 * 100_000_000);
    }
}
