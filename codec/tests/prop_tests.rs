use proptest::prelude::*;

use daovote_codec::{ChoiceBitmask, VoteMeta, VoteProofEnvelope, WitnessArgs};

proptest! {
    /// decode(encode(P)) == P for every proof byte string.
    #[test]
    fn envelope_round_trip(
        hash in prop::array::uniform32(0u8..),
        proof in prop::collection::vec(any::<u8>(), 0..512),
    ) {
        let env = VoteProofEnvelope::new(hash, proof);
        let bytes = env.encode();
        prop_assert_eq!(bytes.len(), 32 + env.merkle_proof.len());
        prop_assert_eq!(VoteProofEnvelope::decode(&bytes).unwrap(), env);
    }

    /// Anything shorter than a script hash is rejected.
    #[test]
    fn envelope_rejects_short(bytes in prop::collection::vec(any::<u8>(), 0..32)) {
        prop_assert!(VoteProofEnvelope::decode(&bytes).is_err());
    }

    /// decode(encode(i)) == 1 << i, always 4 bytes.
    #[test]
    fn bitmask_round_trip(index in 0u32..32) {
        let encoded = ChoiceBitmask::single(index).unwrap().encode();
        prop_assert_eq!(encoded.len(), 4);
        prop_assert_eq!(ChoiceBitmask::decode(&encoded).unwrap().value(), 1u32 << index);
    }

    /// Patching output_type never disturbs lock or input_type.
    #[test]
    fn witness_patch_preserves_other_fields(
        lock in prop::option::of(prop::collection::vec(any::<u8>(), 0..100)),
        input_type in prop::option::of(prop::collection::vec(any::<u8>(), 0..100)),
        output_type in prop::collection::vec(any::<u8>(), 0..300),
    ) {
        let original = WitnessArgs { lock: lock.clone(), input_type: input_type.clone(), output_type: None };
        let patched = daovote_codec::witness::patch_output_type(&original.encode(), output_type.clone()).unwrap();
        let decoded = WitnessArgs::decode(&patched).unwrap();
        prop_assert_eq!(decoded.lock, lock);
        prop_assert_eq!(decoded.input_type, input_type);
        prop_assert_eq!(decoded.output_type, Some(output_type));
    }

    /// VoteMeta survives encoding with arbitrary candidate lists.
    #[test]
    fn vote_meta_round_trip(
        candidates in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..40), 0..8),
        start in any::<u64>(),
        end in any::<u64>(),
    ) {
        let meta = VoteMeta { smt_root_hash: None, candidates, start_time: start, end_time: end, extra: None };
        prop_assert_eq!(VoteMeta::decode(&meta.encode()).unwrap(), meta);
    }
}
