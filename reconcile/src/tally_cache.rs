//! Per-context tally cache guarded by poll sequence.

use std::collections::HashMap;

use daovote_governance::Tally;
use daovote_types::ContextId;

use crate::sequencer::PollSequencer;

#[derive(Debug, Default)]
struct Entry {
    sequencer: PollSequencer,
    tally: Option<Tally>,
}

/// Latest known tally per context. A fetched tally replaces the cached
/// one only if it answers the most recent request for that context.
#[derive(Debug, Default)]
pub struct TallyCache {
    entries: HashMap<ContextId, Entry>,
}

impl TallyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self, context_id: &ContextId) -> u64 {
        self.entries
            .entry(context_id.clone())
            .or_default()
            .sequencer
            .issue()
    }

    /// Store `tally` if `seq` is still the latest request. Returns whether
    /// it was stored.
    pub fn apply(&mut self, context_id: &ContextId, seq: u64, tally: Tally) -> bool {
        let Some(entry) = self.entries.get_mut(context_id) else {
            return false;
        };
        if !entry.sequencer.try_apply(seq) {
            return false;
        }
        entry.tally = Some(tally);
        true
    }

    pub fn get(&self, context_id: &ContextId) -> Option<&Tally> {
        self.entries.get(context_id)?.tally.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(total_weight: u64) -> Tally {
        Tally {
            candidates: Vec::new(),
            total_weight,
        }
    }

    #[test]
    fn older_response_does_not_replace_newer() {
        let ctx = ContextId::new("c");
        let mut cache = TallyCache::new();
        let first = cache.issue(&ctx);
        let second = cache.issue(&ctx);

        assert!(cache.apply(&ctx, second, tally(20)));
        assert!(!cache.apply(&ctx, first, tally(10)));
        assert_eq!(cache.get(&ctx).map(|t| t.total_weight), Some(20));
    }

    #[test]
    fn contexts_are_independent() {
        let (a, b) = (ContextId::new("a"), ContextId::new("b"));
        let mut cache = TallyCache::new();
        let seq_a = cache.issue(&a);
        cache.issue(&b);
        let seq_b = cache.issue(&b);

        assert!(cache.apply(&a, seq_a, tally(1)));
        assert!(cache.apply(&b, seq_b, tally(2)));
        assert_eq!(cache.get(&a).map(|t| t.total_weight), Some(1));
        assert!(cache.get(&ContextId::new("unknown")).is_none());
    }

    #[test]
    fn unissued_context_is_ignored() {
        let mut cache = TallyCache::new();
        assert!(!cache.apply(&ContextId::new("x"), 1, tally(5)));
    }
}
