//! Poll sequencing: only the most recently issued poll may be applied.

/// Issues increasing sequence numbers and decides which responses apply.
///
/// A response is applied only if its sequence equals the latest issued
/// one, so a slow response to an older poll can never overwrite newer
/// state. Owned by one tracker; there is no shared counter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PollSequencer {
    issued: u64,
    applied: Option<u64>,
}

impl PollSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence number for a new poll.
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    pub fn latest_issued(&self) -> u64 {
        self.issued
    }

    pub fn last_applied(&self) -> Option<u64> {
        self.applied
    }

    /// Record `seq` as applied if it is the latest issued. Returns whether
    /// the caller should apply the response.
    pub fn try_apply(&mut self, seq: u64) -> bool {
        if seq != self.issued || self.applied == Some(seq) {
            return false;
        }
        self.applied = Some(seq);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_responses_are_dropped() {
        let mut seq = PollSequencer::new();
        for _ in 0..5 {
            seq.issue();
        }
        assert!(seq.try_apply(5));
        assert!(!seq.try_apply(4));
        assert_eq!(seq.last_applied(), Some(5));
    }

    #[test]
    fn response_to_superseded_poll_is_dropped() {
        let mut seq = PollSequencer::new();
        let first = seq.issue();
        let second = seq.issue();
        assert!(!seq.try_apply(first));
        assert!(seq.try_apply(second));
        // applying twice is a no-op
        assert!(!seq.try_apply(second));
    }
}
