//! Weighted vote tallies built from indexer context detail.

use daovote_indexer::ContextDetail;
use serde::Serialize;

/// Basis points in 100%.
pub const BPS_SCALE: u64 = 10_000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CandidateResult {
    pub index: u32,
    pub count: u64,
    pub weight: u64,
    /// Share of the total weight, in basis points.
    pub share_bps: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub candidates: Vec<CandidateResult>,
    pub total_weight: u64,
}

impl Tally {
    pub fn from_detail(detail: &ContextDetail) -> Self {
        let total_weight = detail.total_weight;
        let candidates = detail
            .tally_per_candidate
            .iter()
            .enumerate()
            .map(|(i, t)| CandidateResult {
                index: i as u32,
                count: t.count,
                weight: t.weight,
                share_bps: share_bps(t.weight, total_weight),
            })
            .collect();
        Self {
            candidates,
            total_weight,
        }
    }

    pub fn total_count(&self) -> u64 {
        self.candidates.iter().map(|c| c.count).sum()
    }

    /// The candidate with the most weight. `None` with no weight cast or a
    /// tie at the top.
    pub fn leader(&self) -> Option<u32> {
        let top = self.candidates.iter().map(|c| c.weight).max()?;
        if top == 0 {
            return None;
        }
        let mut leaders = self.candidates.iter().filter(|c| c.weight == top);
        let first = leaders.next()?;
        if leaders.next().is_some() {
            return None;
        }
        Some(first.index)
    }
}

fn share_bps(weight: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    let bps = u128::from(weight) * u128::from(BPS_SCALE) / u128::from(total);
    bps.min(u128::from(BPS_SCALE)) as u32
}
