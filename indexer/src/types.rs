//! Indexer responses in domain form.

use daovote_types::Byte32;

/// What the indexer knows about one subject's submission in a context.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubmissionStatus {
    /// The choice the indexer has on record, once it has seen the vote.
    pub chosen_index: Option<u32>,
    pub confirmed_tx_id: Option<Byte32>,
}

impl SubmissionStatus {
    pub fn is_confirmed(&self) -> bool {
        self.chosen_index.is_some()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CandidateTally {
    pub count: u64,
    pub weight: u64,
}

/// Aggregate results of a context as computed by the indexer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContextDetail {
    pub tally_per_candidate: Vec<CandidateTally>,
    pub total_weight: u64,
}
