//! Reconciles an optimistic vote submission against the indexer.

use std::cell::RefCell;
use std::time::Duration;

use daovote_governance::Tally;
use daovote_indexer::{IndexerApi, IndexerError};
use daovote_types::{Clock, ContextId, Identity, SubmissionRecord};
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

use crate::state::ReconciliationState;
use crate::tally_cache::TallyCache;
use crate::tracker::{Applied, SubmissionTracker};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// Pause between the end of one poll and the start of the next.
    pub poll_interval: Duration,
    /// Wall-clock budget before the submission is reported `TimedOut`.
    pub confirmation_timeout: Duration,
    /// Upper bound on a single status request.
    pub poll_timeout: Duration,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

pub struct ReconciliationService<'a> {
    indexer: &'a dyn IndexerApi,
    clock: &'a dyn Clock,
    config: ReconcileConfig,
    tallies: RefCell<TallyCache>,
}

impl<'a> ReconciliationService<'a> {
    pub fn new(indexer: &'a dyn IndexerApi, clock: &'a dyn Clock, config: ReconcileConfig) -> Self {
        Self {
            indexer,
            clock,
            config,
            tallies: RefCell::new(TallyCache::new()),
        }
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Tell the indexer about a broadcast submission and start tracking it.
    ///
    /// The broadcast already happened, so a failed record call is logged
    /// and tracking continues; the indexer may still pick the vote up from
    /// the chain.
    pub async fn begin(
        &self,
        record: SubmissionRecord,
        subject: Identity,
        attestation: &[u8],
    ) -> RefCell<SubmissionTracker> {
        match self.indexer.record_submission(&record, attestation).await {
            Ok(()) => info!(
                context = %record.context_id,
                tx = %record.tx_id,
                chosen_index = record.chosen_index,
                "submission recorded"
            ),
            Err(e) => warn!(
                context = %record.context_id,
                tx = %record.tx_id,
                error = %e,
                kind = %e.kind(),
                "recording submission failed"
            ),
        }
        RefCell::new(SubmissionTracker::new(record, subject))
    }

    /// Issue one status poll and offer its response to the tracker.
    ///
    /// No borrow of the tracker is held across the request, so overlapping
    /// polls on the same tracker resolve through the sequence check.
    pub async fn poll_once(
        &self,
        tracker: &RefCell<SubmissionTracker>,
    ) -> Result<Applied, IndexerError> {
        self.poll_within(tracker, self.config.poll_timeout).await
    }

    async fn poll_within(
        &self,
        tracker: &RefCell<SubmissionTracker>,
        limit: Duration,
    ) -> Result<Applied, IndexerError> {
        let (seq, subject, context_id) = {
            let mut t = tracker.borrow_mut();
            let seq = t.issue_poll();
            (seq, t.subject().clone(), t.record().context_id.clone())
        };
        debug!(context = %context_id, seq, "polling submission status");

        let status = match timeout(limit, self.indexer.submission_status(&subject, &context_id)).await
        {
            Ok(result) => result,
            Err(_) => Err(IndexerError::Transient(format!(
                "status poll timed out after {}ms",
                limit.as_millis()
            ))),
        };
        match status {
            Ok(status) => Ok(tracker
                .borrow_mut()
                .apply_status(seq, &status, self.clock.now())),
            Err(e) => {
                warn!(context = %context_id, seq, error = %e, "status poll failed");
                Err(e)
            }
        }
    }

    /// Poll serially until the submission is confirmed or the confirmation
    /// budget runs out. Poll failures are logged and polling continues; a
    /// timeout is an outcome, not an error.
    pub async fn run(&self, tracker: &RefCell<SubmissionTracker>) -> ReconciliationState {
        let deadline = Instant::now() + self.config.confirmation_timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                let mut t = tracker.borrow_mut();
                t.time_out();
                warn!(
                    context = %t.record().context_id,
                    tx = %t.record().tx_id,
                    budget_ms = self.config.confirmation_timeout.as_millis() as u64,
                    "confirmation not seen in time"
                );
                return t.state().clone();
            }
            // a failed poll is already logged; the next one is scheduled as usual
            let _ = self
                .poll_within(tracker, self.config.poll_timeout.min(remaining))
                .await;
            if let ReconciliationState::Confirmed { .. } = tracker.borrow().state() {
                return tracker.borrow().state().clone();
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            sleep(self.config.poll_interval.min(remaining)).await;
        }
    }

    /// Record the submission, then reconcile it to a final state.
    pub async fn reconcile(
        &self,
        record: SubmissionRecord,
        subject: Identity,
        attestation: &[u8],
    ) -> (RefCell<SubmissionTracker>, ReconciliationState) {
        let tracker = self.begin(record, subject, attestation).await;
        let state = self.run(&tracker).await;
        (tracker, state)
    }

    /// A later single poll for a submission that has already left the
    /// optimistic state. A timed-out submission can still become confirmed.
    pub async fn recheck(
        &self,
        tracker: &RefCell<SubmissionTracker>,
    ) -> Result<ReconciliationState, IndexerError> {
        if matches!(tracker.borrow().state(), ReconciliationState::Confirmed { .. }) {
            return Ok(tracker.borrow().state().clone());
        }
        self.poll_once(tracker).await?;
        Ok(tracker.borrow().state().clone())
    }

    /// Fetch the context's aggregate results and cache them if this is the
    /// latest request. Returns the cached tally afterwards.
    pub async fn refresh_tally(&self, context_id: &ContextId) -> Result<Option<Tally>, IndexerError> {
        let seq = self.tallies.borrow_mut().issue(context_id);
        let detail = self.indexer.context_detail(context_id).await?;
        let tally = Tally::from_detail(&detail);
        let applied = self.tallies.borrow_mut().apply(context_id, seq, tally);
        debug!(context = %context_id, seq, applied, "tally fetched");
        Ok(self.tally(context_id))
    }

    pub fn tally(&self, context_id: &ContextId) -> Option<Tally> {
        self.tallies.borrow().get(context_id).cloned()
    }
}
