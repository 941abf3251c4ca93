//! Entitlement fetching with retry on transient indexer failures.

use daovote_types::{ContextId, Entitlement, Identity};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::IndexerError;
use crate::IndexerApi;

/// Initial retry interval.
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);
/// Maximum retry interval.
const MAX_BACKOFF: Duration = Duration::from_secs(8);
/// Attempts before a transient failure is surfaced.
const MAX_ATTEMPTS: u32 = 4;

/// Exponential backoff: each delay doubles up to `max_backoff`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            initial_backoff: INITIAL_BACKOFF,
            max_backoff: MAX_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Requests entitlement proofs from the indexer.
pub struct EntitlementClient<'a> {
    indexer: &'a dyn IndexerApi,
    policy: RetryPolicy,
}

impl<'a> EntitlementClient<'a> {
    pub fn new(indexer: &'a dyn IndexerApi, policy: RetryPolicy) -> Self {
        Self { indexer, policy }
    }

    /// Fetch a fresh entitlement for `subject` in `context_id`.
    ///
    /// Transient failures are retried with backoff and, once attempts run
    /// out, surfaced as [`IndexerError::Transient`]; they are never turned
    /// into "no entitlement".
    pub async fn fetch_entitlement(
        &self,
        subject: &Identity,
        context_id: &ContextId,
    ) -> Result<Entitlement, IndexerError> {
        let attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.indexer.prepare_entitlement(subject, context_id).await {
                Ok(entitlement) => {
                    if &entitlement.context.id != context_id {
                        return Err(IndexerError::InvalidResponse(format!(
                            "asked for context {context_id}, got {}",
                            entitlement.context.id
                        )));
                    }
                    info!(subject = %subject, context = %context_id, attempt, "entitlement fetched");
                    return Ok(entitlement);
                }
                Err(e) if e.is_transient() && attempt < attempts => {
                    let delay = self.policy.delay(attempt);
                    warn!(
                        subject = %subject,
                        context = %context_id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient indexer error, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
