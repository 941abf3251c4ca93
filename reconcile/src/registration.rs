//! Ledger confirmation of identity registrations, with compensating
//! rollback at the indexer when the registration does not commit.

use std::time::Duration;

use daovote_indexer::IndexerApi;
use daovote_rpc::{LedgerRpc, TxStatus, WaitOptions};
use daovote_types::{Byte32, Identity};
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::error::ReconcileError;
use crate::state::SubmissionPhase;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RollbackPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RollbackPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Committed { status: TxStatus },
    /// In a block but shallower than the requested depth when the wait
    /// ended. The identity is kept.
    Unsettled { status: TxStatus },
    /// Not committed in time; the provisional identity was deleted.
    RolledBack { status: TxStatus },
}

impl RegistrationOutcome {
    pub fn phase(&self) -> SubmissionPhase {
        match self {
            Self::Committed { .. } => SubmissionPhase::Confirmed,
            Self::Unsettled { .. } => SubmissionPhase::AwaitingConfirmation,
            Self::RolledBack { .. } => SubmissionPhase::Failed,
        }
    }
}

pub struct RegistrationReconciler<'a> {
    indexer: &'a dyn IndexerApi,
    ledger: &'a dyn LedgerRpc,
    wait: WaitOptions,
    rollback: RollbackPolicy,
}

impl<'a> RegistrationReconciler<'a> {
    pub fn new(
        indexer: &'a dyn IndexerApi,
        ledger: &'a dyn LedgerRpc,
        wait: WaitOptions,
        rollback: RollbackPolicy,
    ) -> Self {
        Self {
            indexer,
            ledger,
            wait,
            rollback,
        }
    }

    /// Wait for the registration transaction. A status that never reached
    /// a block within the wait budget rolls back the provisional identity.
    ///
    /// A failed ledger read is returned as is: the transaction may still
    /// commit, so nothing is deleted.
    pub async fn confirm(
        &self,
        subject: &Identity,
        tx_hash: &Byte32,
    ) -> Result<RegistrationOutcome, ReconcileError> {
        let status = self
            .ledger
            .wait_for_transaction(tx_hash, &self.wait)
            .await
            .inspect_err(|e| warn!(%subject, tx = %tx_hash, error = %e, "ledger wait failed"))?;
        if status.is_confirmed(self.wait.min_confirmations) {
            info!(%subject, tx = %tx_hash, %status, "registration committed");
            return Ok(RegistrationOutcome::Committed { status });
        }
        if status.is_committed() {
            warn!(%subject, tx = %tx_hash, %status, "registration committed below requested depth");
            return Ok(RegistrationOutcome::Unsettled { status });
        }
        warn!(%subject, tx = %tx_hash, %status, "registration not committed, rolling back");
        self.rollback(subject).await?;
        Ok(RegistrationOutcome::RolledBack { status })
    }

    /// Delete the provisional identity, retrying a bounded number of times.
    pub async fn rollback(&self, subject: &Identity) -> Result<(), ReconcileError> {
        let attempts = self.rollback.attempts.max(1);
        let mut last_error = String::new();
        for attempt in 1..=attempts {
            match self.indexer.delete_identity(subject).await {
                Ok(()) => {
                    info!(%subject, attempt, "provisional identity deleted");
                    return Ok(());
                }
                Err(e) => {
                    warn!(%subject, attempt, error = %e, "identity delete failed");
                    last_error = e.to_string();
                }
            }
            if attempt < attempts {
                sleep(self.rollback.backoff).await;
            }
        }
        error!(%subject, attempts, error = %last_error, "identity rollback failed, operator action needed");
        Err(ReconcileError::RollbackFailed {
            subject: subject.clone(),
            attempts,
            last_error,
        })
    }
}
