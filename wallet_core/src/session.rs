//! Vote casting, vote-meta creation and identity registration.
//!
//! A vote is prepared (entitlement, window check, assembly) and then either
//! cancelled or submitted (sign, broadcast, reconcile). Only one submission
//! per context may be in flight; the prepared vote holds the claim until it
//! is cancelled or submitted.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;

use daovote_codec::VoteMeta;
use daovote_crypto::{blake2b_256_multi, encode_address};
use daovote_governance::{ensure_candidate, ensure_votable, ensure_window, Tally};
use daovote_indexer::{EntitlementClient, IndexerApi, SubmissionStatus};
use daovote_reconcile::{
    ReconciliationService, ReconciliationState, RegistrationOutcome, RegistrationReconciler,
    SubmissionPhase, SubmissionTracker,
};
use daovote_rpc::LedgerRpc;
use daovote_transactions::{
    meta_anchor, AssembledTransaction, RegistrationBuilder, TransactionAssembler, VoteMetaBuilder,
};
use daovote_types::{
    Byte32, Capacity, Clock, ContextId, Entitlement, OutPoint, SubmissionRecord, Timestamp,
    UnsignedTransaction,
};
use tracing::{info, warn};

use crate::balance::{check_lock_balance, vote_cell_requirement};
use crate::broadcaster::SigningBroadcaster;
use crate::config::SessionSettings;
use crate::error::SubmitError;
use crate::signer::KeyHolder;

/// The message a submission attestation signs.
pub fn attestation_message(record: &SubmissionRecord) -> [u8; 32] {
    blake2b_256_multi(&[
        record.context_id.as_str().as_bytes(),
        record.tx_id.as_bytes(),
        &record.chosen_index.to_le_bytes(),
        &record.submitted_at.as_secs().to_le_bytes(),
    ])
}

/// Claim on a context, released on drop.
struct InFlight<'s> {
    contexts: &'s RefCell<HashSet<ContextId>>,
    context_id: ContextId,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.contexts.borrow_mut().remove(&self.context_id);
    }
}

pub struct VoteSession<'a> {
    indexer: &'a dyn IndexerApi,
    ledger: &'a dyn LedgerRpc,
    holder: &'a dyn KeyHolder,
    clock: &'a dyn Clock,
    settings: SessionSettings,
    reconciliation: ReconciliationService<'a>,
    in_flight: RefCell<HashSet<ContextId>>,
}

impl<'a> VoteSession<'a> {
    pub fn new(
        indexer: &'a dyn IndexerApi,
        ledger: &'a dyn LedgerRpc,
        holder: &'a dyn KeyHolder,
        clock: &'a dyn Clock,
        settings: SessionSettings,
    ) -> Self {
        Self {
            indexer,
            ledger,
            holder,
            clock,
            reconciliation: ReconciliationService::new(indexer, clock, settings.reconcile),
            settings,
            in_flight: RefCell::new(HashSet::new()),
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn address(&self) -> String {
        encode_address(&self.holder.lock_script(), self.settings.assembler.network)
    }

    fn claim(&self, context_id: &ContextId) -> Result<InFlight<'_>, SubmitError> {
        if !self.in_flight.borrow_mut().insert(context_id.clone()) {
            warn!(context = %context_id, "submission already in flight");
            return Err(SubmitError::SubmissionInFlight(context_id.clone()));
        }
        Ok(InFlight {
            contexts: &self.in_flight,
            context_id: context_id.clone(),
        })
    }

    /// Fetch an entitlement and assemble a vote for `chosen_index`.
    pub async fn prepare_vote(
        &self,
        context_id: &ContextId,
        chosen_index: u32,
    ) -> Result<PreparedVote<'_, 'a>, SubmitError> {
        let guard = self.claim(context_id)?;
        let payer = self.holder.lock_script();
        check_lock_balance(self.ledger, &payer, vote_cell_requirement(payer.args.len())).await?;

        let subject = self.holder.identity();
        let entitlement = EntitlementClient::new(self.indexer, self.settings.retry)
            .fetch_entitlement(&subject, context_id)
            .await?;
        let context = &entitlement.context;
        ensure_votable(context, self.clock.now())?;
        ensure_candidate(context, chosen_index)?;

        let assembled =
            TransactionAssembler::new(self.ledger, self.settings.assembler.clone(), payer)?
                .assemble(&entitlement, context, chosen_index)
                .await?;
        info!(context = %context_id, chosen_index, fee = %assembled.fee, "vote prepared");
        Ok(PreparedVote {
            session: self,
            entitlement,
            assembled,
            chosen_index,
            _claim: guard,
        })
    }

    /// Poll once more for a vote whose reconciliation timed out.
    pub async fn recheck(&self, receipt: &VoteReceipt) -> Result<ReconciliationState, SubmitError> {
        Ok(self.reconciliation.recheck(&receipt.tracker).await?)
    }

    /// This key's submission status and the latest tally for `context_id`.
    pub async fn context_overview(
        &self,
        context_id: &ContextId,
    ) -> Result<ContextOverview, SubmitError> {
        let submission = self
            .indexer
            .submission_status(&self.holder.identity(), context_id)
            .await?;
        let tally = self.reconciliation.refresh_tally(context_id).await?;
        Ok(ContextOverview { submission, tally })
    }

    /// Put a new context's meta cell on chain. The returned anchor is
    /// output 0 of the creation transaction.
    pub async fn create_vote_meta(&self, meta: &VoteMeta) -> Result<MetaReceipt, SubmitError> {
        ensure_window(Timestamp::new(meta.start_time), Timestamp::new(meta.end_time))?;
        let address = self.address();
        let assembled = VoteMetaBuilder::new(self.ledger, &self.settings.assembler)
            .build(&address, meta)
            .await?;
        let tx_id = SigningBroadcaster::new(self.holder)
            .sign_and_send(&assembled.transaction)
            .await?;
        let anchor = meta_anchor(tx_id);
        info!(tx = %tx_id, %anchor, "vote meta created");
        Ok(MetaReceipt {
            tx_id,
            anchor,
            fee: assembled.fee,
        })
    }

    /// Register `commitment` as this key's identity.
    ///
    /// The identity is created provisionally at the indexer first. If the
    /// transaction cannot be built or broadcast, or never reaches a block
    /// within the ledger wait, the provisional identity is deleted again.
    pub async fn register_identity(
        &self,
        commitment: &Byte32,
    ) -> Result<RegistrationReceipt, SubmitError> {
        let registry = self
            .settings
            .registry
            .as_ref()
            .ok_or(SubmitError::NotConfigured("identity registry"))?;
        let subject = self.holder.identity();
        let owner = self.holder.lock_script();
        let reconciler = RegistrationReconciler::new(
            self.indexer,
            self.ledger,
            self.settings.wait,
            self.settings.rollback,
        );

        self.indexer.create_identity(&subject, commitment).await?;
        info!(%subject, %commitment, "provisional identity created");

        let broadcast = async {
            let assembled = RegistrationBuilder::new(self.ledger, &self.settings.assembler, registry)
                .build(&owner, commitment)
                .await?;
            let tx_id = SigningBroadcaster::new(self.holder)
                .sign_and_send(&assembled.transaction)
                .await?;
            Ok::<_, SubmitError>((tx_id, assembled.fee))
        };
        let (tx_id, fee) = match broadcast.await {
            Ok(sent) => sent,
            Err(e) => {
                warn!(%subject, error = %e, kind = %e.kind(), "registration not broadcast, rolling back");
                // a failed rollback is logged by the reconciler; the original
                // failure is what the caller needs to see
                let _ = reconciler.rollback(&subject).await;
                return Err(e);
            }
        };

        let outcome = reconciler.confirm(&subject, &tx_id).await?;
        Ok(RegistrationReceipt {
            tx_id,
            fee,
            outcome,
        })
    }
}

/// An assembled vote waiting to be signed.
pub struct PreparedVote<'s, 'a> {
    session: &'s VoteSession<'a>,
    entitlement: Entitlement,
    assembled: AssembledTransaction,
    chosen_index: u32,
    _claim: InFlight<'s>,
}

impl fmt::Debug for PreparedVote<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedVote")
            .field("context_id", &self.entitlement.context_id)
            .field("chosen_index", &self.chosen_index)
            .field("fee", &self.assembled.fee)
            .finish_non_exhaustive()
    }
}

impl PreparedVote<'_, '_> {
    pub fn transaction(&self) -> &UnsignedTransaction {
        &self.assembled.transaction
    }

    pub fn assembled(&self) -> &AssembledTransaction {
        &self.assembled
    }

    pub fn entitlement(&self) -> &Entitlement {
        &self.entitlement
    }

    pub fn chosen_index(&self) -> u32 {
        self.chosen_index
    }

    pub fn fee(&self) -> Capacity {
        self.assembled.fee
    }

    /// Discard the vote before signing. Nothing was sent.
    pub fn cancel(self) {
        info!(context = %self.entitlement.context_id, "prepared vote cancelled");
    }

    /// Sign, broadcast and reconcile. A reconciliation timeout is reported
    /// in the receipt's state, not as an error.
    pub async fn submit(self) -> Result<VoteReceipt, SubmitError> {
        let session = self.session;
        let tx_id = SigningBroadcaster::new(session.holder)
            .sign_and_send(&self.assembled.transaction)
            .await?;

        let subject = session.holder.identity();
        let record = SubmissionRecord {
            context_id: self.entitlement.context_id.clone(),
            tx_id,
            chosen_index: self.chosen_index,
            signer: subject.clone(),
            submitted_at: session.clock.now(),
        };
        let attestation = match session
            .holder
            .sign_message(&attestation_message(&record))
            .await
        {
            Ok(signature) => signature,
            Err(e) => {
                warn!(tx = %tx_id, error = %e, "attestation not signed, recording without it");
                Vec::new()
            }
        };

        let (tracker, state) = session
            .reconciliation
            .reconcile(record, subject, &attestation)
            .await;
        let phase = tracker.borrow().phase();
        Ok(VoteReceipt {
            tx_id,
            fee: self.assembled.fee,
            state,
            phase,
            tracker,
        })
    }
}

#[derive(Debug)]
pub struct VoteReceipt {
    pub tx_id: Byte32,
    pub fee: Capacity,
    pub state: ReconciliationState,
    pub phase: SubmissionPhase,
    tracker: RefCell<SubmissionTracker>,
}

impl VoteReceipt {
    pub fn current_state(&self) -> ReconciliationState {
        self.tracker.borrow().state().clone()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetaReceipt {
    pub tx_id: Byte32,
    pub anchor: OutPoint,
    pub fee: Capacity,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistrationReceipt {
    pub tx_id: Byte32,
    pub fee: Capacity,
    pub outcome: RegistrationOutcome,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextOverview {
    pub submission: SubmissionStatus,
    pub tally: Option<Tally>,
}
