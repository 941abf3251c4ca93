//! Vote transaction assembly.
//!
//! A vote is one output whose type script is bound to the context's anchor
//! cell and whose data is the choice bitmask. The entitlement proof rides in
//! the first input's witness, in the `output_type` field. Because the proof
//! only exists once the inputs do, fees are completed twice:
//!
//! 1. resolve the commitment address's lock
//! 2. build the vote output
//! 3. resolve cell deps
//! 4. select inputs for the output capacity
//! 5. first fee pass, with only a lock placeholder in the witness
//! 6. embed the proof envelope in the witness
//! 7. second fee pass against the enlarged witness

use daovote_codec::{witness, ChoiceBitmask, VoteProofEnvelope};
use daovote_crypto::{decode_address, derive_type_args, script_hash, TYPE_ARGS_LEN};
use daovote_rpc::LedgerRpc;
use daovote_types::{
    Capacity, CellOutput, Context, Entitlement, NetworkId, Script, ShapeError,
    UnsignedTransaction,
};
use tracing::{debug, info};

use crate::capacity::CellPool;
use crate::completer::{BalanceConfig, Balancer, Draft, PassReport, DEFAULT_LOCK_PLACEHOLDER_LEN};
use crate::deps::{resolve_cell_deps, ContractDeployment, LockDeployment};
use crate::error::AssembleError;

#[derive(Clone, Debug)]
pub struct AssemblerConfig {
    pub network: NetworkId,
    pub vote_contract: ContractDeployment,
    pub lock: LockDeployment,
    pub balance: BalanceConfig,
    /// Bytes reserved in the first witness's lock for the signature.
    pub lock_placeholder_len: usize,
}

impl AssemblerConfig {
    pub fn new(network: NetworkId, vote_contract: ContractDeployment, lock: LockDeployment) -> Self {
        Self {
            network,
            vote_contract,
            lock,
            balance: BalanceConfig::default(),
            lock_placeholder_len: DEFAULT_LOCK_PLACEHOLDER_LEN,
        }
    }
}

/// A balanced transaction ready for signing.
#[derive(Clone, Debug)]
pub struct AssembledTransaction {
    pub transaction: UnsignedTransaction,
    /// Index of the output the transaction exists to create.
    pub primary_output: usize,
    pub change_index: Option<usize>,
    /// Fee actually paid: inputs minus outputs.
    pub fee: Capacity,
    pub passes: Vec<PassReport>,
}

pub(crate) fn finish(
    draft: Draft,
    primary_output: usize,
    passes: Vec<PassReport>,
) -> Result<AssembledTransaction, AssembleError> {
    let change_index = draft.change_index();
    let fee = draft.fee_paid();
    let transaction = draft.into_transaction();
    transaction.check_shape()?;
    Ok(AssembledTransaction {
        transaction,
        primary_output,
        change_index,
        fee,
        passes,
    })
}

pub(crate) fn ensure_args_len(
    what: &'static str,
    args: &[u8],
    expected: usize,
) -> Result<(), AssembleError> {
    if args.len() != expected {
        return Err(AssembleError::ArgsLengthMismatch {
            what,
            expected,
            actual: args.len(),
        });
    }
    Ok(())
}

/// Decode `address` and check it is for `network`.
pub(crate) fn resolve_address(
    address: &str,
    network: NetworkId,
    lock: &LockDeployment,
) -> Result<Script, AssembleError> {
    let (found, script) = decode_address(address)?;
    if found != network {
        return Err(AssembleError::NetworkMismatch {
            expected: network,
            found,
        });
    }
    if lock.matches(&script) {
        ensure_args_len("lock", &script.args, lock.args_len)?;
    }
    Ok(script)
}

/// Builds vote transactions funded by `payer`.
pub struct TransactionAssembler<'a> {
    ledger: &'a dyn LedgerRpc,
    config: AssemblerConfig,
    payer: Script,
}

impl<'a> TransactionAssembler<'a> {
    pub fn new(
        ledger: &'a dyn LedgerRpc,
        config: AssemblerConfig,
        payer: Script,
    ) -> Result<Self, AssembleError> {
        ensure_args_len("payer lock", &payer.args, config.lock.args_len)?;
        Ok(Self {
            ledger,
            config,
            payer,
        })
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    pub fn payer(&self) -> &Script {
        &self.payer
    }

    /// Assemble a vote for candidate `chosen_index` of `context`.
    pub async fn assemble(
        &self,
        entitlement: &Entitlement,
        context: &Context,
        chosen_index: u32,
    ) -> Result<AssembledTransaction, AssembleError> {
        if entitlement.proof.is_empty() {
            return Err(AssembleError::MissingEntitlementProof);
        }
        let anchor = context
            .anchor
            .ok_or_else(|| AssembleError::MissingAnchor(context.id.to_string()))?;
        let bitmask = ChoiceBitmask::for_candidate(chosen_index, context.candidate_count())?;

        // 1. the vote cell belongs to the commitment address
        let lock = resolve_address(
            &entitlement.commitment_address,
            self.config.network,
            &self.config.lock,
        )?;

        // 2. type script bound to the anchor, data is the bitmask
        let type_args = derive_type_args(&anchor)?;
        let type_script = self.config.vote_contract.script(type_args.to_vec());
        ensure_args_len("type", &type_script.args, TYPE_ARGS_LEN)?;
        let data = bitmask.encode().to_vec();
        let mut output = CellOutput {
            capacity: Capacity::ZERO,
            lock,
            type_: Some(type_script.clone()),
        };
        output.capacity = output.occupied_capacity(data.len());
        let vote_capacity = output.capacity;

        let mut tx = UnsignedTransaction::new();
        let vote_index = tx.push_output(output, data);
        debug!(context = %context.id, %anchor, chosen_index, capacity = %vote_capacity, "vote output built");

        // 3.
        resolve_cell_deps(&mut tx, &self.config.vote_contract, Some(&anchor), &self.config.lock);

        // 4.
        let cells = self.ledger.find_cells(&self.payer).await?;
        let mut draft = Draft::new(tx, CellPool::new(cells), self.config.lock_placeholder_len);
        draft.fund(vote_capacity)?;

        // 5.
        let balancer = Balancer::new(self.config.balance, self.payer.clone());
        let first = balancer.balance(&mut draft, 1)?;

        // 6.
        let envelope =
            VoteProofEnvelope::new(*script_hash(&type_script).as_bytes(), entitlement.proof.clone());
        let slot = draft.tx.witnesses.first_mut().ok_or(ShapeError::NoInputs)?;
        *slot = witness::patch_output_type(slot, envelope.encode())?;
        debug!(envelope_len = envelope.encoded_len(), "proof embedded");

        // 7.
        let second = balancer.balance(&mut draft, 2)?;

        let assembled = finish(draft, vote_index, vec![first, second])?;
        info!(
            context = %context.id,
            inputs = assembled.transaction.inputs.len(),
            outputs = assembled.transaction.outputs.len(),
            fee = %assembled.fee,
            "vote transaction assembled"
        );
        Ok(assembled)
    }
}
