//! Identity registration transactions.
//!
//! One output carrying the identity type script, whose args are derived
//! from the registry's anchor cell, and the 32-byte identity commitment as
//! data.

use daovote_crypto::{derive_type_args, TYPE_ARGS_LEN};
use daovote_rpc::LedgerRpc;
use daovote_types::{Byte32, Capacity, CellOutput, OutPoint, Script, UnsignedTransaction};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assembler::{ensure_args_len, finish, AssembledTransaction, AssemblerConfig};
use crate::capacity::CellPool;
use crate::completer::{Balancer, Draft};
use crate::deps::{resolve_cell_deps, ContractDeployment};
use crate::error::AssembleError;

/// The identity registry on chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRegistry {
    pub contract: ContractDeployment,
    /// Cell every identity's type args are derived from.
    pub anchor: OutPoint,
}

pub struct RegistrationBuilder<'a> {
    ledger: &'a dyn LedgerRpc,
    config: &'a AssemblerConfig,
    registry: &'a IdentityRegistry,
}

impl<'a> RegistrationBuilder<'a> {
    pub fn new(
        ledger: &'a dyn LedgerRpc,
        config: &'a AssemblerConfig,
        registry: &'a IdentityRegistry,
    ) -> Self {
        Self {
            ledger,
            config,
            registry,
        }
    }

    /// Build a registration of `commitment`, owned and funded by `owner`.
    pub async fn build(
        &self,
        owner: &Script,
        commitment: &Byte32,
    ) -> Result<AssembledTransaction, AssembleError> {
        ensure_args_len("owner lock", &owner.args, self.config.lock.args_len)?;
        let type_args = derive_type_args(&self.registry.anchor)?;
        let type_script = self.registry.contract.script(type_args.to_vec());
        ensure_args_len("type", &type_script.args, TYPE_ARGS_LEN)?;

        let data = commitment.as_bytes().to_vec();
        let mut output = CellOutput {
            capacity: Capacity::ZERO,
            lock: owner.clone(),
            type_: Some(type_script),
        };
        output.capacity = output.occupied_capacity(data.len());
        let capacity = output.capacity;

        let mut tx = UnsignedTransaction::new();
        let index = tx.push_output(output, data);
        resolve_cell_deps(
            &mut tx,
            &self.registry.contract,
            Some(&self.registry.anchor),
            &self.config.lock,
        );

        let cells = self.ledger.find_cells(owner).await?;
        let mut draft = Draft::new(tx, CellPool::new(cells), self.config.lock_placeholder_len);
        draft.fund(capacity)?;
        let pass = Balancer::new(self.config.balance, owner.clone()).balance(&mut draft, 1)?;

        let assembled = finish(draft, index, vec![pass])?;
        info!(capacity = %capacity, fee = %assembled.fee, "registration transaction assembled");
        Ok(assembled)
    }
}
