//! Vote-meta creation: the proposer action that puts a context on chain.
//!
//! The meta cell is always output 0 of the creation transaction, so the
//! context's anchor is `{tx_hash, 0}`.

use daovote_codec::VoteMeta;
use daovote_rpc::LedgerRpc;
use daovote_types::{Byte32, Capacity, CellOutput, OutPoint, UnsignedTransaction};
use tracing::info;

use crate::assembler::{finish, resolve_address, AssembledTransaction, AssemblerConfig};
use crate::capacity::CellPool;
use crate::completer::{Balancer, Draft};
use crate::error::AssembleError;

/// Output index of the meta cell.
pub const META_OUTPUT_INDEX: u32 = 0;

/// The anchor of a context created by transaction `tx_hash`.
pub fn meta_anchor(tx_hash: Byte32) -> OutPoint {
    OutPoint::new(tx_hash, META_OUTPUT_INDEX)
}

pub struct VoteMetaBuilder<'a> {
    ledger: &'a dyn LedgerRpc,
    config: &'a AssemblerConfig,
}

impl<'a> VoteMetaBuilder<'a> {
    pub fn new(ledger: &'a dyn LedgerRpc, config: &'a AssemblerConfig) -> Self {
        Self { ledger, config }
    }

    /// Build the creation transaction. The proposer's cells fund it and
    /// the proposer's lock guards the meta cell. One fee pass: there is no
    /// proof to embed.
    pub async fn build(
        &self,
        proposer_address: &str,
        meta: &VoteMeta,
    ) -> Result<AssembledTransaction, AssembleError> {
        let lock = resolve_address(proposer_address, self.config.network, &self.config.lock)?;
        let data = meta.encode();
        let mut output = CellOutput {
            capacity: Capacity::ZERO,
            lock: lock.clone(),
            type_: None,
        };
        output.capacity = output.occupied_capacity(data.len());
        let meta_capacity = output.capacity;

        let mut tx = UnsignedTransaction::new();
        let index = tx.push_output(output, data);
        tx.add_cell_dep(self.config.lock.cell_dep());

        let cells = self.ledger.find_cells(&lock).await?;
        let mut draft = Draft::new(tx, CellPool::new(cells), self.config.lock_placeholder_len);
        draft.fund(meta_capacity)?;
        let pass = Balancer::new(self.config.balance, lock).balance(&mut draft, 1)?;

        let assembled = finish(draft, index, vec![pass])?;
        info!(
            candidates = meta.candidates.len(),
            capacity = %meta_capacity,
            fee = %assembled.fee,
            "vote meta transaction assembled"
        );
        Ok(assembled)
    }
}
