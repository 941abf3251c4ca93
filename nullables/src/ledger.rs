//! Nullable ledger: an in-memory cell set and transaction pool.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use async_trait::async_trait;
use daovote_crypto::{blake2b_256, tx_hash};
use daovote_rpc::{LedgerRpc, RpcError, TxStatus};
use daovote_types::{
    Byte32, Capacity, CellOutput, LiveCell, OutPoint, Script, SignedTransaction,
};

pub struct NullLedger {
    cells: RefCell<Vec<LiveCell>>,
    next_cell: Cell<u64>,
    balance_override: Cell<Option<Capacity>>,
    sent: RefCell<Vec<SignedTransaction>>,
    send_error: RefCell<Option<RpcError>>,
    statuses: RefCell<HashMap<Byte32, TxStatus>>,
    default_status: RefCell<TxStatus>,
    status_reads: Cell<u32>,
}

impl NullLedger {
    /// Broadcast transactions report one confirmation unless told otherwise.
    pub fn new() -> Self {
        Self {
            cells: RefCell::new(Vec::new()),
            next_cell: Cell::new(0),
            balance_override: Cell::new(None),
            sent: RefCell::new(Vec::new()),
            send_error: RefCell::new(None),
            statuses: RefCell::new(HashMap::new()),
            default_status: RefCell::new(TxStatus::Committed { confirmations: 1 }),
            status_reads: Cell::new(0),
        }
    }

    /// Add a plain cell of `capacity` under `lock`, returning its out-point.
    pub fn fund(&self, lock: &Script, capacity: Capacity) -> OutPoint {
        let n = self.next_cell.get();
        self.next_cell.set(n + 1);
        let out_point = OutPoint::new(Byte32::new(blake2b_256(&n.to_le_bytes())), 0);
        self.cells.borrow_mut().push(LiveCell {
            out_point,
            output: CellOutput {
                capacity,
                lock: lock.clone(),
                type_: None,
            },
            data: Vec::new(),
        });
        out_point
    }

    /// Report `balance` from `get_balance` regardless of the cells held.
    pub fn set_balance(&self, balance: Capacity) {
        self.balance_override.set(Some(balance));
    }

    pub fn reject_sends(&self, error: RpcError) {
        self.send_error.replace(Some(error));
    }

    pub fn set_status(&self, tx: Byte32, status: TxStatus) {
        self.statuses.borrow_mut().insert(tx, status);
    }

    pub fn set_default_status(&self, status: TxStatus) {
        self.default_status.replace(status);
    }

    pub fn sent(&self) -> Vec<SignedTransaction> {
        self.sent.borrow().clone()
    }

    pub fn status_reads(&self) -> u32 {
        self.status_reads.get()
    }
}

impl Default for NullLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl LedgerRpc for NullLedger {
    async fn find_cells(&self, lock: &Script) -> Result<Vec<LiveCell>, RpcError> {
        Ok(self
            .cells
            .borrow()
            .iter()
            .filter(|c| c.output.lock == *lock)
            .cloned()
            .collect())
    }

    async fn get_balance(&self, lock: &Script) -> Result<Capacity, RpcError> {
        if let Some(balance) = self.balance_override.get() {
            return Ok(balance);
        }
        Ok(self
            .cells
            .borrow()
            .iter()
            .filter(|c| c.output.lock == *lock)
            .map(|c| c.output.capacity)
            .sum())
    }

    async fn send_transaction(&self, tx: &SignedTransaction) -> Result<Byte32, RpcError> {
        if let Some(error) = self.send_error.borrow().clone() {
            return Err(error);
        }
        self.sent.borrow_mut().push(tx.clone());
        Ok(tx_hash(&tx.transaction))
    }

    async fn transaction_status(&self, tx_hash: &Byte32) -> Result<TxStatus, RpcError> {
        self.status_reads.set(self.status_reads.get() + 1);
        let status = self.statuses.borrow().get(tx_hash).cloned();
        Ok(status.unwrap_or_else(|| self.default_status.borrow().clone()))
    }
}
