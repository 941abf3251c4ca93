//! Ledger JSON-RPC client.
//!
//! The ledger is reached through four calls:
//! - `get_cells`: live cells by lock script (input selection)
//! - `get_cells_capacity`: total capacity under a lock (balance checks)
//! - `send_transaction`: broadcast
//! - `get_transaction`: status polling, which backs `wait_for_transaction`

pub mod client;
pub mod error;
pub mod status;
pub mod wire;

pub use client::HttpLedgerRpc;
pub use error::RpcError;
pub use status::{TxStatus, WaitOptions};

use async_trait::async_trait;
use daovote_types::{Byte32, Capacity, LiveCell, Script, SignedTransaction};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// Read and write access to the ledger.
///
/// Futures are `?Send`: the client runs on a single-threaded event loop.
#[async_trait(?Send)]
pub trait LedgerRpc {
    /// Live cells locked by `lock`.
    async fn find_cells(&self, lock: &Script) -> Result<Vec<LiveCell>, RpcError>;

    /// Total capacity held under `lock`.
    async fn get_balance(&self, lock: &Script) -> Result<Capacity, RpcError>;

    /// Broadcast, returning the transaction hash assigned by the node.
    async fn send_transaction(&self, tx: &SignedTransaction) -> Result<Byte32, RpcError>;

    /// Current status of a broadcast transaction.
    async fn transaction_status(&self, tx_hash: &Byte32) -> Result<TxStatus, RpcError>;

    /// Poll [`LedgerRpc::transaction_status`] until the transaction is
    /// confirmed, rejected, or `opts.timeout` elapses.
    ///
    /// Returns the last status observed. Read errors during the wait are
    /// logged and polling continues; a wait that never read a status
    /// returns the last read error.
    async fn wait_for_transaction(
        &self,
        tx_hash: &Byte32,
        opts: &WaitOptions,
    ) -> Result<TxStatus, RpcError> {
        let deadline = Instant::now() + opts.timeout;
        let mut last: Option<TxStatus> = None;
        let mut last_error: Option<RpcError> = None;
        loop {
            match self.transaction_status(tx_hash).await {
                Ok(status) => {
                    debug!(tx = %tx_hash, %status, "ledger status");
                    if status.is_confirmed(opts.min_confirmations) || status.is_rejected() {
                        info!(tx = %tx_hash, %status, "ledger wait finished");
                        return Ok(status);
                    }
                    last = Some(status);
                }
                Err(e) => {
                    warn!(tx = %tx_hash, error = %e, "ledger status read failed");
                    last_error = Some(e);
                }
            }
            if Instant::now() + opts.poll_interval > deadline {
                return match (last, last_error) {
                    (Some(status), _) => {
                        warn!(tx = %tx_hash, %status, "ledger wait timed out");
                        Ok(status)
                    }
                    (None, Some(e)) => Err(e),
                    (None, None) => Ok(TxStatus::Unknown),
                };
            }
            sleep(opts.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::time::Duration;

    struct Scripted {
        statuses: RefCell<Vec<Result<TxStatus, RpcError>>>,
        reads: RefCell<u32>,
    }

    impl Scripted {
        fn new(mut statuses: Vec<Result<TxStatus, RpcError>>) -> Self {
            statuses.reverse();
            Self {
                statuses: RefCell::new(statuses),
                reads: RefCell::new(0),
            }
        }
    }

    #[async_trait(?Send)]
    impl LedgerRpc for Scripted {
        async fn find_cells(&self, _lock: &Script) -> Result<Vec<LiveCell>, RpcError> {
            Ok(vec![])
        }
        async fn get_balance(&self, _lock: &Script) -> Result<Capacity, RpcError> {
            Ok(Capacity::ZERO)
        }
        async fn send_transaction(&self, _tx: &SignedTransaction) -> Result<Byte32, RpcError> {
            Ok(Byte32::ZERO)
        }
        async fn transaction_status(&self, _tx: &Byte32) -> Result<TxStatus, RpcError> {
            *self.reads.borrow_mut() += 1;
            let mut statuses = self.statuses.borrow_mut();
            if statuses.len() > 1 {
                statuses.pop().unwrap_or(Ok(TxStatus::Unknown))
            } else {
                statuses.last().cloned().unwrap_or(Ok(TxStatus::Unknown))
            }
        }
    }

    fn opts(min_confirmations: u64) -> WaitOptions {
        WaitOptions {
            min_confirmations,
            timeout: Duration::from_secs(10),
            poll_interval: Duration::from_secs(1),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn waits_until_confirmed_deep_enough() {
        let ledger = Scripted::new(vec![
            Ok(TxStatus::Pending),
            Ok(TxStatus::Committed { confirmations: 1 }),
            Ok(TxStatus::Committed { confirmations: 3 }),
        ]);
        let status = ledger
            .wait_for_transaction(&Byte32::ZERO, &opts(3))
            .await
            .unwrap();
        assert_eq!(status, TxStatus::Committed { confirmations: 3 });
        assert_eq!(*ledger.reads.borrow(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn rejection_ends_the_wait() {
        let ledger = Scripted::new(vec![Ok(TxStatus::Rejected {
            reason: "double spend".into(),
        })]);
        let status = ledger
            .wait_for_transaction(&Byte32::ZERO, &opts(1))
            .await
            .unwrap();
        assert!(status.is_rejected());
        assert_eq!(*ledger.reads.borrow(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_returns_last_status() {
        let ledger = Scripted::new(vec![
            Err(RpcError::Timeout("slow".into())),
            Ok(TxStatus::Proposed),
        ]);
        let started = Instant::now();
        let status = ledger
            .wait_for_transaction(&Byte32::ZERO, &opts(1))
            .await
            .unwrap();
        assert_eq!(status, TxStatus::Proposed);
        assert!(started.elapsed() <= Duration::from_secs(10));
        assert!(*ledger.reads.borrow() >= 10);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_without_any_read_returns_the_error() {
        let ledger = Scripted::new(vec![Err(RpcError::Unreachable("node down".into()))]);
        let err = ledger
            .wait_for_transaction(&Byte32::ZERO, &opts(1))
            .await
            .unwrap_err();
        assert_eq!(err, RpcError::Unreachable("node down".into()));
    }
}
