//! HTTP JSON-RPC client for a ledger node with the cell indexer enabled.

use async_trait::async_trait;
use daovote_types::{Byte32, Capacity, LiveCell, Script, SignedTransaction};
use serde::Deserialize;
use serde_json::{json, Value};
use std::cell::Cell;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::RpcError;
use crate::status::TxStatus;
use crate::wire::{hex_u64, CellsCapacity, CellsPage, JsonTransaction, SearchKey, TransactionWithStatus};
use crate::LedgerRpc;

/// Default timeout for ledger requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Cells fetched per `get_cells` page.
pub const PAGE_SIZE: u64 = 100;

/// Upper bound on cells collected for one lock.
pub const MAX_CELLS: usize = 2_000;

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

/// Ledger RPC over HTTP.
pub struct HttpLedgerRpc {
    http: reqwest::Client,
    url: String,
    next_id: Cell<u64>,
}

impl HttpLedgerRpc {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            url: url.into(),
            next_id: Cell::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let body = json!({
            "id": id,
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
        });
        debug!(method, id, "ledger rpc call");

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(RpcError::from_reqwest)?;

        if !response.status().is_success() {
            return Err(RpcError::Unreachable(format!(
                "node returned HTTP {}",
                response.status()
            )));
        }

        let resp: RpcResponse = response.json().await.map_err(RpcError::from_reqwest)?;
        if let Some(err) = resp.error {
            return Err(RpcError::Node {
                code: err.code,
                message: err.message,
            });
        }
        Ok(resp.result.unwrap_or(Value::Null))
    }

    async fn tip_block_number(&self) -> Result<u64, RpcError> {
        let result = self.rpc_call("get_tip_block_number", json!([])).await?;
        let s = result
            .as_str()
            .ok_or_else(|| RpcError::InvalidResponse("tip block number is not a string".into()))?;
        hex_u64::parse(s).map_err(RpcError::InvalidResponse)
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: Value, what: &str) -> Result<T, RpcError> {
    serde_json::from_value(value)
        .map_err(|e| RpcError::InvalidResponse(format!("invalid {what} response: {e}")))
}

#[async_trait(?Send)]
impl LedgerRpc for HttpLedgerRpc {
    async fn find_cells(&self, lock: &Script) -> Result<Vec<LiveCell>, RpcError> {
        let mut cells = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let params = json!([
                SearchKey::lock(lock),
                "asc",
                format!("{PAGE_SIZE:#x}"),
                cursor,
            ]);
            let page: CellsPage = decode(self.rpc_call("get_cells", params).await?, "get_cells")?;
            let returned = page.objects.len();
            cells.extend(page.objects.into_iter().map(LiveCell::from));
            if (returned as u64) < PAGE_SIZE || cells.len() >= MAX_CELLS {
                break;
            }
            cursor = Some(page.last_cursor);
        }
        debug!(count = cells.len(), "found live cells");
        Ok(cells)
    }

    async fn get_balance(&self, lock: &Script) -> Result<Capacity, RpcError> {
        let result = self
            .rpc_call("get_cells_capacity", json!([SearchKey::lock(lock)]))
            .await?;
        // The indexer answers null for a lock it has never seen.
        if result.is_null() {
            return Ok(Capacity::ZERO);
        }
        let cap: CellsCapacity = decode(result, "get_cells_capacity")?;
        Ok(Capacity::shannons(cap.capacity))
    }

    async fn send_transaction(&self, tx: &SignedTransaction) -> Result<Byte32, RpcError> {
        let wire = JsonTransaction::from(&tx.transaction);
        let result = self
            .rpc_call("send_transaction", json!([wire, "passthrough"]))
            .await?;
        decode(result, "send_transaction")
    }

    async fn transaction_status(&self, tx_hash: &Byte32) -> Result<TxStatus, RpcError> {
        let result = self.rpc_call("get_transaction", json!([tx_hash])).await?;
        if result.is_null() {
            return Ok(TxStatus::Unknown);
        }
        let with_status: TransactionWithStatus = decode(result, "get_transaction")?;
        let tip = if with_status.tx_status.status == "committed" {
            match self.tip_block_number().await {
                Ok(tip) => Some(tip),
                Err(e) => {
                    warn!(error = %e, "could not read tip block number");
                    None
                }
            }
        } else {
            None
        };
        with_status.tx_status.into_status(tip)
    }
}
