//! JSON shapes of the ledger's RPC, with numbers as `0x` hex strings.
//!
//! Domain types serialize integers as plain JSON numbers; the node expects
//! `"0x1f4"`. These mirrors convert at the boundary.

use daovote_types::{
    hex_serde, Byte32, Capacity, CellDep, CellOutput, DepType, LiveCell, OutPoint,
    Script, UnsignedTransaction,
};
use serde::{Deserialize, Serialize};

use crate::error::RpcError;
use crate::status::TxStatus;

/// `0x`-prefixed, no leading zeros, `0x0` for zero.
pub(crate) mod hex_u64 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(n: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{n:#x}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(serde::de::Error::custom)
    }

    pub fn parse(s: &str) -> Result<u64, String> {
        let digits = s
            .strip_prefix("0x")
            .ok_or_else(|| format!("missing 0x prefix: {s}"))?;
        u64::from_str_radix(digits, 16).map_err(|e| format!("bad hex number {s}: {e}"))
    }
}

pub(crate) mod hex_u32 {
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(n: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        super::hex_u64::serialize(&u64::from(*n), serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let n = super::hex_u64::deserialize(deserializer)?;
        u32::try_from(n).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonOutPoint {
    pub tx_hash: Byte32,
    #[serde(with = "hex_u32")]
    pub index: u32,
}

impl From<&OutPoint> for JsonOutPoint {
    fn from(op: &OutPoint) -> Self {
        Self {
            tx_hash: op.tx_hash,
            index: op.index,
        }
    }
}

impl From<JsonOutPoint> for OutPoint {
    fn from(op: JsonOutPoint) -> Self {
        OutPoint::new(op.tx_hash, op.index)
    }
}

#[derive(Debug, Serialize)]
pub struct JsonCellDep {
    pub out_point: JsonOutPoint,
    pub dep_type: DepType,
}

#[derive(Debug, Serialize)]
pub struct JsonCellInput {
    #[serde(with = "hex_u64")]
    pub since: u64,
    pub previous_output: JsonOutPoint,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonCellOutput {
    #[serde(with = "hex_u64")]
    pub capacity: u64,
    pub lock: Script,
    #[serde(rename = "type", default)]
    pub type_: Option<Script>,
}

impl From<&CellOutput> for JsonCellOutput {
    fn from(o: &CellOutput) -> Self {
        Self {
            capacity: o.capacity.as_u64(),
            lock: o.lock.clone(),
            type_: o.type_.clone(),
        }
    }
}

impl From<JsonCellOutput> for CellOutput {
    fn from(o: JsonCellOutput) -> Self {
        CellOutput {
            capacity: Capacity::shannons(o.capacity),
            lock: o.lock,
            type_: o.type_,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JsonTransaction {
    #[serde(with = "hex_u32")]
    pub version: u32,
    pub cell_deps: Vec<JsonCellDep>,
    pub header_deps: Vec<Byte32>,
    pub inputs: Vec<JsonCellInput>,
    pub outputs: Vec<JsonCellOutput>,
    pub outputs_data: Vec<String>,
    pub witnesses: Vec<String>,
}

impl From<&UnsignedTransaction> for JsonTransaction {
    fn from(tx: &UnsignedTransaction) -> Self {
        Self {
            version: tx.version,
            cell_deps: tx.cell_deps.iter().map(json_cell_dep).collect(),
            header_deps: tx.header_deps.clone(),
            inputs: tx
                .inputs
                .iter()
                .map(|i| JsonCellInput {
                    since: i.since,
                    previous_output: (&i.previous_output).into(),
                })
                .collect(),
            outputs: tx.outputs.iter().map(JsonCellOutput::from).collect(),
            outputs_data: tx
                .outputs_data
                .iter()
                .map(|d| hex_serde::encode_prefixed(d))
                .collect(),
            witnesses: tx
                .witnesses
                .iter()
                .map(|w| hex_serde::encode_prefixed(w))
                .collect(),
        }
    }
}

fn json_cell_dep(dep: &CellDep) -> JsonCellDep {
    JsonCellDep {
        out_point: (&dep.out_point).into(),
        dep_type: dep.dep_type,
    }
}

/// `search_key` for `get_cells` / `get_cells_capacity`.
#[derive(Debug, Serialize)]
pub struct SearchKey<'a> {
    pub script: &'a Script,
    pub script_type: &'static str,
}

impl<'a> SearchKey<'a> {
    pub fn lock(script: &'a Script) -> Self {
        Self {
            script,
            script_type: "lock",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IndexerCell {
    pub output: JsonCellOutput,
    #[serde(with = "hex_serde", default)]
    pub output_data: Vec<u8>,
    pub out_point: JsonOutPoint,
}

impl From<IndexerCell> for LiveCell {
    fn from(c: IndexerCell) -> Self {
        LiveCell {
            out_point: c.out_point.into(),
            output: c.output.into(),
            data: c.output_data,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CellsPage {
    pub objects: Vec<IndexerCell>,
    pub last_cursor: String,
}

#[derive(Debug, Deserialize)]
pub struct CellsCapacity {
    #[serde(with = "hex_u64")]
    pub capacity: u64,
}

#[derive(Debug, Deserialize)]
pub struct TransactionWithStatus {
    pub tx_status: JsonTxStatus,
}

#[derive(Debug, Deserialize)]
pub struct JsonTxStatus {
    pub status: String,
    #[serde(default)]
    pub block_number: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl JsonTxStatus {
    /// Map the node's status string, using `tip` to count confirmations.
    ///
    /// Nodes that omit `block_number` report committed transactions as one
    /// confirmation deep.
    pub fn into_status(self, tip: Option<u64>) -> Result<TxStatus, RpcError> {
        Ok(match self.status.as_str() {
            "pending" => TxStatus::Pending,
            "proposed" => TxStatus::Proposed,
            "committed" => {
                let included = self
                    .block_number
                    .as_deref()
                    .map(hex_u64::parse)
                    .transpose()
                    .map_err(RpcError::InvalidResponse)?;
                let confirmations = match (included, tip) {
                    (Some(block), Some(tip)) => tip.saturating_sub(block) + 1,
                    _ => 1,
                };
                TxStatus::Committed { confirmations }
            }
            "unknown" => TxStatus::Unknown,
            "rejected" => TxStatus::Rejected {
                reason: self.reason.unwrap_or_default(),
            },
            other => {
                return Err(RpcError::InvalidResponse(format!(
                    "unknown transaction status: {other}"
                )))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daovote_types::ScriptHashType;

    #[test]
    fn numbers_are_minimal_hex() {
        let op = JsonOutPoint {
            tx_hash: Byte32::new([0xab; 32]),
            index: 0,
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["index"], "0x0");

        let out = JsonCellOutput {
            capacity: 6_100_000_000,
            lock: Script::new(Byte32::ZERO, ScriptHashType::Type, vec![1; 20]),
            type_: None,
        };
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["capacity"], "0x16b969d00");
        assert!(json["type"].is_null());
    }

    #[test]
    fn parses_indexer_cell() {
        let raw = serde_json::json!({
            "output": {
                "capacity": "0x174876e800",
                "lock": {
                    "code_hash": format!("0x{}", "11".repeat(32)),
                    "hash_type": "type",
                    "args": "0x0102"
                },
                "type": null
            },
            "output_data": "0x",
            "out_point": {
                "tx_hash": format!("0x{}", "22".repeat(32)),
                "index": "0x1"
            },
            "block_number": "0x10",
            "tx_index": "0x0"
        });
        let cell: LiveCell = serde_json::from_value::<IndexerCell>(raw).unwrap().into();
        assert_eq!(cell.out_point.index, 1);
        assert_eq!(cell.output.capacity, Capacity::ckb(1000));
        assert!(cell.is_plain());
    }

    #[test]
    fn committed_status_counts_from_tip() {
        let s = JsonTxStatus {
            status: "committed".into(),
            block_number: Some("0x64".into()),
            reason: None,
        };
        assert_eq!(
            s.into_status(Some(0x66)).unwrap(),
            TxStatus::Committed { confirmations: 3 }
        );
    }

    #[test]
    fn rejected_carries_reason() {
        let s = JsonTxStatus {
            status: "rejected".into(),
            block_number: None,
            reason: Some("Resolve failed Dead".into()),
        };
        assert_eq!(
            s.into_status(None).unwrap(),
            TxStatus::Rejected {
                reason: "Resolve failed Dead".into()
            }
        );
    }

    #[test]
    fn unknown_status_string_is_an_error() {
        let s = JsonTxStatus {
            status: "mystery".into(),
            block_number: None,
            reason: None,
        };
        assert!(s.into_status(None).is_err());
    }
}
