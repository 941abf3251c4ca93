//! Cells, out-points and cell dependencies.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::amount::Capacity;
use crate::hash::Byte32;
use crate::script::Script;

/// Reference to one output of a committed transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutPoint {
    pub tx_hash: Byte32,
    /// Output index within `tx_hash`. Absent means output 0.
    #[serde(default)]
    pub index: u32,
}

impl OutPoint {
    pub fn new(tx_hash: Byte32, index: u32) -> Self {
        Self { tx_hash, index }
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tx_hash, self.index)
    }
}

/// How a cell dep is loaded by the script VM.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepType {
    /// The cell's data is script code.
    Code,
    /// The cell's data is a list of out-points, each loaded as code.
    DepGroup,
}

impl DepType {
    pub fn as_byte(&self) -> u8 {
        match self {
            Self::Code => 0,
            Self::DepGroup => 1,
        }
    }
}

/// A cell the transaction reads (code or data) without consuming it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellDep {
    pub out_point: OutPoint,
    pub dep_type: DepType,
}

impl CellDep {
    pub fn code(out_point: OutPoint) -> Self {
        Self {
            out_point,
            dep_type: DepType::Code,
        }
    }

    pub fn dep_group(out_point: OutPoint) -> Self {
        Self {
            out_point,
            dep_type: DepType::DepGroup,
        }
    }
}

/// A consumed cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellInput {
    pub previous_output: OutPoint,
    #[serde(default)]
    pub since: u64,
}

impl CellInput {
    pub fn new(previous_output: OutPoint) -> Self {
        Self {
            previous_output,
            since: 0,
        }
    }
}

/// A created cell, without its data.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellOutput {
    pub capacity: Capacity,
    pub lock: Script,
    #[serde(rename = "type", default)]
    pub type_: Option<Script>,
}

impl CellOutput {
    /// Bytes this output occupies on chain given `data_len` bytes of data:
    /// the 8-byte capacity field, both scripts and the data.
    pub fn occupied_bytes(&self, data_len: usize) -> usize {
        8 + self.lock.occupied_bytes()
            + self.type_.as_ref().map(Script::occupied_bytes).unwrap_or(0)
            + data_len
    }

    /// Minimum capacity this output must hold with `data_len` bytes of data.
    pub fn occupied_capacity(&self, data_len: usize) -> Capacity {
        Capacity::bytes(self.occupied_bytes(data_len))
    }
}

/// A live (unspent) cell as reported by the ledger's cell search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveCell {
    pub out_point: OutPoint,
    pub output: CellOutput,
    #[serde(with = "crate::hex_serde", default)]
    pub data: Vec<u8>,
}

impl LiveCell {
    /// A cell holding plain capacity: no type script, no data.
    pub fn is_plain(&self) -> bool {
        self.output.type_.is_none() && self.data.is_empty()
    }
}
