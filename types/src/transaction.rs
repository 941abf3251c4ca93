//! Transactions under construction.
//!
//! An [`UnsignedTransaction`] is built incrementally by the assembler. Two
//! shape invariants must hold before it is handed to a signer:
//! `outputs.len() == outputs_data.len()` and `inputs.len() == witnesses.len()`.
//! The `push_*` helpers keep both in step; [`UnsignedTransaction::check_shape`]
//! verifies them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::amount::Capacity;
use crate::cell::{CellDep, CellInput, CellOutput};
use crate::error::ErrorKind;
use crate::hash::Byte32;

/// Violation of a transaction shape invariant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("outputs ({outputs}) and outputs_data ({data}) lengths differ")]
    OutputDataMismatch { outputs: usize, data: usize },

    #[error("inputs ({inputs}) and witnesses ({witnesses}) lengths differ")]
    WitnessMismatch { inputs: usize, witnesses: usize },

    #[error("transaction has no inputs")]
    NoInputs,
}

impl ShapeError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Encoding
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    pub version: u32,
    pub cell_deps: Vec<CellDep>,
    pub header_deps: Vec<Byte32>,
    pub inputs: Vec<CellInput>,
    pub outputs: Vec<CellOutput>,
    pub outputs_data: Vec<Vec<u8>>,
    pub witnesses: Vec<Vec<u8>>,
}

impl UnsignedTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an output together with its data entry.
    pub fn push_output(&mut self, output: CellOutput, data: Vec<u8>) -> usize {
        self.outputs.push(output);
        self.outputs_data.push(data);
        self.outputs.len() - 1
    }

    /// Append an input together with its witness entry.
    pub fn push_input(&mut self, input: CellInput, witness: Vec<u8>) -> usize {
        self.inputs.push(input);
        self.witnesses.push(witness);
        self.inputs.len() - 1
    }

    /// Add a cell dep unless an identical one is already present.
    ///
    /// Returns `false` when the dep was a duplicate.
    pub fn add_cell_dep(&mut self, dep: CellDep) -> bool {
        if self.cell_deps.contains(&dep) {
            return false;
        }
        self.cell_deps.push(dep);
        true
    }

    /// Pad `outputs_data` with empty entries so it matches `outputs`.
    pub fn sync_outputs_data(&mut self) {
        while self.outputs_data.len() < self.outputs.len() {
            self.outputs_data.push(Vec::new());
        }
    }

    pub fn total_output_capacity(&self) -> Capacity {
        self.outputs.iter().map(|o| o.capacity).sum()
    }

    pub fn check_shape(&self) -> Result<(), ShapeError> {
        if self.outputs.len() != self.outputs_data.len() {
            return Err(ShapeError::OutputDataMismatch {
                outputs: self.outputs.len(),
                data: self.outputs_data.len(),
            });
        }
        if self.inputs.is_empty() {
            return Err(ShapeError::NoInputs);
        }
        if self.inputs.len() != self.witnesses.len() {
            return Err(ShapeError::WitnessMismatch {
                inputs: self.inputs.len(),
                witnesses: self.witnesses.len(),
            });
        }
        Ok(())
    }
}

/// A transaction whose witnesses carry the signer's authorization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub transaction: UnsignedTransaction,
}

impl SignedTransaction {
    pub fn new(transaction: UnsignedTransaction) -> Self {
        Self { transaction }
    }

    pub fn into_inner(self) -> UnsignedTransaction {
        self.transaction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::OutPoint;
    use crate::script::{Script, ScriptHashType};

    fn output() -> CellOutput {
        CellOutput {
            capacity: Capacity::ckb(61),
            lock: Script::new(Byte32::ZERO, ScriptHashType::Type, vec![0; 20]),
            type_: None,
        }
    }

    #[test]
    fn push_helpers_keep_shape() {
        let mut tx = UnsignedTransaction::new();
        tx.push_input(CellInput::new(OutPoint::new(Byte32::ZERO, 0)), vec![]);
        tx.push_output(output(), vec![1, 0, 0, 0]);
        tx.push_output(output(), vec![]);
        assert_eq!(tx.check_shape(), Ok(()));
    }

    #[test]
    fn detects_missing_output_data() {
        let mut tx = UnsignedTransaction::new();
        tx.push_input(CellInput::new(OutPoint::new(Byte32::ZERO, 0)), vec![]);
        tx.outputs.push(output());
        assert_eq!(
            tx.check_shape(),
            Err(ShapeError::OutputDataMismatch {
                outputs: 1,
                data: 0
            })
        );
        tx.sync_outputs_data();
        assert_eq!(tx.check_shape(), Ok(()));
    }

    #[test]
    fn detects_missing_witness() {
        let mut tx = UnsignedTransaction::new();
        tx.inputs.push(CellInput::new(OutPoint::new(Byte32::ZERO, 0)));
        assert_eq!(
            tx.check_shape(),
            Err(ShapeError::WitnessMismatch {
                inputs: 1,
                witnesses: 0
            })
        );
    }

    #[test]
    fn duplicate_cell_dep_ignored() {
        let mut tx = UnsignedTransaction::new();
        let dep = CellDep::code(OutPoint::new(Byte32::new([9; 32]), 0));
        assert!(tx.add_cell_dep(dep));
        assert!(!tx.add_cell_dep(dep));
        assert_eq!(tx.cell_deps.len(), 1);
    }
}
