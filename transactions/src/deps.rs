//! On-chain script deployments and cell-dep resolution.

use daovote_types::{Byte32, CellDep, DepType, OutPoint, Script, ScriptHashType, UnsignedTransaction};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where a type-script contract lives on chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractDeployment {
    pub code_hash: Byte32,
    pub hash_type: ScriptHashType,
    /// The cell holding the contract code.
    pub out_point: OutPoint,
    /// Shared dependency group the contract loads, if any.
    #[serde(default)]
    pub dep_group: Option<OutPoint>,
}

impl ContractDeployment {
    pub fn script(&self, args: Vec<u8>) -> Script {
        Script::new(self.code_hash, self.hash_type, args)
    }
}

/// The lock script that guards the payer's cells.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockDeployment {
    pub code_hash: Byte32,
    pub hash_type: ScriptHashType,
    pub out_point: OutPoint,
    #[serde(default = "default_lock_dep_type")]
    pub dep_type: DepType,
    /// Length every lock args of this kind must have.
    #[serde(default = "default_lock_args_len")]
    pub args_len: usize,
}

fn default_lock_dep_type() -> DepType {
    DepType::DepGroup
}

fn default_lock_args_len() -> usize {
    20
}

impl LockDeployment {
    pub fn cell_dep(&self) -> CellDep {
        CellDep {
            out_point: self.out_point,
            dep_type: self.dep_type,
        }
    }

    pub fn matches(&self, script: &Script) -> bool {
        script.code_hash == self.code_hash && script.hash_type == self.hash_type
    }
}

/// Add the cell deps a contract invocation needs:
/// - the contract code cell, always
/// - the anchor cell, unless it is the contract cell itself
/// - the contract's dependency group, if it has one
/// - the lock's own dep
///
/// Duplicates are skipped. Returns the number of deps added.
pub fn resolve_cell_deps(
    tx: &mut UnsignedTransaction,
    contract: &ContractDeployment,
    anchor: Option<&OutPoint>,
    lock: &LockDeployment,
) -> usize {
    let mut added = 0;
    if tx.add_cell_dep(CellDep::code(contract.out_point)) {
        added += 1;
    }
    if let Some(anchor) = anchor.filter(|a| **a != contract.out_point) {
        if tx.add_cell_dep(CellDep::code(*anchor)) {
            added += 1;
        }
    }
    if let Some(group) = contract.dep_group {
        if tx.add_cell_dep(CellDep::dep_group(group)) {
            added += 1;
        }
    }
    if tx.add_cell_dep(lock.cell_dep()) {
        added += 1;
    }
    debug!(added, total = tx.cell_deps.len(), "cell deps resolved");
    added
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(b: u8, index: u32) -> OutPoint {
        OutPoint::new(Byte32::new([b; 32]), index)
    }

    fn contract(dep_group: Option<OutPoint>) -> ContractDeployment {
        ContractDeployment {
            code_hash: Byte32::new([0xc0; 32]),
            hash_type: ScriptHashType::Type,
            out_point: op(1, 0),
            dep_group,
        }
    }

    fn lock() -> LockDeployment {
        LockDeployment {
            code_hash: Byte32::new([0x10; 32]),
            hash_type: ScriptHashType::Type,
            out_point: op(9, 0),
            dep_type: DepType::DepGroup,
            args_len: 20,
        }
    }

    #[test]
    fn anchor_added_when_distinct() {
        let mut tx = UnsignedTransaction::new();
        let added = resolve_cell_deps(&mut tx, &contract(None), Some(&op(2, 0)), &lock());
        assert_eq!(added, 3);
        assert_eq!(tx.cell_deps[0], CellDep::code(op(1, 0)));
        assert_eq!(tx.cell_deps[1], CellDep::code(op(2, 0)));
        assert_eq!(tx.cell_deps[2], CellDep::dep_group(op(9, 0)));
    }

    #[test]
    fn anchor_equal_to_contract_is_not_duplicated() {
        let mut tx = UnsignedTransaction::new();
        resolve_cell_deps(&mut tx, &contract(None), Some(&op(1, 0)), &lock());
        assert_eq!(tx.cell_deps.len(), 2);
    }

    #[test]
    fn sibling_output_of_contract_tx_is_a_distinct_anchor() {
        let mut tx = UnsignedTransaction::new();
        resolve_cell_deps(&mut tx, &contract(None), Some(&op(1, 1)), &lock());
        assert_eq!(tx.cell_deps.len(), 3);
    }

    #[test]
    fn dep_group_included() {
        let mut tx = UnsignedTransaction::new();
        resolve_cell_deps(&mut tx, &contract(Some(op(3, 0))), None, &lock());
        assert!(tx.cell_deps.contains(&CellDep::dep_group(op(3, 0))));
        assert_eq!(tx.cell_deps.len(), 3);
    }

    #[test]
    fn lock_deployment_defaults() {
        let lock: LockDeployment = toml::from_str(&format!(
            "code_hash = \"0x{}\"\nhash_type = \"type\"\nout_point = {{ tx_hash = \"0x{}\" }}\n",
            "10".repeat(32),
            "09".repeat(32)
        ))
        .unwrap();
        assert_eq!(lock.dep_type, DepType::DepGroup);
        assert_eq!(lock.args_len, 20);
        assert_eq!(lock.out_point.index, 0);
    }
}
