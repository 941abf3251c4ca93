//! Fee completion: balancing inputs against outputs plus fee.
//!
//! A [`Draft`] is a transaction under construction together with the
//! capacity its inputs bring and the pool of cells it may still draw from.
//! [`Balancer::balance`] runs one completion pass over it. Each pass starts
//! by dropping the change output of the previous one, so running a second
//! pass after the witness grew re-derives change (or adds inputs) against
//! the new size.

use daovote_codec::WitnessArgs;
use daovote_types::{Capacity, CellInput, CellOutput, LiveCell, Script, UnsignedTransaction};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::capacity::CellPool;
use crate::error::{AssembleError, CapacityShortfall};
use crate::fee::FeeRate;

/// Default lock witness placeholder: a 65-byte recoverable signature.
pub const DEFAULT_LOCK_PLACEHOLDER_LEN: usize = 65;

/// Default cap on leftover capacity that may be paid as fee instead of
/// becoming a change output (0.1 CKB).
pub const DEFAULT_MAX_ABSORBED_FEE: u64 = 10_000_000;

pub struct Draft {
    pub tx: UnsignedTransaction,
    input_capacity: Capacity,
    change_index: Option<usize>,
    pool: CellPool,
    placeholder_len: usize,
}

impl Draft {
    pub fn new(tx: UnsignedTransaction, pool: CellPool, placeholder_len: usize) -> Self {
        Self {
            tx,
            input_capacity: Capacity::ZERO,
            change_index: None,
            pool,
            placeholder_len,
        }
    }

    /// Spend `cell`. The first input's witness carries the lock placeholder;
    /// later inputs in the same lock group get empty witnesses.
    pub fn add_input(&mut self, cell: LiveCell) {
        let witness = if self.tx.inputs.is_empty() {
            WitnessArgs::with_lock_placeholder(self.placeholder_len).encode()
        } else {
            Vec::new()
        };
        self.input_capacity = self.input_capacity + cell.output.capacity;
        self.tx.push_input(CellInput::new(cell.out_point), witness);
    }

    /// Draw inputs until they cover `target`, before any fee is known.
    pub fn fund(&mut self, target: Capacity) -> Result<usize, AssembleError> {
        let missing = target.saturating_sub(self.input_capacity);
        let cells = self.pool.take_covering(missing).ok_or_else(|| {
            AssembleError::InsufficientCapacity(CapacityShortfall::new(
                target,
                self.input_capacity + self.pool.total(),
            ))
        })?;
        let count = cells.len();
        for cell in cells {
            self.add_input(cell);
        }
        debug!(inputs = count, capacity = %self.input_capacity, %target, "inputs selected");
        Ok(count)
    }

    pub fn input_capacity(&self) -> Capacity {
        self.input_capacity
    }

    pub fn change_index(&self) -> Option<usize> {
        self.change_index
    }

    /// Capacity paid as fee by the draft as it stands.
    pub fn fee_paid(&self) -> Capacity {
        self.input_capacity
            .saturating_sub(self.tx.total_output_capacity())
    }

    fn remove_change(&mut self) {
        if let Some(i) = self.change_index.take() {
            self.tx.outputs.remove(i);
            self.tx.outputs_data.remove(i);
        }
    }

    pub fn into_transaction(self) -> UnsignedTransaction {
        self.tx
    }
}

/// Outcome of one completion pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassReport {
    /// Fee the transaction's size calls for.
    pub estimated_fee: Capacity,
    /// What inputs minus outputs actually leaves for the miner.
    pub fee_paid: Capacity,
    pub change: Option<Capacity>,
    pub inputs_added: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceConfig {
    pub fee_rate: FeeRate,
    /// Leftover up to this much is paid as fee when no change output can
    /// be afforded and no cells remain.
    pub max_absorbed_fee: Capacity,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            fee_rate: FeeRate::default(),
            max_absorbed_fee: Capacity::shannons(DEFAULT_MAX_ABSORBED_FEE),
        }
    }
}

pub struct Balancer {
    config: BalanceConfig,
    change_lock: Script,
}

impl Balancer {
    pub fn new(config: BalanceConfig, change_lock: Script) -> Self {
        Self {
            config,
            change_lock,
        }
    }

    /// One completion pass. In order of preference:
    /// 1. inputs cover outputs, fee and a change cell: add change
    /// 2. inputs cover outputs and fee exactly: done
    /// 3. cells remain: add the largest and retry
    /// 4. the leftover is within `max_absorbed_fee`: pay it as fee
    /// 5. otherwise fail with the shortfall
    pub fn balance(&self, draft: &mut Draft, pass: u8) -> Result<PassReport, AssembleError> {
        draft.remove_change();
        let change_template = CellOutput {
            capacity: Capacity::ZERO,
            lock: self.change_lock.clone(),
            type_: None,
        };
        let change_min = change_template.occupied_capacity(0);
        let mut inputs_added = 0;

        loop {
            let outputs = draft.tx.total_output_capacity();
            let inputs = draft.input_capacity;
            let fee_without = self.config.fee_rate.fee_for(&draft.tx);

            let mut probe = draft.tx.clone();
            probe.push_output(change_template.clone(), Vec::new());
            let fee_with = self.config.fee_rate.fee_for(&probe);

            let need_without = outputs + fee_without;
            let need_with_change = need_without + (fee_with - fee_without) + change_min;

            if inputs >= need_with_change {
                let change = inputs - outputs - fee_with;
                let mut output = change_template.clone();
                output.capacity = change;
                draft.change_index = Some(draft.tx.push_output(output, Vec::new()));
                debug!(pass, fee = %fee_with, %change, inputs_added, "fee pass balanced with change");
                return Ok(PassReport {
                    estimated_fee: fee_with,
                    fee_paid: fee_with,
                    change: Some(change),
                    inputs_added,
                });
            }

            if inputs == need_without {
                debug!(pass, fee = %fee_without, inputs_added, "fee pass balanced exactly");
                return Ok(PassReport {
                    estimated_fee: fee_without,
                    fee_paid: fee_without,
                    change: None,
                    inputs_added,
                });
            }

            if let Some(cell) = draft.pool.take_next() {
                draft.add_input(cell);
                inputs_added += 1;
                continue;
            }

            if inputs > need_without && inputs - need_without <= self.config.max_absorbed_fee {
                let fee_paid = inputs - outputs;
                debug!(pass, estimated = %fee_without, %fee_paid, "leftover absorbed into fee");
                return Ok(PassReport {
                    estimated_fee: fee_without,
                    fee_paid,
                    change: None,
                    inputs_added,
                });
            }

            let needed = if inputs > need_without {
                need_with_change
            } else {
                need_without
            };
            return Err(AssembleError::InsufficientCapacity(CapacityShortfall::new(
                needed, inputs,
            )));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daovote_types::{Byte32, OutPoint, ScriptHashType};

    fn lock() -> Script {
        Script::new(Byte32::new([0x10; 32]), ScriptHashType::Type, vec![7; 20])
    }

    fn cell(n: u8, capacity: Capacity) -> LiveCell {
        LiveCell {
            out_point: OutPoint::new(Byte32::new([n; 32]), 0),
            output: CellOutput {
                capacity,
                lock: lock(),
                type_: None,
            },
            data: vec![],
        }
    }

    fn draft_paying(output: Capacity, cells: Vec<LiveCell>) -> Draft {
        let mut tx = UnsignedTransaction::new();
        tx.push_output(
            CellOutput {
                capacity: output,
                lock: lock(),
                type_: None,
            },
            vec![1, 2, 3, 4],
        );
        Draft::new(tx, CellPool::new(cells), DEFAULT_LOCK_PLACEHOLDER_LEN)
    }

    #[test]
    fn change_output_has_empty_data() {
        let mut draft = draft_paying(Capacity::ckb(100), vec![cell(1, Capacity::ckb(1_000))]);
        draft.fund(Capacity::ckb(100)).unwrap();
        let balancer = Balancer::new(BalanceConfig::default(), lock());
        let report = balancer.balance(&mut draft, 1).unwrap();

        assert_eq!(draft.change_index(), Some(1));
        assert_eq!(draft.tx.outputs.len(), draft.tx.outputs_data.len());
        assert!(draft.tx.outputs_data[1].is_empty());
        let change = report.change.unwrap();
        assert_eq!(change + Capacity::ckb(100) + report.fee_paid, Capacity::ckb(1_000));
        assert_eq!(draft.fee_paid(), report.fee_paid);
    }

    #[test]
    fn second_pass_replaces_change() {
        let mut draft = draft_paying(Capacity::ckb(100), vec![cell(1, Capacity::ckb(1_000))]);
        draft.fund(Capacity::ckb(100)).unwrap();
        let balancer = Balancer::new(BalanceConfig::default(), lock());
        let first = balancer.balance(&mut draft, 1).unwrap();

        // grow the first witness as a proof embedding would
        draft.tx.witnesses[0].extend_from_slice(&[0u8; 200]);
        let second = balancer.balance(&mut draft, 2).unwrap();

        assert_eq!(draft.tx.outputs.len(), 2);
        assert!(second.estimated_fee > first.estimated_fee);
        assert!(second.change.unwrap() < first.change.unwrap());
    }

    #[test]
    fn pulls_more_inputs_for_change() {
        let mut draft = draft_paying(
            Capacity::ckb(100),
            vec![cell(1, Capacity::ckb(120)), cell(2, Capacity::ckb(90))],
        );
        draft.fund(Capacity::ckb(100)).unwrap();
        assert_eq!(draft.tx.inputs.len(), 1);
        let report = Balancer::new(BalanceConfig::default(), lock())
            .balance(&mut draft, 1)
            .unwrap();
        assert_eq!(report.inputs_added, 1);
        assert_eq!(draft.tx.inputs.len(), draft.tx.witnesses.len());
        assert!(draft.tx.witnesses[1].is_empty());
        assert!(report.change.is_some());
    }

    #[test]
    fn small_leftover_is_absorbed() {
        let leftover = Capacity::shannons(5_000_000);
        let mut draft = draft_paying(
            Capacity::ckb(100),
            vec![cell(1, Capacity::ckb(100) + leftover)],
        );
        draft.fund(Capacity::ckb(100)).unwrap();
        let report = Balancer::new(BalanceConfig::default(), lock())
            .balance(&mut draft, 1)
            .unwrap();
        assert_eq!(report.change, None);
        assert_eq!(report.fee_paid, leftover);
        assert_eq!(draft.tx.outputs.len(), 1);
    }

    #[test]
    fn large_leftover_without_room_for_change_fails() {
        let mut draft = draft_paying(
            Capacity::ckb(100),
            vec![cell(1, Capacity::ckb(130))],
        );
        draft.fund(Capacity::ckb(100)).unwrap();
        let err = Balancer::new(BalanceConfig::default(), lock())
            .balance(&mut draft, 1)
            .unwrap_err();
        match err {
            AssembleError::InsufficientCapacity(s) => {
                assert_eq!(s.available, Capacity::ckb(130));
                // a 61 CKB change cell does not fit in the 30 CKB leftover
                assert!(s.shortfall() > Capacity::ckb(31));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn funding_reports_shortfall() {
        let mut draft = draft_paying(Capacity::ckb(100), vec![cell(1, Capacity::ckb(40))]);
        let err = draft.fund(Capacity::ckb(100)).unwrap_err();
        assert_eq!(err.shortfall(), Some(Capacity::ckb(60)));
    }
}
