//! Input selection over the payer's live cells.

use daovote_types::{Capacity, LiveCell};

/// Spendable cells not yet used by the transaction, largest first.
#[derive(Clone, Debug, Default)]
pub struct CellPool {
    cells: Vec<LiveCell>,
}

impl CellPool {
    /// Keep only plain cells: a cell with a type script or data is not
    /// spendable capacity.
    pub fn new(cells: Vec<LiveCell>) -> Self {
        let mut cells: Vec<LiveCell> = cells.into_iter().filter(LiveCell::is_plain).collect();
        // largest first, ties broken by out-point so selection is deterministic
        cells.sort_by(|a, b| {
            b.output
                .capacity
                .cmp(&a.output.capacity)
                .then_with(|| a.out_point.cmp(&b.out_point))
        });
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn total(&self) -> Capacity {
        self.cells.iter().map(|c| c.output.capacity).sum()
    }

    /// Take the largest remaining cell.
    pub fn take_next(&mut self) -> Option<LiveCell> {
        if self.cells.is_empty() {
            None
        } else {
            Some(self.cells.remove(0))
        }
    }

    /// Take cells until their sum reaches `target`.
    ///
    /// Returns `None`, leaving the pool untouched, when the whole pool
    /// cannot reach it.
    pub fn take_covering(&mut self, target: Capacity) -> Option<Vec<LiveCell>> {
        if self.total() < target {
            return None;
        }
        let mut taken = Vec::new();
        let mut sum = Capacity::ZERO;
        while sum < target {
            let cell = self.take_next()?;
            sum = sum + cell.output.capacity;
            taken.push(cell);
        }
        Some(taken)
    }
}
