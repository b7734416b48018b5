//! Propagation worklist.
//!
//! A LIFO stack of dirty cells with a parallel membership array, so a cell is
//! never queued twice while it is still waiting.

use std::collections::TryReserveError;

#[derive(Debug)]
pub struct Worklist {
    stack: Vec<usize>,
    in_stack: Vec<bool>,
}

impl Worklist {
    /// Create a worklist for a grid of `cells` cells.
    pub fn with_cells(cells: usize) -> Result<Self, TryReserveError> {
        let mut in_stack = Vec::new();
        in_stack.try_reserve_exact(cells)?;
        in_stack.resize(cells, false);
        Ok(Self {
            stack: Vec::new(),
            in_stack,
        })
    }

    /// Queue `cell` unless it is already waiting. Returns whether it was added.
    pub fn push(&mut self, cell: usize) -> Result<bool, TryReserveError> {
        if self.in_stack[cell] {
            return Ok(false);
        }
        self.stack.try_reserve(1)?;
        self.stack.push(cell);
        self.in_stack[cell] = true;
        Ok(true)
    }

    /// Take the most recently queued cell.
    pub fn pop(&mut self) -> Option<usize> {
        let cell = self.stack.pop()?;
        self.in_stack[cell] = false;
        Some(cell)
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, cell: usize) -> bool {
        self.in_stack[cell]
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}
