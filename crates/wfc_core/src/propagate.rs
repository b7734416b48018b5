//! Constraint propagation to a fixpoint.
//!
//! Pops dirty cells off the worklist and narrows each in-bounds neighbor
//! (North, East, South, West) to `neighbor & table[d][cell]`. A neighbor that
//! shrank gets a fresh heap entry (or counts as collapsed) and is queued in
//! turn. Masks only ever lose bits, so the loop terminates; the pop budget is
//! a safety net on top of that.

use crate::error::{Contradiction, ContradictionKind, SolveResult};
use crate::solver::Search;
use crate::wave::{count, Direction, Mask};

impl Search<'_, '_> {
    /// Drain the worklist. Fails on the first cell that runs out of patterns.
    pub(crate) fn propagate(&mut self) -> SolveResult<()> {
        let limit = self.config.propagation_limit(self.wave.len());
        let mut pops = 0usize;

        while let Some(cell) = self.worklist.pop() {
            pops += 1;
            if pops > limit {
                return Err(Contradiction::at(cell, ContradictionKind::PropagationLimit).into());
            }
            self.stats.propagation_pops += 1;

            let mask = self.wave.get(cell);
            for direction in Direction::ALL {
                let Some(neighbor) = self.wave.neighbor(cell, direction) else {
                    continue;
                };
                self.narrow(neighbor, self.table.allowed(direction, mask))?;
            }
        }

        Ok(())
    }

    fn narrow(&mut self, cell: usize, allowed: Mask) -> SolveResult<()> {
        let current = self.wave.get(cell);
        let narrowed = current & allowed;
        if narrowed == current {
            return Ok(());
        }
        // A collapsed neighbor is unchanged or emptied, never narrowed, so it
        // is only checked for compatibility.
        if narrowed == 0 {
            return Err(Contradiction::at(cell, ContradictionKind::EmptyCell).into());
        }

        self.wave.set(cell, narrowed);
        if count(narrowed) > 1 {
            self.push_entropy(cell)?;
        } else {
            self.mark_collapsed(cell)?;
        }
        self.worklist.push(cell)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SolverConfig;
    use crate::error::{Contradiction, ContradictionKind, SolveError};
    use crate::problem::{Problem, ValidatedProblem};
    use crate::rng::Xoshiro128;
    use crate::solver::Search;
    use crate::table::PropagationTable;
    use crate::test_support::{checkerboard_table, free_problem, zero_table};
    use crate::table::{TABLE_DIRECTIONS, TABLE_ROW_LEN};
    use crate::wave::{full_mask, MAX_PATTERNS};

    fn line(table: &PropagationTable, len: usize, num_patterns: usize) -> ValidatedProblem {
        Problem::with_table(len, 1, num_patterns, table, vec![1.0; num_patterns])
            .validate()
            .unwrap()
    }

    /// Seed a search as if `cell` had just been collapsed to `mask`.
    fn collapse_by_hand(search: &mut Search<'_, '_>, cell: usize, mask: u8) {
        search.uncollapsed = search.wave.count_uncollapsed();
        search.wave.set(cell, mask);
        search.mark_collapsed(cell).unwrap();
        search.worklist.push(cell).unwrap();
    }

    #[test]
    fn test_checkerboard_chain() {
        let validated = line(&checkerboard_table(), 5, 2);
        let mut rng = Xoshiro128::from_u64_seed(0);
        let mut search = Search::new(&validated, &mut rng).unwrap();

        collapse_by_hand(&mut search, 2, 0b01);
        search.propagate().unwrap();

        assert_eq!(search.wave.cells(), &[0b01, 0b10, 0b01, 0b10, 0b01]);
        assert_eq!(search.uncollapsed, 0);
        assert_eq!(search.stats.propagation_pops, 5);
        assert!(search.worklist.is_empty());
    }

    #[test]
    fn test_free_table_changes_nothing() {
        let validated = free_problem(3, 3, 3).validate().unwrap();
        let mut rng = Xoshiro128::from_u64_seed(0);
        let mut search = Search::new(&validated, &mut rng).unwrap();

        collapse_by_hand(&mut search, 4, 0b010);
        search.propagate().unwrap();

        assert_eq!(search.stats.propagation_pops, 1);
        assert_eq!(search.uncollapsed, 8);
        assert!(search.heap.is_empty());
    }

    #[test]
    fn test_partial_narrowing_requeues_entropy() {
        // Pattern p allows p and p+1 (mod 3) in every direction.
        let mut rules = [[0; MAX_PATTERNS]; 4];
        for rule in rules.iter_mut() {
            rule[0] = 0b011;
            rule[1] = 0b110;
            rule[2] = 0b101;
        }
        let validated = line(&PropagationTable::from_pattern_rules(&rules), 3, 3);
        let mut rng = Xoshiro128::from_u64_seed(0);
        let mut search = Search::new(&validated, &mut rng).unwrap();

        collapse_by_hand(&mut search, 0, 0b001);
        search.propagate().unwrap();

        // Cell 1 shrinks to {0, 1}; cell 2 is allowed {0, 1} | {1, 2} = all.
        assert_eq!(search.wave.cells(), &[0b001, 0b011, 0b111]);
        assert_eq!(search.uncollapsed, 2);
        assert_eq!(search.heap.len(), 1);
        let entry = search.heap.pop_min().unwrap();
        assert_eq!((entry.cell, entry.mask), (1, 0b011));
    }

    #[test]
    fn test_empty_neighbor_is_contradiction() {
        let validated = line(&zero_table(), 2, 2);
        let mut rng = Xoshiro128::from_u64_seed(0);
        let mut search = Search::new(&validated, &mut rng).unwrap();

        collapse_by_hand(&mut search, 0, 0b01);
        let err = search.propagate().unwrap_err();
        assert_eq!(
            err,
            SolveError::Contradiction(Contradiction::at(1, ContradictionKind::EmptyCell))
        );
    }

    #[test]
    fn test_collapsed_neighbor_is_checked() {
        let problem = Problem::with_table(2, 1, 2, &checkerboard_table(), vec![1.0, 1.0])
            .initial_wave(vec![0b11, 0b01]);
        let validated = problem.validate().unwrap();
        let mut rng = Xoshiro128::from_u64_seed(0);
        let mut search = Search::new(&validated, &mut rng).unwrap();

        collapse_by_hand(&mut search, 0, 0b01);
        let err = search.propagate().unwrap_err();
        assert_eq!(
            err.contradiction().map(|c| (c.cell, c.kind)),
            Some((Some(1), ContradictionKind::EmptyCell))
        );
        // The collapsed neighbor was left alone.
        assert_eq!(search.wave.get(1), 0b01);
    }

    #[test]
    fn test_propagation_limit_is_contradiction() {
        // Each step drops the highest remaining bit of the neighbor, so two
        // cells keep re-queueing each other for several rounds.
        let mut rows = [[0; TABLE_ROW_LEN]; TABLE_DIRECTIONS];
        for row in rows.iter_mut() {
            for (mask, entry) in row.iter_mut().enumerate().skip(1) {
                let top = usize::BITS - 1 - mask.leading_zeros();
                *entry = (mask & !(1 << top)) as u8;
            }
        }
        let table = PropagationTable::from_array(rows);
        let validated = Problem::with_table(2, 1, 8, &table, vec![1.0; 8])
            .config(SolverConfig {
                propagation_limit_factor: 1,
                ..Default::default()
            })
            .validate()
            .unwrap();
        let mut rng = Xoshiro128::from_u64_seed(0);
        let mut search = Search::new(&validated, &mut rng).unwrap();
        search.uncollapsed = search.wave.count_uncollapsed();
        search.worklist.push(0).unwrap();

        // Budget is 2 pops: cell 0 narrows 1, cell 1 narrows 0, cell 0 is over.
        let err = search.propagate().unwrap_err();
        assert_eq!(
            err,
            SolveError::Contradiction(Contradiction::at(0, ContradictionKind::PropagationLimit))
        );
        assert_eq!(search.stats.propagation_pops, 2);
        assert_eq!(search.wave.cells(), &[full_mask(6), full_mask(7)]);
    }
}
