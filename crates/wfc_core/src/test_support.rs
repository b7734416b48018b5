//! Fixtures shared by the unit tests.

use crate::problem::Problem;
use crate::table::{PropagationTable, TABLE_DIRECTIONS, TABLE_ROW_LEN};
use crate::wave::MAX_PATTERNS;

/// A problem with no adjacency constraints and uniform weights.
pub(crate) fn free_problem(width: usize, height: usize, num_patterns: usize) -> Problem {
    Problem::with_table(
        width,
        height,
        num_patterns,
        &PropagationTable::free(num_patterns),
        vec![1.0; num_patterns],
    )
}

/// Two patterns that must differ from every orthogonal neighbor.
pub(crate) fn checkerboard_table() -> PropagationTable {
    let mut rules = [[0; MAX_PATTERNS]; TABLE_DIRECTIONS];
    for rule in rules.iter_mut() {
        rule[0] = 0b10;
        rule[1] = 0b01;
    }
    PropagationTable::from_pattern_rules(&rules)
}

/// Nothing may sit next to anything.
pub(crate) fn zero_table() -> PropagationTable {
    PropagationTable::from_array([[0; TABLE_ROW_LEN]; TABLE_DIRECTIONS])
}
