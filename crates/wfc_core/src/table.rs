//! Propagation lookup table.
//!
//! `table[d][m]` is the set of patterns a neighbor lying in direction `d` may
//! still hold when the current cell's mask is `m`. The solver only reads it;
//! building it from tile or pattern data happens elsewhere.

use crate::error::ValidationError;
use crate::wave::{full_mask, patterns, Direction, Mask, MAX_PATTERNS};
use std::fmt;

/// Entries per direction row: one per possible mask value.
pub const TABLE_ROW_LEN: usize = 1 << Mask::BITS;

/// Number of direction rows.
pub const TABLE_DIRECTIONS: usize = 4;

/// Precomputed 4x256 neighbor lookup.
#[derive(Clone, PartialEq, Eq)]
pub struct PropagationTable {
    rows: Box<[[Mask; TABLE_ROW_LEN]; TABLE_DIRECTIONS]>,
}

impl PropagationTable {
    /// Build from an already shaped array.
    pub fn from_array(rows: [[Mask; TABLE_ROW_LEN]; TABLE_DIRECTIONS]) -> Self {
        Self {
            rows: Box::new(rows),
        }
    }

    /// Build from caller-provided rows, checking the shape is exactly 4x256.
    pub fn from_rows<R: AsRef<[Mask]>>(rows: &[R]) -> Result<Self, ValidationError> {
        if rows.len() != TABLE_DIRECTIONS {
            return Err(ValidationError::TableRows(rows.len()));
        }
        let mut table = [[0; TABLE_ROW_LEN]; TABLE_DIRECTIONS];
        for (direction, (dst, src)) in table.iter_mut().zip(rows).enumerate() {
            let src = src.as_ref();
            if src.len() != TABLE_ROW_LEN {
                return Err(ValidationError::TableRowLength {
                    direction,
                    len: src.len(),
                });
            }
            dst.copy_from_slice(src);
        }
        Ok(Self::from_array(table))
    }

    /// Build from single-pattern rules.
    ///
    /// `rules[d][p]` is the set of patterns allowed in direction `d` next to
    /// a cell holding only pattern `p`. The row for a multi-pattern mask is
    /// the union over its set bits.
    pub fn from_pattern_rules(rules: &[[Mask; MAX_PATTERNS]; TABLE_DIRECTIONS]) -> Self {
        let mut table = [[0; TABLE_ROW_LEN]; TABLE_DIRECTIONS];
        for (row, rule) in table.iter_mut().zip(rules) {
            for (mask, entry) in row.iter_mut().enumerate() {
                *entry = patterns(mask as Mask).fold(0, |acc, p| acc | rule[p]);
            }
        }
        Self::from_array(table)
    }

    /// Table where every pattern is compatible with every other.
    pub fn free(num_patterns: usize) -> Self {
        let full = full_mask(num_patterns);
        Self::from_pattern_rules(&[[full; MAX_PATTERNS]; TABLE_DIRECTIONS])
    }

    /// Patterns a neighbor in `direction` may hold next to a cell with `mask`.
    #[inline]
    pub fn allowed(&self, direction: Direction, mask: Mask) -> Mask {
        self.rows[direction.index()][mask as usize]
    }

    /// Whether a single pattern `b` may sit in `direction` of pattern `a`.
    #[inline]
    pub fn permits(&self, direction: Direction, a: usize, b: usize) -> bool {
        self.allowed(direction, 1 << a) & (1 << b) != 0
    }

    /// Rows as nested vectors, the shape used by problem files.
    pub fn to_rows(&self) -> Vec<Vec<Mask>> {
        self.rows.iter().map(|row| row.to_vec()).collect()
    }

    /// Single-pattern pairs that one direction permits but the opposite
    /// direction forbids, as `(direction, a, b)`.
    ///
    /// Asymmetric tables still solve correctly, but they usually indicate a
    /// mistake in whatever built the table.
    pub fn asymmetric_pairs(&self, num_patterns: usize) -> Vec<(Direction, usize, usize)> {
        let mut pairs = Vec::new();
        for direction in Direction::ALL {
            for a in 0..num_patterns {
                for b in 0..num_patterns {
                    if self.permits(direction, a, b) != self.permits(direction.opposite(), b, a) {
                        pairs.push((direction, a, b));
                    }
                }
            }
        }
        pairs
    }
}

impl fmt::Debug for PropagationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Only the single-pattern rows; the full 1024 entries are unreadable.
        let mut list = f.debug_map();
        for direction in Direction::ALL {
            let singles: Vec<Mask> = (0..MAX_PATTERNS)
                .map(|p| self.allowed(direction, 1 << p))
                .collect();
            list.entry(&direction, &singles);
        }
        list.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::checkerboard_table as checkerboard;

    #[test]
    fn test_from_rows_shape_checks() {
        let good = vec![vec![0u8; 256]; 4];
        assert!(PropagationTable::from_rows(&good).is_ok());

        let three = vec![vec![0u8; 256]; 3];
        assert_eq!(
            PropagationTable::from_rows(&three),
            Err(ValidationError::TableRows(3))
        );

        let mut short = vec![vec![0u8; 256]; 4];
        short[2] = vec![0u8; 255];
        assert_eq!(
            PropagationTable::from_rows(&short),
            Err(ValidationError::TableRowLength {
                direction: 2,
                len: 255
            })
        );
    }

    #[test]
    fn test_from_rows_round_trip() {
        let table = checkerboard();
        let rebuilt = PropagationTable::from_rows(&table.to_rows()).unwrap();
        assert_eq!(table, rebuilt);
    }

    #[test]
    fn test_pattern_rules_union() {
        let table = checkerboard();
        assert_eq!(table.allowed(Direction::East, 0b01), 0b10);
        assert_eq!(table.allowed(Direction::East, 0b10), 0b01);
        assert_eq!(table.allowed(Direction::East, 0b11), 0b11);
        assert_eq!(table.allowed(Direction::East, 0), 0);
        assert!(table.permits(Direction::North, 0, 1));
        assert!(!table.permits(Direction::North, 0, 0));
    }

    #[test]
    fn test_free_table() {
        let table = PropagationTable::free(3);
        for direction in Direction::ALL {
            assert_eq!(table.allowed(direction, 0b001), 0b111);
            assert_eq!(table.allowed(direction, 0b110), 0b111);
            assert_eq!(table.allowed(direction, 0), 0);
        }
        assert!(table.asymmetric_pairs(3).is_empty());
    }

    #[test]
    fn test_asymmetric_pairs() {
        // Pattern 1 may sit east of pattern 0, but 0 may not sit west of 1.
        let mut rules = [[0b11; MAX_PATTERNS]; 4];
        rules[Direction::West.index()][1] = 0b10;
        let table = PropagationTable::from_pattern_rules(&rules);

        let pairs = table.asymmetric_pairs(2);
        assert!(pairs.contains(&(Direction::East, 0, 1)));
        assert!(pairs.contains(&(Direction::West, 1, 0)));
        assert_eq!(pairs.len(), 2);
    }
}
