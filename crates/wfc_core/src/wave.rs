//! Wave state for the solver.
//!
//! A wave is a `width * height` grid of cells, each holding a `Mask`: bit `i`
//! set means pattern `i` is still possible there. Cells are stored row-major
//! (`index = y * width + x`) in one contiguous buffer.
//!
//! - one bit set: the cell is collapsed
//! - zero bits set: the cell is a contradiction

use std::collections::TryReserveError;

/// Per-cell possibility bitmask.
pub type Mask = u8;

/// Hard upper bound on patterns per cell imposed by `Mask`.
pub const MAX_PATTERNS: usize = Mask::BITS as usize;

/// Direction offsets, indexed by `Direction::index()`.
/// Order: North (-Y), East (+X), South (+Y), West (-X)
pub const DX: [i32; 4] = [0, 1, 0, -1];
pub const DY: [i32; 4] = [-1, 0, 1, 0];

/// Cardinal direction between neighboring cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Direction {
    /// All directions in propagation order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }
}

/// Mask with every pattern in `0..num_patterns` set.
#[inline]
pub fn full_mask(num_patterns: usize) -> Mask {
    if num_patterns >= MAX_PATTERNS {
        Mask::MAX
    } else {
        ((1u16 << num_patterns) - 1) as Mask
    }
}

/// Number of patterns still possible in `mask`.
#[inline]
pub fn count(mask: Mask) -> u32 {
    mask.count_ones()
}

#[inline]
pub fn is_collapsed(mask: Mask) -> bool {
    mask.count_ones() == 1
}

/// The single remaining pattern, if `mask` is collapsed.
#[inline]
pub fn single_pattern(mask: Mask) -> Option<usize> {
    if is_collapsed(mask) {
        Some(mask.trailing_zeros() as usize)
    } else {
        None
    }
}

/// Iterate the patterns set in `mask` in increasing bit order.
pub fn patterns(mask: Mask) -> impl Iterator<Item = usize> {
    (0..MAX_PATTERNS).filter(move |&p| mask & (1 << p) != 0)
}

/// Possibility state for every cell of one solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wave {
    width: usize,
    height: usize,
    cells: Vec<Mask>,
}

impl Wave {
    /// Create a wave where every cell holds `mask`.
    pub fn filled(width: usize, height: usize, mask: Mask) -> Result<Self, TryReserveError> {
        let len = width * height;
        let mut cells = Vec::new();
        cells.try_reserve_exact(len)?;
        cells.resize(len, mask);
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Create a wave from a caller-owned buffer. The buffer is copied, never
    /// referenced afterwards.
    ///
    /// The caller guarantees `cells.len() == width * height`.
    pub fn from_cells(
        width: usize,
        height: usize,
        cells: &[Mask],
    ) -> Result<Self, TryReserveError> {
        debug_assert_eq!(cells.len(), width * height);
        let mut copy = Vec::new();
        copy.try_reserve_exact(cells.len())?;
        copy.extend_from_slice(cells);
        Ok(Self {
            width,
            height,
            cells: copy,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn get(&self, cell: usize) -> Mask {
        self.cells[cell]
    }

    #[inline]
    pub fn set(&mut self, cell: usize, mask: Mask) {
        self.cells[cell] = mask;
    }

    pub fn cells(&self) -> &[Mask] {
        &self.cells
    }

    #[inline]
    pub fn coords(&self, cell: usize) -> (usize, usize) {
        (cell % self.width, cell / self.width)
    }

    /// Index of the neighbor of `cell` in `direction`, or `None` at the border.
    /// The grid does not wrap.
    #[inline]
    pub fn neighbor(&self, cell: usize, direction: Direction) -> Option<usize> {
        let (x, y) = self.coords(cell);
        let nx = x as i64 + DX[direction.index()] as i64;
        let ny = y as i64 + DY[direction.index()] as i64;
        if nx < 0 || ny < 0 || nx >= self.width as i64 || ny >= self.height as i64 {
            return None;
        }
        Some(ny as usize * self.width + nx as usize)
    }

    /// The single remaining pattern at a cell, if it is collapsed.
    #[cfg(test)]
    pub(crate) fn collapsed_pattern(&self, cell: usize) -> Option<usize> {
        single_pattern(self.cells[cell])
    }

    /// Number of cells with more than one remaining pattern.
    #[cfg(test)]
    pub(crate) fn count_uncollapsed(&self) -> usize {
        self.cells.iter().filter(|&&m| count(m) > 1).count()
    }
}
