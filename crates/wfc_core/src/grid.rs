//! Solved output grid.

#[cfg(test)]
use crate::wave::Wave;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One pattern index per cell, row-major, same shape as the input wave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollapsedGrid {
    width: usize,
    height: usize,
    patterns: Vec<u8>,
}

impl CollapsedGrid {
    /// Read the pattern out of every cell of a fully collapsed wave.
    /// Returns `None` if any cell is not exactly one pattern.
    #[cfg(test)]
    pub(crate) fn from_wave(wave: &Wave) -> Option<Self> {
        let patterns = (0..wave.len())
            .map(|i| wave.collapsed_pattern(i).map(|p| p as u8))
            .collect::<Option<Vec<u8>>>()?;
        Some(Self {
            width: wave.width(),
            height: wave.height(),
            patterns,
        })
    }

    pub(crate) fn from_patterns(width: usize, height: usize, patterns: Vec<u8>) -> Self {
        debug_assert_eq!(patterns.len(), width * height);
        Self {
            width,
            height,
            patterns,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Pattern at `(x, y)`, or `None` outside the grid.
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.patterns.get(y * self.width + x).copied()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.patterns
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.patterns.chunks(self.width.max(1))
    }
}

/// One character per cell (`0`-`7`), one line per row.
impl fmt::Display for CollapsedGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.rows().enumerate() {
            if y > 0 {
                writeln!(f)?;
            }
            for &p in row {
                write!(f, "{}", p)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_wave() {
        let wave = Wave::from_cells(3, 2, &[0b001, 0b010, 0b100, 0b100, 0b010, 0b001]).unwrap();
        let grid = CollapsedGrid::from_wave(&wave).unwrap();
        assert_eq!(grid.as_slice(), &[0, 1, 2, 2, 1, 0]);
        assert_eq!(grid.get(2, 0), Some(2));
        assert_eq!(grid.get(0, 1), Some(2));
        assert_eq!(grid.get(3, 0), None);
        assert_eq!(grid.get(0, 2), None);
    }

    #[test]
    fn test_from_wave_rejects_open_cells() {
        let wave = Wave::from_cells(2, 1, &[0b01, 0b11]).unwrap();
        assert!(CollapsedGrid::from_wave(&wave).is_none());
        let wave = Wave::from_cells(2, 1, &[0b01, 0]).unwrap();
        assert!(CollapsedGrid::from_wave(&wave).is_none());
    }

    #[test]
    fn test_display() {
        let wave = Wave::from_cells(2, 2, &[0b01, 0b10, 0b10, 0b01]).unwrap();
        let grid = CollapsedGrid::from_wave(&wave).unwrap();
        assert_eq!(grid.to_string(), "01\n10");
        assert_eq!(grid.rows().count(), 2);
    }

    #[test]
    fn test_json_shape() {
        let wave = Wave::from_cells(1, 2, &[0b01, 0b10]).unwrap();
        let grid = CollapsedGrid::from_wave(&wave).unwrap();
        let json = serde_json::to_value(&grid).unwrap();
        assert_eq!(json["width"], 1);
        assert_eq!(json["patterns"], serde_json::json!([0, 1]));
    }
}
