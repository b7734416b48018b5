//! Error types for validation and solving.
//!
//! Callers usually only need `SolveError::is_contradiction()`: a contradiction
//! is the one failure worth retrying with another seed. Validation and
//! internal errors will fail the same way every time.

use crate::wave::{Direction, Mask};
use std::collections::TryReserveError;
use std::fmt;

/// Malformed solver input, detected before any solving work.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    ZeroWidth,
    ZeroHeight,
    /// `width * height` does not fit in `usize`
    DimensionsOverflow { width: usize, height: usize },
    /// Pattern count outside `1..=8`
    PatternCount(usize),
    /// Propagation table does not have exactly 4 direction rows
    TableRows(usize),
    /// A propagation row does not have exactly 256 entries
    TableRowLength { direction: usize, len: usize },
    WeightCount { expected: usize, actual: usize },
    /// Weight is negative, NaN or infinite
    InvalidWeight { pattern: usize, weight: f64 },
    /// Weights are each finite but their sum is not
    WeightTotalOverflow,
    WaveLength { expected: usize, actual: usize },
    /// A cell has a bit set at or above `num_patterns`
    CellOutOfRange {
        cell: usize,
        mask: Mask,
        num_patterns: usize,
    },
    /// A solver setting is out of range
    Config { field: &'static str },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::ZeroWidth => write!(f, "width must be greater than 0"),
            ValidationError::ZeroHeight => write!(f, "height must be greater than 0"),
            ValidationError::DimensionsOverflow { width, height } => {
                write!(f, "grid {}x{} is too large", width, height)
            }
            ValidationError::PatternCount(n) => {
                write!(f, "pattern count {} outside 1..=8", n)
            }
            ValidationError::TableRows(n) => {
                write!(f, "propagation table has {} rows, expected 4", n)
            }
            ValidationError::TableRowLength { direction, len } => write!(
                f,
                "propagation row {} has {} entries, expected 256",
                direction, len
            ),
            ValidationError::WeightCount { expected, actual } => {
                write!(f, "expected {} pattern weights, got {}", expected, actual)
            }
            ValidationError::InvalidWeight { pattern, weight } => {
                write!(f, "pattern {} has invalid weight {}", pattern, weight)
            }
            ValidationError::WeightTotalOverflow => {
                write!(f, "pattern weights sum to more than f64::MAX")
            }
            ValidationError::WaveLength { expected, actual } => {
                write!(f, "initial wave has {} cells, expected {}", actual, expected)
            }
            ValidationError::CellOutOfRange {
                cell,
                mask,
                num_patterns,
            } => write!(
                f,
                "cell {} has mask {:#010b} with bits outside {} patterns",
                cell, mask, num_patterns
            ),
            ValidationError::Config { field } => write!(f, "invalid solver setting '{}'", field),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Why a solve became unsatisfiable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContradictionKind {
    /// The initial wave already contained an empty cell
    EmptyInitialCell,
    /// Propagation removed the last pattern from a cell
    EmptyCell,
    /// Weighted choice was asked to pick from an empty mask
    NoChoice,
    /// Propagation exceeded its pop budget
    PropagationLimit,
    /// The select/collapse/propagate loop exceeded its budget
    IterationLimit,
    /// The queue drained while cells were still uncollapsed
    Unresolved,
}

impl fmt::Display for ContradictionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ContradictionKind::EmptyInitialCell => "initial wave has an empty cell",
            ContradictionKind::EmptyCell => "propagation emptied a cell",
            ContradictionKind::NoChoice => "no pattern left to choose",
            ContradictionKind::PropagationLimit => "propagation limit exceeded",
            ContradictionKind::IterationLimit => "iteration limit exceeded",
            ContradictionKind::Unresolved => "queue drained with uncollapsed cells",
        };
        f.write_str(text)
    }
}

/// The constraint system became unsatisfiable during a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contradiction {
    pub kind: ContradictionKind,
    /// Cell where the failure was detected, when there is one
    pub cell: Option<usize>,
}

impl Contradiction {
    pub fn new(kind: ContradictionKind) -> Self {
        Self { kind, cell: None }
    }

    pub fn at(cell: usize, kind: ContradictionKind) -> Self {
        Self {
            kind,
            cell: Some(cell),
        }
    }
}

impl fmt::Display for Contradiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell {
            Some(cell) => write!(f, "contradiction at cell {}: {}", cell, self.kind),
            None => write!(f, "contradiction: {}", self.kind),
        }
    }
}

impl std::error::Error for Contradiction {}

/// The solver thinks it finished but the wave says otherwise.
/// Always a solver bug, never a property of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalError {
    NotCollapsed { cell: usize, mask: Mask },
    AdjacencyViolation {
        cell: usize,
        neighbor: usize,
        direction: Direction,
    },
    CounterUnderflow { cell: usize },
}

impl fmt::Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InternalError::NotCollapsed { cell, mask } => write!(
                f,
                "cell {} finished with mask {:#010b} instead of a single pattern",
                cell, mask
            ),
            InternalError::AdjacencyViolation {
                cell,
                neighbor,
                direction,
            } => write!(
                f,
                "cell {} and its {:?} neighbor {} violate the propagation table",
                cell, direction, neighbor
            ),
            InternalError::CounterUnderflow { cell } => {
                write!(f, "uncollapsed counter underflowed at cell {}", cell)
            }
        }
    }
}

impl std::error::Error for InternalError {}

/// Any failure of a solve call.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveError {
    Validation(ValidationError),
    Contradiction(Contradiction),
    /// Growing the wave, heap or worklist failed
    OutOfMemory(TryReserveError),
    Internal(InternalError),
}

impl SolveError {
    /// Whether retrying with a different seed could succeed.
    pub fn is_contradiction(&self) -> bool {
        matches!(self, SolveError::Contradiction(_))
    }

    pub fn contradiction(&self) -> Option<&Contradiction> {
        match self {
            SolveError::Contradiction(c) => Some(c),
            _ => None,
        }
    }
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::Validation(e) => write!(f, "invalid input: {}", e),
            SolveError::Contradiction(c) => write!(f, "{}", c),
            SolveError::OutOfMemory(e) => write!(f, "out of memory: {}", e),
            SolveError::Internal(e) => write!(f, "internal solver error: {}", e),
        }
    }
}

impl std::error::Error for SolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolveError::Validation(e) => Some(e),
            SolveError::Contradiction(c) => Some(c),
            SolveError::OutOfMemory(e) => Some(e),
            SolveError::Internal(e) => Some(e),
        }
    }
}

impl From<ValidationError> for SolveError {
    fn from(e: ValidationError) -> Self {
        SolveError::Validation(e)
    }
}

impl From<Contradiction> for SolveError {
    fn from(c: Contradiction) -> Self {
        SolveError::Contradiction(c)
    }
}

impl From<TryReserveError> for SolveError {
    fn from(e: TryReserveError) -> Self {
        SolveError::OutOfMemory(e)
    }
}

impl From<InternalError> for SolveError {
    fn from(e: InternalError) -> Self {
        SolveError::Internal(e)
    }
}

/// Result type for solver operations.
pub type SolveResult<T> = Result<T, SolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_contradiction() {
        let err: SolveError = Contradiction::at(3, ContradictionKind::EmptyCell).into();
        assert!(err.is_contradiction());
        assert_eq!(err.contradiction().and_then(|c| c.cell), Some(3));

        let err: SolveError = ValidationError::ZeroWidth.into();
        assert!(!err.is_contradiction());

        let err: SolveError = InternalError::NotCollapsed { cell: 0, mask: 3 }.into();
        assert!(!err.is_contradiction());
        assert!(err.contradiction().is_none());
    }

    #[test]
    fn test_display_messages() {
        let c = Contradiction::at(7, ContradictionKind::EmptyCell);
        assert_eq!(c.to_string(), "contradiction at cell 7: propagation emptied a cell");

        let c = Contradiction::new(ContradictionKind::IterationLimit);
        assert_eq!(c.to_string(), "contradiction: iteration limit exceeded");

        let e = ValidationError::PatternCount(9);
        assert_eq!(e.to_string(), "pattern count 9 outside 1..=8");

        let e = SolveError::from(ValidationError::WeightCount {
            expected: 2,
            actual: 3,
        });
        assert_eq!(e.to_string(), "invalid input: expected 2 pattern weights, got 3");
    }

    #[test]
    fn test_error_source() {
        use std::error::Error;
        let err = SolveError::from(ValidationError::ZeroHeight);
        assert!(err.source().is_some());
    }
}
