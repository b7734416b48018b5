//! Bit-packed Wave Function Collapse solver over 2D grids.
//!
//! This crate provides:
//! - The wave: one 8-bit pattern mask per cell
//! - Propagation tables indexed by direction and neighbor mask
//! - A min-entropy heap and a LIFO propagation worklist
//! - The seeded solve loop with contradiction reporting and retries
//! - Problem files (JSON) with validation
//! - A reproducible xoshiro128** random source

pub mod config;
pub mod entropy;
pub mod error;
pub mod grid;
pub mod heap;
pub mod problem;
pub mod rng;
pub mod solver;
pub mod table;
pub mod wave;
pub mod worklist;

mod propagate;

#[cfg(test)]
mod test_support;

pub use config::SolverConfig;
pub use error::{
    Contradiction, ContradictionKind, InternalError, SolveError, SolveResult, ValidationError,
};
pub use grid::CollapsedGrid;
pub use problem::{load_problem, save_problem, Problem, ProblemIoError, ValidatedProblem};
pub use rng::{StdRandom, WfcRng, Xoshiro128};
pub use solver::{solve, solve_with_retries, solve_with_rng, Solution, SolvePhase, SolveStats, Solver};
pub use table::PropagationTable;
pub use wave::{Direction, Mask, Wave, MAX_PATTERNS};
