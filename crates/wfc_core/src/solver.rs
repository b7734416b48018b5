//! Top-level solve loop.
//!
//! One solve runs the state machine
//! `Initializing -> Selecting -> Collapsing -> Propagating -> Selecting ...`
//! until every cell holds one pattern (`Done`) or a contradiction aborts it.
//! Contradictions leave the machine through `Err`, so there is no explicit
//! failed phase. Nothing is retried inside a solve; `solve_with_retries` is a
//! caller-side loop over fresh solves.
//!
//! # Example
//!
//! ```
//! use wfc_core::{solve, PropagationTable, Problem};
//!
//! let problem = Problem::with_table(8, 8, 3, &PropagationTable::free(3), vec![1.0, 1.0, 2.0]);
//! let grid = solve(&problem, 42).unwrap();
//! assert_eq!(grid.as_slice().len(), 64);
//! ```

use crate::config::SolverConfig;
use crate::entropy::{noisy_entropy, weighted_choice};
use crate::error::{Contradiction, ContradictionKind, InternalError, SolveError, SolveResult};
use crate::grid::CollapsedGrid;
use crate::heap::EntropyHeap;
use crate::problem::{Problem, ValidatedProblem};
use crate::rng::{WfcRng, Xoshiro128};
use crate::table::PropagationTable;
use crate::wave::{count, full_mask, is_collapsed, single_pattern, Direction, Wave};
use crate::worklist::Worklist;
use serde::Serialize;
use tracing::{debug, trace, warn};

/// Counters collected over one solve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SolveStats {
    /// Cells collapsed by weighted choice (not by propagation)
    pub collapses: usize,
    /// Cells popped from the propagation worklist
    pub propagation_pops: usize,
    /// Heap entries discarded because the cell changed after they were pushed
    pub stale_entries: usize,
    pub heap_pushes: u64,
}

/// A successful solve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Solution {
    pub grid: CollapsedGrid,
    pub stats: SolveStats,
    /// Seed that produced this grid, when the solve was seeded
    pub seed: Option<u64>,
    /// Number of solves it took, including this one
    pub attempts: usize,
}

/// Phase of the solve state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolvePhase {
    Initializing,
    Selecting,
    Collapsing(usize),
    Propagating(usize),
    Done,
}

/// Runs solves against one validated problem.
///
/// Holds no mutable state, so one solver can be shared by many threads as
/// long as each solve gets its own random source.
#[derive(Debug, Clone, Copy)]
pub struct Solver<'a> {
    problem: &'a ValidatedProblem,
}

impl<'a> Solver<'a> {
    pub fn new(problem: &'a ValidatedProblem) -> Self {
        Self { problem }
    }

    /// Solve with the default generator seeded from `seed`.
    pub fn solve_seeded(&self, seed: u64) -> SolveResult<Solution> {
        let mut rng = Xoshiro128::from_u64_seed(seed);
        let mut solution = self.solve_with(&mut rng)?;
        solution.seed = Some(seed);
        Ok(solution)
    }

    /// Solve drawing from a caller-provided random source.
    pub fn solve_with(&self, rng: &mut dyn WfcRng) -> SolveResult<Solution> {
        let problem = self.problem;
        debug!(
            width = problem.width(),
            height = problem.height(),
            patterns = problem.num_patterns(),
            "starting solve"
        );

        let mut search = Search::new(problem, rng)?;
        match search.run() {
            Ok(grid) => {
                debug!(stats = ?search.stats, "solve finished");
                Ok(Solution {
                    grid,
                    stats: search.stats,
                    seed: None,
                    attempts: 1,
                })
            }
            Err(e) => {
                debug!(error = %e, stats = ?search.stats, "solve failed");
                Err(e)
            }
        }
    }

    /// Solve with seeds `seed, seed + 1, ...` until one succeeds.
    ///
    /// Only contradictions trigger another attempt; any other error is
    /// returned immediately. After `tries` contradictions the last one is
    /// returned. `tries` of 0 is treated as 1.
    pub fn solve_with_retries(&self, seed: u64, tries: usize) -> SolveResult<Solution> {
        let tries = tries.max(1);
        let mut attempt = 1;
        loop {
            let attempt_seed = seed.wrapping_add(attempt as u64 - 1);
            match self.solve_seeded(attempt_seed) {
                Ok(mut solution) => {
                    solution.attempts = attempt;
                    return Ok(solution);
                }
                Err(SolveError::Contradiction(c)) if attempt < tries => {
                    debug!(attempt, seed = attempt_seed, contradiction = %c, "retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Validate `problem` and solve it with `seed`.
pub fn solve(problem: &Problem, seed: u64) -> SolveResult<CollapsedGrid> {
    let validated = problem.validate()?;
    Ok(Solver::new(&validated).solve_seeded(seed)?.grid)
}

/// Validate `problem` and solve it drawing from `rng`.
///
/// Validation happens first, so a malformed problem never touches `rng`.
pub fn solve_with_rng(problem: &Problem, rng: &mut dyn WfcRng) -> SolveResult<Solution> {
    let validated = problem.validate()?;
    Solver::new(&validated).solve_with(rng)
}

/// Validate `problem` and solve it, retrying contradictions with successive seeds.
pub fn solve_with_retries(problem: &Problem, seed: u64, tries: usize) -> SolveResult<Solution> {
    let validated = problem.validate()?;
    Solver::new(&validated).solve_with_retries(seed, tries)
}

/// Mutable state of one solve. Propagation lives in `propagate.rs`.
pub(crate) struct Search<'p, 'r> {
    pub(crate) wave: Wave,
    pub(crate) table: &'p PropagationTable,
    pub(crate) weights: &'p [f64],
    pub(crate) config: &'p SolverConfig,
    pub(crate) num_patterns: usize,
    pub(crate) heap: EntropyHeap,
    pub(crate) worklist: Worklist,
    pub(crate) rng: &'r mut dyn WfcRng,
    /// Cells with more than one pattern left
    pub(crate) uncollapsed: usize,
    pub(crate) stats: SolveStats,
}

impl<'p, 'r> Search<'p, 'r> {
    pub(crate) fn new(problem: &'p ValidatedProblem, rng: &'r mut dyn WfcRng) -> SolveResult<Self> {
        let (width, height) = (problem.width(), problem.height());
        let wave = match problem.initial_wave() {
            Some(cells) => Wave::from_cells(width, height, cells)?,
            None => Wave::filled(width, height, full_mask(problem.num_patterns()))?,
        };
        let cells = wave.len();

        Ok(Self {
            wave,
            table: problem.table(),
            weights: problem.weights(),
            config: problem.config(),
            num_patterns: problem.num_patterns(),
            heap: EntropyHeap::with_capacity(cells)?,
            worklist: Worklist::with_cells(cells)?,
            rng,
            uncollapsed: 0,
            stats: SolveStats::default(),
        })
    }

    pub(crate) fn run(&mut self) -> SolveResult<CollapsedGrid> {
        self.run_from(SolvePhase::Initializing)
    }

    pub(crate) fn run_from(&mut self, mut phase: SolvePhase) -> SolveResult<CollapsedGrid> {
        let iteration_limit = self.config.iteration_limit(self.wave.len());
        let mut iterations = 0usize;

        loop {
            phase = match phase {
                SolvePhase::Initializing => {
                    self.initialize()?;
                    SolvePhase::Selecting
                }
                SolvePhase::Selecting => {
                    if self.uncollapsed == 0 {
                        SolvePhase::Done
                    } else {
                        iterations += 1;
                        if iterations > iteration_limit {
                            return Err(Contradiction::new(ContradictionKind::IterationLimit).into());
                        }
                        match self.heap.pop_min() {
                            None => return self.finish_unresolved(),
                            Some(entry) if entry.is_stale(self.wave.get(entry.cell)) => {
                                self.stats.stale_entries += 1;
                                SolvePhase::Selecting
                            }
                            Some(entry) => SolvePhase::Collapsing(entry.cell),
                        }
                    }
                }
                SolvePhase::Collapsing(cell) => {
                    self.collapse(cell)?;
                    SolvePhase::Propagating(cell)
                }
                SolvePhase::Propagating(cell) => {
                    self.worklist.push(cell)?;
                    self.propagate()?;
                    SolvePhase::Selecting
                }
                SolvePhase::Done => return self.finish(),
            };
        }
    }

    /// Queue every open cell and make pre-constrained cells consistent with
    /// their neighbors before the first choice.
    fn initialize(&mut self) -> SolveResult<()> {
        self.uncollapsed = 0;
        for cell in 0..self.wave.len() {
            match count(self.wave.get(cell)) {
                0 => return Err(Contradiction::at(cell, ContradictionKind::EmptyInitialCell).into()),
                1 => {}
                _ => {
                    self.push_entropy(cell)?;
                    self.uncollapsed += 1;
                }
            }
        }

        let full = full_mask(self.num_patterns);
        for cell in 0..self.wave.len() {
            let mask = self.wave.get(cell);
            if mask != full || is_collapsed(mask) {
                self.worklist.push(cell)?;
            }
        }
        self.propagate()
    }

    /// Queue `cell` with a freshly computed entropy key.
    pub(crate) fn push_entropy(&mut self, cell: usize) -> SolveResult<()> {
        let mask = self.wave.get(cell);
        let entropy = noisy_entropy(mask, self.weights, self.config.entropy_noise, &mut *self.rng);
        self.heap.push(entropy, cell, mask)?;
        self.stats.heap_pushes = self.heap.pushes();
        Ok(())
    }

    pub(crate) fn mark_collapsed(&mut self, cell: usize) -> SolveResult<()> {
        self.uncollapsed = self
            .uncollapsed
            .checked_sub(1)
            .ok_or(InternalError::CounterUnderflow { cell })?;
        Ok(())
    }

    fn collapse(&mut self, cell: usize) -> SolveResult<()> {
        let mask = self.wave.get(cell);
        let pattern = weighted_choice(mask, self.weights, &mut *self.rng)
            .ok_or(Contradiction::at(cell, ContradictionKind::NoChoice))?;
        self.wave.set(cell, 1 << pattern);
        self.mark_collapsed(cell)?;
        self.stats.collapses += 1;
        trace!(cell, pattern, "collapsed");
        Ok(())
    }

    /// Queue drained before the counter reached zero.
    fn finish_unresolved(&self) -> SolveResult<CollapsedGrid> {
        if let Some(cell) = (0..self.wave.len()).find(|&c| !is_collapsed(self.wave.get(c))) {
            return Err(Contradiction::at(cell, ContradictionKind::Unresolved).into());
        }
        warn!(
            uncollapsed = self.uncollapsed,
            "uncollapsed counter out of sync with a fully collapsed wave"
        );
        self.finish()
    }

    /// Final check: every cell holds one pattern and every adjacent pair is
    /// allowed by the table.
    pub(crate) fn finish(&self) -> SolveResult<CollapsedGrid> {
        let mut patterns = Vec::new();
        patterns.try_reserve_exact(self.wave.len())?;

        for cell in 0..self.wave.len() {
            let mask = self.wave.get(cell);
            let pattern = single_pattern(mask).ok_or(InternalError::NotCollapsed { cell, mask })?;
            for direction in Direction::ALL {
                if let Some(neighbor) = self.wave.neighbor(cell, direction) {
                    if self.table.allowed(direction, mask) & self.wave.get(neighbor) == 0 {
                        return Err(InternalError::AdjacencyViolation {
                            cell,
                            neighbor,
                            direction,
                        }
                        .into());
                    }
                }
            }
            patterns.push(pattern as u8);
        }

        Ok(CollapsedGrid::from_patterns(
            self.wave.width(),
            self.wave.height(),
            patterns,
        ))
    }
}
