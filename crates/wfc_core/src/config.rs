//! Solver settings.
//!
//! The iteration caps are safety nets, not proven termination bounds. With
//! the defaults a legitimate solve stays far below both: propagation pops at
//! most `num_patterns` times per cell and the selection loop pops at most
//! one heap entry per mask change.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PROPAGATION_LIMIT_FACTOR: usize = 16;
pub const DEFAULT_ITERATION_LIMIT_FACTOR: usize = 16;
pub const DEFAULT_ENTROPY_NOISE: f64 = 0.001;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Max worklist pops per propagation, as a multiple of the cell count
    pub propagation_limit_factor: usize,
    /// Max heap pops per solve, as a multiple of the cell count
    pub iteration_limit_factor: usize,
    /// Scale of the random offset added to entropy keys
    pub entropy_noise: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            propagation_limit_factor: DEFAULT_PROPAGATION_LIMIT_FACTOR,
            iteration_limit_factor: DEFAULT_ITERATION_LIMIT_FACTOR,
            entropy_noise: DEFAULT_ENTROPY_NOISE,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.propagation_limit_factor == 0 {
            return Err(ValidationError::Config {
                field: "propagation_limit_factor",
            });
        }
        if self.iteration_limit_factor == 0 {
            return Err(ValidationError::Config {
                field: "iteration_limit_factor",
            });
        }
        if !self.entropy_noise.is_finite() || self.entropy_noise < 0.0 {
            return Err(ValidationError::Config {
                field: "entropy_noise",
            });
        }
        Ok(())
    }

    #[inline]
    pub fn propagation_limit(&self, cells: usize) -> usize {
        cells.saturating_mul(self.propagation_limit_factor)
    }

    #[inline]
    pub fn iteration_limit(&self, cells: usize) -> usize {
        cells.saturating_mul(self.iteration_limit_factor)
    }
}
