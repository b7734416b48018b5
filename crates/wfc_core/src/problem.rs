//! Solver input: the serde model of one solve call and its validation.
//!
//! A `Problem` mirrors the call contract field for field and is what problem
//! files contain. `Problem::validate` checks every shape and range rule and
//! produces a `ValidatedProblem`, the only thing the solver accepts.
//!
//! # Example
//!
//! ```
//! use wfc_core::{PropagationTable, Problem};
//!
//! let problem = Problem::with_table(4, 4, 2, &PropagationTable::free(2), vec![1.0, 1.0]);
//! let validated = problem.validate().unwrap();
//! assert_eq!(validated.cells(), 16);
//! ```

use crate::config::SolverConfig;
use crate::error::ValidationError;
use crate::table::PropagationTable;
use crate::wave::{full_mask, Mask, MAX_PATTERNS};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Errors that can occur while reading or writing problem files.
#[derive(Debug)]
pub enum ProblemIoError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for ProblemIoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProblemIoError::Io(e) => write!(f, "IO error: {}", e),
            ProblemIoError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for ProblemIoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProblemIoError::Io(e) => Some(e),
            ProblemIoError::Json(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ProblemIoError {
    fn from(e: std::io::Error) -> Self {
        ProblemIoError::Io(e)
    }
}

impl From<serde_json::Error> for ProblemIoError {
    fn from(e: serde_json::Error) -> Self {
        ProblemIoError::Json(e)
    }
}

/// Everything a solve needs except the seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub width: usize,
    pub height: usize,
    pub num_patterns: usize,
    /// `propagation[d][mask]`, 4 rows of 256 entries
    pub propagation: Vec<Vec<Mask>>,
    pub weights: Vec<f64>,
    /// Row-major starting masks; `None` means every pattern is possible everywhere
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_wave: Option<Vec<Mask>>,
    /// Seed used when the caller doesn't supply one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default)]
    pub config: SolverConfig,
}

impl Problem {
    pub fn new(
        width: usize,
        height: usize,
        num_patterns: usize,
        propagation: Vec<Vec<Mask>>,
        weights: Vec<f64>,
    ) -> Self {
        Self {
            width,
            height,
            num_patterns,
            propagation,
            weights,
            initial_wave: None,
            seed: None,
            config: SolverConfig::default(),
        }
    }

    /// Build from an already constructed table.
    pub fn with_table(
        width: usize,
        height: usize,
        num_patterns: usize,
        table: &PropagationTable,
        weights: Vec<f64>,
    ) -> Self {
        Self::new(width, height, num_patterns, table.to_rows(), weights)
    }

    pub fn initial_wave(mut self, wave: Vec<Mask>) -> Self {
        self.initial_wave = Some(wave);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Check every input rule. Nothing is solved and no randomness is drawn.
    pub fn validate(&self) -> Result<ValidatedProblem, ValidationError> {
        if self.width == 0 {
            return Err(ValidationError::ZeroWidth);
        }
        if self.height == 0 {
            return Err(ValidationError::ZeroHeight);
        }
        let cells =
            self.width
                .checked_mul(self.height)
                .ok_or(ValidationError::DimensionsOverflow {
                    width: self.width,
                    height: self.height,
                })?;
        if self.num_patterns == 0 || self.num_patterns > MAX_PATTERNS {
            return Err(ValidationError::PatternCount(self.num_patterns));
        }

        let table = PropagationTable::from_rows(&self.propagation)?;

        if self.weights.len() != self.num_patterns {
            return Err(ValidationError::WeightCount {
                expected: self.num_patterns,
                actual: self.weights.len(),
            });
        }
        for (pattern, &weight) in self.weights.iter().enumerate() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ValidationError::InvalidWeight { pattern, weight });
            }
        }
        // Every mask's total is bounded by this sum, so entropy and choice stay finite.
        if !self.weights.iter().sum::<f64>().is_finite() {
            return Err(ValidationError::WeightTotalOverflow);
        }

        if let Some(wave) = &self.initial_wave {
            if wave.len() != cells {
                return Err(ValidationError::WaveLength {
                    expected: cells,
                    actual: wave.len(),
                });
            }
            let allowed = full_mask(self.num_patterns);
            if let Some((cell, &mask)) = wave.iter().enumerate().find(|&(_, &m)| m & !allowed != 0)
            {
                return Err(ValidationError::CellOutOfRange {
                    cell,
                    mask,
                    num_patterns: self.num_patterns,
                });
            }
        }

        self.config.validate()?;

        Ok(ValidatedProblem {
            width: self.width,
            height: self.height,
            num_patterns: self.num_patterns,
            table,
            weights: self.weights.clone(),
            initial_wave: self.initial_wave.clone(),
            config: self.config.clone(),
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, ProblemIoError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String, ProblemIoError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Load a problem from a JSON file.
pub fn load_problem<P: AsRef<Path>>(path: P) -> Result<Problem, ProblemIoError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

/// Save a problem as pretty-printed JSON.
pub fn save_problem<P: AsRef<Path>>(problem: &Problem, path: P) -> Result<(), ProblemIoError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, problem)?;
    writer.flush()?;
    Ok(())
}

/// A problem that passed validation. Shapes and ranges are guaranteed.
#[derive(Debug, Clone)]
pub struct ValidatedProblem {
    width: usize,
    height: usize,
    num_patterns: usize,
    table: PropagationTable,
    weights: Vec<f64>,
    initial_wave: Option<Vec<Mask>>,
    config: SolverConfig,
}

impl ValidatedProblem {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cells(&self) -> usize {
        self.width * self.height
    }

    pub fn num_patterns(&self) -> usize {
        self.num_patterns
    }

    pub fn table(&self) -> &PropagationTable {
        &self.table
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn initial_wave(&self) -> Option<&[Mask]> {
        self.initial_wave.as_deref()
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }
}
