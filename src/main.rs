use clap::{Parser, ValueEnum};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use wfc_core::{load_problem, ProblemIoError, SolveError, Solution, Solver};

/// Seed used when neither the command line nor the problem file names one
const DEFAULT_SEED: u64 = 0;

#[derive(Parser)]
#[command(name = "wave_collapse")]
#[command(about = "Solve a Wave Function Collapse problem file")]
struct Cli {
    /// Problem file (JSON)
    problem: PathBuf,

    /// Seed for the solve; overrides the seed stored in the problem file
    #[arg(long)]
    seed: Option<u64>,

    /// Number of seeds to try before giving up on contradictions
    #[arg(long, default_value_t = 1)]
    retries: usize,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Write the result here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One digit per cell, one line per row
    Text,
    /// Grid, statistics, seed and attempt count
    Json,
}

#[derive(Debug)]
enum CliError {
    Problem(ProblemIoError),
    Solve(SolveError),
    Output(std::io::Error),
    Json(serde_json::Error),
}

impl CliError {
    fn exit_code(&self) -> u8 {
        match self {
            CliError::Solve(SolveError::Contradiction(_)) => 2,
            CliError::Solve(SolveError::Internal(_)) => 3,
            _ => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Problem(e) => write!(f, "failed to load problem: {}", e),
            CliError::Solve(e) => write!(f, "{}", e),
            CliError::Output(e) => write!(f, "failed to write output: {}", e),
            CliError::Json(e) => write!(f, "failed to encode result: {}", e),
        }
    }
}

impl From<ProblemIoError> for CliError {
    fn from(e: ProblemIoError) -> Self {
        CliError::Problem(e)
    }
}

impl From<SolveError> for CliError {
    fn from(e: SolveError) -> Self {
        CliError::Solve(e)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let problem = load_problem(&cli.problem)?;
    let seed = cli.seed.or(problem.seed).unwrap_or(DEFAULT_SEED);
    info!(
        path = %cli.problem.display(),
        width = problem.width,
        height = problem.height,
        patterns = problem.num_patterns,
        seed,
        "loaded problem"
    );

    let validated = problem.validate().map_err(SolveError::from)?;
    let asymmetric = validated
        .table()
        .asymmetric_pairs(validated.num_patterns());
    if !asymmetric.is_empty() {
        warn!(
            pairs = asymmetric.len(),
            "propagation table disagrees with itself across opposite directions"
        );
    }
    let solution = Solver::new(&validated).solve_with_retries(seed, cli.retries)?;
    info!(
        seed = solution.seed,
        attempts = solution.attempts,
        collapses = solution.stats.collapses,
        "solved"
    );

    let rendered = render(&solution, cli.format)?;
    match &cli.output {
        Some(path) => fs::write(path, rendered).map_err(CliError::Output)?,
        None => println!("{}", rendered.trim_end()),
    }
    Ok(())
}

fn render(solution: &Solution, format: Format) -> Result<String, CliError> {
    match format {
        Format::Text => Ok(format!("{}\n", solution.grid)),
        Format::Json => {
            let mut json = serde_json::to_string_pretty(solution).map_err(CliError::Json)?;
            json.push('\n');
            Ok(json)
        }
    }
}
