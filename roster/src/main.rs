//! CLI entry point. Spreadsheet I/O is out of scope, so the adapter here
//! reads a single JSON file shaped like [`RosterInput`] and
//! writes the result grid / history appends back out as JSON, a stand-in a
//! real spreadsheet adapter would replace without touching anything else in
//! this crate.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use roster::backend::GoodLpBackend;
use roster::config::{SolverConfig, Weights};
use roster::error::RosterError;
use roster::input::{RosterInput, SpecialHistoryEntry};
use roster::orchestrator::{self, SpreadsheetAdapter};

#[derive(Parser, Debug)]
#[command(name = "roster", about = "Assigns employees to seats across a month's working days")]
struct Cli {
    /// Path to a JSON file shaped like the roster input tables.
    #[arg(long)]
    input: PathBuf,

    /// Where to write the result grid (JSON rows of cells).
    #[arg(long)]
    output: PathBuf,

    /// Where to append this run's special-day history rows, if any.
    #[arg(long)]
    history: Option<PathBuf>,

    /// Optional JSON file overriding the default objective weights.
    #[arg(long)]
    weights: Option<PathBuf>,

    /// Best-effort wall-clock cutoff for the solver, in seconds.
    #[arg(long)]
    time_limit_secs: Option<f64>,
}

#[derive(Debug, Error)]
enum JsonFileError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse '{path}' as JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

struct JsonFileAdapter {
    input_path: PathBuf,
    output_path: PathBuf,
    history_path: Option<PathBuf>,
}

#[derive(Serialize, Deserialize, Default)]
struct HistoryFile {
    entries: Vec<SpecialHistoryEntry>,
}

impl SpreadsheetAdapter for JsonFileAdapter {
    type Error = JsonFileError;

    fn load(&mut self) -> Result<RosterInput, Self::Error> {
        let text = fs::read_to_string(&self.input_path).map_err(|source| JsonFileError::Read {
            path: self.input_path.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| JsonFileError::Parse {
            path: self.input_path.clone(),
            source,
        })
    }

    fn write_grid(&mut self, grid: &[Vec<String>]) -> Result<(), Self::Error> {
        let text = serde_json::to_string_pretty(grid).expect("grid serializes infallibly");
        fs::write(&self.output_path, text).map_err(|source| JsonFileError::Write {
            path: self.output_path.clone(),
            source,
        })
    }

    fn append_history(&mut self, entries: &[SpecialHistoryEntry]) -> Result<(), Self::Error> {
        let Some(path) = &self.history_path else {
            return Ok(());
        };
        let mut file: HistoryFile = match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).map_err(|source| JsonFileError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HistoryFile::default(),
            Err(source) => {
                return Err(JsonFileError::Read {
                    path: path.clone(),
                    source,
                })
            }
        };
        file.entries.extend(entries.iter().cloned());
        let text = serde_json::to_string_pretty(&file).expect("history serializes infallibly");
        fs::write(path, text).map_err(|source| JsonFileError::Write {
            path: path.clone(),
            source,
        })
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let weights = match &cli.weights {
        Some(path) => match load_weights(path) {
            Ok(w) => w,
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => Weights::default(),
    };
    let config = SolverConfig {
        time_limit: cli.time_limit_secs.map(std::time::Duration::from_secs_f64),
    };

    let mut adapter = JsonFileAdapter {
        input_path: cli.input,
        output_path: cli.output,
        history_path: cli.history,
    };

    match orchestrator::run::<GoodLpBackend, _>(&mut adapter, &weights, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(orchestrator::OrchestratorError::Roster(e)) => {
            error!("{e}");
            exit_code_for(&e)
        }
        Err(orchestrator::OrchestratorError::Adapter(e)) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn load_weights(path: &PathBuf) -> Result<Weights, JsonFileError> {
    let text = fs::read_to_string(path).map_err(|source| JsonFileError::Read {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| JsonFileError::Parse {
        path: path.clone(),
        source,
    })
}

/// Process exit contract: 0 on optimal solve, distinct nonzero codes per
/// failure category so a calling script can tell them apart.
fn exit_code_for(error: &RosterError) -> ExitCode {
    match error {
        RosterError::InputSchema(_) => ExitCode::from(2),
        RosterError::Infeasible(_) => ExitCode::from(3),
        RosterError::Solver(_) => ExitCode::from(4),
    }
}
