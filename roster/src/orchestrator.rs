//! Trivial coordination: load inputs via the spreadsheet adapter, normalize,
//! solve, project, write outputs back. No retry, no fallback heuristic.

use log::{info, warn};
use thiserror::Error;

use crate::backend::MipBackend;
use crate::config::{SolverConfig, Weights};
use crate::error::RosterError;
use crate::input::{self, RosterInput, SpecialHistoryEntry};
use crate::project;
use crate::solver;

/// The sole contract with the (out-of-scope) spreadsheet layer: deliver the
/// six tables plus two scalars, and accept the rectangular result grid plus
/// history append rows.
pub trait SpreadsheetAdapter {
    type Error: std::error::Error + 'static;

    fn load(&mut self) -> Result<RosterInput, Self::Error>;
    fn write_grid(&mut self, grid: &[Vec<String>]) -> Result<(), Self::Error>;
    fn append_history(&mut self, entries: &[SpecialHistoryEntry]) -> Result<(), Self::Error>;
}

#[derive(Debug, Error)]
pub enum OrchestratorError<E: std::error::Error + 'static> {
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error("spreadsheet adapter error: {0}")]
    Adapter(#[source] E),
}

pub fn run<B, A>(adapter: &mut A, weights: &Weights, config: &SolverConfig) -> Result<(), OrchestratorError<A::Error>>
where
    B: MipBackend,
    A: SpreadsheetAdapter,
{
    let raw = adapter.load().map_err(OrchestratorError::Adapter)?;
    let (normalized, warnings) = input::normalize(&raw)?;
    for warning in &warnings {
        warn!("{warning}");
    }

    let result = solver::solve::<B>(&normalized, weights, config)?;
    let projected = project::project(&normalized, &result.assignments);

    adapter.write_grid(&projected.grid).map_err(OrchestratorError::Adapter)?;
    adapter
        .append_history(&projected.history_appends)
        .map_err(OrchestratorError::Adapter)?;

    info!(
        "orchestration complete: {} assignments, {} history rows",
        result.assignments.len(),
        projected.history_appends.len()
    );
    Ok(())
}
