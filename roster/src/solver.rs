//! The solver driver. Owns a [`MipBackend`], invokes solve, and classifies
//! the outcome as `Optimal(assignment)` or `NotOptimal`. No partial
//! solution is ever surfaced.

use log::{info, warn};

use crate::backend::{MipBackend, SolveOutcome};
use crate::config::{SolverConfig, Weights};
use crate::error::{ConstraintFamily, InfeasibleModel, RosterError};
use crate::input::{Assignment, NormalizedInput};
use crate::model;

pub struct SolveResult {
    pub assignments: Vec<Assignment>,
}

pub fn solve<B: MipBackend>(
    input: &NormalizedInput,
    weights: &Weights,
    config: &SolverConfig,
) -> Result<SolveResult, RosterError> {
    let mut backend = B::default();
    let handles = model::build(&mut backend, input, weights);
    info!(
        "built model: {} employees, {} seats, {} working dates, {} x-variables",
        input.employees.len(),
        input.seats.len(),
        input.working_dates.len(),
        handles.x.len()
    );

    match backend.solve(config.time_limit)? {
        SolveOutcome::Optimal(values) => {
            let mut assignments = Vec::new();
            for ((employee_id, seat_code, date), var) in &handles.x {
                let value = values.get(var).copied().unwrap_or(0.0);
                if value > 0.5 {
                    assignments.push(Assignment {
                        employee_id: employee_id.clone(),
                        seat_code: seat_code.clone(),
                        date: *date,
                    });
                }
            }
            info!("solver status: optimal, {} assignments", assignments.len());
            Ok(SolveResult { assignments })
        }
        SolveOutcome::NotOptimal => {
            let likely_constraint = diagnose(input);
            warn!("solver status: not optimal, likely binding: {likely_constraint:?}");
            Err(RosterError::Infeasible(InfeasibleModel { likely_constraint }))
        }
    }
}

/// Best-effort detection of which hard constraint family is likely binding,
/// using only structural facts visible before solving; the solver itself
/// does not produce an infeasibility certificate.
fn diagnose(input: &NormalizedInput) -> Option<ConstraintFamily> {
    // Per employee: can they even reach `required_days` given seat
    // availability and fixed-seat exclusions?
    for employee in &input.employees {
        let reachable = input
            .seats
            .iter()
            .flat_map(|s| input.working_dates.iter().map(move |d| (s, *d)))
            .filter(|(s, d)| input.seat_available.contains(&(s.code.clone(), *d)))
            .filter(|(s, d)| match input.fixed_at.get(&(s.code.clone(), *d)) {
                Some(fixed_emp) => *fixed_emp == employee.id,
                None => true,
            })
            .count();
        if (reachable as u32) < input.required_days {
            return Some(ConstraintFamily::MonthlyQuota);
        }
    }

    // Whole-organization capacity: total required assignment-days versus
    // total available seat-days.
    let total_required: u64 = input.employees.len() as u64 * input.required_days as u64;
    let total_capacity: u64 = input.seat_available.len() as u64;
    if total_required > total_capacity {
        return Some(ConstraintFamily::SeatCapacity);
    }

    None
}
