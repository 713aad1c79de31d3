//! Error taxonomy for the rostering optimizer.
//!
//! `SemanticWarning`s are deliberately *not* part of [`RosterError`]: they are
//! non-fatal and are collected alongside a successful normalization instead
//! of aborting the run.

use thiserror::Error;

/// Raised before model construction: the input tables don't match the
/// expected schema.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputSchemaError {
    #[error("required table '{0}' is missing")]
    MissingTable(&'static str),

    #[error("table '{table}' is missing required column '{column}'")]
    MissingColumn { table: &'static str, column: &'static str },

    #[error("TargetMonthYear '{0}' is not a valid 'Mmm-YY' month/year")]
    UnparsableMonthYear(String),

    #[error("OfficePercentage {0} is outside the valid range [0, 1]")]
    OfficePercentageOutOfRange(f64),
}

/// Logged and non-fatal: normalization continues past any of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticWarning {
    /// A fixed seat's `AssignedEmployeeID` does not match any known employee.
    FixedSeatUnknownEmployee { seat_code: String, employee_id: String },
    /// A seat's `Days` column parsed to an empty weekday set.
    SeatWithNoAvailableDays { seat_code: String },
    /// An employee's sub-team does not appear in `SubTeamOfficeDays` or
    /// `SpecialSubTeamDays`, harmless, but usually a typo.
    OrphanSubTeam { sub_team: String, employee_id: String },
}

impl std::fmt::Display for SemanticWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SemanticWarning::FixedSeatUnknownEmployee { seat_code, employee_id } => write!(
                f,
                "seat '{seat_code}' is fixed to unknown employee '{employee_id}'; seat will sit empty"
            ),
            SemanticWarning::SeatWithNoAvailableDays { seat_code } => {
                write!(f, "seat '{seat_code}' has no available days and can never be assigned")
            }
            SemanticWarning::OrphanSubTeam { sub_team, employee_id } => write!(
                f,
                "employee '{employee_id}' belongs to sub-team '{sub_team}', which has no designated \
                 or special days configured"
            ),
        }
    }
}

/// The hard constraint families the model builder emits, used to name a
/// likely-binding constraint in [`InfeasibleModel`] when detectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintFamily {
    SeatCapacity,
    OneSeatPerEmployee,
    MonthlyQuota,
    FixedSeatPinning,
    SeatAvailability,
    FlexibleUpperBound,
}

/// The solver returned a non-optimal status.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("no optimal solution found{}", likely_constraint.map(|c| format!(" (likely binding: {c:?})")).unwrap_or_default())]
pub struct InfeasibleModel {
    pub likely_constraint: Option<ConstraintFamily>,
}

/// The solver invocation itself failed (crash, resource exhaustion).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("solver invocation failed: {0}")]
pub struct SolverError(pub String);

/// The single error type the orchestrator's public entry point returns.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RosterError {
    #[error(transparent)]
    InputSchema(#[from] InputSchemaError),

    #[error(transparent)]
    Infeasible(#[from] InfeasibleModel),

    #[error(transparent)]
    Solver(#[from] SolverError),
}
