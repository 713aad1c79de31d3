//! A minimal 0/1 MIP backend abstraction: add binary variable, add integer
//! variable with bounds, add linear constraint (≤, ≥, =), add linear
//! objective term, solve, read values. Any 0/1 MIP backend fits this shape.
//! [`GoodLpBackend`] is the one concrete implementation, built on `good_lp`'s
//! pure-Rust `microlp` solver.

use std::collections::HashMap;
use std::time::Duration;

use good_lp::{variable, Expression, ProblemVariables, Solution as GoodLpSolution, SolverModel, Variable};

use crate::error::SolverError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    Le,
    Ge,
    Eq,
}

/// The only two outcomes the solver driver (C5) is allowed to observe:
/// either an optimal assignment, or nothing at all. An invocation failure
/// (crash, I/O) is a distinct `Err`.
pub enum SolveOutcome<V> {
    Optimal(HashMap<V, f64>),
    NotOptimal,
}

pub trait MipBackend: Default {
    type Var: Copy + Eq + std::hash::Hash + std::fmt::Debug;

    fn add_binary_var(&mut self) -> Self::Var;
    fn add_integer_var(&mut self, lower: f64, upper: f64) -> Self::Var;
    fn add_constraint(&mut self, terms: &[(f64, Self::Var)], op: ConstraintOp, rhs: f64);
    fn add_objective_term(&mut self, coeff: f64, var: Self::Var);

    /// Consumes the model and solves it. `time_limit` is honored on a
    /// best-effort basis: not every backend (including the default
    /// `microlp` one) exposes a wall-clock cutoff; a backend that cannot
    /// honor it runs to completion. A timeout that elapses without an
    /// optimum found MUST be reported as `NotOptimal`, never as an `Err`.
    fn solve(self, time_limit: Option<Duration>) -> Result<SolveOutcome<Self::Var>, SolverError>;
}

#[derive(Default)]
pub struct GoodLpBackend {
    vars: ProblemVariables,
    created: Vec<Variable>,
    constraints: Vec<good_lp::constraint::Constraint>,
    objective: Expression,
}

impl MipBackend for GoodLpBackend {
    type Var = Variable;

    fn add_binary_var(&mut self) -> Variable {
        let v = self.vars.add(variable().binary());
        self.created.push(v);
        v
    }

    fn add_integer_var(&mut self, lower: f64, upper: f64) -> Variable {
        let v = self.vars.add(variable().integer().min(lower).max(upper));
        self.created.push(v);
        v
    }

    fn add_constraint(&mut self, terms: &[(f64, Variable)], op: ConstraintOp, rhs: f64) {
        let expr = terms
            .iter()
            .fold(Expression::from(0.0), |acc, (coeff, var)| acc + *coeff * *var);
        let constraint = match op {
            ConstraintOp::Le => expr.leq(rhs),
            ConstraintOp::Ge => expr.geq(rhs),
            ConstraintOp::Eq => expr.eq(rhs),
        };
        self.constraints.push(constraint);
    }

    fn add_objective_term(&mut self, coeff: f64, var: Variable) {
        self.objective += coeff * var;
    }

    fn solve(self, _time_limit: Option<Duration>) -> Result<SolveOutcome<Variable>, SolverError> {
        let GoodLpBackend {
            vars,
            created,
            constraints,
            objective,
        } = self;

        let mut problem = vars.maximise(objective).using(good_lp::default_solver);
        for constraint in constraints {
            problem = problem.with(constraint);
        }

        match problem.solve() {
            Ok(solution) => {
                let values = created.iter().map(|v| (*v, solution.value(*v))).collect();
                Ok(SolveOutcome::Optimal(values))
            }
            Err(good_lp::ResolutionError::Infeasible) | Err(good_lp::ResolutionError::Unbounded) => {
                Ok(SolveOutcome::NotOptimal)
            }
            Err(other) => Err(SolverError(format!("{other:?}"))),
        }
    }
}
