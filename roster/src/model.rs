//! The model builder: emits the ILP onto a [`MipBackend`], decision
//! variables, hard constraints, and the weighted objective.
//!
//! Two sparsification choices keep the model proportional to the number of
//! *feasible* assignments rather than the full `|E|·|S|·|D|` cross product,
//! without changing the feasible region or the optimum:
//!
//! - Seat availability: `x[e,s,d]` is never created for an unavailable
//!   `(s,d)` pair, instead of being created and forced to 0.
//! - Fixed-seat pinning: at a fixed `(s,d)`, only `x[e*,s,d]` is created
//!   (pinned to 1); other employees' variables for that `(s,d)` are never
//!   created, instead of being created and forced to 0.
//!
//! The consecutive-day auxiliary `y[e,d]` is only created for pairs where
//! `disallowed_consec` holds, since an allowed pair's `y` never appears in
//! the objective and its feasible value is unconstrained by anything else.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::backend::{ConstraintOp, MipBackend};
use crate::config::Weights;
use crate::input::NormalizedInput;

pub struct ModelHandles<V> {
    pub x: HashMap<(String, String, NaiveDate), V>,
    pub z: HashMap<String, V>,
}

pub fn build<B: MipBackend>(backend: &mut B, input: &NormalizedInput, weights: &Weights) -> ModelHandles<B::Var> {
    let mut x: HashMap<(String, String, NaiveDate), B::Var> = HashMap::new();

    // Decision variables, honoring the sparsifications above.
    for seat in &input.seats {
        for date in &input.working_dates {
            if !input.seat_available.contains(&(seat.code.clone(), *date)) {
                continue;
            }
            if let Some(fixed_emp) = input.fixed_at.get(&(seat.code.clone(), *date)) {
                let var = backend.add_binary_var();
                backend.add_constraint(&[(1.0, var)], ConstraintOp::Eq, 1.0);
                x.insert((fixed_emp.clone(), seat.code.clone(), *date), var);
                continue;
            }
            for employee in &input.employees {
                let var = backend.add_binary_var();
                x.insert((employee.id.clone(), seat.code.clone(), *date), var);
            }
        }
    }

    // Seat capacity: at most one employee per seat per date.
    for seat in &input.seats {
        for date in &input.working_dates {
            let terms: Vec<(f64, B::Var)> = input
                .employees
                .iter()
                .filter_map(|e| x.get(&(e.id.clone(), seat.code.clone(), *date)).map(|v| (1.0, *v)))
                .collect();
            if !terms.is_empty() {
                backend.add_constraint(&terms, ConstraintOp::Le, 1.0);
            }
        }
    }

    // One seat per employee per day.
    for employee in &input.employees {
        for date in &input.working_dates {
            let terms: Vec<(f64, B::Var)> = input
                .seats
                .iter()
                .filter_map(|s| x.get(&(employee.id.clone(), s.code.clone(), *date)).map(|v| (1.0, *v)))
                .collect();
            if !terms.is_empty() {
                backend.add_constraint(&terms, ConstraintOp::Le, 1.0);
            }
        }
    }

    // Monthly quota: every employee reaches their required day count.
    for employee in &input.employees {
        let terms = employee_assignment_terms(&x, input, employee_id_ref(employee), None);
        backend.add_constraint(&terms, ConstraintOp::Ge, input.required_days as f64);
    }

    // Designated-day target with slack.
    let mut z: HashMap<String, B::Var> = HashMap::new();
    for employee in &input.employees {
        let Some(designated) = input.designated_dates.get(&employee.id) else {
            continue;
        };
        if designated.is_empty() {
            continue;
        }
        let z_var = backend.add_integer_var(0.0, weights.designated_min as f64);
        z.insert(employee.id.clone(), z_var);

        let mut terms: Vec<(f64, B::Var)> = input
            .seats
            .iter()
            .flat_map(|s| designated.iter().map(move |d| (s, *d)))
            .filter_map(|(s, d)| x.get(&(employee.id.clone(), s.code.clone(), d)).map(|v| (1.0, *v)))
            .collect();
        terms.push((1.0, z_var));
        backend.add_constraint(&terms, ConstraintOp::Ge, weights.designated_min as f64);
        backend.add_objective_term(-weights.big_penalty, z_var);
    }

    // Flexible upper bound on non-special days, for employees with no fixed
    // obligations anywhere. Keeps over-allocation from eating special-day
    // capacity.
    for employee in &input.employees {
        if input.fixed_employee_ids.contains(&employee.id) {
            continue;
        }
        let special_days = input.special_days_of_sub_team(&employee.sub_team);
        let terms = employee_assignment_terms(&x, input, &employee.id, Some(&special_days));
        backend.add_constraint(&terms, ConstraintOp::Le, input.required_days as f64);
    }

    // Consecutive-day linearization, restricted to disallowed pairs (see
    // module docs), feeding the objective's anti-clustering penalty.
    for employee in &input.employees {
        for window in input.working_dates.windows(2) {
            let (d, d_next) = (window[0], window[1]);
            if !disallowed_consec(input, employee, d, d_next) {
                continue;
            }
            let a_d = employee_day_terms(&x, input, &employee.id, d);
            let a_next = employee_day_terms(&x, input, &employee.id, d_next);
            if a_d.is_empty() && a_next.is_empty() {
                continue;
            }

            let y = backend.add_binary_var();

            let mut le_d = a_d.clone();
            le_d.push((-1.0, y));
            backend.add_constraint(&le_d, ConstraintOp::Le, 0.0);

            let mut le_next = a_next.clone();
            le_next.push((-1.0, y));
            backend.add_constraint(&le_next, ConstraintOp::Le, 0.0);

            let mut ge = a_d;
            ge.extend(a_next);
            ge.push((-1.0, y));
            backend.add_constraint(&ge, ConstraintOp::Le, 1.0);

            backend.add_objective_term(-weights.consecutive_penalty, y);
        }
    }

    // Objective: fill + preference + designated + special + fairness bonuses.
    for ((emp_id, seat_code, date), var) in &x {
        let employee = &input.employees[input.emp_by_id[emp_id]];
        let bonus = bonus_for(input, weights, employee, seat_code, *date);
        backend.add_objective_term(bonus, *var);
    }

    ModelHandles { x, z }
}

fn employee_id_ref(employee: &crate::input::Employee) -> &str {
    &employee.id
}

fn employee_assignment_terms<V: Copy>(
    x: &HashMap<(String, String, NaiveDate), V>,
    input: &NormalizedInput,
    employee_id: &str,
    exclude_dates: Option<&std::collections::HashSet<NaiveDate>>,
) -> Vec<(f64, V)> {
    let mut terms = Vec::new();
    for seat in &input.seats {
        for date in &input.working_dates {
            if let Some(exclude) = exclude_dates {
                if exclude.contains(date) {
                    continue;
                }
            }
            if let Some(v) = x.get(&(employee_id.to_string(), seat.code.clone(), *date)) {
                terms.push((1.0, *v));
            }
        }
    }
    terms
}

fn employee_day_terms<V: Copy>(
    x: &HashMap<(String, String, NaiveDate), V>,
    input: &NormalizedInput,
    employee_id: &str,
    date: NaiveDate,
) -> Vec<(f64, V)> {
    input
        .seats
        .iter()
        .filter_map(|s| x.get(&(employee_id.to_string(), s.code.clone(), date)).map(|v| (1.0, *v)))
        .collect()
}

fn is_designated(input: &NormalizedInput, employee: &crate::input::Employee, date: NaiveDate) -> bool {
    input
        .designated_dates
        .get(&employee.id)
        .is_some_and(|dates| dates.contains(&date))
}

fn is_special_for(input: &NormalizedInput, employee: &crate::input::Employee, date: NaiveDate) -> bool {
    input.special.get(&date).is_some_and(|rule| rule.sub_team == employee.sub_team)
}

fn disallowed_consec(
    input: &NormalizedInput,
    employee: &crate::input::Employee,
    d: NaiveDate,
    d_next: NaiveDate,
) -> bool {
    let allowed = (is_designated(input, employee, d) && is_special_for(input, employee, d_next))
        || (is_designated(input, employee, d_next) && is_special_for(input, employee, d));
    !allowed
}

fn bonus_for(
    input: &NormalizedInput,
    weights: &Weights,
    employee: &crate::input::Employee,
    seat_code: &str,
    date: NaiveDate,
) -> f64 {
    let mut bonus = weights.fill_bonus;

    if input.seat_preferences.contains(&(employee.id.clone(), seat_code.to_string())) {
        bonus += weights.pref_bonus;
    }
    if is_designated(input, employee, date) {
        bonus += weights.designated_bonus;
    }
    if let Some(rule) = input.special.get(&date) {
        if rule.sub_team == employee.sub_team {
            bonus += weights.special_bonus;
            if !input.history_pairs.contains(&(rule.descriptor.clone(), employee.id.clone())) {
                bonus += weights.fairness_coef;
            }
        }
    }
    bonus
}
