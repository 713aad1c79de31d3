//! Projects the sparse solution into a dense employee×date grid of seat
//! codes, and computes the special-day history rows this run should append.

use std::collections::HashMap;

use chrono::NaiveDate;
use log::info;

use crate::input::{Assignment, NormalizedInput, SpecialHistoryEntry};

pub struct ProjectedResult {
    /// Row 0: `"Employee Name"` + dates. Row 1: blank + weekday abbreviations.
    /// Rows 2..: employee name + assigned seat code (or empty) per date.
    pub grid: Vec<Vec<String>>,
    pub history_appends: Vec<SpecialHistoryEntry>,
}

pub fn project(input: &NormalizedInput, assignments: &[Assignment]) -> ProjectedResult {
    let mut by_emp_date: HashMap<(String, NaiveDate), String> = HashMap::new();
    for assignment in assignments {
        by_emp_date.insert((assignment.employee_id.clone(), assignment.date), assignment.seat_code.clone());
    }

    let mut grid = Vec::with_capacity(input.employees.len() + 2);

    let mut header = vec!["Employee Name".to_string()];
    header.extend(input.working_dates.iter().map(|d| d.format("%Y-%m-%d").to_string()));
    grid.push(header);

    let mut weekday_row = vec![String::new()];
    weekday_row.extend(input.working_dates.iter().map(|d| d.format("%a").to_string()));
    grid.push(weekday_row);

    for employee in &input.employees {
        let mut row = Vec::with_capacity(input.working_dates.len() + 1);
        row.push(employee.name.clone());
        for date in &input.working_dates {
            row.push(by_emp_date.get(&(employee.id.clone(), *date)).cloned().unwrap_or_default());
        }
        grid.push(row);
    }

    let mut history_appends = Vec::new();
    for (date, rule) in &input.special {
        for employee in &input.employees {
            if employee.sub_team != rule.sub_team {
                continue;
            }
            if by_emp_date.contains_key(&(employee.id.clone(), *date)) {
                history_appends.push(SpecialHistoryEntry {
                    descriptor: rule.descriptor.clone(),
                    employee_id: employee.id.clone(),
                    month_year: input.target_month_year.clone(),
                });
            }
        }
    }
    info!("projected grid: {} rows, {} history rows appended", grid.len(), history_appends.len());

    ProjectedResult { grid, history_appends }
}
