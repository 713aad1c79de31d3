//! End-to-end scenario tests driving the orchestrator with an in-memory
//! adapter, plus a handful of invariants checked against every scenario's
//! resulting grid.

use std::collections::{HashMap, HashSet};
use std::convert::Infallible;

use chrono::{Datelike, NaiveDate, Weekday};

use roster::backend::GoodLpBackend;
use roster::config::{SolverConfig, Weights};
use roster::error::RosterError;
use roster::input::{
    EmployeeRow, HolidayRow, RosterInput, SeatPreferenceRow, SeatRow, SpecialHistoryEntry, SpecialHistoryRow,
    SpecialSubTeamDaysRow, SubTeamOfficeDaysRow,
};
use roster::orchestrator::{self, OrchestratorError, SpreadsheetAdapter};

struct InMemoryAdapter {
    input: RosterInput,
    grid: Option<Vec<Vec<String>>>,
    history: Vec<SpecialHistoryEntry>,
}

impl InMemoryAdapter {
    fn new(input: RosterInput) -> Self {
        InMemoryAdapter {
            input,
            grid: None,
            history: Vec::new(),
        }
    }
}

impl SpreadsheetAdapter for InMemoryAdapter {
    type Error = Infallible;

    fn load(&mut self) -> Result<RosterInput, Self::Error> {
        Ok(self.input.clone())
    }

    fn write_grid(&mut self, grid: &[Vec<String>]) -> Result<(), Self::Error> {
        self.grid = Some(grid.to_vec());
        Ok(())
    }

    fn append_history(&mut self, entries: &[SpecialHistoryEntry]) -> Result<(), Self::Error> {
        self.history.extend(entries.iter().cloned());
        Ok(())
    }
}

fn base_input() -> RosterInput {
    RosterInput {
        office_percentage: 0.1,
        target_month_year: "Mar-25".to_string(),
        employees: Vec::new(),
        seats: Vec::new(),
        public_holidays: Vec::new(),
        sub_team_office_days: Vec::new(),
        special_sub_team_days: Vec::new(),
        seat_preferences: Vec::new(),
        special_history: Vec::new(),
    }
}

fn employee(id: &str, name: &str, sub_team: &str) -> EmployeeRow {
    EmployeeRow {
        employee_id: id.to_string(),
        employee_name: name.to_string(),
        sub_team: sub_team.to_string(),
    }
}

fn flexible_seat(code: &str, days: &str) -> SeatRow {
    SeatRow {
        seat_code: code.to_string(),
        seat_type: "flexible".to_string(),
        days: days.to_string(),
        assigned_employee_id: None,
    }
}

fn fixed_seat(code: &str, days: &str, assigned_to: &str) -> SeatRow {
    SeatRow {
        seat_code: code.to_string(),
        seat_type: "fixed".to_string(),
        days: days.to_string(),
        assigned_employee_id: Some(assigned_to.to_string()),
    }
}

fn run(input: RosterInput) -> Result<InMemoryAdapter, OrchestratorError<Infallible>> {
    let mut adapter = InMemoryAdapter::new(input);
    let weights = Weights::default();
    let config = SolverConfig::default();
    orchestrator::run::<GoodLpBackend, _>(&mut adapter, &weights, &config)?;
    Ok(adapter)
}

/// Structural invariants every produced grid must satisfy, regardless of
/// which scenario produced it: correct dimensions, dates in order, no seat
/// double-booked, and every assigned seat actually available that weekday.
fn assert_invariants(raw: &RosterInput, grid: &[Vec<String>]) {
    let (year, month) = roster::input::parse_month_year(&raw.target_month_year).unwrap();
    let holidays: HashSet<NaiveDate> = raw.public_holidays.iter().map(|h| h.date).collect();
    let dates = roster::calendar::working_dates(year, month, &holidays);

    assert_eq!(grid.len(), raw.employees.len() + 2);
    for row in grid {
        assert_eq!(row.len(), dates.len() + 1);
    }

    let header_dates: Vec<String> = dates.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect();
    assert_eq!(&grid[0][1..], header_dates.as_slice());

    for col in 1..grid[0].len() {
        let mut seen = HashSet::new();
        for row in &grid[2..] {
            let cell = &row[col];
            if cell.is_empty() {
                continue;
            }
            assert!(seen.insert(cell.clone()), "seat '{cell}' double-booked on {}", grid[0][col]);
        }
    }

    let seat_days: HashMap<String, HashSet<Weekday>> = raw
        .seats
        .iter()
        .map(|s| (s.seat_code.clone(), roster::input::parse_days_string(&s.days)))
        .collect();
    for (col, date) in dates.iter().enumerate() {
        for row in &grid[2..] {
            let cell = &row[col + 1];
            if cell.is_empty() {
                continue;
            }
            assert!(seat_days[cell].contains(&date.weekday()), "seat '{cell}' not available on {date}");
        }
    }
}

/// A fixed seat is occupied by its pinned employee on every available date,
/// never by anyone else.
#[test]
fn fixed_seat_is_always_honored() {
    let mut input = base_input();
    input.employees = vec![employee("E1", "Alice", "x"), employee("E2", "Bob", "x")];
    input.seats = vec![
        fixed_seat("F1", "Mon,Tue,Wed,Thu,Fri", "E1"),
        flexible_seat("FL1", "Mon,Tue,Wed,Thu,Fri"),
    ];

    let adapter = run(input.clone()).expect("feasible");
    let grid = adapter.grid.expect("grid written");
    assert_invariants(&input, &grid);

    let alice_row = grid.iter().find(|r| r[0] == "Alice").unwrap();
    for cell in &alice_row[1..] {
        assert_eq!(cell, "F1");
    }
    let bob_row = grid.iter().find(|r| r[0] == "Bob").unwrap();
    assert!(!bob_row[1..].iter().any(|c| c == "F1"));
}

/// A flexible employee is assigned exactly `required_days` times: the
/// quota floor and the flexible-day ceiling coincide when only one seat
/// exists for them to occupy.
#[test]
fn quota_floor_is_met_exactly() {
    let mut input = base_input();
    input.office_percentage = 10.0 / 21.0;
    input.employees = vec![employee("E1", "Alice", "x")];
    input.seats = vec![flexible_seat("FL1", "Mon,Tue,Wed,Thu,Fri")];

    let adapter = run(input.clone()).expect("feasible");
    let grid = adapter.grid.expect("grid written");
    assert_invariants(&input, &grid);

    let alice_row = grid.iter().find(|r| r[0] == "Alice").unwrap();
    let assigned_days = alice_row[1..].iter().filter(|c| !c.is_empty()).count();
    assert_eq!(assigned_days, 10);
}

/// A quota the available seat-days structurally cannot satisfy is reported
/// as infeasible, not silently relaxed.
#[test]
fn unreachable_quota_is_infeasible() {
    let mut input = base_input();
    input.office_percentage = 1.0;
    input.employees = vec![employee("E1", "Alice", "x")];
    input.seats = vec![flexible_seat("FL1", "Tue")];

    match run(input) {
        Err(OrchestratorError::Roster(RosterError::Infeasible(_))) => {}
        other => panic!("expected Infeasible, got {other:?}"),
    }
}

/// On a special day, the bonus for the matching sub-team's employee
/// outweighs the flat fill bonus for anyone else, so capacity (one seat)
/// goes to the matching employee.
#[test]
fn special_day_bonus_wins_the_seat() {
    let mut input = base_input();
    input.office_percentage = 1.0 / 21.0;
    input.employees = vec![employee("E1", "Alice", "x"), employee("E2", "Bob", "y")];
    input.seats = vec![flexible_seat("S1", "Mon,Tue,Wed,Thu,Fri")];
    input.special_sub_team_days = vec![SpecialSubTeamDaysRow {
        day_descriptor: "1st Mon".to_string(),
        sub_team: "x".to_string(),
    }];

    let adapter = run(input.clone()).expect("feasible");
    let grid = adapter.grid.expect("grid written");
    assert_invariants(&input, &grid);

    let special_date = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
    let col = grid[0].iter().position(|c| c == &special_date.format("%Y-%m-%d").to_string()).unwrap();
    let alice_row = grid.iter().find(|r| r[0] == "Alice").unwrap();
    assert_eq!(alice_row[col], "S1");
}

/// A designated-day target that exceeds what the available seat-days can
/// supply is absorbed by the slack variable instead of making the whole
/// model infeasible.
#[test]
fn designated_day_shortfall_uses_slack() {
    let mut input = base_input();
    input.office_percentage = 5.0 / 21.0;
    input.employees = vec![employee("E1", "Alice", "x")];
    // Only the first Monday of March 2025 remains a working date for the
    // designated sub-team pattern; the other four Mondays are holidays.
    input.public_holidays = vec![
        HolidayRow { date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap() },
        HolidayRow { date: NaiveDate::from_ymd_opt(2025, 3, 17).unwrap() },
        HolidayRow { date: NaiveDate::from_ymd_opt(2025, 3, 24).unwrap() },
        HolidayRow { date: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap() },
    ];
    input.sub_team_office_days = vec![SubTeamOfficeDaysRow {
        sub_team: "x".to_string(),
        office_days: "Mon".to_string(),
    }];
    input.seats = vec![flexible_seat("FL1", "Mon,Tue,Wed,Thu,Fri")];

    let adapter = run(input.clone()).expect("feasible despite unreachable designated_min");
    let grid = adapter.grid.expect("grid written");
    assert_invariants(&input, &grid);
}

/// When two employees of the same sub-team could fill the same special-day
/// seat, the fairness bonus breaks the tie toward whoever hasn't already
/// been recorded against that descriptor.
#[test]
fn history_breaks_the_fairness_tie() {
    let mut input = base_input();
    input.office_percentage = 1.0 / 21.0;
    input.employees = vec![employee("E1", "Alice", "x"), employee("E2", "Bob", "x")];
    input.seats = vec![flexible_seat("S1", "Mon,Tue,Wed,Thu,Fri")];
    input.special_sub_team_days = vec![SpecialSubTeamDaysRow {
        day_descriptor: "1st Mon".to_string(),
        sub_team: "x".to_string(),
    }];
    input.special_history = vec![SpecialHistoryRow {
        descriptor: "1st Mon".to_string(),
        employee_id: "E1".to_string(),
        month_year: "Feb-25".to_string(),
    }];

    let adapter = run(input.clone()).expect("feasible");
    let grid = adapter.grid.expect("grid written");
    assert_invariants(&input, &grid);

    let special_date = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
    let col = grid[0].iter().position(|c| c == &special_date.format("%Y-%m-%d").to_string()).unwrap();
    let bob_row = grid.iter().find(|r| r[0] == "Bob").unwrap();
    assert_eq!(bob_row[col], "S1");
}

/// "1st Mon" resolves to the literal first Monday of the month this crate's
/// own calendar produces, exercised end to end rather than just in the
/// descriptor parser's isolated unit tests.
#[test]
fn first_monday_descriptor_matches_the_literal_calendar_date() {
    let dates = roster::calendar::working_dates(2025, 3, &HashSet::new());
    let first_monday = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
    assert!(roster::descriptor::resolve("1st Mon", first_monday, &dates));
    assert_eq!(dates.iter().filter(|d| roster::descriptor::resolve("1st Mon", **d, &dates)).count(), 1);
}

/// The special-day history this run produced is exactly what the adapter's
/// `append_history` received, nothing dropped, nothing invented.
#[test]
fn history_write_back_matches_special_assignments() {
    let mut input = base_input();
    input.office_percentage = 1.0 / 21.0;
    input.employees = vec![employee("E1", "Alice", "x")];
    input.seats = vec![flexible_seat("S1", "Mon,Tue,Wed,Thu,Fri")];
    input.special_sub_team_days = vec![SpecialSubTeamDaysRow {
        day_descriptor: "1st Mon".to_string(),
        sub_team: "x".to_string(),
    }];

    let adapter = run(input).expect("feasible");
    assert_eq!(adapter.history.len(), 1);
    assert_eq!(adapter.history[0].descriptor, "1st Mon");
    assert_eq!(adapter.history[0].employee_id, "E1");
    assert_eq!(adapter.history[0].month_year, "Mar-25");
}

/// The model and the backend are both deterministic: solving the same
/// input twice produces the same grid.
#[test]
fn same_input_solves_to_the_same_grid_twice() {
    let mut input = base_input();
    input.office_percentage = 10.0 / 21.0;
    input.employees = vec![employee("E1", "Alice", "x"), employee("E2", "Bob", "y")];
    input.seats = vec![flexible_seat("S1", "Mon,Tue,Wed,Thu,Fri"), flexible_seat("S2", "Mon,Tue,Wed,Thu,Fri")];

    let first = run(input.clone()).expect("feasible").grid.unwrap();
    let second = run(input).expect("feasible").grid.unwrap();
    assert_eq!(first, second);
}

/// Seat preferences are exercised as part of the broader weighted-objective
/// surface, not as a standalone hard constraint.
#[test]
fn seat_preference_is_honored_when_uncontended() {
    let mut input = base_input();
    input.office_percentage = 5.0 / 21.0;
    input.employees = vec![employee("E1", "Alice", "x")];
    input.seats = vec![flexible_seat("S1", "Mon,Tue,Wed,Thu,Fri"), flexible_seat("S2", "Mon,Tue,Wed,Thu,Fri")];
    input.seat_preferences = vec![SeatPreferenceRow {
        employee_id: "E1".to_string(),
        seat_code: "S1".to_string(),
    }];

    let adapter = run(input.clone()).expect("feasible");
    let grid = adapter.grid.expect("grid written");
    assert_invariants(&input, &grid);

    let alice_row = grid.iter().find(|r| r[0] == "Alice").unwrap();
    let assigned_seats: Vec<&String> = alice_row[1..].iter().filter(|c| !c.is_empty()).collect();
    assert!(assigned_seats.iter().all(|s| *s == "S1"));
}
