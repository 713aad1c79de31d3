//! The raw table schema, plus the normalizer that coerces raw cells into
//! canonical, indexed domain types. The model builder never re-scans the
//! raw tables; it only reads [`NormalizedInput`]'s indices.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::descriptor::{self, ParsedDescriptor};
use crate::error::{InputSchemaError, SemanticWarning};

// ---------------------------------------------------------------------
// Raw rows
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeRow {
    pub employee_id: String,
    pub employee_name: String,
    pub sub_team: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatRow {
    pub seat_code: String,
    pub seat_type: String,
    pub days: String,
    #[serde(default)]
    pub assigned_employee_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HolidayRow {
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubTeamOfficeDaysRow {
    pub sub_team: String,
    pub office_days: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialSubTeamDaysRow {
    pub day_descriptor: String,
    pub sub_team: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatPreferenceRow {
    pub employee_id: String,
    pub seat_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialHistoryRow {
    pub descriptor: String,
    pub employee_id: String,
    pub month_year: String,
}

/// The six tables plus two scalars the spreadsheet adapter is contracted to
/// deliver. `SpecialHistory` absent is represented as an empty `Vec`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterInput {
    pub office_percentage: f64,
    pub target_month_year: String,
    pub employees: Vec<EmployeeRow>,
    pub seats: Vec<SeatRow>,
    pub public_holidays: Vec<HolidayRow>,
    pub sub_team_office_days: Vec<SubTeamOfficeDaysRow>,
    pub special_sub_team_days: Vec<SpecialSubTeamDaysRow>,
    pub seat_preferences: Vec<SeatPreferenceRow>,
    #[serde(default)]
    pub special_history: Vec<SpecialHistoryRow>,
}

// ---------------------------------------------------------------------
// Canonical domain types
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatKind {
    Fixed,
    Flexible,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub sub_team: String,
}

#[derive(Debug, Clone)]
pub struct Seat {
    pub code: String,
    pub kind: SeatKind,
    pub available_days: HashSet<Weekday>,
    pub assigned_employee_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialDayRule {
    pub descriptor: String,
    pub sub_team: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub employee_id: String,
    pub seat_code: String,
    pub date: NaiveDate,
}

/// An append-only fairness log entry, consulted for the objective's
/// fairness bonus and written back by the result projector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialHistoryEntry {
    pub descriptor: String,
    pub employee_id: String,
    pub month_year: String,
}

/// Splits a comma-separated `Days`/`OfficeDays` cell into a weekday set.
/// Unrecognized tokens are silently dropped (mirrors the source's behavior
/// of only ever accumulating tokens it recognizes).
pub fn parse_days_string(days: &str) -> HashSet<Weekday> {
    days.split(',').filter_map(descriptor::parse_weekday_token).collect()
}

/// Parses a `Mmm-YY` / `Mmm-YYYY` target month/year into `(year, month)`.
pub fn parse_month_year(s: &str) -> Result<(i32, u32), InputSchemaError> {
    let (month_str, year_str) = s
        .split_once('-')
        .ok_or_else(|| InputSchemaError::UnparsableMonthYear(s.to_string()))?;

    const MONTHS: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    let month_lower = month_str.trim().to_lowercase();
    let month = MONTHS
        .iter()
        .position(|m| *m == month_lower.as_str())
        .map(|idx| idx as u32 + 1)
        .ok_or_else(|| InputSchemaError::UnparsableMonthYear(s.to_string()))?;

    let year_str = year_str.trim();
    let year: i32 = year_str
        .parse()
        .map_err(|_| InputSchemaError::UnparsableMonthYear(s.to_string()))?;
    let year = if year_str.len() == 2 { 2000 + year } else { year };

    Ok((year, month))
}

/// Normalization's output: canonical employees/seats in input order, plus
/// the indices (`emp_by_id`, `seats_by_code`, `designated_dates`, `special`,
/// `fixed_at`) the model builder consults instead of re-scanning raw tables.
pub struct NormalizedInput {
    pub employees: Vec<Employee>,
    pub seats: Vec<Seat>,
    pub working_dates: Vec<NaiveDate>,
    pub year: i32,
    pub month: u32,
    pub target_month_year: String,
    pub office_percentage: f64,
    pub required_days: u32,

    pub emp_by_id: HashMap<String, usize>,
    pub seats_by_code: HashMap<String, usize>,

    /// `employee_id -> designated dates for that employee's sub-team`.
    pub designated_dates: HashMap<String, BTreeSet<NaiveDate>>,
    /// `date -> the (at most one) special-day rule that resolves for it`.
    pub special: HashMap<NaiveDate, SpecialDayRule>,
    /// `(seat_code, date) -> the fixed assignee`, only for dates the seat is
    /// actually available on.
    pub fixed_at: HashMap<(String, NaiveDate), String>,
    pub fixed_employee_ids: HashSet<String>,
    /// `(employee_id, seat_code)` pairs with a standing preference.
    pub seat_preferences: HashSet<(String, String)>,
    /// `(descriptor, employee_id)` pairs already present in special-day history.
    pub history_pairs: HashSet<(String, String)>,
    /// Only the `(seat_code, date)` pairs the seat is actually available on
    /// (H6); absence means unavailable.
    pub seat_available: HashSet<(String, NaiveDate)>,
}

impl NormalizedInput {
    pub fn special_days_of_sub_team(&self, sub_team: &str) -> HashSet<NaiveDate> {
        self.special
            .iter()
            .filter(|(_, rule)| rule.sub_team == sub_team)
            .map(|(date, _)| *date)
            .collect()
    }
}

pub fn normalize(raw: &RosterInput) -> Result<(NormalizedInput, Vec<SemanticWarning>), InputSchemaError> {
    let mut warnings = Vec::new();

    if !(0.0..=1.0).contains(&raw.office_percentage) {
        return Err(InputSchemaError::OfficePercentageOutOfRange(raw.office_percentage));
    }
    let (year, month) = parse_month_year(&raw.target_month_year)?;

    let holidays: HashSet<NaiveDate> = raw.public_holidays.iter().map(|h| h.date).collect();
    let working_dates = calendar::working_dates(year, month, &holidays);
    let required_days = (working_dates.len() as f64 * raw.office_percentage).round() as u32;

    let employees: Vec<Employee> = raw
        .employees
        .iter()
        .map(|row| Employee {
            id: row.employee_id.clone(),
            name: row.employee_name.clone(),
            sub_team: normalize_token(&row.sub_team),
        })
        .collect();
    let emp_by_id: HashMap<String, usize> =
        employees.iter().enumerate().map(|(i, e)| (e.id.clone(), i)).collect();

    let mut seats = Vec::with_capacity(raw.seats.len());
    let mut seat_available: HashSet<(String, NaiveDate)> = HashSet::new();
    for row in &raw.seats {
        let kind = if normalize_token(&row.seat_type) == "fixed" {
            SeatKind::Fixed
        } else {
            SeatKind::Flexible
        };
        let available_days = parse_days_string(&row.days);
        if available_days.is_empty() {
            warnings.push(SemanticWarning::SeatWithNoAvailableDays {
                seat_code: row.seat_code.clone(),
            });
        }
        for d in &working_dates {
            if available_days.contains(&d.weekday()) {
                seat_available.insert((row.seat_code.clone(), *d));
            }
        }
        let assigned_employee_id = match kind {
            SeatKind::Fixed => row.assigned_employee_id.clone(),
            SeatKind::Flexible => None,
        };
        seats.push(Seat {
            code: row.seat_code.clone(),
            kind,
            available_days,
            assigned_employee_id,
        });
    }
    let seats_by_code: HashMap<String, usize> =
        seats.iter().enumerate().map(|(i, s)| (s.code.clone(), i)).collect();

    let mut fixed_at: HashMap<(String, NaiveDate), String> = HashMap::new();
    let mut fixed_employee_ids: HashSet<String> = HashSet::new();
    for seat in &seats {
        let (SeatKind::Fixed, Some(emp_id)) = (seat.kind, seat.assigned_employee_id.as_ref()) else {
            continue;
        };
        if !emp_by_id.contains_key(emp_id) {
            warnings.push(SemanticWarning::FixedSeatUnknownEmployee {
                seat_code: seat.code.clone(),
                employee_id: emp_id.clone(),
            });
            continue;
        }
        fixed_employee_ids.insert(emp_id.clone());
        for d in &working_dates {
            if seat_available.contains(&(seat.code.clone(), *d)) {
                fixed_at.insert((seat.code.clone(), *d), emp_id.clone());
            }
        }
    }

    let mut subteam_days_map: HashMap<String, HashSet<Weekday>> = HashMap::new();
    for row in &raw.sub_team_office_days {
        subteam_days_map
            .entry(normalize_token(&row.sub_team))
            .or_default()
            .extend(parse_days_string(&row.office_days));
    }

    let mut designated_dates: HashMap<String, BTreeSet<NaiveDate>> = HashMap::new();
    for employee in &employees {
        if let Some(days) = subteam_days_map.get(&employee.sub_team) {
            let dates: BTreeSet<NaiveDate> = working_dates
                .iter()
                .copied()
                .filter(|d| days.contains(&d.weekday()))
                .collect();
            if !dates.is_empty() {
                designated_dates.insert(employee.id.clone(), dates);
            }
        }
    }

    let special_sub_teams: HashSet<String> = raw
        .special_sub_team_days
        .iter()
        .map(|r| normalize_token(&r.sub_team))
        .collect();
    for employee in &employees {
        let known = subteam_days_map.contains_key(&employee.sub_team) || special_sub_teams.contains(&employee.sub_team);
        if !known {
            warnings.push(SemanticWarning::OrphanSubTeam {
                sub_team: employee.sub_team.clone(),
                employee_id: employee.id.clone(),
            });
        }
    }

    // First matching rule wins for a given date.
    let parsed_rules: Vec<(ParsedDescriptor, &SpecialSubTeamDaysRow)> = raw
        .special_sub_team_days
        .iter()
        .filter_map(|row| descriptor::parse_descriptor(&row.day_descriptor).map(|p| (p, row)))
        .collect();
    let mut special: HashMap<NaiveDate, SpecialDayRule> = HashMap::new();
    for date in &working_dates {
        for (parsed, row) in &parsed_rules {
            if descriptor::resolve_parsed(parsed, *date, &working_dates) {
                special.insert(
                    *date,
                    SpecialDayRule {
                        descriptor: row.day_descriptor.clone(),
                        sub_team: normalize_token(&row.sub_team),
                    },
                );
                break;
            }
        }
    }

    let seat_preferences: HashSet<(String, String)> = raw
        .seat_preferences
        .iter()
        .filter(|p| emp_by_id.contains_key(&p.employee_id) && seats_by_code.contains_key(&p.seat_code))
        .map(|p| (p.employee_id.clone(), p.seat_code.clone()))
        .collect();

    let history_pairs: HashSet<(String, String)> = raw
        .special_history
        .iter()
        .map(|h| (h.descriptor.clone(), h.employee_id.clone()))
        .collect();

    Ok((
        NormalizedInput {
            employees,
            seats,
            working_dates,
            year,
            month,
            target_month_year: raw.target_month_year.clone(),
            office_percentage: raw.office_percentage,
            required_days,
            emp_by_id,
            seats_by_code,
            designated_dates,
            special,
            fixed_at,
            fixed_employee_ids,
            seat_preferences,
            history_pairs,
            seat_available,
        },
        warnings,
    ))
}

fn normalize_token(s: &str) -> String {
    s.trim().to_lowercase()
}
