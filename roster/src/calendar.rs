//! C1: the ordered list of working dates for a (year, month), excluding
//! weekends and a supplied holiday set. Pure function, no state.

use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// All dates of `(year, month)` whose weekday is Mon..Fri and which are not
/// in `holidays`, in ascending order.
pub fn working_dates(year: i32, month: u32, holidays: &HashSet<NaiveDate>) -> Vec<NaiveDate> {
    let first = match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(d) => d,
        None => return Vec::new(),
    };
    let days_in_month = days_in_month(year, month);

    (0..days_in_month)
        .map(|offset| first + Duration::days(offset as i64))
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .filter(|d| !holidays.contains(d))
        .collect()
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .expect("valid (year, month) produces a valid next month");
    let this_month_first =
        NaiveDate::from_ymd_opt(year, month, 1).expect("validated by caller via from_ymd_opt");
    (next_month_first - this_month_first).num_days() as u32
}
