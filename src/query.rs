// Calendar-day queries over loaded reports

use crate::models::Report;
use chrono::NaiveDate;

/// Keep the reports dated on `day`, in their original order
///
/// `None` selects everything. Only the calendar day of `Report::date` is
/// compared; time of day is ignored.
pub fn filter_by_date(reports: &[Report], day: Option<NaiveDate>) -> Vec<Report> {
    match day {
        None => reports.to_vec(),
        Some(day) => reports.iter().filter(|r| r.day() == day).cloned().collect(),
    }
}

/// Distinct report days, oldest first
pub fn dates(reports: &[Report]) -> Vec<NaiveDate> {
    let mut days: Vec<NaiveDate> = reports.iter().map(Report::day).collect();
    days.sort();
    days.dedup();
    days
}
