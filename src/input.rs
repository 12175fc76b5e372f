// Parsing of command-line report fields

use crate::models::Task;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use eyre::{Context, Result, eyre};

/// Combine a day and an `HH:MM` clock time into a UTC timestamp
pub fn parse_clock(day: NaiveDate, clock: &str) -> Result<DateTime<Utc>> {
    let time = NaiveTime::parse_from_str(clock.trim(), "%H:%M")
        .with_context(|| format!("Invalid time {:?} (expected HH:MM)", clock))?;
    Ok(day.and_time(time).and_utc())
}

/// Parse `HH:MM-HH:MM|description[|problems]` into a task on `day`
pub fn parse_task(day: NaiveDate, spec: &str) -> Result<Task> {
    let mut parts = spec.splitn(3, '|');
    let span = parts.next().unwrap_or_default();
    let description = parts
        .next()
        .ok_or_else(|| eyre!("Invalid task {:?} (expected HH:MM-HH:MM|description[|problems])", spec))?;
    let problems = parts.next().map(str::trim).filter(|p| !p.is_empty());

    let (start, end) = span
        .split_once('-')
        .ok_or_else(|| eyre!("Invalid task time span {:?} (expected HH:MM-HH:MM)", span))?;

    Ok(Task {
        start_time: Some(parse_clock(day, start)?),
        end_time: Some(parse_clock(day, end)?),
        description: description.trim().to_string(),
        problems: problems.map(str::to_string),
    })
}
