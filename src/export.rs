// Printable report document

use crate::models::{Report, Task};
use chrono::{DateTime, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use eyre::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Landscape page width in characters
const PAGE_WIDTH: u16 = 160;

/// Export file name, derived from the report's calendar day
pub fn file_name(report: &Report) -> String {
    format!("{}.txt", report.day().format("%Y-%m-%d"))
}

/// Render one report as a single landscape page
///
/// A header with the worker's name and the date, then one table row with
/// arrival, departure, performed tasks and next-day plans.
pub fn render(report: &Report) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .force_no_tty()
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(PAGE_WIDTH)
        .set_header(vec!["Arrival", "Departure", "Performed tasks", "Planned for next day"]);

    table.add_row(vec![
        clock(report.arrival_time),
        clock(report.departure_time),
        tasks_block(&report.tasks),
        report.planned_tasks.clone(),
    ]);

    format!(
        "Daily activity report\nName: {}\nDate: {}\n\n{}\n",
        report.full_name(),
        report.day().format("%Y-%m-%d"),
        table
    )
}

/// Validate the report and write its page into `dir`
pub fn write(report: &Report, dir: &Path) -> Result<PathBuf> {
    report.validate()?;

    fs::create_dir_all(dir).context("Failed to create export directory")?;
    let path = dir.join(file_name(report));
    fs::write(&path, render(report)).with_context(|| format!("Failed to write {}", path.display()))?;

    info!(path = ?path, id = ?report.id, "Report exported");
    Ok(path)
}

fn clock(value: Option<DateTime<Utc>>) -> String {
    value.map(|t| t.format("%H:%M").to_string()).unwrap_or_else(|| "--:--".to_string())
}

fn tasks_block(tasks: &[Task]) -> String {
    let mut lines = Vec::new();
    for task in tasks {
        lines.push(format!(
            "{}-{} {}",
            clock(task.start_time),
            clock(task.end_time),
            task.description.trim()
        ));
        if let Some(problems) = task.problems.as_deref().filter(|p| !p.trim().is_empty()) {
            lines.push(format!("  Problems: {}", problems.trim()));
        }
    }
    lines.join("\n")
}
