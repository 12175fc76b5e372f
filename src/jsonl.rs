// JSONL log operations

use crate::record::SerializedReport;
use eyre::{Context, Result};
use fs2::FileExt;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A line written to the log but not yet committed
///
/// Holds the exclusive lock until it is committed or dropped. Dropping it
/// without `commit` truncates the log back to its length before the write,
/// so a failed save never leaves a full or partial line behind.
pub struct PendingAppend {
    file: File,
    path: PathBuf,
    prev_len: u64,
    committed: bool,
}

impl PendingAppend {
    /// Keep the line and release the lock
    pub fn commit(mut self) {
        self.committed = true;
    }

    /// Drop the line now, reporting any truncation failure
    pub fn rollback(mut self) -> Result<()> {
        self.committed = true;
        self.truncate()
    }

    fn truncate(&mut self) -> Result<()> {
        self.file
            .set_len(self.prev_len)
            .context("Failed to truncate JSONL file")?;
        self.file.sync_all()?;
        debug!(file = ?self.path, len = self.prev_len, "Rolled back JSONL append");
        Ok(())
    }
}

impl Drop for PendingAppend {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(e) = self.truncate() {
            warn!(file = ?self.path, error = %format!("{:#}", e), "Failed to roll back JSONL append");
        }
        // Lock is released when file is closed
    }
}

/// Write one record as a pending line under an exclusive lock
///
/// A failed write is already rolled back when this returns.
pub fn begin_append(path: &Path, record: &SerializedReport) -> Result<PendingAppend> {
    let json = serde_json::to_string(record).context("Failed to serialize record")?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .context("Failed to open JSONL file for appending")?;
    file.lock_exclusive().context("Failed to acquire file lock")?;

    let prev_len = file.metadata()?.len();
    let mut pending = PendingAppend {
        file,
        path: path.to_path_buf(),
        prev_len,
        committed: false,
    };

    writeln!(pending.file, "{}", json).context("Failed to write JSONL line")?;
    pending.file.sync_all()?;

    Ok(pending)
}

/// Append a record and commit it immediately
pub fn append_jsonl(path: &Path, record: &SerializedReport) -> Result<()> {
    begin_append(path, record)?.commit();
    Ok(())
}

/// Read all records from a JSONL file, keyed by id
///
/// The last line for an id wins. Unreadable lines and lines without an id
/// are skipped with a warning.
pub fn read_jsonl_latest(path: &Path) -> Result<BTreeMap<i64, SerializedReport>> {
    let mut records = BTreeMap::new();
    if !path.exists() {
        return Ok(records);
    }

    let reader = BufReader::new(File::open(path).context("Failed to open JSONL file")?);
    for (idx, line) in reader.lines().enumerate() {
        if let Some((id, record)) = parse_line(path, idx + 1, line).and_then(|r| r.id.map(|id| (id, r))) {
            records.insert(id, record);
        }
    }

    info!(file = ?path, count = records.len(), "Loaded latest records from JSONL");
    Ok(records)
}

fn parse_line(path: &Path, line_no: usize, line: std::io::Result<String>) -> Option<SerializedReport> {
    let line = line
        .map_err(|e| warn!(file = ?path, line = line_no, error = ?e, "Failed to read line, skipping"))
        .ok()?;
    if line.trim().is_empty() {
        return None;
    }

    let record: SerializedReport = serde_json::from_str(&line)
        .map_err(|e| warn!(file = ?path, line = line_no, error = ?e, "Failed to parse JSON, skipping"))
        .ok()?;
    if record.id.is_none() {
        warn!(file = ?path, line = line_no, "Record has no id, skipping");
    }
    Some(record)
}
