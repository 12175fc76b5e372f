// Report store using a JSONL log + SQLite cache

use crate::error::StoreError;
use crate::jsonl;
use crate::record::SerializedReport;
use eyre::{Context, Result, eyre};
use rusqlite::{Connection, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CURRENT_VERSION: u32 = 1;
const DB_FILE: &str = "reports.db";
const JSONL_FILE: &str = "reports.jsonl";
const LOG_NAME: &str = "reports";

/// Durable report archive: JSONL is the source of truth, SQLite the query cache
pub struct ReportStore {
    base_path: PathBuf,
    db: Connection,
}

impl ReportStore {
    /// Open or create a store in the given directory
    ///
    /// Safe to call any number of times on the same directory. If the JSONL
    /// log changed since the last sync, the cache is rebuilt from it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        Self::open_inner(path).map_err(|e| {
            warn!(path = ?path, error = %format!("{:#}", e), "Failed to open report store");
            StoreError::Open(e)
        })
    }

    fn open_inner(path: &Path) -> Result<Self> {
        let base_path = path.to_path_buf();

        // Create directory if it doesn't exist
        fs::create_dir_all(&base_path).context("Failed to create store directory")?;

        let db_path = base_path.join(DB_FILE);
        let db = Connection::open(&db_path).context("Failed to open SQLite database")?;

        let mut store = Self { base_path, db };

        store.create_schema()?;
        store.check_version()?;

        if store.is_stale_inner()? {
            info!("Database is stale, syncing from JSONL log");
            store.sync_inner()?;
        }

        debug!(path = ?store.base_path, "Report store opened");
        Ok(store)
    }

    /// Get the directory holding this store
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the JSONL log
    pub fn jsonl_path(&self) -> PathBuf {
        self.base_path.join(JSONL_FILE)
    }

    /// Get a reference to the SQLite database connection
    pub fn db(&self) -> &Connection {
        &self.db
    }

    fn create_schema(&self) -> Result<()> {
        debug!("Creating database schema");

        self.db
            .execute_batch(
                r#"
            CREATE TABLE IF NOT EXISTS reports (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                data_json TEXT NOT NULL
            );

            -- Sync metadata for staleness detection
            CREATE TABLE IF NOT EXISTS sync_metadata (
                log_name TEXT PRIMARY KEY,
                last_sync_time INTEGER NOT NULL,
                file_mtime INTEGER NOT NULL
            );
            "#,
            )
            .context("Failed to create schema")?;

        Ok(())
    }

    /// Write the version file, refusing stores from a newer layout
    fn check_version(&self) -> Result<()> {
        let version_path = self.base_path.join(".version");
        if !version_path.exists() {
            fs::write(version_path, CURRENT_VERSION.to_string())?;
            return Ok(());
        }

        let raw = fs::read_to_string(&version_path)?;
        let version: u32 = raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid store version: {:?}", raw.trim()))?;
        if version > CURRENT_VERSION {
            return Err(eyre!(
                "Store version {} is newer than supported version {}",
                version,
                CURRENT_VERSION
            ));
        }
        Ok(())
    }

    /// Check if the cache needs rebuilding from the JSONL log
    ///
    /// True when the log exists and was never synced, or was modified since.
    pub fn is_stale(&self) -> Result<bool, StoreError> {
        self.is_stale_inner().map_err(|e| {
            warn!(error = %format!("{:#}", e), "Failed to check store staleness");
            StoreError::Read(e)
        })
    }

    fn is_stale_inner(&self) -> Result<bool> {
        let jsonl_path = self.jsonl_path();
        if !jsonl_path.exists() {
            return Ok(false);
        }

        let file_mtime = file_mtime_ms(&jsonl_path)?;
        let stored_mtime: Option<i64> = self
            .db
            .query_row(
                "SELECT file_mtime FROM sync_metadata WHERE log_name = ?1",
                [LOG_NAME],
                |row| row.get(0),
            )
            .optional()?;

        Ok(match stored_mtime {
            None => true,                      // Never synced
            Some(mtime) => file_mtime > mtime, // File modified
        })
    }

    // ========================================================================
    // Gateway API
    // ========================================================================

    /// Persist one report and return its identity
    ///
    /// Without an id the store assigns the next one; ids are never reused.
    /// With an id, that id is kept and a collision is a write error. The log
    /// line stays pending under its lock until the SQLite commit succeeds and
    /// is truncated away otherwise, so a failed insert changes neither copy.
    pub fn insert(&mut self, record: &SerializedReport) -> Result<i64, StoreError> {
        self.insert_inner(record).map_err(|e| {
            warn!(id = ?record.id, error = %format!("{:#}", e), "Failed to save report");
            StoreError::Write(e)
        })
    }

    fn insert_inner(&mut self, record: &SerializedReport) -> Result<i64> {
        let mut stored = record.clone();
        stored.id = None;
        let data_json = serde_json::to_string(&stored).context("Failed to serialize record")?;

        let tx = self.db.transaction()?;

        tx.execute(
            "INSERT INTO reports (id, data_json) VALUES (?1, ?2)",
            rusqlite::params![record.id, data_json],
        )
        .context("Failed to insert report")?;
        let id = tx.last_insert_rowid();

        stored.id = Some(id);
        let jsonl_path = self.base_path.join(JSONL_FILE);
        let pending = jsonl::begin_append(&jsonl_path, &stored)?;

        // Our own append must not mark the cache stale
        tx.execute(
            "INSERT OR REPLACE INTO sync_metadata (log_name, last_sync_time, file_mtime)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![LOG_NAME, now_ms(), file_mtime_ms(&jsonl_path)?],
        )?;

        tx.commit().context("Failed to commit report")?;
        pending.commit();

        info!(id, date = %record.date, "Report saved");
        Ok(id)
    }

    /// Every stored report in identity order, each with its id set
    pub fn load_all(&self) -> Result<Vec<SerializedReport>, StoreError> {
        self.load_all_inner().map_err(|e| {
            warn!(error = %format!("{:#}", e), "Failed to load reports");
            StoreError::Read(e)
        })
    }

    fn load_all_inner(&self) -> Result<Vec<SerializedReport>> {
        let mut stmt = self.db.prepare("SELECT id, data_json FROM reports ORDER BY id")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?;

        let mut results = Vec::new();
        for row_result in rows {
            let (id, data_json) = row_result?;
            results.push(decode_row(id, &data_json)?);
        }

        debug!(count = results.len(), "Loaded reports");
        Ok(results)
    }

    /// Get a report by id
    pub fn get(&self, id: i64) -> Result<Option<SerializedReport>, StoreError> {
        self.get_inner(id).map_err(|e| {
            warn!(id, error = %format!("{:#}", e), "Failed to load report");
            StoreError::Read(e)
        })
    }

    fn get_inner(&self, id: i64) -> Result<Option<SerializedReport>> {
        let data_json: Option<String> = self
            .db
            .query_row("SELECT data_json FROM reports WHERE id = ?1", [id], |row| row.get(0))
            .optional()?;

        data_json.map(|json| decode_row(id, &json)).transpose()
    }

    /// Number of stored reports
    pub fn count(&self) -> Result<usize, StoreError> {
        self.db
            .query_row("SELECT COUNT(*) FROM reports", [], |row| row.get::<_, i64>(0))
            .map(|n| n as usize)
            .map_err(|e| StoreError::Read(e.into()))
    }

    // ========================================================================
    // Sync operations
    // ========================================================================

    /// Rebuild the SQLite cache from the JSONL log
    pub fn sync(&mut self) -> Result<usize, StoreError> {
        self.sync_inner().map_err(|e| {
            warn!(error = %format!("{:#}", e), "Failed to sync report store");
            StoreError::Write(e)
        })
    }

    fn sync_inner(&mut self) -> Result<usize> {
        info!("Syncing database from JSONL log");

        let jsonl_path = self.jsonl_path();
        let records = jsonl::read_jsonl_latest(&jsonl_path)?;

        let tx = self.db.transaction()?;
        tx.execute("DELETE FROM reports", [])?;

        for (id, record) in &records {
            let mut record = record.clone();
            record.id = None;
            let data_json = serde_json::to_string(&record)?;
            tx.execute(
                "INSERT INTO reports (id, data_json) VALUES (?1, ?2)",
                rusqlite::params![id, data_json],
            )?;
        }

        if jsonl_path.exists() {
            tx.execute(
                "INSERT OR REPLACE INTO sync_metadata (log_name, last_sync_time, file_mtime)
                 VALUES (?1, ?2, ?3)",
                rusqlite::params![LOG_NAME, now_ms(), file_mtime_ms(&jsonl_path)?],
            )?;
        }

        tx.commit()?;

        info!(count = records.len(), "Sync complete");
        Ok(records.len())
    }
}

fn decode_row(id: i64, data_json: &str) -> Result<SerializedReport> {
    let mut record: SerializedReport = serde_json::from_str(data_json)
        .with_context(|| format!("Failed to deserialize report {}", id))?;
    record.id = Some(id);
    Ok(record)
}

fn file_mtime_ms(path: &Path) -> Result<i64> {
    let modified = fs::metadata(path)?.modified()?;
    Ok(modified
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0))
}

fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
