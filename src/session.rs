// Editing session: the live report plus the past-reports cache

use crate::error::{DecodeError, Error, StoreError};
use crate::models::Report;
use crate::query;
use crate::record::{from_record, to_record};
use crate::store::ReportStore;
use chrono::NaiveDate;
use tracing::{debug, warn};

/// State behind the report form
///
/// Owns the report being edited and a read-through cache of stored reports.
/// Failed saves and loads leave every field as it was.
pub struct Session {
    store: ReportStore,
    current: Report,
    past: Vec<Report>,
    rejected: Vec<DecodeError>,
    selected_date: Option<NaiveDate>,
}

impl Session {
    /// Start a session with a blank report for `today`
    pub fn new(store: ReportStore, today: NaiveDate) -> Self {
        Self {
            store,
            current: Report::new(today),
            past: Vec::new(),
            rejected: Vec::new(),
            selected_date: None,
        }
    }

    pub fn store(&self) -> &ReportStore {
        &self.store
    }

    pub fn current(&self) -> &Report {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut Report {
        &mut self.current
    }

    /// Replace the live report, returning the previous one
    pub fn replace_current(&mut self, report: Report) -> Report {
        std::mem::replace(&mut self.current, report)
    }

    /// All reports from the last successful load
    pub fn past(&self) -> &[Report] {
        &self.past
    }

    /// Stored records that failed to decode on the last load
    pub fn rejected(&self) -> &[DecodeError] {
        &self.rejected
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_date
    }

    pub fn select_date(&mut self, day: Option<NaiveDate>) {
        self.selected_date = day;
    }

    /// Past reports matching the selected date
    pub fn visible(&self) -> Vec<Report> {
        query::filter_by_date(&self.past, self.selected_date)
    }

    /// Rebuild the past-reports cache from the store
    ///
    /// Records with malformed timestamps are skipped and kept in
    /// `rejected()`; the rest still load.
    pub fn load(&mut self) -> Result<usize, StoreError> {
        let records = self.store.load_all()?;

        let mut past = Vec::with_capacity(records.len());
        let mut rejected = Vec::new();
        for record in records {
            let id = record.id;
            match from_record(record) {
                Ok(report) => past.push(report),
                Err(e) => {
                    warn!(id = ?id, field = %e.field, value = %e.value, "Skipping report with invalid timestamp");
                    rejected.push(e);
                }
            }
        }

        debug!(loaded = past.len(), rejected = rejected.len(), "Past reports reloaded");
        self.past = past;
        self.rejected = rejected;
        Ok(self.past.len())
    }

    /// Validate and persist the live report, returning its new id
    ///
    /// On success the live report carries the assigned id and the cache is
    /// reloaded. Unsubmittable reports never reach the store.
    pub fn save(&mut self) -> Result<i64, Error> {
        self.current.validate()?;

        let record = to_record(&self.current);
        let id = self.store.insert(&record)?;
        self.current.id = Some(id);

        // The report is durable at this point; a failed refresh only leaves the cache behind
        if let Err(e) = self.load() {
            warn!(error = %e, "Saved report but failed to refresh past reports");
        }

        Ok(id)
    }
}
