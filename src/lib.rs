// dailyreport - daily activity reports with a local SQLite+JSONL archive

pub mod config;
pub mod error;
pub mod export;
pub mod input;
pub mod jsonl;
pub mod models;
pub mod query;
pub mod record;
pub mod session;
pub mod store;
pub mod temporal;

// Re-export main types for convenience
pub use config::Config;
pub use error::{DecodeError, Error, StoreError, ValidationError};
pub use models::{Report, Task};
pub use query::filter_by_date;
pub use record::{SerializedReport, SerializedTask, from_record, to_record};
pub use session::Session;
pub use store::ReportStore;
