// Error taxonomy for reports, the codec and the store

use thiserror::Error;

/// A required report field is missing or blank
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("first name is required")]
    MissingFirstName,
    #[error("last name is required")]
    MissingLastName,
    #[error("arrival time is required")]
    MissingArrivalTime,
    #[error("departure time is required")]
    MissingDepartureTime,
    #[error("task {task}: start time is required")]
    MissingTaskStart { task: usize },
    #[error("task {task}: end time is required")]
    MissingTaskEnd { task: usize },
    #[error("task {task}: description is required")]
    MissingTaskDescription { task: usize },
}

/// A stored temporal string could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid timestamp in {field}: {value:?}")]
pub struct DecodeError {
    /// Dotted path of the field that failed, e.g. `tasks[0].startTime`
    pub field: String,
    /// The raw text found in storage
    pub value: String,
}

impl DecodeError {
    pub(crate) fn in_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }
}

/// Failure at the store boundary
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open report store: {0:#}")]
    Open(eyre::Report),
    #[error("failed to save report: {0:#}")]
    Write(eyre::Report),
    #[error("failed to load reports: {0:#}")]
    Read(eyre::Report),
}

/// Anything a session operation can fail with
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
