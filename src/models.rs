// Data models for daily reports

use crate::error::ValidationError;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// One unit of work within a report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Task {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub description: String,
    pub problems: Option<String>,
}

impl Task {
    /// A fully specified task
    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>, description: impl Into<String>) -> Self {
        Self {
            start_time: Some(start_time),
            end_time: Some(end_time),
            description: description.into(),
            problems: None,
        }
    }

    pub fn with_problems(mut self, problems: impl Into<String>) -> Self {
        self.problems = Some(problems.into());
        self
    }
}

/// One daily submission authored by a worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Assigned by the store on first save
    pub id: Option<i64>,
    /// Only the calendar day is significant
    pub date: DateTime<Utc>,
    pub first_name: String,
    pub last_name: String,
    pub arrival_time: Option<DateTime<Utc>>,
    pub departure_time: Option<DateTime<Utc>>,
    /// Display and export follow insertion order
    pub tasks: Vec<Task>,
    pub planned_tasks: String,
}

impl Report {
    /// Start a blank report for the given day, with one empty task
    pub fn new(day: NaiveDate) -> Self {
        Self {
            id: None,
            date: day.and_time(NaiveTime::MIN).and_utc(),
            first_name: String::new(),
            last_name: String::new(),
            arrival_time: None,
            departure_time: None,
            tasks: vec![Task::default()],
            planned_tasks: String::new(),
        }
    }

    /// Calendar day of this report
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }

    /// Append an empty task and return its index
    pub fn add_task(&mut self) -> usize {
        self.tasks.push(Task::default());
        self.tasks.len() - 1
    }

    /// Remove the task at `index`; out-of-range indexes are ignored
    pub fn remove_task(&mut self, index: usize) -> Option<Task> {
        if index < self.tasks.len() {
            Some(self.tasks.remove(index))
        } else {
            None
        }
    }

    /// Check the report is complete enough to save and export
    ///
    /// Reports the first missing field; tasks are numbered from 1.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.first_name.trim().is_empty() {
            return Err(ValidationError::MissingFirstName);
        }
        if self.last_name.trim().is_empty() {
            return Err(ValidationError::MissingLastName);
        }
        if self.arrival_time.is_none() {
            return Err(ValidationError::MissingArrivalTime);
        }
        if self.departure_time.is_none() {
            return Err(ValidationError::MissingDepartureTime);
        }

        for (i, task) in self.tasks.iter().enumerate() {
            let task_no = i + 1;
            if task.start_time.is_none() {
                return Err(ValidationError::MissingTaskStart { task: task_no });
            }
            if task.end_time.is_none() {
                return Err(ValidationError::MissingTaskEnd { task: task_no });
            }
            if task.description.trim().is_empty() {
                return Err(ValidationError::MissingTaskDescription { task: task_no });
            }
        }

        Ok(())
    }

    pub fn is_submittable(&self) -> bool {
        self.validate().is_ok()
    }
}
