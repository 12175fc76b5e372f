// Storage form of a report and the mapping to and from it

use crate::error::DecodeError;
use crate::models::{Report, Task};
use crate::temporal;
use serde::{Deserialize, Serialize};

/// Task as persisted: timestamps are ISO-8601 strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedTask {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problems: Option<String>,
}

/// Report as persisted in the store and written to the JSONL log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub date: String,
    pub first_name: String,
    pub last_name: String,
    pub arrival_time: Option<String>,
    pub departure_time: Option<String>,
    #[serde(default)]
    pub tasks: Vec<SerializedTask>,
    #[serde(default)]
    pub planned_tasks: String,
}

pub fn to_record(report: &Report) -> SerializedReport {
    SerializedReport {
        id: report.id,
        date: temporal::encode_required(report.date),
        first_name: report.first_name.clone(),
        last_name: report.last_name.clone(),
        arrival_time: temporal::encode(report.arrival_time),
        departure_time: temporal::encode(report.departure_time),
        tasks: report.tasks.iter().map(task_to_record).collect(),
        planned_tasks: report.planned_tasks.clone(),
    }
}

/// Rebuild a report from its stored form
///
/// The error names the field holding the malformed timestamp.
pub fn from_record(record: SerializedReport) -> Result<Report, DecodeError> {
    let date = temporal::decode_required(&record.date).map_err(|e| e.in_field("date"))?;
    let arrival_time =
        temporal::decode(record.arrival_time.as_deref()).map_err(|e| e.in_field("arrivalTime"))?;
    let departure_time =
        temporal::decode(record.departure_time.as_deref()).map_err(|e| e.in_field("departureTime"))?;

    let tasks = record
        .tasks
        .into_iter()
        .enumerate()
        .map(|(i, task)| task_from_record(i, task))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Report {
        id: record.id,
        date,
        first_name: record.first_name,
        last_name: record.last_name,
        arrival_time,
        departure_time,
        tasks,
        planned_tasks: record.planned_tasks,
    })
}

fn task_to_record(task: &Task) -> SerializedTask {
    SerializedTask {
        start_time: temporal::encode(task.start_time),
        end_time: temporal::encode(task.end_time),
        description: task.description.clone(),
        problems: task.problems.clone(),
    }
}

fn task_from_record(index: usize, task: SerializedTask) -> Result<Task, DecodeError> {
    Ok(Task {
        start_time: temporal::decode(task.start_time.as_deref())
            .map_err(|e| e.in_field(format!("tasks[{}].startTime", index)))?,
        end_time: temporal::decode(task.end_time.as_deref())
            .map_err(|e| e.in_field(format!("tasks[{}].endTime", index)))?,
        description: task.description,
        problems: task.problems,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::{at, sample_report};

    #[test]
    fn test_round_trip_sample() {
        let report = sample_report();
        assert_eq!(from_record(to_record(&report)).unwrap(), report);
    }

    #[test]
    fn test_round_trip_with_id_and_empty_optionals() {
        let mut report = sample_report();
        report.id = Some(42);
        report.arrival_time = None;
        report.departure_time = None;
        report.tasks = vec![Task::default(), Task::new(at(1, 13, 0), at(1, 14, 30), "Calls").with_problems("VPN down")];
        report.planned_tasks.clear();

        let record = to_record(&report);
        assert_eq!(record.arrival_time, None);
        assert_eq!(record.tasks[0].start_time, None);
        assert_eq!(from_record(record).unwrap(), report);
    }

    #[test]
    fn test_round_trip_empty_task_list() {
        let mut report = sample_report();
        report.tasks.clear();
        assert_eq!(from_record(to_record(&report)).unwrap(), report);
    }

    #[test]
    fn test_json_layout_uses_camel_case() {
        let mut report = sample_report();
        report.id = Some(7);
        let json = serde_json::to_value(to_record(&report)).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["firstName"], "Jean");
        assert_eq!(json["arrivalTime"], "2024-05-01T08:00:00Z");
        assert_eq!(json["plannedTasks"], "Review");
        assert_eq!(json["tasks"][0]["startTime"], "2024-05-01T09:00:00Z");
        assert!(json["tasks"][0].get("problems").is_none());
    }

    #[test]
    fn test_unsaved_record_omits_id() {
        let json = serde_json::to_value(to_record(&sample_report())).unwrap();
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_reads_browser_style_record() {
        let raw = r#"{"id":3,"date":"2024-05-01T00:00:00.000Z","firstName":"Jean","lastName":"Dupont",
            "arrivalTime":"2024-05-01T08:00:00.000Z","departureTime":null,
            "tasks":[{"startTime":"2024-05-01T09:00:00.000Z","endTime":null,"description":"Setup"}],
            "plannedTasks":"Review"}"#;
        let record: SerializedReport = serde_json::from_str(raw).unwrap();
        let report = from_record(record).unwrap();

        assert_eq!(report.id, Some(3));
        assert_eq!(report.arrival_time, Some(at(1, 8, 0)));
        assert_eq!(report.departure_time, None);
        assert_eq!(report.tasks[0].end_time, None);
        assert_eq!(report.tasks[0].problems, None);
    }

    #[test]
    fn test_malformed_arrival_names_field() {
        let mut record = to_record(&sample_report());
        record.arrival_time = Some("not-a-date".to_string());

        let err = from_record(record).unwrap_err();
        assert_eq!(err.field, "arrivalTime");
        assert_eq!(err.value, "not-a-date");
    }

    #[test]
    fn test_malformed_task_time_names_task() {
        let mut record = to_record(&sample_report());
        record.tasks[0].end_time = Some("9am".to_string());

        let err = from_record(record).unwrap_err();
        assert_eq!(err.field, "tasks[0].endTime");
    }
}
