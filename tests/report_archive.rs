// End-to-end scenarios: session, store, serializer and query together

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use dailyreport::{
    Error, Report, ReportStore, Session, Task, ValidationError, export, filter_by_date, from_record, to_record,
};
use tempfile::TempDir;

fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, hour, minute, 0).unwrap()
}

fn ymd(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
}

fn jean_dupont() -> Report {
    let mut report = Report::new(ymd(1));
    report.first_name = "Jean".to_string();
    report.last_name = "Dupont".to_string();
    report.arrival_time = Some(at(1, 8, 0));
    report.departure_time = Some(at(1, 17, 0));
    report.tasks = vec![Task::new(at(1, 9, 0), at(1, 10, 0), "Setup")];
    report.planned_tasks = "Review".to_string();
    report
}

#[test]
fn test_save_and_reload_in_new_process() {
    let temp = TempDir::new().unwrap();
    let input = jean_dupont();

    let id = {
        let mut session = Session::new(ReportStore::open(temp.path()).unwrap(), ymd(1));
        session.replace_current(input.clone());
        session.save().unwrap()
    };

    let mut session = Session::new(ReportStore::open(temp.path()).unwrap(), ymd(2));
    assert_eq!(session.load().unwrap(), 1);

    let mut expected = input;
    expected.id = Some(id);
    assert_eq!(session.past(), &[expected]);
}

#[test]
fn test_identities_strictly_increase() {
    let temp = TempDir::new().unwrap();
    let mut store = ReportStore::open(temp.path()).unwrap();

    let mut last = 0;
    for _ in 0..5 {
        let id = store.insert(&to_record(&jean_dupont())).unwrap();
        assert!(id > last);
        last = id;
    }
}

#[test]
fn test_filter_by_date_without_match() {
    let temp = TempDir::new().unwrap();
    let mut session = Session::new(ReportStore::open(temp.path()).unwrap(), ymd(1));

    for day in [1, 2] {
        let mut report = jean_dupont();
        report.date = at(day, 0, 0);
        session.replace_current(report);
        session.save().unwrap();
    }

    assert!(filter_by_date(session.past(), Some(ymd(3))).is_empty());
    assert_eq!(filter_by_date(session.past(), None).len(), 2);
}

#[test]
fn test_unsubmittable_report_is_rejected_before_store() {
    let temp = TempDir::new().unwrap();
    let mut session = Session::new(ReportStore::open(temp.path()).unwrap(), ymd(1));

    let mut report = jean_dupont();
    report.tasks.push(Task::default());
    session.replace_current(report);

    let err = session.save().unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::MissingTaskStart { task: 2 })
    ));
    assert!(ReportStore::open(temp.path()).unwrap().load_all().unwrap().is_empty());
}

#[test]
fn test_malformed_stored_date_is_reported_not_loaded() {
    let temp = TempDir::new().unwrap();
    let mut store = ReportStore::open(temp.path()).unwrap();

    let mut bad = to_record(&jean_dupont());
    bad.arrival_time = Some("not-a-date".to_string());
    store.insert(&bad).unwrap();
    store.insert(&to_record(&jean_dupont())).unwrap();

    let raw = store.load_all().unwrap();
    let err = from_record(raw[0].clone()).unwrap_err();
    assert_eq!(err.field, "arrivalTime");

    let mut session = Session::new(store, ymd(1));
    assert_eq!(session.load().unwrap(), 1);
    assert_eq!(session.rejected().len(), 1);
}

#[test]
fn test_export_of_reloaded_report() {
    let temp = TempDir::new().unwrap();
    let mut session = Session::new(ReportStore::open(temp.path().join("store")).unwrap(), ymd(1));
    session.replace_current(jean_dupont());
    session.save().unwrap();

    let report = session.past()[0].clone();
    let path = export::write(&report, &temp.path().join("exports")).unwrap();

    assert!(path.ends_with("2024-05-01.txt"));
    let page = std::fs::read_to_string(path).unwrap();
    assert!(page.contains("Name: Jean Dupont"));
    assert!(page.contains("09:00-10:00 Setup"));
}
