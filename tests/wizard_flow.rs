//! End-to-end runs of both wizards against on-disk stores and sinks.

use chrono::NaiveDate;
use dealer_wizard::application::{FixedClock, NoticeLog, TelemetryEvent, TelemetryLog, Wizard};
use dealer_wizard::domain::{
    PRE_APPROVAL, SELL_MY_CAR, SubmissionError, WizardError, detail_lines, parse_notes,
};
use dealer_wizard::infrastructure::{CsvSink, FileStore, MemorySink, PersistenceStore};
use serde_json::json;
use tempfile::tempdir;

fn clock() -> FixedClock {
    FixedClock(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
}

/// Answers for every pre-approval step, in step order.
const PRE_APPROVAL_STEPS: &[&[(&str, &str)]] = &[
    &[("vehicleType", "sedan")],
    &[("budget", "$400 - $499 / Month")],
    &[("tradeIn", "No")],
    &[("creditRating", "good")],
    &[("employmentStatus", "Employed")],
    &[("incomeType", "I know my annual salary")],
    &[("annualIncome", "65000")],
    &[("employerName", "Northside Motors"), ("jobTitle", "Technician")],
    &[("address", "88 Queen St")],
    &[("yearsAtAddress", "0"), ("monthsAtAddress", "11")],
    &[("rentOrOwn", "own"), ("monthlyHousePayment", "1800")],
    &[("dob", "15031990")],
    &[
        ("firstName", "Sam"),
        ("lastName", "Rivera"),
        ("email", "sam@example.com"),
        ("phone", "416-555-0199"),
        ("sin", "123-456-789abc"),
    ],
];

fn complete_pre_approval(wizard: &mut Wizard) {
    for (index, answers) in PRE_APPROVAL_STEPS.iter().enumerate() {
        assert_eq!(wizard.current_step(), index + 1);
        for (name, value) in *answers {
            wizard.set_field(name, value).unwrap();
        }
        if !wizard.is_final_step() {
            wizard.go_next().unwrap();
        }
    }
}

#[test]
fn pre_approval_submits_grouped_notes() {
    let dir = tempdir().unwrap();
    let telemetry = TelemetryLog::new();
    let mut wizard = Wizard::new(&PRE_APPROVAL, Box::new(FileStore::new(dir.path().join("progress.json"))))
        .with_clock(clock())
        .with_telemetry(telemetry.clone());

    complete_pre_approval(&mut wizard);
    assert_eq!(wizard.fields().number("age"), Some(35));

    let mut sink = MemorySink::new();
    wizard.submit(&mut sink).unwrap();
    assert!(wizard.is_finished());

    let row = &sink.rows[0];
    assert_eq!(row.name, "Sam Rivera");
    assert_eq!(row.email, "sam@example.com");
    assert_eq!(row.status, "new");
    assert!(row.message.contains("Vehicle Type: sedan"));

    let notes = parse_notes(&row.notes).unwrap();
    assert_eq!(notes["dateOfBirth"], json!("15031990"));
    assert_eq!(notes["age"], json!(35));
    assert_eq!(notes["incomeDetails"]["type"], json!("I know my annual salary"));
    assert_eq!(notes["incomeDetails"]["annualIncome"], json!("65000"));
    assert_eq!(notes["timeAtAddress"], json!({ "years": "0", "months": "11" }));
    assert_eq!(notes["housing"]["rentOrOwn"], json!("own"));
    assert_eq!(notes["sin"], json!("123456789"));

    let events = telemetry.events();
    assert_eq!(events.first(), Some(&TelemetryEvent::FormStart { form: "pre_approval" }));
    assert_eq!(events.last(), Some(&TelemetryEvent::FormSubmit { form: "pre_approval" }));
}

#[test]
fn progress_survives_restart_through_file_store() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("progress.json");
    {
        let mut wizard = Wizard::new(&PRE_APPROVAL, Box::new(FileStore::new(&path))).with_clock(clock());
        for answers in &PRE_APPROVAL_STEPS[..4] {
            for (name, value) in *answers {
                wizard.set_field(name, value).unwrap();
            }
            wizard.go_next().unwrap();
        }
        assert_eq!(wizard.current_step(), 5);
    }

    let resumed = Wizard::new(&PRE_APPROVAL, Box::new(FileStore::new(&path))).with_clock(clock());
    assert_eq!(resumed.current_step(), 5);
    assert_eq!(resumed.fields().text("creditRating"), "good");
    assert_eq!(resumed.fields().text("employmentStatus"), "");
}

#[test]
fn failed_submission_keeps_progress_on_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("progress.json");
    let notices = NoticeLog::new();
    let mut wizard = Wizard::new(&PRE_APPROVAL, Box::new(FileStore::new(&path)))
        .with_clock(clock())
        .with_notifier(notices.clone());
    complete_pre_approval(&mut wizard);

    let mut sink = MemorySink::failing(SubmissionError::Rejected { status: 503, body: "down".into() });
    let err = wizard.submit(&mut sink).unwrap_err();
    assert!(matches!(err, WizardError::Submission(SubmissionError::Rejected { status: 503, .. })));
    assert_eq!(wizard.current_step(), 13);
    assert!(notices.latest().is_some());

    let store = FileStore::new(&path);
    assert!(store.get(PRE_APPROVAL.storage_key).unwrap().is_some());

    sink.fail_with = None;
    wizard.submit(&mut sink).unwrap();
    assert!(store.get(PRE_APPROVAL.storage_key).unwrap().is_none());
}

#[test]
fn sell_my_car_lands_in_csv_ledger() {
    let dir = tempdir().unwrap();
    let ledger = dir.path().join("leads.csv");
    let mut wizard = Wizard::new(&SELL_MY_CAR, Box::new(FileStore::new(dir.path().join("progress.json"))));

    wizard.set_field("year", "2019").unwrap();
    wizard.set_field("make", "Honda").unwrap();
    wizard.set_field("model", "Civic").unwrap();
    wizard.go_next().unwrap();

    wizard.set_field("odometer", "84,000 km").unwrap();
    wizard.set_field("transmission", "manual").unwrap();
    wizard.go_next().unwrap();

    // Unanswered condition questions block the step
    assert!(matches!(wizard.go_next(), Err(WizardError::Validation(_))));
    for flag in ["hasExteriorDamage", "hasInteriorDamage", "hasAccidents", "hasMechanicalIssues", "hasWarningLights"] {
        wizard.set_flag(flag, flag == "hasAccidents").unwrap();
    }
    wizard.set_field("numberOfKeys", "2").unwrap();
    wizard.go_next().unwrap();

    wizard.set_field("firstName", "Jordan").unwrap();
    wizard.set_field("lastName", "Lee").unwrap();
    wizard.go_next().unwrap();

    wizard.set_field("email", "jordan@example").unwrap();
    assert!(matches!(wizard.go_next(), Err(WizardError::Validation(_))));
    wizard.set_field("email", "jordan@example.com").unwrap();
    wizard.set_field("phone", "905-555-0142").unwrap();
    wizard.go_next().unwrap();
    assert!(wizard.is_final_step());

    // Edit shortcut back to the vehicle step and forward again
    wizard.go_to_step(1).unwrap();
    wizard.set_field("trim", "EX").unwrap();
    wizard.go_to_step(6).unwrap();

    let mut sink = CsvSink::new(&ledger);
    wizard.submit(&mut sink).unwrap();

    let rows = CsvSink::read_rows(&ledger).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Jordan Lee");
    assert!(rows[0].message.contains("Vehicle: 2019 Honda Civic EX"));
    assert!(rows[0].message.contains("VIN: Not provided"));

    let notes = parse_notes(&rows[0].notes).unwrap();
    assert_eq!(notes["submissionType"], json!("appraisal"));
    assert_eq!(notes["details"]["odometer"], json!("84000"));
    assert_eq!(notes["condition"]["hasAccidents"], json!(true));

    let lines = detail_lines(&notes);
    assert!(lines.contains(&("condition.hasAccidents".to_string(), "Yes".to_string())));
    assert!(lines.contains(&("condition.hasWarningLights".to_string(), "No".to_string())));
    assert!(lines.contains(&("vehicle.vin".to_string(), "-".to_string())));
}

#[test]
fn csv_ledger_appends_without_repeating_header() {
    let dir = tempdir().unwrap();
    let ledger = dir.path().join("leads.csv");
    let mut sink = CsvSink::new(&ledger);

    for name in ["Ada", "Grace"] {
        let mut wizard = Wizard::new(&PRE_APPROVAL, Box::new(FileStore::new(dir.path().join(format!("{name}.json")))))
            .with_clock(clock());
        complete_pre_approval(&mut wizard);
        wizard.set_field("firstName", name).unwrap();
        wizard.submit(&mut sink).unwrap();
    }

    let rows = CsvSink::read_rows(&ledger).unwrap();
    let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["Ada Rivera", "Grace Rivera"]);
}
