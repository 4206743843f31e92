use predicates::prelude::predicate;
use serde_json::Value;

#[test]
fn prepare_normalizes_dates_then_scrubs() {
    assert_cmd::cargo::cargo_bin_cmd!("clinicq")
        .args([
            "prepare",
            "--resource",
            "appointments",
            "--offset",
            "+01:00",
            "--from",
            "json",
        ])
        .write_stdin(
            r#"{"patient_id":"p-17","doctor_id":"d-4","date_time":"2025-10-31T09:00","reason":"Contrôle","notes":""}"#,
        )
        .assert()
        .code(0)
        .stdout(predicate::str::diff(
            "{\"patient_id\":\"p-17\",\"doctor_id\":\"d-4\",\"date_time\":\"2025-10-31T08:00:00Z\",\"reason\":\"Contrôle\"}\n",
        ));
}

#[test]
fn prepare_reports_failing_document_index() {
    let output = assert_cmd::cargo::cargo_bin_cmd!("clinicq")
        .args([
            "prepare",
            "--resource",
            "payments",
            "--offset",
            "UTC",
            "--from",
            "jsonl",
        ])
        .write_stdin("{\"due_date\":\"2025-11-01\"}\n{\"due_date\":\"soon\"}\n")
        .output()
        .expect("run prepare");

    assert_eq!(output.status.code(), Some(3));
    assert!(output.stdout.is_empty());
    let stderr_json: Value = serde_json::from_slice(&output.stderr).expect("stderr json");
    assert_eq!(stderr_json["details"]["index"], Value::from(1));
    assert_eq!(stderr_json["details"]["resource"], Value::from("payments"));
}

#[test]
fn prepare_rejects_unknown_resource() {
    assert_cmd::cargo::cargo_bin_cmd!("clinicq")
        .args(["prepare", "--resource", "invoices"])
        .write_stdin("{}")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("input_usage_error"));
}
