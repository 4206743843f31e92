use std::fs;

use predicates::prelude::predicate;
use tempfile::tempdir;

#[test]
fn scrub_runs_from_stdin_to_stdout() {
    assert_cmd::cargo::cargo_bin_cmd!("clinicq")
        .args(["scrub", "--from", "json"])
        .write_stdin(r#"{"nom":"Diallo","email":"","tags":[],"adresse":{"ville":" "},"age":0}"#)
        .assert()
        .code(0)
        .stdout(predicate::str::diff("{\"nom\":\"Diallo\",\"age\":0}\n"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn scrub_reads_yaml_file_by_extension() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("patient.yaml");
    fs::write(&input, "nom: Diallo\nnin: ''\nallergies: []\n").expect("write input");

    assert_cmd::cargo::cargo_bin_cmd!("clinicq")
        .arg("scrub")
        .arg("--input")
        .arg(&input)
        .assert()
        .code(0)
        .stdout(predicate::str::diff("{\"nom\":\"Diallo\"}\n"));
}

#[test]
fn scrub_jsonl_keeps_one_line_per_document() {
    assert_cmd::cargo::cargo_bin_cmd!("clinicq")
        .args(["scrub", "--from", "jsonl", "--to", "jsonl"])
        .write_stdin("{\"a\":1,\"b\":null}\n\n{\"c\":\"\"}\n")
        .assert()
        .code(0)
        .stdout(predicate::str::diff("{\"a\":1}\n{}\n"));
}

#[test]
fn scrub_invalid_json_is_usage_error() {
    assert_cmd::cargo::cargo_bin_cmd!("clinicq")
        .args(["scrub", "--from", "json"])
        .write_stdin("{not json")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("input_usage_error"));
}
