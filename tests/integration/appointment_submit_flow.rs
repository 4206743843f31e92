use chrono::FixedOffset;
use clinicq::domain::appointment::AppointmentForm;
use clinicq::domain::resource::Resource;
use clinicq::engine::prepare::prepare_payload;
use clinicq::engine::scrub::scrub;
use clinicq::util::time::{NormalizeOptions, Zone};
use serde_json::json;

fn plus_one() -> NormalizeOptions {
    NormalizeOptions::in_zone(Zone::Fixed(
        FixedOffset::east_opt(3600).expect("valid offset"),
    ))
}

#[test]
fn new_appointment_form_yields_exact_wire_body() {
    let form = AppointmentForm {
        patient_id: "p-17".to_string(),
        doctor_id: "d-4".to_string(),
        date_time: "2025-10-31T09:00".to_string(),
        reason: "Contrôle".to_string(),
        notes: "  ".to_string(),
    };
    let request = form.into_request(plus_one()).expect("valid form");
    let body = scrub(serde_json::to_value(&request).expect("serialize"));

    assert_eq!(
        serde_json::to_string(&body).expect("to string"),
        r#"{"patient_id":"p-17","doctor_id":"d-4","date_time":"2025-10-31T08:00:00Z","reason":"Contrôle"}"#
    );
}

#[test]
fn raw_body_goes_through_the_same_pipeline() {
    let raw = json!({
        "patient_id": "p-17",
        "doctor_id": "d-4",
        "date_time": "2025-10-31T09:00",
        "reason": "Contrôle",
        "notes": ""
    });
    let prepared =
        prepare_payload(raw, Resource::Appointments.date_fields(), plus_one()).expect("prepare");
    assert_eq!(
        prepared,
        json!({
            "patient_id": "p-17",
            "doctor_id": "d-4",
            "date_time": "2025-10-31T08:00:00Z",
            "reason": "Contrôle"
        })
    );
}

#[test]
fn nested_patient_birth_date_is_normalized() {
    let raw = json!({
        "identite": {"nom": "Diallo", "date_naissance": "1990-04-12"},
        "contact": {"email": ""}
    });
    let prepared = prepare_payload(
        raw,
        Resource::Patients.date_fields(),
        NormalizeOptions::in_zone(Zone::utc()),
    )
    .expect("prepare");
    assert_eq!(
        prepared,
        json!({"identite": {"nom": "Diallo", "date_naissance": "1990-04-12T00:00:00Z"}})
    );
}
