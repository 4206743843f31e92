use std::cell::RefCell;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use clinicq::api::{ApiClient, HttpMethod, HttpRequest, HttpResponse, Transport};
use clinicq::domain::error::{ApiError, TransportError};
use clinicq::domain::resource::{ListQuery, Resource};
use clinicq::util::time::{NormalizeOptions, Zone};
use serde_json::{Value, json};

/// In-memory backend keyed by collection path.
#[derive(Default)]
struct FakeBackend {
    store: RefCell<BTreeMap<String, Value>>,
    log: RefCell<Vec<HttpRequest>>,
}

impl FakeBackend {
    fn respond(status: u16, status_text: &str, body: String) -> HttpResponse {
        HttpResponse {
            status,
            status_text: status_text.to_string(),
            headers: BTreeMap::new(),
            body,
        }
    }
}

impl Transport for FakeBackend {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.log.borrow_mut().push(request.clone());
        let path = request
            .url
            .strip_prefix("http://clinic.test")
            .unwrap_or(request.url.as_str())
            .to_string();
        let mut store = self.store.borrow_mut();
        let response = match request.method {
            HttpMethod::Post => {
                let id = format!("id{}", store.len() + 1);
                let mut doc: Value =
                    serde_json::from_str(request.body.as_deref().unwrap_or("{}")).expect("body");
                doc["_id"] = Value::from(id.clone());
                store.insert(format!("{path}/{id}"), doc);
                Self::respond(201, "CREATED", json!({"_id": id}).to_string())
            }
            HttpMethod::Get if path.contains('?') => {
                let collection = path.split('?').next().unwrap_or_default().to_string();
                let rows: Vec<Value> = store
                    .iter()
                    .filter(|(key, _)| key.starts_with(&collection))
                    .map(|(_, doc)| doc.clone())
                    .collect();
                Self::respond(200, "OK", Value::Array(rows).to_string())
            }
            HttpMethod::Get => match store.get(&path) {
                Some(doc) => Self::respond(200, "OK", doc.to_string()),
                None => Self::respond(404, "NOT FOUND", r#"{"error":"not found"}"#.to_string()),
            },
            HttpMethod::Patch => Self::respond(204, "NO CONTENT", String::new()),
            HttpMethod::Delete => match store.remove(&path) {
                Some(_) => Self::respond(204, "NO CONTENT", String::new()),
                None => Self::respond(404, "NOT FOUND", r#"{"error":"not found"}"#.to_string()),
            },
        };
        Ok(response)
    }
}

fn client(backend: &FakeBackend) -> ApiClient<&FakeBackend> {
    ApiClient::new(
        backend,
        "http://clinic.test",
        NormalizeOptions::in_zone(Zone::utc()),
    )
}

#[test]
fn create_fetch_delete_round() {
    let backend = FakeBackend::default();
    let api = client(&backend);

    let stored = api
        .create_and_fetch(
            Resource::Payments,
            &json!({"patient_id": "p1", "amount": 0, "due_date": "2025-11-01", "paid_at": ""}),
        )
        .expect("create and fetch");
    assert_eq!(
        stored,
        json!({"patient_id": "p1", "amount": 0, "due_date": "2025-11-01T00:00:00Z", "_id": "id1"})
    );

    api.delete(Resource::Payments, "id1").expect("delete");
    let error = api.get(Resource::Payments, "id1").expect_err("gone");
    match error {
        ApiError::Transport(TransportError::Status { status, body, .. }) => {
            assert_eq!(status, 404);
            assert_eq!(body, r#"{"error":"not found"}"#);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn appointments_today_query_uses_utc_day_window() {
    let backend = FakeBackend::default();
    let api = client(&backend);
    api.create(
        Resource::Appointments,
        &json!({"patient_id": "p1", "doctor_id": "d1", "date_time": "2025-10-31T09:00"}),
    )
    .expect("create");

    let day = NaiveDate::from_ymd_opt(2025, 10, 31).expect("date");
    let rows = api.appointments_on(day).expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["date_time"], Value::from("2025-10-31T09:00:00Z"));

    let log = backend.log.borrow();
    assert_eq!(
        log[1].url,
        "http://clinic.test/api/appointments?date_from=2025-10-31T00%3A00%3A00Z&date_to=2025-10-31T23%3A59%3A59Z"
    );
}

#[test]
fn update_with_no_content_and_rejected_filter() {
    let backend = FakeBackend::default();
    let api = client(&backend);

    let updated = api
        .update(Resource::Patients, "p1", &json!({"contact": {"phone": "+221 77"}, "notes": ""}))
        .expect("update");
    assert_eq!(updated, None);
    assert_eq!(
        backend.log.borrow()[0].body.as_deref(),
        Some(r#"{"contact":{"phone":"+221 77"}}"#)
    );

    let error = api
        .list(Resource::Notifications, &ListQuery::new().with("specialite", "x"))
        .expect_err("unknown filter");
    assert!(matches!(error, ApiError::InvalidFilter { .. }));
    assert_eq!(backend.log.borrow().len(), 1);
}
