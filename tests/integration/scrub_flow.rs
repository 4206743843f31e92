use clinicq::engine::scrub::{is_empty, scrub};
use serde_json::{Value, json};

fn keys(value: &Value) -> Vec<&str> {
    value
        .as_object()
        .expect("object")
        .keys()
        .map(String::as_str)
        .collect()
}

#[test]
fn patient_form_drops_unfilled_sections() {
    let form = json!({
        "identite": {
            "prenom": "Awa",
            "nom": "Diallo",
            "date_naissance": "1990-04-12T00:00:00Z",
            "sexe": "F",
            "nin": ""
        },
        "contact": {"phone": "  ", "email": null},
        "adresse": {"ligne1": "", "ville": "", "pays": ""},
        "assurance": {"numero": ""},
        "allergies": [],
        "antecedents": ["asthme", ""],
        "consentements": {"sms": false}
    });

    let scrubbed = scrub(form);
    assert_eq!(
        scrubbed,
        json!({
            "identite": {
                "prenom": "Awa",
                "nom": "Diallo",
                "date_naissance": "1990-04-12T00:00:00Z",
                "sexe": "F"
            },
            "antecedents": ["asthme", ""],
            "consentements": {"sms": false}
        })
    );
    assert_eq!(keys(&scrubbed), vec!["identite", "antecedents", "consentements"]);
}

#[test]
fn zero_and_false_survive() {
    let scrubbed = scrub(json!({"amount": 0, "paid": false, "discount": 0.0}));
    assert_eq!(scrubbed, json!({"amount": 0, "paid": false, "discount": 0.0}));
}

#[test]
fn cascading_emptiness_collapses_to_empty_object() {
    let scrubbed = scrub(json!({"a": {"b": {"c": [{"d": null}]}}, "e": [[]]}));
    assert_eq!(scrubbed, json!({}));
    assert!(is_empty(&scrubbed));
}

#[test]
fn scrubbing_twice_changes_nothing() {
    let input = json!({
        "lines": [{"sku": "A", "qty": 1, "note": ""}, {}, {"sku": " "}],
        "meta": {"tags": ["", null, 3]}
    });
    let once = scrub(input);
    assert_eq!(scrub(once.clone()), once);
    assert_eq!(
        once,
        json!({"lines": [{"sku": "A", "qty": 1}], "meta": {"tags": ["", null, 3]}})
    );
}
