use serde_json::{Map, Value};

/// Recursively drop empty fields from a request payload.
///
/// Object entries whose value is `null`, a blank string, or a container that
/// scrubs down to nothing are removed; surviving keys keep their input order.
/// Array elements are only pruned when they are containers that end up empty,
/// scalar elements (blank strings and `null` included) are kept as they are.
/// Scalars passed at the top level come back unchanged.
pub fn scrub(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(scrub_object(map)),
        Value::Array(items) => Value::Array(scrub_array(items)),
        scalar => scalar,
    }
}

fn scrub_object(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .filter_map(|(key, child)| {
            let child = scrub(child);
            (!is_empty(&child)).then_some((key, child))
        })
        .collect()
}

fn scrub_array(items: Vec<Value>) -> Vec<Value> {
    items
        .into_iter()
        .filter_map(|item| match item {
            container @ (Value::Object(_) | Value::Array(_)) => {
                let scrubbed = scrub(container);
                (!is_empty(&scrubbed)).then_some(scrubbed)
            }
            scalar => Some(scalar),
        })
        .collect()
}

/// Emptiness as seen by the scrubber, checked on already-scrubbed values.
///
/// Numbers and booleans are never empty, `0` and `false` included.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
