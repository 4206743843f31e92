use serde_json::Value;

use crate::domain::error::PrepareError;
use crate::engine::scrub::scrub;
use crate::util::time::{NormalizeOptions, normalize_to_utc};

/// Normalize the date fields of a request body, then scrub it.
///
/// `date_fields` are dotted paths into nested objects (`identite.date_naissance`).
/// Missing paths, `null` and blank strings are skipped here and dropped by the
/// scrubber. The body is consumed, so a failure never leaves a half-normalized
/// payload behind.
pub fn prepare_payload(
    mut body: Value,
    date_fields: &[&str],
    options: NormalizeOptions,
) -> Result<Value, PrepareError> {
    for path in date_fields {
        normalize_field(&mut body, path, options)?;
    }
    Ok(scrub(body))
}

fn normalize_field(
    body: &mut Value,
    path: &str,
    options: NormalizeOptions,
) -> Result<(), PrepareError> {
    let Some(slot) = lookup_mut(body, path) else {
        return Ok(());
    };
    match slot {
        Value::Null => Ok(()),
        Value::String(text) if text.trim().is_empty() => Ok(()),
        Value::String(text) => {
            let normalized = normalize_to_utc(text.as_str(), options).map_err(|source| {
                PrepareError::Timestamp {
                    path: path.to_string(),
                    source,
                }
            })?;
            *text = normalized;
            Ok(())
        }
        _ => Err(PrepareError::NotAString {
            path: path.to_string(),
        }),
    }
}

fn lookup_mut<'v>(body: &'v mut Value, path: &str) -> Option<&'v mut Value> {
    path.split('.')
        .try_fold(body, |current, key| current.as_object_mut()?.get_mut(key))
}
