//! Property bags decoded from `JSON follows` payloads.
//!
//! Each entry of the payload's `data` array is a JSON object whose keys are the
//! backend's column names. Records are built from a bag with a fixed lookup table
//! of known keys; whatever the table does not claim ends up in the record's options.

use serde_json::Value;

/// A string-keyed map of raw values, as delivered by the backend.
pub type PropertyBag = serde_json::Map<String, Value>;

/// Assigns one known field of a record from its raw value.
pub type Setter<T> = fn(&mut T, &Value);

/// Apply `fields` to `target` in a single pass over `bag`.
///
/// Keys are matched case-exactly. Every key without an entry in `fields` is
/// returned in the overflow map, so the overflow never holds a known key.
pub fn apply_fields<T>(
    target: &mut T,
    bag: PropertyBag,
    fields: &[(&str, Setter<T>)],
) -> PropertyBag {
    let mut overflow = PropertyBag::new();

    for (key, value) in bag {
        match fields.iter().find(|(name, _)| *name == key) {
            Some((_, set)) => set(&mut *target, &value),
            None => {
                overflow.insert(key, value);
            }
        }
    }

    overflow
}

/// Read an integer from a JSON number or a numeric string.
#[must_use]
pub fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read a scalar as text. `null` is treated as absent.
#[must_use]
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}
