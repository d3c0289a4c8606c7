// ── Status payload normalization ──
//
// The device has shipped several payload shapes over firmware revisions
// (fields at the top level, under `result`, status flags under `status`).
// Readers locate fields by name rather than by path so all of them keep
// working; these helpers are what every sensor and switch reading uses.

use serde_json::{Map, Value};

/// A normalized status document: the `result` object when the device wraps
/// its reading, otherwise the top-level object. Key order is preserved.
pub type Payload = Map<String, Value>;

/// Depth-first search for the first occurrence of `key`.
///
/// Each object's own entry wins before any of its children are searched;
/// children are visited in insertion order. Arrays are not descended into,
/// and `null` values count as absent so the search continues past them.
///
/// The lookup is not path-aware: if the device ever reuses a field name at
/// two depths, the shallower (or earlier) one is returned.
pub fn find_key<'a>(payload: &'a Payload, key: &str) -> Option<&'a Value> {
    if let Some(value) = payload.get(key).filter(|v| !v.is_null()) {
        return Some(value);
    }
    payload.values().find_map(|value| match value {
        Value::Object(child) => find_key(child, key),
        _ => None,
    })
}

/// Find `key`, optionally restricted to the first object named `scope`.
///
/// Status flags (`pump`, `light`, ...) live under a `status` object; scoping
/// keeps a same-named field elsewhere in the document from shadowing them.
pub fn lookup_scoped<'a>(payload: &'a Payload, scope: Option<&str>, key: &str) -> Option<&'a Value> {
    match scope {
        Some(scope) => match find_key(payload, scope)? {
            Value::Object(inner) => find_key(inner, key),
            _ => None,
        },
        None => find_key(payload, key),
    }
}

/// Interpret any JSON value as an on/off flag.
///
/// Booleans pass through, strings are truthy when they read `true`, `on`
/// or `1` (case-insensitive), numbers when nonzero. Everything else is off.
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("on") || s == "1"
        }
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    }
}
