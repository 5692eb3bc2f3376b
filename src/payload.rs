//! The serialized shape shared by every message component.

use serde_json::{Map, Value};

/// A JSON object as sent to Slack
pub type Payload = Map<String, Value>;

/// Anything that can be turned into the JSON object Slack expects.
///
/// Implementors also implement [`serde::Serialize`] by delegating here, so
/// they can be handed straight to the transports.
pub trait ToPayload {
    /// Build the JSON object for this value
    fn to_payload(&self) -> Payload;
}

/// Merge `overlay` into `fixed` without clobbering.
///
/// Keys already present in `fixed` always keep their value; `overlay` only
/// contributes keys that `fixed` lacks.
///
/// ```
/// use serde_json::json;
/// use slack_messaging_rs::payload::{merge_absent, Payload};
///
/// let mut fixed = Payload::new();
/// fixed.insert("type".into(), json!("section"));
///
/// let mut overlay = Payload::new();
/// overlay.insert("type".into(), json!("override"));
/// overlay.insert("text".into(), json!("hi"));
///
/// let merged = merge_absent(fixed, &overlay);
/// assert_eq!(merged["type"], "section");
/// assert_eq!(merged["text"], "hi");
/// ```
pub fn merge_absent(mut fixed: Payload, overlay: &Payload) -> Payload {
    for (key, value) in overlay {
        if !fixed.contains_key(key) {
            fixed.insert(key.clone(), value.clone());
        }
    }

    fixed
}

/// Insert `value` under `key` only when it is present. Empty text counts as
/// absent.
pub(crate) fn insert_some<V: Into<Value>>(payload: &mut Payload, key: &str, value: Option<V>) {
    match value.map(Into::<Value>::into) {
        None => {}
        Some(Value::String(s)) if s.is_empty() => {}
        Some(value) => {
            payload.insert(key.to_string(), value);
        }
    }
}

/// Serialize a list of components into a JSON array, preserving order.
pub(crate) fn to_array<T: ToPayload>(items: &[T]) -> Value {
    Value::Array(
        items
            .iter()
            .map(|item| Value::Object(item.to_payload()))
            .collect(),
    )
}
