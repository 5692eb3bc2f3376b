use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::payload::{Payload, ToPayload};

/// A title/value pair rendered in a table inside an [`Attachment`](crate::Attachment).
///
/// <https://api.slack.com/reference/messaging/attachments#field_objects>
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttachmentField {
    title: String,
    value: String,
    /// Whether the field is narrow enough to sit beside another one
    #[serde(default)]
    short: bool,
}

impl AttachmentField {
    /// Create a field laid out at full width
    pub fn new<T: Into<String>, V: Into<String>>(title: T, value: V) -> Self {
        Self::with_short(title, value, false)
    }

    /// Create a field with an explicit `short` layout hint
    pub fn with_short<T: Into<String>, V: Into<String>>(title: T, value: V, short: bool) -> Self {
        AttachmentField {
            title: title.into(),
            value: value.into(),
            short,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_short(&self) -> bool {
        self.short
    }
}

impl ToPayload for AttachmentField {
    fn to_payload(&self) -> Payload {
        let mut payload = Payload::new();
        payload.insert("title".into(), Value::String(self.title.clone()));
        payload.insert("value".into(), Value::String(self.value.clone()));
        payload.insert("short".into(), Value::Bool(self.short));
        payload
    }
}

impl Serialize for AttachmentField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_payload().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_always_has_three_keys() {
        let field = AttachmentField::new("a", "b");
        assert_eq!(
            Value::Object(field.to_payload()),
            json!({"title": "a", "value": "b", "short": false})
        );

        let empty = AttachmentField::with_short("Status", "", true);
        assert_eq!(
            Value::Object(empty.to_payload()),
            json!({"title": "Status", "value": "", "short": true})
        );
    }

    #[test]
    fn test_field_deserializes_with_default_short() {
        let field: AttachmentField =
            serde_json::from_value(json!({"title": "Env", "value": "prod"})).unwrap();
        assert_eq!(field, AttachmentField::new("Env", "prod"));

        assert!(serde_json::from_value::<AttachmentField>(json!({"title": "Env"})).is_err());
    }
}
