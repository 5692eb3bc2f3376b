use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Value};

use crate::payload::{merge_absent, Payload, ToPayload};

/// A Block Kit layout block: a `type` tag plus whatever keys that type takes.
///
/// The block is deliberately open-ended; only `type` is fixed, everything else
/// lives in the custom data and is merged in underneath it.
///
/// <https://api.slack.com/reference/block-kit/blocks>
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Payload")]
pub struct Block {
    block_type: String,
    custom: Payload,
}

impl Block {
    /// Create a block of the given type with no extra data
    pub fn new<S: Into<String>>(block_type: S) -> Self {
        Self::with_custom(block_type, Payload::new())
    }

    /// Create a block of the given type with extra data
    pub fn with_custom<S: Into<String>>(block_type: S, custom: Payload) -> Self {
        Block {
            block_type: block_type.into(),
            custom,
        }
    }

    /// A `header` block with plain text
    pub fn header<S: Into<String>>(text: S) -> Self {
        Self::new("header").with_text("plain_text", text.into())
    }

    /// A `section` block with mrkdwn text
    pub fn section<S: Into<String>>(text: S) -> Self {
        Self::new("section").with_text("mrkdwn", text.into())
    }

    /// A `divider` block
    pub fn divider() -> Self {
        Self::new("divider")
    }

    /// Replace the custom data wholesale
    pub fn custom(mut self, data: Payload) -> Self {
        self.custom = data;
        self
    }

    pub fn block_type(&self) -> &str {
        &self.block_type
    }

    pub fn custom_data(&self) -> &Payload {
        &self.custom
    }

    fn with_text(mut self, text_type: &str, text: String) -> Self {
        self.custom
            .insert("text".into(), json!({"type": text_type, "text": text}));
        self
    }
}

impl ToPayload for Block {
    fn to_payload(&self) -> Payload {
        let mut fixed = Payload::new();
        fixed.insert("type".into(), Value::String(self.block_type.clone()));
        merge_absent(fixed, &self.custom)
    }
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_payload().serialize(serializer)
    }
}

/// Read a block back from its serialized form, splitting off `type`.
impl TryFrom<Payload> for Block {
    type Error = String;

    fn try_from(mut payload: Payload) -> Result<Self, Self::Error> {
        match payload.remove("type") {
            Some(Value::String(block_type)) => Ok(Block::with_custom(block_type, payload)),
            Some(other) => Err(format!("block type must be a string, got {}", other)),
            None => Err("block is missing a type".to_string()),
        }
    }
}
