use chrono::{DateTime, TimeZone};
use log::{debug, trace};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;

use crate::block::Block;
use crate::error::{Error, Result};
use crate::field::AttachmentField;
use crate::payload::{insert_some, merge_absent, to_array, Payload, ToPayload};

/// Separators accepted between words of an attribute key
static KEY_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-_\s]+").unwrap());

/// What a declaratively supplied attribute drives
#[derive(Clone, Copy)]
enum AttributeSetter {
    Text(fn(Attachment, String) -> Attachment),
    Ts,
    Fields,
    Blocks,
    Custom,
}

impl AttributeSetter {
    fn apply(self, attachment: Attachment, key: &str, value: Value) -> Result<Attachment> {
        match self {
            AttributeSetter::Text(set) => Ok(set(attachment, text(key, value)?)),
            AttributeSetter::Ts => Ok(attachment.ts(timestamp(value)?)),
            AttributeSetter::Fields => Ok(attachment.add_fields(list::<AttachmentField>(key, value)?)),
            AttributeSetter::Blocks => Ok(attachment.add_blocks(list::<Block>(key, value)?)),
            AttributeSetter::Custom => Ok(attachment.custom(object(key, value)?)),
        }
    }
}

/// Normalized attribute key to the setter it drives, built once.
static ATTRIBUTE_SETTERS: Lazy<HashMap<&'static str, AttributeSetter>> = Lazy::new(|| {
    use AttributeSetter::*;

    let setters: [(&'static str, AttributeSetter); 17] = [
        ("fallback", Text(|a: Attachment, v: String| a.fallback(v))),
        ("color", Text(|a: Attachment, v: String| a.color(v))),
        ("text", Text(|a: Attachment, v: String| a.text(v))),
        ("title", Text(|a: Attachment, v: String| a.title(v))),
        ("titlelink", Text(|a: Attachment, v: String| a.title_link(v))),
        ("pretext", Text(|a: Attachment, v: String| a.pretext(v))),
        ("authorname", Text(|a: Attachment, v: String| a.author_name(v))),
        ("authorlink", Text(|a: Attachment, v: String| a.author_link(v))),
        ("authoricon", Text(|a: Attachment, v: String| a.author_icon(v))),
        ("imageurl", Text(|a: Attachment, v: String| a.image_url(v))),
        ("thumburl", Text(|a: Attachment, v: String| a.thumb_url(v))),
        ("footer", Text(|a: Attachment, v: String| a.footer(v))),
        ("footericon", Text(|a: Attachment, v: String| a.footer_icon(v))),
        ("ts", Ts),
        ("fields", Fields),
        ("blocks", Blocks),
        ("custom", Custom),
    ];

    setters.into_iter().collect()
});

/// Reduce an attribute key to its lookup form: separators removed, lowercased.
///
/// ```
/// use slack_messaging_rs::attachment::normalize_key;
///
/// assert_eq!(normalize_key("author_name"), "authorname");
/// assert_eq!(normalize_key("Author-Name"), "authorname");
/// assert_eq!(normalize_key("author name"), "authorname");
/// assert_eq!(normalize_key("authorName"), "authorname");
/// ```
pub fn normalize_key(key: &str) -> String {
    KEY_SEPARATORS.replace_all(key, "").to_lowercase()
}

fn text(key: &str, value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(Error::validation(format!(
            "Attachment attribute '{}' must be text, got {}",
            key, other
        ))),
    }
}

fn timestamp(value: Value) -> Result<Timestamp> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(Timestamp::Epoch)
            .ok_or_else(|| {
                Error::validation(format!("Attachment attribute 'ts' must be an integer, got {}", n))
            }),
        Value::String(s) => Ok(Timestamp::Text(s)),
        other => Err(Error::validation(format!(
            "Attachment attribute 'ts' must be an integer or text, got {}",
            other
        ))),
    }
}

fn list<T: serde::de::DeserializeOwned>(key: &str, value: Value) -> Result<Vec<T>> {
    serde_json::from_value(value)
        .map_err(|e| Error::validation(format!("Attachment attribute '{}' is malformed: {}", key, e)))
}

fn object(key: &str, value: Value) -> Result<Payload> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(Error::validation(format!(
            "Attachment attribute '{}' must be an object, got {}",
            key, other
        ))),
    }
}

/// An attachment timestamp, sent as `ts`.
///
/// Date-times are reduced to epoch seconds as soon as they're converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timestamp {
    Epoch(i64),
    Text(String),
}

impl From<i64> for Timestamp {
    fn from(ts: i64) -> Self {
        Timestamp::Epoch(ts)
    }
}

impl From<&str> for Timestamp {
    fn from(ts: &str) -> Self {
        Timestamp::Text(ts.to_string())
    }
}

impl From<String> for Timestamp {
    fn from(ts: String) -> Self {
        Timestamp::Text(ts)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Timestamp {
    fn from(ts: DateTime<Tz>) -> Self {
        Timestamp::Epoch(ts.timestamp())
    }
}

impl From<Timestamp> for Value {
    fn from(ts: Timestamp) -> Self {
        match ts {
            Timestamp::Epoch(n) => Value::from(n),
            Timestamp::Text(s) => Value::String(s),
        }
    }
}

/// A legacy secondary attachment.
///
/// Every scalar is optional and left out of the payload until set; `fields`
/// and `blocks` are always sent, even when empty.
///
/// <https://api.slack.com/reference/messaging/attachments>
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attachment {
    fallback: Option<String>,
    color: Option<String>,
    text: Option<String>,
    title: Option<String>,
    title_link: Option<String>,
    pretext: Option<String>,
    author_name: Option<String>,
    author_link: Option<String>,
    author_icon: Option<String>,
    image_url: Option<String>,
    thumb_url: Option<String>,
    footer: Option<String>,
    footer_icon: Option<String>,
    ts: Option<Timestamp>,
    fields: Vec<AttachmentField>,
    blocks: Vec<Block>,
    custom: Payload,
}

impl Attachment {
    /// Create an empty attachment
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an attachment from loosely named attributes.
    ///
    /// Keys may be `snake_case`, `kebab-case`, space separated or camel case
    /// in any letter case. Unknown keys are ignored. `fields` and `blocks`
    /// append.
    ///
    /// ```
    /// use serde_json::json;
    /// use slack_messaging_rs::{Attachment, ToPayload};
    ///
    /// let attachment = Attachment::from_attributes([
    ///     ("author_name", json!("X")),
    ///     ("author-icon", json!("Y")),
    ///     ("unknownKey", json!("Z")),
    /// ])
    /// .unwrap();
    ///
    /// let payload = attachment.to_payload();
    /// assert_eq!(payload["author_name"], "X");
    /// assert_eq!(payload["author_icon"], "Y");
    /// assert!(!payload.contains_key("unknownKey"));
    /// ```
    pub fn from_attributes<I, K>(attributes: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        Self::new().with_attributes(attributes)
    }

    /// Apply loosely named attributes on top of the current state.
    pub fn with_attributes<I, K>(self, attributes: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        attributes
            .into_iter()
            .try_fold(self, |attachment, (key, value)| {
                let key = key.as_ref();

                match ATTRIBUTE_SETTERS.get(normalize_key(key).as_str()) {
                    Some(setter) => setter.apply(attachment, key, value),
                    None => {
                        debug!("Ignoring unknown attachment attribute: {}", key);
                        Ok(attachment)
                    }
                }
            })
    }

    pub fn fallback<S: Into<String>>(mut self, fallback: S) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    pub fn color<S: Into<String>>(mut self, color: S) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn title_link<S: Into<String>>(mut self, title_link: S) -> Self {
        self.title_link = Some(title_link.into());
        self
    }

    pub fn pretext<S: Into<String>>(mut self, pretext: S) -> Self {
        self.pretext = Some(pretext.into());
        self
    }

    pub fn author_name<S: Into<String>>(mut self, author_name: S) -> Self {
        self.author_name = Some(author_name.into());
        self
    }

    pub fn author_link<S: Into<String>>(mut self, author_link: S) -> Self {
        self.author_link = Some(author_link.into());
        self
    }

    pub fn author_icon<S: Into<String>>(mut self, author_icon: S) -> Self {
        self.author_icon = Some(author_icon.into());
        self
    }

    pub fn image_url<S: Into<String>>(mut self, image_url: S) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    pub fn thumb_url<S: Into<String>>(mut self, thumb_url: S) -> Self {
        self.thumb_url = Some(thumb_url.into());
        self
    }

    pub fn footer<S: Into<String>>(mut self, footer: S) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn footer_icon<S: Into<String>>(mut self, footer_icon: S) -> Self {
        self.footer_icon = Some(footer_icon.into());
        self
    }

    /// Set the timestamp from an epoch integer, epoch text or a date-time
    pub fn ts<T: Into<Timestamp>>(mut self, ts: T) -> Self {
        self.ts = Some(ts.into());
        self
    }

    pub fn add_field(mut self, field: AttachmentField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn add_fields<I: IntoIterator<Item = AttachmentField>>(mut self, fields: I) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn add_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn add_blocks<I: IntoIterator<Item = Block>>(mut self, blocks: I) -> Self {
        self.blocks.extend(blocks);
        self
    }

    /// Replace the custom data wholesale. Custom keys never override the
    /// attachment's own keys.
    pub fn custom(mut self, data: Payload) -> Self {
        self.custom = data;
        self
    }

    pub fn fields(&self) -> &[AttachmentField] {
        &self.fields
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }
}

impl ToPayload for Attachment {
    fn to_payload(&self) -> Payload {
        let mut fixed = Payload::new();

        let scalars = [
            ("fallback", &self.fallback),
            ("color", &self.color),
            ("text", &self.text),
            ("title", &self.title),
            ("title_link", &self.title_link),
            ("pretext", &self.pretext),
            ("author_name", &self.author_name),
            ("author_link", &self.author_link),
            ("author_icon", &self.author_icon),
            ("image_url", &self.image_url),
            ("thumb_url", &self.thumb_url),
            ("footer", &self.footer),
            ("footer_icon", &self.footer_icon),
        ];
        for (key, value) in scalars {
            insert_some(&mut fixed, key, value.clone());
        }
        insert_some(&mut fixed, "ts", self.ts.clone());

        fixed.insert("fields".into(), to_array(&self.fields));
        fixed.insert("blocks".into(), to_array(&self.blocks));

        let payload = merge_absent(fixed, &self.custom);
        trace!("Serialized attachment: {:?}", payload);
        payload
    }
}

impl Serialize for Attachment {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_payload().serialize(serializer)
    }
}
