//! The outgoing message, root of the payload tree.

use log::trace;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::{fmt, str::FromStr};

use crate::attachment::Attachment;
use crate::block::Block;
use crate::error::{Error, Result};
use crate::payload::{insert_some, merge_absent, to_array, Payload, ToPayload};

/// Icon used when none is given
pub const DEFAULT_ICON: &str = ":robot_face:";

/// Which of Slack's two mutually exclusive icon keys a message uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IconType {
    /// An emoji shortcode such as `:ghost:`, sent as `icon_emoji`
    #[default]
    Emoji,
    /// An image URL, sent as `icon_url`
    Url,
}

impl IconType {
    /// The payload key this icon type is sent under
    pub fn key(&self) -> &'static str {
        match self {
            IconType::Emoji => "icon_emoji",
            IconType::Url => "icon_url",
        }
    }
}

impl fmt::Display for IconType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Parse the payload key form, rejecting anything else.
///
/// ```
/// use slack_messaging_rs::IconType;
///
/// assert_eq!("icon_url".parse::<IconType>().unwrap(), IconType::Url);
/// assert!("icon_gif".parse::<IconType>().is_err());
/// ```
impl FromStr for IconType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "icon_emoji" => Ok(IconType::Emoji),
            "icon_url" => Ok(IconType::Url),
            other => Err(Error::configuration(format!(
                "Icon type must be icon_emoji or icon_url, got '{}'",
                other
            ))),
        }
    }
}

/// A message addressed to a channel.
///
/// Building a message never talks to Slack; hand it to a
/// [`WebhookClient`](crate::WebhookClient) or [`SlackClient`](crate::SlackClient)
/// to deliver it.
///
/// ```
/// use slack_messaging_rs::{Attachment, Message, ToPayload};
///
/// let message = Message::new("#deploys")
///     .text("Deployed *v1.2.0*")
///     .from("release-bot")
///     .attach(Attachment::new().color("good").text("All checks passed"));
///
/// let payload = message.to_payload();
/// assert_eq!(payload["channel"], "#deploys");
/// assert_eq!(payload["icon_emoji"], ":robot_face:");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    text: Option<String>,
    channel: String,
    username: Option<String>,
    icon: String,
    icon_type: IconType,
    attachments: Vec<Attachment>,
    blocks: Vec<Block>,
    custom: Payload,
}

impl Message {
    /// Create a message for a channel name or ID
    pub fn new<S: Into<String>>(to: S) -> Self {
        Message {
            text: None,
            channel: to.into(),
            username: None,
            icon: DEFAULT_ICON.to_string(),
            icon_type: IconType::default(),
            attachments: Vec::new(),
            blocks: Vec::new(),
            custom: Payload::new(),
        }
    }

    pub fn text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Re-address the message
    pub fn to<S: Into<String>>(mut self, channel: S) -> Self {
        self.channel = channel.into();
        self
    }

    /// Set the display name the message is posted under
    pub fn from<S: Into<String>>(mut self, username: S) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set an emoji icon
    pub fn icon<S: Into<String>>(self, icon: S) -> Self {
        self.icon_as(icon, IconType::Emoji)
    }

    /// Set an image icon
    pub fn icon_url<S: Into<String>>(self, icon: S) -> Self {
        self.icon_as(icon, IconType::Url)
    }

    /// Set the icon together with its type
    pub fn icon_as<S: Into<String>>(mut self, icon: S, icon_type: IconType) -> Self {
        self.icon = icon.into();
        self.icon_type = icon_type;
        self
    }

    /// Set the icon with a type given in its payload key form,
    /// `icon_emoji` or `icon_url`.
    pub fn icon_with_type<S: Into<String>>(self, icon: S, icon_type: &str) -> Result<Self> {
        let icon_type = icon_type.parse()?;
        Ok(self.icon_as(icon, icon_type))
    }

    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn attach_multiple<I: IntoIterator<Item = Attachment>>(mut self, attachments: I) -> Self {
        self.attachments.extend(attachments);
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
    /// message's own keys.
    pub fn custom(mut self, data: Payload) -> Self {
        self.custom = data;
        self
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn icon_type(&self) -> IconType {
        self.icon_type
    }

    /// Require some visible content: text, an attachment or a block.
    ///
    /// Serialization doesn't enforce this, since Slack accepts a bare
    /// channel post from some integrations.
    pub fn validate(&self) -> Result<()> {
        let no_text = self.text.as_deref().map_or(true, str::is_empty);
        if no_text && self.attachments.is_empty() && self.blocks.is_empty() {
            return Err(Error::MissingContent);
        }

        Ok(())
    }
}

impl ToPayload for Message {
    fn to_payload(&self) -> Payload {
        let mut fixed = Payload::new();

        insert_some(&mut fixed, "text", self.text.clone());
        fixed.insert("channel".into(), Value::String(self.channel.clone()));
        insert_some(&mut fixed, "username", self.username.clone());
        fixed.insert(self.icon_type.key().into(), Value::String(self.icon.clone()));
        fixed.insert("attachments".into(), to_array(&self.attachments));
        fixed.insert("blocks".into(), to_array(&self.blocks));

        // Only one icon key may ever be sent.
        let mut custom = self.custom.clone();
        for icon_type in [IconType::Emoji, IconType::Url] {
            custom.remove(icon_type.key());
        }

        let payload = merge_absent(fixed, &custom);
        trace!("Serialized message: {:?}", payload);
        payload
    }
}

impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_payload().serialize(serializer)
    }
}
