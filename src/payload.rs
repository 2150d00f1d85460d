//! Request bodies for the `chat`, `image` and `video` endpoints.
//!
//! A body is assembled from layers applied in a fixed order: required fields,
//! `model` (only when given), endpoint options, caller extras. A later layer
//! overwrites a key set by an earlier one; the key keeps the position where it
//! was first inserted. The serialized bytes are produced once and are exactly
//! what gets signed and sent.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

pub type JsonObject = Map<String, Value>;

/// One chat turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Message {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Message::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Message::new("assistant", content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Message::new("system", content)
    }
}

/// What `chat` accepts: a bare prompt or a full conversation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageInput {
    PlainText(String),
    Structured(Vec<Message>),
}

impl MessageInput {
    /// A plain prompt becomes a single `user` message; a conversation is
    /// passed through untouched.
    pub fn into_messages(self) -> Vec<Message> {
        match self {
            MessageInput::PlainText(text) => vec![Message::user(text)],
            MessageInput::Structured(messages) => messages,
        }
    }
}

impl From<&str> for MessageInput {
    fn from(text: &str) -> Self {
        MessageInput::PlainText(text.to_string())
    }
}

impl From<String> for MessageInput {
    fn from(text: String) -> Self {
        MessageInput::PlainText(text)
    }
}

impl From<Vec<Message>> for MessageInput {
    fn from(messages: Vec<Message>) -> Self {
        MessageInput::Structured(messages)
    }
}

impl From<&[Message]> for MessageInput {
    fn from(messages: &[Message]) -> Self {
        MessageInput::Structured(messages.to_vec())
    }
}

/// Optional `image` fields. Not validated locally; the API documents `>= 1`
/// for counts and dimensions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutputFormat {
    Mp4,
    Webm,
}

/// Where a guide image sits in the generated clip: a frame index or a
/// keyword such as `"first"` / `"last"`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FramePosition {
    Index(u64),
    Keyword(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameImage {
    pub input_image: String,
    pub frame: FramePosition,
}

/// Optional `video` fields. The prompt limit (1 to 32000 characters) is
/// enforced remotely.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Clip length in seconds, sent as a string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_finite"
    )]
    pub guidance_scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<OutputFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_quality: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_images: Option<Vec<FrameImage>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_images: Option<Vec<String>>,
}

// serde_json writes NaN and infinities as `null`; refuse them instead.
fn serialize_finite<S>(value: &Option<f64>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(v) if !v.is_finite() => Err(serde::ser::Error::custom(format!(
            "non-finite number {} cannot be encoded as JSON",
            v
        ))),
        _ => value.serialize(serializer),
    }
}

/// Serialized request body, ready to be signed and sent as is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payload {
    json: String,
}

impl Payload {
    pub fn as_str(&self) -> &str {
        &self.json
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.json.as_bytes()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.json.into_bytes()
    }
}

/// Layered body builder, see the module docs for the merge rule.
#[derive(Clone, Debug, Default)]
pub struct PayloadBuilder {
    layers: Vec<JsonObject>,
}

impl PayloadBuilder {
    pub fn new() -> Self {
        PayloadBuilder::default()
    }

    /// Adds a layer holding a single field.
    pub fn field<V: Serialize + ?Sized>(mut self, key: &str, value: &V) -> Result<Self> {
        let value = serde_json::to_value(value).map_err(Error::PayloadEncoding)?;
        let mut layer = JsonObject::new();
        layer.insert(key.to_string(), value);
        self.layers.push(layer);
        Ok(self)
    }

    /// Adds `model` only when one was given.
    pub fn model(self, model: Option<&str>) -> Result<Self> {
        match model {
            Some(model) => self.field("model", model),
            None => Ok(self),
        }
    }

    /// Adds every field of `source`, which must serialize to a JSON object
    /// (or `null`, which adds nothing).
    pub fn merge<T: Serialize + ?Sized>(mut self, source: &T) -> Result<Self> {
        match serde_json::to_value(source).map_err(Error::PayloadEncoding)? {
            Value::Object(layer) => self.layers.push(layer),
            Value::Null => {}
            other => {
                return Err(Error::PayloadEncoding(serde::ser::Error::custom(format!(
                    "payload source must be a JSON object, got {}",
                    other
                ))))
            }
        }
        Ok(self)
    }

    /// Folds the layers in order into one object.
    pub fn into_object(self) -> JsonObject {
        let mut fields = JsonObject::new();
        for layer in self.layers {
            for (key, value) in layer {
                fields.insert(key, value);
            }
        }
        fields
    }

    pub fn build(self) -> Result<Payload> {
        let json = serde_json::to_string(&self.into_object()).map_err(Error::PayloadEncoding)?;
        Ok(Payload { json })
    }
}

pub fn chat_payload(
    messages: MessageInput,
    model: Option<&str>,
    extra: &JsonObject,
) -> Result<Payload> {
    PayloadBuilder::new()
        .field("messages", &messages.into_messages())?
        .model(model)?
        .merge(extra)?
        .build()
}

pub fn image_payload(
    prompt: &str,
    model: Option<&str>,
    options: &ImageOptions,
    extra: &JsonObject,
) -> Result<Payload> {
    PayloadBuilder::new()
        .field("prompt", prompt)?
        .model(model)?
        .merge(options)?
        .merge(extra)?
        .build()
}

pub fn video_payload(
    prompt: &str,
    model: Option<&str>,
    options: &VideoOptions,
    extra: &JsonObject,
) -> Result<Payload> {
    PayloadBuilder::new()
        .field("prompt", prompt)?
        .model(model)?
        .merge(options)?
        .merge(extra)?
        .build()
}
