use std::borrow::Cow;

use bytes::Bytes;
use serde::Serialize;

use micro_fetch_http::protocol::EncodeError;

use crate::Value;
use crate::codec::Codec;

/// When a payload goes through the send codec.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SerializePolicy {
    /// Every payload except raw bytes is serialized.
    Always,
    /// Nothing is serialized; structured values are sent in their literal form.
    Never,
    /// Text passes through untouched, structured values are serialized.
    #[default]
    Smart,
}

/// The body of a request, before serialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Payload {
    #[default]
    Empty,
    /// Sent as-is under every policy.
    Raw(Bytes),
    Text(String),
    Structured(Value),
    /// `field → path` pairs for a multipart upload. The transport reads and
    /// encodes the files; the serialized body is empty.
    Files(Vec<(String, String)>),
}

impl Payload {
    /// A structured payload from any serializable value.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, EncodeError> {
        Value::from_serialize(value).map(Self::Structured)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Raw(bytes) => bytes.is_empty(),
            Self::Text(text) => text.is_empty(),
            Self::Structured(value) => value.is_null(),
            Self::Files(files) => files.is_empty(),
        }
    }

    pub fn files(&self) -> &[(String, String)] {
        match self {
            Self::Files(files) => files,
            _ => &[],
        }
    }

    /// Produces the body bytes.
    ///
    /// `codec` is the codec registered for the send type, if any. Without one
    /// a value is sent in its literal string form.
    pub(crate) fn serialize(&self, policy: SerializePolicy, codec: Option<&dyn Codec>) -> Result<Bytes, EncodeError> {
        let value = match (self, policy) {
            (Self::Empty | Self::Files(_), _) => return Ok(Bytes::new()),
            (Self::Raw(bytes), _) => return Ok(bytes.clone()),
            (Self::Text(text), SerializePolicy::Never | SerializePolicy::Smart) => {
                return Ok(Bytes::copy_from_slice(text.as_bytes()));
            }
            (Self::Structured(value), SerializePolicy::Never) => return Ok(Bytes::from(value.to_string())),
            (Self::Text(text), SerializePolicy::Always) => Cow::Owned(Value::Text(text.clone())),
            (Self::Structured(value), SerializePolicy::Always | SerializePolicy::Smart) => Cow::Borrowed(value),
        };

        match codec {
            Some(codec) => codec.serialize(&value),
            None => Ok(Bytes::from(value.to_string())),
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Bytes> for Payload {
    fn from(bytes: Bytes) -> Self {
        Self::Raw(bytes)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Raw(Bytes::from(bytes))
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

impl From<serde_json::Value> for Payload {
    fn from(json: serde_json::Value) -> Self {
        Self::Structured(Value::from(json))
    }
}

/// Width in bytes of the UTF-8 sequence starting with `lead`.
///
/// Continuation and invalid bytes count as 1.
pub fn utf8_len(lead: u8) -> usize {
    match lead {
        b if b & 0x80 == 0x00 => 1,
        b if b & 0xE0 == 0xC0 => 2,
        b if b & 0xF0 == 0xE0 => 3,
        b if b & 0xF8 == 0xF0 => 4,
        _ => 1,
    }
}

/// Length in bytes of `text`, walking one UTF-8 sequence at a time.
pub fn determine_length(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() {
        pos += utf8_len(bytes[pos]);
    }
    pos.min(bytes.len())
}
