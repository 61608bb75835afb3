use bytes::Bytes;
use micro_fetch_http::protocol::{DecodeError, EncodeError};

use crate::Value;
use crate::codec::Codec;

const PARSE_ERROR: &str = "Unable to parse response as form";

/// `application/x-www-form-urlencoded` codec backed by `serde_urlencoded`.
///
/// Serializes `Form` pairs, and JSON objects whose values are all scalars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormCodec;

impl FormCodec {
    pub fn new() -> Self {
        Self
    }
}

fn object_pairs(object: &serde_json::Map<String, serde_json::Value>) -> Result<Vec<(String, String)>, EncodeError> {
    object
        .iter()
        .map(|(key, value)| {
            let value = match value {
                serde_json::Value::String(text) => text.clone(),
                serde_json::Value::Null => String::new(),
                serde_json::Value::Bool(_) | serde_json::Value::Number(_) => value.to_string(),
                serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                    return Err(EncodeError::serialize("form", format!("field {key:?} is not a scalar")));
                }
            };
            Ok((key.clone(), value))
        })
        .collect()
}

impl Codec for FormCodec {
    fn serialize(&self, value: &Value) -> Result<Bytes, EncodeError> {
        let encoded = match value {
            Value::Null => return Ok(Bytes::new()),
            Value::Form(pairs) => serde_urlencoded::to_string(pairs),
            Value::Json(serde_json::Value::Object(object)) => serde_urlencoded::to_string(object_pairs(object)?),
            other => return Err(EncodeError::unsupported_shape("form", other.shape())),
        };
        encoded.map(Bytes::from).map_err(|e| EncodeError::serialize("form", e))
    }

    fn parse(&self, body: &str) -> Result<Value, DecodeError> {
        if body.is_empty() {
            return Ok(Value::Null);
        }

        serde_urlencoded::from_str::<Vec<(String, String)>>(body.trim_end_matches(['\r', '\n']))
            .map(Value::Form)
            .map_err(|e| DecodeError::with_source(PARSE_ERROR, e))
    }
}
