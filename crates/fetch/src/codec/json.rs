use bytes::Bytes;
use micro_fetch_http::protocol::{DecodeError, EncodeError};

use crate::Value;
use crate::codec::Codec;

const PARSE_ERROR: &str = "Unable to parse response as JSON";

/// `application/json` codec backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize with indentation.
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    fn to_json(value: &Value) -> Result<serde_json::Value, EncodeError> {
        let json = match value {
            Value::Null => serde_json::Value::Null,
            Value::Text(text) => serde_json::Value::String(text.clone()),
            Value::Json(json) => json.clone(),
            Value::Rows(rows) => serde_json::to_value(rows).map_err(|e| EncodeError::serialize("json", e))?,
            Value::Form(pairs) => {
                pairs.iter().map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone()))).collect()
            }
            Value::Xml(_) => return Err(EncodeError::unsupported_shape("json", value.shape())),
        };
        Ok(json)
    }
}

impl Codec for JsonCodec {
    fn serialize(&self, value: &Value) -> Result<Bytes, EncodeError> {
        let json = Self::to_json(value)?;
        let encoded = if self.pretty { serde_json::to_vec_pretty(&json) } else { serde_json::to_vec(&json) };
        encoded.map(Bytes::from).map_err(|e| EncodeError::serialize("json", e))
    }

    fn parse(&self, body: &str) -> Result<Value, DecodeError> {
        if body.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str::<serde_json::Value>(body)
            .map(Value::from)
            .map_err(|e| DecodeError::with_source(PARSE_ERROR, e))
    }
}
