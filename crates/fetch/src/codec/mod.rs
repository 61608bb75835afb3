//! Body codecs and the table that selects them by MIME type
//!
//! A [`Codec`] pairs a serializer and a parser for one content format. The
//! [`CodecTable`] maps canonical MIME strings to codecs and is consulted twice
//! per exchange: with the request's send type when the payload is serialized,
//! and with the response's content type when the body is decoded.
//!
//! # Built-in codecs
//!
//! | MIME type                           | codec          | parses into       |
//! |-------------------------------------|----------------|-------------------|
//! | `application/json`                  | [`JsonCodec`]  | [`Value::Json`]   |
//! | `application/xml`                   | [`XmlCodec`]   | [`Value::Xml`]    |
//! | `text/csv`                          | [`CsvCodec`]   | [`Value::Rows`]   |
//! | `application/x-www-form-urlencoded` | [`FormCodec`]  | [`Value::Form`]   |
//!
//! # Contract
//!
//! - `parse` never fails on empty input, it returns [`Value::Null`]
//! - any other malformed input fails with a codec-specific [`DecodeError`]
//! - `serialize` fails with [`EncodeError`] only for value shapes the codec
//!   does not support
//!
//! # Example
//!
//! ```
//! use micro_fetch::codec::{parse_fn, CodecTable};
//! use micro_fetch::Value;
//!
//! let codecs = CodecTable::new();
//! codecs.register("application/vnd.example.message+xml", parse_fn(|_body| Ok(Value::from("custom parse"))));
//!
//! assert!(codecs.has_registered("application/vnd.example.message+xml"));
//! assert!(codecs.has_registered("json"));
//! ```

use std::fmt;

use bytes::Bytes;
use micro_fetch_http::protocol::{DecodeError, EncodeError};

use crate::Value;

pub(crate) mod csv;
mod form;
mod json;
mod table;
mod xml;

pub use csv::{CsvCodec, InvalidDelimiter};
pub use form::FormCodec;
pub use json::JsonCodec;
pub use table::CodecTable;
pub use xml::{XmlCodec, XmlElement};

/// A serializer and parser for one content format.
pub trait Codec: Send + Sync {
    /// Serializes a structured payload into body bytes.
    fn serialize(&self, value: &Value) -> Result<Bytes, EncodeError>;

    /// Parses a response body into a structured value.
    fn parse(&self, body: &str) -> Result<Value, DecodeError>;
}

/// A codec built from a parse function.
///
/// Serialization writes the literal string form of the value, so a parse-only
/// codec can still be used as a send type.
pub struct FnCodec<F>(F);

impl<F> Codec for FnCodec<F>
where
    F: Fn(&str) -> Result<Value, DecodeError> + Send + Sync,
{
    fn serialize(&self, value: &Value) -> Result<Bytes, EncodeError> {
        Ok(Bytes::from(value.to_string()))
    }

    fn parse(&self, body: &str) -> Result<Value, DecodeError> {
        if body.is_empty() {
            return Ok(Value::Null);
        }
        (self.0)(body)
    }
}

impl<F> fmt::Debug for FnCodec<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCodec").finish_non_exhaustive()
    }
}

/// Wraps a parse function into a [`Codec`].
pub fn parse_fn<F>(f: F) -> FnCodec<F>
where
    F: Fn(&str) -> Result<Value, DecodeError> + Send + Sync,
{
    FnCodec(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fn_codec() {
        let codec = parse_fn(|body| Ok(Value::from(body.to_uppercase())));

        assert_eq!(codec.parse("abc").unwrap(), Value::from("ABC"));
        assert_eq!(codec.parse("").unwrap(), Value::Null);
        assert_eq!(codec.serialize(&Value::from("raw")).unwrap(), Bytes::from_static(b"raw"));
    }
}
