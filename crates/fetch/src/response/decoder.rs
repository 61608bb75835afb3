//! Raw response to [`Response`].
//!
//! Decoding runs four strictly ordered stages:
//!
//! 1. status line, through [`HeaderDecoder`]; a malformed one is fatal
//! 2. header block, folding repeated names and skipping malformed lines
//! 3. content type: essence, charset and vendor parent type
//! 4. body, through the codec selected for the content type
//!
//! The codec for stage 4 is looked up first under the exact content type, so
//! a codec registered for a vendor type wins over its parent. Otherwise the
//! parent type of a vendor type is used, and then the content type itself.
//! The request's expect type plays no part.

use std::borrow::Cow;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, trace};

use micro_fetch_http::codec::HeaderDecoder;
use micro_fetch_http::protocol::ContentType;

use crate::Value;
use crate::codec::{Codec, CodecTable};
use crate::error::FetchError;
use crate::request::Request;
use crate::response::Response;

/// Decodes raw responses against one codec table.
#[derive(Debug, Clone, Copy)]
pub struct ResponseDecoder<'a> {
    codecs: &'a CodecTable,
    header_decoder: HeaderDecoder,
}

impl<'a> ResponseDecoder<'a> {
    pub fn new(codecs: &'a CodecTable) -> Self {
        Self { codecs, header_decoder: HeaderDecoder }
    }

    /// Decodes `raw_headers` and `raw_body` for the response to `request`.
    ///
    /// # Errors
    ///
    /// [`FetchError::Parse`] when the status line is malformed, and
    /// [`FetchError::Decode`] when the selected codec rejects the body.
    pub fn decode(&self, raw_headers: &str, raw_body: Bytes, request: &Request) -> Result<Response, FetchError> {
        let head = self.header_decoder.decode(raw_headers)?;

        let content_type = head.headers().get("Content-Type").map_or_else(ContentType::absent, ContentType::parse);
        let text = body_text(&raw_body, content_type.charset());

        let body = if !request.is_auto_parse() {
            Value::Text(text.into_owned())
        } else if text.is_empty() {
            Value::Null
        } else {
            match self.select_codec(&content_type) {
                Some(codec) => codec.parse(&text)?,
                None => {
                    debug!(content_type = %content_type.essence(), "no codec registered, keeping raw body");
                    Value::Text(text.into_owned())
                }
            }
        };

        Ok(Response { raw_headers: raw_headers.to_owned(), raw_body, head, body, content_type })
    }

    fn select_codec(&self, content_type: &ContentType) -> Option<Arc<dyn Codec>> {
        if let Some(codec) = self.codecs.lookup(content_type.essence()) {
            trace!(decode_as = %content_type.essence(), "selected codec");
            return Some(codec);
        }

        let parent = content_type.parent_type()?;
        trace!(content_type = %content_type.essence(), decode_as = %parent, "selected vendor parent codec");
        self.codecs.lookup(parent.as_str())
    }
}

/// The body as text: UTF-8 when valid, otherwise decoded with the declared
/// charset. Only the Latin-1 family is decoded byte for byte; anything else
/// is decoded lossily.
fn body_text<'b>(raw_body: &'b Bytes, charset: &str) -> Cow<'b, str> {
    if let Ok(text) = std::str::from_utf8(raw_body) {
        return Cow::Borrowed(text);
    }

    let latin1 = ["iso-8859-1", "latin1", "latin-1", "iso_8859-1", "us-ascii"];
    if latin1.iter().any(|name| charset.eq_ignore_ascii_case(name)) {
        Cow::Owned(raw_body.iter().map(|&byte| char::from(byte)).collect())
    } else {
        String::from_utf8_lossy(raw_body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn request() -> Request {
        Request::from_config(&Config::default())
    }

    #[test]
    fn latin1_body() {
        let raw = Bytes::from_static(&[b'c', b'a', b'f', 0xE9]);

        assert_eq!(body_text(&raw, "ISO-8859-1"), "café");
        assert_eq!(body_text(&raw, "utf-8"), "caf\u{FFFD}");
        assert_eq!(body_text(&Bytes::from_static("café".as_bytes()), "iso-8859-1"), "café");
    }

    #[test]
    fn exact_codec_before_parent() {
        let codecs = CodecTable::new();
        let decoder = ResponseDecoder::new(&codecs);
        let head = "HTTP/1.1 200 OK\r\nContent-Type: application/vnd.example.message+xml\r\n";

        let response = decoder.decode(head, Bytes::from_static(b"<xml><name>Nathan</name></xml>"), &request()).unwrap();
        assert_eq!(response.body().as_xml().unwrap().find("name").unwrap().text(), "Nathan");

        codecs.register(
            "application/vnd.example.message+xml",
            crate::codec::parse_fn(|_| Ok(Value::from("custom parse"))),
        );
        let response = decoder.decode(head, Bytes::from_static(b"<xml><name>Nathan</name></xml>"), &request()).unwrap();
        assert_eq!(response.body(), &Value::from("custom parse"));
    }

    #[test]
    fn decode_error_propagates() {
        let codecs = CodecTable::new();
        let head = "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n";

        let error = ResponseDecoder::new(&codecs).decode(head, Bytes::from_static(b"invalid{json"), &request()).unwrap_err();

        assert!(error.is_decode());
        assert_eq!(error.to_string(), "Unable to parse response as JSON");
    }

    #[test]
    fn malformed_status_line_is_fatal() {
        let codecs = CodecTable::new();

        let error = ResponseDecoder::new(&codecs).decode("HTTP 200\r\n", Bytes::new(), &request()).unwrap_err();

        assert!(matches!(error, FetchError::Parse(_)));
    }

    #[test]
    fn empty_table_keeps_raw_text() {
        let codecs = CodecTable::empty();
        let head = "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n";

        let response = ResponseDecoder::new(&codecs).decode(head, Bytes::from_static(b"{\"a\":1}"), &request()).unwrap();

        assert_eq!(response.body(), &Value::from("{\"a\":1}"));
    }
}
