use std::fmt;

use bytes::Bytes;
use http::StatusCode;

use micro_fetch_http::protocol::{ContentType, Headers, MimeType, ResponseHead, StatusLine};

use crate::Value;
use crate::codec::CodecTable;
use crate::error::FetchError;
use crate::request::Request;

mod decoder;

pub use decoder::ResponseDecoder;

/// A decoded HTTP response. Immutable once built.
#[derive(Debug, Clone)]
pub struct Response {
    raw_headers: String,
    raw_body: Bytes,
    head: ResponseHead,
    body: Value,
    content_type: ContentType,
}

impl Response {
    /// Decodes a raw response with the global codec table.
    pub fn new<B: Into<Bytes>>(raw_body: B, raw_headers: &str, request: &Request) -> Result<Self, FetchError> {
        ResponseDecoder::new(CodecTable::global()).decode(raw_headers, raw_body.into(), request)
    }

    pub fn code(&self) -> u16 {
        self.head.code()
    }

    pub fn status(&self) -> StatusCode {
        self.head.status_line().status()
    }

    pub fn status_line(&self) -> &StatusLine {
        self.head.status_line()
    }

    /// True for status codes of 400 and above.
    pub fn has_errors(&self) -> bool {
        self.code() >= 400
    }

    pub fn headers(&self) -> &Headers {
        self.head.headers()
    }

    /// The header block exactly as received.
    pub fn raw_headers(&self) -> &str {
        &self.raw_headers
    }

    pub fn raw_body(&self) -> &Bytes {
        &self.raw_body
    }

    /// The parsed body, or the raw text when no codec applied.
    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn into_body(self) -> Value {
        self.body
    }

    pub fn has_body(&self) -> bool {
        !self.body.is_null()
    }

    /// The declared content type without parameters, or `""` when absent.
    pub fn content_type(&self) -> &str {
        self.content_type.essence()
    }

    /// The base type of a vendor-specific content type.
    pub fn parent_type(&self) -> Option<&str> {
        self.content_type.parent_type().map(MimeType::as_str)
    }

    pub fn charset(&self) -> &str {
        self.content_type.charset()
    }

    pub fn is_vendor_specific(&self) -> bool {
        self.content_type.is_vendor_specific()
    }
}

/// Writes the raw body.
impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.raw_body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use indoc::indoc;

    const SAMPLE_JSON_HEADER: &str =
        "HTTP/1.1 200 OK\nContent-Type: application/json\nConnection: keep-alive\nTransfer-Encoding: chunked\r\n";
    const SAMPLE_JSON_RESPONSE: &str = r#"{"key":"value","object":{"key":"value"},"array":[1,2,3,4]}"#;

    fn decode(body: &str, head: &str, request: &Request) -> Response {
        ResponseDecoder::new(&CodecTable::new()).decode(head, Bytes::copy_from_slice(body.as_bytes()), request).unwrap()
    }

    fn request() -> Request {
        Request::from_config(&Config::default()).sends_and_expects("json")
    }

    #[test]
    fn json_body() {
        let response = decode(SAMPLE_JSON_RESPONSE, SAMPLE_JSON_HEADER, &request());

        assert_eq!(response.code(), 200);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.content_type(), "application/json");
        assert_eq!(response.charset(), "iso-8859-1");
        assert_eq!(response.headers().get("Content-Type"), Some("application/json"));
        assert!(response.raw_headers().contains("Content-Type: application/json"));
        assert_eq!(response.body().as_json().unwrap()["object"]["key"], "value");
        assert_eq!(response.to_string(), SAMPLE_JSON_RESPONSE);
    }

    #[test]
    fn no_auto_parse_keeps_text() {
        let response = decode(SAMPLE_JSON_RESPONSE, SAMPLE_JSON_HEADER, &request().without_auto_parsing());
        assert_eq!(response.body(), &Value::from(SAMPLE_JSON_RESPONSE));

        let response = decode(SAMPLE_JSON_RESPONSE, SAMPLE_JSON_HEADER, &request().with_auto_parse(true));
        assert!(response.body().as_json().is_some());
    }

    #[test]
    fn empty_body_is_null() {
        let response = decode("", SAMPLE_JSON_HEADER, &request());
        assert!(response.body().is_null());
        assert!(!response.has_body());

        let head = "HTTP/1.1 200 OK\nContent-Type: application/xml\r\n";
        assert!(decode("", head, &request()).body().is_null());
    }

    #[test]
    fn has_errors() {
        let cases = [
            ("HTTP/1.1 100 Continue\r\n", false),
            ("HTTP/1.1 200 OK\r\n", false),
            ("HTTP/1.1 300 Multiple Choices\r\n", false),
            ("HTTP/1.1 400 Bad Request\r\n", true),
            ("HTTP/1.1 500 Internal Server Error\r\n", true),
        ];

        for (head, expected) in cases {
            assert_eq!(decode("", head, &request()).has_errors(), expected, "{head}");
        }
    }

    #[test]
    fn charset_parameter() {
        let response = decode("hello", "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\n", &request());

        assert_eq!(response.content_type(), "text/plain");
        assert_eq!(response.charset(), "utf-8");
        assert_eq!(response.body(), &Value::from("hello"));
    }

    #[test]
    fn vendor_type() {
        let head = indoc! {"
            HTTP/1.1 200 OK
            Content-Type: application/vnd.nategood.message+xml
            Connection: keep-alive
            Transfer-Encoding: chunked
        "};

        let response = decode("<xml><name>Nathan</name></xml>", head, &request());

        assert_eq!(response.content_type(), "application/vnd.nategood.message+xml");
        assert_eq!(response.parent_type(), Some("application/xml"));
        assert!(response.is_vendor_specific());
        assert_eq!(response.body().as_xml().unwrap().child("name").unwrap().text(), "Nathan");
    }

    #[test]
    fn missing_content_type() {
        let head = "HTTP/1.1 200 OK\nConnection: keep-alive\nTransfer-Encoding: chunked\r\n";

        let response = decode("<xml><name>Nathan</name></xml>", head, &request());

        assert_eq!(response.content_type(), "");
        assert_eq!(response.parent_type(), None);
        assert_eq!(response.body(), &Value::from("<xml><name>Nathan</name></xml>"));
    }

    #[test]
    fn csv_body() {
        let head = "HTTP/1.1 200 OK\nContent-Type: text/csv\r\n";

        let response = decode("Key1,Key2\nValue1,Value2\n\"40.0\",\"Forty\"", head, &request());

        let rows = response.body().as_rows().unwrap();
        assert_eq!(rows[0][0], "Key1");
        assert_eq!(rows[1][0], "Value1");
        assert_eq!(rows[2][0], "40.0");
    }
}
