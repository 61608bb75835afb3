//! Request head encoder: request line and headers into raw HTTP/1.1 text.
//!
//! The encoded head is what a transport writes on the wire before the body.
//! The request line carries the origin-form target (`/path?query`) of an
//! absolute URI, and a `Host` header is derived from the URI's authority when
//! the caller did not set one.

use std::borrow::Cow;
use std::io::{self, Write};

use bytes::{BufMut, BytesMut};
use http::{Method, Uri};
use tracing::trace;

use crate::protocol::Headers;

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 1024;

/// Encoder for request heads.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderEncoder;

impl HeaderEncoder {
    /// Writes `METHOD target HTTP/1.1`, each header line and the blank line.
    ///
    /// A URI the `http` crate can not parse is written verbatim as the target;
    /// rejecting it is the transport's job.
    pub fn encode(&self, method: &Method, uri: &str, headers: &Headers, dst: &mut BytesMut) {
        dst.reserve(INIT_HEADER_SIZE);

        let parsed = uri.parse::<Uri>().ok();
        let target = match &parsed {
            Some(parsed) if parsed.authority().is_some() => origin_form(parsed),
            _ => Cow::Borrowed(uri),
        };

        // writing into a BytesMut never fails
        let _ = write!(FastWrite(dst), "{method} {target} HTTP/1.1\r\n");

        if !headers.contains("Host")
            && let Some(authority) = parsed.as_ref().and_then(Uri::authority)
        {
            put_header(dst, "Host", authority.as_str());
        }

        for (name, value) in headers.iter() {
            put_header(dst, name, value);
        }
        dst.put_slice(b"\r\n");

        trace!(head_size = dst.len(), "encoded request head");
    }

    /// Encodes into a fresh string.
    pub fn encode_to_string(&self, method: &Method, uri: &str, headers: &Headers) -> String {
        let mut dst = BytesMut::new();
        self.encode(method, uri, headers, &mut dst);
        String::from_utf8_lossy(&dst).into_owned()
    }
}

/// `/path?query` of an absolute URI; an empty path becomes `/`.
fn origin_form(uri: &Uri) -> Cow<'_, str> {
    match uri.query() {
        Some(query) => Cow::Owned(format!("{}?{query}", uri.path())),
        None => Cow::Borrowed(uri.path()),
    }
}

/// Header names and values are written as given; callers validate them.
fn put_header(dst: &mut BytesMut, name: &str, value: &str) {
    dst.put_slice(name.as_bytes());
    dst.put_slice(b":");
    if !value.is_empty() {
        dst.put_slice(b" ");
        dst.put_slice(value.as_bytes());
    }
    dst.put_slice(b"\r\n");
}

/// Fast writer implementation for writing to BytesMut.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_uri() {
        let headers: Headers = [("Accept", "application/json"), ("User-Agent", "ACME/1.2.3")].into_iter().collect();

        let head = HeaderEncoder.encode_to_string(&Method::GET, "http://example.com/a/b?q=1", &headers);

        assert_eq!(
            head,
            "GET /a/b?q=1 HTTP/1.1\r\nHost: example.com\r\nAccept: application/json\r\nUser-Agent: ACME/1.2.3\r\n\r\n"
        );
    }

    #[test]
    fn empty_path_becomes_root() {
        let head = HeaderEncoder.encode_to_string(&Method::POST, "http://example.com:8080", &Headers::new());

        assert_eq!(head, "POST / HTTP/1.1\r\nHost: example.com:8080\r\n\r\n");
    }

    #[test]
    fn query_without_path() {
        let head = HeaderEncoder.encode_to_string(&Method::GET, "http://google.com?a=b", &Headers::new());

        assert_eq!(head, "GET /?a=b HTTP/1.1\r\nHost: google.com\r\n\r\n");
    }

    #[test]
    fn empty_query_is_kept() {
        let head = HeaderEncoder.encode_to_string(&Method::GET, "http://example.com/search?", &Headers::new());

        assert!(head.starts_with("GET /search? HTTP/1.1\r\n"));
    }

    #[test]
    fn explicit_host_wins() {
        let headers: Headers = [("host", "other.test")].into_iter().collect();

        let head = HeaderEncoder.encode_to_string(&Method::GET, "http://example.com/", &headers);

        assert!(head.contains("host: other.test\r\n"));
        assert!(!head.contains("example.com"));
    }

    #[test]
    fn empty_value() {
        let headers: Headers = [("User-Agent", "")].into_iter().collect();

        let head = HeaderEncoder.encode_to_string(&Method::GET, "/", &headers);

        assert_eq!(head, "GET / HTTP/1.1\r\nUser-Agent:\r\n\r\n");
    }

    #[test]
    fn unparsable_uri_is_kept() {
        let head = HeaderEncoder.encode_to_string(&Method::GET, "malformed uri", &Headers::new());

        assert_eq!(head, "GET malformed uri HTTP/1.1\r\n\r\n");
    }
}
