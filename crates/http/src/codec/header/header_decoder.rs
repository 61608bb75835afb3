//! Response head decoder: raw header block text into a [`ResponseHead`].
//!
//! The transport hands over the header block already split from the body, so
//! the decoder never looks for the body boundary itself. It works in two
//! strictly ordered stages:
//!
//! 1. The first line must be a status line, `HTTP/<version> <code> <reason>`.
//!    Anything else is a fatal [`ParseError`].
//! 2. Every following line shaped like `Name: Value` is folded into a
//!    [`Headers`] collection. Other lines are skipped. An empty line ends the
//!    block.
//!
//! Lines may be terminated by `\r\n` or a bare `\n`.

use tracing::trace;

use crate::protocol::{Headers, ParseError, ResponseHead, StatusLine};

/// Decoder for raw response header blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderDecoder;

impl HeaderDecoder {
    /// Decodes a raw header block.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the block is empty or its first line is not a
    /// valid status line.
    pub fn decode(&self, raw: &str) -> Result<ResponseHead, ParseError> {
        let mut lines = raw.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line));

        let status = match lines.next() {
            Some(line) if !line.is_empty() => StatusLine::parse(line)?,
            _ => return Err(ParseError::EmptyHead),
        };
        trace!(code = status.code(), version = status.version(), "parsed status line");

        let mut headers = Headers::new();
        for line in lines.take_while(|line| !line.is_empty()) {
            headers.append_line(line);
        }

        Ok(ResponseHead::new(status, headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn from_json_sample() {
        let raw = "HTTP/1.1 200 OK\nContent-Type: application/json\nConnection: keep-alive\nTransfer-Encoding: chunked\r\n";

        let head = HeaderDecoder.decode(raw).unwrap();

        assert_eq!(head.code(), 200);
        assert_eq!(head.status_line().reason(), "OK");
        assert_eq!(head.headers().len(), 3);
        assert_eq!(head.headers().get("Content-Type"), Some("application/json"));
        assert_eq!(head.headers().get("connection"), Some("keep-alive"));
    }

    #[test]
    fn from_crlf_block() {
        let raw = "HTTP/1.1 404 Not Found\r\nServer: nginx\r\nContent-Length: 0\r\n\r\n";

        let head = HeaderDecoder.decode(raw).unwrap();

        assert_eq!(head.code(), 404);
        assert_eq!(head.headers().len(), 2);
        assert_eq!(head.headers().get("content-length"), Some("0"));
    }

    #[test]
    fn folds_repeated_headers() {
        let raw = indoc! {"
            HTTP/1.1 200 OK
            Content-Type: application/json
            Connection: keep-alive
            Transfer-Encoding: chunked
            X-My-Header:Value1
            X-My-Header:Value2
        "};

        let head = HeaderDecoder.decode(raw).unwrap();

        assert_eq!(head.headers().get("X-My-Header"), Some("Value1,Value2"));
        assert_eq!(head.headers().len(), 4);
    }

    #[test]
    fn status_line_only() {
        let head = HeaderDecoder.decode("HTTP/1.1 100 Continue\r\n").unwrap();

        assert_eq!(head.code(), 100);
        assert!(head.headers().is_empty());
    }

    #[test]
    fn skips_garbage_lines() {
        let raw = "HTTP/1.1 200 OK\r\n\tcontinued value\r\nX-Ok: 1\r\nnonsense\r\n";

        let (status, headers) = HeaderDecoder.decode(raw).unwrap().into_parts();

        assert_eq!(status.code(), 200);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("x-ok"), Some("1"));
    }

    #[test]
    fn malformed_status_line_is_fatal() {
        let result = HeaderDecoder.decode("Content-Type: application/json\r\n\r\n");
        assert!(matches!(result, Err(ParseError::MalformedStatusLine { .. })));

        assert!(matches!(HeaderDecoder.decode(""), Err(ParseError::EmptyHead)));
        assert!(matches!(HeaderDecoder.decode("\r\nHTTP/1.1 200 OK"), Err(ParseError::EmptyHead)));
    }
}
