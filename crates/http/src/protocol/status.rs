//! The `HTTP/<version> <code> <reason>` line that opens every response head.

use http::{StatusCode, Version};

use crate::ensure;
use crate::protocol::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    version: String,
    status: StatusCode,
    reason: String,
}

impl StatusLine {
    /// Parses a status line; a trailing `\r\n` or `\n` is tolerated.
    ///
    /// The version token is kept as written (`1.1`, `2`, ...). The code must be
    /// three digits. The reason phrase may be empty.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim_end_matches(['\r', '\n']);

        let rest = line.strip_prefix("HTTP/").ok_or_else(|| ParseError::malformed_status_line(line))?;
        let (version, rest) = rest.split_once(' ').ok_or_else(|| ParseError::malformed_status_line(line))?;
        ensure!(
            !version.is_empty() && version.bytes().all(|b| b.is_ascii_digit() || b == b'.'),
            ParseError::malformed_status_line(line)
        );

        let (code, reason) = rest.split_once(' ').unwrap_or((rest, ""));
        ensure!(code.len() == 3, ParseError::invalid_status_code(code));
        let status = StatusCode::from_bytes(code.as_bytes()).ok().ok_or_else(|| ParseError::invalid_status_code(code))?;

        Ok(Self { version: version.to_owned(), status, reason: reason.trim().to_owned() })
    }

    pub fn code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The version token without the `HTTP/` prefix.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The version as an [`http::Version`], when it is one the `http` crate names.
    pub fn http_version(&self) -> Option<Version> {
        match self.version.as_str() {
            "0.9" => Some(Version::HTTP_09),
            "1.0" => Some(Version::HTTP_10),
            "1.1" => Some(Version::HTTP_11),
            "2" | "2.0" => Some(Version::HTTP_2),
            "3" | "3.0" => Some(Version::HTTP_3),
            _ => None,
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_code() {
        let line = StatusLine::parse("HTTP/1.1 406 Not Acceptable\r\n").unwrap();

        assert_eq!(line.code(), 406);
        assert_eq!(line.status(), StatusCode::NOT_ACCEPTABLE);
        assert_eq!(line.version(), "1.1");
        assert_eq!(line.http_version(), Some(Version::HTTP_11));
        assert_eq!(line.reason(), "Not Acceptable");
    }

    #[test]
    fn other_versions() {
        let line = StatusLine::parse("HTTP/2 204 No Content").unwrap();
        assert_eq!(line.code(), 204);
        assert_eq!(line.http_version(), Some(Version::HTTP_2));

        let line = StatusLine::parse("HTTP/1.0 200").unwrap();
        assert_eq!(line.code(), 200);
        assert_eq!(line.reason(), "");
    }

    #[test]
    fn malformed_lines() {
        for line in ["", "200 OK", "HTTP/1.1", "HTTP/ 200 OK", "HTTPS/1.1 200 OK", "HTTP/x.y 200 OK"] {
            assert!(
                matches!(StatusLine::parse(line), Err(ParseError::MalformedStatusLine { .. })),
                "expected malformed status line for {line:?}"
            );
        }
    }

    #[test]
    fn invalid_codes() {
        for line in ["HTTP/1.1 20 OK", "HTTP/1.1 abc OK", "HTTP/1.1 099 Low", "HTTP/1.1 2000 OK"] {
            assert!(
                matches!(StatusLine::parse(line), Err(ParseError::InvalidStatusCode { .. })),
                "expected invalid status code for {line:?}"
            );
        }
    }
}
