//! The decoded head of an HTTP response.

use crate::protocol::{Headers, StatusLine};

/// Status line plus folded headers, as produced by
/// [`HeaderDecoder`](crate::codec::HeaderDecoder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    status: StatusLine,
    headers: Headers,
}

impl ResponseHead {
    pub fn new(status: StatusLine, headers: Headers) -> Self {
        Self { status, headers }
    }

    pub fn status_line(&self) -> &StatusLine {
        &self.status
    }

    pub fn code(&self) -> u16 {
        self.status.code()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn into_parts(self) -> (StatusLine, Headers) {
        (self.status, self.headers)
    }
}
