//! The seam between negotiation and the wire.
//!
//! This crate performs no I/O. A [`Transport`] receives the fully prepared
//! [`OutgoingRequest`] and returns the raw response already split into the
//! header block and the body. Framing, chunked decoding, TLS, proxies, digest
//! challenges and multipart encoding all live on the other side of this trait.

use std::time::Duration;

use bytes::Bytes;
use http::Method;
use thiserror::Error;

use micro_fetch_http::protocol::Headers;

use crate::request::Credentials;

/// Executes one HTTP exchange.
#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    fn transmit(&self, request: &OutgoingRequest) -> Result<RawResponse, TransportError>;
}

struct FnTransport<F>(F);

impl<F> Transport for FnTransport<F>
where
    F: Fn(&OutgoingRequest) -> Result<RawResponse, TransportError>,
{
    fn transmit(&self, request: &OutgoingRequest) -> Result<RawResponse, TransportError> {
        (self.0)(request)
    }
}

/// Wraps a function into a [`Transport`].
pub fn fn_transport<F>(f: F) -> impl Transport
where
    F: Fn(&OutgoingRequest) -> Result<RawResponse, TransportError>,
{
    FnTransport(f)
}

/// Options this crate stores and forwards without interpreting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportOptions {
    pub strict_tls: bool,
    pub timeout: Option<Duration>,
    pub proxy: Option<String>,
    /// Present when digest auth was requested.
    pub digest: Option<Credentials>,
}

/// A request ready for the wire.
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub(crate) method: Method,
    pub(crate) uri: String,
    pub(crate) headers: Headers,
    pub(crate) raw_headers: String,
    pub(crate) body: Bytes,
    pub(crate) files: Vec<(String, String)>,
    pub(crate) options: TransportOptions,
}

impl OutgoingRequest {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// The encoded request line and headers, terminated by a blank line.
    pub fn raw_headers(&self) -> &str {
        &self.raw_headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Files to send as multipart parts, as `field → path` pairs.
    pub fn files(&self) -> &[(String, String)] {
        &self.files
    }

    pub fn options(&self) -> &TransportOptions {
        &self.options
    }
}

/// A response as it came off the wire: the raw header block and the body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    pub head: String,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new<H: Into<String>, B: Into<Bytes>>(head: H, body: B) -> Self {
        Self { head: head.into(), body: body.into() }
    }
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("connection refused: {uri}")]
    ConnectionRefused { uri: String },

    #[error("request timed out after {elapsed:?}")]
    Timeout { elapsed: Duration },

    #[error("tls failure: {reason}")]
    Tls { reason: String },

    #[error("unable to connect to {uri}: malformed uri")]
    MalformedUri { uri: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl TransportError {
    pub fn connection_refused<S: ToString>(uri: S) -> Self {
        Self::ConnectionRefused { uri: uri.to_string() }
    }

    pub fn timeout(elapsed: Duration) -> Self {
        Self::Timeout { elapsed }
    }

    pub fn tls<S: ToString>(reason: S) -> Self {
        Self::Tls { reason: reason.to_string() }
    }

    pub fn malformed_uri<S: ToString>(uri: S) -> Self {
        Self::MalformedUri { uri: uri.to_string() }
    }
}
