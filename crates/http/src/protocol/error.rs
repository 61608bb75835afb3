use std::borrow::Cow;
use std::error::Error as StdError;

use thiserror::Error;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Errors raised while reading a raw response head.
///
/// A `ParseError` means no response can be built at all: the status line is
/// the one piece of the head that is never skipped.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed status line: {line:?}")]
    MalformedStatusLine { line: String },

    #[error("invalid status code {code:?} in status line")]
    InvalidStatusCode { code: String },

    #[error("empty response head")]
    EmptyHead,
}

impl ParseError {
    pub fn malformed_status_line<S: ToString>(line: S) -> Self {
        Self::MalformedStatusLine { line: line.to_string() }
    }

    pub fn invalid_status_code<S: ToString>(code: S) -> Self {
        Self::InvalidStatusCode { code: code.to_string() }
    }
}

/// A response body is not valid for the codec selected to parse it.
///
/// The display form is the codec's message alone, e.g.
/// `Unable to parse response as JSON`; the underlying parser error is kept as
/// the [`source`](StdError::source).
#[derive(Error, Debug)]
#[error("{message}")]
pub struct DecodeError {
    message: Cow<'static, str>,
    #[source]
    source: Option<BoxError>,
}

impl DecodeError {
    pub fn new<M: Into<Cow<'static, str>>>(message: M) -> Self {
        Self { message: message.into(), source: None }
    }

    pub fn with_source<M, E>(message: M, source: E) -> Self
    where
        M: Into<Cow<'static, str>>,
        E: Into<BoxError>,
    {
        Self { message: message.into(), source: Some(source.into()) }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A request payload cannot be serialized by the selected send codec.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("{codec} codec can not serialize a {shape} value")]
    UnsupportedShape { codec: &'static str, shape: &'static str },

    #[error("unable to serialize payload as {codec}: {reason}")]
    Serialize { codec: &'static str, reason: String },
}

impl EncodeError {
    pub fn unsupported_shape(codec: &'static str, shape: &'static str) -> Self {
        Self::UnsupportedShape { codec, shape }
    }

    pub fn serialize<S: ToString>(codec: &'static str, reason: S) -> Self {
        Self::Serialize { codec, reason: reason.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_displays_message_only() {
        let inner = std::io::Error::other("line 1 column 8");
        let error = DecodeError::with_source("Unable to parse response as JSON", inner);

        assert_eq!(error.to_string(), "Unable to parse response as JSON");
        assert_eq!(error.message(), "Unable to parse response as JSON");
        assert!(error.source().is_some());
    }

    #[test]
    fn encode_error_names_the_codec() {
        let error = EncodeError::unsupported_shape("csv", "json");
        assert_eq!(error.to_string(), "csv codec can not serialize a json value");
    }
}
