use thiserror::Error;

use micro_fetch_http::protocol::{DecodeError, EncodeError, ParseError};

use crate::transport::TransportError;

/// Everything that can go wrong between preparing a request and holding a
/// decoded response.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },
}

impl FetchError {
    pub fn invalid_request<S: ToString>(reason: S) -> Self {
        Self::InvalidRequest { reason: reason.to_string() }
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transparent_messages() {
        let error = FetchError::from(DecodeError::new("Unable to parse response as JSON"));
        assert_eq!(error.to_string(), "Unable to parse response as JSON");
        assert!(error.is_decode());

        let error = FetchError::from(ParseError::malformed_status_line("garbage"));
        assert_eq!(error.to_string(), "malformed status line: \"garbage\"");
    }
}
