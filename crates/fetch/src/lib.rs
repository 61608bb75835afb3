//! Content negotiation and response decoding for HTTP clients.
//!
//! A [`Request`] declares what it sends and what it expects. Preparing it
//! serializes the payload with the codec registered for the send type and
//! builds the raw request head. A [`Transport`](transport::Transport) moves the
//! bytes, and the [`ResponseDecoder`] turns the raw response back into a
//! structured [`Response`], choosing the codec from the content type the
//! response declares.
//!
//! Codecs are kept in a [`CodecTable`](codec::CodecTable). A process-wide table
//! seeded with JSON, XML, CSV and form codecs backs [`register`],
//! [`has_registered`] and [`get_codec`]; isolated tables can be built for
//! tests or embedding.
//!
//! # Example
//!
//! ```
//! use micro_fetch::{Request, Response, Value};
//!
//! let request = Request::get("http://example.com/").expects_json();
//! let response = Response::new(
//!     r#"{"key":"value"}"#,
//!     "HTTP/1.1 200 OK\r\nContent-Type: application/json; charset=utf-8\r\n",
//!     &request,
//! )
//! .unwrap();
//!
//! assert_eq!(response.code(), 200);
//! assert_eq!(response.charset(), "utf-8");
//! assert_eq!(response.body().as_json().unwrap()["key"], "value");
//! assert!(!response.has_errors());
//! ```

use std::sync::Arc;

pub mod codec;
pub mod config;
mod error;
pub mod request;
pub mod response;
pub mod transport;
mod utils;
mod value;

pub use error::FetchError;
pub use request::{Payload, Request, SerializePolicy};
pub use response::{Response, ResponseDecoder};
pub use value::Value;

pub use micro_fetch_http::protocol::mime;
pub use micro_fetch_http::protocol::{DecodeError, EncodeError, Headers, MimeType, ParseError};

use codec::{Codec, CodecTable};

/// Registers `codec` for `mime` in the global table.
pub fn register<C: Codec + 'static>(mime: impl AsRef<str>, codec: C) {
    CodecTable::global().register(mime, codec);
}

pub fn has_registered(mime: impl AsRef<str>) -> bool {
    CodecTable::global().has_registered(mime)
}

/// The codec for `mime` in the global table.
pub fn get_codec(mime: impl AsRef<str>) -> Option<Arc<dyn Codec>> {
    CodecTable::global().get_codec(mime)
}
