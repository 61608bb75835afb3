//! Wire-level building blocks of the micro-fetch HTTP client
//!
//! This crate holds the parts of an HTTP exchange that do not depend on how a
//! body is interpreted: MIME aliases, header folding, status line parsing and
//! the encoding and decoding of message heads. Content negotiation and body
//! codecs live in `micro-fetch`, which builds on these types.
//!
//! # Example
//!
//! ```
//! use micro_fetch_http::codec::HeaderDecoder;
//! use micro_fetch_http::protocol::{mime, ContentType, MimeType};
//!
//! let head = HeaderDecoder
//!     .decode("HTTP/1.1 200 OK\r\nContent-Type: application/vnd.example.message+xml\r\n")
//!     .unwrap();
//!
//! let content_type = ContentType::parse(head.headers().get("Content-Type").unwrap());
//! assert!(content_type.is_vendor_specific());
//! assert_eq!(content_type.parent_type(), Some(&MimeType::resolve("xml")));
//! assert_eq!(content_type.charset(), "iso-8859-1");
//! assert_eq!(MimeType::resolve("json"), mime::JSON);
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: protocol types and the error taxonomy
//! - [`codec`]: header block decoding and request head encoding
//!
//! # Error Handling
//!
//! - [`protocol::ParseError`]: the status line is malformed, no response can be built
//! - [`protocol::DecodeError`]: a body is invalid for the codec chosen to parse it
//! - [`protocol::EncodeError`]: a payload can not be serialized by the send codec

pub mod codec;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
