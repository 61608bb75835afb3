//! Codecs for HTTP message heads
//!
//! The transport owns framing (chunked transfer, content length, connection
//! reuse) and hands the client a header block that is already split from the
//! body. This module only deals with that header text.
//!
//! # Example
//!
//! ```
//! use micro_fetch_http::codec::HeaderDecoder;
//!
//! let head = HeaderDecoder
//!     .decode("HTTP/1.1 200 OK\r\nX-Id: 1\r\nX-Id: 2\r\n")
//!     .unwrap();
//!
//! assert_eq!(head.code(), 200);
//! assert_eq!(head.headers().get("x-id"), Some("1,2"));
//! ```

mod header;

pub use header::HeaderDecoder;
pub use header::HeaderEncoder;
