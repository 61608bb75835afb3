//! Protocol types shared by request preparation and response decoding.
//!
//! - **MIME registry** ([`mime`]): short aliases and canonical MIME strings
//!   - [`MimeType`]: a canonical MIME string and its registered alias
//!
//! - **Headers** ([`Headers`]): ordered, case-insensitive, comma-folding
//!   header collection
//!
//! - **Response head** ([`ResponseHead`], [`StatusLine`]): the decoded status
//!   line and headers of a response
//!
//! - **Content type** ([`ContentType`]): essence, charset and vendor parent
//!   type of a `Content-Type` value
//!
//! - **Error handling**: the error taxonomy
//!   - [`ParseError`]: malformed response head
//!   - [`DecodeError`]: body invalid for the selected codec
//!   - [`EncodeError`]: payload shape unsupported by the send codec

pub mod mime;
pub use mime::MimeType;

mod headers;
pub use headers::Headers;

mod status;
pub use status::StatusLine;

mod response;
pub use response::ResponseHead;

mod content_type;
pub use content_type::ContentType;
pub use content_type::DEFAULT_CHARSET;
pub use content_type::vendor_parent;

mod error;
pub use error::DecodeError;
pub use error::EncodeError;
pub use error::ParseError;
