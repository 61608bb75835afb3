//! Header block processing for both directions of an exchange
//!
//! - [`HeaderDecoder`]: decodes a raw response header block
//!   - Validates the status line
//!   - Folds repeated header names into one comma-joined entry
//!   - Skips lines that are not header-shaped
//!
//! - [`HeaderEncoder`]: encodes a request head
//!   - Writes the origin-form request line
//!   - Derives `Host` from the URI authority
//!   - Keeps header names as the caller spelled them

mod header_decoder;
mod header_encoder;

pub use header_decoder::HeaderDecoder;
pub use header_encoder::HeaderEncoder;
