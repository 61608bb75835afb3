//! `Content-Type` resolution: essence, charset and vendor parent type.

use tracing::trace;

use crate::protocol::mime::MimeType;

/// Charset assumed when a response does not declare one.
pub const DEFAULT_CHARSET: &str = "iso-8859-1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    essence: String,
    charset: String,
    parent: Option<MimeType>,
}

impl ContentType {
    /// The resolution used when a response carries no `Content-Type` at all.
    pub fn absent() -> Self {
        Self { essence: String::new(), charset: DEFAULT_CHARSET.to_owned(), parent: None }
    }

    /// Parses a `Content-Type` header value.
    ///
    /// The essence is the first `;` segment, trimmed and kept as written. The
    /// charset comes from a `charset=` parameter, also kept as written,
    /// defaulting to [`DEFAULT_CHARSET`].
    pub fn parse(value: &str) -> Self {
        let mut segments = value.split(';');
        let essence = segments.next().unwrap_or_default().trim().to_owned();

        let charset = segments
            .find_map(|segment| {
                let (name, value) = segment.split_once('=')?;
                name.trim().eq_ignore_ascii_case("charset").then(|| unquote(value.trim()).to_owned())
            })
            .unwrap_or_else(|| DEFAULT_CHARSET.to_owned());

        let parent = vendor_parent(&essence);
        trace!(content_type = %essence, charset = %charset, parent = ?parent, "resolved content type");

        Self { essence, charset, parent }
    }

    pub fn essence(&self) -> &str {
        &self.essence
    }

    pub fn charset(&self) -> &str {
        &self.charset
    }

    /// The base type of a vendor-specific type, e.g. `application/xml` for
    /// `application/vnd.example.message+xml`.
    pub fn parent_type(&self) -> Option<&MimeType> {
        self.parent.as_ref()
    }

    pub fn is_vendor_specific(&self) -> bool {
        self.parent.is_some()
    }
}

/// Matches `<type>/vnd.<anything>+<suffix>` where `<suffix>` is a registry alias.
///
/// Only the single trailing `+suffix` form is recognised.
pub fn vendor_parent(essence: &str) -> Option<MimeType> {
    let (_, subtype) = essence.split_once('/')?;
    let vendor = subtype.strip_prefix("vnd.")?;
    let (name, suffix) = vendor.rsplit_once('+')?;
    if name.is_empty() || suffix.is_empty() {
        return None;
    }

    let parent = MimeType::resolve(suffix);
    parent.is_known().then_some(parent)
}

fn unquote(value: &str) -> &str {
    value.strip_prefix('"').and_then(|v| v.strip_suffix('"')).unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::mime;

    #[test]
    fn essence_and_charset() {
        let content_type = ContentType::parse("text/plain; charset=utf-8");

        assert_eq!(content_type.essence(), "text/plain");
        assert_eq!(content_type.charset(), "utf-8");
        assert!(!content_type.is_vendor_specific());
    }

    #[test]
    fn default_charset() {
        let content_type = ContentType::parse("application/json");
        assert_eq!(content_type.charset(), DEFAULT_CHARSET);

        let absent = ContentType::absent();
        assert_eq!(absent.essence(), "");
        assert_eq!(absent.charset(), "iso-8859-1");
    }

    #[test]
    fn charset_spelling_is_kept() {
        assert_eq!(ContentType::parse("text/plain; charset=UTF-8").charset(), "UTF-8");
        assert_eq!(ContentType::parse("text/plain;charset=Windows-1252").charset(), "Windows-1252");
        assert_eq!(ContentType::parse("text/plain; format=flowed; CHARSET=utf-8").charset(), "utf-8");
    }

    #[test]
    fn lenient_parameter_syntax() {
        let content_type = ContentType::parse(" weird type ; Charset = \"koi8-r\" ");

        assert_eq!(content_type.essence(), "weird type");
        assert_eq!(content_type.charset(), "koi8-r");
    }

    #[test]
    fn quoted_charset() {
        let content_type = ContentType::parse("text/html; charset=\"utf-8\"");
        assert_eq!(content_type.charset(), "utf-8");
    }

    #[test]
    fn vendor_types() {
        let content_type = ContentType::parse("application/vnd.example.message+xml");

        assert_eq!(content_type.essence(), "application/vnd.example.message+xml");
        assert!(content_type.is_vendor_specific());
        assert_eq!(content_type.parent_type().map(MimeType::as_str), Some(mime::XML));

        assert_eq!(vendor_parent("application/vnd.api+json").map(MimeType::into_string), Some(mime::JSON.to_owned()));
    }

    #[test]
    fn not_vendor_types() {
        // unknown suffix
        assert_eq!(vendor_parent("application/vnd.example+bogus"), None);
        // no vnd. prefix
        assert_eq!(vendor_parent("application/api-1.0+json"), None);
        // no suffix
        assert_eq!(vendor_parent("application/vnd.ms-excel"), None);
        assert_eq!(vendor_parent("application/vnd.+xml"), None);
        assert_eq!(vendor_parent(""), None);
    }
}
