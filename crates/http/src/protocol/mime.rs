//! Short aliases for the MIME types the client knows about.
//!
//! Resolution is total: anything that is not a registered alias is handed back
//! unchanged and treated as an already-canonical MIME string. This is what lets
//! vendor and custom types flow through the rest of the pipeline untouched.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

pub const JSON: &str = "application/json";
pub const XML: &str = "application/xml";
pub const XHTML: &str = "application/html+xml";
pub const FORM: &str = "application/x-www-form-urlencoded";
pub const UPLOAD: &str = "multipart/form-data";
pub const PLAIN: &str = "text/plain";
pub const JS: &str = "text/javascript";
pub const HTML: &str = "text/html";
pub const YAML: &str = "application/x-yaml";
pub const CSV: &str = "text/csv";

/// alias -> canonical, the first alias of a canonical type is its preferred one
const ALIASES: &[(&str, &str)] = &[
    ("json", JSON),
    ("xml", XML),
    ("xhtml", XHTML),
    ("form", FORM),
    ("upload", UPLOAD),
    ("plain", PLAIN),
    ("text", PLAIN),
    ("js", JS),
    ("javascript", JS),
    ("html", HTML),
    ("yaml", YAML),
    ("csv", CSV),
];

/// A canonical MIME string plus the registered alias it is known by, if any.
///
/// Equality and hashing only look at the canonical string, so `json` and
/// `application/json` resolve to equal values.
#[derive(Debug, Clone, Eq)]
pub struct MimeType {
    essence: Cow<'static, str>,
    alias: Option<&'static str>,
}

impl MimeType {
    /// Resolves a short alias (`json`, `xml`, ...) or a MIME string.
    pub fn resolve(identifier: &str) -> Self {
        if let Some(&(alias, canonical)) = ALIASES.iter().find(|(alias, _)| *alias == identifier) {
            return Self { essence: Cow::Borrowed(canonical), alias: Some(alias) };
        }

        match ALIASES.iter().find(|(_, canonical)| *canonical == identifier) {
            Some(&(alias, canonical)) => Self { essence: Cow::Borrowed(canonical), alias: Some(alias) },
            None => Self { essence: Cow::Owned(identifier.to_owned()), alias: None },
        }
    }

    pub fn as_str(&self) -> &str {
        &self.essence
    }

    pub fn alias(&self) -> Option<&'static str> {
        self.alias
    }

    /// Whether this type is one of the registry's canonical types.
    pub fn is_known(&self) -> bool {
        self.alias.is_some()
    }

    pub fn into_string(self) -> String {
        self.essence.into_owned()
    }
}

/// Shorthand for [`MimeType::resolve`].
pub fn resolve(identifier: &str) -> MimeType {
    MimeType::resolve(identifier)
}

impl PartialEq for MimeType {
    fn eq(&self, other: &Self) -> bool {
        self.essence == other.essence
    }
}

impl PartialEq<str> for MimeType {
    fn eq(&self, other: &str) -> bool {
        self.essence == other
    }
}

impl PartialEq<&str> for MimeType {
    fn eq(&self, other: &&str) -> bool {
        self.essence == *other
    }
}

impl Hash for MimeType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.essence.hash(state);
    }
}

impl AsRef<str> for MimeType {
    fn as_ref(&self) -> &str {
        &self.essence
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.essence)
    }
}

impl From<&str> for MimeType {
    fn from(identifier: &str) -> Self {
        Self::resolve(identifier)
    }
}
