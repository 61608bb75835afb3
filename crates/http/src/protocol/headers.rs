//! An ordered, case-insensitive header collection with comma folding.
//!
//! Unlike [`http::HeaderMap`], a [`Headers`] keeps exactly one logical entry per
//! name: appending a name that is already present folds the new value into the
//! existing one as `old + "," + new`. Entries keep the position and spelling of
//! the first occurrence, so iteration follows first-seen order.

use http::{HeaderMap, HeaderName, HeaderValue};
use tracing::trace;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<HeaderEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct HeaderEntry {
    name: String,
    value: String,
}

impl Headers {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Parses every `Name: Value` line of a raw header block.
    ///
    /// A leading `HTTP/...` status line is skipped and parsing stops at the
    /// first empty line. Lines that are not header-shaped are ignored.
    pub fn from_raw(raw: &str) -> Self {
        let mut headers = Self::new();
        let mut lines = raw.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line)).peekable();

        if lines.peek().is_some_and(|line| line.starts_with("HTTP/")) {
            lines.next();
        }

        for line in lines {
            if line.is_empty() {
                break;
            }
            headers.append_line(line);
        }

        headers
    }

    /// Adds one raw header line, returning false when it is not header-shaped.
    pub fn append_line(&mut self, line: &str) -> bool {
        match split_header_line(line) {
            Some((name, value)) => {
                self.append(name, value);
                true
            }
            None => {
                trace!(line, "skip line that is not a header");
                false
            }
        }
    }

    /// Appends a value, folding it into an existing entry of the same name.
    pub fn append<N, V>(&mut self, name: N, value: V)
    where
        N: AsRef<str>,
        V: AsRef<str>,
    {
        let (name, value) = (name.as_ref(), value.as_ref());
        match self.position(name) {
            Some(index) => {
                let folded = &mut self.entries[index].value;
                folded.push(',');
                folded.push_str(value);
            }
            None => self.entries.push(HeaderEntry { name: name.to_owned(), value: value.to_owned() }),
        }
    }

    /// Replaces the value of `name`, keeping its position, and returns the old value.
    pub fn insert<N, V>(&mut self, name: N, value: V) -> Option<String>
    where
        N: AsRef<str>,
        V: Into<String>,
    {
        let name = name.as_ref();
        match self.position(name) {
            Some(index) => Some(std::mem::replace(&mut self.entries[index].value, value.into())),
            None => {
                self.entries.push(HeaderEntry { name: name.to_owned(), value: value.into() });
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|index| self.entries[index].value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|index| self.entries.remove(index).value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(name, value)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|entry| (entry.name.as_str(), entry.value.as_str()))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.name.eq_ignore_ascii_case(name))
    }
}

/// Splits `Name: Value` into its trimmed parts.
///
/// The name must be a valid HTTP token; the value may be empty.
pub(crate) fn split_header_line(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once(':')?;
    if HeaderName::from_bytes(name.as_bytes()).is_err() {
        return None;
    }
    Some((name, value.trim_matches(|c| c == ' ' || c == '\t')))
}

impl<N, V> FromIterator<(N, V)> for Headers
where
    N: AsRef<str>,
    V: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        headers.extend(iter);
        headers
    }
}

impl<N, V> Extend<(N, V)> for Headers
where
    N: AsRef<str>,
    V: AsRef<str>,
{
    fn extend<I: IntoIterator<Item = (N, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.append(name, value);
        }
    }
}

/// Converts into an [`http::HeaderMap`], failing on names or values the `http`
/// crate rejects.
impl TryFrom<&Headers> for HeaderMap {
    type Error = http::Error;

    fn try_from(headers: &Headers) -> Result<Self, Self::Error> {
        let mut map = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers.iter() {
            map.append(HeaderName::from_bytes(name.as_bytes())?, HeaderValue::from_str(value)?);
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const SAMPLE_JSON_HEADER: &str = "HTTP/1.1 200 OK\nContent-Type: application/json\nConnection: keep-alive\nTransfer-Encoding: chunked\r\n";

    #[test]
    fn parse_sample_block() {
        let headers = Headers::from_raw(SAMPLE_JSON_HEADER);

        assert_eq!(headers.len(), 3);
        assert_eq!(headers.get("Content-Type"), Some("application/json"));
        assert!(headers.contains("Connection"));
        assert_eq!(headers.get("transfer-encoding"), Some("chunked"));
    }

    #[test]
    fn repeated_names_fold_in_order() {
        let raw = indoc! {"
            HTTP/1.1 200 OK
            Content-Type: application/json
            X-My-Header:Value1
            x-my-header: Value2
        "};

        let headers = Headers::from_raw(raw);

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("X-My-Header"), Some("Value1,Value2"));
        // the first spelling wins
        assert_eq!(headers.iter().nth(1), Some(("X-My-Header", "Value1,Value2")));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut headers = Headers::new();
        headers.append("Accept", "text/html");

        assert_eq!(headers.get("ACCEPT"), Some("text/html"));
        assert_eq!(headers.get("accept"), Some("text/html"));
        assert_eq!(headers.get("Accept-Encoding"), None);
    }

    #[test]
    fn iteration_keeps_first_seen_order() {
        let headers: Headers = [("b", "1"), ("a", "2"), ("B", "3"), ("c", "4")].into_iter().collect();

        let names: Vec<_> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["b", "a", "c"]);
        assert_eq!(headers.get("b"), Some("1,3"));
    }

    #[test]
    fn non_header_lines_are_ignored() {
        let raw = "HTTP/1.1 200 OK\r\nnot a header\r\nBad Name: x\r\n: no name\r\nGood: yes\r\n";

        let headers = Headers::from_raw(raw);

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("Good"), Some("yes"));
    }

    #[test]
    fn stops_at_blank_line() {
        let raw = "HTTP/1.1 200 OK\r\nA: 1\r\n\r\nB: 2\r\n";

        let headers = Headers::from_raw(raw);

        assert_eq!(headers.len(), 1);
        assert!(!headers.contains("B"));
    }

    #[test]
    fn empty_value_is_kept() {
        let mut headers = Headers::new();
        assert!(headers.append_line("User-Agent:"));
        assert_eq!(headers.get("user-agent"), Some(""));
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut headers: Headers = [("A", "1"), ("B", "2")].into_iter().collect();

        assert_eq!(headers.insert("a", "3"), Some("1".to_owned()));
        assert_eq!(headers.iter().next(), Some(("A", "3")));

        assert_eq!(headers.remove("A"), Some("3".to_owned()));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn into_header_map() {
        let headers: Headers = [("X-One", "1"), ("X-Two", "2")].into_iter().collect();

        let map = HeaderMap::try_from(&headers).unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("x-one"), Some(&HeaderValue::from_static("1")));
    }
}
