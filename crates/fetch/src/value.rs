//! The structured values codecs produce and consume.

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

use micro_fetch_http::protocol::{DecodeError, EncodeError};

use crate::codec::XmlElement;
use crate::codec::csv::render_rows;

/// A decoded response body, or a structured request payload.
///
/// Each codec parses into the variant matching its format and serializes the
/// variants it supports. `Text` is what a body falls back to when no codec is
/// registered for its content type.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Text(String),
    Json(serde_json::Value),
    Xml(XmlElement),
    Rows(Vec<Vec<String>>),
    Form(Vec<(String, String)>),
}

impl Value {
    /// Converts any serializable value through its JSON form.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, EncodeError> {
        serde_json::to_value(value).map(Self::from).map_err(|e| EncodeError::serialize("json", e))
    }

    /// Deserializes a `Json`, `Text`, `Form` or `Null` value into `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
        let json = match self {
            Self::Null => serde_json::Value::Null,
            Self::Text(text) => serde_json::Value::String(text.clone()),
            Self::Json(json) => json.clone(),
            Self::Form(pairs) => pairs.iter().map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone()))).collect(),
            Self::Xml(_) | Self::Rows(_) => {
                return Err(DecodeError::new(format!("can not deserialize a {} value", self.shape())));
            }
        };
        serde_json::from_value(json).map_err(|e| DecodeError::with_source("Unable to deserialize response body", e))
    }

    /// A short name of the variant, used in error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Text(_) => "text",
            Self::Json(_) => "json",
            Self::Xml(_) => "xml",
            Self::Rows(_) => "rows",
            Self::Form(_) => "form",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The text of a `Text` value, or of a JSON string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Json(serde_json::Value::String(text)) => Some(text),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(json) => Some(json),
            _ => None,
        }
    }

    pub fn as_xml(&self) -> Option<&XmlElement> {
        match self {
            Self::Xml(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_rows(&self) -> Option<&[Vec<String>]> {
        match self {
            Self::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn as_form(&self) -> Option<&[(String, String)]> {
        match self {
            Self::Form(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// The first value of `key` in a `Form` value.
    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.as_form()?.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

/// JSON `null` and strings map onto `Null` and `Text`; everything else stays JSON.
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::String(text) => Self::Text(text),
            json => Self::Json(json),
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<XmlElement> for Value {
    fn from(element: XmlElement) -> Self {
        Self::Xml(element)
    }
}

impl From<Vec<Vec<String>>> for Value {
    fn from(rows: Vec<Vec<String>>) -> Self {
        Self::Rows(rows)
    }
}

impl From<Vec<(String, String)>> for Value {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self::Form(pairs)
    }
}

/// The literal string form of a value, used when no codec is registered for
/// the send type.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Text(text) => f.write_str(text),
            Self::Json(json) => write!(f, "{json}"),
            Self::Xml(element) => write!(f, "{element}"),
            Self::Rows(rows) => f.write_str(&render_rows(rows, b',')),
            Self::Form(pairs) => {
                let Ok(encoded) = serde_urlencoded::to_string(pairs) else {
                    return Err(fmt::Error);
                };
                f.write_str(&encoded)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn json_scalars_normalize() {
        assert_eq!(Value::from(json!(null)), Value::Null);
        assert_eq!(Value::from(json!("foo")), Value::Text("foo".into()));
        assert_eq!(Value::from(json!([1, 2])), Value::Json(json!([1, 2])));
    }

    #[test]
    fn literal_form() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::from("A payload").to_string(), "A payload");
        assert_eq!(Value::Json(json!({"a": [1, 2]})).to_string(), r#"{"a":[1,2]}"#);
        assert_eq!(Value::Form(vec![("a b".into(), "c&d".into())]).to_string(), "a+b=c%26d");
        assert_eq!(Value::Rows(vec![vec!["a".into(), "b".into()], vec!["c".into()]]).to_string(), "a,b\nc");
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Login {
        user: String,
        remember: String,
    }

    #[test]
    fn deserialize_form_and_json() {
        let form = Value::Form(vec![("user".into(), "nathan".into()), ("remember".into(), "yes".into())]);
        assert_eq!(form.deserialize::<Login>().unwrap(), Login { user: "nathan".into(), remember: "yes".into() });

        let json = Value::Json(json!({"user": "nathan", "remember": "no"}));
        assert_eq!(json.deserialize::<Login>().unwrap().remember, "no");

        assert!(Value::Rows(vec![]).deserialize::<Login>().is_err());
    }

    #[test]
    fn accessors() {
        let form = Value::Form(vec![("k".into(), "v".into())]);
        assert_eq!(form.form_value("k"), Some("v"));
        assert_eq!(form.form_value("missing"), None);
        assert_eq!(form.shape(), "form");

        assert_eq!(Value::Json(json!("s")).as_str(), Some("s"));
        assert!(Value::default().is_null());
    }
}
