use bytes::Bytes;
use micro_fetch_http::protocol::{DecodeError, EncodeError};
use thiserror::Error;

use crate::Value;
use crate::codec::Codec;

const PARSE_ERROR: &str = "Unable to parse response as CSV";

/// `text/csv` codec.
///
/// Parses into rows of string fields. Fields may be quoted with `"`, and a
/// doubled quote inside a quoted field is a literal quote. No value is
/// converted: `"40.0"` stays the string `40.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvCodec {
    delimiter: u8,
}

impl Default for CsvCodec {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `delimiter` between fields.
    ///
    /// # Errors
    ///
    /// The delimiter must be an ASCII byte other than `"`, `\r` and `\n`.
    pub fn with_delimiter(mut self, delimiter: u8) -> Result<Self, InvalidDelimiter> {
        if !delimiter.is_ascii() || matches!(delimiter, b'"' | b'\r' | b'\n') {
            return Err(InvalidDelimiter { delimiter });
        }
        self.delimiter = delimiter;
        Ok(self)
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid csv delimiter {delimiter:#04x}")]
pub struct InvalidDelimiter {
    delimiter: u8,
}

impl Codec for CsvCodec {
    fn serialize(&self, value: &Value) -> Result<Bytes, EncodeError> {
        match value {
            Value::Null => Ok(Bytes::new()),
            Value::Rows(rows) => Ok(Bytes::from(render_rows(rows, self.delimiter))),
            other => Err(EncodeError::unsupported_shape("csv", other.shape())),
        }
    }

    fn parse(&self, body: &str) -> Result<Value, DecodeError> {
        if body.is_empty() {
            return Ok(Value::Null);
        }
        parse_rows(body, char::from(self.delimiter)).map(Value::Rows)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    FieldStart,
    Unquoted,
    Quoted,
    /// A quote inside a quoted field: either the closing quote or the first
    /// half of an escaped one.
    QuoteInQuoted,
}

fn parse_rows(body: &str, delimiter: char) -> Result<Vec<Vec<String>>, DecodeError> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut state = State::FieldStart;

    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        match (state, c) {
            (State::Quoted, '"') => state = State::QuoteInQuoted,
            (State::Quoted, c) => field.push(c),
            (State::QuoteInQuoted, '"') => {
                field.push('"');
                state = State::Quoted;
            }
            (State::FieldStart, '"') => state = State::Quoted,
            (_, c) if c == delimiter => {
                row.push(std::mem::take(&mut field));
                state = State::FieldStart;
            }
            (_, '\r' | '\n') => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
                state = State::FieldStart;
            }
            (State::QuoteInQuoted, _) => return Err(DecodeError::new(PARSE_ERROR)),
            (State::FieldStart | State::Unquoted, c) => {
                field.push(c);
                state = State::Unquoted;
            }
        }
    }

    match state {
        State::Quoted => return Err(DecodeError::new(PARSE_ERROR)),
        // a trailing line terminator does not open another row
        State::FieldStart if row.is_empty() => {}
        _ => {
            row.push(field);
            rows.push(row);
        }
    }
    Ok(rows)
}

/// Renders rows with `delimiter`, one row per `\n` separated line.
pub(crate) fn render_rows(rows: &[Vec<String>], delimiter: u8) -> String {
    let delimiter = char::from(delimiter);
    let mut out = String::new();
    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for (j, field) in row.iter().enumerate() {
            if j > 0 {
                out.push(delimiter);
            }
            push_field(&mut out, field, delimiter);
        }
    }
    out
}

fn push_field(out: &mut String, field: &str, delimiter: char) {
    if !field.contains([delimiter, '"', '\r', '\n']) {
        out.push_str(field);
        return;
    }
    out.push('"');
    out.push_str(&field.replace('"', "\"\""));
    out.push('"');
}
