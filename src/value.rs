//! Typed literal values and their canonical HCL token form.

use crate::syntax::is_identifier;
use crate::token::{Token, TokenKind, Tokens};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A literal value that can be written into a document.
///
/// Deserializes untagged, so edit scripts can state values directly
/// (`value = 3`, `value = ["a", "b"]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Render the value as tokens. The first token carries no leading
    /// whitespace; callers position it.
    pub fn to_tokens(&self) -> Tokens {
        let mut tokens = Tokens::new();
        append_value_tokens(self, &mut tokens);
        tokens
    }
}

fn append_value_tokens(value: &Value, out: &mut Tokens) {
    match value {
        Value::Null => out.push(Token::new(TokenKind::Ident, "null")),
        Value::Bool(b) => out.push(Token::new(
            TokenKind::Ident,
            if *b { "true" } else { "false" },
        )),
        Value::Int(n) => out.push(Token::new(TokenKind::Number, n.to_string())),
        // HCL has no spelling for NaN or infinities.
        Value::Float(f) if !f.is_finite() => out.push(Token::new(TokenKind::Ident, "null")),
        // Debug keeps the fraction of whole numbers, so 1.0 stays a float.
        Value::Float(f) => out.push(Token::new(TokenKind::Number, format!("{f:?}"))),
        Value::String(s) => append_quoted(s, out, 0),
        Value::List(items) => {
            out.push(Token::new(TokenKind::OBrack, "["));
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(Token::new(TokenKind::Comma, ","));
                }
                let mark = out.len();
                append_value_tokens(item, out);
                if idx > 0 {
                    space_token_at(out, mark, 1);
                }
            }
            out.push(Token::new(TokenKind::CBrack, "]"));
        }
        Value::Object(fields) if fields.is_empty() => {
            out.push(Token::new(TokenKind::OBrace, "{"));
            out.push(Token::new(TokenKind::CBrace, "}"));
        }
        Value::Object(fields) => {
            out.push(Token::new(TokenKind::OBrace, "{"));
            for (idx, (key, item)) in fields.iter().enumerate() {
                if idx > 0 {
                    out.push(Token::new(TokenKind::Comma, ","));
                }
                if is_identifier(key) {
                    out.push(Token::new(TokenKind::Ident, key.as_str()).spaced(1));
                } else {
                    append_quoted(key, out, 1);
                }
                out.push(Token::new(TokenKind::Equal, "=").spaced(1));
                let mark = out.len();
                append_value_tokens(item, out);
                space_token_at(out, mark, 1);
            }
            out.push(Token::new(TokenKind::CBrace, "}").spaced(1));
        }
    }
}

fn space_token_at(tokens: &mut Tokens, index: usize, count: usize) {
    if let Some(token) = tokens.get_mut(index) {
        token.whitespace = vec![b' '; count];
    }
}

fn append_quoted(text: &str, out: &mut Tokens, spaces: usize) {
    out.push(Token::new(TokenKind::OQuote, "\"").spaced(spaces));
    out.push(Token::new(TokenKind::QuotedLit, escape_quoted(text)));
    out.push(Token::new(TokenKind::CQuote, "\""));
}

/// Escape text for use inside a quoted string, including the template
/// introducers `${` and `%{`.
pub fn escape_quoted(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                escaped.push(ch);
                escaped.push(ch);
            }
            ch if ch.is_control() => {
                escaped.push_str(&format!("\\u{:04x}", ch as u32));
            }
            other => escaped.push(other),
        }
    }
    escaped
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_tokens())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        Value::Object(fields)
    }
}
