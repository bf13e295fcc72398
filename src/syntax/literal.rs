//! Recovering values and traversals from parsed expression tokens.

use crate::ast::ExpressionKind;
use crate::token::{Token, TokenKind, Tokens};
use crate::traversal::Traversal;
use crate::value::Value;
use std::collections::BTreeMap;

/// Decide what a parsed expression denotes. Anything beyond literals and
/// plain dotted traversals is [`ExpressionKind::Raw`].
pub fn classify(tokens: &Tokens) -> ExpressionKind {
    let significant: Vec<&Token> = tokens
        .iter()
        .filter(|token| !matches!(token.kind, TokenKind::Newline | TokenKind::Comment))
        .collect();

    let mut pos = 0;
    if let Some(value) = parse_value(&significant, &mut pos) {
        if pos == significant.len() {
            return ExpressionKind::Literal(value);
        }
    }
    if let Some(traversal) = parse_traversal(&significant) {
        return ExpressionKind::Traversal(traversal);
    }
    ExpressionKind::Raw
}

fn parse_traversal(tokens: &[&Token]) -> Option<Traversal> {
    let mut segments = Vec::new();
    for (idx, token) in tokens.iter().enumerate() {
        let expected = if idx % 2 == 0 {
            TokenKind::Ident
        } else {
            TokenKind::Dot
        };
        if token.kind != expected {
            return None;
        }
        if expected == TokenKind::Ident {
            segments.push(token.text().into_owned());
        }
    }
    if tokens.len() % 2 == 0 {
        return None;
    }
    Traversal::new(segments).ok()
}

fn parse_value(tokens: &[&Token], pos: &mut usize) -> Option<Value> {
    let token = tokens.get(*pos)?;
    match token.kind {
        TokenKind::Ident => {
            let value = match token.bytes.as_slice() {
                b"true" => Value::Bool(true),
                b"false" => Value::Bool(false),
                b"null" => Value::Null,
                _ => return None,
            };
            *pos += 1;
            Some(value)
        }
        TokenKind::Number => {
            *pos += 1;
            parse_number(&token.text())
        }
        TokenKind::Operator if token.bytes == b"-" => {
            let next = tokens.get(*pos + 1)?;
            if next.kind != TokenKind::Number {
                return None;
            }
            *pos += 2;
            match parse_number(&next.text())? {
                Value::Int(n) => Some(Value::Int(-n)),
                Value::Float(f) => Some(Value::Float(-f)),
                _ => None,
            }
        }
        TokenKind::OQuote => parse_quoted(tokens, pos).map(Value::String),
        TokenKind::OBrack => parse_list(tokens, pos),
        TokenKind::OBrace => parse_object(tokens, pos),
        _ => None,
    }
}

fn parse_number(text: &str) -> Option<Value> {
    if text.contains(['.', 'e', 'E']) {
        return text.parse::<f64>().ok().map(Value::Float);
    }
    match text.parse::<i64>() {
        Ok(n) => Some(Value::Int(n)),
        Err(_) => text.parse::<f64>().ok().map(Value::Float),
    }
}

fn parse_quoted(tokens: &[&Token], pos: &mut usize) -> Option<String> {
    let lit = tokens.get(*pos + 1)?;
    let close = tokens.get(*pos + 2)?;
    if lit.kind != TokenKind::QuotedLit || close.kind != TokenKind::CQuote {
        return None;
    }
    let text = unescape(&lit.text())?;
    *pos += 3;
    Some(text)
}

fn parse_list(tokens: &[&Token], pos: &mut usize) -> Option<Value> {
    *pos += 1;
    let mut items = Vec::new();
    loop {
        match tokens.get(*pos)?.kind {
            TokenKind::CBrack => {
                *pos += 1;
                return Some(Value::List(items));
            }
            _ => items.push(parse_value(tokens, pos)?),
        }
        match tokens.get(*pos)?.kind {
            TokenKind::Comma => *pos += 1,
            TokenKind::CBrack => {}
            _ => return None,
        }
    }
}

fn parse_object(tokens: &[&Token], pos: &mut usize) -> Option<Value> {
    *pos += 1;
    let mut fields = BTreeMap::new();
    loop {
        let token = tokens.get(*pos)?;
        let key = match token.kind {
            TokenKind::CBrace => {
                *pos += 1;
                return Some(Value::Object(fields));
            }
            TokenKind::Ident => {
                *pos += 1;
                token.text().into_owned()
            }
            TokenKind::OQuote => parse_quoted(tokens, pos)?,
            _ => return None,
        };
        match tokens.get(*pos)?.kind {
            TokenKind::Equal | TokenKind::Colon => *pos += 1,
            _ => return None,
        }
        let value = parse_value(tokens, pos)?;
        fields.insert(key, value);
        if tokens.get(*pos)?.kind == TokenKind::Comma {
            *pos += 1;
        }
    }
}

/// Decode the contents of a quoted string. Returns `None` for templates
/// (`${...}`, `%{...}`) and malformed escapes.
pub fn unescape(raw: &str) -> Option<String> {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    let mut idx = 0;
    while idx < chars.len() {
        let ch = chars[idx];
        match ch {
            '\\' => {
                let escape = *chars.get(idx + 1)?;
                idx += 2;
                match escape {
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    '"' => out.push('"'),
                    '\\' => out.push('\\'),
                    'u' | 'U' => {
                        let width = if escape == 'u' { 4 } else { 8 };
                        let hex: String = chars.get(idx..idx + width)?.iter().collect();
                        let code = u32::from_str_radix(&hex, 16).ok()?;
                        out.push(char::from_u32(code)?);
                        idx += width;
                    }
                    _ => return None,
                }
            }
            '$' | '%' => match (chars.get(idx + 1), chars.get(idx + 2)) {
                (Some('{'), _) => return None,
                (Some(next), Some('{')) if *next == ch => {
                    out.push(ch);
                    out.push('{');
                    idx += 3;
                }
                _ => {
                    out.push(ch);
                    idx += 1;
                }
            },
            other => {
                out.push(other);
                idx += 1;
            }
        }
    }
    Some(out)
}
