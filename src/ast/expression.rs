use crate::syntax::literal;
use crate::token::Tokens;
use crate::traversal::Traversal;
use crate::value::Value;

/// What an expression is known to denote.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Literal(Value),
    Traversal(Traversal),
    /// Parsed source this crate does not interpret (function calls,
    /// operators, templates). Kept verbatim.
    Raw,
}

/// A value-producing subtree.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    kind: ExpressionKind,
    tokens: Tokens,
}

impl Expression {
    pub fn literal(value: impl Into<Value>) -> Self {
        let value = value.into();
        Self {
            tokens: value.to_tokens(),
            kind: ExpressionKind::Literal(value),
        }
    }

    pub fn traversal(traversal: Traversal) -> Self {
        Self {
            tokens: traversal.to_tokens(),
            kind: ExpressionKind::Traversal(traversal),
        }
    }

    /// Wrap parsed tokens, recognising literals and simple traversals.
    pub fn from_tokens(tokens: Tokens) -> Self {
        let kind = literal::classify(&tokens);
        Self { kind, tokens }
    }

    pub fn kind(&self) -> &ExpressionKind {
        &self.kind
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match &self.kind {
            ExpressionKind::Literal(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_traversal(&self) -> Option<&Traversal> {
        match &self.kind {
            ExpressionKind::Traversal(traversal) => Some(traversal),
            _ => None,
        }
    }

    pub fn tokens(&self) -> &Tokens {
        &self.tokens
    }

    /// Leading whitespace of the first token.
    pub fn leading_whitespace(&self) -> &[u8] {
        self.tokens
            .first()
            .map(|token| token.whitespace.as_slice())
            .unwrap_or_default()
    }

    pub(crate) fn set_leading_whitespace(&mut self, whitespace: Vec<u8>) {
        if let Some(first) = self.tokens.first_mut() {
            first.whitespace = whitespace;
        }
    }

    /// Source text without the leading whitespace.
    pub fn source(&self) -> String {
        let rendered = self.tokens.to_bytes();
        let skip = self.leading_whitespace().len();
        String::from_utf8_lossy(&rendered[skip..]).into_owned()
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        self.tokens.write_to(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_keeps_value_and_tokens() {
        let expr = Expression::literal(5);
        assert_eq!(expr.as_literal(), Some(&Value::Int(5)));
        assert_eq!(expr.source(), "5");
        assert!(expr.as_traversal().is_none());
    }

    #[test]
    fn traversal_renders_dotted() {
        let expr = Expression::traversal(Traversal::parse("var.ami").unwrap());
        assert_eq!(expr.source(), "var.ami");
        assert_eq!(expr.as_traversal().unwrap().root_name(), "var");
    }

    #[test]
    fn leading_whitespace_is_positional() {
        let mut expr = Expression::literal("x");
        expr.set_leading_whitespace(b"  ".to_vec());
        assert_eq!(expr.leading_whitespace(), b"  ");
        assert_eq!(expr.source(), "\"x\"");
    }
}
