use crate::token::{Token, TokenKind};

/// A name token: attribute names and block type names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    token: Token,
}

impl Identifier {
    pub fn new(name: &str) -> Self {
        Self {
            token: Token::new(TokenKind::Ident, name),
        }
    }

    pub fn from_token(token: Token) -> Self {
        Self { token }
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn name(&self) -> std::borrow::Cow<'_, str> {
        self.token.text()
    }

    /// Exact, byte-wise name comparison.
    pub fn has_name(&self, name: &str) -> bool {
        self.token.bytes == name.as_bytes()
    }

    pub(crate) fn set_whitespace(&mut self, whitespace: Vec<u8>) {
        self.token.whitespace = whitespace;
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        self.token.write_to(out);
    }
}
