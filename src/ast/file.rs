use crate::ast::Body;
use crate::syntax::{self, ParseError};
use crate::token::{Token, TokenKind};
use std::fmt;

/// A whole document: the root body plus whatever trails it.
#[derive(Debug, Clone)]
pub struct File {
    body: Body,
    eof: Token,
}

impl File {
    /// An empty document.
    pub fn new() -> Self {
        Self {
            body: Body::new(),
            eof: Token::new(TokenKind::Eof, Vec::<u8>::new()),
        }
    }

    /// Parse source text. Serializing the result unmodified reproduces
    /// `src` byte for byte.
    pub fn parse(src: &str) -> Result<Self, ParseError> {
        syntax::parse(src)
    }

    pub(crate) fn from_parts(body: Body, eof: Token) -> Self {
        Self { body, eof }
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        self.body.write_to(out);
        self.eof.write_to(out);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_to(&mut out);
        out
    }
}

impl Default for File {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.to_bytes()))
    }
}
