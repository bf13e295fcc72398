//! Lexical tokens: the leaf content of every document tree.
//!
//! A token owns its source bytes plus the horizontal whitespace that
//! preceded it, so concatenating tokens in order reproduces the input
//! exactly.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Ident,
    Number,
    /// Opening `"` of a quoted string.
    OQuote,
    /// Raw (still escaped) contents of a quoted string.
    QuotedLit,
    /// Closing `"` of a quoted string.
    CQuote,
    Equal,
    OBrace,
    CBrace,
    OBrack,
    CBrack,
    OParen,
    CParen,
    Comma,
    Dot,
    Colon,
    Question,
    Star,
    /// Arithmetic, comparison and logical operators.
    Operator,
    /// Line (`#`, `//`) or block (`/* */`) comment, without the line break.
    Comment,
    Newline,
    /// Input the lexer could not classify; kept so nothing is lost.
    Invalid,
    /// End of input. Carries any trailing whitespace and no bytes.
    Eof,
}

impl TokenKind {
    /// Whether this token opens a bracketed region.
    pub fn is_open_bracket(self) -> bool {
        matches!(self, TokenKind::OBrace | TokenKind::OBrack | TokenKind::OParen)
    }

    pub fn is_close_bracket(self) -> bool {
        matches!(self, TokenKind::CBrace | TokenKind::CBrack | TokenKind::CParen)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub bytes: Vec<u8>,
    /// Spaces and tabs between the previous token and this one.
    pub whitespace: Vec<u8>,
}

impl Token {
    pub fn new(kind: TokenKind, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            bytes: bytes.into(),
            whitespace: Vec::new(),
        }
    }

    /// Builder: precede the token with `count` spaces.
    pub fn spaced(mut self, count: usize) -> Self {
        self.whitespace = vec![b' '; count];
        self
    }

    /// Builder: precede the token with the given whitespace bytes.
    pub fn with_whitespace(mut self, whitespace: impl Into<Vec<u8>>) -> Self {
        self.whitespace = whitespace.into();
        self
    }

    pub fn newline() -> Self {
        Self::new(TokenKind::Newline, b"\n".to_vec())
    }

    /// A line break in the given style: `\r\n` or `\n`.
    pub fn line_break(crlf: bool) -> Self {
        if crlf {
            Self::new(TokenKind::Newline, b"\r\n".to_vec())
        } else {
            Self::newline()
        }
    }

    /// Token text. Tokens only ever hold bytes cut from UTF-8 input or
    /// generated from Rust strings, so this is lossless in practice.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.whitespace.len() + self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.whitespace);
        out.extend_from_slice(&self.bytes);
    }
}

/// An ordered run of tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens(Vec<Token>);

impl Tokens {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, token: Token) {
        self.0.push(token);
    }

    pub fn extend(&mut self, tokens: impl IntoIterator<Item = Token>) {
        self.0.extend(tokens);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&Token> {
        self.0.first()
    }

    pub fn first_mut(&mut self) -> Option<&mut Token> {
        self.0.first_mut()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Token> {
        self.0.get_mut(index)
    }

    pub fn last(&self) -> Option<&Token> {
        self.0.last()
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        for token in &self.0 {
            token.write_to(out);
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_to(&mut out);
        out
    }
}

impl From<Vec<Token>> for Tokens {
    fn from(tokens: Vec<Token>) -> Self {
        Self(tokens)
    }
}

impl From<Token> for Tokens {
    fn from(token: Token) -> Self {
        Self(vec![token])
    }
}

impl FromIterator<Token> for Tokens {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Tokens {
    type Item = Token;
    type IntoIter = std::vec::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Tokens {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Tokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.to_bytes()))
    }
}
