//! Recursive-descent parser from tokens to a document tree.
//!
//! The parser never drops a token: blank lines and comments between items
//! become unstructured token runs in the enclosing body, and everything
//! on an item's line (trailing comment, line break) stays with the item.

use crate::ast::{Attribute, Block, Body, Expression, File, Identifier};
use crate::syntax::errors::ParseError;
use crate::syntax::lexer::lex;
use crate::syntax::literal::unescape;
use crate::token::{Token, TokenKind, Tokens};
use std::collections::VecDeque;
use tracing::debug;

/// Parse a whole document.
pub fn parse(src: &str) -> Result<File, ParseError> {
    let mut parser = Parser::new(src);
    let body = parser.parse_body(Vec::new(), None)?;
    let eof = parser
        .bump()
        .unwrap_or_else(|| Token::new(TokenKind::Eof, Vec::<u8>::new()));
    debug!(bytes = src.len(), items = body.items().count(), "parsed document");
    Ok(File::from_parts(body, eof))
}

/// Where an open block started, for error reporting.
struct Enclosing {
    offset: usize,
    type_name: String,
}

struct Parser<'a> {
    src: &'a str,
    tokens: VecDeque<Token>,
    /// Byte offset of the next token, including its leading whitespace.
    offset: usize,
    /// The document's first line break is `\r\n`.
    crlf: bool,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        let crlf = src
            .find('\n')
            .is_some_and(|end| src[..end].ends_with('\r'));
        Self {
            src,
            tokens: lex(src).into(),
            offset: 0,
            crlf,
        }
    }

    fn peek_kind(&self, ahead: usize) -> TokenKind {
        self.tokens
            .get(ahead)
            .map(|token| token.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.pop_front()?;
        self.offset += token.len();
        Some(token)
    }

    /// Byte offset where the next token's own bytes start.
    fn position(&self) -> usize {
        self.offset
            + self
                .tokens
                .front()
                .map(|token| token.whitespace.len())
                .unwrap_or(0)
    }

    fn location(&self, offset: usize) -> (usize, usize) {
        let before = &self.src.as_bytes()[..offset.min(self.src.len())];
        let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
        let line_start = before
            .iter()
            .rposition(|&b| b == b'\n')
            .map(|idx| idx + 1)
            .unwrap_or(0);
        (line, offset - line_start + 1)
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        let (line, column) = self.location(self.position());
        let found = match self.tokens.front() {
            Some(token) if token.kind == TokenKind::Eof => "end of input".to_string(),
            Some(token) if token.kind == TokenKind::Newline => "line break".to_string(),
            Some(token) => format!("'{}'", token.text()),
            None => "end of input".to_string(),
        };
        ParseError::UnexpectedToken {
            line,
            column,
            found,
            expected,
        }
    }

    fn parse_body(
        &mut self,
        indent: Vec<u8>,
        enclosing: Option<&Enclosing>,
    ) -> Result<Body, ParseError> {
        let mut body = Body::with_indent(indent);
        body.set_crlf(self.crlf);
        let mut seen_item = false;

        loop {
            match self.peek_kind(0) {
                TokenKind::Newline | TokenKind::Comment => {
                    let mut run = Tokens::new();
                    while matches!(self.peek_kind(0), TokenKind::Newline | TokenKind::Comment) {
                        if let Some(token) = self.bump() {
                            run.push(token);
                        }
                    }
                    body.append_unstructured_tokens(run);
                }
                TokenKind::Eof => match enclosing {
                    Some(block) => {
                        let (line, column) = self.location(block.offset);
                        return Err(ParseError::UnclosedBlock {
                            line,
                            column,
                            type_name: block.type_name.clone(),
                        });
                    }
                    None => break,
                },
                TokenKind::CBrace if enclosing.is_some() => break,
                TokenKind::Ident => {
                    if !seen_item {
                        if let Some(token) = self.tokens.front() {
                            body.set_indent(token.whitespace.clone());
                        }
                        seen_item = true;
                    }
                    if self.peek_kind(1) == TokenKind::Equal {
                        let attr = self.parse_attribute()?;
                        body.append_item(attr);
                    } else {
                        let block = self.parse_block()?;
                        body.append_item(block);
                    }
                }
                _ => return Err(self.unexpected("attribute or block")),
            }
        }
        Ok(body)
    }

    fn take_identifier(&mut self) -> Result<Identifier, ParseError> {
        if self.peek_kind(0) != TokenKind::Ident {
            return Err(self.unexpected("identifier"));
        }
        match self.bump() {
            Some(token) => Ok(Identifier::from_token(token)),
            None => Err(self.unexpected("identifier")),
        }
    }

    fn take(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token, ParseError> {
        if self.peek_kind(0) != kind {
            return Err(self.unexpected(expected));
        }
        self.bump().ok_or_else(|| self.unexpected(expected))
    }

    fn parse_attribute(&mut self) -> Result<Attribute, ParseError> {
        let name_offset = self.position();
        let name = self.take_identifier()?;
        let equals = Tokens::from(self.take(TokenKind::Equal, "'='")?);
        let tokens = self.expression_tokens()?;
        if tokens.is_empty() {
            let (line, column) = self.location(name_offset);
            return Err(ParseError::MissingExpression {
                line,
                column,
                name: name.name().into_owned(),
            });
        }
        let trailing = self.line_end();
        Ok(Attribute::from_parts(
            name,
            equals,
            Expression::from_tokens(tokens),
            trailing,
        ))
    }

    /// Tokens up to the end of the line, or the closing brace of an inline
    /// block, tracking brackets so multi-line collections stay whole.
    fn expression_tokens(&mut self) -> Result<Tokens, ParseError> {
        let mut tokens = Tokens::new();
        let mut open: Vec<(TokenKind, usize)> = Vec::new();

        loop {
            let kind = self.peek_kind(0);
            if open.is_empty()
                && matches!(
                    kind,
                    TokenKind::Newline | TokenKind::Comment | TokenKind::CBrace | TokenKind::Eof
                )
            {
                break;
            }
            match kind {
                TokenKind::Eof => {
                    let offset = open.last().map(|(_, offset)| *offset).unwrap_or(self.offset);
                    let (line, column) = self.location(offset);
                    return Err(ParseError::UnclosedBracket { line, column });
                }
                TokenKind::Invalid => return Err(self.unexpected("expression")),
                kind if kind.is_open_bracket() => open.push((kind, self.position())),
                kind if kind.is_close_bracket() => {
                    let matching = match kind {
                        TokenKind::CBrace => TokenKind::OBrace,
                        TokenKind::CBrack => TokenKind::OBrack,
                        _ => TokenKind::OParen,
                    };
                    match open.pop() {
                        Some((opened, _)) if opened == matching => {}
                        _ => return Err(self.unexpected("matching bracket")),
                    }
                }
                _ => {}
            }
            if let Some(token) = self.bump() {
                tokens.push(token);
            }
        }
        Ok(tokens)
    }

    /// Trailing comments and the line break that end an item, if present.
    fn line_end(&mut self) -> Tokens {
        let mut tokens = Tokens::new();
        while self.peek_kind(0) == TokenKind::Comment {
            if let Some(token) = self.bump() {
                tokens.push(token);
            }
        }
        if self.peek_kind(0) == TokenKind::Newline {
            if let Some(token) = self.bump() {
                tokens.push(token);
            }
        }
        tokens
    }

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let block_offset = self.position();
        let type_name = self.take_identifier()?;

        let mut label_tokens = Tokens::new();
        let mut labels = Vec::new();
        loop {
            match self.peek_kind(0) {
                TokenKind::OQuote => {
                    let label_offset = self.position();
                    let open = self.take(TokenKind::OQuote, "'\"'")?;
                    let lit = self.take(TokenKind::QuotedLit, "label text")?;
                    let close = self.take(TokenKind::CQuote, "'\"'")?;
                    let label = unescape(&lit.text()).ok_or_else(|| {
                        let (line, column) = self.location(label_offset);
                        ParseError::InvalidLabel {
                            line,
                            column,
                            label: format!("\"{}\"", lit.text()),
                        }
                    })?;
                    labels.push(label);
                    label_tokens.extend([open, lit, close]);
                }
                TokenKind::Ident => {
                    let token = self.take(TokenKind::Ident, "label")?;
                    labels.push(token.text().into_owned());
                    label_tokens.push(token);
                }
                TokenKind::OBrace => break,
                _ => return Err(self.unexpected("block label or '{'")),
            }
        }

        let mut open = Tokens::from(self.take(TokenKind::OBrace, "'{'")?);
        let starts_inline = self.peek_kind(0) != TokenKind::Newline;
        if !starts_inline {
            if let Some(token) = self.bump() {
                open.push(token);
            }
        }

        let mut indent = type_name.token().whitespace.clone();
        indent.extend_from_slice(b"  ");
        let enclosing = Enclosing {
            offset: block_offset,
            type_name: type_name.name().into_owned(),
        };
        let mut body = self.parse_body(indent.clone(), Some(&enclosing))?;
        if starts_inline {
            // Items sharing the brace's line say nothing about indentation.
            body.set_indent(indent);
            body.set_starts_inline(true);
        }

        let mut close = Tokens::from(self.take(TokenKind::CBrace, "'}'")?);
        close.extend(self.line_end());

        Ok(Block::from_parts(
            type_name,
            label_tokens,
            labels,
            open,
            body,
            close,
        ))
    }
}
