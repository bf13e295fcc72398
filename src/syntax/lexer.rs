//! Lossless lexer built on logos.
//!
//! Every input byte ends up in exactly one token, either as token bytes
//! or as the whitespace in front of a token, so concatenating the output
//! reproduces the input.

use crate::token::{Token, TokenKind};
use logos::Logos;
use tracing::trace;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Lexeme {
    #[regex(r"[ \t]+")]
    Whitespace,

    #[regex(r"\r?\n")]
    Newline,

    #[regex(r"#[^\r\n]*")]
    #[regex(r"//[^\r\n]*")]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_\-]*")]
    Ident,

    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+\-]?[0-9]+)?")]
    Number,

    #[regex(r#""([^"\\\r\n]|\\[^\r\n])*""#)]
    QuotedString,

    #[token("=")]
    Equal,
    #[token("{")]
    OBrace,
    #[token("}")]
    CBrace,
    #[token("[")]
    OBrack,
    #[token("]")]
    CBrack,
    #[token("(")]
    OParen,
    #[token(")")]
    CParen,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,
    #[token("*")]
    Star,

    #[token("==")]
    #[token("!=")]
    #[token("<=")]
    #[token(">=")]
    #[token("&&")]
    #[token("||")]
    #[token("=>")]
    #[token("...")]
    #[token("+")]
    #[token("-")]
    #[token("/")]
    #[token("%")]
    #[token("<")]
    #[token(">")]
    #[token("!")]
    Operator,
}

/// Consume a `/* */` comment up to the first `*/`. An unterminated
/// comment swallows the rest of the input and lexes as invalid.
fn block_comment(lex: &mut logos::Lexer<Lexeme>) -> bool {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => {
            lex.bump(lex.remainder().len());
            false
        }
    }
}

impl Lexeme {
    fn kind(self) -> TokenKind {
        match self {
            Lexeme::Whitespace => unreachable!("whitespace is folded into the next token"),
            Lexeme::QuotedString => unreachable!("quoted strings are split into three tokens"),
            Lexeme::Newline => TokenKind::Newline,
            Lexeme::LineComment | Lexeme::BlockComment => TokenKind::Comment,
            Lexeme::Ident => TokenKind::Ident,
            Lexeme::Number => TokenKind::Number,
            Lexeme::Equal => TokenKind::Equal,
            Lexeme::OBrace => TokenKind::OBrace,
            Lexeme::CBrace => TokenKind::CBrace,
            Lexeme::OBrack => TokenKind::OBrack,
            Lexeme::CBrack => TokenKind::CBrack,
            Lexeme::OParen => TokenKind::OParen,
            Lexeme::CParen => TokenKind::CParen,
            Lexeme::Comma => TokenKind::Comma,
            Lexeme::Dot => TokenKind::Dot,
            Lexeme::Colon => TokenKind::Colon,
            Lexeme::Question => TokenKind::Question,
            Lexeme::Star => TokenKind::Star,
            Lexeme::Operator => TokenKind::Operator,
        }
    }
}

/// Tokenize `src`. The last token is always [`TokenKind::Eof`], carrying
/// any trailing whitespace.
pub fn lex(src: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut whitespace = Vec::new();
    let mut lexer = Lexeme::lexer(src);

    while let Some(result) = lexer.next() {
        let slice = lexer.slice();
        let kind = match result {
            Ok(Lexeme::Whitespace) => {
                whitespace.extend_from_slice(slice.as_bytes());
                continue;
            }
            Ok(Lexeme::QuotedString) => {
                let inner = &slice[1..slice.len() - 1];
                tokens.push(
                    Token::new(TokenKind::OQuote, "\"")
                        .with_whitespace(std::mem::take(&mut whitespace)),
                );
                tokens.push(Token::new(TokenKind::QuotedLit, inner));
                tokens.push(Token::new(TokenKind::CQuote, "\""));
                continue;
            }
            Ok(lexeme) => lexeme.kind(),
            Err(()) => {
                trace!(span = ?lexer.span(), "unrecognised input");
                TokenKind::Invalid
            }
        };
        tokens.push(Token::new(kind, slice).with_whitespace(std::mem::take(&mut whitespace)));
    }

    tokens.push(Token::new(TokenKind::Eof, Vec::<u8>::new()).with_whitespace(whitespace));
    trace!(count = tokens.len(), "lexed");
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        lex(src).into_iter().map(|token| token.kind).collect()
    }

    fn rebuild(src: &str) -> String {
        let mut out = Vec::new();
        for token in lex(src) {
            token.write_to(&mut out);
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn lexes_attribute_line() {
        assert_eq!(
            kinds("count = 5 # five\n"),
            vec![
                TokenKind::Ident,
                TokenKind::Equal,
                TokenKind::Number,
                TokenKind::Comment,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn splits_quoted_strings() {
        let tokens = lex(r#"name = "a \"b\"""#);
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident,
                TokenKind::Equal,
                TokenKind::OQuote,
                TokenKind::QuotedLit,
                TokenKind::CQuote,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[3].bytes, br#"a \"b\""#);
        assert_eq!(tokens[2].whitespace, b" ");
    }

    #[test]
    fn operators_and_comments() {
        assert_eq!(
            kinds("a == b // c\n/* d */"),
            vec![
                TokenKind::Ident,
                TokenKind::Operator,
                TokenKind::Ident,
                TokenKind::Comment,
                TokenKind::Newline,
                TokenKind::Comment,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn block_comments_span_lines() {
        let tokens = lex("/* a * b\n ** c */ x /***/\n");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Comment,
                TokenKind::Ident,
                TokenKind::Comment,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[0].bytes, b"/* a * b\n ** c */");
        assert_eq!(tokens[2].bytes, b"/***/");
    }

    #[test]
    fn unterminated_block_comment_is_invalid() {
        let tokens = lex("a = 1\n/* open\nb = 2\n");
        let last = &tokens[tokens.len() - 2];
        assert_eq!(last.kind, TokenKind::Invalid);
        assert_eq!(last.bytes, b"/* open\nb = 2\n");
    }

    #[test]
    fn reproduces_input_exactly() {
        for src in [
            "",
            "  \t\n",
            "a\t=  1\r\n",
            "resource \"x\" \"y\" {\n\tlist = [1, 2,\n  3]\n}\n  ",
            "weird = @@ ~ \"unterminated\n",
            "/* multi\n * line */\nx = 1 /* tail */\n",
            "/* never closed\n",
        ] {
            assert_eq!(rebuild(src), src);
        }
    }
}
