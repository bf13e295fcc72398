//! Absolute symbol references such as `var.region` or `aws_vpc.main.id`.

use crate::syntax::is_identifier;
use crate::token::{Token, TokenKind, Tokens};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraversalError {
    #[error("traversal must have at least one segment")]
    Empty,

    #[error("invalid traversal segment '{segment}': not an identifier")]
    InvalidSegment { segment: String },
}

/// An ordered chain of identifier segments starting at a root symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Traversal {
    segments: Vec<String>,
}

impl Traversal {
    pub fn new<I, S>(segments: I) -> Result<Self, TraversalError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(TraversalError::Empty);
        }
        if let Some(bad) = segments.iter().find(|segment| !is_identifier(segment)) {
            return Err(TraversalError::InvalidSegment {
                segment: bad.clone(),
            });
        }
        Ok(Self { segments })
    }

    /// Parse dotted notation: `var.region`.
    pub fn parse(input: &str) -> Result<Self, TraversalError> {
        if input.trim().is_empty() {
            return Err(TraversalError::Empty);
        }
        Self::new(input.split('.'))
    }

    pub fn root_name(&self) -> &str {
        &self.segments[0]
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// One identifier per segment, joined by `.` accessors.
    pub fn to_tokens(&self) -> Tokens {
        let mut tokens = Tokens::new();
        for (idx, segment) in self.segments.iter().enumerate() {
            if idx > 0 {
                tokens.push(Token::new(TokenKind::Dot, "."));
            }
            tokens.push(Token::new(TokenKind::Ident, segment.as_str()));
        }
        tokens
    }
}

impl FromStr for Traversal {
    type Err = TraversalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Traversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}
