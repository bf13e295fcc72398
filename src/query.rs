//! Dotted addressing of nested blocks.
//!
//! `resource.aws_instance.web` selects the block of type `resource` with
//! labels `aws_instance` and `web`. Parts containing dots or spaces can be
//! quoted: `module."vpc.v2"`.

use crate::ast::{Block, Body};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("invalid block selector '{input}': {message}")]
    InvalidSelector { input: String, message: String },

    #[error("no block matches '{selector}'")]
    NoMatch { selector: String },
}

/// A block type plus its exact labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockSelector {
    type_name: String,
    labels: Vec<String>,
}

impl BlockSelector {
    pub fn new<I, S>(type_name: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            type_name: type_name.into(),
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, QueryError> {
        let mut parts = parse_dotted_path(input)?.into_iter();
        let type_name = parts.next().ok_or_else(|| QueryError::InvalidSelector {
            input: input.to_string(),
            message: "empty selector".to_string(),
        })?;
        Ok(Self {
            type_name,
            labels: parts.collect(),
        })
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn find<'a>(&self, body: &'a Body) -> Option<&'a Block> {
        body.first_matching_block(&self.type_name, self.labels.as_slice())
    }

    pub fn find_mut<'a>(&self, body: &'a mut Body) -> Option<&'a mut Block> {
        body.first_matching_block_mut(&self.type_name, self.labels.as_slice())
    }
}

impl FromStr for BlockSelector {
    type Err = QueryError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::parse(input)
    }
}

impl fmt::Display for BlockSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name)?;
        for label in &self.labels {
            if label.is_empty() || label.contains(['.', '"', ' ', '\t']) {
                write!(f, ".\"{}\"", label.replace('\\', "\\\\").replace('"', "\\\""))?;
            } else {
                write!(f, ".{label}")?;
            }
        }
        Ok(())
    }
}

/// A chain of selectors, each applied to the body of the block the
/// previous one found. The empty path addresses the root body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockPath(Vec<BlockSelector>);

impl BlockPath {
    pub fn new(selectors: Vec<BlockSelector>) -> Self {
        Self(selectors)
    }

    pub fn parse_all<I, S>(inputs: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        inputs
            .into_iter()
            .map(|input| BlockSelector::parse(input.as_ref()))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn selectors(&self) -> &[BlockSelector] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn resolve<'a>(&self, root: &'a Body) -> Result<&'a Body, QueryError> {
        let mut body = root;
        for selector in &self.0 {
            body = selector
                .find(body)
                .ok_or_else(|| QueryError::NoMatch {
                    selector: selector.to_string(),
                })?
                .body();
        }
        Ok(body)
    }

    pub fn resolve_mut<'a>(&self, root: &'a mut Body) -> Result<&'a mut Body, QueryError> {
        let mut body = root;
        for selector in &self.0 {
            body = selector
                .find_mut(body)
                .ok_or_else(|| QueryError::NoMatch {
                    selector: selector.to_string(),
                })?
                .body_mut();
        }
        Ok(body)
    }
}

impl fmt::Display for BlockPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join(" > "))
    }
}

fn parse_dotted_path(input: &str) -> Result<Vec<String>, QueryError> {
    let invalid = |message: &str| QueryError::InvalidSelector {
        input: input.to_string(),
        message: message.to_string(),
    };

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut in_quotes = false;
    let mut chars = input.chars();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' => in_quotes = false,
                '\\' => match chars.next() {
                    Some('n') => current.push('\n'),
                    Some('t') => current.push('\t'),
                    Some(other) => current.push(other),
                    None => return Err(invalid("dangling escape")),
                },
                other => current.push(other),
            }
            continue;
        }

        match ch {
            '.' => {
                if current.is_empty() && !quoted {
                    return Err(invalid("empty path segment"));
                }
                parts.push(std::mem::take(&mut current));
                quoted = false;
            }
            '"' => {
                if !current.is_empty() || quoted {
                    return Err(invalid("unexpected quote inside segment"));
                }
                in_quotes = true;
                quoted = true;
            }
            ch if ch.is_whitespace() => return Err(invalid("whitespace outside quotes")),
            other => {
                if quoted {
                    return Err(invalid("text after closing quote"));
                }
                current.push(other);
            }
        }
    }

    if in_quotes {
        return Err(invalid("unterminated quoted segment"));
    }
    if current.is_empty() && !quoted {
        if parts.is_empty() {
            return Ok(parts);
        }
        return Err(invalid("empty path segment"));
    }
    parts.push(current);
    Ok(parts)
}
