use crate::ast::{Body, Identifier};
use crate::token::{Token, TokenKind, Tokens};
use crate::tree::{NodeContent, NodeId, Nodes};
use crate::value::escape_quoted;

/// A `type "label" ... { body }` item. Always owns exactly one body.
#[derive(Debug, Clone)]
pub struct Block {
    children: Nodes,
    type_name: NodeId,
    labels: Vec<String>,
    body: NodeId,
}

impl Block {
    /// Build an empty block at the given indentation. The nested body
    /// indents two spaces further and keeps the same line endings.
    pub(crate) fn new(type_name: &str, labels: Vec<String>, indent: &[u8], crlf: bool) -> Self {
        let mut ident = Identifier::new(type_name);
        ident.set_whitespace(indent.to_vec());

        let mut label_tokens = Tokens::new();
        for label in &labels {
            label_tokens.push(Token::new(TokenKind::OQuote, "\"").spaced(1));
            label_tokens.push(Token::new(TokenKind::QuotedLit, escape_quoted(label)));
            label_tokens.push(Token::new(TokenKind::CQuote, "\""));
        }

        let mut body_indent = indent.to_vec();
        body_indent.extend_from_slice(b"  ");

        let mut body = Body::with_indent(body_indent);
        body.set_crlf(crlf);

        let mut children = Nodes::new();
        let type_name = children.append(ident);
        children.append(label_tokens);
        children.append(Tokens::from(vec![
            Token::new(TokenKind::OBrace, "{").spaced(1),
            Token::line_break(crlf),
        ]));
        let body = children.append(body);
        children.append(Tokens::from(vec![
            Token::new(TokenKind::CBrace, "}").with_whitespace(indent.to_vec()),
            Token::line_break(crlf),
        ]));

        Self {
            children,
            type_name,
            labels,
            body,
        }
    }

    /// Assemble a block from parsed pieces.
    pub(crate) fn from_parts(
        type_name: Identifier,
        label_tokens: Tokens,
        labels: Vec<String>,
        open: Tokens,
        body: Body,
        close: Tokens,
    ) -> Self {
        let mut children = Nodes::new();
        let type_name = children.append(type_name);
        if !label_tokens.is_empty() {
            children.append(label_tokens);
        }
        children.append(open);
        let body = children.append(body);
        children.append(close);
        Self {
            children,
            type_name,
            labels,
            body,
        }
    }

    fn identifier(&self) -> &Identifier {
        match self.children.get(self.type_name).map(|node| node.content()) {
            Some(NodeContent::Identifier(ident)) => ident,
            _ => panic!("block type slot {} lost its identifier", self.type_name),
        }
    }

    pub fn type_name(&self) -> String {
        self.identifier().name().into_owned()
    }

    /// Whitespace in front of the type name.
    pub fn indent(&self) -> &[u8] {
        &self.identifier().token().whitespace
    }

    pub(crate) fn set_indent(&mut self, indent: Vec<u8>) {
        let slot = self.type_name;
        if let Some(NodeContent::Identifier(ident)) =
            self.children.get_mut(slot).map(|node| node.content_mut())
        {
            ident.set_whitespace(indent);
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Whether the type name and every label match exactly.
    pub fn matches<S: AsRef<str>>(&self, type_name: &str, labels: &[S]) -> bool {
        self.identifier().has_name(type_name)
            && self.labels.len() == labels.len()
            && self
                .labels
                .iter()
                .zip(labels)
                .all(|(have, want)| have == want.as_ref())
    }

    pub fn body(&self) -> &Body {
        match self.children.get(self.body).map(|node| node.content()) {
            Some(NodeContent::Body(body)) => body,
            _ => panic!("block body slot {} lost its body", self.body),
        }
    }

    pub fn body_mut(&mut self) -> &mut Body {
        let slot = self.body;
        match self.children.get_mut(slot).map(|node| node.content_mut()) {
            Some(NodeContent::Body(body)) => body,
            _ => panic!("block body slot {slot} lost its body"),
        }
    }

    pub fn children(&self) -> &Nodes {
        &self.children
    }

    /// Once a one-line body has been broken open, the closing brace goes
    /// on its own line at the block's indent.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        if !self.body().is_reflowed() {
            self.children.write_to(out);
            return;
        }
        let mut close_next = false;
        for node in self.children.iter() {
            match node.content() {
                NodeContent::Tokens(close) if close_next => {
                    let mut close = close.clone();
                    if let Some(brace) = close.first_mut() {
                        brace.whitespace = self.indent().to_vec();
                    }
                    close.write_to(out);
                    close_next = false;
                }
                content => {
                    content.write_to(out);
                    close_next = node.id() == self.body;
                }
            }
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_to(&mut out);
        out
    }
}
