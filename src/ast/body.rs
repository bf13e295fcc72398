use crate::ast::{Attribute, Block, Expression};
use crate::token::{Token, TokenKind, Tokens};
use crate::traversal::Traversal;
use crate::tree::{Node, NodeContent, NodeId, Nodes};
use crate::value::Value;
use indexmap::IndexSet;
use tracing::debug;

/// An attribute or block addressed through a body's item index.
#[derive(Debug, Clone, Copy)]
pub enum Item<'a> {
    Attribute(&'a Attribute),
    Block(&'a Block),
}

/// One nested scope: the ownership tree of its content plus the index of
/// which nodes are addressable items.
///
/// Name lookups walk the tree, not the index, so when two items share a
/// name the one earlier in the document wins.
#[derive(Debug, Clone, Default)]
pub struct Body {
    children: Nodes,
    items: IndexSet<NodeId>,
    indent: Vec<u8>,
    /// The body opened on the same line as its `{`, so the first
    /// generated item needs a line break in front of it.
    starts_inline: bool,
    /// A one-line body was spread over several lines to take a new item.
    reflowed: bool,
    /// Line ending for generated lines when the body holds none yet.
    crlf: bool,
}

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_indent(indent: Vec<u8>) -> Self {
        Self {
            indent,
            ..Self::default()
        }
    }

    pub(crate) fn set_indent(&mut self, indent: Vec<u8>) {
        self.indent = indent;
    }

    pub(crate) fn set_starts_inline(&mut self, inline: bool) {
        self.starts_inline = inline;
    }

    pub(crate) fn set_crlf(&mut self, crlf: bool) {
        self.crlf = crlf;
    }

    pub(crate) fn is_reflowed(&self) -> bool {
        self.reflowed
    }

    /// Whitespace placed before generated items.
    pub fn indent(&self) -> &[u8] {
        &self.indent
    }

    pub fn children(&self) -> &Nodes {
        &self.children
    }

    pub(crate) fn append_item(&mut self, content: impl Into<NodeContent>) -> NodeId {
        self.append_item_node(Node::new(content))
    }

    /// Attach an existing node as an item.
    ///
    /// # Panics
    ///
    /// If the node is already attached to a tree, or holds something
    /// other than an attribute or a block.
    pub fn append_item_node(&mut self, node: Node) -> NodeId {
        node.assert_unattached();
        if !matches!(
            node.content(),
            NodeContent::Attribute(_) | NodeContent::Block(_)
        ) {
            panic!("{} is not an attribute or block", node.id());
        }
        let id = self.children.append_node(node);
        self.items.insert(id);
        id
    }

    /// Append raw tokens that are never visible to name lookups.
    pub fn append_unstructured_tokens(&mut self, tokens: impl Into<Tokens>) {
        self.children.append(tokens.into());
    }

    pub fn append_new_line(&mut self) {
        let line_break = self.line_break();
        self.append_unstructured_tokens(line_break);
    }

    /// Document-order first attribute named `name`, compared exactly.
    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        let id = self.attribute_id(name)?;
        match self.children.get(id)?.content() {
            NodeContent::Attribute(attr) => Some(attr),
            _ => None,
        }
    }

    pub fn get_attribute_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        let id = self.attribute_id(name)?;
        self.attribute_by_id_mut(id)
    }

    /// Replace the expression of attribute `name` with a literal, or append
    /// a new attribute at the end of the body.
    pub fn set_attribute_value(&mut self, name: &str, value: impl Into<Value>) -> &mut Attribute {
        self.upsert_attribute(name, Expression::literal(value))
    }

    /// Replace the expression of attribute `name` with a traversal, or
    /// append a new attribute at the end of the body.
    pub fn set_attribute_traversal(
        &mut self,
        name: &str,
        traversal: &Traversal,
    ) -> &mut Attribute {
        self.upsert_attribute(name, Expression::traversal(traversal.clone()))
    }

    fn upsert_attribute(&mut self, name: &str, expr: Expression) -> &mut Attribute {
        let id = match self.attribute_id(name) {
            Some(id) => {
                debug!(name, "replacing attribute expression");
                if let Some(attr) = self.attribute_by_id_mut(id) {
                    attr.set_expression(expr);
                }
                id
            }
            None => {
                debug!(name, "appending attribute");
                self.break_line_before_append();
                let attr = Attribute::new(name, &self.indent, expr, self.line_break());
                self.append_item(attr)
            }
        };
        self.attribute_by_id_mut(id)
            .unwrap_or_else(|| panic!("upserted attribute {id} is not in the body"))
    }

    /// Append a new, empty nested block. With `blank_line`, a bare newline
    /// token goes in first to separate it from what precedes it.
    pub fn append_block<I, S>(&mut self, type_name: &str, labels: I, blank_line: bool) -> &mut Block
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        debug!(type_name, ?labels, blank_line, "appending block");
        self.break_line_before_append();
        if blank_line {
            self.append_new_line();
        }
        let crlf = self.line_break().bytes == b"\r\n";
        let block = Block::new(type_name, labels, &self.indent, crlf);
        let id = self.append_item(block);
        match self.children.get_mut(id).map(|node| node.content_mut()) {
            Some(NodeContent::Block(block)) => block,
            _ => panic!("appended block {id} is not in the body"),
        }
    }

    /// Detach the first attribute named `name`.
    pub fn remove_attribute(&mut self, name: &str) -> Option<Attribute> {
        let id = self.attribute_id(name)?;
        debug!(name, "removing attribute");
        self.items.shift_remove(&id);
        match self.children.detach(id)?.into_content() {
            NodeContent::Attribute(attr) => Some(attr),
            _ => None,
        }
    }

    /// Detach the first block with this type and these labels.
    pub fn remove_block<S: AsRef<str>>(&mut self, type_name: &str, labels: &[S]) -> Option<Block> {
        let id = self.block_id(type_name, labels)?;
        debug!(type_name, "removing block");
        self.items.shift_remove(&id);
        match self.children.detach(id)?.into_content() {
            NodeContent::Block(block) => Some(block),
            _ => None,
        }
    }

    pub fn first_matching_block<S: AsRef<str>>(
        &self,
        type_name: &str,
        labels: &[S],
    ) -> Option<&Block> {
        let id = self.block_id(type_name, labels)?;
        match self.children.get(id)?.content() {
            NodeContent::Block(block) => Some(block),
            _ => None,
        }
    }

    pub fn first_matching_block_mut<S: AsRef<str>>(
        &mut self,
        type_name: &str,
        labels: &[S],
    ) -> Option<&mut Block> {
        let id = self.block_id(type_name, labels)?;
        match self.children.get_mut(id)?.content_mut() {
            NodeContent::Block(block) => Some(block),
            _ => None,
        }
    }

    /// Items in document order, with their node ids.
    pub fn items(&self) -> impl Iterator<Item = (NodeId, Item<'_>)> + '_ {
        self.children
            .iter()
            .filter(|node| self.items.contains(&node.id()))
            .filter_map(|node| match node.content() {
                NodeContent::Attribute(attr) => Some((node.id(), Item::Attribute(attr))),
                NodeContent::Block(block) => Some((node.id(), Item::Block(block))),
                _ => None,
            })
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> + '_ {
        self.items().filter_map(|(_, item)| match item {
            Item::Attribute(attr) => Some(attr),
            Item::Block(_) => None,
        })
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> + '_ {
        self.items().filter_map(|(_, item)| match item {
            Item::Block(block) => Some(block),
            Item::Attribute(_) => None,
        })
    }

    /// Drop all content, items and formatting alike.
    pub fn clear(&mut self) {
        self.children.clear();
        self.items.clear();
        if self.reflowed {
            self.reflowed = false;
            self.starts_inline = true;
        }
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        self.children.write_to(out);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_to(&mut out);
        out
    }

    /// Node id of the document-order first attribute named `name`.
    pub fn attribute_id(&self, name: &str) -> Option<NodeId> {
        self.items().find_map(|(id, item)| match item {
            Item::Attribute(attr) if attr.has_name(name) => Some(id),
            _ => None,
        })
    }

    fn block_id<S: AsRef<str>>(&self, type_name: &str, labels: &[S]) -> Option<NodeId> {
        self.items().find_map(|(id, item)| match item {
            Item::Block(block) if block.matches(type_name, labels) => Some(id),
            _ => None,
        })
    }

    fn attribute_by_id_mut(&mut self, id: NodeId) -> Option<&mut Attribute> {
        match self.children.get_mut(id)?.content_mut() {
            NodeContent::Attribute(attr) => Some(attr),
            _ => None,
        }
    }

    /// Newline in the style the body already uses.
    fn line_break(&self) -> Token {
        let bytes = self.to_bytes();
        let crlf = match bytes.iter().rposition(|&b| b == b'\n') {
            Some(end) => end > 0 && bytes[end - 1] == b'\r',
            None => self.crlf,
        };
        Token::line_break(crlf)
    }

    /// Keep a generated item from fusing onto the previous line.
    fn break_line_before_append(&mut self) {
        if self.starts_inline && !self.to_bytes().contains(&b'\n') {
            self.reflow();
        }
        let needs_break = match self.children.last_token() {
            Some(token) => token.kind != TokenKind::Newline,
            None => self.starts_inline,
        };
        if needs_break {
            self.append_new_line();
        }
    }

    /// Spread a one-line body over several lines: a line break after the
    /// `{` and the first item moved to the body's indent.
    fn reflow(&mut self) {
        let line_break = self.line_break();
        let indent = self.indent.clone();
        if let Some(first) = self.children.first_mut() {
            match first.content_mut() {
                NodeContent::Attribute(attr) => attr.set_indent(indent),
                NodeContent::Block(block) => block.set_indent(indent),
                NodeContent::Tokens(tokens) => {
                    if let Some(token) = tokens.first_mut() {
                        token.whitespace = indent;
                    }
                }
                _ => {}
            }
        }
        self.children.prepend(Tokens::from(line_break));
        self.starts_inline = false;
        self.reflowed = true;
    }
}
