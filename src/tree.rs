//! The ownership tree: positionally ordered, heterogeneous content nodes.
//!
//! Serialization order is tree order, so the tree is a plain ordered
//! sequence rather than anything keyed. Every node carries a stable
//! [`NodeId`] and an owner marker; a node belongs to at most one tree at
//! a time and attaching a node that is already attached is a programmer
//! error that panics.

use crate::ast::{Attribute, Block, Body, Expression, Identifier};
use crate::token::{Token, Tokens};
use std::fmt;
use uuid::Uuid;

/// Identity of a node, stable across mutation of the surrounding tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Uuid);

impl NodeId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0.simple())
    }
}

/// Identity of one ownership tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeId(Uuid);

impl TreeId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tree-{}", self.0.simple())
    }
}

/// What a node holds.
#[derive(Debug, Clone)]
pub enum NodeContent {
    Tokens(Tokens),
    Identifier(Identifier),
    Expression(Expression),
    Attribute(Attribute),
    Block(Block),
    Body(Body),
}

impl NodeContent {
    pub fn write_to(&self, out: &mut Vec<u8>) {
        match self {
            NodeContent::Tokens(tokens) => tokens.write_to(out),
            NodeContent::Identifier(ident) => ident.write_to(out),
            NodeContent::Expression(expr) => expr.write_to(out),
            NodeContent::Attribute(attr) => attr.write_to(out),
            NodeContent::Block(block) => block.write_to(out),
            NodeContent::Body(body) => body.write_to(out),
        }
    }

    /// The last token this content serializes, if any.
    pub fn last_token(&self) -> Option<&Token> {
        match self {
            NodeContent::Tokens(tokens) => tokens.last(),
            NodeContent::Identifier(ident) => Some(ident.token()),
            NodeContent::Expression(expr) => expr.tokens().last(),
            NodeContent::Attribute(attr) => attr.children().last_token(),
            NodeContent::Block(block) => block.children().last_token(),
            NodeContent::Body(body) => body.children().last_token(),
        }
    }

    /// The first token this content serializes, if any.
    pub fn first_token(&self) -> Option<&Token> {
        match self {
            NodeContent::Tokens(tokens) => tokens.first(),
            NodeContent::Identifier(ident) => Some(ident.token()),
            NodeContent::Expression(expr) => expr.tokens().first(),
            NodeContent::Attribute(attr) => attr.children().first_token(),
            NodeContent::Block(block) => block.children().first_token(),
            NodeContent::Body(body) => body.children().first_token(),
        }
    }
}

impl From<Tokens> for NodeContent {
    fn from(tokens: Tokens) -> Self {
        NodeContent::Tokens(tokens)
    }
}

impl From<Identifier> for NodeContent {
    fn from(ident: Identifier) -> Self {
        NodeContent::Identifier(ident)
    }
}

impl From<Expression> for NodeContent {
    fn from(expr: Expression) -> Self {
        NodeContent::Expression(expr)
    }
}

impl From<Attribute> for NodeContent {
    fn from(attr: Attribute) -> Self {
        NodeContent::Attribute(attr)
    }
}

impl From<Block> for NodeContent {
    fn from(block: Block) -> Self {
        NodeContent::Block(block)
    }
}

impl From<Body> for NodeContent {
    fn from(body: Body) -> Self {
        NodeContent::Body(body)
    }
}

/// A content node with identity and an owner marker.
///
/// Cloning an attached node keeps its owner marker, so the clone cannot
/// be attached anywhere: two live nodes with one identity would alias.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    owner: Option<TreeId>,
    content: NodeContent,
}

impl Node {
    /// A new, unattached node.
    pub fn new(content: impl Into<NodeContent>) -> Self {
        Self {
            id: NodeId::new(),
            owner: None,
            content: content.into(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn owner(&self) -> Option<TreeId> {
        self.owner
    }

    pub fn is_attached(&self) -> bool {
        self.owner.is_some()
    }

    pub fn content(&self) -> &NodeContent {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut NodeContent {
        &mut self.content
    }

    pub fn into_content(self) -> NodeContent {
        self.content
    }

    /// Panics if the node is attached to a tree.
    pub fn assert_unattached(&self) {
        if let Some(owner) = self.owner {
            panic!("{} is already attached to {}", self.id, owner);
        }
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        self.content.write_to(out);
    }
}

/// An ordered sequence of owned nodes.
#[derive(Debug)]
pub struct Nodes {
    id: TreeId,
    nodes: Vec<Node>,
}

impl Nodes {
    pub fn new() -> Self {
        Self {
            id: TreeId::new(),
            nodes: Vec::new(),
        }
    }

    pub fn id(&self) -> TreeId {
        self.id
    }

    /// Wrap `content` in a new node and attach it at the tail.
    pub fn append(&mut self, content: impl Into<NodeContent>) -> NodeId {
        self.append_node(Node::new(content))
    }

    /// Attach an existing node at the tail.
    ///
    /// # Panics
    ///
    /// If the node is already attached to any tree.
    pub fn append_node(&mut self, mut node: Node) -> NodeId {
        node.assert_unattached();
        node.owner = Some(self.id);
        let id = node.id;
        self.nodes.push(node);
        id
    }

    /// Wrap `content` in a new node and attach it at the head.
    pub fn prepend(&mut self, content: impl Into<NodeContent>) -> NodeId {
        let mut node = Node::new(content);
        node.owner = Some(self.id);
        let id = node.id;
        self.nodes.insert(0, node);
        id
    }

    /// Remove a node from the tree, returning it unattached.
    pub fn detach(&mut self, id: NodeId) -> Option<Node> {
        let position = self.position(id)?;
        let mut node = self.nodes.remove(position);
        node.owner = None;
        Some(node)
    }

    /// Put `content` into a fresh node at the position currently held by
    /// `id`. Returns the new node's id and the detached old node.
    pub fn replace(
        &mut self,
        id: NodeId,
        content: impl Into<NodeContent>,
    ) -> Option<(NodeId, Node)> {
        let position = self.position(id)?;
        let mut fresh = Node::new(content);
        fresh.owner = Some(self.id);
        let fresh_id = fresh.id;
        let mut old = std::mem::replace(&mut self.nodes[position], fresh);
        old.owner = None;
        Some((fresh_id, old))
    }

    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|node| node.id == id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|node| node.id == id)
    }

    pub fn first_mut(&mut self) -> Option<&mut Node> {
        self.nodes.first_mut()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn last_token(&self) -> Option<&Token> {
        self.nodes
            .iter()
            .rev()
            .find_map(|node| node.content.last_token())
    }

    pub fn first_token(&self) -> Option<&Token> {
        self.nodes.iter().find_map(|node| node.content.first_token())
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        for node in &self.nodes {
            node.write_to(out);
        }
    }
}

impl Default for Nodes {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Nodes {
    /// Deep copy under a new tree identity. Node ids are kept so items can
    /// still be matched against the copied body's index.
    fn clone(&self) -> Self {
        let id = TreeId::new();
        let nodes = self
            .nodes
            .iter()
            .map(|node| Node {
                id: node.id,
                owner: Some(id),
                content: node.content.clone(),
            })
            .collect();
        Self { id, nodes }
    }
}

impl<'a> IntoIterator for &'a Nodes {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    fn comment(text: &str) -> Tokens {
        Tokens::from(Token::new(TokenKind::Comment, text))
    }

    fn render(nodes: &Nodes) -> String {
        let mut out = Vec::new();
        nodes.write_to(&mut out);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn append_preserves_order_and_marks_owner() {
        let mut nodes = Nodes::new();
        let a = nodes.append(comment("# a"));
        let b = nodes.append(comment("# b"));
        assert_eq!(nodes.position(a), Some(0));
        assert_eq!(nodes.position(b), Some(1));
        assert_eq!(nodes.get(a).unwrap().owner(), Some(nodes.id()));
        assert_eq!(render(&nodes), "# a# b");
    }

    #[test]
    fn detach_then_reattach_elsewhere() {
        let mut first = Nodes::new();
        let mut second = Nodes::new();
        let id = first.append(comment("# moved"));
        let node = first.detach(id).unwrap();
        assert!(!node.is_attached());
        assert!(first.is_empty());

        let reattached = second.append_node(node);
        assert_eq!(reattached, id);
        assert_eq!(second.get(id).unwrap().owner(), Some(second.id()));
    }

    #[test]
    #[should_panic(expected = "already attached")]
    fn append_attached_clone_panics() {
        let mut first = Nodes::new();
        let mut second = Nodes::new();
        let id = first.append(comment("# shared"));
        let alias = first.get(id).unwrap().clone();
        second.append_node(alias);
    }

    #[test]
    #[should_panic(expected = "already attached")]
    fn append_attached_clone_to_same_tree_panics() {
        let mut nodes = Nodes::new();
        let id = nodes.append(comment("# twice"));
        let alias = nodes.get(id).unwrap().clone();
        nodes.append_node(alias);
    }

    #[test]
    fn replace_keeps_position_and_detaches_old() {
        let mut nodes = Nodes::new();
        nodes.append(comment("# a"));
        let middle = nodes.append(comment("# b"));
        nodes.append(comment("# c"));

        let (fresh, old) = nodes.replace(middle, comment("# B")).unwrap();
        assert_ne!(fresh, middle);
        assert!(!old.is_attached());
        assert_eq!(nodes.position(fresh), Some(1));
        assert!(nodes.get(middle).is_none());
        assert_eq!(render(&nodes), "# a# B# c");
    }

    #[test]
    fn clone_gets_new_tree_identity() {
        let mut nodes = Nodes::new();
        let id = nodes.append(comment("# a"));
        let copy = nodes.clone();
        assert_ne!(copy.id(), nodes.id());
        assert_eq!(copy.get(id).unwrap().owner(), Some(copy.id()));
    }

    #[test]
    fn prepend_attaches_at_head() {
        let mut nodes = Nodes::new();
        nodes.append(comment("# b"));
        let head = nodes.prepend(comment("# a"));
        assert_eq!(nodes.position(head), Some(0));
        assert_eq!(nodes.get(head).unwrap().owner(), Some(nodes.id()));
        assert_eq!(render(&nodes), "# a# b");

        nodes.clear();
        assert!(nodes.is_empty());
        assert_eq!(render(&nodes), "");
    }

    #[test]
    fn last_token_skips_empty_nodes() {
        let mut nodes = Nodes::new();
        nodes.append(comment("# a"));
        nodes.append(Tokens::new());
        assert_eq!(nodes.last_token().unwrap().bytes, b"# a");
    }
}
