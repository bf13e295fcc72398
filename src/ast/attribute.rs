use crate::ast::{Expression, Identifier};
use crate::token::{Token, TokenKind, Tokens};
use crate::tree::{NodeContent, NodeId, Nodes};

/// A `name = expression` item.
///
/// The attribute owns its own tree: the name, the `=` run, the
/// expression and any trailing comment and line break. Replacing the
/// expression splices a new node into the expression's slot and leaves
/// every other token alone.
#[derive(Debug, Clone)]
pub struct Attribute {
    children: Nodes,
    name: NodeId,
    expr: NodeId,
}

impl Attribute {
    /// Build `name = expr` followed by `line_break`.
    pub(crate) fn new(name: &str, indent: &[u8], mut expr: Expression, line_break: Token) -> Self {
        let mut ident = Identifier::new(name);
        ident.set_whitespace(indent.to_vec());
        expr.set_leading_whitespace(vec![b' ']);

        let mut children = Nodes::new();
        let name = children.append(ident);
        children.append(Tokens::from(Token::new(TokenKind::Equal, "=").spaced(1)));
        let expr = children.append(expr);
        children.append(Tokens::from(line_break));
        Self {
            children,
            name,
            expr,
        }
    }

    /// Assemble an attribute from parsed pieces.
    pub(crate) fn from_parts(
        name: Identifier,
        equals: Tokens,
        expr: Expression,
        trailing: Tokens,
    ) -> Self {
        let mut children = Nodes::new();
        let name = children.append(name);
        children.append(equals);
        let expr = children.append(expr);
        if !trailing.is_empty() {
            children.append(trailing);
        }
        Self {
            children,
            name,
            expr,
        }
    }

    fn identifier(&self) -> &Identifier {
        match self.children.get(self.name).map(|node| node.content()) {
            Some(NodeContent::Identifier(ident)) => ident,
            _ => panic!("attribute name slot {} lost its identifier", self.name),
        }
    }

    pub fn name(&self) -> String {
        self.identifier().name().into_owned()
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.identifier().has_name(name)
    }

    pub fn expr(&self) -> &Expression {
        match self.children.get(self.expr).map(|node| node.content()) {
            Some(NodeContent::Expression(expr)) => expr,
            _ => panic!("attribute expression slot {} lost its expression", self.expr),
        }
    }

    /// Swap in a new expression at the old one's position, keeping the
    /// old expression's leading whitespace. Returns the detached old
    /// expression.
    pub fn set_expression(&mut self, mut expr: Expression) -> Expression {
        expr.set_leading_whitespace(self.expr().leading_whitespace().to_vec());
        let (fresh, old) = self
            .children
            .replace(self.expr, expr)
            .unwrap_or_else(|| panic!("attribute expression slot {} is detached", self.expr));
        self.expr = fresh;
        match old.into_content() {
            NodeContent::Expression(old) => old,
            other => panic!("attribute expression slot held {other:?}"),
        }
    }

    pub fn children(&self) -> &Nodes {
        &self.children
    }

    pub(crate) fn set_indent(&mut self, indent: Vec<u8>) {
        let slot = self.name;
        if let Some(NodeContent::Identifier(ident)) =
            self.children.get_mut(slot).map(|node| node.content_mut())
        {
            ident.set_whitespace(indent);
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
}
