//! hcledit: format-preserving editing of HCL documents
//!
//! Documents are parsed into a tree that owns every source byte, so a file
//! that is parsed and written back unmodified comes out byte-for-byte
//! identical. Edits touch only the nodes they address: replacing an
//! attribute's value leaves its name, its `=`, its trailing comment and
//! every other item exactly as they were.
//!
//! # Architecture
//!
//! - [`token`]: tokens carrying their own bytes and preceding whitespace.
//! - [`tree`]: the ownership tree. Every node has exactly one owner;
//!   attaching an already-attached node panics.
//! - [`ast`]: `File`, `Body`, `Attribute`, `Block`, `Expression`.
//! - [`syntax`]: lossless lexer and parser.
//! - [`config`]: TOML edit scripts applied to files on disk through the
//!   verified, atomic [`Rewrite`] primitive.
//!
//! # Example
//!
//! ```
//! use hcledit::{File, Traversal};
//!
//! let mut file = File::parse("count = 1 # replicas\n").unwrap();
//! file.body_mut().set_attribute_value("count", 3);
//! file.body_mut()
//!     .set_attribute_traversal("ami", &Traversal::parse("var.ami").unwrap());
//!
//! assert_eq!(file.to_string(), "count = 3 # replicas\nami = var.ami\n");
//! ```

pub mod ast;
pub mod config;
pub mod edit;
pub mod logging;
pub mod query;
pub mod safety;
pub mod syntax;
pub mod token;
pub mod traversal;
pub mod tree;
pub mod value;

// Re-exports
pub use ast::{Attribute, Block, Body, Expression, ExpressionKind, File, Identifier, Item};
pub use config::{
    apply_edits, apply_plan, load_from_path, load_from_str, plan_edits, ApplicationError, ConfigError,
    EditOutcome, EditScript,
};
pub use edit::{EditError, EditVerification, Rewrite, RewriteResult};
pub use query::{BlockPath, BlockSelector, QueryError};
pub use safety::{SafetyError, WorkspaceGuard};
pub use syntax::ParseError;
pub use token::{Token, TokenKind, Tokens};
pub use traversal::{Traversal, TraversalError};
pub use tree::{Node, NodeContent, NodeId, Nodes, TreeId};
pub use value::Value;
