pub mod attribute;
pub mod block;
pub mod body;
pub mod expression;
pub mod file;
pub mod identifier;

pub use attribute::Attribute;
pub use block::Block;
pub use body::{Body, Item};
pub use expression::{Expression, ExpressionKind};
pub use file::File;
pub use identifier::Identifier;
