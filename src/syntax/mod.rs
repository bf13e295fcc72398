//! Turning source text into a document tree.

pub mod errors;
pub mod lexer;
pub mod literal;
pub mod parser;

pub use errors::ParseError;
pub use lexer::lex;
pub use parser::parse;

/// Whether `name` can be written as a bare identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_shapes() {
        assert!(is_identifier("aws_instance"));
        assert!(is_identifier("_private"));
        assert!(is_identifier("kebab-case"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("0day"));
        assert!(!is_identifier("has space"));
        assert!(!is_identifier("-lead"));
    }
}
