use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("{line}:{column}: unexpected {found}, expected {expected}")]
    UnexpectedToken {
        line: usize,
        column: usize,
        found: String,
        expected: &'static str,
    },

    #[error("{line}:{column}: block '{type_name}' is never closed")]
    UnclosedBlock {
        line: usize,
        column: usize,
        type_name: String,
    },

    #[error("{line}:{column}: bracket is never closed")]
    UnclosedBracket { line: usize, column: usize },

    #[error("{line}:{column}: attribute '{name}' has no value")]
    MissingExpression {
        line: usize,
        column: usize,
        name: String,
    },

    #[error("{line}:{column}: invalid block label {label}")]
    InvalidLabel {
        line: usize,
        column: usize,
        label: String,
    },
}
