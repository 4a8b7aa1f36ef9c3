//! Error types for block stylesheet parsing.

use thiserror::Error;

use crate::parser::Position;

/// Errors that can occur while building a stylesheet syntax tree.
///
/// # Examples
///
/// ```rust
/// use block_syntax::parser::parse_stylesheet;
/// use block_syntax::SyntaxTreeError;
///
/// // Missing closing brace
/// let result = parse_stylesheet(".root { color: blue;");
/// assert!(matches!(result, Err(SyntaxTreeError::InvalidSyntax { .. })));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxTreeError {
    /// Invalid CSS syntax was encountered during parsing.
    ///
    /// `position` points at the first character the parser could not consume.
    #[error("{message} at line {}, column {}", position.line, position.column)]
    InvalidSyntax { message: String, position: Position },
}

impl SyntaxTreeError {
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidSyntax { message, .. } => message,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Self::InvalidSyntax { position, .. } => *position,
        }
    }
}
