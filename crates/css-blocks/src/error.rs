//! Error types for block parsing and template analysis.
//!
//! Every error carries a human readable message and, when known, the source
//! location it refers to. The rendered form is
//! `"<message> (<file>:<line>:<column>)"`, or `"<message> (<file>)"` when
//! only the file is known.

use std::fmt;

use block_syntax::{Position, SyntaxTreeError};
use thiserror::Error;

/// A file plus an optional 1-based position inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub filename: String,
    pub position: Position,
}

impl SourceLocation {
    pub fn new(filename: impl Into<String>, position: Position) -> Self {
        Self {
            filename: filename.into(),
            position,
        }
    }

    /// A location naming only the file.
    pub fn file(filename: impl Into<String>) -> Self {
        Self::new(filename, Position::UNKNOWN)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.position.is_known() {
            write!(f, "{}:{}", self.filename, self.position)
        } else {
            f.write_str(&self.filename)
        }
    }
}

/// Message plus optional location shared by every [`BlockError`] variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    pub message: String,
    pub location: Option<SourceLocation>,
}

impl ErrorDetail {
    pub fn new(message: impl Into<String>, location: Option<SourceLocation>) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} ({})", self.message, location),
            None => f.write_str(&self.message),
        }
    }
}

/// Discriminant of a [`BlockError`], for callers that branch on kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    Import,
    Usage,
    TemplateAnalysis,
}

/// Errors raised while parsing blocks or analyzing templates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockError {
    /// Malformed selector or declaration in a block stylesheet.
    #[error("{0}")]
    Syntax(ErrorDetail),

    /// A referenced block could not be resolved.
    #[error("{0}")]
    Import(ErrorDetail),

    /// The API was driven in an order or with arguments it does not support.
    #[error("{0}")]
    Usage(ErrorDetail),

    /// A validator rejected an element's attachment set.
    #[error("{0}")]
    TemplateAnalysis(ErrorDetail),
}

impl BlockError {
    pub fn syntax(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::Syntax(ErrorDetail::new(message, Some(location)))
    }

    pub fn import(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::Import(ErrorDetail::new(message, Some(location)))
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(ErrorDetail::new(message, None))
    }

    pub fn usage_at(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::Usage(ErrorDetail::new(message, Some(location)))
    }

    pub fn template_analysis(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::TemplateAnalysis(ErrorDetail::new(message, Some(location)))
    }

    /// Locates a raw stylesheet syntax error in `filename`.
    pub fn from_syntax_tree(err: SyntaxTreeError, filename: &str) -> Self {
        let position = err.position();
        Self::syntax(err.message(), SourceLocation::new(filename, position))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Syntax(_) => ErrorKind::Syntax,
            Self::Import(_) => ErrorKind::Import,
            Self::Usage(_) => ErrorKind::Usage,
            Self::TemplateAnalysis(_) => ErrorKind::TemplateAnalysis,
        }
    }

    fn detail(&self) -> &ErrorDetail {
        match self {
            Self::Syntax(d) | Self::Import(d) | Self::Usage(d) | Self::TemplateAnalysis(d) => d,
        }
    }

    /// The message without the location suffix.
    pub fn message(&self) -> &str {
        &self.detail().message
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        self.detail().location.as_ref()
    }
}

pub type Result<T> = std::result::Result<T, BlockError>;
