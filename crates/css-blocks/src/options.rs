//! Parser configuration.

use std::path::PathBuf;

/// Options shared by the block factory and its importer.
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Directory non-relative `@block-reference` paths are resolved against.
    pub root_dir: PathBuf,
    /// Longest chain of nested `@block-reference`s followed before giving up.
    pub max_import_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::new(),
            max_import_depth: 32,
        }
    }
}

impl ParserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_dir(mut self, root_dir: impl Into<PathBuf>) -> Self {
        self.root_dir = root_dir.into();
        self
    }

    pub fn with_max_import_depth(mut self, depth: usize) -> Self {
        self.max_import_depth = depth;
        self
    }
}
