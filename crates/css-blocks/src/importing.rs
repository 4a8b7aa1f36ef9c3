//! Loading block stylesheets referenced from other blocks.
//!
//! The [`Importer`] trait separates *naming* a file (turning a reference
//! written in a stylesheet into a stable identifier) from *reading* it. Two
//! implementations are provided:
//!
//! - [`FilesystemImporter`] reads files with `tokio::fs`
//! - [`MemoryImporter`] serves sources registered up front

use std::collections::HashMap;
use std::io;
use std::path::Path;

use async_trait::async_trait;

use crate::options::ParserOptions;

/// The contents of a block stylesheet, as returned by an [`Importer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedFile {
    pub identifier: String,
    /// Block name used when the stylesheet does not declare `block-name`.
    pub default_name: String,
    pub contents: String,
}

impl ImportedFile {
    pub fn new(identifier: &str, contents: impl Into<String>) -> Self {
        Self {
            identifier: identifier.to_string(),
            default_name: default_block_name(identifier),
            contents: contents.into(),
        }
    }
}

#[async_trait]
pub trait Importer: Send + Sync {
    /// Identifier for `reference` as written in the file `from`
    /// (`None` for top-level requests). Must be deterministic.
    fn identifier(&self, from: Option<&str>, reference: &str, options: &ParserOptions) -> String;

    async fn import(&self, identifier: &str, options: &ParserOptions) -> io::Result<ImportedFile>;
}

/// `blocks/nav-bar.block.css` -> `nav-bar`.
pub fn default_block_name(identifier: &str) -> String {
    let file = identifier.rsplit(['/', '\\']).next().unwrap_or(identifier);
    file.split('.').next().unwrap_or(file).to_string()
}

/// Resolves `./` and `../` references against the directory of `from`, and
/// anything else against `root`. Works on `/`-separated strings so the
/// result is the same on every platform.
pub fn resolve_reference(from: Option<&str>, reference: &str, root: &Path) -> String {
    let relative = reference.starts_with("./") || reference.starts_with("../");
    let base = match from {
        Some(from) if relative => from.rsplit_once('/').map(|(dir, _)| dir).unwrap_or(""),
        _ if reference.starts_with('/') => "",
        _ => root.to_str().unwrap_or(""),
    };
    let joined = if base.is_empty() {
        reference.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), reference)
    };
    normalize(&joined)
}

fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." if segments.last().is_some_and(|s| *s != "..") => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    let joined = segments.join("/");
    if path.starts_with('/') {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Reads block files from disk.
#[derive(Debug, Clone, Default)]
pub struct FilesystemImporter;

impl FilesystemImporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Importer for FilesystemImporter {
    fn identifier(&self, from: Option<&str>, reference: &str, options: &ParserOptions) -> String {
        resolve_reference(from, reference, &options.root_dir)
    }

    async fn import(&self, identifier: &str, _options: &ParserOptions) -> io::Result<ImportedFile> {
        log::debug!("reading block file {identifier}");
        let contents = tokio::fs::read_to_string(identifier).await?;
        Ok(ImportedFile::new(identifier, contents))
    }
}

/// Serves block sources registered in memory, keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct MemoryImporter {
    files: HashMap<String, String>,
}

impl MemoryImporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, identifier: impl Into<String>, contents: impl Into<String>) {
        self.files.insert(identifier.into(), contents.into());
    }

    pub fn with_file(mut self, identifier: impl Into<String>, contents: impl Into<String>) -> Self {
        self.register(identifier, contents);
        self
    }
}

#[async_trait]
impl Importer for MemoryImporter {
    fn identifier(&self, from: Option<&str>, reference: &str, options: &ParserOptions) -> String {
        resolve_reference(from, reference, &options.root_dir)
    }

    async fn import(&self, identifier: &str, _options: &ParserOptions) -> io::Result<ImportedFile> {
        self.files
            .get(identifier)
            .map(|contents| ImportedFile::new(identifier, contents.as_str()))
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "file not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_block_name() {
        assert_eq!(default_block_name("blocks/nav-bar.block.css"), "nav-bar");
        assert_eq!(default_block_name("foo.css"), "foo");
        assert_eq!(default_block_name("plain"), "plain");
    }

    #[test]
    fn test_resolve_relative_reference() {
        let root = PathBuf::from("/project");
        assert_eq!(
            resolve_reference(Some("blocks/foo.block.css"), "./bar.block.css", &root),
            "blocks/bar.block.css"
        );
        assert_eq!(
            resolve_reference(Some("blocks/nested/foo.css"), "../shared/bar.css", &root),
            "blocks/shared/bar.css"
        );
    }

    #[test]
    fn test_resolve_against_root() {
        let root = PathBuf::from("/project");
        assert_eq!(
            resolve_reference(Some("blocks/foo.css"), "shared/bar.css", &root),
            "/project/shared/bar.css"
        );
        assert_eq!(
            resolve_reference(None, "blocks/foo.css", Path::new("")),
            "blocks/foo.css"
        );
        assert_eq!(resolve_reference(None, "/abs/foo.css", &root), "/abs/foo.css");
    }

    #[tokio::test]
    async fn test_memory_importer() {
        let importer = MemoryImporter::new().with_file("blocks/foo.block.css", ".root {}");
        let options = ParserOptions::default();
        let file = importer.import("blocks/foo.block.css", &options).await.unwrap();
        assert_eq!(file.default_name, "foo");
        assert_eq!(file.contents, ".root {}");

        let err = importer.import("blocks/missing.css", &options).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_filesystem_importer_missing_file() {
        let importer = FilesystemImporter::new();
        let result = importer
            .import("this/path/does/not/exist.block.css", &ParserOptions::default())
            .await;
        assert!(result.is_err());
    }
}
