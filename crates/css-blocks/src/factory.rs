//! The block arena.
//!
//! [`BlockFactory`] owns every block it has parsed. Blocks are keyed by
//! [`BlockId`] and cached by source identifier, so a file referenced from
//! several stylesheets is only imported and parsed once.
//!
//! Loads may run concurrently. The first request for an identifier does the
//! work and later requests wait for its result. Each file being parsed
//! records which load it is waiting on, so a reference cycle split across
//! concurrent loads is reported as an error instead of waiting forever.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use block_syntax::parse_stylesheet;
use futures::future::{BoxFuture, FutureExt};
use tokio::sync::{Mutex, OnceCell, RwLock};

use crate::block::{Block, BlockId};
use crate::block_parser::BlockParser;
use crate::error::{BlockError, Result, SourceLocation};
use crate::importing::Importer;
use crate::options::ParserOptions;

pub struct BlockFactory {
    options: ParserOptions,
    importer: Box<dyn Importer>,
    arena: RwLock<BTreeMap<BlockId, Arc<Block>>>,
    by_identifier: RwLock<HashMap<String, Arc<Block>>>,
    in_flight: Mutex<HashMap<String, InFlight>>,
}

/// A load that has been claimed by some task.
#[derive(Default)]
struct InFlight {
    block: Arc<OnceCell<Arc<Block>>>,
    /// The file this file's parser is waiting on, if any.
    awaiting: Option<String>,
}

fn cyclic(cycle: &[String], location: SourceLocation) -> BlockError {
    BlockError::import(
        format!("Cyclic block reference: {}", cycle.join(" -> ")),
        location,
    )
}

impl BlockFactory {
    pub fn new(options: ParserOptions, importer: impl Importer + 'static) -> Self {
        Self {
            options,
            importer: Box::new(importer),
            arena: RwLock::new(BTreeMap::new()),
            by_identifier: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn importer(&self) -> &dyn Importer {
        self.importer.as_ref()
    }

    /// Imports, parses and registers the block at `reference`, resolved as a
    /// top-level request.
    pub async fn get_block(&self, reference: &str) -> Result<Arc<Block>> {
        let identifier = self.importer.identifier(None, reference, &self.options);
        self.load(identifier, Vec::new(), None).await
    }

    /// Parses in-memory stylesheet text as the block `name`.
    pub async fn parse_source(
        &self,
        source: &str,
        identifier: &str,
        name: &str,
    ) -> Result<Arc<Block>> {
        let stylesheet = parse_stylesheet(source)
            .map_err(|err| BlockError::from_syntax_tree(err, identifier))?;
        BlockParser::new(self)
            .parse(&stylesheet, identifier, name)
            .await
    }

    /// A registered block by id.
    pub async fn block(&self, id: BlockId) -> Option<Arc<Block>> {
        self.arena.read().await.get(&id).cloned()
    }

    /// A registered block by source identifier.
    pub async fn block_for(&self, identifier: &str) -> Option<Arc<Block>> {
        self.by_identifier.read().await.get(identifier).cloned()
    }

    /// Every registered block, in registration order.
    pub async fn blocks(&self) -> Vec<Arc<Block>> {
        self.arena.read().await.values().cloned().collect()
    }

    pub(crate) async fn register(&self, block: Arc<Block>) -> Arc<Block> {
        log::debug!(
            "registered block {} ({}) as {:?}",
            block.name(),
            block.identifier(),
            block.id()
        );
        self.arena
            .write()
            .await
            .insert(block.id(), Arc::clone(&block));
        self.by_identifier
            .write()
            .await
            .insert(block.identifier().to_string(), Arc::clone(&block));
        block
    }

    /// Loads `identifier`, reached through the files in `chain` (outermost
    /// first).
    ///
    /// `referrer` is the `@block-reference` that asked for it, used to locate
    /// import errors.
    pub(crate) fn load<'a>(
        &'a self,
        identifier: String,
        chain: Vec<String>,
        referrer: Option<SourceLocation>,
    ) -> BoxFuture<'a, Result<Arc<Block>>> {
        async move {
            let location = referrer.unwrap_or_else(|| SourceLocation::file(identifier.clone()));

            if chain.contains(&identifier) {
                let mut cycle = chain.clone();
                cycle.push(identifier.clone());
                return Err(cyclic(&cycle, location));
            }
            if chain.len() >= self.options.max_import_depth {
                return Err(BlockError::import(
                    format!(
                        "Block references nested deeper than {} files",
                        self.options.max_import_depth
                    ),
                    location,
                ));
            }

            let cached = self.by_identifier.read().await.get(&identifier).cloned();
            if let Some(block) = cached {
                log::trace!("block cache hit for {identifier}");
                return Ok(block);
            }

            let cell = self.claim(&identifier, &chain, &location).await?;
            let waiter = chain.last().cloned();
            let result = cell
                .get_or_try_init(|| self.import_and_parse(identifier, chain, location))
                .await
                .cloned();
            if let Some(waiter) = waiter {
                if let Some(entry) = self.in_flight.lock().await.get_mut(&waiter) {
                    entry.awaiting = None;
                }
            }
            result
        }
        .boxed()
    }

    /// The shared slot for `identifier`'s block, after recording that the
    /// innermost file of `chain` waits on it.
    ///
    /// Fails when the loads `identifier` is already waiting on lead back into
    /// `chain`.
    async fn claim(
        &self,
        identifier: &str,
        chain: &[String],
        location: &SourceLocation,
    ) -> Result<Arc<OnceCell<Arc<Block>>>> {
        let mut in_flight = self.in_flight.lock().await;

        let mut path = vec![identifier.to_string()];
        let mut next = in_flight.get(identifier).and_then(|e| e.awaiting.clone());
        while let Some(awaited) = next {
            if path.contains(&awaited) {
                break;
            }
            path.push(awaited.clone());
            if let Some(start) = chain.iter().position(|id| *id == awaited) {
                let mut cycle = chain[start..].to_vec();
                cycle.extend(path);
                return Err(cyclic(&cycle, location.clone()));
            }
            next = in_flight.get(&awaited).and_then(|e| e.awaiting.clone());
        }

        if let Some(waiter) = chain.last() {
            if let Some(entry) = in_flight.get_mut(waiter) {
                entry.awaiting = Some(identifier.to_string());
            }
        }
        let entry = in_flight.entry(identifier.to_string()).or_default();
        Ok(Arc::clone(&entry.block))
    }

    async fn import_and_parse(
        &self,
        identifier: String,
        chain: Vec<String>,
        location: SourceLocation,
    ) -> Result<Arc<Block>> {
        let file = self
            .importer
            .import(&identifier, &self.options)
            .await
            .map_err(|err| {
                BlockError::import(
                    format!("Could not import block \"{identifier}\": {err}"),
                    location,
                )
            })?;
        let stylesheet = parse_stylesheet(&file.contents)
            .map_err(|err| BlockError::from_syntax_tree(err, &file.identifier))?;

        BlockParser::with_chain(self, chain)
            .parse(&stylesheet, &file.identifier, &file.default_name)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::importing::MemoryImporter;

    fn factory(importer: MemoryImporter) -> BlockFactory {
        BlockFactory::new(ParserOptions::default(), importer)
    }

    #[tokio::test]
    async fn test_get_block_registers_and_caches() {
        let factory = factory(
            MemoryImporter::new().with_file("blocks/foo.block.css", ".root { color: blue; }"),
        );
        let first = factory.get_block("blocks/foo.block.css").await.unwrap();
        let second = factory.get_block("blocks/foo.block.css").await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.name(), "foo");
        assert_eq!(factory.blocks().await.len(), 1);
        assert!(factory.block(first.id()).await.is_some());
        assert!(factory.block_for("blocks/foo.block.css").await.is_some());
    }

    #[tokio::test]
    async fn test_missing_file_is_import_error() {
        let factory = factory(MemoryImporter::new());
        let err = factory.get_block("blocks/nope.block.css").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Import);
        assert_eq!(
            err.to_string(),
            "Could not import block \"blocks/nope.block.css\": file not found (blocks/nope.block.css)"
        );
    }

    #[tokio::test]
    async fn test_cyclic_references_are_import_errors() {
        let factory = factory(
            MemoryImporter::new()
                .with_file("a.css", "@block-reference b from \"./b.css\";\n.root {}")
                .with_file("b.css", "@block-reference a from \"./a.css\";\n.root {}"),
        );
        let err = factory.get_block("a.css").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Import);
        assert_eq!(
            err.to_string(),
            "Cyclic block reference: a.css -> b.css -> a.css (b.css:1:1)"
        );
    }

    #[tokio::test]
    async fn test_import_depth_limit() {
        let factory = BlockFactory::new(
            ParserOptions::default().with_max_import_depth(1),
            MemoryImporter::new()
                .with_file("a.css", "@block-reference b from \"./b.css\";")
                .with_file("b.css", ".root {}"),
        );
        let err = factory.get_block("a.css").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Import);
        assert!(err.message().contains("nested deeper than 1"));
    }

    #[tokio::test]
    async fn test_syntax_errors_name_the_file() {
        let factory = factory(MemoryImporter::new().with_file("bad.css", ".root {\n  color"));
        let err = factory.get_block("bad.css").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.location().unwrap().filename, "bad.css");
    }
}
