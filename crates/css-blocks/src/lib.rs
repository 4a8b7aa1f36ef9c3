//! # css-blocks - block analysis and validation
//!
//! Parses block stylesheets into a typed object model and checks how a
//! template applies that model to its elements.
//!
//! ## Quick Start
//!
//! ```rust
//! use css_blocks::{
//!     BlockFactory, MemoryImporter, ParserOptions, Position, Template, TemplateAnalysis,
//!     ValidatorOptions,
//! };
//!
//! # tokio_test_runtime(async {
//! let importer = MemoryImporter::new().with_file(
//!     "blocks/nav.block.css",
//!     ".root { display: flex; }\n.item { color: gray; }\n.item[state|active] { color: black; }",
//! );
//! let factory = BlockFactory::new(ParserOptions::default(), importer);
//! let nav = factory.get_block("blocks/nav.block.css").await.unwrap();
//!
//! let mut analysis = TemplateAnalysis::new(Template::new("templates/nav.hbs"), &ValidatorOptions::new());
//! analysis.add_block("nav", nav.clone());
//!
//! let mut element = analysis.start_element(Position::new(3, 5)).unwrap();
//! let item = nav.get_class("item").unwrap();
//! element.add_dynamic_class(item.get_state("active").unwrap(), Some("isCurrent"));
//! element.add_static_class(item);
//! analysis.end_element(element).unwrap();
//! analysis.end_analysis().unwrap();
//!
//! assert_eq!(analysis.serialize().elements[0].static_ids, ["blocks/nav.block.css:.item"]);
//! # });
//! # fn tokio_test_runtime<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`block`]: blocks, classes, states and the [`BlockObject`] handle
//! - [`factory`] and [`block_parser`]: loading stylesheets into blocks
//! - [`importing`]: naming and reading referenced stylesheets
//! - [`analysis`]: the per-template element analysis and its JSON form
//! - [`validators`]: built-in and custom element rules
//! - [`error`]: the [`BlockError`] type shared by everything above

pub mod analysis;
pub mod block;
pub mod block_parser;
pub mod error;
pub mod factory;
pub mod importing;
pub mod log_init;
pub mod options;
pub mod validators;

pub use analysis::{AnalysisState, ElementAnalysis, SerializedTemplateAnalysis, Template, TemplateAnalysis};
pub use block::{Block, BlockId, BlockObject, ClassRef, ObjectId, StateRef};
pub use block_parser::BlockParser;
pub use block_syntax::Position;
pub use error::{BlockError, ErrorKind, Result, SourceLocation};
pub use factory::BlockFactory;
pub use importing::{FilesystemImporter, ImportedFile, Importer, MemoryImporter};
pub use options::ParserOptions;
pub use validators::{AnalysisContext, BuiltInValidator, ErrorReporter, Validator, ValidatorOptions};
