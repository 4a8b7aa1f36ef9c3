//! CSS Blocks template analysis for Rust.
//!
//! This crate bundles the workspace members:
//!
//! - [`syntax`]: the block stylesheet parser ([`block_syntax`])
//! - everything in [`css_blocks`], re-exported at the top level

pub use block_syntax as syntax;
pub use css_blocks::*;
