//! # block-syntax - CSS Blocks stylesheet syntax tree
//!
//! A small CSS parser tuned for CSS Blocks stylesheets. It turns source text
//! into a [`StyleSheet`](parser::StyleSheet) of rules, at-rules and generic
//! declarations, each carrying the 1-based [`Position`](parser::Position) it
//! was read from. Interpreting selectors as block classes and states is left
//! to the consumer.
//!
//! ## Quick Start
//!
//! ```rust
//! use block_syntax::parser::{parse_stylesheet, Selector};
//!
//! let source = r#"
//!     @block-reference other from "./other.block.css";
//!
//!     .root { color: blue; }
//!     .button[state|size=large] { font-size: 2em; }
//! "#;
//!
//! let stylesheet = parse_stylesheet(source).expect("valid block stylesheet");
//! assert_eq!(stylesheet.at_rules.len(), 1);
//! assert_eq!(stylesheet.rules.len(), 2);
//! assert_eq!(stylesheet.rules[0].position.line, 4);
//!
//! let key = &stylesheet.rules[1].selectors.selectors[0].parts[0].compound;
//! assert_eq!(key.selectors[0], Selector::Class("button".to_string()));
//! ```
//!
//! ## Supported Syntax
//!
//! ### Selectors
//! - Class selectors: `.root`, `.button`
//! - Attribute selectors: `[state|active]`, `[state|size=large]`, `[href]`
//! - ID, type and universal selectors: `#main`, `div`, `*`
//! - Pseudo-classes and pseudo-elements: `:hover`, `::before`
//! - Combinators: descendant (space), child (`>`), `+` and `~`
//! - Nested rules with the `&` parent selector
//!
//! ### Statements
//! - Statement at-rules: `@block-reference name from "./file.css";`
//! - Declarations: any `property: value` pair, with optional `!important`
//! - Block comments (`/* */`)
//!
//! ## Modules
//!
//! - [`parser`]: parsing entry points and syntax tree types
//! - [`error`]: error types for parsing failures

pub mod error;
pub mod parser;

pub use error::SyntaxTreeError;
pub use parser::{Position, StyleSheet, parse_stylesheet};
