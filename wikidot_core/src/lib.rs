//! `wikidot_core` compiles a line-oriented wiki markup dialect into HTML
//! fragments.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Markup document
//!   → Document driver (blockquote depth, div containers, fenced blocks)
//!   → Block classifier (ordered rule table: list, header, rule, table, empty, paragraph)
//!   → Blocks (accumulate lines, render themselves on close)
//!   → Inline lexer (scanner rule table, then @@ / @< >@ grouping)
//!   → Inline parser (stack of styled nodes, closed nodes render as markup)
//! ```
//!
//! Every document is compiled twice. [`Document::collect`] walks the whole
//! input into a discarded sink to number headers and equations, then
//! [`Document::render`] walks it again, expanding `[[toc]]` from the numbers
//! collected in the first pass.
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from `wikidot.toml` (image prefix and
//!   link prefix/suffix).
//! - [`lexer`]: The inline token scanner and literal grouper.
//! - [`list`]: Nested list layout.
//! - [`fence`]: Code and math blocks with nested fence counting.
//!
//! ## Quick Start
//!
//! ```rust
//! use wikidot_core::WikidotConfig;
//! use wikidot_core::to_html;
//!
//! let config = WikidotConfig::default();
//! let html = to_html("* one\n* two", &config).unwrap();
//!
//! assert_eq!(html, "<ul>\n<li>one</li>\n<li>two</li>\n</ul>\n");
//! ```

pub use block::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use node::*;
pub use parser::*;
pub use registry::*;
pub use tokens::*;

mod attributes;
mod block;
pub mod config;
mod containers;
mod engine;
#[allow(unused_assignments)]
mod error;
pub mod fence;
pub mod lexer;
pub mod list;
mod node;
mod parser;
pub(crate) mod patterns;
mod registry;
mod table;
mod tokens;

#[cfg(test)]
mod __fixtures;
#[cfg(test)]
mod __tests;
