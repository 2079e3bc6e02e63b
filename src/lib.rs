//! # Introduction
//!
//! Pico parses component templates into a typed syntax tree. A template is
//! an optional `---` frontmatter block followed by markup mixed with
//! `{expressions}` and `{if}`/`{for}` control flow. The tree can be printed,
//! serialized to JSON, or browsed in a terminal viewer built with
//! [ratatui](https://docs.rs/ratatui).
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer/Scanner → Parser → Document → (dump | JSON | TUI)
//! ```
//!
//! 1. [`parser`]: tokenises the source and builds a [`Document`].
//! 2. [`ui`]: ratatui-based outline viewer; not part of the stable library API.
//!
//! ## Example
//!
//! ```
//! use pico::parser::ast::Node;
//!
//! let document = pico::parse("{if user}<p>Hi {user.name}</p>{/if}").unwrap();
//! assert!(matches!(document.nodes[0], Node::If(_)));
//! ```

pub mod parser;
pub mod ui;

pub use parser::ast::Document;
pub use parser::error::ParseError;
pub use parser::parse::{ParseOptions, Parser};
pub use parser::{parse, parse_with_options};
