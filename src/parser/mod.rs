//! Pico template parser
//!
//! This module transforms Pico source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Structural tokenization (expressions, frontmatter)
//! - [`scanner`]: Mode-aware scanning for text, tags, raw content and templates
//! - [`parse`]: The [`Parser`](parse::Parser) and its helpers
//! - [`ast`]: AST node definitions
//! - [`error`]: The [`ParseError`](error::ParseError) taxonomy
//!
//! # Template Language
//!
//! - Frontmatter: `import`, `prop`, `let`/`const` and expression statements
//!   between `---` lines
//! - Markup: HTML elements, components, `<style>`/`<script>` raw elements,
//!   dynamic components `<={Comp} />`, comments
//! - Control flow: `{if}`/`{else if}`/`{else}`/`{/if}`, `{for x of xs}`/`{/for}`
//! - Expressions: a JavaScript-like subset with literals, template strings,
//!   member access, optional chaining, calls, unary/binary/ternary operators
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with precedence climbing for binary
//! operators. The parser drives the lexer, selecting the scanning mode for
//! each construct.

pub mod ast;
pub mod error;
mod expressions;
mod frontmatter;
pub mod lexer;
mod nodes;
pub mod parse;
pub mod scanner;
mod tags;

use ast::Document;
use error::ParseError;
use parse::{ParseOptions, Parser};

/// Parse a template with default options
pub fn parse(source: &str) -> Result<Document, ParseError> {
    parse_with_options(source, ParseOptions::default())
}

/// Parse a template with explicit options
#[tracing::instrument(level = "debug", skip_all, fields(bytes = source.len()))]
pub fn parse_with_options(source: &str, options: ParseOptions) -> Result<Document, ParseError> {
    Parser::with_options(source, options).parse_document()
}
