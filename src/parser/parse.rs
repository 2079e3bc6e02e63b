//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure:
//! options, token lookahead, helper methods, and the document entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `frontmatter`: the `---` preamble and its statements
//! - `nodes`: body nodes, `{if}`/`{for}` blocks and block terminators
//! - `tags`: components, HTML elements, raw elements and attributes
//! - `expressions`: expressions with precedence climbing
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.
//!
//! Tokens are lexed lazily into a small lookahead buffer. Before handing the
//! cursor to one of the scanner's modes, [`Parser::sync`] rewinds the lexer
//! to the first buffered (unconsumed) token and drops the buffer, so no token
//! is ever read in the wrong mode.

use crate::parser::ast::*;
use crate::parser::error::ParseError;
use crate::parser::lexer::{Lexer, Token, TokenKind};
use crate::parser::nodes::Boundary;
use std::collections::VecDeque;
use tracing::debug;

/// Default nesting limit for blocks, elements and expressions
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Parser configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum nesting of blocks, elements and sub-expressions before the
    /// parse fails with [`ParseError::RecursionLimitExceeded`]
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Recursive descent parser for Pico templates.
///
/// A parser owns its cursor and partial tree; it is consumed by
/// [`Parser::parse_document`], so every parse starts from a clean state.
pub struct Parser<'src> {
    pub(crate) lexer: Lexer<'src>,
    pub(crate) lookahead: VecDeque<Token>,
    pub(crate) options: ParseOptions,
    pub(crate) depth: usize,
    /// Elements whose close tag is still pending: name and start offset
    pub(crate) open_tags: Vec<(String, usize)>,
    /// End offset of the last consumed token
    pub(crate) last_end: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self::with_options(source, ParseOptions::default())
    }

    pub fn with_options(source: &'src str, options: ParseOptions) -> Self {
        Self {
            lexer: Lexer::new(source),
            lookahead: VecDeque::new(),
            options,
            depth: 0,
            open_tags: Vec::new(),
            last_end: 0,
        }
    }

    /// Parse the entire template
    pub fn parse_document(mut self) -> Result<Document, ParseError> {
        let result = self.parse_document_inner();
        match &result {
            Ok(document) => debug!(nodes = document.nodes.len(), "parsed document"),
            Err(err) => debug!(error = %err, "parse failed"),
        }
        result
    }

    fn parse_document_inner(&mut self) -> Result<Document, ParseError> {
        let mut document = Document::new();

        if let Some(frontmatter) = self.parse_frontmatter()? {
            document.nodes.push(Node::Frontmatter(frontmatter));
        }

        let (nodes, boundary) = self.parse_nodes()?;
        document.nodes.extend(nodes);

        match boundary {
            Boundary::EndOfInput { .. } => {}
            Boundary::CloseTag { name, span } => {
                return Err(self.stray_close_tag(name, span, None));
            }
            other => return Err(self.unexpected_boundary(&other, "end of input")),
        }

        Ok(document)
    }

    // ===== Helper methods =====

    /// Lex until at least `n` tokens are buffered
    fn fill(&mut self, n: usize) -> Result<(), ParseError> {
        while self.lookahead.len() < n {
            let token = self.lexer.next_token()?;
            self.lookahead.push_back(token);
        }
        Ok(())
    }

    pub(crate) fn peek(&mut self) -> Result<&Token, ParseError> {
        self.fill(1)?;
        Ok(&self.lookahead[0])
    }

    pub(crate) fn peek_kind(&mut self) -> Result<TokenKind, ParseError> {
        Ok(self.peek()?.kind.clone())
    }

    pub(crate) fn peek_ahead_kind(&mut self, n: usize) -> Result<TokenKind, ParseError> {
        self.fill(n + 1)?;
        Ok(self.lookahead[n].kind.clone())
    }

    pub(crate) fn advance(&mut self) -> Result<Token, ParseError> {
        self.fill(1)?;
        let token = self
            .lookahead
            .pop_front()
            .unwrap_or_else(|| Token::new(TokenKind::Eof, Span::new(self.last_end, self.last_end)));
        if token.kind != TokenKind::Eof {
            self.last_end = token.span.end;
        }
        Ok(token)
    }

    pub(crate) fn check(&mut self, kind: &TokenKind) -> Result<bool, ParseError> {
        Ok(std::mem::discriminant(&self.peek()?.kind) == std::mem::discriminant(kind))
    }

    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> Result<bool, ParseError> {
        if self.check(kind)? {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(crate) fn expect_token(
        &mut self,
        kind: &TokenKind,
        expected: &str,
    ) -> Result<Token, ParseError> {
        if self.check(kind)? {
            self.advance()
        } else {
            Err(self.unexpected(expected)?)
        }
    }

    pub(crate) fn expect_identifier(&mut self, expected: &str) -> Result<(String, Span), ParseError> {
        match self.peek_kind()? {
            TokenKind::Ident(name) => {
                let token = self.advance()?;
                Ok((name, token.span))
            }
            _ => Err(self.unexpected(expected)?),
        }
    }

    /// Consume an optional trailing `;`
    pub(crate) fn skip_semicolon(&mut self) -> Result<(), ParseError> {
        self.match_token(&TokenKind::Semicolon)?;
        Ok(())
    }

    /// Error for the current token not matching `expected`
    pub(crate) fn unexpected(&mut self, expected: &str) -> Result<ParseError, ParseError> {
        let token = self.peek()?.clone();
        Ok(ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: token.kind.to_string(),
            location: self.location(token.span.start),
        })
    }

    /// Rewind the lexer to the first unconsumed token and drop the buffer
    pub(crate) fn sync(&mut self) {
        if let Some(first) = self.lookahead.front() {
            self.lexer.reset(first.span.start);
            self.lookahead.clear();
        }
    }

    pub(crate) fn location(&self, offset: usize) -> SourceLocation {
        self.lexer.location(offset)
    }

    pub(crate) fn source(&self) -> &'src str {
        self.lexer.source()
    }

    /// Run `f` one nesting level deeper, failing once the configured limit
    /// is reached. `at` is the offset reported on failure.
    pub(crate) fn nested<T>(
        &mut self,
        at: usize,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= self.options.max_depth {
            return Err(ParseError::RecursionLimitExceeded {
                limit: self.options.max_depth,
                location: self.location(at),
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}
