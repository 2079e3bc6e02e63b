//! Frontmatter parsing
//!
//! The preamble sits between two `---` lines at the very start of a template:
//!
//! ```text
//! ---
//! import Card from "./Card.pico"
//! prop title = "Untitled"
//! const items = load(title);
//! ---
//! ```
//!
//! Statements are picked by their leading keyword (`import`, `prop`,
//! `let`/`const`); anything else is an expression statement. Trailing `;` is
//! optional everywhere.

use crate::parser::ast::*;
use crate::parser::error::ParseError;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::Parser;
use tracing::trace;

impl<'src> Parser<'src> {
    /// Parse the frontmatter if the document opens with a `---` line
    pub(crate) fn parse_frontmatter(&mut self) -> Result<Option<Frontmatter>, ParseError> {
        self.sync();
        self.lexer.skip_whitespace();
        if !self.lexer.at_delimiter() {
            return Ok(None);
        }

        self.lexer.set_frontmatter(true);
        let result = self.parse_frontmatter_block();
        self.lexer.set_frontmatter(false);
        // Anything buffered past the closing line is lexed again in body mode
        self.sync();
        result.map(Some)
    }

    fn parse_frontmatter_block(&mut self) -> Result<Frontmatter, ParseError> {
        let open = self.expect_token(&TokenKind::Delimiter, "'---'")?;
        let mut statements = Vec::new();

        loop {
            match self.peek_kind()? {
                TokenKind::Delimiter => {
                    let close = self.advance()?;
                    trace!(statements = statements.len(), "frontmatter closed");
                    return Ok(Frontmatter {
                        statements,
                        span: open.span.to(close.span),
                    });
                }
                TokenKind::Eof => {
                    return Err(ParseError::UnterminatedBlock {
                        block: "frontmatter",
                        opened_at: self.location(open.span.start),
                    });
                }
                _ => statements.push(self.parse_statement()?),
            }
        }
    }

    /// Parse one frontmatter statement
    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.peek()?.span.start;

        let statement = match self.peek_kind()? {
            TokenKind::Import => {
                self.advance()?;
                let (component, component_span) = self.expect_identifier("component name")?;
                if !component.starts_with(|c: char| c.is_ascii_uppercase()) {
                    return Err(ParseError::UnexpectedToken {
                        expected: "component name starting with an upper-case letter".to_string(),
                        found: format!("identifier '{}'", component),
                        location: self.location(component_span.start),
                    });
                }
                self.expect_token(&TokenKind::From, "'from' after imported component")?;
                let source = match self.peek_kind()? {
                    TokenKind::Str(path) => {
                        self.advance()?;
                        path
                    }
                    _ => return Err(self.unexpected("module path string")?),
                };
                self.skip_semicolon()?;
                Statement::Import {
                    component,
                    source,
                    span: Span::new(start, self.last_end),
                }
            }
            TokenKind::Prop => {
                self.advance()?;
                let (name, _) = self.expect_identifier("prop name")?;
                let default = if self.match_token(&TokenKind::Eq)? {
                    Some(self.parse_expression()?)
                } else {
                    None
                };
                self.skip_semicolon()?;
                Statement::Prop {
                    name,
                    default,
                    span: Span::new(start, self.last_end),
                }
            }
            TokenKind::Let | TokenKind::Const => {
                let is_const = self.advance()?.kind == TokenKind::Const;
                let (name, _) = self.expect_identifier("variable name")?;
                self.expect_token(&TokenKind::Eq, "'=' in declaration")?;
                let value = self.parse_expression()?;
                self.skip_semicolon()?;
                Statement::Let {
                    is_const,
                    name,
                    value,
                    span: Span::new(start, self.last_end),
                }
            }
            _ => {
                let expr = self.parse_expression()?;
                self.skip_semicolon()?;
                Statement::Expression {
                    expr,
                    span: Span::new(start, self.last_end),
                }
            }
        };

        Ok(statement)
    }
}
