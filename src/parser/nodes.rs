//! Body node and control-flow parsing
//!
//! This module handles everything that can appear between tags:
//!
//! - Text runs and `<!-- comments -->`
//! - Expression nodes: `{expr}`
//! - Control flow: `{if}` / `{else if}` / `{else}` / `{/if}` and
//!   `{for x of xs}` / `{/for}`
//!
//! # Grammar
//!
//! ```text
//! nodes    ::= (text | comment | element | brace)*
//! brace    ::= "{" expr "}" | if_block | for_block
//! if_block ::= "{if" expr "}" nodes ("{else if" expr "}" nodes)* ("{else}" nodes)? "{/if}"
//! for_block::= "{for" "let"? ident "of" expr "}" nodes "{/for}"
//! ```
//!
//! A child list runs until something that closes a scope: a block clause or
//! terminator, a close tag, or end of input. That [`Boundary`] is returned to
//! whoever opened the scope, which decides whether it is the right one.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::error::ParseError;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::Parser;
use crate::parser::scanner::BodyLookahead;
use tracing::trace;

/// What ended a child list
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Boundary {
    EndOfInput { offset: usize },
    ElseIf { guard: Expr, span: Span },
    Else { span: Span },
    EndIf { span: Span },
    EndFor { span: Span },
    CloseTag { name: String, span: Span },
}

impl Boundary {
    fn offset(&self) -> usize {
        match self {
            Boundary::EndOfInput { offset } => *offset,
            Boundary::ElseIf { span, .. }
            | Boundary::Else { span }
            | Boundary::EndIf { span }
            | Boundary::EndFor { span }
            | Boundary::CloseTag { span, .. } => span.start,
        }
    }

    fn describe(&self) -> String {
        match self {
            Boundary::EndOfInput { .. } => "end of input".to_string(),
            Boundary::ElseIf { .. } => "'{else if}'".to_string(),
            Boundary::Else { .. } => "'{else}'".to_string(),
            Boundary::EndIf { .. } => "'{/if}'".to_string(),
            Boundary::EndFor { .. } => "'{/for}'".to_string(),
            Boundary::CloseTag { name, .. } => format!("'</{}>'", name),
        }
    }
}

/// Result of parsing a `{…}` construct in body position
enum Braced {
    Node(Node),
    Boundary(Boundary),
}

impl<'src> Parser<'src> {
    /// Parse body nodes until a scope boundary
    pub(crate) fn parse_nodes(&mut self) -> Result<(Vec<Node>, Boundary), ParseError> {
        let mut nodes = Vec::new();

        loop {
            self.sync();
            if let Some(span) = self.lexer.scan_text() {
                if let Some(text) = self.text_node(span) {
                    nodes.push(text);
                }
            }

            let lookahead = self.lexer.body_lookahead();
            trace!(?lookahead, offset = self.lexer.position(), "body");

            match lookahead {
                BodyLookahead::End => {
                    let offset = self.lexer.position();
                    return Ok((nodes, Boundary::EndOfInput { offset }));
                }
                BodyLookahead::Comment => {
                    let (content, span) = self.lexer.scan_comment()?;
                    nodes.push(Node::Comment { content, span });
                }
                BodyLookahead::CloseTag => {
                    let boundary = self.parse_close_tag()?;
                    return Ok((nodes, boundary));
                }
                BodyLookahead::DynamicTag => {
                    let at = self.lexer.position();
                    nodes.push(self.nested(at, |p| p.parse_dynamic_component())?);
                }
                BodyLookahead::OpenTag => {
                    let at = self.lexer.position();
                    nodes.push(self.nested(at, |p| p.parse_tag())?);
                }
                BodyLookahead::Brace => match self.parse_brace()? {
                    Braced::Node(node) => nodes.push(node),
                    Braced::Boundary(boundary) => return Ok((nodes, boundary)),
                },
            }
        }
    }

    /// Text node for a scanned run with leading whitespace skipped; `None`
    /// for blank runs. Trailing whitespace is kept so spacing before an
    /// inline `{expr}` survives.
    fn text_node(&self, span: Span) -> Option<Node> {
        let raw = &self.source()[span.start..span.end];
        let content = raw.trim_start();
        if content.is_empty() {
            return None;
        }
        let start = span.end - content.len();
        Some(Node::Text {
            content: content.to_string(),
            span: Span::new(start, span.end),
        })
    }

    /// Dispatch on the token after `{`
    fn parse_brace(&mut self) -> Result<Braced, ParseError> {
        let open = self.peek()?.span;

        match self.peek_ahead_kind(1)? {
            TokenKind::If => {
                let block = self.nested(open.start, |p| p.parse_if_block())?;
                Ok(Braced::Node(block))
            }
            TokenKind::For => {
                let block = self.nested(open.start, |p| p.parse_for_block())?;
                Ok(Braced::Node(block))
            }
            TokenKind::Else => self.parse_else_clause().map(Braced::Boundary),
            TokenKind::Slash => self.parse_block_end().map(Braced::Boundary),
            _ => {
                self.advance()?; // '{'
                let expr = self.parse_expression()?;
                self.expect_token(&TokenKind::RBrace, "'}' after expression")?;
                Ok(Braced::Node(Node::Expression {
                    expr,
                    span: Span::new(open.start, self.last_end),
                }))
            }
        }
    }

    /// Parse `{else}` or `{else if expr}`
    fn parse_else_clause(&mut self) -> Result<Boundary, ParseError> {
        let open = self.advance()?; // '{'
        self.advance()?; // 'else'

        if self.match_token(&TokenKind::If)? {
            let guard = self.parse_expression()?;
            self.expect_token(&TokenKind::RBrace, "'}' to close {else if}")?;
            return Ok(Boundary::ElseIf {
                guard,
                span: Span::new(open.span.start, self.last_end),
            });
        }

        self.expect_token(&TokenKind::RBrace, "'}' after else")?;
        Ok(Boundary::Else {
            span: Span::new(open.span.start, self.last_end),
        })
    }

    /// Parse `{/if}` or `{/for}`
    fn parse_block_end(&mut self) -> Result<Boundary, ParseError> {
        let open = self.advance()?; // '{'
        self.advance()?; // '/'

        let is_if = match self.peek_kind()? {
            TokenKind::If => true,
            TokenKind::For => false,
            _ => return Err(self.unexpected("'if' or 'for' after '{/'")?),
        };
        self.advance()?;
        self.expect_token(&TokenKind::RBrace, "'}' to close block end")?;

        let span = Span::new(open.span.start, self.last_end);
        Ok(if is_if {
            Boundary::EndIf { span }
        } else {
            Boundary::EndFor { span }
        })
    }

    /// Parse `{if expr}` through the matching `{/if}`
    fn parse_if_block(&mut self) -> Result<Node, ParseError> {
        let open = self.advance()?; // '{'
        self.advance()?; // 'if'
        let mut guard = Some(self.parse_expression()?);
        self.expect_token(&TokenKind::RBrace, "'}' after if condition")?;

        let mut branches = Vec::new();
        let mut branch_start = open.span.start;
        let mut else_span: Option<Span> = None;

        loop {
            let (body, boundary) = self.parse_nodes()?;
            let branch_span = Span::new(branch_start, boundary.offset());

            match boundary {
                Boundary::ElseIf {
                    guard: next_guard,
                    span,
                } => {
                    if let Some(else_span) = else_span {
                        return Err(ParseError::UnexpectedElseIf {
                            location: self.location(span.start),
                            else_at: self.location(else_span.start),
                        });
                    }
                    branches.push(IfBranch {
                        guard: guard.take(),
                        body,
                        span: branch_span,
                    });
                    guard = Some(next_guard);
                    branch_start = span.start;
                }
                Boundary::Else { span } => {
                    if else_span.is_some() {
                        return Err(self.unexpected_boundary(&Boundary::Else { span }, "'{/if}'"));
                    }
                    branches.push(IfBranch {
                        guard: guard.take(),
                        body,
                        span: branch_span,
                    });
                    else_span = Some(span);
                    branch_start = span.start;
                }
                Boundary::EndIf { span } => {
                    branches.push(IfBranch {
                        guard: guard.take(),
                        body,
                        span: branch_span,
                    });
                    return Ok(Node::If(IfBlock {
                        branches,
                        span: open.span.to(span),
                    }));
                }
                Boundary::EndOfInput { .. } => {
                    return Err(ParseError::UnterminatedBlock {
                        block: "if",
                        opened_at: self.location(open.span.start),
                    });
                }
                Boundary::CloseTag { name, span } => {
                    return Err(self.stray_close_tag(name, span, Some(("if", open.span.start))));
                }
                other => return Err(self.unexpected_boundary(&other, "'{/if}'")),
            }
        }
    }

    /// Parse `{for [let] item of expr}` through the matching `{/for}`
    fn parse_for_block(&mut self) -> Result<Node, ParseError> {
        let open = self.advance()?; // '{'
        self.advance()?; // 'for'
        self.match_token(&TokenKind::Let)?;
        let (binding, _) = self.expect_identifier("loop variable")?;
        self.expect_token(&TokenKind::Of, "'of' after loop variable")?;
        let source = self.parse_expression()?;
        self.expect_token(&TokenKind::RBrace, "'}' after for header")?;

        let (body, boundary) = self.parse_nodes()?;
        match boundary {
            Boundary::EndFor { span } => Ok(Node::For(ForBlock {
                binding,
                source,
                body,
                span: open.span.to(span),
            })),
            Boundary::EndOfInput { .. } => Err(ParseError::UnterminatedBlock {
                block: "for",
                opened_at: self.location(open.span.start),
            }),
            Boundary::CloseTag { name, span } => {
                Err(self.stray_close_tag(name, span, Some(("for", open.span.start))))
            }
            other => Err(self.unexpected_boundary(&other, "'{/for}'")),
        }
    }

    /// Error for a close tag that reaches a block or the document root.
    ///
    /// When it closes the innermost open element, the block between the two
    /// was left open. Otherwise it fails to match that element, or there is
    /// no element open at all.
    pub(crate) fn stray_close_tag(
        &self,
        name: String,
        span: Span,
        block: Option<(&'static str, usize)>,
    ) -> ParseError {
        let open = self.open_tags.last();
        if let (Some((open_name, _)), Some((block, block_start))) = (open, block) {
            if *open_name == name {
                return ParseError::UnterminatedBlock {
                    block,
                    opened_at: self.location(block_start),
                };
            }
        }
        ParseError::MismatchedCloseTag {
            expected: open.map(|(open_name, _)| open_name.clone()),
            opened_at: open.map(|(_, start)| self.location(*start)),
            found: name,
            found_at: self.location(span.start),
        }
    }

    /// Error for a boundary that does not close the current scope
    pub(crate) fn unexpected_boundary(&self, boundary: &Boundary, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: boundary.describe(),
            location: self.location(boundary.offset()),
        }
    }
}
