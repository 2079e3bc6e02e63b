//! Expression parsing implementation
//!
//! This module handles parsing of the JavaScript-like expression subset used
//! inside `{…}`, attribute values and frontmatter statements, using
//! precedence climbing for binary operators and recursive descent for
//! everything else.
//!
//! # Supported Expressions
//!
//! - Literals: numbers, strings, `true`/`false`, `null`, `undefined`
//! - Template strings with `${…}` substitutions
//! - Identifiers
//! - Binary operators: logical, equality/relational, arithmetic
//! - Unary operators: `!`, `-`, `+`
//! - Postfix: `.prop`, `?.prop`, calls
//! - Ternary: `? :`
//! - Array and object literals, parenthesized expressions
//!
//! # Precedence
//!
//! Loosest to tightest: ternary (right) < `||` < `&&` < equality/relational
//! < additive < multiplicative < prefix unary (right) < member/call. Binary
//! levels come from [`BinaryOp::precedence`]; all binary levels are
//! left-associative.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::error::ParseError;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::Parser;
use crate::parser::scanner::TemplateStop;

impl BinaryOp {
    /// Binary operator spelled by `kind`, if any
    pub fn from_token(kind: &TokenKind) -> Option<BinaryOp> {
        let op = match kind {
            TokenKind::OrOr => BinaryOp::Or,
            TokenKind::AndAnd => BinaryOp::And,
            TokenKind::EqEqEq => BinaryOp::StrictEq,
            TokenKind::NotEqEq => BinaryOp::StrictNe,
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::NotEq => BinaryOp::Ne,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::Le => BinaryOp::Le,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::Ge => BinaryOp::Ge,
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Mod,
            _ => return None,
        };
        Some(op)
    }

    /// Binding strength; higher binds tighter
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::StrictEq
            | BinaryOp::StrictNe
            | BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge => 3,
            BinaryOp::Add | BinaryOp::Sub => 4,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 5,
        }
    }
}

impl<'src> Parser<'src> {
    /// Parse expression (top-level entry point)
    ///
    /// Consumes the longest valid expression and leaves the cursor right
    /// after it; whatever follows is the caller's business.
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let at = self.peek()?.span.start;
        self.nested(at, |p| p.parse_ternary())
    }

    /// Parse ternary: condition ? then_branch : else_branch
    fn parse_ternary(&mut self) -> Result<Expr, ParseError> {
        let condition = self.parse_binary(1)?;

        if !self.match_token(&TokenKind::Question)? {
            return Ok(condition);
        }

        let then_branch = self.parse_expression()?;
        self.expect_token(&TokenKind::Colon, "':' in ternary expression")?;
        // Right-associative: `a ? b : c ? d : e` nests in the else branch
        let else_branch = self.parse_expression()?;

        let span = condition.span.to(else_branch.span);
        Ok(Expr::new(
            ExprKind::Ternary {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            },
            span,
        ))
    }

    /// Precedence climbing over binary operators binding at least as
    /// tightly as `min_precedence`
    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let Some(op) = BinaryOp::from_token(&self.peek_kind()?) else {
                break;
            };
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.advance()?;

            let right = self.parse_binary(precedence + 1)?;
            let span = left.span.to(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }

        Ok(left)
    }

    /// Parse unary (! - +)
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek_kind()? {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            _ => return self.parse_postfix(),
        };

        let op_token = self.advance()?;
        let operand = self.nested(op_token.span.start, |p| p.parse_unary())?;
        let span = op_token.span.to(operand.span);

        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    /// Parse postfix (. ?. ())
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            let optional = match self.peek_kind()? {
                TokenKind::Dot => false,
                TokenKind::QuestionDot => true,
                TokenKind::LParen => {
                    self.advance()?;
                    let args = self.parse_expression_list(&TokenKind::RParen, "')' after arguments")?;
                    let span = Span::new(expr.span.start, self.last_end);
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    );
                    continue;
                }
                _ => break,
            };

            self.advance()?; // '.' or '?.'
            let property = self.expect_word("property name")?;
            let span = Span::new(expr.span.start, self.last_end);
            expr = Expr::new(
                ExprKind::Member {
                    object: Box::new(expr),
                    property,
                    optional,
                },
                span,
            );
        }

        Ok(expr)
    }

    /// Comma-separated expressions up to and including `close`
    fn parse_expression_list(
        &mut self,
        close: &TokenKind,
        expected: &str,
    ) -> Result<Vec<Expr>, ParseError> {
        let mut items = Vec::new();

        if self.match_token(close)? {
            return Ok(items);
        }

        loop {
            items.push(self.parse_expression()?);

            if !self.match_token(&TokenKind::Comma)? {
                break;
            }
        }

        self.expect_token(close, expected)?;
        Ok(items)
    }

    /// Identifier or keyword, as allowed after `.` and as object keys
    fn expect_word(&mut self, expected: &str) -> Result<String, ParseError> {
        let kind = self.peek_kind()?;
        match kind.word() {
            Some(word) => {
                let word = word.to_string();
                self.advance()?;
                Ok(word)
            }
            None => Err(self.unexpected(expected)?),
        }
    }

    /// Parse primary (literals, identifiers, templates, arrays, objects,
    /// parenthesized expressions)
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let kind = match self.peek_kind()? {
            TokenKind::Ident(name) => ExprKind::Identifier(name),
            // Contextual keywords double as plain identifiers
            TokenKind::Of => ExprKind::Identifier("of".to_string()),
            TokenKind::From => ExprKind::Identifier("from".to_string()),
            TokenKind::Prop => ExprKind::Identifier("prop".to_string()),
            TokenKind::Number(n) => ExprKind::Number(n),
            TokenKind::Str(s) => ExprKind::String(s),
            TokenKind::True => ExprKind::Boolean(true),
            TokenKind::False => ExprKind::Boolean(false),
            TokenKind::Null => ExprKind::Null,
            TokenKind::Undefined => ExprKind::Undefined,
            TokenKind::Backtick => return self.parse_template(),
            TokenKind::LBracket => return self.parse_array(),
            TokenKind::LBrace => return self.parse_object(),
            TokenKind::LParen => {
                let open = self.advance()?;
                let inner = self.parse_expression()?;
                self.expect_token(&TokenKind::RParen, "')' after expression")?;
                let span = Span::new(open.span.start, self.last_end);
                return Ok(Expr::new(ExprKind::Paren(Box::new(inner)), span));
            }
            _ => return Err(self.unexpected("expression")?),
        };

        let token = self.advance()?;
        Ok(Expr::new(kind, token.span))
    }

    /// Parse `[a, b, …]`
    fn parse_array(&mut self) -> Result<Expr, ParseError> {
        let open = self.advance()?;
        let items = self.parse_expression_list(&TokenKind::RBracket, "']' after array elements")?;
        Ok(Expr::new(
            ExprKind::Array(items),
            Span::new(open.span.start, self.last_end),
        ))
    }

    /// Parse `{key: value, "key": value, …}`
    fn parse_object(&mut self) -> Result<Expr, ParseError> {
        let open = self.advance()?;
        let mut properties = Vec::new();

        if !self.match_token(&TokenKind::RBrace)? {
            loop {
                let key = match self.peek_kind()? {
                    TokenKind::Str(s) => {
                        self.advance()?;
                        PropertyKey::String(s)
                    }
                    _ => PropertyKey::Identifier(self.expect_word("property key")?),
                };
                self.expect_token(&TokenKind::Colon, "':' after property key")?;
                let value = self.parse_expression()?;
                properties.push(Property { key, value });

                if !self.match_token(&TokenKind::Comma)? {
                    break;
                }
            }
            self.expect_token(&TokenKind::RBrace, "'}' after object properties")?;
        }

        Ok(Expr::new(
            ExprKind::Object(properties),
            Span::new(open.span.start, self.last_end),
        ))
    }

    /// Parse `` `text ${expr} text` ``
    fn parse_template(&mut self) -> Result<Expr, ParseError> {
        let open = self.advance()?;
        let mut parts = Vec::new();

        loop {
            self.sync();
            let chunk = self.lexer.scan_template_chunk(open.span.start)?;
            if !chunk.text.is_empty() {
                parts.push(TemplatePart::Text(chunk.text));
            }

            match chunk.stop {
                TemplateStop::End => break,
                TemplateStop::Substitution => {
                    let expr = self.parse_expression()?;
                    self.expect_token(&TokenKind::RBrace, "'}' to close template substitution")?;
                    parts.push(TemplatePart::Substitution(expr));
                }
            }
        }

        self.last_end = self.lexer.position();
        Ok(Expr::new(
            ExprKind::Template(parts),
            Span::new(open.span.start, self.last_end),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_expr(source: &str) -> Expr {
        let mut parser = Parser::new(source);
        let expr = parser.parse_expression().unwrap();
        assert_eq!(parser.peek_kind().unwrap(), TokenKind::Eof, "trailing input in {source}");
        expr
    }

    #[test]
    fn test_precedence_table_ordering() {
        assert!(BinaryOp::Or.precedence() < BinaryOp::And.precedence());
        assert!(BinaryOp::And.precedence() < BinaryOp::StrictEq.precedence());
        assert!(BinaryOp::Lt.precedence() < BinaryOp::Add.precedence());
        assert!(BinaryOp::Sub.precedence() < BinaryOp::Mul.precedence());
        assert_eq!(BinaryOp::Eq.precedence(), BinaryOp::Ge.precedence());
    }

    #[test]
    fn test_parse_identifier_span() {
        let expr = parse_expr("  user ");
        assert_eq!(expr.as_identifier(), Some("user"));
        assert_eq!(expr.span, Span::new(2, 6));
    }

    #[test]
    fn test_binary_spans_cover_operands() {
        let expr = parse_expr("a + bc");
        assert_eq!(expr.span, Span::new(0, 6));
    }

    #[test]
    fn test_call_and_member_chain() {
        let expr = parse_expr("items.filter(x)?.length");
        match &expr.kind {
            ExprKind::Member {
                object,
                property,
                optional,
            } => {
                assert_eq!(property, "length");
                assert!(*optional);
                assert!(matches!(object.kind, ExprKind::Call { .. }));
            }
            other => panic!("Expected member access, got {:?}", other),
        }
        assert_eq!(expr.span, Span::new(0, 23));
    }

    #[test]
    fn test_keyword_property_and_contextual_identifier() {
        assert_eq!(parse_expr("loop.for").to_string(), "loop.for");
        assert_eq!(parse_expr("from + of").to_string(), "(from + of)");
    }

    #[test]
    fn test_template_parts() {
        let expr = parse_expr("`Hello ${user.name}, you have ${count + 1} items`");
        match &expr.kind {
            ExprKind::Template(parts) => {
                assert_eq!(parts.len(), 5);
                assert_eq!(parts[0], TemplatePart::Text("Hello ".to_string()));
                assert!(matches!(&parts[1], TemplatePart::Substitution(e) if e.to_string() == "user.name"));
                assert!(matches!(&parts[3], TemplatePart::Substitution(e) if e.to_string() == "(count + 1)"));
                assert_eq!(parts[4], TemplatePart::Text(" items".to_string()));
            }
            other => panic!("Expected template, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_template() {
        let expr = parse_expr("`a${`b${c}`}`");
        assert_eq!(expr.to_string(), "`a${`b${c}`}`");
    }

    #[test]
    fn test_unexpected_token_reports_expression() {
        let err = Parser::new(")").parse_expression().unwrap_err();
        match err {
            ParseError::UnexpectedToken {
                expected, found, ..
            } => {
                assert_eq!(expected, "expression");
                assert_eq!(found, "')'");
            }
            other => panic!("Expected UnexpectedToken, got {:?}", other),
        }
    }

    #[test]
    fn test_maximal_munch_leaves_cursor_after_expression() {
        let mut parser = Parser::new("a + b } rest");
        let expr = parser.parse_expression().unwrap();
        assert_eq!(expr.to_string(), "(a + b)");
        assert_eq!(parser.peek_kind().unwrap(), TokenKind::RBrace);
    }
}
