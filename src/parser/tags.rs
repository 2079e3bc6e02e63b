//! Tag parsing
//!
//! Handles every construct that starts with `<` in body position:
//!
//! - HTML elements (`<div>`, `<my-widget>`) and components (`<Card>`),
//!   classified by the case of the first letter of the name
//! - Raw elements (`<style>`, `<script>`) whose content is kept verbatim
//! - Dynamic components (`<={Comp} />`, `<="Card" />`), always self-closing
//! - Close tags, which end a child list and are matched by the opener
//!
//! # Attributes
//!
//! ```text
//! {name}          shorthand
//! name={expr}     expression
//! name="text"     string
//! name            boolean
//! ```
//!
//! Tag structure (`<`, names, `=`, `>`, `/>`) is read character by character;
//! only attribute values go through the structural tokenizer.

use crate::parser::ast::*;
use crate::parser::error::ParseError;
use crate::parser::lexer::TokenKind;
use crate::parser::nodes::Boundary;
use crate::parser::parse::Parser;
use crate::parser::scanner::AttributeLookahead;
use tracing::trace;

/// Components are named with a leading upper-case letter
fn is_component_name(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_uppercase())
}

impl<'src> Parser<'src> {
    /// Parse an element, component or raw element starting at `<`
    pub(crate) fn parse_tag(&mut self) -> Result<Node, ParseError> {
        self.sync();
        let start = self.lexer.position();
        self.lexer.eat('<');

        let (name, _) = self.tag_name()?;
        let attributes = self.parse_attributes(&name, start)?;
        let self_closing = self.tag_end()?;
        trace!(%name, self_closing, "start tag");

        if name == "style" || name == "script" {
            return self.finish_raw_element(name, attributes, start, self_closing);
        }

        let children = if self_closing {
            None
        } else {
            self.open_tags.push((name.clone(), start));
            let children = self.parse_children(&name, start);
            self.open_tags.pop();
            Some(children?)
        };

        let element = Element {
            name,
            attributes,
            children,
            span: Span::new(start, self.last_end),
        };

        Ok(if is_component_name(&element.name) {
            Node::Component(element)
        } else {
            Node::Html(element)
        })
    }

    /// Parse child nodes up to the close tag matching `name`
    fn parse_children(&mut self, name: &str, start: usize) -> Result<Vec<Node>, ParseError> {
        let (children, boundary) = self.parse_nodes()?;

        match boundary {
            Boundary::CloseTag { name: found, .. } if found == name => Ok(children),
            Boundary::CloseTag { name: found, span } => Err(ParseError::MismatchedCloseTag {
                expected: Some(name.to_string()),
                opened_at: Some(self.location(start)),
                found,
                found_at: self.location(span.start),
            }),
            Boundary::EndOfInput { .. } => Err(ParseError::UnterminatedElement {
                name: name.to_string(),
                opened_at: self.location(start),
            }),
            other => Err(self.unexpected_boundary(&other, &format!("'</{}>'", name))),
        }
    }

    /// Read the verbatim content of `<style>` or `<script>`
    fn finish_raw_element(
        &mut self,
        name: String,
        attributes: Vec<Attribute>,
        start: usize,
        self_closing: bool,
    ) -> Result<Node, ParseError> {
        let content = if self_closing {
            String::new()
        } else {
            match self.lexer.scan_raw_text(&name) {
                Some(span) => {
                    self.last_end = self.lexer.position();
                    self.source()[span.start..span.end].to_string()
                }
                None => {
                    return Err(ParseError::UnterminatedElement {
                        name,
                        opened_at: self.location(start),
                    })
                }
            }
        };

        let element = RawElement {
            attributes,
            content,
            span: Span::new(start, self.last_end),
        };

        Ok(if name == "style" {
            Node::Style(element)
        } else {
            Node::Script(element)
        })
    }

    /// Parse `</name>` into a boundary for the enclosing scope
    pub(crate) fn parse_close_tag(&mut self) -> Result<Boundary, ParseError> {
        self.sync();
        let start = self.lexer.position();
        self.lexer.eat_str("</");

        let (name, _) = self.tag_name()?;
        self.lexer.skip_whitespace();
        if !self.lexer.eat('>') {
            return Err(self.unexpected_char("'>' to end close tag"));
        }
        self.last_end = self.lexer.position();

        Ok(Boundary::CloseTag {
            name,
            span: Span::new(start, self.last_end),
        })
    }

    /// Parse `<="Name" … />` or `<={binding} … />`
    pub(crate) fn parse_dynamic_component(&mut self) -> Result<Node, ParseError> {
        self.sync();
        let start = self.lexer.position();
        self.lexer.eat_str("<=");

        let target = match self.peek_kind()? {
            TokenKind::Str(name) => {
                self.advance()?;
                DynamicTarget::Literal(name)
            }
            TokenKind::LBrace => {
                self.advance()?;
                let (name, _) = self.expect_identifier("identifier")?;
                self.expect_token(&TokenKind::RBrace, "'}' after component binding")?;
                DynamicTarget::Binding(name)
            }
            _ => return Err(self.unexpected("string or {identifier} after '<='")?),
        };

        // Used in diagnostics as the tag name, e.g. `<={comp}>`
        let label = self.source()[start + 1..self.last_end].to_string();
        let attributes = self.parse_attributes(&label, start)?;

        self.lexer.skip_whitespace();
        if !self.lexer.starts_with("/>") {
            return Err(ParseError::UnexpectedToken {
                expected: "'/>' (dynamic components are self-closing)".to_string(),
                found: self.lexer.describe_next(),
                location: self.location(self.lexer.position()),
            });
        }
        self.tag_end()?;

        Ok(Node::DynamicComponent(DynamicComponent {
            target,
            attributes,
            span: Span::new(start, self.last_end),
        }))
    }

    /// Parse attributes up to the end of a start tag
    fn parse_attributes(&mut self, tag: &str, start: usize) -> Result<Vec<Attribute>, ParseError> {
        let mut attributes = Vec::new();

        loop {
            self.sync();
            match self.lexer.attribute_lookahead() {
                AttributeLookahead::TagEnd => return Ok(attributes),
                AttributeLookahead::End => {
                    return Err(ParseError::UnterminatedElement {
                        name: tag.to_string(),
                        opened_at: self.location(start),
                    })
                }
                AttributeLookahead::Invalid => {
                    let at = self.lexer.position();
                    return Err(self.invalid_attribute(tag, at));
                }
                AttributeLookahead::Shorthand => attributes.push(self.parse_shorthand(tag)?),
                AttributeLookahead::Name => attributes.push(self.parse_named_attribute(tag)?),
            }
        }
    }

    /// `{name}`
    fn parse_shorthand(&mut self, tag: &str) -> Result<Attribute, ParseError> {
        let at = self.lexer.position();
        self.advance()?; // '{'

        let name = match self.peek_kind()? {
            TokenKind::Ident(name) => {
                self.advance()?;
                name
            }
            _ => return Err(self.invalid_attribute(tag, at)),
        };
        if !self.match_token(&TokenKind::RBrace)? {
            return Err(self.invalid_attribute(tag, at));
        }

        Ok(Attribute::Shorthand {
            name,
            span: Span::new(at, self.last_end),
        })
    }

    /// `name`, `name="text"` or `name={expr}`
    fn parse_named_attribute(&mut self, tag: &str) -> Result<Attribute, ParseError> {
        let Some((name, name_span)) = self.lexer.scan_attribute_name() else {
            let at = self.lexer.position();
            return Err(self.invalid_attribute(tag, at));
        };
        self.last_end = name_span.end;

        if !self.lexer.eat_attribute_equals() {
            return Ok(Attribute::Boolean {
                name,
                span: name_span,
            });
        }

        self.lexer.skip_whitespace();
        match self.lexer.peek() {
            Some('"' | '\'') => {
                let token = self.advance()?;
                match token.kind {
                    TokenKind::Str(value) => Ok(Attribute::String {
                        name,
                        value,
                        span: name_span.to(token.span),
                    }),
                    _ => Err(self.invalid_attribute(tag, name_span.start)),
                }
            }
            Some('{') => {
                self.advance()?;
                let value = self.parse_expression()?;
                self.expect_token(&TokenKind::RBrace, "'}' after attribute value")?;
                Ok(Attribute::Expression {
                    name,
                    value,
                    span: Span::new(name_span.start, self.last_end),
                })
            }
            _ => Err(self.invalid_attribute(tag, name_span.start)),
        }
    }

    /// Consume `>` or `/>` and report whether the tag closed itself
    fn tag_end(&mut self) -> Result<bool, ParseError> {
        match self.lexer.scan_tag_end() {
            Some(self_closing) => {
                self.last_end = self.lexer.position();
                Ok(self_closing)
            }
            None => Err(self.unexpected_char("'>' or '/>'")),
        }
    }

    fn tag_name(&mut self) -> Result<(String, Span), ParseError> {
        match self.lexer.scan_tag_name() {
            Some(name) => Ok(name),
            None => Err(self.unexpected_char("tag name")),
        }
    }

    fn unexpected_char(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: self.lexer.describe_next(),
            location: self.location(self.lexer.position()),
        }
    }

    fn invalid_attribute(&self, tag: &str, at: usize) -> ParseError {
        ParseError::InvalidAttribute {
            tag: tag.to_string(),
            attribute: self.lexer.attribute_text_at(at).to_string(),
            location: self.location(at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<Document, ParseError> {
        Parser::new(source).parse_document()
    }

    fn first(source: &str) -> Node {
        parse(source).unwrap().nodes.remove(0)
    }

    #[test]
    fn test_component_and_html_classification() {
        assert!(matches!(first("<Card />"), Node::Component(_)));
        assert!(matches!(first("<card />"), Node::Html(_)));
        assert!(matches!(first("<my-widget></my-widget>"), Node::Html(_)));
    }

    #[test]
    fn test_self_closing_has_no_children() {
        match first("<br/>") {
            Node::Html(element) => {
                assert!(element.is_self_closing());
                assert_eq!(element.span, Span::new(0, 5));
            }
            other => panic!("Expected html element, got {:?}", other),
        }

        match first("<p></p>") {
            Node::Html(element) => {
                assert!(!element.is_self_closing());
                assert!(element.children().is_empty());
            }
            other => panic!("Expected html element, got {:?}", other),
        }
    }

    #[test]
    fn test_all_attribute_forms() {
        let node = first(r#"<input {value} type="text" on:input={update(value)} disabled />"#);
        let Node::Html(element) = node else {
            panic!("Expected html element");
        };

        assert_eq!(element.attributes.len(), 4);
        assert!(matches!(&element.attributes[0], Attribute::Shorthand { name, .. } if name == "value"));
        assert!(matches!(
            &element.attributes[1],
            Attribute::String { name, value, .. } if name == "type" && value == "text"
        ));
        assert!(matches!(
            &element.attributes[2],
            Attribute::Expression { name, value, .. } if name == "on:input" && value.to_string() == "update(value)"
        ));
        assert!(matches!(&element.attributes[3], Attribute::Boolean { name, .. } if name == "disabled"));
    }

    #[test]
    fn test_attribute_value_equality_is_not_an_operator() {
        let node = first(r#"<a title =  "x">y</a>"#);
        let Node::Html(element) = node else {
            panic!("Expected html element");
        };
        assert!(matches!(&element.attributes[0], Attribute::String { value, .. } if value == "x"));
    }

    #[test]
    fn test_text_after_tag_may_start_with_equals() {
        let node = first("<p>=5</p>");
        let Node::Html(element) = node else {
            panic!("Expected html element");
        };
        assert!(matches!(&element.children()[0], Node::Text { content, .. } if content == "=5"));
    }

    #[test]
    fn test_invalid_attributes() {
        let err = parse("<div #id></div>").unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidAttribute { ref tag, ref attribute, .. } if tag == "div" && attribute == "#id"
        ));

        let err = parse("<div {a.b}></div>").unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidAttribute { ref attribute, .. } if attribute == "{a.b}"
        ));

        let err = parse("<div class=big></div>").unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidAttribute { ref attribute, .. } if attribute == "class=big"
        ));
    }

    #[test]
    fn test_raw_elements_keep_content_verbatim() {
        match first("<style lang=\"css\">p { color: red } </style>") {
            Node::Style(raw) => {
                assert_eq!(raw.content, "p { color: red } ");
                assert_eq!(raw.attributes.len(), 1);
            }
            other => panic!("Expected style, got {:?}", other),
        }

        match first("<script>if (a < b) { go(\"</div>\") }</script>") {
            Node::Script(raw) => assert_eq!(raw.content, "if (a < b) { go(\"</div>\") }"),
            other => panic!("Expected script, got {:?}", other),
        }

        match first("<script src=\"x.js\" />") {
            Node::Script(raw) => assert!(raw.content.is_empty()),
            other => panic!("Expected script, got {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_raw_element() {
        let err = parse("<script>let x = 1;").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnterminatedElement { ref name, .. } if name == "script"
        ));
    }

    #[test]
    fn test_raw_close_tag_is_literal() {
        // Ordinary close tags allow blanks before '>'; raw ones must match exactly
        assert!(parse("<p>x</p >").is_ok());

        let err = parse("<style>x</style >").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnterminatedElement { ref name, .. } if name == "style"
        ));
    }

    #[test]
    fn test_dynamic_component_targets() {
        match first("<={Comp} title=\"x\" />") {
            Node::DynamicComponent(dynamic) => {
                assert_eq!(dynamic.target, DynamicTarget::Binding("Comp".to_string()));
                assert_eq!(dynamic.attributes.len(), 1);
            }
            other => panic!("Expected dynamic component, got {:?}", other),
        }

        match first("<=\"Card\"/>") {
            Node::DynamicComponent(dynamic) => {
                assert_eq!(dynamic.target, DynamicTarget::Literal("Card".to_string()));
            }
            other => panic!("Expected dynamic component, got {:?}", other),
        }
    }

    #[test]
    fn test_dynamic_component_must_self_close() {
        let err = parse("<={Comp}></Comp>").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedToken { ref found, .. } if found == "'>'"
        ));

        let err = parse("<=Comp />").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_close_tag_errors() {
        let err = parse("<div><span></div>").unwrap_err();
        assert!(matches!(
            err,
            ParseError::MismatchedCloseTag { ref expected, ref found, .. }
                if expected.as_deref() == Some("span") && found == "div"
        ));

        let err = parse("<div>").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnterminatedElement { ref name, .. } if name == "div"
        ));

        let err = parse("<div class=\"a\"").unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedElement { .. }));
    }

    #[test]
    fn test_close_tag_cuts_off_open_block() {
        let err = parse("<p>{if a}</p>{/if}").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnterminatedBlock { block: "if", opened_at } if opened_at.offset == 3
        ));

        let err = parse("<ul>{for x of xs}<li>{x}</li></ul>").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnterminatedBlock { block: "for", opened_at } if opened_at.offset == 4
        ));
    }

    #[test]
    fn test_close_tag_inside_block_names_the_open_element() {
        let err = parse("<div>{if a}</span>{/if}</div>").unwrap_err();
        match err {
            ParseError::MismatchedCloseTag {
                expected,
                opened_at,
                found,
                found_at,
            } => {
                assert_eq!(expected.as_deref(), Some("div"));
                assert_eq!(opened_at.map(|l| l.offset), Some(0));
                assert_eq!(found, "span");
                assert_eq!(found_at.offset, 11);
            }
            other => panic!("Expected mismatched close tag, got {:?}", other),
        }
    }
}
