//! Mode-aware scanning
//!
//! The structural tokenizer in [`lexer`](super::lexer) only understands
//! expression and frontmatter syntax. Everything else in a Pico template is
//! read here, with the parser choosing the mode by calling the matching entry
//! point:
//!
//! | Mode      | Entry point                                   | Stops at                     |
//! |-----------|-----------------------------------------------|------------------------------|
//! | body      | [`Lexer::scan_text`], [`Lexer::body_lookahead`] | `{`, `<`, end of input       |
//! | raw       | [`Lexer::scan_raw_text`]                      | literal `</style>`/`</script>` |
//! | template  | [`Lexer::scan_template_chunk`]                | `${` or closing backtick     |
//! | name      | [`Lexer::scan_tag_name`], [`Lexer::scan_attribute_name`] | first non-name char |
//! | attribute | [`Lexer::attribute_lookahead`], [`Lexer::scan_tag_end`] | `>` or `/>`        |
//!
//! Frontmatter is lexed structurally. While the parser is inside it
//! ([`Lexer::set_frontmatter`]) a `---` line is a delimiter token; elsewhere
//! it is three minus signs.

use super::ast::Span;
use super::lexer::{LexError, Lexer};

/// What starts at the cursor in body mode, once any text run is consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyLookahead {
    /// `{`: expression, control-flow tag or block terminator
    Brace,
    /// `<name`
    OpenTag,
    /// `</`
    CloseTag,
    /// `<=`
    DynamicTag,
    /// `<!--`
    Comment,
    End,
}

/// What comes next inside a start tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeLookahead {
    /// `>` or `/>`
    TagEnd,
    /// `{`: shorthand attribute
    Shorthand,
    /// Start of an attribute name
    Name,
    /// Anything that cannot start an attribute
    Invalid,
    End,
}

/// Why a template chunk stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateStop {
    /// `${` consumed; an expression follows
    Substitution,
    /// Closing backtick consumed
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateChunk {
    pub text: String,
    pub stop: TemplateStop,
}

fn is_tag_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_attribute_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_attribute_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '-')
}

impl<'src> Lexer<'src> {
    /// Body mode: consume the text run up to the next `{`, `<` or end of
    /// input. Returns `None` when the run is empty.
    pub fn scan_text(&mut self) -> Option<Span> {
        let start = self.position;
        let len = self.source[start..]
            .find(['{', '<'])
            .unwrap_or(self.source.len() - start);
        if len == 0 {
            return None;
        }
        self.position += len;
        Some(Span::new(start, self.position))
    }

    /// Body mode: classify what starts at the cursor without consuming it
    pub fn body_lookahead(&self) -> BodyLookahead {
        match self.peek() {
            None => BodyLookahead::End,
            Some('{') => BodyLookahead::Brace,
            Some(_) if self.starts_with("<!--") => BodyLookahead::Comment,
            Some(_) if self.starts_with("</") => BodyLookahead::CloseTag,
            Some(_) if self.starts_with("<=") => BodyLookahead::DynamicTag,
            Some(_) => BodyLookahead::OpenTag,
        }
    }

    /// Consume `<!-- … -->`, returning the inner text and the full span
    pub fn scan_comment(&mut self) -> Result<(String, Span), LexError> {
        let start = self.position;
        let body_start = start + "<!--".len();

        match self.source[body_start..].find("-->") {
            Some(len) => {
                let content = self.source[body_start..body_start + len].to_string();
                self.position = body_start + len + "-->".len();
                Ok((content, Span::new(start, self.position)))
            }
            None => Err(self.error("Unterminated comment", start)),
        }
    }

    /// Raw mode: consume everything up to and including the literal
    /// `</tag>`, returning the span of the content in between. Returns
    /// `None` (cursor untouched) when the closing tag never appears.
    pub fn scan_raw_text(&mut self, tag: &str) -> Option<Span> {
        let closing = format!("</{}>", tag);
        let start = self.position;
        let len = self.source[start..].find(&closing)?;
        self.position = start + len + closing.len();
        Some(Span::new(start, start + len))
    }

    /// Template mode: read literal text after an opening backtick or a
    /// closed substitution. `opened_at` is the offset of the opening backtick.
    pub fn scan_template_chunk(&mut self, opened_at: usize) -> Result<TemplateChunk, LexError> {
        let mut text = String::new();

        while let Some(ch) = self.advance() {
            match ch {
                '`' => {
                    return Ok(TemplateChunk {
                        text,
                        stop: TemplateStop::End,
                    })
                }
                '$' if self.peek() == Some('{') => {
                    self.advance();
                    return Ok(TemplateChunk {
                        text,
                        stop: TemplateStop::Substitution,
                    });
                }
                '\\' => match self.advance() {
                    Some(escaped @ ('`' | '$' | '\\')) => text.push(escaped),
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some(other) => {
                        text.push('\\');
                        text.push(other);
                    }
                    None => break,
                },
                other => text.push(other),
            }
        }

        Err(self.error("Unterminated template literal", opened_at))
    }

    /// Name mode: read a tag name (`div`, `h1`, `my-widget`, `Card`)
    pub fn scan_tag_name(&mut self) -> Option<(String, Span)> {
        if !self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        let start = self.position;
        self.eat_while(is_tag_name_char);
        Some((
            self.source[start..self.position].to_string(),
            Span::new(start, self.position),
        ))
    }

    /// Name mode: read an attribute name (`class`, `aria-label`, `on:click`)
    pub fn scan_attribute_name(&mut self) -> Option<(String, Span)> {
        if !self.peek().is_some_and(is_attribute_name_start) {
            return None;
        }
        let start = self.position;
        self.eat_while(is_attribute_name_char);
        Some((
            self.source[start..self.position].to_string(),
            Span::new(start, self.position),
        ))
    }

    /// Skip blanks and classify the next item of a start tag
    pub fn attribute_lookahead(&mut self) -> AttributeLookahead {
        self.skip_whitespace();
        match self.peek() {
            None => AttributeLookahead::End,
            Some('>') => AttributeLookahead::TagEnd,
            Some('/') if self.peek_ahead(1) == Some('>') => AttributeLookahead::TagEnd,
            Some('{') => AttributeLookahead::Shorthand,
            Some(c) if is_attribute_name_start(c) => AttributeLookahead::Name,
            Some(_) => AttributeLookahead::Invalid,
        }
    }

    /// Consume `>` or `/>`, returning whether the tag is self-closing.
    /// Leaves the cursor untouched when neither is next.
    pub fn scan_tag_end(&mut self) -> Option<bool> {
        self.skip_whitespace();
        if self.eat('>') {
            Some(false)
        } else if self.eat_str("/>") {
            Some(true)
        } else {
            None
        }
    }

    /// Consume `prefix` if the input continues with it
    pub fn eat_str(&mut self, prefix: &str) -> bool {
        if self.starts_with(prefix) {
            self.position += prefix.len();
            true
        } else {
            false
        }
    }

    /// Consume `=` after an attribute name, allowing blanks around it
    pub fn eat_attribute_equals(&mut self) -> bool {
        let saved = self.position;
        self.skip_whitespace();
        if self.eat('=') {
            true
        } else {
            self.position = saved;
            false
        }
    }

    /// Text of a malformed attribute starting at `start`, for diagnostics
    pub fn attribute_text_at(&self, start: usize) -> &'src str {
        let rest = &self.source[start.min(self.source.len())..];
        let end = if rest.starts_with('{') {
            rest.find('}').map(|i| i + 1).unwrap_or(rest.len())
        } else {
            rest.find(|c: char| c.is_whitespace() || c == '>' || c == '/')
                .filter(|&i| i > 0)
                .unwrap_or_else(|| rest.chars().next().map_or(0, char::len_utf8))
        };
        &rest[..end]
    }

    /// Describe the next character for "found …" diagnostics
    pub fn describe_next(&self) -> String {
        match self.peek() {
            Some(c) if c.is_whitespace() => "whitespace".to_string(),
            Some(c) => format!("'{}'", c),
            None => "end of input".to_string(),
        }
    }

    /// Skip whitespace only (comments are text outside of expressions)
    pub fn skip_whitespace(&mut self) {
        self.eat_while(char::is_whitespace);
    }

    /// True when a `---` delimiter line starts at the cursor
    pub fn at_delimiter(&self) -> bool {
        if !self.starts_with("---") {
            return false;
        }
        let after = self.source[self.position + 3..].trim_start_matches([' ', '\t']);
        after.is_empty() || after.starts_with('\n') || after.starts_with("\r\n")
    }
}
