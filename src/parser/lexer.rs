//! Lexer (tokenizer) for Pico structural tokens
//!
//! Unlike a classic up-front tokenizer, the [`Lexer`] is a cursor that the
//! parser drives one token at a time. Structural tokens (punctuation,
//! keywords, literals, operators) come from [`Lexer::next_token`]; text, raw
//! text, names and template chunks come from the mode-aware entry points in
//! [`scanner`](super::scanner). The parser may rewind the cursor with
//! [`Lexer::reset`] before switching modes.

use super::ast::{LineIndex, SourceLocation, Span};
use super::error::ParseError;
use std::fmt;

/// Token variants produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Number(f64),
    Str(String),

    // Identifiers
    Ident(String),

    // Keywords
    If,
    Else,
    For,
    Of,
    Let,
    Const,
    Import,
    From,
    Prop,
    True,
    False,
    Null,
    Undefined,

    // Arithmetic
    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Percent, // %

    // Comparison
    EqEqEq,   // ===
    NotEqEq,  // !==
    EqEq,     // ==
    NotEq,    // !=
    Lt,       // <
    Le,       // <=
    Gt,       // >
    Ge,       // >=

    // Logical
    AndAnd, // &&
    OrOr,   // ||
    Bang,   // !

    // Member access / ternary
    Dot,         // .
    QuestionDot, // ?.
    Question,    // ?
    Colon,       // :

    // Punctuation
    Eq,        // =
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]
    Semicolon, // ;
    Comma,     // ,
    Backtick,  // `

    // Markup
    LtSlash, // </
    SlashGt, // />

    /// `---` line opening or closing the frontmatter
    Delimiter,

    Eof,
}

impl TokenKind {
    /// Spelling of identifiers and keywords, for positions where any word is
    /// accepted (object keys, property names).
    pub fn word(&self) -> Option<&str> {
        let word = match self {
            TokenKind::Ident(name) => name.as_str(),
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::For => "for",
            TokenKind::Of => "of",
            TokenKind::Let => "let",
            TokenKind::Const => "const",
            TokenKind::Import => "import",
            TokenKind::From => "from",
            TokenKind::Prop => "prop",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            TokenKind::Undefined => "undefined",
            _ => return None,
        };
        Some(word)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "number {}", n),
            TokenKind::Str(s) => write!(f, "string {:?}", s),
            TokenKind::Ident(s) => write!(f, "identifier '{}'", s),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::Percent => write!(f, "'%'"),
            TokenKind::EqEqEq => write!(f, "'==='"),
            TokenKind::NotEqEq => write!(f, "'!=='"),
            TokenKind::EqEq => write!(f, "'=='"),
            TokenKind::NotEq => write!(f, "'!='"),
            TokenKind::Lt => write!(f, "'<'"),
            TokenKind::Le => write!(f, "'<='"),
            TokenKind::Gt => write!(f, "'>'"),
            TokenKind::Ge => write!(f, "'>='"),
            TokenKind::AndAnd => write!(f, "'&&'"),
            TokenKind::OrOr => write!(f, "'||'"),
            TokenKind::Bang => write!(f, "'!'"),
            TokenKind::Dot => write!(f, "'.'"),
            TokenKind::QuestionDot => write!(f, "'?.'"),
            TokenKind::Question => write!(f, "'?'"),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::Eq => write!(f, "'='"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::RBrace => write!(f, "'}}'"),
            TokenKind::LBracket => write!(f, "'['"),
            TokenKind::RBracket => write!(f, "']'"),
            TokenKind::Semicolon => write!(f, "';'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Backtick => write!(f, "'`'"),
            TokenKind::LtSlash => write!(f, "'</'"),
            TokenKind::SlashGt => write!(f, "'/>'"),
            TokenKind::Delimiter => write!(f, "'---'"),
            TokenKind::Eof => write!(f, "end of input"),
            keyword => match keyword.word() {
                Some(word) => write!(f, "'{}'", word),
                None => write!(f, "{:?}", keyword),
            },
        }
    }
}

/// A token together with the byte range it was read from
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lexer error at {}: {}", self.location, self.message)
    }
}

impl std::error::Error for LexError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::Lex {
            message: err.message,
            location: err.location,
        }
    }
}

/// Cursor over Pico source text
pub struct Lexer<'src> {
    pub(crate) source: &'src str,
    pub(crate) position: usize,
    /// Whether a `---` line lexes as [`TokenKind::Delimiter`]
    frontmatter: bool,
    line_index: LineIndex,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source string.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            position: 0,
            frontmatter: false,
            line_index: LineIndex::new(source),
        }
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Byte offset of the cursor
    pub fn position(&self) -> usize {
        self.position
    }

    /// Enter or leave frontmatter, where `---` lines are delimiters.
    /// Everywhere else `---` is three minus signs.
    pub fn set_frontmatter(&mut self, frontmatter: bool) {
        self.frontmatter = frontmatter;
    }

    /// Move the cursor back (or forward) to `offset`
    pub fn reset(&mut self, offset: usize) {
        self.position = offset.min(self.source.len());
    }

    pub fn location(&self, offset: usize) -> SourceLocation {
        self.line_index.location(self.source, offset)
    }

    pub(crate) fn error(&self, message: impl Into<String>, offset: usize) -> LexError {
        LexError {
            message: message.into(),
            location: self.location(offset),
        }
    }

    /// Tokenize the remaining input as structural tokens, up to and including
    /// `Eof`. Only meaningful for expression or frontmatter text.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Get next structural token
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia()?;

        let start = self.position;
        let ch = match self.advance() {
            Some(ch) => ch,
            None => return Ok(Token::new(TokenKind::Eof, Span::new(start, start))),
        };

        let kind = match ch {
            // String literals
            '"' | '\'' => return self.string_literal(ch, start),

            // Numeric literals
            '0'..='9' => return self.number_literal(start),

            // Identifiers and keywords
            'a'..='z' | 'A'..='Z' | '_' => return Ok(self.identifier_or_keyword(start)),

            '+' => TokenKind::Plus,
            '-' => {
                if self.frontmatter && self.delimiter_follows() {
                    return Ok(self.delimiter(start));
                }
                TokenKind::Minus
            }
            '*' => TokenKind::Star,
            '/' => {
                if self.eat('>') {
                    TokenKind::SlashGt
                } else {
                    TokenKind::Slash
                }
            }
            '%' => TokenKind::Percent,
            '=' => {
                if self.eat('=') {
                    if self.eat('=') {
                        TokenKind::EqEqEq
                    } else {
                        TokenKind::EqEq
                    }
                } else {
                    TokenKind::Eq
                }
            }
            '!' => {
                if self.eat('=') {
                    if self.eat('=') {
                        TokenKind::NotEqEq
                    } else {
                        TokenKind::NotEq
                    }
                } else {
                    TokenKind::Bang
                }
            }
            '<' => {
                if self.eat('/') {
                    TokenKind::LtSlash
                } else if self.eat('=') {
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.eat('=') {
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            '&' => {
                if self.eat('&') {
                    TokenKind::AndAnd
                } else {
                    return Err(self.error("Unexpected character: '&' (did you mean '&&'?)", start));
                }
            }
            '|' => {
                if self.eat('|') {
                    TokenKind::OrOr
                } else {
                    return Err(self.error("Unexpected character: '|' (did you mean '||'?)", start));
                }
            }
            '?' => {
                // `a?.5:1` is a ternary, not optional chaining
                let digit_next = self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit());
                if self.peek() == Some('.') && !digit_next {
                    self.advance();
                    TokenKind::QuestionDot
                } else {
                    TokenKind::Question
                }
            }
            '.' => TokenKind::Dot,
            ':' => TokenKind::Colon,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '`' => TokenKind::Backtick,

            _ => {
                return Err(self.error(format!("Unexpected character: '{}'", ch), start));
            }
        };

        Ok(Token::new(kind, Span::new(start, self.position)))
    }

    /// Parse string literal (single or double quoted)
    fn string_literal(&mut self, quote: char, start: usize) -> Result<Token, LexError> {
        let mut string = String::new();

        while let Some(ch) = self.advance() {
            if ch == quote {
                return Ok(Token::new(
                    TokenKind::Str(string),
                    Span::new(start, self.position),
                ));
            }

            if ch == '\\' {
                let escaped = self
                    .advance()
                    .ok_or_else(|| self.error("Unterminated string literal", start))?;
                match escaped {
                    'n' => string.push('\n'),
                    't' => string.push('\t'),
                    'r' => string.push('\r'),
                    '\\' | '\'' | '"' => string.push(escaped),
                    // Anything else is kept as written
                    other => {
                        string.push('\\');
                        string.push(other);
                    }
                }
            } else {
                string.push(ch);
            }
        }

        Err(self.error("Unterminated string literal", start))
    }

    /// Parse numeric literal: digits with an optional fractional part
    fn number_literal(&mut self, start: usize) -> Result<Token, LexError> {
        self.eat_while(|c| c.is_ascii_digit());

        if self.peek() == Some('.') && self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) {
            self.advance(); // consume '.'
            self.eat_while(|c| c.is_ascii_digit());
        }

        let text = &self.source[start..self.position];
        let value = text
            .parse::<f64>()
            .map_err(|_| self.error(format!("Invalid number literal: {}", text), start))?;

        Ok(Token::new(TokenKind::Number(value), Span::new(start, self.position)))
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, start: usize) -> Token {
        self.eat_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let ident = &self.source[start..self.position];

        let kind = match ident {
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "for" => TokenKind::For,
            "of" => TokenKind::Of,
            "let" => TokenKind::Let,
            "const" => TokenKind::Const,
            "import" => TokenKind::Import,
            "from" => TokenKind::From,
            "prop" => TokenKind::Prop,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            "undefined" => TokenKind::Undefined,
            _ => TokenKind::Ident(ident.to_string()),
        };

        Token::new(kind, Span::new(start, self.position))
    }

    /// True when the cursor (just past one '-') sits on `--` followed by
    /// optional blanks and a line break or end of input.
    fn delimiter_follows(&self) -> bool {
        let rest = &self.source[self.position..];
        let Some(after) = rest.strip_prefix("--") else {
            return false;
        };
        let after = after.trim_start_matches([' ', '\t']);
        after.is_empty() || after.starts_with('\n') || after.starts_with("\r\n")
    }

    fn delimiter(&mut self, start: usize) -> Token {
        self.position += 2;
        self.eat_while(|c| c == ' ' || c == '\t');
        if !self.eat('\n') && self.eat('\r') {
            self.eat('\n');
        }
        Token::new(TokenKind::Delimiter, Span::new(start, self.position))
    }

    /// Skip whitespace and comments
    pub(crate) fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        // Single-line comment
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        // Multi-line comment
                        self.skip_block_comment()?;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip single-line comment (// ...)
    fn skip_line_comment(&mut self) {
        self.eat_while(|c| c != '\n');
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start = self.position;
        self.position += 2; // skip "/*"

        match self.source[self.position..].find("*/") {
            Some(end) => {
                self.position += end + 2;
                Ok(())
            }
            None => {
                self.position = self.source.len();
                Err(self.error("Unterminated block comment", start))
            }
        }
    }

    /// Peek at current character without consuming
    pub(crate) fn peek(&self) -> Option<char> {
        self.source[self.position..].chars().next()
    }

    /// Peek ahead n characters
    pub(crate) fn peek_ahead(&self, n: usize) -> Option<char> {
        self.source[self.position..].chars().nth(n)
    }

    pub(crate) fn starts_with(&self, prefix: &str) -> bool {
        self.source[self.position..].starts_with(prefix)
    }

    /// Advance to next character
    pub(crate) fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += ch.len_utf8();
        Some(ch)
    }

    /// Consume `expected` if it is the next character
    pub(crate) fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.advance();
        }
    }
}
