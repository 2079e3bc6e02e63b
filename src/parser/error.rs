//! Parse error types
//!
//! Every failure in the pipeline is reported as a [`ParseError`]. Errors are
//! fatal: the parser stops at the first one and hands it back unchanged, with
//! no recovery and no partial tree.

use crate::parser::ast::SourceLocation;
use thiserror::Error;

/// Errors produced while turning Pico source into a [`Document`].
///
/// [`Document`]: crate::parser::ast::Document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Invalid character, unterminated literal or comment
    #[error("Lexer error at {location}: {message}")]
    Lex {
        message: String,
        location: SourceLocation,
    },

    /// A token that cannot start or continue the construct being parsed
    #[error("Parse error at {location}: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        location: SourceLocation,
    },

    /// `{if}`, `{for}` or frontmatter still open at end of input
    #[error("Unterminated {{{block}}} block opened at {opened_at}")]
    UnterminatedBlock {
        block: &'static str,
        opened_at: SourceLocation,
    },

    /// Element still open at end of input
    #[error("Unterminated element <{name}> opened at {opened_at}")]
    UnterminatedElement {
        name: String,
        opened_at: SourceLocation,
    },

    /// `</found>` does not close the innermost open `<expected>`. Both
    /// opener fields are `None` when no element is open.
    #[error(
        "Mismatched close tag at {found_at}: found </{found}>, {}",
        describe_opener(.expected, .opened_at)
    )]
    MismatchedCloseTag {
        expected: Option<String>,
        opened_at: Option<SourceLocation>,
        found: String,
        found_at: SourceLocation,
    },

    /// `{else if}` following a plain `{else}`
    #[error("Unexpected {{else if}} at {location} after {{else}} at {else_at}")]
    UnexpectedElseIf {
        location: SourceLocation,
        else_at: SourceLocation,
    },

    /// Tag attribute that matches none of the four attribute forms
    #[error("Invalid attribute `{attribute}` on <{tag}> at {location}")]
    InvalidAttribute {
        tag: String,
        attribute: String,
        location: SourceLocation,
    },

    /// Nesting deeper than [`ParseOptions::max_depth`]
    ///
    /// [`ParseOptions::max_depth`]: crate::parser::parse::ParseOptions::max_depth
    #[error("Nesting limit of {limit} exceeded at {location}")]
    RecursionLimitExceeded {
        limit: usize,
        location: SourceLocation,
    },
}

fn describe_opener(expected: &Option<String>, opened_at: &Option<SourceLocation>) -> String {
    match (expected, opened_at) {
        (Some(name), Some(at)) => format!("but <{}> opened at {} is still open", name, at),
        _ => "but no element is open".to_string(),
    }
}

impl ParseError {
    /// Primary location to point a diagnostic at
    pub fn location(&self) -> SourceLocation {
        match self {
            ParseError::Lex { location, .. }
            | ParseError::UnexpectedToken { location, .. }
            | ParseError::UnexpectedElseIf { location, .. }
            | ParseError::InvalidAttribute { location, .. }
            | ParseError::RecursionLimitExceeded { location, .. } => *location,
            ParseError::UnterminatedBlock { opened_at, .. }
            | ParseError::UnterminatedElement { opened_at, .. } => *opened_at,
            ParseError::MismatchedCloseTag { found_at, .. } => *found_at,
        }
    }
}
