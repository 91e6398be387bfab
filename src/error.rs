//! Error types.
//!
//! Only malformed input fails a call: a tree string that cannot be read as a
//! tree ([`ParseError`]) or a lexicon whose type strings do not parse
//! ([`LexiconError`]). Everything that goes wrong *during* composition is a
//! node-local [`Diagnostic`](crate::Diagnostic) instead.

use thiserror::Error;

/// Fatal failure to read a bracket tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} at byte {offset}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Byte offset into the tree string where the problem was detected.
    pub offset: usize,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("empty tree string")]
    Empty,
    #[error("expected `[` to open the tree")]
    ExpectedOpen,
    #[error("expected `.` and a label directly after `[`")]
    MissingLabel,
    #[error("unclosed `[`")]
    Unclosed,
    #[error("unmatched `]`")]
    UnmatchedClose,
    #[error("unexpected input after the outermost tree")]
    TrailingInput,
    #[error("the `\\node(..){{..}};` form is only allowed as the outermost label")]
    MisplacedRootNode,
    #[error("unterminated `{{` or `(` group")]
    UnbalancedGroup,
}

/// Malformed semantic type string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeSyntaxError {
    #[error("expected {expected}, found `{found}` at byte {offset}")]
    UnexpectedChar { found: char, offset: usize, expected: &'static str },
    #[error("expected {expected}, found end of input")]
    UnexpectedEnd { expected: &'static str },
    #[error("unexpected trailing input at byte {offset}")]
    Trailing { offset: usize },
}

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("invalid semantic type `{ty}`: {source}")]
    InvalidType { ty: String, source: TypeSyntaxError },
    #[error("malformed lexicon JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Crate-level error for callers that load lexicons and trees together.
#[derive(Debug, Error)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("lexicon error: {0}")]
    Lexicon(#[from] LexiconError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_message_names_kind_and_offset() {
        let err = ParseError::new(ParseErrorKind::Unclosed, 4);
        assert_eq!(err.to_string(), "unclosed `[` at byte 4");
    }

    #[test]
    fn lexicon_error_wraps_type_error() {
        let err = LexiconError::InvalidType { ty: "<e".into(), source: TypeSyntaxError::UnexpectedEnd { expected: "`,`" } };
        assert_eq!(err.to_string(), "invalid semantic type `<e`: expected `,`, found end of input");
        let wrapped: Error = err.into();
        assert!(matches!(wrapped, Error::Lexicon(LexiconError::InvalidType { .. })));
    }
}
