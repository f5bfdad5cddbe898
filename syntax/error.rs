use std::error;
use std::fmt;
use std::fmt::Display;
use std::result;

use crate::span::SourcePosition;

/// Positioned syntax error
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pos: SourcePosition,
    kind: ErrorKind,
}

impl Error {
    pub fn new(pos: SourcePosition, kind: ErrorKind) -> Error {
        Error { pos, kind }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn pos(&self) -> &SourcePosition {
        &self.pos
    }
}

impl error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.pos, self.kind.message())
    }
}

/// Syntax error without position information
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    InvalidToken(char),
    UnterminatedString,
    UnsupportedStringEscape,
    IntegerOverflow,
    InvalidFloat,
    TooManyClosingParens,
    UnclosedExpression,
    DanglingQuote,
}

impl ErrorKind {
    /// Returns a string describing the error
    pub fn message(&self) -> String {
        match self {
            ErrorKind::InvalidToken(c) => format!("cannot parse text beginning with `{}`", c),
            ErrorKind::UnterminatedString => {
                "unexpected end of file while parsing string literal".to_owned()
            }
            ErrorKind::UnsupportedStringEscape => "unsupported string escape".to_owned(),
            ErrorKind::IntegerOverflow => "integer literal does not fit in i64".to_owned(),
            ErrorKind::InvalidFloat => "unable to parse float".to_owned(),
            ErrorKind::TooManyClosingParens => {
                "no corresponding opening parenthesis found".to_owned()
            }
            ErrorKind::UnclosedExpression => "unclosed expression".to_owned(),
            ErrorKind::DanglingQuote => "quote is not followed by a datum".to_owned(),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;
