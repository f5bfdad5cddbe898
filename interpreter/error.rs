use std::fmt::Display;
use std::{error, fmt, result};

use lispy_syntax::error::Error as SyntaxError;
use lispy_syntax::node::DataStr;
use lispy_syntax::span::SourcePosition;

/// Number of arguments a callable accepts
#[derive(PartialEq, Debug, Copy, Clone)]
pub struct WantedArity {
    fixed_len: usize,
    optional_len: usize,
    has_rest: bool,
}

impl WantedArity {
    pub fn new(fixed_len: usize, optional_len: usize, has_rest: bool) -> WantedArity {
        WantedArity {
            fixed_len,
            optional_len,
            has_rest,
        }
    }

    pub fn exact(fixed_len: usize) -> WantedArity {
        Self::new(fixed_len, 0, false)
    }

    pub fn at_least(fixed_len: usize) -> WantedArity {
        Self::new(fixed_len, 0, true)
    }

    pub fn accepts(&self, arg_count: usize) -> bool {
        arg_count >= self.fixed_len
            && (self.has_rest || arg_count <= self.fixed_len + self.optional_len)
    }
}

impl fmt::Display for WantedArity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_rest {
            write!(f, "at least {}", self.fixed_len)
        } else if self.optional_len > 0 {
            write!(
                f,
                "{} to {}",
                self.fixed_len,
                self.fixed_len + self.optional_len
            )
        } else {
            write!(f, "{}", self.fixed_len)
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub enum ErrorKind {
    /// One or more errors tokenizing or parsing a unit
    Syntax(Box<[SyntaxError]>),
    VarNameNotFound(DataStr),
    CreateExistingVarName(DataStr),
    UnitNotFound(DataStr),
    ReadError(DataStr, Box<str>),
    WrongArgCount(usize, WantedArity),
    UndefinedFunction(DataStr),
    NotCallable(&'static str),
    ExpectedSymbol(&'static str),
    InvalidParamList(&'static str),
    WrongType(&'static str, &'static str),
    Incomparable(&'static str, &'static str),
    DivisionByZero,
    IntegerOverflow,
    RecursionLimit(usize),
    Output(Box<str>),
}

impl ErrorKind {
    pub fn message(&self) -> String {
        match self {
            ErrorKind::Syntax(errs) => errs
                .first()
                .map(|err| err.kind().message())
                .unwrap_or_else(|| "syntax error".to_owned()),
            ErrorKind::VarNameNotFound(name) => format!("variable name `{}` not found", name),
            ErrorKind::CreateExistingVarName(name) => format!(
                "variable name `{}` already exists in this scope; it cannot be created again",
                name
            ),
            ErrorKind::UnitNotFound(name) => format!("unit `{}` not found", name),
            ErrorKind::ReadError(name, message) => {
                format!("error reading unit `{}`: {}", name, message)
            }
            ErrorKind::WrongArgCount(received, wanted) => format!(
                "wrong argument count; expected {} but received {}",
                wanted, received
            ),
            ErrorKind::UndefinedFunction(name) => format!("undefined function `{}`", name),
            ErrorKind::NotCallable(description) => format!("{} is not callable", description),
            ErrorKind::ExpectedSymbol(found) => format!("expected symbol, found {}", found),
            ErrorKind::InvalidParamList(message) => {
                format!("invalid parameter list: {}", message)
            }
            ErrorKind::WrongType(expected, found) => {
                format!("expected {}, found {}", expected, found)
            }
            ErrorKind::Incomparable(left, right) => {
                format!("cannot compare {} with {}", left, right)
            }
            ErrorKind::DivisionByZero => "division by zero".to_owned(),
            ErrorKind::IntegerOverflow => "integer overflow".to_owned(),
            ErrorKind::RecursionLimit(depth) => {
                format!("evaluation depth exceeded the limit of {}", depth)
            }
            ErrorKind::Output(message) => format!("error writing output: {}", message),
        }
    }
}

/// User-facing evaluation error
///
/// Errors without a position didn't originate from source code; for example, the entry unit of a
/// `run_module` call not existing.
#[derive(PartialEq, Debug, Clone)]
pub struct Error {
    pos: Option<SourcePosition>,
    kind: ErrorKind,
}

pub type Result<T, E = Error> = result::Result<T, E>;

impl Error {
    pub fn new(pos: SourcePosition, kind: ErrorKind) -> Error {
        Error {
            pos: Some(pos),
            kind,
        }
    }

    pub fn new_unpositioned(kind: ErrorKind) -> Error {
        Error { pos: None, kind }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn pos(&self) -> Option<&SourcePosition> {
        self.pos.as_ref()
    }

    pub fn message(&self) -> String {
        self.kind.message()
    }
}

impl error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pos {
            Some(ref pos) => write!(f, "{}: {}", pos, self.message()),
            None => f.write_str(&self.message()),
        }
    }
}

impl From<Vec<SyntaxError>> for Error {
    fn from(errs: Vec<SyntaxError>) -> Error {
        Error {
            pos: errs.first().map(|err| err.pos().clone()),
            kind: ErrorKind::Syntax(errs.into_boxed_slice()),
        }
    }
}

impl From<SyntaxError> for Error {
    fn from(err: SyntaxError) -> Error {
        vec![err].into()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use lispy_syntax::error::ErrorKind as SyntaxErrorKind;
    use lispy_syntax::span::t2p;

    #[test]
    fn wanted_arity() {
        assert!(WantedArity::exact(3).accepts(3));
        assert!(!WantedArity::exact(3).accepts(2));
        assert!(!WantedArity::exact(3).accepts(4));

        assert!(WantedArity::at_least(1).accepts(100));
        assert!(!WantedArity::at_least(1).accepts(0));

        let optional = WantedArity::new(1, 2, false);
        assert!(optional.accepts(1));
        assert!(optional.accepts(3));
        assert!(!optional.accepts(4));

        assert_eq!("3", WantedArity::exact(3).to_string());
        assert_eq!("at least 1", WantedArity::at_least(1).to_string());
        assert_eq!("1 to 3", optional.to_string());
    }

    #[test]
    fn display_with_position() {
        let err = Error::new(t2p(2, 5), ErrorKind::VarNameNotFound("x".into()));
        assert_eq!("test:2:5: variable name `x` not found", err.to_string());

        let err = Error::new_unpositioned(ErrorKind::UnitNotFound("main".into()));
        assert_eq!("unit `main` not found", err.to_string());
    }

    #[test]
    fn from_syntax_errors() {
        let syntax_errs = vec![
            SyntaxError::new(t2p(1, 3), SyntaxErrorKind::InvalidToken('@')),
            SyntaxError::new(t2p(4, 1), SyntaxErrorKind::InvalidToken('[')),
        ];

        let err: Error = syntax_errs.into();
        assert_eq!(Some(&t2p(1, 3)), err.pos());
        assert_eq!("cannot parse text beginning with `@`", err.message());
    }
}
