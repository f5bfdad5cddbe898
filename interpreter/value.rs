use std::fmt;
use std::rc::Rc;

use lispy_syntax::node::DataStr;
use lispy_syntax::span::SourcePosition;

use crate::builtins::Builtin;
use crate::context::EvalCtx;
use crate::datum::Datum;
use crate::error::{Error, ErrorKind, Result};
use crate::fun::UserFun;
use crate::scope::Scope;
use crate::writer;

/// Runtime value produced by evaluation
#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(DataStr),
    List(Rc<[Value]>),
    Builtin(Builtin),
    Fun(Rc<UserFun>),
    /// Unevaluated datum returned from `quote`
    Quote(Rc<Datum>),
}

impl Value {
    pub fn description(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(true) => "boolean true",
            Value::Bool(false) => "boolean false",
            Value::Int(_) => "integer",
            Value::Float(_) => "floating point number",
            Value::Str(_) => "string",
            Value::List(members) if members.is_empty() => "empty list",
            Value::List(_) => "list",
            Value::Builtin(_) => "builtin function",
            Value::Fun(_) => "function",
            Value::Quote(_) => "quoted datum",
        }
    }

    /// Returns if this value counts as true for conditionals
    #[allow(clippy::float_cmp)]
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil | Value::Bool(false) => false,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(members) => !members.is_empty(),
            Value::Bool(true) | Value::Builtin(_) | Value::Fun(_) | Value::Quote(_) => true,
        }
    }

    /// Calls this value with unevaluated arguments
    ///
    /// `scope` is the caller's scope; arguments are evaluated against it if and when the callee
    /// needs them.
    pub fn apply(
        &self,
        ecx: &mut EvalCtx,
        scope: &Scope,
        pos: &SourcePosition,
        args: &[Datum],
    ) -> Result<Value> {
        match self {
            Value::Builtin(builtin) => builtin.apply(ecx, scope, pos, args),
            Value::Fun(fun) => fun.apply(ecx, scope, pos, args),
            other => Err(Error::new(
                pos.clone(),
                ErrorKind::NotCallable(other.description()),
            )),
        }
    }
}

impl PartialEq for Value {
    #[allow(clippy::float_cmp)]
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Builtin(a), Value::Builtin(b)) => a.name() == b.name(),
            (Value::Fun(a), Value::Fun(b)) => Rc::ptr_eq(a, b),
            (Value::Quote(a), Value::Quote(b)) => a.same_form(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writer::write_value(f, self)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writer::write_display(f, self)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Value {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Value {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::Str(s.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(members: Vec<Value>) -> Value {
        Value::List(members.into())
    }
}
