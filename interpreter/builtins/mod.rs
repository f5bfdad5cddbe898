mod compare;
mod control;
mod define;
mod list;
mod load;
mod number;
mod print;

use std::collections::HashMap;
use std::fmt;

use lispy_syntax::span::SourcePosition;

use crate::context::EvalCtx;
use crate::datum::Datum;
use crate::error::{Error, ErrorKind, Result, WantedArity};
use crate::scope::Scope;
use crate::value::Value;

pub use compare::{compare_values, values_equal};

/// Native implementation of a builtin
///
/// Builtins receive their arguments unevaluated along with the caller's scope. Each builtin
/// decides which arguments to evaluate and when.
pub type BuiltinFun = fn(&mut EvalCtx, &Scope, &SourcePosition, &[Datum]) -> Result<Value>;

#[derive(Clone, Copy)]
pub struct Builtin {
    name: &'static str,
    arity: WantedArity,
    fun: BuiltinFun,
}

impl Builtin {
    pub fn new(name: &'static str, arity: WantedArity, fun: BuiltinFun) -> Builtin {
        Builtin { name, arity, fun }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn arity(&self) -> WantedArity {
        self.arity
    }

    pub fn apply(
        &self,
        ecx: &mut EvalCtx,
        scope: &Scope,
        pos: &SourcePosition,
        args: &[Datum],
    ) -> Result<Value> {
        if !self.arity.accepts(args.len()) {
            return Err(Error::new(
                pos.clone(),
                ErrorKind::WrongArgCount(args.len(), self.arity),
            ));
        }

        log::trace!("calling builtin `{}` at {}", self.name, pos);
        (self.fun)(ecx, scope, pos, args)
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

/// Table of builtins installed in to every new global scope
#[derive(Clone, Default, Debug)]
pub struct Builtins {
    entries: HashMap<&'static str, Builtin>,
}

impl Builtins {
    pub fn empty() -> Builtins {
        Self::default()
    }

    /// Adds a builtin to the table, replacing any builtin with the same name
    pub fn insert(&mut self, builtin: Builtin) {
        self.entries.insert(builtin.name(), builtin);
    }

    pub fn get(&self, name: &str) -> Option<&Builtin> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Builtin> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

macro_rules! define_builtins {
    ( $($name:expr => ($arity:expr, $fun:path)),* ) => {
        impl Builtins {
            /// Returns the builtins available to every unit by default
            pub fn standard() -> Builtins {
                let mut builtins = Builtins::empty();
                $(
                    builtins.insert(Builtin::new($name, $arity, $fun));
                )*
                builtins
            }
        }
    };
}

define_builtins! {
    "+" => (WantedArity::at_least(1), number::add),
    "-" => (WantedArity::at_least(1), number::sub),
    "*" => (WantedArity::at_least(1), number::mul),
    "/" => (WantedArity::at_least(1), number::div),
    "=" => (WantedArity::at_least(1), compare::eq),
    "!=" => (WantedArity::at_least(1), compare::ne),
    "<" => (WantedArity::at_least(1), compare::lt),
    ">" => (WantedArity::at_least(1), compare::gt),
    "<=" => (WantedArity::at_least(1), compare::le),
    ">=" => (WantedArity::at_least(1), compare::ge),
    "and" => (WantedArity::at_least(2), compare::and),
    "or" => (WantedArity::at_least(2), compare::or),
    "if" => (WantedArity::exact(3), control::if_),
    "while" => (WantedArity::at_least(2), control::while_),
    "begin" => (WantedArity::at_least(1), control::begin),
    "quote" => (WantedArity::exact(1), control::quote),
    "list" => (WantedArity::at_least(0), list::list),
    "print" => (WantedArity::at_least(1), print::print),
    "set" => (WantedArity::exact(2), define::set),
    "setq" => (WantedArity::exact(2), define::setq),
    "defun" => (WantedArity::at_least(3), define::defun),
    "load" => (WantedArity::at_least(1), load::load)
}

/// Evaluates every argument in order
fn eval_args(ecx: &mut EvalCtx, scope: &Scope, args: &[Datum]) -> Result<Vec<Value>> {
    args.iter().map(|arg| arg.evaluate(ecx, scope)).collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::context::Config;
    use crate::source::DictLoader;
    use lispy_syntax::span::t2p;

    #[test]
    fn standard_table() {
        let builtins = Builtins::standard();

        for name in &[
            "+", "-", "*", "/", "=", "!=", "<", ">", "<=", ">=", "and", "or", "if", "while",
            "begin", "quote", "list", "print", "set", "setq", "defun", "load",
        ] {
            let builtin = builtins.get(name).unwrap();
            assert_eq!(*name, builtin.name());
        }

        assert_eq!(22, builtins.len());
    }

    #[test]
    fn arity_checked_before_call() {
        let builtins = Builtins::standard();
        let mut ecx = EvalCtx::new(DictLoader::new(), Config::default());
        let scope = ecx.new_global_scope();

        let if_builtin = builtins.get("if").unwrap();
        let err = if_builtin
            .apply(&mut ecx, &scope, &t2p(1, 1), &[])
            .unwrap_err();

        assert_eq!(
            Error::new(
                t2p(1, 1),
                ErrorKind::WrongArgCount(0, WantedArity::exact(3))
            ),
            err
        );
        assert_eq!(
            "test:1:1: wrong argument count; expected 3 but received 0",
            err.to_string()
        );
    }
}
