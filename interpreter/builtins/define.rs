use std::rc::Rc;

use lispy_syntax::node::DataStr;
use lispy_syntax::span::SourcePosition;

use crate::context::EvalCtx;
use crate::datum::Datum;
use crate::error::{Error, ErrorKind, Result};
use crate::fun::{ParamList, UserFun};
use crate::scope::Scope;
use crate::value::Value;

fn expect_symbol(datum: &Datum) -> Result<DataStr> {
    match datum {
        Datum::Symbol(_, name) => Ok(name.clone()),
        other => Err(Error::new(
            other.pos().clone(),
            ErrorKind::ExpectedSymbol(other.description()),
        )),
    }
}

/// Determines the name a `set` form assigns to
///
/// A bare symbol names itself. Anything else is evaluated and must produce a string or a quoted
/// symbol.
fn set_target_name(ecx: &mut EvalCtx, scope: &Scope, datum: &Datum) -> Result<DataStr> {
    if let Datum::Symbol(_, name) = datum {
        return Ok(name.clone());
    }

    match datum.evaluate(ecx, scope)? {
        Value::Str(name) => Ok(name),
        Value::Quote(quoted) => match quoted.as_ref() {
            Datum::Symbol(_, name) => Ok(name.clone()),
            other => Err(Error::new(
                datum.pos().clone(),
                ErrorKind::ExpectedSymbol(other.description()),
            )),
        },
        other => Err(Error::new(
            datum.pos().clone(),
            ErrorKind::ExpectedSymbol(other.description()),
        )),
    }
}

fn assign_value(
    ecx: &mut EvalCtx,
    scope: &Scope,
    name: DataStr,
    value_datum: &Datum,
) -> Result<Value> {
    let value = value_datum.evaluate(ecx, scope)?;
    scope.assign(name, value.clone());
    Ok(value)
}

pub fn set(
    ecx: &mut EvalCtx,
    scope: &Scope,
    _: &SourcePosition,
    args: &[Datum],
) -> Result<Value> {
    let name = set_target_name(ecx, scope, &args[0])?;
    assign_value(ecx, scope, name, &args[1])
}

pub fn setq(
    ecx: &mut EvalCtx,
    scope: &Scope,
    _: &SourcePosition,
    args: &[Datum],
) -> Result<Value> {
    let name = expect_symbol(&args[0])?;
    assign_value(ecx, scope, name, &args[1])
}

/// Defines a function as `(defun name (params...) body...)`
pub fn defun(
    _: &mut EvalCtx,
    scope: &Scope,
    pos: &SourcePosition,
    args: &[Datum],
) -> Result<Value> {
    let name = expect_symbol(&args[0])?;
    let params = ParamList::from_datum(&args[1])?;
    let body = args[2..].to_vec().into_boxed_slice();

    log::debug!("defining function `{}` at {}", name, pos);

    let fun = Value::Fun(Rc::new(UserFun::new(name.clone(), params, body)));
    scope.assign(name, fun.clone());

    Ok(fun)
}
