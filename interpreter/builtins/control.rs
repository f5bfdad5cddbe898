use std::rc::Rc;

use lispy_syntax::span::SourcePosition;

use crate::context::EvalCtx;
use crate::datum::{eval_in_order, Datum};
use crate::error::Result;
use crate::scope::Scope;
use crate::value::Value;

/// Evaluates the condition followed by exactly one branch
pub fn if_(
    ecx: &mut EvalCtx,
    scope: &Scope,
    _: &SourcePosition,
    args: &[Datum],
) -> Result<Value> {
    let branch = if args[0].evaluate(ecx, scope)?.is_truthy() {
        &args[1]
    } else {
        &args[2]
    };

    branch.evaluate(ecx, scope)
}

/// Evaluates the body for as long as the condition is true
///
/// The result is the last value of the final iteration, or nil if the body never ran.
pub fn while_(
    ecx: &mut EvalCtx,
    scope: &Scope,
    _: &SourcePosition,
    args: &[Datum],
) -> Result<Value> {
    let (condition, body) = (&args[0], &args[1..]);

    let mut last_value = Value::Nil;
    while condition.evaluate(ecx, scope)?.is_truthy() {
        last_value = eval_in_order(ecx, scope, body)?;
    }

    Ok(last_value)
}

/// Evaluates every argument in the caller's scope returning the last value
pub fn begin(
    ecx: &mut EvalCtx,
    scope: &Scope,
    _: &SourcePosition,
    args: &[Datum],
) -> Result<Value> {
    eval_in_order(ecx, scope, args)
}

pub fn quote(_: &mut EvalCtx, _: &Scope, _: &SourcePosition, args: &[Datum]) -> Result<Value> {
    Ok(Value::Quote(Rc::new(args[0].clone())))
}
