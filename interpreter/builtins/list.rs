use lispy_syntax::span::SourcePosition;

use crate::builtins::eval_args;
use crate::context::EvalCtx;
use crate::datum::Datum;
use crate::error::Result;
use crate::scope::Scope;
use crate::value::Value;

pub fn list(
    ecx: &mut EvalCtx,
    scope: &Scope,
    _: &SourcePosition,
    args: &[Datum],
) -> Result<Value> {
    Ok(eval_args(ecx, scope, args)?.into())
}
