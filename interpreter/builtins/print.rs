use lispy_syntax::span::SourcePosition;

use crate::context::EvalCtx;
use crate::datum::Datum;
use crate::error::Result;
use crate::scope::Scope;
use crate::value::Value;

/// Writes each argument on its own line as soon as it's evaluated
pub fn print(
    ecx: &mut EvalCtx,
    scope: &Scope,
    pos: &SourcePosition,
    args: &[Datum],
) -> Result<Value> {
    let mut last_value = Value::Nil;

    for arg in args {
        last_value = arg.evaluate(ecx, scope)?;
        ecx.write_line(pos, &last_value)?;
    }

    Ok(last_value)
}
