use lispy_syntax::span::SourcePosition;

use crate::context::EvalCtx;
use crate::datum::Datum;
use crate::error::{Error, ErrorKind, Result};
use crate::scope::Scope;
use crate::value::Value;

/// Evaluates each named unit in the global scope
///
/// Unit names are evaluated immediately before their unit is loaded. The result is the value of
/// the last unit.
pub fn load(
    ecx: &mut EvalCtx,
    scope: &Scope,
    _: &SourcePosition,
    args: &[Datum],
) -> Result<Value> {
    let mut last_value = Value::Nil;

    for arg in args {
        let unit_name = match arg.evaluate(ecx, scope)? {
            Value::Str(unit_name) => unit_name,
            other => {
                return Err(Error::new(
                    arg.pos().clone(),
                    ErrorKind::WrongType("unit name string", other.description()),
                ));
            }
        };

        last_value = ecx.evaluate_unit_from(Some(arg.pos()), &unit_name)?;
    }

    Ok(last_value)
}
