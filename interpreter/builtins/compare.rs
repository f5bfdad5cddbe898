use std::cmp::Ordering;

use lispy_syntax::span::SourcePosition;

use crate::context::EvalCtx;
use crate::datum::Datum;
use crate::error::{Error, ErrorKind, Result};
use crate::scope::Scope;
use crate::value::Value;

/// Returns if two values are equal for the purposes of `=`
///
/// Integers and floats compare numerically; values of different kinds are never equal.
#[allow(clippy::float_cmp)]
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Int(i), Value::Float(f)) | (Value::Float(f), Value::Int(i)) => (*i as f64) == *f,
        (Value::List(left), Value::List(right)) => {
            left.len() == right.len()
                && left
                    .iter()
                    .zip(right.iter())
                    .all(|(l, r)| values_equal(l, r))
        }
        _ => left == right,
    }
}

/// Orders two values
///
/// Numbers, strings and lists can be ordered. `None` is returned for unordered floats.
pub fn compare_values(
    pos: &SourcePosition,
    left: &Value,
    right: &Value,
) -> Result<Option<Ordering>> {
    let ordering = match (left, right) {
        (Value::Int(l), Value::Int(r)) => Some(l.cmp(r)),
        (Value::Int(l), Value::Float(r)) => (*l as f64).partial_cmp(r),
        (Value::Float(l), Value::Int(r)) => l.partial_cmp(&(*r as f64)),
        (Value::Float(l), Value::Float(r)) => l.partial_cmp(r),
        (Value::Str(l), Value::Str(r)) => Some(l.cmp(r)),
        (Value::List(l), Value::List(r)) => {
            for (l_member, r_member) in l.iter().zip(r.iter()) {
                match compare_values(pos, l_member, r_member)? {
                    Some(Ordering::Equal) => {}
                    other => return Ok(other),
                }
            }

            Some(l.len().cmp(&r.len()))
        }
        _ => {
            return Err(Error::new(
                pos.clone(),
                ErrorKind::Incomparable(left.description(), right.description()),
            ));
        }
    };

    Ok(ordering)
}

/// Tests each argument against the value of the argument before it
///
/// The pair test receives the current value first and the previous value second, so
/// `(< 2 1)` asks if `1 < 2`. Arguments are evaluated left to right and evaluation stops at the
/// first failing pair.
fn chained_test<F>(
    ecx: &mut EvalCtx,
    scope: &Scope,
    args: &[Datum],
    pair_test: F,
) -> Result<Value>
where
    F: Fn(&SourcePosition, &Value, &Value) -> Result<bool>,
{
    let (first, rest) = match args.split_first() {
        Some(split) => split,
        None => return Ok(Value::Bool(true)),
    };

    let mut prev_value = first.evaluate(ecx, scope)?;
    for arg in rest {
        let value = arg.evaluate(ecx, scope)?;

        if !pair_test(arg.pos(), &value, &prev_value)? {
            return Ok(Value::Bool(false));
        }

        prev_value = value;
    }

    Ok(Value::Bool(true))
}

fn ordering_test(
    ecx: &mut EvalCtx,
    scope: &Scope,
    args: &[Datum],
    accept: fn(Ordering) -> bool,
) -> Result<Value> {
    chained_test(ecx, scope, args, |pos, value, prev| {
        Ok(compare_values(pos, value, prev)?.map_or(false, accept))
    })
}

pub fn eq(
    ecx: &mut EvalCtx,
    scope: &Scope,
    _: &SourcePosition,
    args: &[Datum],
) -> Result<Value> {
    chained_test(ecx, scope, args, |_, value, prev| Ok(values_equal(value, prev)))
}

pub fn ne(
    ecx: &mut EvalCtx,
    scope: &Scope,
    _: &SourcePosition,
    args: &[Datum],
) -> Result<Value> {
    chained_test(ecx, scope, args, |_, value, prev| Ok(!values_equal(value, prev)))
}

pub fn lt(
    ecx: &mut EvalCtx,
    scope: &Scope,
    _: &SourcePosition,
    args: &[Datum],
) -> Result<Value> {
    ordering_test(ecx, scope, args, |o| o == Ordering::Less)
}

pub fn gt(
    ecx: &mut EvalCtx,
    scope: &Scope,
    _: &SourcePosition,
    args: &[Datum],
) -> Result<Value> {
    ordering_test(ecx, scope, args, |o| o == Ordering::Greater)
}

pub fn le(
    ecx: &mut EvalCtx,
    scope: &Scope,
    _: &SourcePosition,
    args: &[Datum],
) -> Result<Value> {
    ordering_test(ecx, scope, args, |o| o != Ordering::Greater)
}

pub fn ge(
    ecx: &mut EvalCtx,
    scope: &Scope,
    _: &SourcePosition,
    args: &[Datum],
) -> Result<Value> {
    ordering_test(ecx, scope, args, |o| o != Ordering::Less)
}

/// Chains truthiness with `and`
///
/// Each pair of neighbouring arguments must both be true, not merely the whole sequence.
pub fn and(
    ecx: &mut EvalCtx,
    scope: &Scope,
    _: &SourcePosition,
    args: &[Datum],
) -> Result<Value> {
    chained_test(ecx, scope, args, |_, value, prev| {
        Ok(value.is_truthy() && prev.is_truthy())
    })
}

/// Chains truthiness with `or`
///
/// This fails as soon as two neighbouring arguments are both false.
pub fn or(
    ecx: &mut EvalCtx,
    scope: &Scope,
    _: &SourcePosition,
    args: &[Datum],
) -> Result<Value> {
    chained_test(ecx, scope, args, |_, value, prev| {
        Ok(value.is_truthy() || prev.is_truthy())
    })
}
