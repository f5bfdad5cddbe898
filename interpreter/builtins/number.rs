use lispy_syntax::span::SourcePosition;

use crate::context::EvalCtx;
use crate::datum::Datum;
use crate::error::{Error, ErrorKind, Result};
use crate::scope::Scope;
use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn to_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }
}

type OpResult<T> = std::result::Result<T, ErrorKind>;

fn eval_num_args(ecx: &mut EvalCtx, scope: &Scope, args: &[Datum]) -> Result<Vec<Num>> {
    args.iter()
        .map(|arg| match arg.evaluate(ecx, scope)? {
            Value::Int(i) => Ok(Num::Int(i)),
            Value::Float(f) => Ok(Num::Float(f)),
            other => Err(Error::new(
                arg.pos().clone(),
                ErrorKind::WrongType("number", other.description()),
            )),
        })
        .collect()
}

fn fold_float_op<FR>(
    operands_iter: impl Iterator<Item = Num>,
    initial_value: f64,
    float_reduce: FR,
) -> OpResult<f64>
where
    FR: Fn(f64, f64) -> OpResult<f64>,
{
    let mut float_acc = initial_value;

    for operand in operands_iter {
        float_acc = float_reduce(float_acc, operand.to_f64())?;
    }

    Ok(float_acc)
}

fn fold_num_op<IR, FR>(
    mut operands_iter: impl Iterator<Item = Num>,
    initial_value: Num,
    int_reduce: IR,
    float_reduce: FR,
) -> OpResult<Value>
where
    IR: Fn(i64, i64) -> OpResult<i64>,
    FR: Fn(f64, f64) -> OpResult<f64>,
{
    // Accumulate as an integer for as long as possible
    let mut int_acc = match initial_value {
        Num::Int(i) => i,
        Num::Float(f) => {
            return fold_float_op(operands_iter, f, float_reduce).map(Value::Float);
        }
    };

    while let Some(operand) = operands_iter.next() {
        match operand {
            Num::Int(i) => {
                int_acc = int_reduce(int_acc, i)?;
            }
            Num::Float(f) => {
                // Switch to float
                let float_acc = float_reduce(int_acc as f64, f)?;
                return fold_float_op(operands_iter, float_acc, float_reduce).map(Value::Float);
            }
        }
    }

    Ok(Value::Int(int_acc))
}

fn checked_int(op: fn(i64, i64) -> Option<i64>) -> impl Fn(i64, i64) -> OpResult<i64> {
    move |a, b| op(a, b).ok_or(ErrorKind::IntegerOverflow)
}

fn infallible_float(op: fn(f64, f64) -> f64) -> impl Fn(f64, f64) -> OpResult<f64> {
    move |a, b| Ok(op(a, b))
}

fn floor_div_int(numerator: i64, denominator: i64) -> OpResult<i64> {
    if denominator == 0 {
        return Err(ErrorKind::DivisionByZero);
    }

    let quotient = numerator
        .checked_div(denominator)
        .ok_or(ErrorKind::IntegerOverflow)?;

    // Round towards negative infinity instead of zero
    if numerator % denominator != 0 && ((numerator < 0) != (denominator < 0)) {
        Ok(quotient - 1)
    } else {
        Ok(quotient)
    }
}

#[allow(clippy::float_cmp)]
fn div_float(numerator: f64, denominator: f64) -> OpResult<f64> {
    if denominator == 0.0 {
        Err(ErrorKind::DivisionByZero)
    } else {
        Ok(numerator / denominator)
    }
}

/// Folds every operand in to an initial value
fn fold_all<IR, FR>(
    ecx: &mut EvalCtx,
    scope: &Scope,
    pos: &SourcePosition,
    args: &[Datum],
    initial_value: i64,
    int_reduce: IR,
    float_reduce: FR,
) -> Result<Value>
where
    IR: Fn(i64, i64) -> OpResult<i64>,
    FR: Fn(f64, f64) -> OpResult<f64>,
{
    let operands = eval_num_args(ecx, scope, args)?;

    fold_num_op(
        operands.into_iter(),
        Num::Int(initial_value),
        int_reduce,
        float_reduce,
    )
    .map_err(|kind| Error::new(pos.clone(), kind))
}

/// Folds the remaining operands in to the first operand
fn fold_from_first<IR, FR>(
    ecx: &mut EvalCtx,
    scope: &Scope,
    pos: &SourcePosition,
    args: &[Datum],
    int_reduce: IR,
    float_reduce: FR,
) -> Result<Value>
where
    IR: Fn(i64, i64) -> OpResult<i64>,
    FR: Fn(f64, f64) -> OpResult<f64>,
{
    let mut operands = eval_num_args(ecx, scope, args)?.into_iter();

    let initial_value = match operands.next() {
        Some(initial_value) => initial_value,
        None => return Ok(Value::Int(0)),
    };

    fold_num_op(operands, initial_value, int_reduce, float_reduce)
        .map_err(|kind| Error::new(pos.clone(), kind))
}

pub fn add(
    ecx: &mut EvalCtx,
    scope: &Scope,
    pos: &SourcePosition,
    args: &[Datum],
) -> Result<Value> {
    use std::ops::Add;
    fold_all(
        ecx,
        scope,
        pos,
        args,
        0,
        checked_int(i64::checked_add),
        infallible_float(f64::add),
    )
}

pub fn mul(
    ecx: &mut EvalCtx,
    scope: &Scope,
    pos: &SourcePosition,
    args: &[Datum],
) -> Result<Value> {
    use std::ops::Mul;
    fold_all(
        ecx,
        scope,
        pos,
        args,
        1,
        checked_int(i64::checked_mul),
        infallible_float(f64::mul),
    )
}

pub fn sub(
    ecx: &mut EvalCtx,
    scope: &Scope,
    pos: &SourcePosition,
    args: &[Datum],
) -> Result<Value> {
    use std::ops::Sub;
    fold_from_first(
        ecx,
        scope,
        pos,
        args,
        checked_int(i64::checked_sub),
        infallible_float(f64::sub),
    )
}

pub fn div(
    ecx: &mut EvalCtx,
    scope: &Scope,
    pos: &SourcePosition,
    args: &[Datum],
) -> Result<Value> {
    fold_from_first(ecx, scope, pos, args, floor_div_int, div_float)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::ops::{Add, Mul};

    fn ints(values: &[i64]) -> Vec<Num> {
        values.iter().map(|i| Num::Int(*i)).collect()
    }

    #[test]
    fn int_folding() {
        let sum = fold_num_op(
            ints(&[1, 2, 3]).into_iter(),
            Num::Int(0),
            checked_int(i64::checked_add),
            infallible_float(f64::add),
        );

        assert_eq!(Ok(Value::Int(6)), sum);
    }

    #[test]
    fn float_promotion() {
        let operands = vec![Num::Int(1), Num::Float(0.5), Num::Int(2)];
        let sum = fold_num_op(
            operands.into_iter(),
            Num::Int(0),
            checked_int(i64::checked_add),
            infallible_float(f64::add),
        );

        assert_eq!(Ok(Value::Float(3.5)), sum);
    }

    #[test]
    fn int_overflow() {
        let product = fold_num_op(
            ints(&[i64::max_value(), 2]).into_iter(),
            Num::Int(1),
            checked_int(i64::checked_mul),
            infallible_float(f64::mul),
        );

        assert_eq!(Err(ErrorKind::IntegerOverflow), product);
    }

    #[test]
    fn floor_division() {
        assert_eq!(Ok(3), floor_div_int(7, 2));
        assert_eq!(Ok(-4), floor_div_int(-7, 2));
        assert_eq!(Ok(-4), floor_div_int(7, -2));
        assert_eq!(Ok(3), floor_div_int(-7, -2));
        assert_eq!(Ok(-3), floor_div_int(-6, 2));
        assert_eq!(Err(ErrorKind::DivisionByZero), floor_div_int(1, 0));
        assert_eq!(
            Err(ErrorKind::IntegerOverflow),
            floor_div_int(i64::min_value(), -1)
        );
    }

    #[test]
    fn float_division() {
        assert_eq!(Ok(3.5), div_float(7.0, 2.0));
        assert_eq!(Err(ErrorKind::DivisionByZero), div_float(1.0, 0.0));
    }
}
