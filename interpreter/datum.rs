use std::rc::Rc;

use lispy_syntax::node::{DataStr, Node};
use lispy_syntax::span::SourcePosition;

use crate::context::EvalCtx;
use crate::error::{Error, ErrorKind, Result};
use crate::scope::Scope;
use crate::value::Value;

/// Evaluable expression built from a syntax node
#[derive(Clone, Debug, PartialEq)]
pub enum Datum {
    Static(SourcePosition, Value),
    Symbol(SourcePosition, DataStr),
    /// Call of the head symbol with the remaining items as unevaluated arguments
    List(SourcePosition, Rc<[Datum]>),
    /// Sequence of forms evaluated in a new child scope
    ExprSeq(SourcePosition, Rc<[Datum]>),
    Quote(SourcePosition, Rc<Datum>),
}

fn build_seq(nodes: &[Node]) -> Rc<[Datum]> {
    nodes.iter().map(Datum::build).collect()
}

impl Datum {
    /// Builds a datum from a syntax node
    ///
    /// Keywords become symbols whose names include the leading `&`.
    pub fn build(node: &Node) -> Datum {
        match node {
            Node::Bool(pos, v) => Datum::Static(pos.clone(), Value::Bool(*v)),
            Node::Int(pos, v) => Datum::Static(pos.clone(), Value::Int(*v)),
            Node::Float(pos, v) => Datum::Static(pos.clone(), Value::Float(*v)),
            Node::Str(pos, v) => Datum::Static(pos.clone(), Value::Str(v.clone())),
            Node::Id(pos, name) | Node::Keyword(pos, name) => {
                Datum::Symbol(pos.clone(), name.clone())
            }
            Node::Quote(pos, inner) => Datum::Quote(pos.clone(), Rc::new(Datum::build(inner))),
            Node::List(pos, members) => Datum::List(pos.clone(), build_seq(members)),
            Node::ExprSeq(pos, members) => Datum::ExprSeq(pos.clone(), build_seq(members)),
        }
    }

    pub fn pos(&self) -> &SourcePosition {
        match self {
            Datum::Static(pos, _)
            | Datum::Symbol(pos, _)
            | Datum::List(pos, _)
            | Datum::ExprSeq(pos, _)
            | Datum::Quote(pos, _) => pos,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Datum::Static(_, value) => value.description(),
            Datum::Symbol(_, _) => "symbol",
            Datum::List(_, items) if items.is_empty() => "empty list",
            Datum::List(_, _) => "list",
            Datum::ExprSeq(_, _) => "expression sequence",
            Datum::Quote(_, _) => "quoted datum",
        }
    }

    /// Returns if two datums have the same structure ignoring their positions
    pub fn same_form(&self, other: &Datum) -> bool {
        match (self, other) {
            (Datum::Static(_, a), Datum::Static(_, b)) => a == b,
            (Datum::Symbol(_, a), Datum::Symbol(_, b)) => a == b,
            (Datum::List(_, a), Datum::List(_, b)) | (Datum::ExprSeq(_, a), Datum::ExprSeq(_, b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(a, b)| a.same_form(b))
            }
            (Datum::Quote(_, a), Datum::Quote(_, b)) => a.same_form(b),
            _ => false,
        }
    }

    /// Returns the number of literal and symbol leaves in this datum
    pub fn leaf_count(&self) -> usize {
        match self {
            Datum::Quote(_, inner) => inner.leaf_count(),
            Datum::List(_, items) | Datum::ExprSeq(_, items) => {
                items.iter().map(Datum::leaf_count).sum()
            }
            Datum::Static(_, _) | Datum::Symbol(_, _) => 1,
        }
    }

    pub fn evaluate(&self, ecx: &mut EvalCtx, scope: &Scope) -> Result<Value> {
        match self {
            Datum::Static(_, value) => Ok(value.clone()),
            Datum::Symbol(pos, name) => scope.lookup(ecx, pos, name),
            Datum::List(pos, items) => eval_call(ecx, scope, pos, items),
            Datum::ExprSeq(_, items) => {
                let seq_scope = scope.child();
                eval_in_order(ecx, &seq_scope, items)
            }
            Datum::Quote(_, inner) => Ok(Value::Quote(inner.clone())),
        }
    }
}

/// Evaluates each datum in turn returning the last value, or nil if there are none
pub fn eval_in_order(ecx: &mut EvalCtx, scope: &Scope, data: &[Datum]) -> Result<Value> {
    let mut last_value = Value::Nil;
    for datum in data {
        last_value = datum.evaluate(ecx, scope)?;
    }

    Ok(last_value)
}

fn eval_call(
    ecx: &mut EvalCtx,
    scope: &Scope,
    pos: &SourcePosition,
    items: &[Datum],
) -> Result<Value> {
    let (head, args) = match items.split_first() {
        Some(split) => split,
        None => return Ok(Value::Nil),
    };

    let (head_pos, name) = match head {
        Datum::Symbol(head_pos, name) => (head_pos, name),
        other => {
            return Err(Error::new(
                other.pos().clone(),
                ErrorKind::NotCallable(other.description()),
            ));
        }
    };

    ecx.enter_call(pos)?;

    let result = match scope.resolve(ecx, head_pos, name) {
        Some(callee) => callee.and_then(|callee| callee.apply(ecx, scope, pos, args)),
        None => Err(Error::new(
            head_pos.clone(),
            ErrorKind::UndefinedFunction(name.clone()),
        )),
    };

    ecx.leave_call();
    result
}
