use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use lispy_syntax::node::DataStr;
use lispy_syntax::span::SourcePosition;

use crate::context::EvalCtx;
use crate::datum::Datum;
use crate::error::{Error, ErrorKind, Result};
use crate::value::Value;

#[derive(Clone, Debug)]
enum ThunkExpr {
    Single(Datum),
    /// Remaining arguments bound to a `&rest` parameter
    Rest(Rc<[Datum]>),
}

/// Unevaluated argument captured together with the scope it must be evaluated in
///
/// Thunks aren't memoised; every access evaluates the expression again.
#[derive(Clone, Debug)]
pub struct ArgThunk {
    scope: Scope,
    expr: ThunkExpr,
}

impl ArgThunk {
    pub fn new(scope: Scope, expr: Datum) -> ArgThunk {
        ArgThunk {
            scope,
            expr: ThunkExpr::Single(expr),
        }
    }

    /// Creates a thunk evaluating to a list of every passed expression's value
    pub fn new_rest(scope: Scope, exprs: Vec<Datum>) -> ArgThunk {
        ArgThunk {
            scope,
            expr: ThunkExpr::Rest(exprs.into()),
        }
    }

    /// Evaluates the thunk for an access at `pos`
    ///
    /// Each evaluation counts towards the evaluation depth limit as chains of thunks can nest
    /// arbitrarily deeply.
    pub fn evaluate(&self, ecx: &mut EvalCtx, pos: &SourcePosition) -> Result<Value> {
        ecx.enter_call(pos)?;
        let result = self.evaluate_expr(ecx);
        ecx.leave_call();

        result
    }

    fn evaluate_expr(&self, ecx: &mut EvalCtx) -> Result<Value> {
        match &self.expr {
            ThunkExpr::Single(expr) => expr.evaluate(ecx, &self.scope),
            ThunkExpr::Rest(exprs) => {
                let values = exprs
                    .iter()
                    .map(|expr| expr.evaluate(ecx, &self.scope))
                    .collect::<Result<Vec<Value>>>()?;

                Ok(values.into())
            }
        }
    }
}

#[derive(Clone, Debug)]
pub enum Binding {
    Value(Value),
    Thunk(Rc<ArgThunk>),
    /// Expression evaluated in the scope holding the binding on every access
    ///
    /// Unlike a thunk this doesn't own a scope, so a scope can hold one without forming a cycle.
    Local(Datum),
}

impl Binding {
    pub fn new_thunk(scope: &Scope, expr: Datum) -> Binding {
        Binding::Thunk(Rc::new(ArgThunk::new(scope.clone(), expr)))
    }

    /// Produces the bound value for an access at `pos`
    ///
    /// `owner` is the scope the binding was found in.
    pub fn resolve(&self, ecx: &mut EvalCtx, owner: &Scope, pos: &SourcePosition) -> Result<Value> {
        match self {
            Binding::Value(value) => Ok(value.clone()),
            Binding::Thunk(thunk) => thunk.evaluate(ecx, pos),
            Binding::Local(expr) => {
                ecx.enter_call(pos)?;
                let result = expr.evaluate(ecx, owner);
                ecx.leave_call();

                result
            }
        }
    }
}

#[derive(Debug)]
struct ScopeData {
    entries: RefCell<HashMap<DataStr, Binding>>,
    parent: Option<Scope>,
}

/// Shared handle to a scope in the scope chain
///
/// Scopes stay alive for as long as any child scope, thunk or evaluation refers to them.
#[derive(Clone, Debug)]
pub struct Scope(Rc<ScopeData>);

impl Scope {
    /// Creates a new root scope with entries
    pub fn new_with_entries<I>(entries: I) -> Scope
    where
        I: Iterator<Item = (DataStr, Binding)>,
    {
        Scope(Rc::new(ScopeData {
            entries: RefCell::new(entries.collect()),
            parent: None,
        }))
    }

    /// Creates an empty root scope
    pub fn root() -> Scope {
        Self::new_with_entries(std::iter::empty())
    }

    pub fn child(&self) -> Scope {
        Scope(Rc::new(ScopeData {
            entries: RefCell::new(HashMap::new()),
            parent: Some(self.clone()),
        }))
    }

    pub fn parent(&self) -> Option<&Scope> {
        self.0.parent.as_ref()
    }

    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Returns the nearest binding for a name along with the scope holding it
    ///
    /// The binding is cloned out of the scope so it can be resolved while the scope is mutated.
    fn find(&self, name: &str) -> Option<(Binding, &Scope)> {
        let mut current = Some(self);

        while let Some(scope) = current {
            if let Some(binding) = scope.0.entries.borrow().get(name) {
                return Some((binding.clone(), scope));
            }

            current = scope.parent();
        }

        None
    }

    /// Returns the nearest binding for a name if it exists
    pub fn get(&self, name: &str) -> Option<Binding> {
        self.find(name).map(|(binding, _)| binding)
    }

    /// Resolves the nearest binding for a name, returning `None` if the name is unbound
    pub fn resolve(
        &self,
        ecx: &mut EvalCtx,
        pos: &SourcePosition,
        name: &str,
    ) -> Option<Result<Value>> {
        let (binding, owner) = self.find(name)?;
        Some(binding.resolve(ecx, owner, pos))
    }

    /// Looks up the value of a name, evaluating it if it's bound to an expression
    pub fn lookup(&self, ecx: &mut EvalCtx, pos: &SourcePosition, name: &str) -> Result<Value> {
        self.resolve(ecx, pos, name).unwrap_or_else(|| {
            Err(Error::new(
                pos.clone(),
                ErrorKind::VarNameNotFound(name.into()),
            ))
        })
    }

    /// Overwrites the nearest existing binding for a name or creates it locally
    pub fn assign(&self, name: DataStr, value: Value) {
        let mut current = Some(self);

        while let Some(scope) = current {
            let mut entries = scope.0.entries.borrow_mut();

            if let Some(binding) = entries.get_mut(&name) {
                *binding = Binding::Value(value);
                return;
            }

            current = scope.parent();
        }

        self.0.entries.borrow_mut().insert(name, Binding::Value(value));
    }

    /// Creates a new binding in this scope
    ///
    /// Ancestor scopes aren't consulted; shadowing them is allowed.
    pub fn create_local(
        &self,
        pos: &SourcePosition,
        name: DataStr,
        binding: Binding,
    ) -> Result<()> {
        use std::collections::hash_map::Entry;

        match self.0.entries.borrow_mut().entry(name) {
            Entry::Occupied(occupied) => Err(Error::new(
                pos.clone(),
                ErrorKind::CreateExistingVarName(occupied.key().clone()),
            )),
            Entry::Vacant(vacant) => {
                vacant.insert(binding);
                Ok(())
            }
        }
    }

    /// Returns the number of handles keeping this scope alive
    #[cfg(test)]
    pub(crate) fn handle_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub fn is_bound_locally(&self, name: &str) -> bool {
        self.0.entries.borrow().contains_key(name)
    }

    /// Returns the names bound directly in this scope in sorted order
    pub fn bound_names(&self) -> Vec<DataStr> {
        let mut names: Vec<DataStr> = self.0.entries.borrow().keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::context::{Config, EvalCtx};
    use crate::source::DictLoader;
    use lispy_syntax::span::t2p;

    fn test_ecx() -> EvalCtx {
        EvalCtx::new(DictLoader::new(), Config::default())
    }

    #[test]
    fn lookup_through_parents() {
        let mut ecx = test_ecx();

        let root = Scope::root();
        root.assign("x".into(), Value::Int(1));

        let child = root.child().child();
        assert_eq!(Value::Int(1), child.lookup(&mut ecx, &t2p(1, 1), "x").unwrap());

        let err = child.lookup(&mut ecx, &t2p(1, 1), "y").unwrap_err();
        assert_eq!(&ErrorKind::VarNameNotFound("y".into()), err.kind());
    }

    #[test]
    fn assign_updates_nearest_binding() {
        let root = Scope::root();
        root.assign("x".into(), Value::Int(1));

        let child = root.child();
        child.assign("x".into(), Value::Int(2));

        assert!(child.bound_names().is_empty());
        assert!(matches!(root.get("x"), Some(Binding::Value(Value::Int(2)))));

        child.assign("y".into(), Value::Int(3));
        assert_eq!(vec![DataStr::from("y")], child.bound_names());
        assert!(!root.is_bound_locally("y"));
    }

    #[test]
    fn create_local_twice() {
        let root = Scope::root();
        root.create_local(&t2p(1, 1), "x".into(), Binding::Value(Value::Nil))
            .unwrap();

        // Shadowing a parent binding is fine
        let child = root.child();
        child
            .create_local(&t2p(2, 1), "x".into(), Binding::Value(Value::Int(1)))
            .unwrap();

        let err = child
            .create_local(&t2p(3, 1), "x".into(), Binding::Value(Value::Int(2)))
            .unwrap_err();

        assert_eq!(
            Error::new(t2p(3, 1), ErrorKind::CreateExistingVarName("x".into())),
            err
        );
    }

    #[test]
    fn thunks_use_defining_scope() {
        let mut ecx = test_ecx();

        let defining = Scope::root();
        defining.assign("x".into(), Value::Int(10));

        let other = Scope::root();
        other.assign("x".into(), Value::Int(20));
        other
            .create_local(
                &t2p(1, 1),
                "arg".into(),
                Binding::new_thunk(&defining, Datum::Symbol(t2p(1, 1), "x".into())),
            )
            .unwrap();

        assert_eq!(Value::Int(10), other.lookup(&mut ecx, &t2p(1, 1), "arg").unwrap());

        // Thunks see changes made after they were created
        defining.assign("x".into(), Value::Int(11));
        assert_eq!(Value::Int(11), other.lookup(&mut ecx, &t2p(1, 1), "arg").unwrap());
    }

    #[test]
    fn local_bindings_use_holding_scope() {
        let mut ecx = test_ecx();

        let root = Scope::root();
        root.assign("x".into(), Value::Int(1));

        let holder = root.child();
        holder
            .create_local(
                &t2p(1, 1),
                "y".into(),
                Binding::Local(Datum::Symbol(t2p(1, 1), "x".into())),
            )
            .unwrap();

        // Shadows the root's `x` for expressions evaluated in `holder`
        holder
            .create_local(&t2p(1, 1), "x".into(), Binding::Value(Value::Int(2)))
            .unwrap();

        let inner = holder.child();
        inner
            .create_local(&t2p(1, 1), "x".into(), Binding::Value(Value::Int(3)))
            .unwrap();

        assert_eq!(Value::Int(2), inner.lookup(&mut ecx, &t2p(1, 1), "y").unwrap());

        drop(inner);
        assert_eq!(1, holder.handle_count());
    }

    #[test]
    fn thunk_chains_are_depth_limited() {
        let mut ecx = EvalCtx::new(
            DictLoader::new(),
            Config::default().with_max_eval_depth(8),
        );

        // Each scope's `x` is a thunk referring to the parent's `x`
        let mut scope = Scope::root();
        scope.assign("x".into(), Value::Int(1));

        for _ in 0..16 {
            let child = scope.child();
            child
                .create_local(
                    &t2p(1, 1),
                    "x".into(),
                    Binding::new_thunk(&scope, Datum::Symbol(t2p(1, 1), "x".into())),
                )
                .unwrap();

            scope = child;
        }

        let err = scope.lookup(&mut ecx, &t2p(2, 1), "x").unwrap_err();
        assert_eq!(&ErrorKind::RecursionLimit(8), err.kind());
    }

    #[test]
    fn rest_thunk_evaluates_to_list() {
        let mut ecx = test_ecx();

        let scope = Scope::root();
        scope.assign("x".into(), Value::Int(1));

        let thunk = ArgThunk::new_rest(
            scope.clone(),
            vec![
                Datum::Symbol(t2p(1, 1), "x".into()),
                Datum::Static(t2p(1, 3), Value::from("two")),
            ],
        );

        assert_eq!(
            Value::from(vec![Value::Int(1), Value::from("two")]),
            thunk.evaluate(&mut ecx, &t2p(1, 1)).unwrap()
        );
    }
}
