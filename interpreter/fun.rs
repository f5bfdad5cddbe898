use lispy_syntax::node::DataStr;
use lispy_syntax::span::SourcePosition;

use crate::context::EvalCtx;
use crate::datum::{eval_in_order, Datum};
use crate::error::{Error, ErrorKind, Result, WantedArity};
use crate::scope::{ArgThunk, Binding, Scope};
use crate::value::Value;

const OPTIONAL_KEYWORD: &str = "&optional";
const REST_KEYWORD: &str = "&rest";

#[derive(Clone, Debug)]
struct OptionalParam {
    name: DataStr,
    default: Option<Datum>,
}

/// Parameters accepted by a user function
#[derive(Clone, Debug, Default)]
pub struct ParamList {
    required: Vec<DataStr>,
    optional: Vec<OptionalParam>,
    rest: Option<DataStr>,
}

#[derive(Clone, Copy)]
enum ParamMode {
    Required,
    Optional,
    Rest,
}

fn invalid_params(datum: &Datum, message: &'static str) -> Error {
    Error::new(datum.pos().clone(), ErrorKind::InvalidParamList(message))
}

impl ParamList {
    /// Parses a parameter list from a `defun` form
    ///
    /// `&optional` parameters are either a name or a `(name default)` list. `&rest` must be
    /// followed by exactly one name.
    pub fn from_datum(datum: &Datum) -> Result<ParamList> {
        let items = match datum {
            Datum::List(_, items) => items,
            _ => return Err(invalid_params(datum, "parameters must be a list")),
        };

        let mut params = ParamList::default();
        let mut mode = ParamMode::Required;

        for item in items.iter() {
            match (item, mode) {
                (Datum::Symbol(_, name), ParamMode::Required)
                    if name.as_ref() == OPTIONAL_KEYWORD =>
                {
                    mode = ParamMode::Optional;
                }
                (Datum::Symbol(_, name), ParamMode::Required)
                | (Datum::Symbol(_, name), ParamMode::Optional)
                    if name.as_ref() == REST_KEYWORD =>
                {
                    mode = ParamMode::Rest;
                }
                (Datum::Symbol(_, name), _) if name.starts_with('&') => {
                    return Err(invalid_params(item, "unexpected parameter keyword"));
                }
                (Datum::Symbol(_, name), ParamMode::Required) => {
                    params.required.push(name.clone());
                }
                (Datum::Symbol(_, name), ParamMode::Optional) => {
                    params.optional.push(OptionalParam {
                        name: name.clone(),
                        default: None,
                    });
                }
                (Datum::List(_, pair), ParamMode::Optional) => match pair.as_ref() {
                    [Datum::Symbol(_, name), default] if !name.starts_with('&') => {
                        params.optional.push(OptionalParam {
                            name: name.clone(),
                            default: Some(default.clone()),
                        });
                    }
                    _ => {
                        return Err(invalid_params(
                            item,
                            "optional parameters with defaults must be `(name default)`",
                        ));
                    }
                },
                (Datum::Symbol(_, name), ParamMode::Rest) => {
                    if params.rest.is_some() {
                        return Err(invalid_params(
                            item,
                            "`&rest` must be followed by exactly one name",
                        ));
                    }

                    params.rest = Some(name.clone());
                }
                _ => {
                    return Err(invalid_params(item, "parameters must be symbols"));
                }
            }
        }

        if let ParamMode::Rest = mode {
            if params.rest.is_none() {
                return Err(invalid_params(
                    datum,
                    "`&rest` must be followed by exactly one name",
                ));
            }
        }

        Ok(params)
    }

    pub fn arity(&self) -> WantedArity {
        WantedArity::new(
            self.required.len(),
            self.optional.len(),
            self.rest.is_some(),
        )
    }
}

/// Function defined with `defun`
#[derive(Debug)]
pub struct UserFun {
    name: DataStr,
    params: ParamList,
    body: Box<[Datum]>,
}

impl UserFun {
    pub fn new(name: DataStr, params: ParamList, body: Box<[Datum]>) -> UserFun {
        UserFun { name, params, body }
    }

    pub fn name(&self) -> &DataStr {
        &self.name
    }

    pub fn params(&self) -> &ParamList {
        &self.params
    }

    /// Applies the function to unevaluated arguments
    ///
    /// Every parameter is bound to a thunk over the caller's scope in a new child of the
    /// caller's scope. Arguments are only evaluated when the body refers to their parameter.
    /// Defaults of missing optional arguments are evaluated in the function's own scope so they
    /// can refer to earlier parameters.
    pub fn apply(
        &self,
        ecx: &mut EvalCtx,
        caller_scope: &Scope,
        pos: &SourcePosition,
        args: &[Datum],
    ) -> Result<Value> {
        let arity = self.params.arity();
        if !arity.accepts(args.len()) {
            return Err(Error::new(
                pos.clone(),
                ErrorKind::WrongArgCount(args.len(), arity),
            ));
        }

        log::trace!("calling `{}` with {} arguments at {}", self.name, args.len(), pos);

        let fun_scope = caller_scope.child();
        let mut args_iter = args.iter();

        for (name, arg) in self.params.required.iter().zip(args_iter.by_ref()) {
            let binding = Binding::new_thunk(caller_scope, arg.clone());
            fun_scope.create_local(pos, name.clone(), binding)?;
        }

        for param in &self.params.optional {
            let binding = match (args_iter.next(), &param.default) {
                (Some(arg), _) => Binding::new_thunk(caller_scope, arg.clone()),
                (None, Some(default)) => Binding::Local(default.clone()),
                (None, None) => Binding::Value(Value::Nil),
            };

            fun_scope.create_local(pos, param.name.clone(), binding)?;
        }

        if let Some(ref rest_name) = self.params.rest {
            let rest_thunk = ArgThunk::new_rest(caller_scope.clone(), args_iter.cloned().collect());
            let binding = Binding::Thunk(rest_thunk.into());
            fun_scope.create_local(pos, rest_name.clone(), binding)?;
        }

        eval_in_order(ecx, &fun_scope, &self.body)
    }
}
