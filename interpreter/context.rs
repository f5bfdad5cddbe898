use std::io;
use std::io::Write;

use lispy_syntax::span::SourcePosition;

use crate::builtins::Builtins;
use crate::datum::{eval_in_order, Datum};
use crate::error::{Error, ErrorKind, Result};
use crate::scope::{Binding, Scope};
use crate::source::{LoadError, SourceLoader, UnitLoader};
use crate::value::Value;

/// Default limit on the number of nested calls and thunk evaluations
///
/// Every level costs several host stack frames. This must stay low enough for evaluation to
/// report `RecursionLimit` on a 2 MiB thread stack in an unoptimised build.
pub const DEFAULT_MAX_EVAL_DEPTH: usize = 128;

/// Interpreter configuration
#[derive(Clone, Debug)]
pub struct Config {
    builtins: Builtins,
    max_eval_depth: usize,
}

impl Config {
    pub fn new(builtins: Builtins) -> Config {
        Config {
            builtins,
            max_eval_depth: DEFAULT_MAX_EVAL_DEPTH,
        }
    }

    /// Sets the maximum depth of nested calls before evaluation is aborted
    pub fn with_max_eval_depth(self, max_eval_depth: usize) -> Config {
        Config {
            max_eval_depth,
            ..self
        }
    }

    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    pub fn max_eval_depth(&self) -> usize {
        self.max_eval_depth
    }
}

impl Default for Config {
    fn default() -> Config {
        Config::new(Builtins::standard())
    }
}

/// Evaluation context holding the global scope and loaded sources
///
/// Every unit evaluated through the same context shares its global scope once `run_module` has
/// created it.
pub struct EvalCtx {
    source_loader: SourceLoader,
    config: Config,
    global_scope: Option<Scope>,
    output: Box<dyn Write>,
    eval_depth: usize,
}

impl EvalCtx {
    pub fn new(unit_loader: impl UnitLoader + 'static, config: Config) -> EvalCtx {
        EvalCtx {
            source_loader: SourceLoader::new(Box::new(unit_loader)),
            config,
            global_scope: None,
            output: Box::new(io::stdout()),
            eval_depth: 0,
        }
    }

    /// Redirects the output of `print`
    pub fn with_output(self, output: Box<dyn Write>) -> EvalCtx {
        EvalCtx { output, ..self }
    }

    pub fn source_loader(&self) -> &SourceLoader {
        &self.source_loader
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn global_scope(&self) -> Option<&Scope> {
        self.global_scope.as_ref()
    }

    /// Creates a root scope containing our builtins
    pub fn new_global_scope(&self) -> Scope {
        let entries = self.config.builtins().iter().map(|builtin| {
            (
                builtin.name().into(),
                Binding::Value(Value::Builtin(*builtin)),
            )
        });

        Scope::new_with_entries(entries)
    }

    /// Evaluates a unit in a new global scope
    ///
    /// Top-level forms are evaluated directly in the global scope. The result is the value of the
    /// last form or nil for an empty unit.
    pub fn run_module(&mut self, unit_name: &str) -> Result<Value> {
        let program = self.build_unit(None, unit_name)?;

        let global_scope = self.new_global_scope();
        self.global_scope = Some(global_scope.clone());

        self.evaluate_top_level(&program, &global_scope)
    }

    /// Evaluates a unit in the existing global scope
    ///
    /// The global scope is created if no unit has been run yet.
    pub fn evaluate_unit(&mut self, unit_name: &str) -> Result<Value> {
        self.evaluate_unit_from(None, unit_name)
    }

    pub(crate) fn evaluate_unit_from(
        &mut self,
        load_pos: Option<&SourcePosition>,
        unit_name: &str,
    ) -> Result<Value> {
        let program = self.build_unit(load_pos, unit_name)?;

        let global_scope = match self.global_scope {
            Some(ref global_scope) => global_scope.clone(),
            None => {
                let global_scope = self.new_global_scope();
                self.global_scope = Some(global_scope.clone());
                global_scope
            }
        };

        self.evaluate_top_level(&program, &global_scope)
    }

    fn build_unit(&mut self, load_pos: Option<&SourcePosition>, unit_name: &str) -> Result<Datum> {
        log::debug!("loading unit `{}`", unit_name);

        let source_file = self.source_loader.load_unit(unit_name).map_err(|err| {
            let kind = match err {
                LoadError::NotFound => ErrorKind::UnitNotFound(unit_name.into()),
                LoadError::Io(io_err) => {
                    ErrorKind::ReadError(unit_name.into(), io_err.to_string().into())
                }
            };

            match load_pos {
                Some(pos) => Error::new(pos.clone(), kind),
                None => Error::new_unpositioned(kind),
            }
        })?;

        let node = source_file.parsed()?;
        Ok(Datum::build(node))
    }

    fn evaluate_top_level(&mut self, program: &Datum, global_scope: &Scope) -> Result<Value> {
        match program {
            Datum::ExprSeq(_, forms) => eval_in_order(self, global_scope, forms),
            other => other.evaluate(self, global_scope),
        }
    }

    pub(crate) fn enter_call(&mut self, pos: &SourcePosition) -> Result<()> {
        let max_eval_depth = self.config.max_eval_depth();

        if self.eval_depth >= max_eval_depth {
            return Err(Error::new(
                pos.clone(),
                ErrorKind::RecursionLimit(max_eval_depth),
            ));
        }

        self.eval_depth += 1;
        Ok(())
    }

    pub(crate) fn leave_call(&mut self) {
        self.eval_depth -= 1;
    }

    pub(crate) fn write_line(&mut self, pos: &SourcePosition, value: &Value) -> Result<()> {
        writeln!(self.output, "{}", value)
            .and_then(|_| self.output.flush())
            .map_err(|err| Error::new(pos.clone(), ErrorKind::Output(err.to_string().into())))
    }
}
