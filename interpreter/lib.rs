#![warn(clippy::all)]
#![warn(rust_2018_idioms)]

pub mod builtins;
mod context;
pub mod datum;
pub mod error;
pub mod fun;
mod reporting;
pub mod scope;
mod source;
pub mod value;
pub mod writer;

pub use crate::builtins::{Builtin, Builtins};
pub use crate::context::{Config, EvalCtx, DEFAULT_MAX_EVAL_DEPTH};
pub use crate::error::{Error, ErrorKind, Result, WantedArity};
pub use crate::reporting::{
    diagnostic_for_syntax_error, diagnostics_for_error, emit_diagnostics,
    emit_diagnostics_to_stderr, new_primary_label,
};
pub use crate::source::{
    DictLoader, FileId, FileSysLoader, LoadError, ReportableFiles, SourceFile, SourceLoader,
    UnitLoader,
};
pub use crate::value::Value;
