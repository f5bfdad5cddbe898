use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::Error as CodespanError;
use codespan_reporting::term;
use termcolor::WriteColor;

use lispy_syntax::error::{Error as SyntaxError, ErrorKind as SyntaxErrorKind};
use lispy_syntax::span::SourcePosition;

use crate::error::{Error, ErrorKind};
use crate::source::{FileId, SourceLoader};

/// Returns a primary label for a position if it falls within a loaded unit
pub fn new_primary_label(
    source_loader: &SourceLoader,
    pos: &SourcePosition,
    message: impl Into<String>,
) -> Option<Label<FileId>> {
    source_loader
        .locate(pos)
        .map(|(file_id, range)| Label::primary(file_id, range).with_message(message))
}

fn syntax_label_message(kind: &SyntaxErrorKind) -> &'static str {
    match kind {
        SyntaxErrorKind::UnclosedExpression => "expression starts here",
        SyntaxErrorKind::TooManyClosingParens => "unmatched `)`",
        SyntaxErrorKind::DanglingQuote => "quote has nothing to quote",
        SyntaxErrorKind::UnterminatedString => "string starts here",
        _ => "",
    }
}

fn label_message(kind: &ErrorKind) -> &'static str {
    match kind {
        ErrorKind::VarNameNotFound(_) => "not found in any enclosing scope",
        ErrorKind::CreateExistingVarName(_) => "bound again here",
        ErrorKind::UndefinedFunction(_) => "called here",
        ErrorKind::WrongArgCount(_, _) => "called here",
        ErrorKind::NotCallable(_) => "called here",
        ErrorKind::UnitNotFound(_) | ErrorKind::ReadError(_, _) => "loaded here",
        ErrorKind::RecursionLimit(_) => "limit reached here",
        _ => "",
    }
}

fn diagnostic_with_label(
    source_loader: &SourceLoader,
    message: String,
    label: Option<(&SourcePosition, &'static str)>,
) -> Diagnostic<FileId> {
    let diagnostic = Diagnostic::error().with_message(message);

    let label = label.and_then(|(pos, label_message)| {
        new_primary_label(source_loader, pos, label_message)
    });

    match label {
        Some(label) => diagnostic.with_labels(vec![label]),
        None => diagnostic,
    }
}

pub fn diagnostic_for_syntax_error(
    source_loader: &SourceLoader,
    error: &SyntaxError,
) -> Diagnostic<FileId> {
    diagnostic_with_label(
        source_loader,
        error.kind().message(),
        Some((error.pos(), syntax_label_message(error.kind()))),
    )
}

/// Converts an evaluation error to diagnostics
///
/// Syntax errors produce one diagnostic for each underlying error.
pub fn diagnostics_for_error(
    source_loader: &SourceLoader,
    error: &Error,
) -> Vec<Diagnostic<FileId>> {
    if let ErrorKind::Syntax(syntax_errors) = error.kind() {
        return syntax_errors
            .iter()
            .map(|syntax_error| diagnostic_for_syntax_error(source_loader, syntax_error))
            .collect();
    }

    let label = error.pos().map(|pos| (pos, label_message(error.kind())));
    vec![diagnostic_with_label(source_loader, error.message(), label)]
}

/// Renders diagnostics to the passed writer
pub fn emit_diagnostics(
    writer: &mut dyn WriteColor,
    source_loader: &SourceLoader,
    diagnostics: impl IntoIterator<Item = Diagnostic<FileId>>,
) -> Result<(), CodespanError> {
    let config = term::Config::default();
    let files = source_loader.files();

    for diagnostic in diagnostics {
        term::emit(writer, &config, &files, &diagnostic)?;
    }

    Ok(())
}

pub fn emit_diagnostics_to_stderr(
    source_loader: &SourceLoader,
    diagnostics: impl IntoIterator<Item = Diagnostic<FileId>>,
) {
    use termcolor::{ColorChoice, StandardStream};

    let stderr = StandardStream::stderr(ColorChoice::Auto);
    let mut stderr_lock = stderr.lock();

    if let Err(err) = emit_diagnostics(&mut stderr_lock, source_loader, diagnostics) {
        log::error!("unable to render diagnostics: {}", err);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::source::DictLoader;
    use lispy_syntax::parser::data_from_str;
    use lispy_syntax::span::t2p;
    use termcolor::NoColor;

    fn render(source_loader: &SourceLoader, diagnostics: Vec<Diagnostic<FileId>>) -> String {
        let mut output = NoColor::new(vec![]);
        emit_diagnostics(&mut output, source_loader, diagnostics).unwrap();
        String::from_utf8(output.into_inner()).unwrap()
    }

    #[test]
    fn syntax_errors_each_get_a_diagnostic() {
        let mut source_loader = SourceLoader::new(Box::new(DictLoader::new()));
        source_loader.load_string("test", "(+ 1 @ `)");

        let error: Error = data_from_str("test", "(+ 1 @ `)").unwrap_err().into();
        let diagnostics = diagnostics_for_error(&source_loader, &error);

        assert_eq!(2, diagnostics.len());
        assert_eq!("cannot parse text beginning with `@`", diagnostics[0].message);
        assert_eq!(5..6, diagnostics[0].labels[0].range);
        assert_eq!(7..8, diagnostics[1].labels[0].range);
    }

    #[test]
    fn evaluation_error_label() {
        let mut source_loader = SourceLoader::new(Box::new(DictLoader::new()));
        source_loader.load_string("test", "(begin\n  undefined_var)");

        let error = Error::new(
            t2p(2, 3),
            ErrorKind::VarNameNotFound("undefined_var".into()),
        );
        let diagnostics = diagnostics_for_error(&source_loader, &error);

        assert_eq!(1, diagnostics.len());
        assert_eq!(1, diagnostics[0].labels.len());
        assert_eq!(9..10, diagnostics[0].labels[0].range);

        let rendered = render(&source_loader, diagnostics);
        assert!(rendered.contains("variable name `undefined_var` not found"));
        assert!(rendered.contains("test:2:3"));
    }

    #[test]
    fn unpositioned_error_has_no_labels() {
        let source_loader = SourceLoader::new(Box::new(DictLoader::new()));
        let error = Error::new_unpositioned(ErrorKind::UnitNotFound("main".into()));

        let diagnostics = diagnostics_for_error(&source_loader, &error);
        assert!(diagnostics[0].labels.is_empty());

        let rendered = render(&source_loader, diagnostics);
        assert!(rendered.contains("unit `main` not found"));
    }
}
