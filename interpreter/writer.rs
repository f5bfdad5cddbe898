use std::fmt::{Result, Write};

use crate::datum::Datum;
use crate::value::Value;

macro_rules! process_escaped_chars {
    ($w:ident, $source:ident, $( $pattern:pat => $escape:expr ),*) => {
        // Try to write sequential unescaped characters in chunks
        let mut last_escape_end = 0;
        for (index, c) in $source.char_indices() {
            match c {
                $(
                    $pattern => {
                        $w.write_str(&$source[last_escape_end..index])?;
                        last_escape_end = index + c.len_utf8();
                        ($escape)?;
                    }
                ),* ,
                _ => {}
            };
        }

        $w.write_str(&$source[last_escape_end..])?;
    }
}

fn write_escaped_str(w: &mut dyn Write, source: &str) -> Result {
    process_escaped_chars!(w, source,
        '\t' => write!(w, "\\t"),
        '\r' => write!(w, "\\r"),
        '\n' => write!(w, "\\n"),
        '\\' => write!(w, "\\\\"),
        '"' => write!(w, "\\\""),
        c @ '\u{0}'..='\u{1F}' => write!(w, "\\x{:X};", c as u32)
    );

    Ok(())
}

fn write_quoted_str(w: &mut dyn Write, source: &str) -> Result {
    write!(w, "\"")?;
    write_escaped_str(w, source)?;
    write!(w, "\"")
}

#[allow(clippy::float_cmp)]
fn write_float(w: &mut dyn Write, f: f64) -> Result {
    if f.is_nan() {
        write!(w, "nan")
    } else if f.is_infinite() {
        if f.is_sign_positive() {
            write!(w, "inf")
        } else {
            write!(w, "-inf")
        }
    } else if f == 0.0 && f.is_sign_negative() {
        write!(w, "-0.0")
    } else if f.fract() == 0.0 {
        // This is has no fractional part; force a .0 to mark it as a float
        write!(w, "{:.1}", f)
    } else {
        write!(w, "{}", f)
    }
}

fn write_seq<'a, T: 'a>(
    w: &mut dyn Write,
    elems: impl Iterator<Item = &'a T>,
    separator: &str,
    write_elem: impl Fn(&mut dyn Write, &'a T) -> Result,
) -> Result {
    let mut has_prev = false;
    for elem in elems {
        if has_prev {
            w.write_str(separator)?;
        } else {
            has_prev = true;
        }

        write_elem(w, elem)?;
    }

    Ok(())
}

/// Writes a datum back in its surface syntax
pub fn write_datum(w: &mut dyn Write, datum: &Datum) -> Result {
    match datum {
        Datum::Static(_, value) => write_value(w, value),
        Datum::Symbol(_, name) => w.write_str(name),
        Datum::List(_, items) => {
            write!(w, "(")?;
            write_seq(w, items.iter(), " ", write_datum)?;
            write!(w, ")")
        }
        Datum::ExprSeq(_, items) => write_seq(w, items.iter(), " ", write_datum),
        Datum::Quote(_, inner) => {
            write!(w, "'")?;
            write_datum(w, inner)
        }
    }
}

/// Writes a representation of the passed value
///
/// Strings are quoted and escaped. This is the form used for list members.
pub fn write_value(w: &mut dyn Write, value: &Value) -> Result {
    match value {
        Value::Nil => write!(w, "nil"),
        Value::Bool(true) => write!(w, "#t"),
        Value::Bool(false) => write!(w, "#f"),
        Value::Int(i) => write!(w, "{}", i),
        Value::Float(f) => write_float(w, *f),
        Value::Str(s) => write_quoted_str(w, s),
        Value::List(members) => {
            write!(w, "[")?;
            write_seq(w, members.iter(), ", ", write_value)?;
            write!(w, "]")
        }
        Value::Builtin(builtin) => write!(w, "#<builtin {}>", builtin.name()),
        Value::Fun(fun) => write!(w, "#<function {}>", fun.name()),
        Value::Quote(datum) => write_datum(w, datum),
    }
}

/// Writes a value the way `print` displays it
///
/// This only differs from `write_value` in writing top-level strings verbatim.
pub fn write_display(w: &mut dyn Write, value: &Value) -> Result {
    match value {
        Value::Str(s) => w.write_str(s),
        other => write_value(w, other),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use lispy_syntax::parser::data_from_str;

    fn repr(value: &Value) -> String {
        let mut output = String::new();
        write_value(&mut output, value).unwrap();
        output
    }

    #[test]
    fn atoms() {
        assert_eq!("nil", repr(&Value::Nil));
        assert_eq!("#t", repr(&Value::Bool(true)));
        assert_eq!("#f", repr(&Value::Bool(false)));
        assert_eq!("-12", repr(&Value::Int(-12)));
    }

    #[test]
    fn floats() {
        assert_eq!("14.0", repr(&Value::Float(14.0)));
        assert_eq!("-0.0", repr(&Value::Float(-0.0)));
        assert_eq!("2.5", repr(&Value::Float(2.5)));
        assert_eq!("100000000000000000000.0", repr(&Value::Float(1e20)));
        assert_eq!("nan", repr(&Value::Float(std::f64::NAN)));
        assert_eq!("-inf", repr(&Value::Float(std::f64::NEG_INFINITY)));
    }

    #[test]
    fn strings() {
        let value = Value::Str("say \"hi\"\n".into());
        assert_eq!("\"say \\\"hi\\\"\\n\"", repr(&value));

        let mut displayed = String::new();
        write_display(&mut displayed, &value).unwrap();
        assert_eq!("say \"hi\"\n", displayed);
    }

    #[test]
    fn control_chars_escaped() {
        assert_eq!("\"\\x1F;\\x7;\"", repr(&Value::Str("\u{1F}\u{7}".into())));
    }

    #[test]
    fn lists() {
        let value = Value::List(
            vec![
                Value::Int(1),
                Value::Str("two".into()),
                Value::List(vec![Value::Float(3.0)].into()),
            ]
            .into(),
        );

        assert_eq!("[1, \"two\", [3.0]]", repr(&value));
        assert_eq!("[]", repr(&Value::List(vec![].into())));
    }

    #[test]
    fn quoted_datums() {
        let node = data_from_str("test", "(f 'x \"y\" 1.5)").unwrap();
        let datum = Datum::build(&node);

        assert_eq!("(f 'x \"y\" 1.5)", repr(&Value::Quote(datum.into())));
    }
}
