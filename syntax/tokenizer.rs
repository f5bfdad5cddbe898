use crate::error::{Error, ErrorKind};
use crate::node::DataStr;
use crate::span::{LineTracker, SourcePosition};
use crate::token::{Token, TokenKind};

/// Scans source text in to tokens
///
/// Unrecognised characters are skipped so every one of them can be reported in a single pass. If
/// any error is encountered the tokens are discarded and all errors are returned in source order.
pub fn tokenize(unit_name: &str, text: &str) -> Result<Vec<Token>, Vec<Error>> {
    let mut tokenizer = Tokenizer::new(unit_name.into(), text);
    tokenizer.scan_all();

    if tokenizer.errors.is_empty() {
        Ok(tokenizer.tokens)
    } else {
        Err(tokenizer.errors)
    }
}

pub fn is_identifier_start_char(c: char) -> bool {
    match c {
        '_' | '!' | '$' | '%' | '*' | '/' | ':' | '<' | '=' | '>' | '?' | '~' | '^' | '+' | '-' => {
            true
        }
        c => c.is_alphabetic(),
    }
}

pub fn is_identifier_char(c: char) -> bool {
    match c {
        '_' | '!' | '$' | '%' | '^' | '*' | '/' | ':' | '<' | '=' | '>' | '?' | '~' | '.' | '+'
        | '-' => true,
        c => c.is_alphanumeric(),
    }
}

fn is_keyword_char(c: char) -> bool {
    match c {
        'A'..='Z' | 'a'..='z' | '-' | '_' => true,
        _ => false,
    }
}

struct Tokenizer<'de> {
    source: &'de str,
    consumed_bytes: usize,
    consumed_chars: usize,
    tracker: LineTracker,

    tokens: Vec<Token>,
    errors: Vec<Error>,
}

impl<'de> Tokenizer<'de> {
    fn new(unit_name: DataStr, source: &'de str) -> Self {
        Tokenizer {
            source,
            consumed_bytes: 0,
            consumed_chars: 0,
            tracker: LineTracker::new(unit_name),

            tokens: vec![],
            errors: vec![],
        }
    }

    fn remaining(&self) -> &'de str {
        let source = self.source;
        &source[self.consumed_bytes..]
    }

    fn current_pos(&self) -> SourcePosition {
        self.tracker.position_for(self.consumed_chars)
    }

    fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn peek_nth_char(&self, i: usize) -> Option<char> {
        self.remaining().chars().nth(i)
    }

    fn consume_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;

        if c == '\n' {
            self.tracker.record_newline(self.consumed_chars);
        }

        self.consumed_bytes += c.len_utf8();
        self.consumed_chars += 1;

        Some(c)
    }

    /// Consumes characters while `predicate` holds, returning the consumed text
    fn consume_while<T>(&mut self, mut predicate: T) -> &'de str
    where
        T: FnMut(char) -> bool,
    {
        let start_bytes = self.consumed_bytes;

        while let Some(c) = self.peek_char() {
            if !predicate(c) {
                break;
            }

            self.consume_char();
        }

        let source = self.source;
        &source[start_bytes..self.consumed_bytes]
    }

    fn push_token(&mut self, pos: SourcePosition, kind: TokenKind) {
        self.tokens.push(Token::new(kind, pos));
    }

    fn push_scanned(&mut self, result: Result<Token, Error>) {
        match result {
            Ok(token) => self.tokens.push(token),
            Err(err) => self.errors.push(err),
        }
    }

    fn scan_all(&mut self) {
        while let Some(c) = self.peek_char() {
            let next_char = self.peek_nth_char(1);

            match c {
                ' ' | '\t' | '\r' | '\n' => {
                    self.consume_char();
                }
                ';' => {
                    self.consume_while(|c| c != '\n');
                }
                '"' => {
                    let scanned = self.scan_string();
                    self.push_scanned(scanned);
                }
                '#' if next_char == Some('t') || next_char == Some('f') => {
                    let pos = self.current_pos();
                    self.consume_char();
                    self.consume_char();
                    self.push_token(pos, TokenKind::Bool(next_char == Some('t')));
                }
                '0'..='9' => {
                    let scanned = self.scan_number();
                    self.push_scanned(scanned);
                }
                '-' if next_char.map(|c| c.is_ascii_digit()).unwrap_or(false) => {
                    let scanned = self.scan_number();
                    self.push_scanned(scanned);
                }
                '(' | ')' | '\'' => {
                    let pos = self.current_pos();
                    self.consume_char();

                    let kind = match c {
                        '(' => TokenKind::LParen,
                        ')' => TokenKind::RParen,
                        _ => TokenKind::SQuote,
                    };
                    self.push_token(pos, kind);
                }
                '&' if next_char.map(is_keyword_char).unwrap_or(false) => {
                    let pos = self.current_pos();
                    self.consume_char();

                    let name = self.consume_while(is_keyword_char);
                    self.push_token(pos, TokenKind::Keyword(format!("&{}", name).into()));
                }
                '+' | '-' => {
                    // Signs are only ever identifiers on their own
                    let pos = self.current_pos();
                    self.consume_char();
                    self.push_token(pos, TokenKind::Id(c.to_string().into()));
                }
                c if is_identifier_start_char(c) => {
                    let pos = self.current_pos();
                    self.consume_char();

                    let rest = self.consume_while(is_identifier_char);
                    let mut name = String::with_capacity(rest.len() + c.len_utf8());
                    name.push(c);
                    name.push_str(rest);

                    self.push_token(pos, TokenKind::Id(name.into()));
                }
                other => {
                    let pos = self.current_pos();
                    self.consume_char();
                    self.errors.push(Error::new(pos, ErrorKind::InvalidToken(other)));
                }
            }
        }
    }

    fn scan_number(&mut self) -> Result<Token, Error> {
        let pos = self.current_pos();
        let start_bytes = self.consumed_bytes;

        if self.peek_char() == Some('-') {
            self.consume_char();
        }
        self.consume_while(|c| c.is_ascii_digit());

        if self.peek_char() != Some('.') {
            let digits = &self.source[start_bytes..self.consumed_bytes];

            return digits
                .parse::<i64>()
                .map(|i| Token::new(TokenKind::Int(i), pos.clone()))
                .map_err(|_| Error::new(pos, ErrorKind::IntegerOverflow));
        }

        // Fractional part
        self.consume_char();
        self.consume_while(|c| c.is_ascii_digit());

        // Optional exponent; it's only consumed if it's well formed
        if let Some('e') | Some('E') = self.peek_char() {
            let has_exponent = match (self.peek_nth_char(1), self.peek_nth_char(2)) {
                (Some(d), _) if d.is_ascii_digit() => true,
                (Some('-'), Some(d)) if d.is_ascii_digit() => true,
                _ => false,
            };

            if has_exponent {
                self.consume_char();
                if self.peek_char() == Some('-') {
                    self.consume_char();
                }
                self.consume_while(|c| c.is_ascii_digit());
            }
        }

        let float_str = &self.source[start_bytes..self.consumed_bytes];
        float_str
            .parse::<f64>()
            .map(|f| Token::new(TokenKind::Float(f), pos.clone()))
            .map_err(|_| Error::new(pos, ErrorKind::InvalidFloat))
    }

    fn scan_quote_escape(&mut self) -> Result<char, ErrorKind> {
        match self.consume_char() {
            Some('t') => Ok('\t'),
            Some('r') => Ok('\r'),
            Some('n') => Ok('\n'),
            Some('\\') => Ok('\\'),
            Some('"') => Ok('"'),
            Some('x') => {
                let hex_string = self.consume_while(|c| c.is_ascii_hexdigit());

                if self.peek_char() != Some(';') {
                    return Err(ErrorKind::UnsupportedStringEscape);
                }
                self.consume_char();

                u32::from_str_radix(hex_string, 16)
                    .ok()
                    .and_then(std::char::from_u32)
                    .ok_or(ErrorKind::UnsupportedStringEscape)
            }
            Some(_) => Err(ErrorKind::UnsupportedStringEscape),
            None => Err(ErrorKind::UnterminatedString),
        }
    }

    fn scan_string(&mut self) -> Result<Token, Error> {
        let pos = self.current_pos();

        // Eat the opening quote
        self.consume_char();

        let mut contents = String::new();
        let mut first_escape_error: Option<Error> = None;

        loop {
            match self.peek_char() {
                None => {
                    return Err(Error::new(pos, ErrorKind::UnterminatedString));
                }
                Some('"') => {
                    self.consume_char();
                    break;
                }
                Some('\\') => {
                    let escape_pos = self.current_pos();
                    self.consume_char();

                    match self.scan_quote_escape() {
                        Ok(c) => contents.push(c),
                        Err(ErrorKind::UnterminatedString) => {
                            return Err(Error::new(pos, ErrorKind::UnterminatedString));
                        }
                        Err(kind) => {
                            // Keep scanning to the closing quote so the remainder of the string
                            // isn't tokenized as code
                            if first_escape_error.is_none() {
                                first_escape_error = Some(Error::new(escape_pos, kind));
                            }
                        }
                    }
                }
                Some(other) => {
                    self.consume_char();
                    contents.push(other);
                }
            }
        }

        match first_escape_error {
            Some(err) => Err(err),
            None => Ok(Token::new(TokenKind::Str(contents.into()), pos)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::span::t2p;

    fn kinds_for_str(text: &str) -> Vec<TokenKind> {
        tokenize("test", text)
            .unwrap()
            .into_iter()
            .map(|token| token.into_parts().0)
            .collect()
    }

    fn errors_for_str(text: &str) -> Vec<Error> {
        tokenize("test", text).unwrap_err()
    }

    #[test]
    fn empty_input() {
        assert_eq!(Vec::<TokenKind>::new(), kinds_for_str(""));
        assert_eq!(Vec::<TokenKind>::new(), kinds_for_str("  \t\r\n\n  "));
        assert_eq!(Vec::<TokenKind>::new(), kinds_for_str("; only a comment"));
    }

    #[test]
    fn bool_tokens() {
        assert_eq!(
            vec![TokenKind::Bool(true), TokenKind::Bool(false)],
            kinds_for_str("#t #f")
        );
    }

    #[test]
    fn int_tokens() {
        assert_eq!(
            vec![
                TokenKind::Int(0),
                TokenKind::Int(1000),
                TokenKind::Int(-42),
                TokenKind::Int(9_223_372_036_854_775_807),
                TokenKind::Int(-9_223_372_036_854_775_808),
            ],
            kinds_for_str("0 1000 -42 9223372036854775807 -9223372036854775808")
        );

        let errs = errors_for_str("  10223372036854775807");
        assert_eq!(
            vec![Error::new(t2p(1, 3), ErrorKind::IntegerOverflow)],
            errs
        );
    }

    #[test]
    fn float_tokens() {
        assert_eq!(
            vec![
                TokenKind::Float(1.5),
                TokenKind::Float(-0.25),
                TokenKind::Float(3.0),
                TokenKind::Float(1.5e3),
                TokenKind::Float(2.0e-2),
            ],
            kinds_for_str("1.5 -0.25 3. 1.5e3 2.0e-2")
        );
    }

    #[test]
    fn malformed_exponent_is_not_consumed() {
        assert_eq!(
            vec![TokenKind::Float(1.0), TokenKind::Id("e".into())],
            kinds_for_str("1.0e")
        );
    }

    #[test]
    fn identifier_tokens() {
        for &name in &[
            "HELLO",
            "hello123",
            "predicate?",
            "mutate!",
            "from->to",
            "x-1",
            "<=",
            "!=",
            "+",
            "-",
            "a.b",
        ] {
            assert_eq!(vec![TokenKind::Id(name.into())], kinds_for_str(name));
        }
    }

    #[test]
    fn minus_before_digit_is_a_number() {
        assert_eq!(
            vec![
                TokenKind::LParen,
                TokenKind::Id("-".into()),
                TokenKind::Id("n".into()),
                TokenKind::Int(-1),
                TokenKind::RParen,
            ],
            kinds_for_str("(- n -1)")
        );
    }

    #[test]
    fn signs_are_standalone_identifiers() {
        assert_eq!(
            vec![
                TokenKind::Id("+".into()),
                TokenKind::Int(1),
                TokenKind::Id("-".into()),
                TokenKind::Id("x".into()),
                TokenKind::Id("+".into()),
                TokenKind::Id("-".into()),
            ],
            kinds_for_str("+1 -x +-")
        );
    }

    #[test]
    fn keyword_tokens() {
        assert_eq!(
            vec![
                TokenKind::Keyword("&optional".into()),
                TokenKind::Keyword("&rest".into())
            ],
            kinds_for_str("&optional &rest")
        );

        let errs = errors_for_str("&1");
        assert_eq!(ErrorKind::InvalidToken('&'), *errs[0].kind());
    }

    #[test]
    fn string_tokens() {
        let test_strings = [
            (r#""""#, ""),
            (r#""Hello, world!""#, "Hello, world!"),
            (r#""Hello\"World""#, "Hello\"World"),
            (r#""Hello\\World""#, "Hello\\World"),
            (r#""Tab\t""#, "Tab\t"),
            (r#""\nnewline""#, "\nnewline"),
            (r#""Space\x20;Bar""#, "Space Bar"),
            (r#""l\x03BB;""#, "l\u{03bb}"),
        ];

        for (source, expected_contents) in &test_strings {
            assert_eq!(
                vec![TokenKind::Str((*expected_contents).into())],
                kinds_for_str(source)
            );
        }
    }

    #[test]
    fn string_errors() {
        let errs = errors_for_str(r#"  "foo "#);
        assert_eq!(
            vec![Error::new(t2p(1, 3), ErrorKind::UnterminatedString)],
            errs
        );

        // The remainder of the string isn't treated as code
        let errs = errors_for_str(r#""a\p{}" x"#);
        assert_eq!(
            vec![Error::new(t2p(1, 3), ErrorKind::UnsupportedStringEscape)],
            errs
        );
    }

    #[test]
    fn parens_and_quotes() {
        assert_eq!(
            vec![
                TokenKind::SQuote,
                TokenKind::LParen,
                TokenKind::Int(1),
                TokenKind::RParen
            ],
            kinds_for_str("'(1)")
        );
    }

    #[test]
    fn comments_are_discarded() {
        assert_eq!(
            vec![TokenKind::Int(1), TokenKind::Int(2)],
            kinds_for_str("1 ; one (two) \"three\"\n2 ;")
        );
    }

    #[test]
    fn token_positions() {
        let tokens = tokenize("test", "(begin\n  x\n\n\t\"s\")").unwrap();
        let positions: Vec<SourcePosition> = tokens.iter().map(|t| t.pos().clone()).collect();

        assert_eq!(
            vec![t2p(1, 1), t2p(1, 2), t2p(2, 3), t2p(4, 2), t2p(4, 5)],
            positions
        );
    }

    #[test]
    fn multiline_string_advances_lines() {
        let tokens = tokenize("test", "\"a\nb\" c").unwrap();
        assert_eq!(&t2p(2, 4), tokens[1].pos());
    }

    #[test]
    fn invalid_characters_are_all_reported() {
        let errs = errors_for_str("(+ 1 @)\n  [x]");

        assert_eq!(
            vec![
                Error::new(t2p(1, 6), ErrorKind::InvalidToken('@')),
                Error::new(t2p(2, 3), ErrorKind::InvalidToken('[')),
                Error::new(t2p(2, 5), ErrorKind::InvalidToken(']')),
            ],
            errs
        );
    }

    #[test]
    fn unsupported_hash() {
        let errs = errors_for_str("#x");
        assert_eq!(ErrorKind::InvalidToken('#'), *errs[0].kind());
    }
}
