use crate::error::{Error, ErrorKind, Result};
use crate::node::Node;
use crate::span::SourcePosition;
use crate::token::{Token, TokenKind};
use crate::tokenizer::tokenize;

/// Tokenizes and parses a unit's source text
///
/// Tokenizer errors are all returned together; a parse error is only reported once tokenizing
/// succeeds.
pub fn data_from_str(unit_name: &str, text: &str) -> std::result::Result<Node, Vec<Error>> {
    let tokens = tokenize(unit_name, text)?;
    parse(unit_name, tokens).map_err(|err| vec![err])
}

/// Parses a token sequence in to an `ExprSeq` node containing every top-level form
pub fn parse(unit_name: &str, tokens: impl IntoIterator<Item = Token>) -> Result<Node> {
    let mut stack = TokenStack::new();

    for token in tokens {
        stack.push(token)?;
    }

    let forms = stack.pop_all()?;
    let pos = forms
        .first()
        .map(|form| form.pos().clone())
        .unwrap_or_else(|| SourcePosition::new(unit_name.into(), 1, 1));

    Ok(Node::ExprSeq(pos, forms.into_boxed_slice()))
}

enum StackItem {
    Open(SourcePosition),
    Quote(SourcePosition),
    Node(Node),
}

/// Stack of completed nodes and unmatched opening parens or quotes
struct TokenStack {
    items: Vec<StackItem>,
}

impl TokenStack {
    fn new() -> TokenStack {
        TokenStack { items: vec![] }
    }

    fn push(&mut self, token: Token) -> Result<()> {
        let (kind, pos) = token.into_parts();

        let node = match kind {
            TokenKind::Bool(v) => Node::Bool(pos, v),
            TokenKind::Int(v) => Node::Int(pos, v),
            TokenKind::Float(v) => Node::Float(pos, v),
            TokenKind::Str(v) => Node::Str(pos, v),
            TokenKind::Id(v) => Node::Id(pos, v),
            TokenKind::Keyword(v) => Node::Keyword(pos, v),
            TokenKind::LParen => {
                self.items.push(StackItem::Open(pos));
                return Ok(());
            }
            TokenKind::SQuote => {
                self.items.push(StackItem::Quote(pos));
                return Ok(());
            }
            TokenKind::RParen => {
                let (open_pos, members) = self.pop_until_open(pos)?;
                Node::List(open_pos, members.into_boxed_slice())
            }
        };

        self.push_node(node);
        Ok(())
    }

    /// Pushes a completed node, consuming any quotes waiting for it
    fn push_node(&mut self, mut node: Node) {
        while let Some(StackItem::Quote(_)) = self.items.last() {
            if let Some(StackItem::Quote(quote_pos)) = self.items.pop() {
                node = Node::Quote(quote_pos, Box::new(node));
            }
        }

        self.items.push(StackItem::Node(node));
    }

    /// Pops every node back to the nearest open paren, returning them in source order
    fn pop_until_open(
        &mut self,
        close_pos: SourcePosition,
    ) -> Result<(SourcePosition, Vec<Node>)> {
        let mut members = vec![];

        loop {
            match self.items.pop() {
                Some(StackItem::Node(node)) => members.push(node),
                Some(StackItem::Open(open_pos)) => {
                    members.reverse();
                    return Ok((open_pos, members));
                }
                Some(StackItem::Quote(quote_pos)) => {
                    return Err(Error::new(quote_pos, ErrorKind::DanglingQuote));
                }
                None => {
                    return Err(Error::new(close_pos, ErrorKind::TooManyClosingParens));
                }
            }
        }
    }

    /// Takes the entire contents of the stack in source order
    ///
    /// This fails if there are unclosed expressions or unused quotes on the stack.
    fn pop_all(self) -> Result<Vec<Node>> {
        let mut forms = Vec::with_capacity(self.items.len());

        // Search from the top of the stack so the innermost unclosed paren is reported
        for item in self.items.into_iter().rev() {
            match item {
                StackItem::Node(node) => forms.push(node),
                StackItem::Open(open_pos) => {
                    return Err(Error::new(open_pos, ErrorKind::UnclosedExpression));
                }
                StackItem::Quote(quote_pos) => {
                    return Err(Error::new(quote_pos, ErrorKind::DanglingQuote));
                }
            }
        }

        forms.reverse();
        Ok(forms)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::span::t2p;

    fn forms_from_str(text: &str) -> Vec<Node> {
        match data_from_str("test", text).unwrap() {
            Node::ExprSeq(_, forms) => forms.into_vec(),
            other => panic!("expected expression sequence, got {:?}", other),
        }
    }

    fn err_from_str(text: &str) -> Error {
        let mut errs = data_from_str("test", text).unwrap_err();
        assert_eq!(1, errs.len());
        errs.remove(0)
    }

    #[test]
    fn empty_unit() {
        let node = data_from_str("test", "  ; nothing here").unwrap();
        assert_eq!(Node::ExprSeq(t2p(1, 1), Box::new([])), node);
    }

    #[test]
    fn top_level_literals() {
        let expected = vec![
            Node::Int(t2p(1, 1), 1),
            Node::Bool(t2p(1, 3), true),
            Node::Str(t2p(2, 1), "two".into()),
            Node::Id(t2p(2, 7), "three".into()),
        ];

        assert_eq!(expected, forms_from_str("1 #t\n\"two\" three"));
    }

    #[test]
    fn nested_lists() {
        let expected = vec![Node::List(
            t2p(1, 1),
            Box::new([
                Node::Id(t2p(1, 2), "+".into()),
                Node::Int(t2p(1, 4), 1),
                Node::List(
                    t2p(1, 6),
                    Box::new([Node::Id(t2p(1, 7), "f".into()), Node::Float(t2p(1, 9), 2.5)]),
                ),
            ]),
        )];

        assert_eq!(expected, forms_from_str("(+ 1 (f 2.5))"));
    }

    #[test]
    fn empty_list() {
        assert_eq!(
            vec![Node::List(t2p(1, 1), Box::new([]))],
            forms_from_str("()")
        );
    }

    #[test]
    fn quote_shorthand() {
        let expected = vec![
            Node::Quote(t2p(1, 1), Box::new(Node::Id(t2p(1, 2), "foo".into()))),
            Node::Quote(
                t2p(1, 6),
                Box::new(Node::Quote(
                    t2p(1, 7),
                    Box::new(Node::List(t2p(1, 8), Box::new([Node::Int(t2p(1, 9), 1)]))),
                )),
            ),
        ];

        assert_eq!(expected, forms_from_str("'foo ''(1)"));
    }

    #[test]
    fn too_many_closing_parens() {
        let err = err_from_str("(+ 1 2))");
        assert_eq!(Error::new(t2p(1, 8), ErrorKind::TooManyClosingParens), err);

        let err = err_from_str(")");
        assert_eq!(Error::new(t2p(1, 1), ErrorKind::TooManyClosingParens), err);
    }

    #[test]
    fn unclosed_expression() {
        let err = err_from_str("(+ 1 2");
        assert_eq!(Error::new(t2p(1, 1), ErrorKind::UnclosedExpression), err);

        // The innermost unclosed paren is reported
        let err = err_from_str("(begin\n  (f (g 1)\n  (h 2)");
        assert_eq!(Error::new(t2p(2, 3), ErrorKind::UnclosedExpression), err);
    }

    #[test]
    fn dangling_quote() {
        let err = err_from_str("(list 1 ')");
        assert_eq!(Error::new(t2p(1, 9), ErrorKind::DanglingQuote), err);

        let err = err_from_str("1 '");
        assert_eq!(Error::new(t2p(1, 3), ErrorKind::DanglingQuote), err);
    }

    #[test]
    fn tokenizer_errors_take_priority() {
        let errs = data_from_str("test", "(+ 1 @ ` 2").unwrap_err();

        let kinds: Vec<ErrorKind> = errs.into_iter().map(|err| err.kind().clone()).collect();
        assert_eq!(
            vec![ErrorKind::InvalidToken('@'), ErrorKind::InvalidToken('`')],
            kinds
        );
    }

    #[test]
    fn leaf_count_and_depth() {
        let text = "(begin (defun f (x) (+ x 2)) (f 8)) 'y 3";
        let tokens = tokenize("test", text).unwrap();
        let leaf_tokens = tokens.iter().filter(|t| t.is_leaf()).count();

        let node = data_from_str("test", text).unwrap();
        assert_eq!(leaf_tokens, node.leaf_count());
        assert_eq!(3, node.list_depth());
    }
}
