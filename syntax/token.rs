use crate::node::DataStr;
use crate::span::SourcePosition;

#[derive(PartialEq, Debug, Clone)]
pub enum TokenKind {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(DataStr),
    Id(DataStr),
    Keyword(DataStr),
    LParen,
    RParen,
    SQuote,
}

#[derive(PartialEq, Debug, Clone)]
pub struct Token {
    kind: TokenKind,
    pos: SourcePosition,
}

impl Token {
    pub fn new(kind: TokenKind, pos: SourcePosition) -> Token {
        Token { kind, pos }
    }

    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    pub fn pos(&self) -> &SourcePosition {
        &self.pos
    }

    pub fn into_parts(self) -> (TokenKind, SourcePosition) {
        (self.kind, self.pos)
    }

    /// Returns true if this token becomes a leaf of the syntax tree
    pub fn is_leaf(&self) -> bool {
        match self.kind {
            TokenKind::LParen | TokenKind::RParen | TokenKind::SQuote => false,
            _ => true,
        }
    }
}
