use std::sync::Arc;

use crate::span::SourcePosition;

pub type DataStr = Arc<str>;

/// Syntax tree produced by the parser
#[derive(PartialEq, Debug, Clone)]
pub enum Node {
    Bool(SourcePosition, bool),
    Int(SourcePosition, i64),
    Float(SourcePosition, f64),
    Str(SourcePosition, DataStr),
    Id(SourcePosition, DataStr),
    Keyword(SourcePosition, DataStr),
    Quote(SourcePosition, Box<Node>),
    List(SourcePosition, Box<[Node]>),
    ExprSeq(SourcePosition, Box<[Node]>),
}

impl Node {
    pub fn pos(&self) -> &SourcePosition {
        match self {
            Node::Bool(pos, _)
            | Node::Int(pos, _)
            | Node::Float(pos, _)
            | Node::Str(pos, _)
            | Node::Id(pos, _)
            | Node::Keyword(pos, _)
            | Node::Quote(pos, _)
            | Node::List(pos, _)
            | Node::ExprSeq(pos, _) => pos,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Node::Bool(_, true) => "boolean true",
            Node::Bool(_, false) => "boolean false",
            Node::Int(_, _) => "integer",
            Node::Float(_, _) => "floating point number",
            Node::Str(_, _) => "string",
            Node::Id(_, _) => "identifier",
            Node::Keyword(_, _) => "keyword",
            Node::Quote(_, _) => "quoted datum",
            Node::List(_, vs) if vs.is_empty() => "empty list",
            Node::List(_, _) => "list",
            Node::ExprSeq(_, _) => "expression sequence",
        }
    }

    /// Returns the number of literal and identifier leaves in this tree
    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Quote(_, inner) => inner.leaf_count(),
            Node::List(_, members) | Node::ExprSeq(_, members) => {
                members.iter().map(Node::leaf_count).sum()
            }
            _ => 1,
        }
    }

    /// Returns the maximum parenthesis nesting depth of this tree
    pub fn list_depth(&self) -> usize {
        match self {
            Node::Quote(_, inner) => inner.list_depth(),
            Node::List(_, members) => {
                1 + members.iter().map(Node::list_depth).max().unwrap_or(0)
            }
            Node::ExprSeq(_, members) => members.iter().map(Node::list_depth).max().unwrap_or(0),
            _ => 0,
        }
    }
}
