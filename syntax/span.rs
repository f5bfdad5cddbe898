use std::fmt;

use crate::node::DataStr;

/// Location of a character within a named source unit
///
/// Lines and columns both start at 1. Columns count characters rather than bytes.
#[derive(PartialEq, Eq, Hash, Clone)]
pub struct SourcePosition {
    unit_name: DataStr,
    line: u32,
    column: u32,
}

impl SourcePosition {
    pub fn new(unit_name: DataStr, line: u32, column: u32) -> SourcePosition {
        SourcePosition {
            unit_name,
            line,
            column,
        }
    }

    /// Pseudo-position used for bindings that don't originate from source
    pub fn builtin() -> SourcePosition {
        SourcePosition {
            unit_name: BUILTIN_UNIT_NAME.into(),
            line: 0,
            column: 0,
        }
    }

    pub fn unit_name(&self) -> &DataStr {
        &self.unit_name
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    pub fn is_builtin(&self) -> bool {
        self.line == 0
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.unit_name, self.line, self.column)
    }
}

impl fmt::Debug for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos[{}]", self)
    }
}

pub const BUILTIN_UNIT_NAME: &str = "<builtins>";

/// Converts character offsets in to positions
///
/// Newlines must be recorded in the order they occur and positions can only be requested for
/// offsets on the most recently recorded line.
pub struct LineTracker {
    unit_name: DataStr,
    line: u32,
    line_start: usize,
}

impl LineTracker {
    pub fn new(unit_name: DataStr) -> LineTracker {
        LineTracker {
            unit_name,
            line: 1,
            line_start: 0,
        }
    }

    /// Records a newline character at the given offset
    pub fn record_newline(&mut self, offset: usize) {
        assert!(
            offset >= self.line_start,
            "newline at offset {} recorded before line start {}",
            offset,
            self.line_start
        );

        self.line += 1;
        self.line_start = offset + 1;
    }

    pub fn position_for(&self, offset: usize) -> SourcePosition {
        assert!(
            offset >= self.line_start,
            "position requested for offset {} before line start {}",
            offset,
            self.line_start
        );

        SourcePosition {
            unit_name: self.unit_name.clone(),
            line: self.line,
            column: (offset - self.line_start + 1) as u32,
        }
    }

    pub fn unit_name(&self) -> &DataStr {
        &self.unit_name
    }
}

// This isn't #[cfg(test)] because it's used in other crates
pub fn t2p(line: u32, column: u32) -> SourcePosition {
    SourcePosition::new("test".into(), line, column)
}
