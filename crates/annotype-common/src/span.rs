/// Position within an annotation string (1-based line/column, 0-based byte offset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number, counted in characters.
    pub column: u32,
    /// 0-based byte offset from the start of the input.
    pub offset: u32,
}

impl Position {
    /// The position of the first character of any input.
    pub fn start() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }
}

/// A range inside one annotation string.
///
/// `origin` names where the string came from: a context identifier such as
/// `pkg.mod.Class.method.param`, a file name, or `<annotation>` for ad-hoc input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Span {
    pub origin: String,
    /// Start position (inclusive).
    pub start: Position,
    /// End position (exclusive).
    pub end: Position,
}

impl Span {
    pub fn new(origin: impl Into<String>, start: Position, end: Position) -> Self {
        Self {
            origin: origin.into(),
            start,
            end,
        }
    }

    /// An empty span at `at`, used for end-of-input.
    pub fn point(origin: impl Into<String>, at: Position) -> Self {
        Self::new(origin, at, at)
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Merge two spans into one that covers both (same origin assumed).
    pub fn merge(&self, other: &Span) -> Span {
        let start = if self.start.offset <= other.start.offset {
            self.start
        } else {
            other.start
        };
        let end = if self.end.offset >= other.end.offset {
            self.end
        } else {
            other.end
        };
        Span {
            origin: self.origin.clone(),
            start,
            end,
        }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.origin, self.start.line, self.start.column
        )
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
