use annotype_common::Span;
use std::fmt;

/// A single token of an annotation string.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }

    pub fn eof(span: Span) -> Self {
        Self {
            kind: TokenKind::Eof,
            lexeme: String::new(),
            span,
        }
    }

    /// How the token reads in an error message: `` `dict` ``, `` `[` ``, `end of input`.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("`{}`", self.lexeme),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.kind, self.lexeme)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Identifier: a letter or `_`, then letters, digits or `_`.
    Name,
    /// The `None` literal. Never a `Name`, so `a.None` does not parse.
    NoneKw,
    /// `...`
    Ellipsis,

    Dot,          // .
    Comma,        // ,
    LeftBracket,  // [
    RightBracket, // ]

    /// Characters the lexer could not make sense of; a diagnostic was reported.
    Error,
    Eof,
}

impl TokenKind {
    pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
        match s {
            "None" => Some(TokenKind::NoneKw),
            _ => None,
        }
    }
}
