use annotype_common::{Diagnostic, Span};
use thiserror::Error;

use crate::lexer::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("invalid character '{0}'")]
    InvalidCharacter(char),
    #[error("incomplete ellipsis")]
    IncompleteEllipsis,
    #[error("expected {expected}")]
    UnexpectedToken { expected: &'static str },
    #[error("expected {expected}")]
    UnexpectedEnd { expected: &'static str },
    #[error("unexpected input after type annotation")]
    TrailingInput,
    #[error("brackets nested deeper than {0} levels")]
    NestingTooDeep(usize),
}

/// An annotation string that does not match the grammar.
///
/// Always reported to the caller; parsing never yields a partial tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}, found {found} at {span}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// The offending token as it reads in a message, e.g. `` `]` `` or `end of input`.
    pub found: String,
    pub span: Span,
    /// The `[` of an argument list that was still open when the error hit.
    pub open_bracket: Option<Span>,
    /// How to fix the input, when there is a known fix.
    pub help: Option<String>,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, token: &Token) -> Self {
        Self {
            kind,
            found: token.describe(),
            span: token.span.clone(),
            open_bracket: None,
            help: None,
        }
    }

    /// `expected` was wanted but `token` was found.
    pub fn expected(expected: &'static str, token: &Token) -> Self {
        let kind = if token.kind == TokenKind::Eof {
            ParseErrorKind::UnexpectedEnd { expected }
        } else {
            ParseErrorKind::UnexpectedToken { expected }
        };
        Self::new(kind, token)
    }

    pub fn with_open_bracket(mut self, span: Span) -> Self {
        self.open_bracket.get_or_insert(span);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Error for a `TokenKind::Error` token, i.e. input the lexer rejected.
    pub fn lexical(token: &Token) -> Self {
        let kind = match token.lexeme.chars().next() {
            Some('.') => ParseErrorKind::IncompleteEllipsis,
            Some(c) => ParseErrorKind::InvalidCharacter(c),
            None => ParseErrorKind::UnexpectedEnd {
                expected: "a type annotation",
            },
        };
        Self::new(kind, token)
    }

    /// Take the lexer's help for a lexical error reported at the same place.
    pub fn explained_by(self, lexer: &Diagnostic) -> Self {
        match lexer.suggestion {
            Some(ref help) if self.is_lexical() && lexer.span.as_ref() == Some(&self.span) => {
                self.with_help(help.clone())
            }
            _ => self,
        }
    }

    pub fn is_lexical(&self) -> bool {
        matches!(
            self.kind,
            ParseErrorKind::InvalidCharacter(_) | ParseErrorKind::IncompleteEllipsis
        )
    }

    pub fn offset(&self) -> u32 {
        self.span.start.offset
    }

    pub fn line(&self) -> u32 {
        self.span.start.line
    }

    pub fn column(&self) -> u32 {
        self.span.start.column
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self.kind, ParseErrorKind::UnexpectedEnd { .. })
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diagnostic = Diagnostic::error(format!("{}, found {}", self.kind, self.found))
            .with_span(self.span.clone());
        if let Some(ref open) = self.open_bracket {
            diagnostic = diagnostic.with_related(open.clone(), "argument list opened here");
        }
        match self.help {
            Some(ref help) => diagnostic.with_suggestion(help.clone()),
            None => diagnostic,
        }
    }
}

impl From<&ParseError> for Diagnostic {
    fn from(error: &ParseError) -> Self {
        error.to_diagnostic()
    }
}
