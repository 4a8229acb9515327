use annotype_common::{Diagnostic, DiagnosticBag, Position};

use super::cursor::Cursor;
use super::token::{Token, TokenKind};

/// Hand-written lexer for type annotation strings.
///
/// Whitespace between tokens is skipped. Unrecognized input is reported to
/// the diagnostic bag and emitted as a `TokenKind::Error` token so that
/// scanning can continue to the end.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    diagnostics: DiagnosticBag,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str, origin: impl Into<String>) -> Self {
        Self {
            cursor: Cursor::new(source, origin),
            diagnostics: DiagnosticBag::new(),
        }
    }

    /// Tokenize the entire input, returning all tokens (ending in `Eof`) and diagnostics.
    pub fn tokenize(mut self) -> (Vec<Token>, DiagnosticBag) {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        (tokens, self.diagnostics)
    }

    fn next_token(&mut self) -> Token {
        self.cursor.eat_while(char::is_whitespace);

        let start = self.cursor.position();
        let Some(ch) = self.cursor.advance() else {
            return Token::eof(self.cursor.span_from(start));
        };

        match ch {
            '[' => self.make_token(TokenKind::LeftBracket, start),
            ']' => self.make_token(TokenKind::RightBracket, start),
            ',' => self.make_token(TokenKind::Comma, start),
            '.' => self.scan_dots(start),
            c if is_name_start(c) => self.scan_name(start),
            _ => {
                let token = self.make_token(TokenKind::Error, start);
                self.diagnostics.report(
                    Diagnostic::error(format!("invalid character '{}' in type annotation", ch))
                        .with_span(token.span.clone())
                        .with_suggestion("names may not start with a digit or contain punctuation"),
                );
                token
            }
        }
    }

    /// `.` separates dotted names; `...` is the ellipsis literal. `..` is neither.
    fn scan_dots(&mut self, start: Position) -> Token {
        if self.cursor.peek() != Some('.') {
            return self.make_token(TokenKind::Dot, start);
        }
        self.cursor.advance();
        if self.cursor.eat('.') {
            return self.make_token(TokenKind::Ellipsis, start);
        }

        let token = self.make_token(TokenKind::Error, start);
        self.diagnostics.report(
            Diagnostic::error("incomplete ellipsis")
                .with_span(token.span.clone())
                .with_suggestion("write `...` for an ellipsis or `.` between names"),
        );
        token
    }

    fn scan_name(&mut self, start: Position) -> Token {
        self.cursor.eat_while(is_name_continue);
        let lexeme = self.cursor.slice_from(start.offset);
        let kind = TokenKind::keyword_from_str(lexeme).unwrap_or(TokenKind::Name);
        self.make_token(kind, start)
    }

    /// Create a token using the slice from `start` to current position.
    fn make_token(&self, kind: TokenKind, start: Position) -> Token {
        let lexeme = self.cursor.slice_from(start.offset);
        let span = self.cursor.span_from(start);
        Token::new(kind, lexeme, span)
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token> {
        let (tokens, diags) = Lexer::new(source, "<annotation>").tokenize();
        assert!(
            !diags.has_errors(),
            "unexpected errors: {:?}",
            diags.diagnostics()
        );
        tokens
    }

    fn lex_kinds(source: &str) -> Vec<TokenKind> {
        lex(source).into_iter().map(|t| t.kind).collect()
    }

    fn lex_with_errors(source: &str) -> (Vec<Token>, DiagnosticBag) {
        Lexer::new(source, "<annotation>").tokenize()
    }

    #[test]
    fn empty_source() {
        assert_eq!(lex_kinds(""), vec![TokenKind::Eof]);
        assert_eq!(lex_kinds("  \t\n"), vec![TokenKind::Eof]);
    }

    #[test]
    fn generic_annotation() {
        assert_eq!(
            lex_kinds("dict[str, list[int]]"),
            vec![
                TokenKind::Name, // dict
                TokenKind::LeftBracket,
                TokenKind::Name, // str
                TokenKind::Comma,
                TokenKind::Name, // list
                TokenKind::LeftBracket,
                TokenKind::Name, // int
                TokenKind::RightBracket,
                TokenKind::RightBracket,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn dotted_name_and_ellipsis() {
        assert_eq!(
            lex_kinds("a.b.C[...]"),
            vec![
                TokenKind::Name,
                TokenKind::Dot,
                TokenKind::Name,
                TokenKind::Dot,
                TokenKind::Name,
                TokenKind::LeftBracket,
                TokenKind::Ellipsis,
                TokenKind::RightBracket,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn none_is_a_keyword_but_prefixes_are_names() {
        let tokens = lex("None NoneType _None");
        assert_eq!(tokens[0].kind, TokenKind::NoneKw);
        assert_eq!(tokens[1].kind, TokenKind::Name);
        assert_eq!(tokens[1].lexeme, "NoneType");
        assert_eq!(tokens[2].kind, TokenKind::Name);
    }

    #[test]
    fn names_may_contain_digits_and_unicode() {
        let tokens = lex("_T1 Größe");
        assert_eq!(tokens[0].lexeme, "_T1");
        assert_eq!(tokens[1].lexeme, "Größe");
        assert_eq!(tokens[1].kind, TokenKind::Name);
    }

    #[test]
    fn span_tracking() {
        let tokens = lex("list[ int ]");
        assert_eq!(tokens[0].span.start.column, 1);
        assert_eq!(tokens[2].span.start.column, 7);
        assert_eq!(tokens[2].span.start.offset, 6);
        assert_eq!(tokens[2].span.end.offset, 9);
    }

    #[test]
    fn invalid_character_reports_and_continues() {
        let (tokens, diags) = lex_with_errors("list[$]");
        assert!(diags.has_errors());
        assert_eq!(tokens[2].kind, TokenKind::Error);
        assert_eq!(tokens[2].lexeme, "$");
        assert_eq!(tokens[3].kind, TokenKind::RightBracket);
        let first = diags.first_error().unwrap();
        assert_eq!(first.span.as_ref(), Some(&tokens[2].span));
        assert!(first.suggestion.is_some());
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    }

    #[test]
    fn two_dots_are_an_incomplete_ellipsis() {
        let (tokens, diags) = lex_with_errors("tuple[int, ..]");
        assert!(diags.has_errors());
        let error = tokens.iter().find(|t| t.kind == TokenKind::Error).unwrap();
        assert_eq!(error.lexeme, "..");
        assert!(diags.diagnostics()[0].suggestion.is_some());
    }

    #[test]
    fn leading_digit_is_not_a_name() {
        let (tokens, diags) = lex_with_errors("1abc");
        assert!(diags.has_errors());
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(tokens[1].kind, TokenKind::Name);
    }
}
