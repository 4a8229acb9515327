mod annotations;

use annotype_common::{Position, Span};

use crate::ast::TypeExpr;
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::token::{Token, TokenKind};

/// Deepest bracket nesting accepted, keeping parsing and lowering stack-safe.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Recursive descent parser for type annotations.
///
/// One token of lookahead decides every production, so there is no
/// backtracking. Parsing stops at the first error; there is no recovery.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let span = tokens
                .last()
                .map(|t| Span::point(t.span.origin.clone(), t.span.end))
                .unwrap_or_else(|| Span::point(crate::DEFAULT_ORIGIN, Position::start()));
            tokens.push(Token::eof(span));
        }
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// Parse the whole token stream as exactly one type annotation.
    pub fn parse(mut self) -> Result<TypeExpr, ParseError> {
        let expr = self.parse_type_annotation()?;
        match self.peek() {
            TokenKind::Eof => Ok(expr),
            TokenKind::Error => Err(ParseError::lexical(self.current())),
            _ => Err(ParseError::new(ParseErrorKind::TrailingInput, self.current())
                .with_help("an annotation is a single type; wrap several in a subscription")),
        }
    }

    // ========================================================================
    // Token manipulation helpers
    // ========================================================================

    fn peek(&self) -> TokenKind {
        self.current().kind
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.pos.saturating_sub(1)]
    }

    /// Advance past the current token and return it.
    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    /// Consume a token of the expected kind, or fail describing what was wanted.
    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token, ParseError> {
        if self.peek() == kind {
            Ok(self.advance())
        } else {
            Err(self.error(expected))
        }
    }

    /// Consume if the current token matches, otherwise do nothing.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn is_at_end(&self) -> bool {
        self.peek() == TokenKind::Eof
    }

    fn previous_span(&self) -> Span {
        self.previous().span.clone()
    }

    /// Error at the current token. A lexer error token explains itself.
    fn error(&self, expected: &'static str) -> ParseError {
        let token = self.current();
        if token.kind == TokenKind::Error {
            ParseError::lexical(token)
        } else {
            ParseError::expected(expected, token)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::error::ParseErrorKind;
    use crate::{parse_tree, ParseError, DEFAULT_ORIGIN};

    use super::MAX_NESTING_DEPTH;

    fn tree(source: &str) -> TypeExpr {
        parse_tree(source, DEFAULT_ORIGIN)
            .unwrap_or_else(|e| panic!("failed to parse {:?}: {}", source, e))
    }

    fn error(source: &str) -> ParseError {
        match parse_tree(source, DEFAULT_ORIGIN) {
            Ok(expr) => panic!("expected {:?} to fail, got {:?}", source, expr),
            Err(e) => e,
        }
    }

    fn dotted(class: &ClassName) -> Vec<&str> {
        match &class.kind {
            ClassNameKind::Dotted(names) => names.iter().map(String::as_str).collect(),
            other => panic!("expected dotted name, got {:?}", other),
        }
    }

    #[test]
    fn bare_class() {
        let expr = tree("a.b.C");
        match &expr.kind {
            TypeExprKind::Class(class) => assert_eq!(dotted(class), vec!["a", "b", "C"]),
            other => panic!("expected class, got {:?}", other),
        }
        assert_eq!(expr.span.len(), 5);
    }

    #[test]
    fn special_forms() {
        assert!(matches!(
            tree("None").kind,
            TypeExprKind::Class(ClassName { kind: ClassNameKind::None, .. })
        ));
        assert!(matches!(
            tree("...").kind,
            TypeExprKind::Class(ClassName { kind: ClassNameKind::Ellipsis, .. })
        ));
    }

    #[test]
    fn subscription_keeps_bracketed_lists() {
        let expr = tree("Callable[[int, str], bool]");
        let TypeExprKind::Subscription { head, arguments } = expr.kind else {
            panic!("expected subscription");
        };
        assert_eq!(dotted(&head), vec!["Callable"]);
        assert_eq!(arguments.items.len(), 2);
        match &arguments.items[0] {
            Argument::List(list) => assert_eq!(list.items.len(), 2),
            other => panic!("expected parameter list, got {:?}", other),
        }
        assert!(matches!(arguments.items[1], Argument::Type(_)));
        assert_eq!(arguments.span.start.offset, 8);
    }

    #[test]
    fn empty_argument_lists() {
        let expr = tree("Callable[[], None]");
        let TypeExprKind::Subscription { arguments, .. } = expr.kind else {
            panic!("expected subscription");
        };
        assert!(matches!(&arguments.items[0], Argument::List(list) if list.items.is_empty()));

        let expr = tree("tuple[]");
        assert!(matches!(
            expr.kind,
            TypeExprKind::Subscription { ref arguments, .. } if arguments.items.is_empty()
        ));
    }

    #[test]
    fn whitespace_between_tokens() {
        let expr = tree(" a . b [ int ,\n str ] ");
        let TypeExprKind::Subscription { head, arguments } = expr.kind else {
            panic!("expected subscription");
        };
        assert_eq!(dotted(&head), vec!["a", "b"]);
        assert_eq!(arguments.items.len(), 2);
        assert_eq!(arguments.items[1].span().start.line, 2);
    }

    #[test]
    fn unbalanced_bracket_points_at_end_and_opener() {
        let err = error("dict[str");
        assert!(err.is_truncated());
        assert_eq!(err.found, "end of input");
        assert_eq!(err.offset(), 8);
        assert_eq!(err.open_bracket.as_ref().map(|s| s.start.offset), Some(4));
    }

    #[test]
    fn innermost_open_bracket_is_reported() {
        let err = error("dict[str, list[int");
        assert_eq!(err.open_bracket.as_ref().map(|s| s.start.offset), Some(14));
    }

    #[test]
    fn top_level_list_is_rejected() {
        let err = error("[int]");
        assert_eq!(
            err.kind,
            ParseErrorKind::UnexpectedToken {
                expected: "a type name, `None` or `...`"
            }
        );
        assert_eq!(err.found, "`[`");
    }

    #[test]
    fn trailing_input_is_rejected() {
        assert_eq!(error("int str").kind, ParseErrorKind::TrailingInput);
        assert_eq!(error("list[int]]").kind, ParseErrorKind::TrailingInput);
        assert_eq!(error("list[int][str]").kind, ParseErrorKind::TrailingInput);
    }

    #[test]
    fn separators_must_sit_between_arguments() {
        assert!(matches!(
            error("dict[, int]").kind,
            ParseErrorKind::UnexpectedToken { .. }
        ));
        assert!(matches!(
            error("dict[int,]").kind,
            ParseErrorKind::UnexpectedToken { .. }
        ));
        assert!(matches!(
            error("dict[int str]").kind,
            ParseErrorKind::UnexpectedToken { .. }
        ));
    }

    #[test]
    fn dotted_names_need_a_name_after_each_dot() {
        assert!(error("a.").is_truncated());
        assert!(matches!(
            error("a.None").kind,
            ParseErrorKind::UnexpectedToken { .. }
        ));
        assert!(matches!(
            error("a..b").kind,
            ParseErrorKind::IncompleteEllipsis
        ));
    }

    #[test]
    fn lexical_errors_surface_in_source_order() {
        let err = error("list[int, $]");
        assert_eq!(err.kind, ParseErrorKind::InvalidCharacter('$'));
        assert_eq!(err.column(), 11);

        let err = error("list[] $");
        assert_eq!(err.kind, ParseErrorKind::InvalidCharacter('$'));
        // A syntax error before the bad character wins.
        let err = error("list[,] $");
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }));
        assert!(err.help.is_none());
    }

    #[test]
    fn lexical_errors_carry_the_lexer_help() {
        let err = error("list[$]");
        assert!(err.is_lexical());
        let diagnostic = err.to_diagnostic();
        assert_eq!(
            diagnostic.suggestion.as_deref(),
            Some("names may not start with a digit or contain punctuation")
        );

        let err = error("tuple[int, ..]");
        assert_eq!(err.kind, ParseErrorKind::IncompleteEllipsis);
        assert_eq!(
            err.help.as_deref(),
            Some("write `...` for an ellipsis or `.` between names")
        );

        let err = error("int str");
        assert!(!err.is_lexical());
        assert!(err.help.is_some());
    }

    #[test]
    fn empty_input_is_truncated() {
        let err = error("   ");
        assert!(err.is_truncated());
        assert_eq!(err.line(), 1);
        assert_eq!(err.column(), 4);
    }

    #[test]
    fn nesting_limit() {
        let depth = MAX_NESTING_DEPTH;
        let ok = format!("{}int{}", "list[".repeat(depth), "]".repeat(depth));
        assert!(parse_tree(&ok, DEFAULT_ORIGIN).is_ok());

        let too_deep = format!("{}int{}", "list[".repeat(depth + 1), "]".repeat(depth + 1));
        assert_eq!(
            error(&too_deep).kind,
            ParseErrorKind::NestingTooDeep(MAX_NESTING_DEPTH)
        );
    }
}
