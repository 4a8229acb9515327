use crate::ast::*;
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::token::TokenKind;

use super::{Parser, MAX_NESTING_DEPTH};

impl Parser {
    /// `type_annotation := class | class "[" arg_list "]"`
    pub(super) fn parse_type_annotation(&mut self) -> Result<TypeExpr, ParseError> {
        let head = self.parse_class_name()?;

        if self.peek() != TokenKind::LeftBracket {
            let span = head.span.clone();
            return Ok(TypeExpr {
                kind: TypeExprKind::Class(head),
                span,
            });
        }

        let arguments = self.parse_argument_list()?;
        let span = head.span.merge(&arguments.span);
        Ok(TypeExpr {
            kind: TypeExprKind::Subscription { head, arguments },
            span,
        })
    }

    /// `class := NAME ("." NAME)* | "None" | "..."`
    fn parse_class_name(&mut self) -> Result<ClassName, ParseError> {
        match self.peek() {
            TokenKind::NoneKw => {
                let token = self.advance();
                Ok(ClassName {
                    kind: ClassNameKind::None,
                    span: token.span,
                })
            }
            TokenKind::Ellipsis => {
                let token = self.advance();
                Ok(ClassName {
                    kind: ClassNameKind::Ellipsis,
                    span: token.span,
                })
            }
            TokenKind::Name => {
                let first = self.advance();
                let start = first.span;
                let mut names = vec![first.lexeme];
                while self.eat(TokenKind::Dot) {
                    let name = self.expect(TokenKind::Name, "a name after `.`")?;
                    names.push(name.lexeme);
                }
                let span = start.merge(&self.previous_span());
                Ok(ClassName {
                    kind: ClassNameKind::Dotted(names),
                    span,
                })
            }
            _ => Err(self.error("a type name, `None` or `...`")),
        }
    }

    /// `"[" [ arg ("," arg)* ] "]"`
    ///
    /// Errors raised inside the brackets remember the innermost `[` that was
    /// still open, so an unbalanced input can point at it.
    fn parse_argument_list(&mut self) -> Result<ArgumentList, ParseError> {
        let open = self.expect(TokenKind::LeftBracket, "`[`")?;
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::new(
                ParseErrorKind::NestingTooDeep(MAX_NESTING_DEPTH),
                &open,
            ));
        }

        self.depth += 1;
        let items = self.parse_argument_items();
        self.depth -= 1;

        let items = items.map_err(|e| e.with_open_bracket(open.span.clone()))?;
        let close = self
            .expect(TokenKind::RightBracket, "`,` or `]`")
            .map_err(|e| e.with_open_bracket(open.span.clone()))?;

        Ok(ArgumentList {
            items,
            span: open.span.merge(&close.span),
        })
    }

    fn parse_argument_items(&mut self) -> Result<Vec<Argument>, ParseError> {
        let mut items = Vec::new();
        if self.peek() == TokenKind::RightBracket {
            return Ok(items);
        }
        loop {
            items.push(self.parse_argument()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(items)
    }

    /// `arg := type_annotation | "[" arg_list "]"`
    fn parse_argument(&mut self) -> Result<Argument, ParseError> {
        if self.peek() == TokenKind::LeftBracket {
            Ok(Argument::List(self.parse_argument_list()?))
        } else {
            Ok(Argument::Type(self.parse_type_annotation()?))
        }
    }
}
