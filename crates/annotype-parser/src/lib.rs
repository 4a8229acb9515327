//! Parsing of type annotation strings such as `dict[str, list[int]]` or
//! `typing.Callable[[int, str], bool]` into the canonical [`TypeResult`] model.
//!
//! The pipeline is `source -> Lexer -> tokens -> Parser -> TypeExpr -> transform -> TypeResult`.
//! Printing back to text is the `Display` impl in `annotype_common::printer`.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod transform;

use annotype_common::TypeResult;

pub use error::{ParseError, ParseErrorKind};

use crate::ast::TypeExpr;
use crate::lexer::Lexer;
use crate::parser::Parser;

/// Span origin used when the caller has no context identifier.
pub const DEFAULT_ORIGIN: &str = "<annotation>";

/// Parse an annotation string into its canonical tree.
pub fn parse(source: &str) -> Result<TypeResult, ParseError> {
    parse_with_origin(source, DEFAULT_ORIGIN)
}

/// Parse an annotation string, tagging error spans with `origin`
/// (e.g. `pkg.mod.Class.method.param`).
pub fn parse_with_origin(source: &str, origin: &str) -> Result<TypeResult, ParseError> {
    let tree = parse_tree(source, origin)?;
    Ok(transform::to_type_result(&tree))
}

/// Parse an annotation string into its parse tree, without lowering it.
pub fn parse_tree(source: &str, origin: &str) -> Result<TypeExpr, ParseError> {
    // Rejected characters stay in the stream as error tokens; the parser
    // reports whichever problem comes first in source order. It cannot step
    // over an error token, so a lexical error is always the lexer's first.
    let (tokens, diagnostics) = Lexer::new(source, origin).tokenize();
    Parser::new(tokens).parse().map_err(|error| match diagnostics.first_error() {
        Some(lexer) => error.explained_by(lexer),
        None => error,
    })
}
