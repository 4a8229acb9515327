//! Canonical text form of the type model.
//!
//! Printing is the inverse of parsing for canonically formatted input:
//! `print(parse(s)) == s` whenever `s` uses `, ` between arguments and no
//! other whitespace.

use std::fmt::{self, Display, Formatter};

use crate::model::{ReservedClass, TypeClass, TypeResult};

/// Render a tree in canonical notation.
pub fn print(result: &TypeResult) -> String {
    result.to_string()
}

impl Display for TypeClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.reserved() {
            Some(ReservedClass::NoneType) => f.write_str("None"),
            Some(ReservedClass::Ellipsis) => f.write_str("..."),
            _ => match &self.module_name {
                Some(module_name) => write!(f, "{}.{}", module_name, self.class_name),
                None => f.write_str(&self.class_name),
            },
        }
    }
}

impl Display for TypeResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.head())?;
        if !self.is_generic() {
            return Ok(());
        }

        f.write_str("[")?;
        if self.head().is_callable() {
            write_callable_arguments(f, self)?;
        } else {
            write_list(f, self.arguments())?;
        }
        f.write_str("]")
    }
}

/// Callable arguments are stored flat as `[params..., return]`; the
/// parameter list brackets are rebuilt from position alone.
fn write_callable_arguments(f: &mut Formatter<'_>, callable: &TypeResult) -> fmt::Result {
    match callable.arguments() {
        // Plain callables print as their bare name and never get here.
        [] => unreachable!(
            "callable `{}` reached the argument printer with no arguments",
            callable.head()
        ),
        [return_type] => write!(f, "[], {}", return_type),
        [params @ .., return_type] if is_any_parameters(params) => {
            write!(f, "{}, {}", params[0], return_type)
        }
        [params @ .., return_type] => {
            f.write_str("[")?;
            write_list(f, params)?;
            write!(f, "], {}", return_type)
        }
    }
}

/// `Callable[..., R]`: a lone ellipsis in parameter position. Only the
/// head is checked, so `Callable[...[int], str]` keeps its layout too.
fn is_any_parameters(params: &[TypeResult]) -> bool {
    matches!(params, [only] if only.head().is_ellipsis())
}

fn write_list(f: &mut Formatter<'_>, items: &[TypeResult]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}
