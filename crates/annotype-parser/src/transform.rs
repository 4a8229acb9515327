//! Lowering of the parse tree into the canonical model.

use annotype_common::{TypeClass, TypeResult};

use crate::ast::{Argument, ArgumentList, ClassName, ClassNameKind, TypeExpr, TypeExprKind};

/// Lower a parsed annotation to its canonical tree. Arguments are lowered
/// before the node that owns them.
pub fn to_type_result(expr: &TypeExpr) -> TypeResult {
    match &expr.kind {
        TypeExprKind::Class(class) => TypeResult::plain(to_type_class(class)),
        TypeExprKind::Subscription { head, arguments } => {
            let mut lowered = Vec::with_capacity(arguments.items.len());
            splice_arguments(arguments, &mut lowered);
            TypeResult::new(to_type_class(head), lowered)
        }
    }
}

/// The last name is the class; any names before it form the dotted module path.
pub fn to_type_class(class: &ClassName) -> TypeClass {
    match &class.kind {
        ClassNameKind::None => TypeClass::none(),
        ClassNameKind::Ellipsis => TypeClass::ellipsis(),
        ClassNameKind::Dotted(names) => match names.split_last() {
            Some((class_name, [])) => TypeClass::unqualified(class_name.as_str()),
            Some((class_name, module)) => TypeClass::qualified(module.join("."), class_name.as_str()),
            None => unreachable!("the parser never builds an empty dotted name"),
        },
    }
}

/// Flatten an argument list into `out`.
///
/// A bracketed list in argument position does not become a node of its own:
/// its elements are spliced, in order, into the enclosing subscription's
/// arguments. This is how `Callable[[int, str], bool]` ends up with the
/// arguments `[int, str, bool]`; the printer rebuilds the brackets from
/// position.
fn splice_arguments(list: &ArgumentList, out: &mut Vec<TypeResult>) {
    for item in &list.items {
        match item {
            Argument::Type(expr) => out.push(to_type_result(expr)),
            Argument::List(nested) => splice_arguments(nested, out),
        }
    }
}
