use annotype_common::Span;

/// `type_annotation := class | subscription`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExprKind {
    /// A bare class: `int`, `a.b.C`, `None`, `...`
    Class(ClassName),

    /// `class "[" arg_list "]"`: `dict[str, int]`, `Callable[[int], str]`
    Subscription {
        head: ClassName,
        arguments: ArgumentList,
    },
}

/// `class := NAME ("." NAME)* | "None" | "..."`
#[derive(Debug, Clone, PartialEq)]
pub struct ClassName {
    pub kind: ClassNameKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassNameKind {
    /// Dotted name segments in source order; never empty.
    Dotted(Vec<String>),
    None,
    Ellipsis,
}

/// `"[" arg_list "]"`, with the span covering both brackets.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentList {
    pub items: Vec<Argument>,
    pub span: Span,
}

/// `arg := type_annotation | "[" arg_list "]"`
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Type(TypeExpr),
    /// A bare bracketed list, as in a callable's parameter list.
    List(ArgumentList),
}

impl Argument {
    pub fn span(&self) -> &Span {
        match self {
            Argument::Type(expr) => &expr.span,
            Argument::List(list) => &list.span,
        }
    }
}
