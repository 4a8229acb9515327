//! Canonical type model.
//!
//! Both types are plain values: equality and hashing are structural, so two
//! trees parsed from different strings (or built by hand) that describe the
//! same type are interchangeable as map and set keys.

use serde::{Deserialize, Serialize};

/// A named type: the defining module's dotted path plus the bare class name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeClass {
    /// Dotted module path, absent for unqualified names.
    pub module_name: Option<String>,
    pub class_name: String,
}

impl TypeClass {
    pub fn new(module_name: Option<String>, class_name: impl Into<String>) -> Self {
        Self {
            module_name,
            class_name: class_name.into(),
        }
    }

    /// A class defined in `module_name`.
    pub fn qualified(module_name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self::new(Some(module_name.into()), class_name)
    }

    /// A class with no known module.
    pub fn unqualified(class_name: impl Into<String>) -> Self {
        Self::new(None, class_name)
    }

    /// `builtins.NoneType`, printed as `None`.
    pub fn none() -> Self {
        ReservedClass::NoneType.class()
    }

    /// `builtins.ellipsis`, printed as `...`.
    pub fn ellipsis() -> Self {
        ReservedClass::Ellipsis.class()
    }

    pub fn reserved(&self) -> Option<ReservedClass> {
        ReservedClass::of(self)
    }

    pub fn is_none(&self) -> bool {
        self.reserved() == Some(ReservedClass::NoneType)
    }

    pub fn is_ellipsis(&self) -> bool {
        self.reserved() == Some(ReservedClass::Ellipsis)
    }

    pub fn is_callable(&self) -> bool {
        self.reserved() == Some(ReservedClass::Callable)
    }
}

/// The closed set of class identities that print irregularly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservedClass {
    /// `builtins.NoneType`, written `None`.
    NoneType,
    /// `builtins.ellipsis`, written `...`.
    Ellipsis,
    /// `typing.Callable`, `collections.abc.Callable`, or a bare `Callable`.
    /// Arguments are `[params..., return]` and print with the parameter
    /// list re-bracketed.
    Callable,
}

impl ReservedClass {
    pub fn of(class: &TypeClass) -> Option<Self> {
        match (class.module_name.as_deref(), class.class_name.as_str()) {
            (Some("builtins"), "NoneType") => Some(Self::NoneType),
            (Some("builtins"), "ellipsis") => Some(Self::Ellipsis),
            (Some("typing") | Some("collections.abc") | None, "Callable") => Some(Self::Callable),
            _ => None,
        }
    }

    /// Canonical class for this identity. For `Callable` that is `typing.Callable`.
    pub fn class(self) -> TypeClass {
        match self {
            Self::NoneType => TypeClass::qualified("builtins", "NoneType"),
            Self::Ellipsis => TypeClass::qualified("builtins", "ellipsis"),
            Self::Callable => TypeClass::qualified("typing", "Callable"),
        }
    }
}

/// A node of the canonical type tree: a head class and its filled type
/// arguments, in order. Empty `arguments` means a plain, non-generic type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeResult {
    head: TypeClass,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    arguments: Vec<TypeResult>,
}

impl TypeResult {
    pub fn new(head: TypeClass, arguments: Vec<TypeResult>) -> Self {
        Self { head, arguments }
    }

    /// A node with no type arguments.
    pub fn plain(head: TypeClass) -> Self {
        Self::new(head, Vec::new())
    }

    pub fn none() -> Self {
        Self::plain(TypeClass::none())
    }

    pub fn ellipsis() -> Self {
        Self::plain(TypeClass::ellipsis())
    }

    pub fn head(&self) -> &TypeClass {
        &self.head
    }

    pub fn arguments(&self) -> &[TypeResult] {
        &self.arguments
    }

    pub fn is_generic(&self) -> bool {
        !self.arguments.is_empty()
    }

    /// Every class reachable from this node, pre-order: the node's own head
    /// first, then each argument's classes in argument order.
    pub fn classes(&self) -> Classes<'_> {
        Classes { stack: vec![self] }
    }
}

/// Pre-order iterator over the classes of a [`TypeResult`].
///
/// Uses an explicit worklist so deep trees don't recurse.
pub struct Classes<'a> {
    stack: Vec<&'a TypeResult>,
}

impl<'a> Iterator for Classes<'a> {
    type Item = &'a TypeClass;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.arguments.iter().rev());
        Some(&node.head)
    }
}
