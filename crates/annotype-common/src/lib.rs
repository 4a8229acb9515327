pub mod errors;
pub mod manifest;
pub mod model;
pub mod printer;
pub mod span;

pub use errors::{Diagnostic, DiagnosticBag};
pub use model::{Classes, ReservedClass, TypeClass, TypeResult};
pub use span::{Position, Span};
