//! Declarative SQL query builder with pluggable helper operators.
//!
//! Queries are nested JSON descriptions; helpers (`$eq`, `$ilike`,
//! `$in`, ...) are registered per operand type and render through a
//! small syntax-template grammar into parameterized SQL (`$1, $2, ...`)
//! plus a value map.

pub mod ast;
pub mod binder;
pub mod builder;
pub mod compiler;
pub mod dialect;
pub mod error;
pub mod helpers;
pub mod parser;
pub mod syntax;

pub use builder::Quarry;
pub use compiler::CompiledQuery;
pub use dialect::Dialect;
pub use error::{QuarryError, QuarryResult};

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::builder::Quarry;
    pub use crate::compiler::CompiledQuery;
    pub use crate::dialect::Dialect;
    pub use crate::error::*;
    pub use crate::helpers::{HelperDef, HelperRegistry, InvocationMode, SemanticType};
}
