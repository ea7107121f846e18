//! The `Quarry` facade.
//!
//! Owns a helper registry and a dialect, and compiles declarative JSON
//! query descriptions:
//!
//! ```
//! use quarry::Quarry;
//! use serde_json::json;
//!
//! let sql = Quarry::postgres();
//! let out = sql
//!     .build(&json!({
//!         "$select": {
//!             "$from": "people",
//!             "$where": {"first_name": {"$ilike": "J___n%"}}
//!         }
//!     }))
//!     .unwrap();
//! assert_eq!(out.sql, "SELECT * FROM people WHERE first_name LIKE $1");
//! ```

use serde_json::json;

use crate::ast::Select;
use crate::compiler::{CompiledQuery, Compiler};
use crate::dialect::Dialect;
use crate::error::QuarryResult;
use crate::helpers::{HelperDef, HelperRegistry};
use crate::parser::parse_query;

/// A query builder: helper registry plus dialect.
///
/// Construct once at startup, register any plugin helpers, then share
/// freely; `build` takes `&self` and every compile call owns its own
/// parameter state.
#[derive(Debug, Clone)]
pub struct Quarry {
    registry: HelperRegistry,
    dialect: Dialect,
}

impl Quarry {
    /// A builder with the standard helper catalog for `dialect`.
    pub fn new(dialect: Dialect) -> Self {
        Self {
            registry: HelperRegistry::standard(dialect),
            dialect,
        }
    }

    pub fn postgres() -> Self {
        Self::new(Dialect::Postgres)
    }

    pub fn mysql() -> Self {
        Self::new(Dialect::MySql)
    }

    pub fn sqlite() -> Self {
        Self::new(Dialect::Sqlite)
    }

    /// A builder with no helpers at all (plugin-only setups).
    pub fn bare(dialect: Dialect) -> Self {
        Self {
            registry: HelperRegistry::new(),
            dialect,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn registry(&self) -> &HelperRegistry {
        &self.registry
    }

    /// Register a helper (the plugin entry point). Registration must
    /// finish before compile calls run concurrently; `&mut self`
    /// enforces that here.
    pub fn register(&mut self, def: HelperDef) -> QuarryResult<()> {
        self.registry.register(def)
    }

    /// Compile a declarative JSON query description.
    pub fn build(&self, query: &serde_json::Value) -> QuarryResult<CompiledQuery> {
        let select = parse_query(query)?;
        self.build_select(&select)
    }

    /// Compile an already-parsed query tree.
    pub fn build_select(&self, query: &Select) -> QuarryResult<CompiledQuery> {
        Compiler::new(&self.registry, self.dialect).compile(query)
    }

    /// The explicit-call form of a helper, as a query-description
    /// fragment: `sql.call("ilike", "J%")` stands in for the original
    /// `sql.ilike('J%')` surface and compiles in callable mode.
    pub fn call(&self, helper: &str, arg: impl Into<serde_json::Value>) -> serde_json::Value {
        json!({"$call": helper, "$arg": arg.into()})
    }

    /// `sql.ilike(pattern)` — case-insensitive match, dialect-native
    /// keyword (callable mode).
    pub fn ilike(&self, pattern: &str) -> serde_json::Value {
        self.call("ilike", pattern)
    }

    /// A raw SQL fragment operand (never parameterized).
    pub fn raw(&self, fragment: &str) -> serde_json::Value {
        json!({"$raw": fragment})
    }
}

impl Default for Quarry {
    fn default() -> Self {
        Self::postgres()
    }
}
