//! Comparison helpers (=, !=, >, >=, <, <=).

use crate::helpers::{HelperDef, SemanticType};

/// A plain binary comparison: `col SYMBOL $N`.
///
/// Timestamp and Uuid operands reach the String template through the
/// dispatch fallback chain; Raw operands splice unparameterized.
fn binary(name: &str, symbol: &str) -> HelperDef {
    let bound = format!("{} <value-param>", symbol);
    let inline = format!("{} <value-inline>", symbol);
    HelperDef::new(name)
        .syntax(SemanticType::Number, &bound)
        .syntax(SemanticType::String, &bound)
        .syntax(SemanticType::Raw, &inline)
}

/// `$eq` — equality. A Null operand renders `IS NULL`, a subquery
/// compares against its (parenthesized) result.
pub fn eq() -> HelperDef {
    binary("eq", "=")
        .syntax(SemanticType::Boolean, "= <value-param>")
        .syntax(SemanticType::Null, "IS NULL")
        .syntax(SemanticType::Subquery, "= <value-inline>")
}

/// `$ne` — inequality. A Null operand renders `IS NOT NULL`.
pub fn ne() -> HelperDef {
    binary("ne", "!=")
        .syntax(SemanticType::Boolean, "!= <value-param>")
        .syntax(SemanticType::Null, "IS NOT NULL")
}

/// `$gt` — greater than.
pub fn gt() -> HelperDef {
    binary("gt", ">")
}

/// `$gte` — greater than or equal.
pub fn gte() -> HelperDef {
    binary("gte", ">=")
}

/// `$lt` — less than.
pub fn lt() -> HelperDef {
    binary("lt", "<")
}

/// `$lte` — less than or equal.
pub fn lte() -> HelperDef {
    binary("lte", "<=")
}
