//! Membership and range helpers (IN, NOT IN, BETWEEN).

use crate::helpers::{HelperDef, SemanticType};

/// `$in` — membership. An Array operand expands element-wise to
/// `IN ($1, $2, ...)`; a subquery operand splices as `IN (SELECT ...)`
/// with its parameters bound on the shared binder.
pub fn is_in() -> HelperDef {
    HelperDef::new("in")
        .syntax(SemanticType::Array, "IN (<value-list>)")
        .syntax(SemanticType::Subquery, "IN <value-inline>")
}

/// `$nin` — negated membership.
pub fn not_in() -> HelperDef {
    HelperDef::new("nin")
        .syntax(SemanticType::Array, "NOT IN (<value-list>)")
        .syntax(SemanticType::Subquery, "NOT IN <value-inline>")
}

/// `$between` — range check. The operand is a two-element array.
pub fn between() -> HelperDef {
    HelperDef::new("between")
        .syntax(SemanticType::Array, "BETWEEN <value-param> AND <value-param>")
}
