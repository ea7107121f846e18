//! Pattern-match helpers (LIKE family).

use crate::helpers::{HelperDef, SemanticType};

/// `$like` — pattern match.
pub fn like() -> HelperDef {
    HelperDef::new("like").syntax(SemanticType::String, "LIKE <value-param>")
}

/// `$nlike` — negated pattern match.
pub fn nlike() -> HelperDef {
    HelperDef::new("nlike").syntax(SemanticType::String, "NOT LIKE <value-param>")
}

/// `$ilike` — case-insensitive pattern match (Postgres).
///
/// Operator position renders the portable `LIKE`; the explicit call
/// form is the escape hatch that emits the dialect-native `ILIKE`
/// keyword. Same operand, same binding, different surface syntax.
pub fn ilike() -> HelperDef {
    HelperDef::new("ilike")
        .operator_syntax(SemanticType::String, "LIKE <value-param>")
        .callable_syntax(SemanticType::String, "ILIKE <value-param>")
}
