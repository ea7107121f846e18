//! Null-check helpers (constant templates, no placeholders).

use crate::helpers::{HelperDef, SemanticType};

/// `$isnull` — `col IS NULL`. The conventional operand is `true`
/// (`{col: {$isnull: true}}`); the operand value is not bound.
pub fn is_null() -> HelperDef {
    HelperDef::new("isnull")
        .syntax(SemanticType::Boolean, "IS NULL")
        .syntax(SemanticType::Null, "IS NULL")
}

/// `$notnull` — `col IS NOT NULL`.
pub fn not_null() -> HelperDef {
    HelperDef::new("notnull")
        .syntax(SemanticType::Boolean, "IS NOT NULL")
        .syntax(SemanticType::Null, "IS NOT NULL")
}
