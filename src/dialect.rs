//! SQL dialects.
//!
//! A dialect controls identifier quoting and which helpers the standard
//! catalog registers (e.g. `ilike` exists only on Postgres). Parameter
//! placeholders are always `$1, $2, ...` regardless of dialect: the
//! `values` map keyed by `"$N"` is the wire contract with downstream
//! drivers.

/// SQL reserved words that must be quoted when used as identifiers.
const RESERVED_WORDS: &[&str] = &[
    "order", "group", "user", "table", "select", "from", "where", "join",
    "left", "right", "inner", "outer", "on", "and", "or", "not", "null",
    "true", "false", "limit", "offset", "as", "in", "is", "like", "between",
    "having", "union", "all", "distinct", "case", "when", "then", "else", "end",
];

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Postgres,
    MySql,
    Sqlite,
}

impl Default for Dialect {
    fn default() -> Self {
        Self::Postgres
    }
}

impl Dialect {
    /// Quote an identifier if it's a reserved word or contains special chars.
    pub fn quote_identifier(&self, name: &str) -> String {
        let lower = name.to_lowercase();
        let needs_quoting = RESERVED_WORDS.contains(&lower.as_str())
            || name.chars().any(|c| !c.is_alphanumeric() && c != '_')
            || name.chars().next().map(|c| c.is_numeric()).unwrap_or(false);

        if !needs_quoting {
            return name.to_string();
        }
        match self {
            Dialect::Postgres | Dialect::Sqlite => {
                format!("\"{}\"", name.replace('"', "\"\""))
            }
            Dialect::MySql => format!("`{}`", name.replace('`', "``")),
        }
    }
}
