use serde::{Deserialize, Serialize};

use crate::ast::Value;

/// A parsed SELECT query description.
///
/// Produced by [`crate::parser::parse_query`] from the declarative JSON
/// form; never mutated, only traversed by the compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Select {
    /// Projected columns. Empty means `*`.
    pub columns: Vec<String>,
    /// Source table.
    pub from: String,
    /// Root of the WHERE tree, if any.
    pub filter: Option<WhereNode>,
    /// ORDER BY entries, in declaration order.
    pub order_by: Vec<OrderBy>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Select {
    /// Start a bare `SELECT * FROM table` description.
    pub fn from_table(table: impl Into<String>) -> Self {
        Self {
            columns: Vec::new(),
            from: table.into(),
            filter: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }
}

/// One node of the WHERE tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WhereNode {
    /// `{column: {$helper: operand}}` — helper resolved in operator mode.
    Comparison {
        column: String,
        helper: String,
        operand: Value,
    },
    /// `{column: sql.helper(operand)}` — helper resolved in callable mode.
    Call {
        column: String,
        helper: String,
        operand: Value,
    },
    /// Children joined with AND.
    And(Vec<WhereNode>),
    /// Children joined with OR.
    Or(Vec<WhereNode>),
}

/// Sort direction for an ORDER BY entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// One ORDER BY entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: String,
    pub order: SortOrder,
}
