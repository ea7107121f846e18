//! Builders for WHERE tree nodes.

use crate::ast::{Value, WhereNode};

/// Create a comparison node (`column $helper operand`, operator mode).
pub fn cmp(column: &str, helper: &str, operand: impl Into<Value>) -> WhereNode {
    WhereNode::Comparison {
        column: column.to_string(),
        helper: helper.to_string(),
        operand: operand.into(),
    }
}

/// Create an equality comparison (column = value).
pub fn eq(column: &str, value: impl Into<Value>) -> WhereNode {
    cmp(column, "eq", value)
}

/// Create a LIKE comparison (column LIKE pattern).
pub fn like(column: &str, pattern: &str) -> WhereNode {
    cmp(column, "like", pattern)
}

/// Create an explicit-call node (`column` compared against `helper(operand)`).
pub fn call(column: &str, helper: &str, operand: impl Into<Value>) -> WhereNode {
    WhereNode::Call {
        column: column.to_string(),
        helper: helper.to_string(),
        operand: operand.into(),
    }
}

/// Join nodes with AND.
pub fn and(children: impl IntoIterator<Item = WhereNode>) -> WhereNode {
    WhereNode::And(children.into_iter().collect())
}

/// Join nodes with OR.
pub fn or(children: impl IntoIterator<Item = WhereNode>) -> WhereNode {
    WhereNode::Or(children.into_iter().collect())
}
