//! Query compiler.
//!
//! Walks a [`Select`] tree, resolves every comparison or call against
//! the helper registry, renders fragments through the matching syntax
//! templates and assembles the final statement plus its value map.
//!
//! Compilation is a pure function of (registry, query tree): the
//! binder is created per call and never shared, so concurrent compiles
//! against one registry are safe.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::ast::{Select, Value, WhereNode};
use crate::binder::ParamBinder;
use crate::dialect::Dialect;
use crate::error::QuarryResult;
use crate::helpers::{HelperRegistry, InvocationMode};
use crate::syntax::RenderInput;

/// The output of one compile call: the statement and its parameters.
///
/// Every `$N` placeholder in `sql` has exactly one entry in `values`
/// and vice versa. This shape is the wire contract with downstream
/// database drivers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    pub sql: String,
    pub values: HashMap<String, Value>,
}

impl CompiledQuery {
    /// Bound values in ordinal order, for drivers that take a sequence.
    pub fn ordered_values(&self) -> Vec<&Value> {
        (1..=self.values.len())
            .filter_map(|n| self.values.get(&format!("${}", n)))
            .collect()
    }
}

/// Compiles one query against a registry snapshot.
pub struct Compiler<'a> {
    registry: &'a HelperRegistry,
    dialect: Dialect,
    binder: ParamBinder,
}

impl<'a> Compiler<'a> {
    pub fn new(registry: &'a HelperRegistry, dialect: Dialect) -> Self {
        Self {
            registry,
            dialect,
            binder: ParamBinder::new(),
        }
    }

    /// Compile the query, consuming the compiler (and its binder).
    pub fn compile(mut self, query: &Select) -> QuarryResult<CompiledQuery> {
        let sql = self.render_select(query)?;
        let values = self.binder.finalize();
        debug!(sql = %sql, params = values.len(), "compiled query");
        Ok(CompiledQuery { sql, values })
    }

    fn render_select(&mut self, query: &Select) -> QuarryResult<String> {
        let mut sql = String::from("SELECT ");

        if query.columns.is_empty() {
            sql.push('*');
        } else {
            let cols: Vec<String> = query
                .columns
                .iter()
                .map(|c| self.dialect.quote_identifier(c))
                .collect();
            sql.push_str(&cols.join(", "));
        }

        sql.push_str(" FROM ");
        sql.push_str(&self.dialect.quote_identifier(&query.from));

        if let Some(node) = &query.filter {
            sql.push_str(" WHERE ");
            sql.push_str(&self.render_where(node, true)?);
        }

        if !query.order_by.is_empty() {
            let entries: Vec<String> = query
                .order_by
                .iter()
                .map(|o| {
                    format!(
                        "{} {}",
                        self.dialect.quote_identifier(&o.column),
                        o.order.keyword()
                    )
                })
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&entries.join(", "));
        }

        if let Some(n) = query.limit {
            sql.push_str(&format!(" LIMIT {}", n));
        }
        if let Some(n) = query.offset {
            sql.push_str(&format!(" OFFSET {}", n));
        }

        Ok(sql)
    }

    /// Render one WHERE node. OR groups are parenthesized unless they
    /// are the root of the clause; AND binds tighter and never needs
    /// parens around its children beyond what they add themselves.
    fn render_where(&mut self, node: &WhereNode, root: bool) -> QuarryResult<String> {
        match node {
            WhereNode::Comparison {
                column,
                helper,
                operand,
            } => self.render_helper(column, helper, operand, InvocationMode::Operator),
            WhereNode::Call {
                column,
                helper,
                operand,
            } => self.render_helper(column, helper, operand, InvocationMode::Callable),
            WhereNode::And(children) => {
                let parts = self.render_children(children)?;
                Ok(parts.join(" AND "))
            }
            WhereNode::Or(children) => {
                let parts = self.render_children(children)?;
                let joined = parts.join(" OR ");
                if root || children.len() <= 1 {
                    Ok(joined)
                } else {
                    Ok(format!("({})", joined))
                }
            }
        }
    }

    fn render_children(&mut self, children: &[WhereNode]) -> QuarryResult<Vec<String>> {
        children
            .iter()
            .map(|child| self.render_where(child, false))
            .collect()
    }

    fn render_helper(
        &mut self,
        column: &str,
        helper_name: &str,
        operand: &Value,
        mode: InvocationMode,
    ) -> QuarryResult<String> {
        let helper = self.registry.resolve(helper_name, mode)?;
        let template = helper.provides(mode, operand)?;

        // Structural operands pre-render to an inline fragment; a
        // subquery compiles on the shared binder so its ordinals
        // continue the outer numbering.
        let inline: Option<String> = match operand {
            Value::Subquery(sub) => Some(format!("({})", self.render_select(sub)?)),
            Value::Raw(text) => Some(text.clone()),
            _ => None,
        };

        let fragment = template.render(
            &RenderInput {
                helper: helper.name(),
                operand,
                inline: inline.as_deref(),
            },
            &mut self.binder,
        )?;
        Ok(format!(
            "{} {}",
            self.dialect.quote_identifier(column),
            fragment
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::{and, call, cmp, eq, or};
    use crate::ast::Select;

    fn compile(filter: WhereNode) -> CompiledQuery {
        let registry = HelperRegistry::standard(Dialect::Postgres);
        let mut query = Select::from_table("people");
        query.filter = Some(filter);
        Compiler::new(&registry, Dialect::Postgres)
            .compile(&query)
            .unwrap()
    }

    #[test]
    fn test_operator_mode_comparison() {
        let out = compile(cmp("first_name", "ilike", "J___n%"));
        assert_eq!(out.sql, "SELECT * FROM people WHERE first_name LIKE $1");
        assert_eq!(out.values["$1"], Value::String("J___n%".to_string()));
    }

    #[test]
    fn test_callable_mode_comparison() {
        let out = compile(call("first_name", "ilike", "J___n%"));
        assert_eq!(out.sql, "SELECT * FROM people WHERE first_name ILIKE $1");
        assert_eq!(out.values["$1"], Value::String("J___n%".to_string()));
    }

    #[test]
    fn test_root_or_has_no_parens() {
        let out = compile(or([eq("role", "admin"), eq("role", "mod")]));
        assert_eq!(
            out.sql,
            "SELECT * FROM people WHERE role = $1 OR role = $2"
        );
    }

    #[test]
    fn test_nested_or_is_parenthesized() {
        let out = compile(and([
            eq("active", true),
            or([eq("role", "admin"), eq("role", "mod")]),
        ]));
        assert_eq!(
            out.sql,
            "SELECT * FROM people WHERE active = $1 AND (role = $2 OR role = $3)"
        );
    }

    #[test]
    fn test_ordinals_are_contiguous_depth_first() {
        let out = compile(and([
            eq("a", 1),
            or([eq("b", 2), and([eq("c", 3), eq("d", 4)])]),
            eq("e", 5),
        ]));
        assert_eq!(out.values.len(), 5);
        for (i, value) in out.ordered_values().into_iter().enumerate() {
            assert_eq!(*value, Value::Int(i as i64 + 1));
        }
    }

    #[test]
    fn test_null_operand_renders_is_null() {
        let out = compile(eq("deleted_at", Value::Null));
        assert_eq!(out.sql, "SELECT * FROM people WHERE deleted_at IS NULL");
        assert!(out.values.is_empty());
    }

    #[test]
    fn test_in_list_expansion() {
        let out = compile(cmp("role", "in", vec!["admin", "mod"]));
        assert_eq!(
            out.sql,
            "SELECT * FROM people WHERE role IN ($1, $2)"
        );
        assert_eq!(out.values.len(), 2);
    }

    #[test]
    fn test_between_pair() {
        let out = compile(cmp("age", "between", vec![18, 65]));
        assert_eq!(
            out.sql,
            "SELECT * FROM people WHERE age BETWEEN $1 AND $2"
        );
        assert_eq!(out.values["$1"], Value::Int(18));
        assert_eq!(out.values["$2"], Value::Int(65));
    }

    #[test]
    fn test_subquery_shares_binder() {
        let mut sub = Select::from_table("vips");
        sub.columns = vec!["id".to_string()];
        sub.filter = Some(eq("tier", "gold"));

        let out = compile(and([
            eq("active", true),
            cmp("customer_id", "in", Value::Subquery(Box::new(sub))),
        ]));
        assert_eq!(
            out.sql,
            "SELECT * FROM people WHERE active = $1 AND customer_id IN \
             (SELECT id FROM vips WHERE tier = $2)"
        );
        assert_eq!(out.values["$2"], Value::String("gold".to_string()));
    }

    #[test]
    fn test_raw_operand_is_not_bound() {
        let out = compile(cmp("updated_at", "lte", Value::Raw("now()".to_string())));
        assert_eq!(out.sql, "SELECT * FROM people WHERE updated_at <= now()");
        assert!(out.values.is_empty());
    }

    #[test]
    fn test_unknown_helper_aborts_without_output() {
        let registry = HelperRegistry::standard(Dialect::Postgres);
        let mut query = Select::from_table("people");
        query.filter = Some(cmp("name", "fuzzy", "x"));
        let err = Compiler::new(&registry, Dialect::Postgres)
            .compile(&query)
            .unwrap_err();
        assert!(matches!(err, crate::QuarryError::UnknownHelper { .. }));
    }

    #[test]
    fn test_reserved_identifiers_are_quoted() {
        let registry = HelperRegistry::standard(Dialect::Postgres);
        let mut query = Select::from_table("order");
        query.columns = vec!["user".to_string()];
        query.filter = Some(eq("group", "a"));
        let out = Compiler::new(&registry, Dialect::Postgres)
            .compile(&query)
            .unwrap();
        assert_eq!(
            out.sql,
            "SELECT \"user\" FROM \"order\" WHERE \"group\" = $1"
        );
    }

    #[test]
    fn test_order_by_limit_offset() {
        let registry = HelperRegistry::standard(Dialect::Postgres);
        let mut query = Select::from_table("people");
        query.order_by = vec![crate::ast::OrderBy {
            column: "created_at".to_string(),
            order: crate::ast::SortOrder::Desc,
        }];
        query.limit = Some(10);
        query.offset = Some(20);
        let out = Compiler::new(&registry, Dialect::Postgres)
            .compile(&query)
            .unwrap();
        assert_eq!(
            out.sql,
            "SELECT * FROM people ORDER BY created_at DESC LIMIT 10 OFFSET 20"
        );
    }
}
