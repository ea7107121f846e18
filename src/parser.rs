//! Query description parser.
//!
//! Turns the declarative JSON form into the typed [`Select`] AST:
//!
//! ```text
//! {"$select": {
//!     "$from": "people",
//!     "$columns": ["id", "first_name"],
//!     "$where": {
//!         "first_name": {"$ilike": "J___n%"},
//!         "$or": [{"age": {"$gte": 21}}, {"vip": true}]
//!     },
//!     "$orderBy": {"created_at": "DESC"},
//!     "$limit": 10
//! }}
//! ```
//!
//! Recognized comparison shapes inside `$where`:
//! - `{field: scalar}` — implicit `$eq`
//! - `{field: {"$op": operand}}` — operator-mode helper invocation;
//!   several `$op` keys on one field form an implicit conjunction
//! - `{field: {"$call": name, "$arg": operand}}` — callable-mode
//!   invocation (produced by [`crate::Quarry::call`])
//! - operands may be `{"$select": ...}` subqueries or `{"$raw": text}`
//!   fragments
//!
//! Anything else fails with `UnresolvedNode` naming the tree path;
//! unknown shapes are never dropped or defaulted.

use serde_json::Value as Json;

use crate::ast::{OrderBy, Select, SortOrder, Value, WhereNode};
use crate::error::{QuarryError, QuarryResult};

/// Parse a complete query description.
pub fn parse_query(json: &Json) -> QuarryResult<Select> {
    let Json::Object(root) = json else {
        return Err(QuarryError::unresolved("$", "query description must be an object"));
    };
    match root.get("$select") {
        Some(body) if root.len() == 1 => parse_select(body, "$select"),
        Some(_) => Err(QuarryError::unresolved(
            "$",
            "unexpected keys beside $select",
        )),
        None => Err(QuarryError::unresolved("$", "expected a $select query")),
    }
}

fn parse_select(json: &Json, path: &str) -> QuarryResult<Select> {
    let Json::Object(body) = json else {
        return Err(QuarryError::unresolved(path, "$select body must be an object"));
    };

    let from = match body.get("$from") {
        Some(Json::String(table)) => table.clone(),
        Some(_) => {
            return Err(QuarryError::unresolved(
                format!("{path}.$from"),
                "table name must be a string",
            ));
        }
        None => {
            return Err(QuarryError::unresolved(path, "missing $from"));
        }
    };

    let mut query = Select::from_table(from);

    for (key, value) in body {
        match key.as_str() {
            "$from" => {}
            "$columns" => query.columns = parse_columns(value, &format!("{path}.$columns"))?,
            "$where" => {
                let where_path = format!("{path}.$where");
                let Json::Object(map) = value else {
                    return Err(QuarryError::unresolved(where_path, "$where must be an object"));
                };
                if !map.is_empty() {
                    query.filter = Some(parse_where(map, &where_path)?);
                }
            }
            "$orderBy" => query.order_by = parse_order_by(value, &format!("{path}.$orderBy"))?,
            "$limit" => query.limit = Some(parse_count(value, &format!("{path}.$limit"))?),
            "$offset" => query.offset = Some(parse_count(value, &format!("{path}.$offset"))?),
            other => {
                return Err(QuarryError::unresolved(
                    format!("{path}.{other}"),
                    "unrecognized $select clause",
                ));
            }
        }
    }
    Ok(query)
}

fn parse_columns(json: &Json, path: &str) -> QuarryResult<Vec<String>> {
    match json {
        Json::String(col) => Ok(vec![col.clone()]),
        Json::Array(items) => items
            .iter()
            .map(|item| match item {
                Json::String(col) => Ok(col.clone()),
                _ => Err(QuarryError::unresolved(path, "column names must be strings")),
            })
            .collect(),
        _ => Err(QuarryError::unresolved(
            path,
            "$columns must be a string or an array of strings",
        )),
    }
}

fn parse_count(json: &Json, path: &str) -> QuarryResult<u64> {
    json.as_u64()
        .ok_or_else(|| QuarryError::unresolved(path, "expected a non-negative integer"))
}

fn parse_order_by(json: &Json, path: &str) -> QuarryResult<Vec<OrderBy>> {
    match json {
        Json::String(col) => Ok(vec![OrderBy {
            column: col.clone(),
            order: SortOrder::Asc,
        }]),
        Json::Object(map) => map
            .iter()
            .map(|(col, dir)| {
                let order = match dir.as_str().map(str::to_ascii_uppercase).as_deref() {
                    Some("ASC") => SortOrder::Asc,
                    Some("DESC") => SortOrder::Desc,
                    _ => {
                        return Err(QuarryError::unresolved(
                            format!("{path}.{col}"),
                            "sort direction must be \"ASC\" or \"DESC\"",
                        ));
                    }
                };
                Ok(OrderBy {
                    column: col.clone(),
                    order,
                })
            })
            .collect(),
        Json::Array(items) => {
            let mut entries = Vec::new();
            for item in items {
                entries.extend(parse_order_by(item, path)?);
            }
            Ok(entries)
        }
        _ => Err(QuarryError::unresolved(path, "unrecognized $orderBy shape")),
    }
}

/// Parse a non-empty `$where` object. Several entries form an implicit
/// conjunction.
fn parse_where(map: &serde_json::Map<String, Json>, path: &str) -> QuarryResult<WhereNode> {
    let mut nodes = Vec::new();
    for (key, value) in map {
        let entry_path = format!("{path}.{key}");
        match key.as_str() {
            "$and" => nodes.push(parse_connective(value, &entry_path, true)?),
            "$or" => nodes.push(parse_connective(value, &entry_path, false)?),
            field if !field.starts_with('$') => {
                nodes.push(parse_field(field, value, &entry_path)?);
            }
            other => {
                return Err(QuarryError::unresolved(
                    entry_path,
                    format!("unrecognized connective '{other}'"),
                ));
            }
        }
    }
    Ok(flatten(nodes, true))
}

fn parse_connective(json: &Json, path: &str, conjunction: bool) -> QuarryResult<WhereNode> {
    let Json::Array(items) = json else {
        return Err(QuarryError::unresolved(path, "connective takes an array"));
    };
    if items.is_empty() {
        return Err(QuarryError::unresolved(path, "connective must not be empty"));
    }
    let mut children = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let child_path = format!("{path}[{i}]");
        let Json::Object(map) = item else {
            return Err(QuarryError::unresolved(child_path, "expected a condition object"));
        };
        if map.is_empty() {
            return Err(QuarryError::unresolved(child_path, "empty condition object"));
        }
        children.push(parse_where(map, &child_path)?);
    }
    Ok(flatten(children, conjunction))
}

fn flatten(mut nodes: Vec<WhereNode>, conjunction: bool) -> WhereNode {
    if nodes.len() == 1 {
        nodes.remove(0)
    } else if conjunction {
        WhereNode::And(nodes)
    } else {
        WhereNode::Or(nodes)
    }
}

/// Parse one `{field: ...}` entry of a `$where` object.
fn parse_field(field: &str, json: &Json, path: &str) -> QuarryResult<WhereNode> {
    let Json::Object(map) = json else {
        // Scalar or array shorthand: implicit $eq.
        return Ok(WhereNode::Comparison {
            column: field.to_string(),
            helper: "eq".to_string(),
            operand: Value::from_json(json),
        });
    };

    if map.contains_key("$call") {
        let Some(Json::String(helper)) = map.get("$call") else {
            return Err(QuarryError::unresolved(
                format!("{path}.$call"),
                "helper name must be a string",
            ));
        };
        let operand = match map.get("$arg") {
            Some(arg) => parse_operand(arg, &format!("{path}.$arg"))?,
            None => Value::Null,
        };
        return Ok(WhereNode::Call {
            column: field.to_string(),
            helper: helper.clone(),
            operand,
        });
    }

    // Subquery or raw fragment used directly as the value: implicit $eq.
    if map.contains_key("$select") || map.contains_key("$raw") {
        return Ok(WhereNode::Comparison {
            column: field.to_string(),
            helper: "eq".to_string(),
            operand: parse_operand(json, path)?,
        });
    }

    if map.is_empty() {
        return Err(QuarryError::unresolved(path, "empty comparison object"));
    }

    let mut nodes = Vec::new();
    for (key, value) in map {
        let Some(helper) = key.strip_prefix('$') else {
            return Err(QuarryError::unresolved(
                format!("{path}.{key}"),
                "expected a $operator key",
            ));
        };
        nodes.push(WhereNode::Comparison {
            column: field.to_string(),
            helper: helper.to_string(),
            operand: parse_operand(value, &format!("{path}.${helper}"))?,
        });
    }
    Ok(flatten(nodes, true))
}

/// Parse a helper operand: a subquery, a raw fragment, or plain data.
fn parse_operand(json: &Json, path: &str) -> QuarryResult<Value> {
    match json {
        Json::Object(map) => {
            if let Some(body) = map.get("$select") {
                if map.len() != 1 {
                    return Err(QuarryError::unresolved(
                        path,
                        "unexpected keys beside $select",
                    ));
                }
                let sub = parse_select(body, &format!("{path}.$select"))?;
                Ok(Value::Subquery(Box::new(sub)))
            } else if let Some(raw) = map.get("$raw") {
                match raw {
                    Json::String(text) if map.len() == 1 => Ok(Value::Raw(text.clone())),
                    _ => Err(QuarryError::unresolved(
                        format!("{path}.$raw"),
                        "raw fragment must be a lone string",
                    )),
                }
            } else {
                Err(QuarryError::unresolved(path, "unrecognized operand shape"))
            }
        }
        Json::Array(items) => {
            let elements: QuarryResult<Vec<Value>> = items
                .iter()
                .enumerate()
                .map(|(i, item)| parse_operand(item, &format!("{path}[{i}]")))
                .collect();
            Ok(Value::Array(elements?))
        }
        other => Ok(Value::from_json(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_minimal_select() {
        let q = parse_query(&json!({"$select": {"$from": "people"}})).unwrap();
        assert_eq!(q.from, "people");
        assert!(q.columns.is_empty());
        assert!(q.filter.is_none());
    }

    #[test]
    fn test_parse_comparison() {
        let q = parse_query(&json!({
            "$select": {
                "$from": "people",
                "$where": {"first_name": {"$ilike": "J___n%"}}
            }
        }))
        .unwrap();
        assert_eq!(
            q.filter,
            Some(WhereNode::Comparison {
                column: "first_name".to_string(),
                helper: "ilike".to_string(),
                operand: Value::String("J___n%".to_string()),
            })
        );
    }

    #[test]
    fn test_parse_scalar_is_implicit_eq() {
        let q = parse_query(&json!({
            "$select": {"$from": "people", "$where": {"age": 45}}
        }))
        .unwrap();
        assert_eq!(
            q.filter,
            Some(WhereNode::Comparison {
                column: "age".to_string(),
                helper: "eq".to_string(),
                operand: Value::Int(45),
            })
        );
    }

    #[test]
    fn test_parse_call_marker() {
        let q = parse_query(&json!({
            "$select": {
                "$from": "people",
                "$where": {"first_name": {"$call": "ilike", "$arg": "J%"}}
            }
        }))
        .unwrap();
        assert_eq!(
            q.filter,
            Some(WhereNode::Call {
                column: "first_name".to_string(),
                helper: "ilike".to_string(),
                operand: Value::String("J%".to_string()),
            })
        );
    }

    #[test]
    fn test_parse_multi_op_field_is_conjunction() {
        let q = parse_query(&json!({
            "$select": {
                "$from": "people",
                "$where": {"age": {"$gte": 18, "$lt": 65}}
            }
        }))
        .unwrap();
        match q.filter {
            Some(WhereNode::And(children)) => assert_eq!(children.len(), 2),
            other => panic!("expected And, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_or_connective() {
        let q = parse_query(&json!({
            "$select": {
                "$from": "people",
                "$where": {"$or": [{"role": "admin"}, {"role": "mod"}]}
            }
        }))
        .unwrap();
        match q.filter {
            Some(WhereNode::Or(children)) => assert_eq!(children.len(), 2),
            other => panic!("expected Or, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_root_key_fails() {
        let err = parse_query(&json!({"$delete": {"$from": "people"}})).unwrap_err();
        assert!(matches!(err, QuarryError::UnresolvedNode { .. }));
    }

    #[test]
    fn test_unknown_clause_fails() {
        let err = parse_query(&json!({
            "$select": {"$from": "people", "$having": {}}
        }))
        .unwrap_err();
        assert!(matches!(err, QuarryError::UnresolvedNode { .. }));
        assert!(err.to_string().contains("$having"));
    }

    #[test]
    fn test_empty_connective_fails() {
        let err = parse_query(&json!({
            "$select": {"$from": "people", "$where": {"$or": []}}
        }))
        .unwrap_err();
        assert!(matches!(err, QuarryError::UnresolvedNode { .. }));
    }

    #[test]
    fn test_subquery_operand() {
        let q = parse_query(&json!({
            "$select": {
                "$from": "orders",
                "$where": {
                    "customer_id": {"$in": {"$select": {"$from": "vips", "$columns": "id"}}}
                }
            }
        }))
        .unwrap();
        match q.filter {
            Some(WhereNode::Comparison { operand: Value::Subquery(sub), .. }) => {
                assert_eq!(sub.from, "vips");
            }
            other => panic!("expected subquery operand, got {other:?}"),
        }
    }
}
