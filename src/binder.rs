//! Positional parameter binding for one compile call.

use std::collections::HashMap;

use crate::ast::Value;

/// Collects bound parameter values and hands out 1-based ordinals.
///
/// One binder is exclusively owned by a single compile call. Ordinals
/// are assigned in traversal order, strictly increasing, never reused.
/// Equal values are NOT deduplicated: binding `'x'` twice yields `$1`
/// and `$2`, keeping placeholder assignment purely positional.
#[derive(Debug, Default)]
pub struct ParamBinder {
    params: Vec<Value>,
}

impl ParamBinder {
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Bind a value and return its placeholder (`$N`).
    pub fn bind(&mut self, value: Value) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }

    /// Number of parameters bound so far.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Consume the binder, producing the `"$N" -> value` output map.
    pub fn finalize(self) -> HashMap<String, Value> {
        self.params
            .into_iter()
            .enumerate()
            .map(|(i, v)| (format!("${}", i + 1), v))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals_increase_from_one() {
        let mut binder = ParamBinder::new();
        assert_eq!(binder.bind(Value::Int(1)), "$1");
        assert_eq!(binder.bind(Value::Int(2)), "$2");
        assert_eq!(binder.bind(Value::Int(3)), "$3");
    }

    #[test]
    fn test_no_deduplication() {
        let mut binder = ParamBinder::new();
        assert_eq!(binder.bind(Value::String("x".into())), "$1");
        assert_eq!(binder.bind(Value::String("x".into())), "$2");

        let values = binder.finalize();
        assert_eq!(values.len(), 2);
        assert_eq!(values["$1"], values["$2"]);
    }

    #[test]
    fn test_finalize_keys_match_ordinals() {
        let mut binder = ParamBinder::new();
        binder.bind(Value::Bool(true));
        binder.bind(Value::Null);

        let values = binder.finalize();
        assert_eq!(values["$1"], Value::Bool(true));
        assert_eq!(values["$2"], Value::Null);
    }
}
