//! Helper registration and type dispatch.
//!
//! A helper is a registered operator or callable function extending the
//! query vocabulary (`$eq`, `$ilike`, ...). Each helper carries a type
//! table mapping an operand's [`SemanticType`] to the [`SyntaxTemplate`]
//! that renders it, per invocation mode.
//!
//! Registration happens once at startup (the dialect constructors
//! install the standard catalog; plugins add their own), after which
//! the registry is read-only: compilation takes `&HelperRegistry`,
//! registration `&mut`, so reads and writes cannot interleave and a
//! registry behind `Arc` is safe to share across compiling threads.

pub mod comparison;
pub mod list;
pub mod null;
pub mod pattern;

use std::collections::HashMap;

use tracing::debug;

use crate::ast::Value;
use crate::dialect::Dialect;
use crate::error::{QuarryError, QuarryResult};
use crate::syntax::SyntaxTemplate;

/// The semantic type of a helper operand, used for template dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticType {
    Null,
    Boolean,
    Number,
    String,
    Timestamp,
    Uuid,
    Array,
    Subquery,
    Raw,
}

impl SemanticType {
    /// Classify a value into its most specific semantic type.
    pub fn of(value: &Value) -> SemanticType {
        match value {
            Value::Null => SemanticType::Null,
            Value::Bool(_) => SemanticType::Boolean,
            Value::Int(_) | Value::Float(_) => SemanticType::Number,
            Value::String(_) => SemanticType::String,
            Value::Timestamp(_) => SemanticType::Timestamp,
            Value::Uuid(_) => SemanticType::Uuid,
            Value::Array(_) => SemanticType::Array,
            Value::Subquery(_) => SemanticType::Subquery,
            Value::Raw(_) => SemanticType::Raw,
        }
    }

    /// Dispatch candidates for a value, most specific first.
    ///
    /// Scalar types that have a canonical text form fall back to
    /// `String`; structural types (`Array`, `Subquery`, `Raw`) never
    /// coerce. This ordering is fixed: a helper registering both
    /// `Timestamp` and `String` always gets the `Timestamp` template
    /// for a timestamp operand.
    pub fn candidates(value: &Value) -> &'static [SemanticType] {
        match SemanticType::of(value) {
            SemanticType::Null => &[SemanticType::Null],
            SemanticType::Boolean => &[SemanticType::Boolean],
            SemanticType::Number => &[SemanticType::Number],
            SemanticType::String => &[SemanticType::String],
            SemanticType::Timestamp => &[SemanticType::Timestamp, SemanticType::String],
            SemanticType::Uuid => &[SemanticType::Uuid, SemanticType::String],
            SemanticType::Array => &[SemanticType::Array],
            SemanticType::Subquery => &[SemanticType::Subquery],
            SemanticType::Raw => &[SemanticType::Raw],
        }
    }
}

impl std::fmt::Display for SemanticType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SemanticType::Null => "Null",
            SemanticType::Boolean => "Boolean",
            SemanticType::Number => "Number",
            SemanticType::String => "String",
            SemanticType::Timestamp => "Timestamp",
            SemanticType::Uuid => "Uuid",
            SemanticType::Array => "Array",
            SemanticType::Subquery => "Subquery",
            SemanticType::Raw => "Raw",
        };
        write!(f, "{}", name)
    }
}

/// How a helper is being invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationMode {
    /// Operator position: `{col: {$ilike: v}}`.
    Operator,
    /// Explicit call: `sql.ilike(v)` used as a comparison value.
    Callable,
}

impl InvocationMode {
    pub fn label(&self) -> &'static str {
        match self {
            InvocationMode::Operator => "operator",
            InvocationMode::Callable => "callable",
        }
    }
}

/// A helper definition under construction. This is the whole plugin
/// ABI: build one, hand it to [`HelperRegistry::register`].
///
/// ```
/// use quarry::helpers::{HelperDef, SemanticType};
///
/// let age_between = HelperDef::new("agebetween")
///     .syntax(SemanticType::Array, "BETWEEN <value-param> AND <value-param>");
/// ```
#[derive(Debug, Clone)]
pub struct HelperDef {
    name: String,
    entries: Vec<SyntaxEntry>,
}

#[derive(Debug, Clone)]
struct SyntaxEntry {
    semantic_type: SemanticType,
    /// None registers the pattern for both modes.
    mode: Option<InvocationMode>,
    pattern: String,
}

impl HelperDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a pattern for a semantic type in both invocation modes.
    pub fn syntax(mut self, semantic_type: SemanticType, pattern: &str) -> Self {
        self.entries.push(SyntaxEntry {
            semantic_type,
            mode: None,
            pattern: pattern.to_string(),
        });
        self
    }

    /// Register a pattern used only in operator position.
    pub fn operator_syntax(mut self, semantic_type: SemanticType, pattern: &str) -> Self {
        self.entries.push(SyntaxEntry {
            semantic_type,
            mode: Some(InvocationMode::Operator),
            pattern: pattern.to_string(),
        });
        self
    }

    /// Register a pattern used only when called explicitly.
    pub fn callable_syntax(mut self, semantic_type: SemanticType, pattern: &str) -> Self {
        self.entries.push(SyntaxEntry {
            semantic_type,
            mode: Some(InvocationMode::Callable),
            pattern: pattern.to_string(),
        });
        self
    }
}

/// Per-type template slots, one per invocation mode.
#[derive(Debug, Clone, Default)]
struct ModeSyntax {
    operator: Option<SyntaxTemplate>,
    callable: Option<SyntaxTemplate>,
}

impl ModeSyntax {
    fn get(&self, mode: InvocationMode) -> Option<&SyntaxTemplate> {
        match mode {
            InvocationMode::Operator => self.operator.as_ref(),
            InvocationMode::Callable => self.callable.as_ref(),
        }
    }

    fn slot(&mut self, mode: InvocationMode) -> &mut Option<SyntaxTemplate> {
        match mode {
            InvocationMode::Operator => &mut self.operator,
            InvocationMode::Callable => &mut self.callable,
        }
    }
}

/// A validated, registered helper. Immutable once registered.
#[derive(Debug, Clone)]
pub struct Helper {
    name: String,
    table: HashMap<SemanticType, ModeSyntax>,
}

impl Helper {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn supports_mode(&self, mode: InvocationMode) -> bool {
        self.table.values().any(|slots| slots.get(mode).is_some())
    }

    /// Select the template for an operand, walking the candidate chain
    /// most specific first. Fails with `UnsupportedType` when no
    /// registered type matches.
    pub fn provides(
        &self,
        mode: InvocationMode,
        operand: &Value,
    ) -> QuarryResult<&SyntaxTemplate> {
        for candidate in SemanticType::candidates(operand) {
            if let Some(template) = self.table.get(candidate).and_then(|s| s.get(mode)) {
                return Ok(template);
            }
        }
        Err(QuarryError::UnsupportedType {
            helper: self.name.clone(),
            semantic_type: SemanticType::of(operand).to_string(),
        })
    }
}

/// Process-wide helper registry.
#[derive(Debug, Default, Clone)]
pub struct HelperRegistry {
    helpers: HashMap<String, Helper>,
}

impl HelperRegistry {
    /// An empty registry. Use [`HelperRegistry::standard`] for the
    /// per-dialect catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard helper catalog for a dialect.
    pub fn standard(dialect: Dialect) -> Self {
        let mut registry = Self::new();
        for def in standard_helpers(dialect) {
            // The built-in catalog is known-valid.
            registry
                .register(def)
                .expect("standard helper catalog must register");
        }
        registry
    }

    /// Register a helper, replacing any existing helper with the same
    /// canonical name.
    ///
    /// Fails with `InvalidDefinition` (empty name or type table),
    /// `DuplicateType` (one semantic type bound twice for a mode —
    /// duplicates are an error, never a silent overwrite) or
    /// `MalformedTemplate`. A failed registration leaves the registry
    /// untouched.
    pub fn register(&mut self, def: HelperDef) -> QuarryResult<()> {
        if def.name.is_empty() {
            return Err(QuarryError::invalid_definition(
                def.name,
                "helper name must not be empty",
            ));
        }
        if def.entries.is_empty() {
            return Err(QuarryError::invalid_definition(
                def.name,
                "type table must not be empty",
            ));
        }

        let mut table: HashMap<SemanticType, ModeSyntax> = HashMap::new();
        for entry in &def.entries {
            let template = SyntaxTemplate::compile(&entry.pattern)?;
            let modes: &[InvocationMode] = match entry.mode {
                Some(InvocationMode::Operator) => &[InvocationMode::Operator],
                Some(InvocationMode::Callable) => &[InvocationMode::Callable],
                None => &[InvocationMode::Operator, InvocationMode::Callable],
            };
            for mode in modes {
                let slot = table.entry(entry.semantic_type).or_default().slot(*mode);
                if slot.is_some() {
                    return Err(QuarryError::DuplicateType {
                        helper: def.name.clone(),
                        mode: mode.label(),
                        semantic_type: entry.semantic_type.to_string(),
                    });
                }
                *slot = Some(template.clone());
            }
        }

        debug!(helper = %def.name, types = table.len(), "registered helper");
        self.helpers.insert(
            def.name.clone(),
            Helper {
                name: def.name,
                table,
            },
        );
        Ok(())
    }

    /// Look up a helper by canonical name for an invocation mode.
    ///
    /// A helper with no syntax in the requested mode is unknown in that
    /// mode: an operator-only helper cannot be called as a function.
    pub fn resolve(&self, name: &str, mode: InvocationMode) -> QuarryResult<&Helper> {
        match self.helpers.get(name) {
            Some(helper) if helper.supports_mode(mode) => Ok(helper),
            _ => Err(QuarryError::UnknownHelper {
                name: name.to_string(),
                suggestion: self.suggest(name),
            }),
        }
    }

    /// Registered helper names, unordered.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.helpers.keys().map(|s| s.as_str())
    }

    /// Closest registered name within edit distance 2.
    fn suggest(&self, name: &str) -> Option<String> {
        self.helpers
            .keys()
            .map(|known| (strsim::levenshtein(name, known), known))
            .filter(|(distance, _)| *distance <= 2)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, known)| known.clone())
    }
}

/// The standard helper catalog for a dialect.
pub fn standard_helpers(dialect: Dialect) -> Vec<HelperDef> {
    let mut defs = vec![
        comparison::eq(),
        comparison::ne(),
        comparison::gt(),
        comparison::gte(),
        comparison::lt(),
        comparison::lte(),
        pattern::like(),
        pattern::nlike(),
        list::is_in(),
        list::not_in(),
        list::between(),
        null::is_null(),
        null::not_null(),
    ];
    // Case-insensitive LIKE is a Postgres keyword; other dialects
    // simply don't register the helper.
    if dialect == Dialect::Postgres {
        defs.push(pattern::ilike());
    }
    defs
}
