//! Error types for quarry.

use thiserror::Error;

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(". Did you mean '{}'?", name),
        None => String::new(),
    }
}

/// The main error type for quarry operations.
#[derive(Debug, Error)]
pub enum QuarryError {
    /// A helper definition was rejected at registration time.
    #[error("Invalid helper definition '{name}': {reason}")]
    InvalidDefinition { name: String, reason: String },

    /// The same semantic type was registered twice for one helper and mode.
    #[error("Duplicate syntax for type {semantic_type} on helper '{helper}' ({mode} mode)")]
    DuplicateType {
        helper: String,
        mode: &'static str,
        semantic_type: String,
    },

    /// No helper registered under this name for the requested mode.
    #[error("Unknown helper '{name}'{}", did_you_mean(.suggestion))]
    UnknownHelper {
        name: String,
        suggestion: Option<String>,
    },

    /// A syntax template pattern failed to compile.
    #[error("Malformed template '{pattern}': {reason}")]
    MalformedTemplate { pattern: String, reason: String },

    /// The helper has no syntax registered for the operand's type.
    #[error("Helper '{helper}' does not support {semantic_type} operands")]
    UnsupportedType {
        helper: String,
        semantic_type: String,
    },

    /// A node in the query description matched no known shape.
    #[error("Unresolved query node at {path}: {reason}")]
    UnresolvedNode { path: String, reason: String },
}

impl QuarryError {
    /// Create an invalid-definition error.
    pub fn invalid_definition(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed-template error.
    pub fn malformed(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedTemplate {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Create an unresolved-node error at the given tree path.
    pub fn unresolved(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnresolvedNode {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for quarry operations.
pub type QuarryResult<T> = Result<T, QuarryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QuarryError::unresolved("$where.name", "expected an operator object");
        assert_eq!(
            err.to_string(),
            "Unresolved query node at $where.name: expected an operator object"
        );
    }

    #[test]
    fn test_unknown_helper_suggestion() {
        let err = QuarryError::UnknownHelper {
            name: "ilik".to_string(),
            suggestion: Some("ilike".to_string()),
        };
        assert_eq!(err.to_string(), "Unknown helper 'ilik'. Did you mean 'ilike'?");

        let err = QuarryError::UnknownHelper {
            name: "frobnicate".to_string(),
            suggestion: None,
        };
        assert_eq!(err.to_string(), "Unknown helper 'frobnicate'");
    }
}
