//! Syntax template grammar.
//!
//! A helper registers one pattern string per semantic type, e.g.
//! `ILIKE <value-param>` or `IN (<value-list>)`. The pattern is parsed
//! once at registration into a token sequence; rendering walks the
//! tokens, emitting literal runs verbatim and substituting a fresh
//! positional placeholder for each value marker.
//!
//! # Grammar
//!
//! ```text
//! ILIKE <value-param>                placeholder markers: <name>
//! BETWEEN <value-param> AND <value-param>
//! IN (<value-list>)
//! IS NULL                            zero markers is legal
//! <= <value-param>                   '<' not starting a marker is literal
//! ```
//!
//! Markers:
//! - `<value-param>`  bind one value, emit `$N`. With several in one
//!   pattern, successive elements of an Array operand are consumed.
//! - `<value-list>`   bind each element of an Array operand, emit
//!   `$N, $N+1, ...`
//! - `<value-inline>` splice a pre-rendered fragment (compiled subquery
//!   or raw SQL) verbatim
//!
//! A `<` followed by an identifier run must close with `>` and name a
//! known marker; anything else fails with `MalformedTemplate`.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::char,
    combinator::value,
    sequence::delimited,
    IResult,
};

use crate::ast::Value;
use crate::binder::ParamBinder;
use crate::error::{QuarryError, QuarryResult};
use crate::helpers::SemanticType;

/// One compiled token of a pattern.
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Literal(String),
    Param,
    List,
    Inline,
}

/// A compiled syntax template. Pure and stateless after parsing;
/// shared by every invocation of its helper for that type.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxTemplate {
    pattern: String,
    tokens: Vec<Token>,
    param_slots: usize,
}

/// Everything a template needs to render one fragment.
pub struct RenderInput<'a> {
    /// Helper name, for error reporting.
    pub helper: &'a str,
    /// The operand value.
    pub operand: &'a Value,
    /// Pre-rendered fragment for `<value-inline>` markers (set by the
    /// compiler for Subquery and Raw operands).
    pub inline: Option<&'a str>,
}

fn is_marker_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

fn known_marker(input: &str) -> IResult<&str, Token> {
    alt((
        value(Token::Param, tag("<value-param>")),
        value(Token::List, tag("<value-list>")),
        value(Token::Inline, tag("<value-inline>")),
    ))(input)
}

fn marker_shape(input: &str) -> IResult<&str, &str> {
    delimited(char('<'), take_while1(is_marker_char), char('>'))(input)
}

impl SyntaxTemplate {
    /// Compile a pattern string. Fails with `MalformedTemplate` on an
    /// unterminated or unrecognized marker.
    pub fn compile(pattern: &str) -> QuarryResult<Self> {
        let mut tokens: Vec<Token> = Vec::new();
        let mut literal = String::new();
        let mut rest = pattern;

        let mut flush = |literal: &mut String, tokens: &mut Vec<Token>| {
            if !literal.is_empty() {
                tokens.push(Token::Literal(std::mem::take(literal)));
            }
        };

        while !rest.is_empty() {
            if rest.starts_with('<') {
                if let Ok((next, tok)) = known_marker(rest) {
                    flush(&mut literal, &mut tokens);
                    tokens.push(tok);
                    rest = next;
                    continue;
                }
                if let Ok((_, name)) = marker_shape(rest) {
                    return Err(QuarryError::malformed(
                        pattern,
                        format!("unrecognized placeholder '<{}>'", name),
                    ));
                }
                let run_len = rest[1..].chars().take_while(|c| is_marker_char(*c)).count();
                if run_len > 0 {
                    return Err(QuarryError::malformed(
                        pattern,
                        format!("unterminated placeholder '<{}'", &rest[1..1 + run_len]),
                    ));
                }
                // Bare '<' (e.g. in "<= <value-param>") is literal text.
                literal.push('<');
                rest = &rest[1..];
                continue;
            }
            let idx = rest.find('<').unwrap_or(rest.len());
            literal.push_str(&rest[..idx]);
            rest = &rest[idx..];
        }
        flush(&mut literal, &mut tokens);

        let param_slots = tokens.iter().filter(|t| matches!(t, Token::Param)).count();
        Ok(Self {
            pattern: pattern.to_string(),
            tokens,
            param_slots,
        })
    }

    /// The raw pattern this template was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Render the fragment, binding parameters as markers are reached.
    pub fn render(&self, input: &RenderInput, binder: &mut ParamBinder) -> QuarryResult<String> {
        // With several <value-param> slots the operand must be an array
        // of exactly that many elements (e.g. BETWEEN takes a pair).
        let mut slot_values: Vec<Value> = Vec::new();
        if self.param_slots > 1 {
            match input.operand {
                Value::Array(items) if items.len() == self.param_slots => {
                    slot_values = items.clone();
                }
                other => {
                    return Err(QuarryError::UnsupportedType {
                        helper: input.helper.to_string(),
                        semantic_type: format!(
                            "{} (expected an Array of {} values)",
                            SemanticType::of(other),
                            self.param_slots
                        ),
                    });
                }
            }
        }
        let mut slots = slot_values.into_iter();

        let mut out = String::new();
        for token in &self.tokens {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Param => {
                    let value = if self.param_slots > 1 {
                        slots.next().unwrap_or(Value::Null)
                    } else {
                        input.operand.clone()
                    };
                    out.push_str(&binder.bind(value));
                }
                Token::List => match input.operand {
                    Value::Array(items) if !items.is_empty() => {
                        let refs: Vec<String> =
                            items.iter().map(|v| binder.bind(v.clone())).collect();
                        out.push_str(&refs.join(", "));
                    }
                    Value::Array(_) => {
                        return Err(QuarryError::UnsupportedType {
                            helper: input.helper.to_string(),
                            semantic_type: "empty Array".to_string(),
                        });
                    }
                    other => {
                        return Err(QuarryError::UnsupportedType {
                            helper: input.helper.to_string(),
                            semantic_type: format!(
                                "{} (expected an Array)",
                                SemanticType::of(other)
                            ),
                        });
                    }
                },
                Token::Inline => match input.inline {
                    Some(fragment) => out.push_str(fragment),
                    None => {
                        return Err(QuarryError::UnsupportedType {
                            helper: input.helper.to_string(),
                            semantic_type: format!(
                                "{} (template expects an inline fragment)",
                                SemanticType::of(input.operand)
                            ),
                        });
                    }
                },
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(template: &SyntaxTemplate, operand: Value) -> (String, usize) {
        let mut binder = ParamBinder::new();
        let input = RenderInput {
            helper: "test",
            operand: &operand,
            inline: None,
        };
        let sql = template.render(&input, &mut binder).unwrap();
        (sql, binder.len())
    }

    #[test]
    fn test_value_param() {
        let t = SyntaxTemplate::compile("ILIKE <value-param>").unwrap();
        let (sql, bound) = render(&t, Value::String("J%".into()));
        assert_eq!(sql, "ILIKE $1");
        assert_eq!(bound, 1);
    }

    #[test]
    fn test_constant_template() {
        let t = SyntaxTemplate::compile("IS NULL").unwrap();
        let (sql, bound) = render(&t, Value::Null);
        assert_eq!(sql, "IS NULL");
        assert_eq!(bound, 0);
    }

    #[test]
    fn test_list_expansion() {
        let t = SyntaxTemplate::compile("IN (<value-list>)").unwrap();
        let (sql, bound) = render(&t, Value::Array(vec![1.into(), 2.into(), 3.into()]));
        assert_eq!(sql, "IN ($1, $2, $3)");
        assert_eq!(bound, 3);
    }

    #[test]
    fn test_pair_template() {
        let t = SyntaxTemplate::compile("BETWEEN <value-param> AND <value-param>").unwrap();
        let (sql, bound) = render(&t, Value::Array(vec![1.into(), 9.into()]));
        assert_eq!(sql, "BETWEEN $1 AND $2");
        assert_eq!(bound, 2);
    }

    #[test]
    fn test_literal_angle_bracket() {
        let t = SyntaxTemplate::compile("<= <value-param>").unwrap();
        let (sql, _) = render(&t, Value::Int(5));
        assert_eq!(sql, "<= $1");
    }

    #[test]
    fn test_unrecognized_marker() {
        let err = SyntaxTemplate::compile("LIKE <value-parm>").unwrap_err();
        assert!(matches!(err, QuarryError::MalformedTemplate { .. }));
        assert!(err.to_string().contains("value-parm"));
    }

    #[test]
    fn test_unterminated_marker() {
        let err = SyntaxTemplate::compile("LIKE <value-param").unwrap_err();
        assert!(matches!(err, QuarryError::MalformedTemplate { .. }));
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn test_inline_without_fragment_fails() {
        let t = SyntaxTemplate::compile("IN <value-inline>").unwrap();
        let mut binder = ParamBinder::new();
        let operand = Value::Int(1);
        let input = RenderInput {
            helper: "in",
            operand: &operand,
            inline: None,
        };
        let err = t.render(&input, &mut binder).unwrap_err();
        assert!(matches!(err, QuarryError::UnsupportedType { .. }));
    }

    #[test]
    fn test_pair_template_wrong_arity() {
        let t = SyntaxTemplate::compile("BETWEEN <value-param> AND <value-param>").unwrap();
        let mut binder = ParamBinder::new();
        let operand = Value::Array(vec![1.into()]);
        let input = RenderInput {
            helper: "between",
            operand: &operand,
            inline: None,
        };
        let err = t.render(&input, &mut binder).unwrap_err();
        assert!(matches!(err, QuarryError::UnsupportedType { .. }));
    }
}
