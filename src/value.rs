//! Value kinds and coercion of raw tokens into typed values.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

/// Accepted floating point literals: `[+-]?digits[.digits][eE[+-]digits]`.
static FLOAT_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?[0-9]+(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?$")
        .expect("static regex must compile")
});

/// The declared type of an option slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Taken verbatim from the value token
    String,
    /// Signed 32-bit integer
    Integer,
    /// Signed 64-bit integer
    Long,
    /// 32-bit floating point
    Float,
    /// 64-bit floating point
    Double,
    /// Signed 8-bit integer
    Byte,
    /// Signed 16-bit integer
    Short,
    /// A single Unicode scalar value
    Char,
    /// A toggle, see [`crate::parser`] for flip semantics
    Boolean,
}

impl ValueKind {
    /// Lowercase name, as used in JSON tables and error messages.
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Integer => "integer",
            ValueKind::Long => "long",
            ValueKind::Float => "float",
            ValueKind::Double => "double",
            ValueKind::Byte => "byte",
            ValueKind::Short => "short",
            ValueKind::Char => "char",
            ValueKind::Boolean => "boolean",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ValueKind::Integer
                | ValueKind::Long
                | ValueKind::Float
                | ValueKind::Double
                | ValueKind::Byte
                | ValueKind::Short
        )
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A coerced option value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Byte(i8),
    Short(i16),
    Char(char),
    Boolean(bool),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::String(_) => ValueKind::String,
            Value::Integer(_) => ValueKind::Integer,
            Value::Long(_) => ValueKind::Long,
            Value::Float(_) => ValueKind::Float,
            Value::Double(_) => ValueKind::Double,
            Value::Byte(_) => ValueKind::Byte,
            Value::Short(_) => ValueKind::Short,
            Value::Char(_) => ValueKind::Char,
            Value::Boolean(_) => ValueKind::Boolean,
        }
    }

    /// The zero value of a kind: empty string, `0`, `0.0`, `'\0'` or `false`.
    pub fn zero(kind: ValueKind) -> Value {
        match kind {
            ValueKind::String => Value::String(String::new()),
            ValueKind::Integer => Value::Integer(0),
            ValueKind::Long => Value::Long(0),
            ValueKind::Float => Value::Float(0.0),
            ValueKind::Double => Value::Double(0.0),
            ValueKind::Byte => Value::Byte(0),
            ValueKind::Short => Value::Short(0),
            ValueKind::Char => Value::Char('\0'),
            ValueKind::Boolean => Value::Boolean(false),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(v) => f.write_str(v),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Short(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "{}", v),
            Value::Boolean(v) => write!(f, "{}", v),
        }
    }
}

/// A raw token that could not be converted to the requested kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert '{raw}' to {expected}")]
pub struct CoerceError {
    pub raw: String,
    pub expected: ValueKind,
}

impl CoerceError {
    fn new(raw: &str, expected: ValueKind) -> Self {
        Self {
            raw: raw.to_string(),
            expected,
        }
    }
}

/// Convert a raw value token into a value of `kind`.
///
/// Integers are base-10 with an optional sign and must fit the kind's width.
/// Floats must match `[+-]?digits[.digits][eE[+-]digits]` and stay finite.
/// Chars take the first scalar of a non-empty token. Booleans accept
/// `true`/`false` in any ASCII case.
pub fn coerce(kind: ValueKind, raw: &str) -> Result<Value, CoerceError> {
    let err = || CoerceError::new(raw, kind);

    match kind {
        ValueKind::String => Ok(Value::String(raw.to_string())),
        ValueKind::Integer => raw.parse().map(Value::Integer).map_err(|_| err()),
        ValueKind::Long => raw.parse().map(Value::Long).map_err(|_| err()),
        ValueKind::Byte => raw.parse().map(Value::Byte).map_err(|_| err()),
        ValueKind::Short => raw.parse().map(Value::Short).map_err(|_| err()),
        ValueKind::Float => parse_float::<f32>(raw).map(Value::Float).ok_or_else(err),
        ValueKind::Double => parse_float::<f64>(raw).map(Value::Double).ok_or_else(err),
        ValueKind::Char => raw.chars().next().map(Value::Char).ok_or_else(err),
        ValueKind::Boolean => parse_bool_literal(raw).map(Value::Boolean).ok_or_else(err),
    }
}

/// Parse an explicit boolean literal, ignoring ASCII case.
pub fn parse_bool_literal(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

trait FiniteFloat: std::str::FromStr {
    fn is_finite_value(&self) -> bool;
}

impl FiniteFloat for f32 {
    fn is_finite_value(&self) -> bool {
        self.is_finite()
    }
}

impl FiniteFloat for f64 {
    fn is_finite_value(&self) -> bool {
        self.is_finite()
    }
}

fn parse_float<F: FiniteFloat>(raw: &str) -> Option<F> {
    if !FLOAT_LITERAL.is_match(raw) {
        return None;
    }
    raw.parse::<F>().ok().filter(F::is_finite_value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_string_verbatim() {
        assert_eq!(
            coerce(ValueKind::String, " spaced -dash "),
            Ok(Value::String(" spaced -dash ".to_string()))
        );
        assert_eq!(
            coerce(ValueKind::String, ""),
            Ok(Value::String(String::new()))
        );
    }

    #[test]
    fn test_coerce_integer_widths() {
        assert_eq!(coerce(ValueKind::Integer, "42"), Ok(Value::Integer(42)));
        assert_eq!(coerce(ValueKind::Integer, "-7"), Ok(Value::Integer(-7)));
        assert_eq!(coerce(ValueKind::Integer, "+7"), Ok(Value::Integer(7)));
        assert_eq!(
            coerce(ValueKind::Long, "9000000000"),
            Ok(Value::Long(9_000_000_000))
        );
        assert_eq!(coerce(ValueKind::Byte, "-128"), Ok(Value::Byte(-128)));
        assert_eq!(coerce(ValueKind::Short, "32767"), Ok(Value::Short(32767)));
    }

    #[test]
    fn test_coerce_integer_out_of_range() {
        assert!(coerce(ValueKind::Integer, "2147483648").is_err());
        assert!(coerce(ValueKind::Byte, "128").is_err());
        assert!(coerce(ValueKind::Short, "-32769").is_err());
        assert!(coerce(ValueKind::Long, "9223372036854775808").is_err());
    }

    #[test]
    fn test_coerce_integer_rejects_garbage() {
        let err = coerce(ValueKind::Integer, "abc").unwrap_err();
        assert_eq!(err.raw, "abc");
        assert_eq!(err.expected, ValueKind::Integer);

        assert!(coerce(ValueKind::Integer, "").is_err());
        assert!(coerce(ValueKind::Integer, " 1").is_err());
        assert!(coerce(ValueKind::Integer, "1.0").is_err());
        assert!(coerce(ValueKind::Long, "0x10").is_err());
    }

    #[test]
    fn test_coerce_float_accepted_forms() {
        assert_eq!(coerce(ValueKind::Double, "1"), Ok(Value::Double(1.0)));
        assert_eq!(coerce(ValueKind::Double, "-2.5"), Ok(Value::Double(-2.5)));
        assert_eq!(coerce(ValueKind::Double, "+2.5e3"), Ok(Value::Double(2500.0)));
        assert_eq!(coerce(ValueKind::Double, "25E-1"), Ok(Value::Double(2.5)));
        assert_eq!(coerce(ValueKind::Float, "0.5"), Ok(Value::Float(0.5)));
    }

    #[test]
    fn test_coerce_float_rejected_forms() {
        for raw in [".5", "5.", "inf", "NaN", "infinity", "0x1p3", "1e", "1.5f", " 1", ""] {
            assert!(
                coerce(ValueKind::Double, raw).is_err(),
                "Expected '{}' to be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_coerce_float_overflow_is_invalid() {
        assert!(coerce(ValueKind::Float, "1e39").is_err());
        assert!(coerce(ValueKind::Double, "1e39").is_ok());
        assert!(coerce(ValueKind::Double, "1e309").is_err());
    }

    #[test]
    fn test_coerce_char() {
        assert_eq!(coerce(ValueKind::Char, "xyz"), Ok(Value::Char('x')));
        assert_eq!(coerce(ValueKind::Char, "é"), Ok(Value::Char('é')));
        assert!(coerce(ValueKind::Char, "").is_err());
    }

    #[test]
    fn test_bool_literals_ignore_case() {
        assert_eq!(parse_bool_literal("true"), Some(true));
        assert_eq!(parse_bool_literal("TRUE"), Some(true));
        assert_eq!(parse_bool_literal("False"), Some(false));
        assert_eq!(parse_bool_literal("yes"), None);
        assert_eq!(parse_bool_literal("1"), None);
        assert_eq!(parse_bool_literal(""), None);
    }

    #[test]
    fn test_value_kind_round_trips_through_value() {
        let kinds = [
            ValueKind::String,
            ValueKind::Integer,
            ValueKind::Long,
            ValueKind::Float,
            ValueKind::Double,
            ValueKind::Byte,
            ValueKind::Short,
            ValueKind::Char,
            ValueKind::Boolean,
        ];
        for kind in kinds {
            assert_eq!(Value::zero(kind).kind(), kind);
        }
    }

    #[test]
    fn test_value_kind_deserializes_lowercase() {
        let kind: ValueKind = serde_json::from_str(r#""double""#).unwrap();
        assert_eq!(kind, ValueKind::Double);
        assert!(serde_json::from_str::<ValueKind>(r#""Double""#).is_err());
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Integer(-3).to_string(), "-3");
        assert_eq!(Value::Boolean(true).to_string(), "true");
        assert_eq!(Value::Char('q').to_string(), "q");
        assert_eq!(Value::String("a b".to_string()).to_string(), "a b");
    }

    #[test]
    fn test_value_serializes_untagged() {
        let json = serde_json::to_string(&vec![
            Value::Integer(1),
            Value::Boolean(false),
            Value::Char('c'),
            Value::String("s".to_string()),
        ])
        .unwrap();
        assert_eq!(json, r#"[1,false,"c","s"]"#);
    }
}
