//! Values exchanged with the stylesheet engine.
//!
//! Arguments arrive already decoded as [`Value`]s; results go back the same
//! way and are rendered to CSS text with `Display`.

use std::fmt;

use crate::error::{Result, SpriteError};

/// A number with an optional unit, e.g. `12px` or `3`.
#[derive(Debug, Clone, PartialEq)]
pub struct Number {
    pub value: f64,
    pub unit: Option<String>,
}

impl Number {
    pub fn new(value: f64, unit: Option<&str>) -> Self {
        Self {
            value,
            unit: unit.map(str::to_string),
        }
    }

    pub fn unitless(value: f64) -> Self {
        Self::new(value, None)
    }

    pub fn px(value: f64) -> Self {
        Self::new(value, Some("px"))
    }

    /// Add two lengths. Both sides need a unit and the units must match.
    pub fn checked_add(&self, other: &Number) -> Result<Number> {
        match (&self.unit, &other.unit) {
            (Some(a), Some(b)) if a == b => Ok(Number {
                value: self.value + other.value,
                unit: Some(a.clone()),
            }),
            (Some(_), Some(_)) => Err(SpriteError::IncompatibleUnits {
                left: self.to_string(),
                right: other.to_string(),
            }),
            _ => Err(SpriteError::MissingUnit),
        }
    }

    /// Parse a literal such as `0px`, `-2.5em` or `10`.
    pub fn parse(text: &str) -> Option<Number> {
        let text = text.trim();
        let split = text
            .char_indices()
            .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
            .map_or(text.len(), |(i, _)| i);
        let (digits, unit) = text.split_at(split);
        let value: f64 = digits.parse().ok()?;
        let unit = (!unit.is_empty()).then_some(unit);
        if let Some(u) = unit {
            if !(u == "%" || u.chars().all(|c| c.is_ascii_alphabetic())) {
                return None;
            }
        }
        Some(Number::new(value, unit))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.unit.as_deref().unwrap_or("");
        write!(f, "{}{}", format_number(self.value), unit)
    }
}

/// Format like CSS output: no trailing zeros, at most five decimals, no `-0`.
fn format_number(value: f64) -> String {
    let rounded = (value * 100_000.0).round() / 100_000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    if rounded.fract() == 0.0 {
        return format!("{:.0}", rounded);
    }
    let text = format!("{:.5}", rounded);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// A value passed to or returned from a stylesheet function.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(Number),
    List(Vec<Value>),
    Null,
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::List(_) => "list",
            Value::Null => "null",
        }
    }

    /// Parse a default-argument literal: a number, or a (possibly quoted) string.
    pub fn parse_literal(text: &str) -> Value {
        let text = text.trim();
        if text == "null" {
            return Value::Null;
        }
        match Number::parse(text) {
            Some(n) => Value::Number(n),
            None => Value::String(unquote(text).to_string()),
        }
    }

    fn describe(&self) -> String {
        format!("{} value: {}", self.type_name(), self)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Number(n) => write!(f, "{}", n),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            Value::Null => Ok(()),
        }
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

/// Strip one level of matching single or double quotes.
pub fn unquote(text: &str) -> &str {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &text[1..text.len() - 1];
        }
    }
    text
}

/// Conversion from an argument [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self>;
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(SpriteError::InvalidType {
                expected: "string",
                found: other.describe(),
            }),
        }
    }
}

impl FromValue for Number {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Number(n) => Ok(n.clone()),
            other => Err(SpriteError::InvalidType {
                expected: "number",
                found: other.describe(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_matching_units() {
        let sum = Number::px(-10.0).checked_add(&Number::px(2.0)).unwrap();
        assert_eq!(sum, Number::px(-8.0));
        assert_eq!(sum.to_string(), "-8px");
    }

    #[test]
    fn test_add_without_unit_is_missing_unit() {
        let err = Number::px(-10.0).checked_add(&Number::unitless(2.0)).unwrap_err();
        assert!(matches!(err, SpriteError::MissingUnit));

        let err = Number::unitless(1.0).checked_add(&Number::unitless(2.0)).unwrap_err();
        assert!(matches!(err, SpriteError::MissingUnit));
    }

    #[test]
    fn test_add_mismatched_units() {
        let err = Number::px(1.0).checked_add(&Number::new(1.0, Some("em"))).unwrap_err();
        assert!(matches!(err, SpriteError::IncompatibleUnits { .. }));
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(Number::px(-0.0).to_string(), "0px");
        assert_eq!(Number::px(-20.0).to_string(), "-20px");
        assert_eq!(Number::new(1.5, Some("em")).to_string(), "1.5em");
        assert_eq!(Number::unitless(1.0 / 3.0).to_string(), "0.33333");
    }

    #[test]
    fn test_number_parse() {
        assert_eq!(Number::parse("0px"), Some(Number::px(0.0)));
        assert_eq!(Number::parse("-2.5em"), Some(Number::new(-2.5, Some("em"))));
        assert_eq!(Number::parse("12"), Some(Number::unitless(12.0)));
        assert_eq!(Number::parse("50%"), Some(Number::new(50.0, Some("%"))));
        assert_eq!(Number::parse("px"), None);
        assert_eq!(Number::parse("img/*.png"), None);
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(Value::parse_literal("0px"), Value::Number(Number::px(0.0)));
        assert_eq!(Value::parse_literal("\"a b\""), Value::string("a b"));
        assert_eq!(Value::parse_literal("null"), Value::Null);
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"img/*.png\""), "img/*.png");
        assert_eq!(unquote("'x'"), "x");
        assert_eq!(unquote("plain"), "plain");
        assert_eq!(unquote("\""), "\"");
    }

    #[test]
    fn test_list_display() {
        let list = Value::List(vec![Number::px(0.0).into(), Number::px(-20.0).into()]);
        assert_eq!(list.to_string(), "0px -20px");
    }

    #[test]
    fn test_from_value_type_mismatch() {
        let err = String::from_value(&Value::Number(Number::px(5.0))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid type expected: string got: number value: 5px"
        );
        assert!(Number::from_value(&Value::string("a")).is_err());
    }
}
