//! Function signatures such as `sprite($map, $name, $offsetX: 0px)`.

use crate::error::{Result, SpriteError};
use crate::value::Value;

/// A declared parameter with an optional default.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub default: Option<Value>,
}

/// Parsed function signature.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub name: String,
    pub params: Vec<Param>,
}

impl Signature {
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = |message: &str| SpriteError::Arguments {
            function: text.to_string(),
            message: message.to_string(),
        };

        let open = text.find('(').ok_or_else(|| invalid("missing '('"))?;
        if !text.trim_end().ends_with(')') {
            return Err(invalid("missing ')'"));
        }
        let name = text[..open].trim();
        if name.is_empty() {
            return Err(invalid("missing function name"));
        }

        let body = &text[open + 1..text.trim_end().len() - 1];
        let mut params = Vec::new();
        for part in body.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (param, default) = match part.split_once(':') {
                Some((p, d)) => (p.trim(), Some(Value::parse_literal(d))),
                None => (part, None),
            };
            let param = param
                .strip_prefix('$')
                .ok_or_else(|| invalid("parameters must start with '$'"))?;
            if default.is_none() && params.iter().any(|p: &Param| p.default.is_some()) {
                return Err(invalid("required parameter after optional parameter"));
            }
            params.push(Param {
                name: param.to_string(),
                default,
            });
        }

        Ok(Signature {
            name: name.to_string(),
            params,
        })
    }

    /// Fill in defaults for omitted trailing arguments.
    pub fn bind(&self, args: &[Value]) -> Result<Vec<Value>> {
        if args.len() > self.params.len() {
            return Err(SpriteError::Arguments {
                function: self.name.clone(),
                message: format!(
                    "expected at most {} arguments, got {}",
                    self.params.len(),
                    args.len()
                ),
            });
        }

        let mut bound = args.to_vec();
        for param in &self.params[args.len()..] {
            match &param.default {
                Some(default) => bound.push(default.clone()),
                None => {
                    return Err(SpriteError::Arguments {
                        function: self.name.clone(),
                        message: format!("missing argument ${}", param.name),
                    })
                }
            }
        }
        Ok(bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Number;

    #[test]
    fn test_parse_signature_with_defaults() {
        let sig = Signature::parse("sprite($map, $name, $offsetX: 0px, $offsetY: 0px)").unwrap();
        assert_eq!(sig.name, "sprite");
        assert_eq!(sig.params.len(), 4);
        assert_eq!(sig.params[1].name, "name");
        assert_eq!(sig.params[1].default, None);
        assert_eq!(sig.params[2].default, Some(Value::Number(Number::px(0.0))));
    }

    #[test]
    fn test_parse_no_params() {
        let sig = Signature::parse("now()").unwrap();
        assert!(sig.params.is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(Signature::parse("sprite").is_err());
        assert!(Signature::parse("sprite($a").is_err());
        assert!(Signature::parse("sprite(a)").is_err());
        assert!(Signature::parse("sprite($a: 1, $b)").is_err());
    }

    #[test]
    fn test_bind_fills_defaults() {
        let sig = Signature::parse("sprite-map($glob, $spacing: 0px)").unwrap();
        let bound = sig.bind(&[Value::string("*.png")]).unwrap();
        assert_eq!(bound, vec![Value::string("*.png"), Value::Number(Number::px(0.0))]);
    }

    #[test]
    fn test_bind_missing_and_surplus() {
        let sig = Signature::parse("sprite-file($map, $name)").unwrap();
        let missing = sig.bind(&[Value::string("a")]).unwrap_err();
        assert_eq!(missing.to_string(), "sprite-file: missing argument $name");

        let surplus = sig
            .bind(&[Value::string("a"), Value::string("b"), Value::string("c")])
            .unwrap_err();
        assert!(matches!(surplus, SpriteError::Arguments { .. }));
    }
}
