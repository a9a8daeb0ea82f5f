// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;
use thiserror::Error;

use super::type_spec::{matches, TypeSpec};
use super::ArgMap;

/// Raised when a named-argument bag does not satisfy a declared signature.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct TypeMismatch(pub String);

impl TypeMismatch {
    pub fn not_matched(value: &Value, expected: &TypeSpec) -> Self {
        TypeMismatch(format!("type not matched: {} is not {}", value, expected))
    }

    pub fn unexpected_argument(name: &str) -> Self {
        TypeMismatch(format!("unexpected argument: {}", name))
    }

    pub fn missing_argument(name: &str) -> Self {
        TypeMismatch(format!("missing required argument: {}", name))
    }
}

/// One declared argument of a processor's `process` call.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub spec: TypeSpec,
    pub required: bool,
    pub default: Option<Value>,
}

/// An ordered argument list declared by a processor.
///
/// This is the stand-in for call-signature introspection: the default
/// `Processor::validate_args` binds the incoming argument bag against it,
/// rejecting unknown names, missing required arguments, and type mismatches.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    pub fn new() -> Self {
        Signature { params: Vec::new() }
    }

    /// Declare a required argument.
    pub fn required(mut self, name: impl Into<String>, spec: TypeSpec) -> Self {
        self.params.push(Param {
            name: name.into(),
            spec,
            required: true,
            default: None,
        });
        self
    }

    /// Declare an optional argument with a default value.
    pub fn optional(mut self, name: impl Into<String>, spec: TypeSpec, default: Value) -> Self {
        self.params.push(Param {
            name: name.into(),
            spec,
            required: false,
            default: Some(default),
        });
        self
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Binds `args` against the declared parameters.
    ///
    /// Defaults are validated in place of absent optional arguments, so a
    /// bad default surfaces at the first call rather than inside `process`.
    pub fn validate(&self, args: &ArgMap) -> Result<(), TypeMismatch> {
        for name in args.keys() {
            if !self.params.iter().any(|p| p.name == *name) {
                return Err(TypeMismatch::unexpected_argument(name));
            }
        }

        for param in &self.params {
            let bound = match args.get(&param.name) {
                Some(value) => value,
                None if param.required => {
                    return Err(TypeMismatch::missing_argument(&param.name));
                }
                None => match &param.default {
                    Some(default) => default,
                    None => continue,
                },
            };
            if !matches(bound, &param.spec) {
                return Err(TypeMismatch::not_matched(bound, &param.spec));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(pairs: &[(&str, Value)]) -> ArgMap {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    fn sum_signature() -> Signature {
        Signature::new()
            .required("a", TypeSpec::Int)
            .required("b", TypeSpec::Int)
    }

    #[test]
    fn test_validate_accepts_matching_args() {
        let sig = sum_signature();
        assert!(sig.validate(&args(&[("a", json!(1)), ("b", json!(2))])).is_ok());
    }

    #[test]
    fn test_validate_rejects_wrong_type() {
        let sig = sum_signature();
        let err = sig
            .validate(&args(&[("a", json!(1)), ("b", json!([2]))]))
            .unwrap_err();
        assert!(err.to_string().contains("is not int"));
    }

    #[test]
    fn test_validate_rejects_unknown_argument() {
        let sig = sum_signature();
        let err = sig
            .validate(&args(&[("a", json!(1)), ("b", json!(2)), ("c", json!(3))]))
            .unwrap_err();
        assert_eq!(err, TypeMismatch::unexpected_argument("c"));
    }

    #[test]
    fn test_validate_rejects_missing_required() {
        let sig = sum_signature();
        let err = sig.validate(&args(&[("a", json!(1))])).unwrap_err();
        assert_eq!(err, TypeMismatch::missing_argument("b"));
    }

    #[test]
    fn test_optional_argument_uses_default() {
        let sig = Signature::new()
            .required("text", TypeSpec::Str)
            .optional("repeat", TypeSpec::Int, json!(1));
        assert!(sig.validate(&args(&[("text", json!("hi"))])).is_ok());
        assert!(sig
            .validate(&args(&[("text", json!("hi")), ("repeat", json!(3))]))
            .is_ok());
        assert!(sig
            .validate(&args(&[("text", json!("hi")), ("repeat", json!("3"))]))
            .is_err());
    }
}
