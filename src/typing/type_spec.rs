// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

use serde_json::Value;

/// Describes the shape a JSON value is expected to take.
///
/// Because inputs and results round-trip through JSON, a few coercions are
/// deliberate:
/// - `Float` accepts integers (but never booleans),
/// - `Tuple` accepts an array of exactly the declared length, since JSON has
///   no tuple shape of its own,
/// - `Set` accepts an array with pairwise-distinct elements for the same
///   reason.
///
/// The reverse coercions are not allowed: `Int` rejects `1.0`, and `Bool`
/// never matches a number.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeSpec {
    /// Matches anything, including null.
    Any,
    Null,
    Bool,
    Int,
    Float,
    Str,
    /// A homogeneous array; `None` skips the element check.
    List(Option<Box<TypeSpec>>),
    /// An array with pairwise-distinct elements; `None` skips the element check.
    Set(Option<Box<TypeSpec>>),
    /// An object whose keys match the first spec and values the second.
    Map(Box<TypeSpec>, Box<TypeSpec>),
    /// A fixed-length array with positional element specs.
    Tuple(Vec<TypeSpec>),
    /// Matches if any branch matches.
    Union(Vec<TypeSpec>),
    /// An object with named, typed fields. Extra keys are permitted.
    Record(Vec<(String, TypeSpec)>),
    /// An enumeration given by the underlying values of its members.
    Enum(Vec<Value>),
}

impl TypeSpec {
    pub fn list_of(inner: TypeSpec) -> TypeSpec {
        TypeSpec::List(Some(Box::new(inner)))
    }

    pub fn set_of(inner: TypeSpec) -> TypeSpec {
        TypeSpec::Set(Some(Box::new(inner)))
    }

    pub fn map_of(key: TypeSpec, value: TypeSpec) -> TypeSpec {
        TypeSpec::Map(Box::new(key), Box::new(value))
    }

    pub fn tuple_of(items: impl IntoIterator<Item = TypeSpec>) -> TypeSpec {
        TypeSpec::Tuple(items.into_iter().collect())
    }

    pub fn union_of(branches: impl IntoIterator<Item = TypeSpec>) -> TypeSpec {
        TypeSpec::Union(branches.into_iter().collect())
    }

    pub fn record_of<S: Into<String>>(
        fields: impl IntoIterator<Item = (S, TypeSpec)>,
    ) -> TypeSpec {
        TypeSpec::Record(
            fields
                .into_iter()
                .map(|(name, spec)| (name.into(), spec))
                .collect(),
        )
    }

    pub fn enum_of(members: impl IntoIterator<Item = Value>) -> TypeSpec {
        TypeSpec::Enum(members.into_iter().collect())
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSpec::Any => write!(f, "any"),
            TypeSpec::Null => write!(f, "null"),
            TypeSpec::Bool => write!(f, "bool"),
            TypeSpec::Int => write!(f, "int"),
            TypeSpec::Float => write!(f, "float"),
            TypeSpec::Str => write!(f, "str"),
            TypeSpec::List(None) => write!(f, "list"),
            TypeSpec::List(Some(inner)) => write!(f, "list[{}]", inner),
            TypeSpec::Set(None) => write!(f, "set"),
            TypeSpec::Set(Some(inner)) => write!(f, "set[{}]", inner),
            TypeSpec::Map(key, value) => write!(f, "map[{}, {}]", key, value),
            TypeSpec::Tuple(items) => {
                let parts: Vec<String> = items.iter().map(|s| s.to_string()).collect();
                write!(f, "tuple[{}]", parts.join(", "))
            }
            TypeSpec::Union(branches) => {
                let parts: Vec<String> = branches.iter().map(|s| s.to_string()).collect();
                write!(f, "{}", parts.join(" | "))
            }
            TypeSpec::Record(fields) => {
                let parts: Vec<String> = fields
                    .iter()
                    .map(|(name, spec)| format!("{}: {}", name, spec))
                    .collect();
                write!(f, "record{{{}}}", parts.join(", "))
            }
            TypeSpec::Enum(members) => {
                let parts: Vec<String> = members.iter().map(|m| m.to_string()).collect();
                write!(f, "enum{{{}}}", parts.join(", "))
            }
        }
    }
}

/// Checks whether `value` matches `spec`. Never fails; a malformed
/// combination simply does not match.
pub fn matches(value: &Value, spec: &TypeSpec) -> bool {
    match spec {
        TypeSpec::Any => true,
        TypeSpec::Null => value.is_null(),
        TypeSpec::Bool => value.is_boolean(),
        // JSON numbers are never booleans, so no explicit bool exclusion is
        // needed; 1.0 stays a float and does not match Int.
        TypeSpec::Int => value.as_i64().is_some() || value.as_u64().is_some(),
        TypeSpec::Float => value.is_number(),
        TypeSpec::Str => value.is_string(),
        TypeSpec::List(inner) => match value.as_array() {
            Some(items) => match inner {
                Some(spec) => items.iter().all(|item| matches(item, spec)),
                None => true,
            },
            None => false,
        },
        TypeSpec::Set(inner) => match value.as_array() {
            Some(items) => {
                let distinct = items
                    .iter()
                    .enumerate()
                    .all(|(i, item)| !items[..i].contains(item));
                let typed = match inner {
                    Some(spec) => items.iter().all(|item| matches(item, spec)),
                    None => true,
                };
                distinct && typed
            }
            None => false,
        },
        TypeSpec::Map(key_spec, value_spec) => match value.as_object() {
            Some(entries) => entries.iter().all(|(key, val)| {
                matches(&Value::String(key.clone()), key_spec) && matches(val, value_spec)
            }),
            None => false,
        },
        TypeSpec::Tuple(items) => match value.as_array() {
            Some(values) => {
                values.len() == items.len()
                    && values
                        .iter()
                        .zip(items.iter())
                        .all(|(val, spec)| matches(val, spec))
            }
            None => false,
        },
        TypeSpec::Union(branches) => branches.iter().any(|branch| matches(value, branch)),
        TypeSpec::Record(fields) => match value.as_object() {
            Some(entries) => fields.iter().all(|(name, spec)| {
                entries
                    .get(name)
                    .map(|val| matches(val, spec))
                    .unwrap_or(false)
            }),
            None => false,
        },
        TypeSpec::Enum(members) => members.iter().any(|member| member == value),
    }
}
