// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;

use crate::traits::{Processor, ProcessorSpec};
use crate::typing::{matches, ArgMap, Signature, TypeMismatch, TypeSpec};

/// Returns its single `value` input verbatim.
///
/// Constant nodes are the usual way to feed per-item values into a graph:
/// `ProcessGraph::add_constant_node` wraps one of these, marks the node
/// passive, and wires `set_value` to the `value` argument. A value type may
/// be declared to reject bad `set_value` writes at validation time.
pub struct Constant {
    name: String,
    value_type: Option<TypeSpec>,
}

impl Constant {
    pub fn new(name: impl Into<String>) -> Self {
        Constant {
            name: name.into(),
            value_type: None,
        }
    }

    pub fn typed(name: impl Into<String>, value_type: TypeSpec) -> Self {
        Constant {
            name: name.into(),
            value_type: Some(value_type),
        }
    }

    pub fn spec(name: impl Into<String>) -> ProcessorSpec {
        let name = name.into();
        let display = name.clone();
        ProcessorSpec::new(name, move |_ctor| {
            Ok(Box::new(Constant::new(display.clone())) as Box<dyn Processor>)
        })
    }

    pub fn typed_spec(name: impl Into<String>, value_type: TypeSpec) -> ProcessorSpec {
        let name = name.into();
        let display = name.clone();
        ProcessorSpec::new(name, move |_ctor| {
            Ok(Box::new(Constant::typed(display.clone(), value_type.clone()))
                as Box<dyn Processor>)
        })
    }
}

#[async_trait]
impl Processor for Constant {
    fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> Signature {
        Signature::new().required("value", TypeSpec::Any)
    }

    async fn process(&mut self, mut args: ArgMap) -> anyhow::Result<Value> {
        let value = args.remove("value").unwrap_or(Value::Null);
        tracing::debug!(constant = %self.name, "constant is {}", value);
        Ok(value)
    }

    fn validate_args(&self, args: &ArgMap) -> Result<(), TypeMismatch> {
        let keys: Vec<&String> = args.keys().collect();
        if keys.len() != 1 || keys[0] != "value" {
            return Err(TypeMismatch(format!(
                "constants must have one 'value' argument, but found: {:?}",
                args.keys().collect::<Vec<_>>()
            )));
        }
        if let (Some(spec), Some(value)) = (&self.value_type, args.get("value")) {
            if !matches(value, spec) {
                return Err(TypeMismatch::not_matched(value, spec));
            }
        }
        Ok(())
    }
}
