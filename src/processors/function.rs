// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::traits::{Processor, ProcessorSpec};
use crate::typing::{ArgMap, Signature, TypeMismatch};

type WrappedFn = Arc<dyn Fn(&ArgMap) -> anyhow::Result<Value> + Send + Sync>;

/// Wraps a plain closure as a processor.
///
/// All named inputs are forwarded as-is and argument validation is a no-op,
/// so the closure is responsible for interpreting its own argument bag.
pub struct Function {
    name: String,
    func: WrappedFn,
}

impl Function {
    pub fn spec<F>(name: impl Into<String>, func: F) -> ProcessorSpec
    where
        F: Fn(&ArgMap) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        let display = name.clone();
        let func: WrappedFn = Arc::new(func);
        ProcessorSpec::new(name, move |_ctor| {
            Ok(Box::new(Function {
                name: display.clone(),
                func: func.clone(),
            }) as Box<dyn Processor>)
        })
    }
}

#[async_trait]
impl Processor for Function {
    fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> Signature {
        Signature::new()
    }

    async fn process(&mut self, args: ArgMap) -> anyhow::Result<Value> {
        (self.func)(&args)
    }

    fn validate_args(&self, _args: &ArgMap) -> Result<(), TypeMismatch> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_function_forwards_named_inputs() {
        let spec = Function::spec("join_words", |args: &ArgMap| {
            let first = args.get("first").and_then(Value::as_str).unwrap_or("");
            let second = args.get("second").and_then(Value::as_str).unwrap_or("");
            Ok(json!(format!("{} {}", first, second)))
        });
        assert_eq!(spec.name(), "join_words");

        let mut processor = spec.instantiate(&ArgMap::new()).unwrap();
        let args: ArgMap = [
            ("first".to_string(), json!("hello")),
            ("second".to_string(), json!("world")),
        ]
        .into_iter()
        .collect();
        assert_eq!(processor.process(args).await.unwrap(), json!("hello world"));
    }

    #[tokio::test]
    async fn test_function_validation_accepts_anything() {
        let spec = Function::spec("noop", |_args: &ArgMap| Ok(Value::Null));
        let processor = spec.instantiate(&ArgMap::new()).unwrap();

        let args: ArgMap = [("anything".to_string(), json!([1, 2, 3]))]
            .into_iter()
            .collect();
        assert!(processor.validate_args(&args).is_ok());
    }
}
