// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;

use crate::traits::{Processor, ProcessorSpec};
use crate::typing::{ArgMap, Signature, TypeSpec};

/// Converts its `text` input to a different case.
///
/// The mode comes from the `mode` constructor argument: "upper", "lower" or
/// "proper" (first letter of each word capitalized).
pub struct ChangeCase {
    mode: String,
}

impl ChangeCase {
    pub fn new(mode: impl Into<String>) -> Self {
        ChangeCase { mode: mode.into() }
    }

    pub fn spec() -> ProcessorSpec {
        ProcessorSpec::new("change_case", |ctor: &ArgMap| {
            let mode = ctor
                .get("mode")
                .and_then(Value::as_str)
                .unwrap_or("upper")
                .to_string();
            match mode.as_str() {
                "upper" | "lower" | "proper" => {}
                other => anyhow::bail!("unknown case mode: {}", other),
            }
            Ok(Box::new(ChangeCase::new(mode)) as Box<dyn Processor>)
        })
    }

    fn proper_case(text: &str) -> String {
        text.split_whitespace()
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => {
                        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                    }
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl Processor for ChangeCase {
    fn name(&self) -> &str {
        "change_case"
    }

    fn signature(&self) -> Signature {
        Signature::new().required("text", TypeSpec::Str)
    }

    async fn process(&mut self, args: ArgMap) -> anyhow::Result<Value> {
        let text = args
            .get("text")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow::anyhow!("missing 'text' argument"))?;

        let result = match self.mode.as_str() {
            "upper" => text.to_uppercase(),
            "lower" => text.to_lowercase(),
            "proper" => Self::proper_case(text),
            other => anyhow::bail!("unknown case mode: {}", other),
        };

        Ok(Value::String(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text_args(text: &str) -> ArgMap {
        [("text".to_string(), json!(text))].into_iter().collect()
    }

    #[tokio::test]
    async fn test_upper_and_lower() {
        let mut upper = ChangeCase::new("upper");
        assert_eq!(
            upper.process(text_args("hello world")).await.unwrap(),
            json!("HELLO WORLD")
        );

        let mut lower = ChangeCase::new("lower");
        assert_eq!(
            lower.process(text_args("HELLO")).await.unwrap(),
            json!("hello")
        );
    }

    #[tokio::test]
    async fn test_proper_case() {
        let mut proper = ChangeCase::new("proper");
        assert_eq!(
            proper.process(text_args("the quick BROWN fox")).await.unwrap(),
            json!("The Quick Brown Fox")
        );
    }

    #[test]
    fn test_spec_rejects_unknown_mode() {
        let ctor: ArgMap = [("mode".to_string(), json!("sponge"))].into_iter().collect();
        assert!(ChangeCase::spec().instantiate(&ctor).is_err());
    }
}
