// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::traits::{Processor, ProcessorSpec};
use crate::typing::{ArgMap, Signature, TypeSpec};

/// Adds its two numeric inputs. Integer inputs produce an integer sum.
pub struct Sum;

impl Sum {
    pub fn spec() -> ProcessorSpec {
        ProcessorSpec::new("sum", |_ctor| Ok(Box::new(Sum) as Box<dyn Processor>))
    }
}

#[async_trait]
impl Processor for Sum {
    fn name(&self) -> &str {
        "sum"
    }

    fn signature(&self) -> Signature {
        Signature::new()
            .required("a", TypeSpec::Float)
            .required("b", TypeSpec::Float)
    }

    async fn process(&mut self, args: ArgMap) -> anyhow::Result<Value> {
        let a = args.get("a").cloned().unwrap_or(Value::Null);
        let b = args.get("b").cloned().unwrap_or(Value::Null);

        if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
            return Ok(json!(a + b));
        }
        match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => Ok(json!(a + b)),
            _ => anyhow::bail!("sum requires numeric 'a' and 'b' arguments"),
        }
    }
}
