// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::typing::{ArgMap, Signature, TypeMismatch};

/// A unit of user-supplied computation.
///
/// Implementations own whatever heavy state they need (loaded models,
/// subprocess handles); the graph creates them lazily through a
/// [`ProcessorSpec`] and treats each instance as non-reentrant.
///
/// `process` must return a JSON-representable value so results can live in
/// the human-readable state file. Large artifacts (rendered video, audio
/// stems) belong in external files, with the path returned here instead.
#[async_trait]
pub trait Processor: Send {
    fn name(&self) -> &str;

    /// The declared argument list of `process`, consumed by the default
    /// `validate_args`.
    fn signature(&self) -> Signature;

    async fn process(&mut self, args: ArgMap) -> anyhow::Result<Value>;

    /// Validates a named-argument bag before `process` is invoked.
    ///
    /// The default checks against `signature()`; override for processors
    /// with argument rules a flat signature cannot express.
    fn validate_args(&self, args: &ArgMap) -> Result<(), TypeMismatch> {
        self.signature().validate(args)
    }

    /// Use this to release resources, such as background servers.
    async fn finalize(&mut self) {}
}

/// Factory closure producing a fresh processor from constructor arguments.
pub type ProcessorFactory =
    Arc<dyn Fn(&ArgMap) -> anyhow::Result<Box<dyn Processor>> + Send + Sync>;

/// Descriptor of a processor handed to `add_node`.
///
/// Carries the display name (needed before any instance exists, and checked
/// against the persisted state at load time) and the factory invoked at most
/// once per graph lifetime until resources are released.
#[derive(Clone)]
pub struct ProcessorSpec {
    name: String,
    factory: ProcessorFactory,
}

impl ProcessorSpec {
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&ArgMap) -> anyhow::Result<Box<dyn Processor>> + Send + Sync + 'static,
    {
        ProcessorSpec {
            name: name.into(),
            factory: Arc::new(factory),
        }
    }

    pub fn from_factory(name: impl Into<String>, factory: ProcessorFactory) -> Self {
        ProcessorSpec {
            name: name.into(),
            factory,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn instantiate(&self, ctor_args: &ArgMap) -> anyhow::Result<Box<dyn Processor>> {
        (self.factory)(ctor_args)
    }
}

impl fmt::Debug for ProcessorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorSpec")
            .field("name", &self.name)
            .finish()
    }
}
