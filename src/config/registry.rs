// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;

use crate::processors::{ChangeCase, Sum};
use crate::traits::{Processor, ProcessorFactory, ProcessorSpec};
use crate::typing::ArgMap;

/// Resolves processor names from pipeline configs into runtime factories.
///
/// Domain crates register their processors here; `with_builtins` seeds the
/// small set shipped with the engine. The `constant` processor is resolved
/// by the graph builder itself, since each constant node carries its own
/// display name.
pub struct ProcessorRegistry {
    factories: HashMap<String, ProcessorFactory>,
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        ProcessorRegistry {
            factories: HashMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("change_case", move |ctor: &ArgMap| {
            ChangeCase::spec().instantiate(ctor)
        });
        registry.register("sum", move |ctor: &ArgMap| Sum::spec().instantiate(ctor));
        registry
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&ArgMap) -> anyhow::Result<Box<dyn Processor>> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// A `ProcessorSpec` for the named processor, if registered.
    pub fn spec_for(&self, name: &str) -> Option<ProcessorSpec> {
        self.factories
            .get(name)
            .map(|factory| ProcessorSpec::from_factory(name, factory.clone()))
    }
}
