// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The per-node record kept by `ProcessGraph`.
//!
//! `GraphNode` is internal; user code holds a [`NodeHandle`] returned by
//! `add_node` and goes through the graph for everything else.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::FlowError;
use crate::flow::NodeId;
use crate::traits::{Processor, ProcessorSpec};
use crate::typing::ArgMap;

/// User-controlled label of a node's logic version. Bump it when the node
/// logic changes and cached results must be recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Version {
    Int(i64),
    Text(String),
}

impl Default for Version {
    fn default() -> Self {
        Version::Int(0)
    }
}

impl From<i64> for Version {
    fn from(v: i64) -> Self {
        Version::Int(v)
    }
}

impl From<&str> for Version {
    fn from(v: &str) -> Self {
        Version::Text(v.to_string())
    }
}

impl From<String> for Version {
    fn from(v: String) -> Self {
        Version::Text(v)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Int(v) => write!(f, "{}", v),
            Version::Text(v) => write!(f, "{:?}", v),
        }
    }
}

/// Returned by `add_node`. Usable as an input to other nodes and as the
/// address for every per-node graph operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub(crate) NodeId);

impl NodeHandle {
    pub fn id(&self) -> NodeId {
        self.0
    }
}

/// A node input: either a literal JSON value or the output of another node.
#[derive(Debug, Clone)]
pub enum Input {
    Literal(Value),
    Node(NodeHandle),
}

/// Named inputs for `add_node`, built fluently:
///
/// ```
/// use graphmill::flow::Inputs;
/// let inputs = Inputs::new().literal("a", 1).literal("b", 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Inputs(pub(crate) BTreeMap<String, Input>);

impl Inputs {
    pub fn new() -> Self {
        Inputs(BTreeMap::new())
    }

    /// Bind an argument to a literal value.
    pub fn literal(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), Input::Literal(value.into()));
        self
    }

    /// Bind an argument to the output of an upstream node.
    pub fn node(mut self, name: impl Into<String>, handle: NodeHandle) -> Self {
        self.0.insert(name.into(), Input::Node(handle));
        self
    }
}

/// Hook to manually override a node's computed result when a downstream
/// node reads it. Receives the original result and the node's filled-in
/// inputs; must return a result even when nothing changes.
///
/// Changes to overrides are not detected automatically; pair them with
/// `invalidate_before` when the override itself changes.
pub type OverrideFn = Arc<dyn Fn(&Value, &ArgMap) -> Value + Send + Sync>;

/// Optional knobs for `add_node_with`.
#[derive(Default)]
pub struct NodeOptions {
    /// Increment when the node logic changes and results must be recomputed.
    pub version: Version,
    /// Passed to the processor factory on first instantiation.
    pub constructor_args: ArgMap,
    /// Results computed before this epoch-seconds threshold are stale.
    /// Tip: use `date +%s` for the current time.
    pub invalidate_before: f64,
    /// Always recompute. Use sparingly; prefer `version` when possible.
    pub force: bool,
    /// Passive nodes always re-execute but never trigger downstream
    /// recomputation, even when their value changes. Useful for maintenance
    /// constants such as file paths.
    pub passive: bool,
    /// Which argument `set_value` writes.
    pub default_arg: Option<String>,
    /// Manual result override, applied when dependents read this node.
    pub override_fn: Option<OverrideFn>,
}

/// Internal per-node state. Access goes through `ProcessGraph`.
pub(crate) struct GraphNode {
    pub(crate) id: NodeId,
    pub(crate) version: Version,
    pub(crate) spec: ProcessorSpec,
    pub(crate) constructor_args: ArgMap,
    pub(crate) inputs: BTreeMap<String, Input>,
    pub(crate) invalidate_before: f64,
    pub(crate) passive: bool,
    pub(crate) default_arg: Option<String>,
    pub(crate) override_fn: Option<OverrideFn>,
    pub(crate) dry_run: bool,

    pub(crate) result: Value,
    pub(crate) result_version: Version,
    pub(crate) result_timestamp: Option<f64>,
    pub(crate) compute_time: Option<f64>,
    // Sticky: set when a dependent observed an override-changed value.
    pub(crate) was_overridden: bool,

    // Lazily created so loading persisted data never constructs processors.
    pub(crate) processor: Option<Box<dyn Processor>>,
}

impl GraphNode {
    pub(crate) fn new(
        id: NodeId,
        spec: ProcessorSpec,
        inputs: Inputs,
        options: NodeOptions,
        dry_run: bool,
    ) -> Self {
        GraphNode {
            id,
            version: options.version,
            spec,
            constructor_args: options.constructor_args,
            inputs: inputs.0,
            invalidate_before: options.invalidate_before,
            passive: options.passive,
            default_arg: options.default_arg,
            override_fn: options.override_fn,
            dry_run,
            result: Value::Null,
            result_version: Version::default(),
            result_timestamp: None,
            compute_time: None,
            was_overridden: false,
            processor: None,
        }
    }

    pub(crate) fn name(&self) -> &str {
        self.spec.name()
    }

    pub(crate) fn has_result(&self) -> bool {
        self.result_timestamp.is_some()
    }

    /// Drops cached result fields only; the processor instance survives.
    pub(crate) fn reset(&mut self) {
        self.result = Value::Null;
        self.result_timestamp = None;
        self.compute_time = None;
    }

    pub(crate) fn set(&mut self, arg: &str, value: Value) -> Result<(), FlowError> {
        match self.inputs.get_mut(arg) {
            Some(input) => {
                *input = Input::Literal(value);
                Ok(())
            }
            None => Err(FlowError::UnknownInput {
                id: self.id,
                arg: arg.to_string(),
            }),
        }
    }

    pub(crate) fn set_value(&mut self, value: Value) -> Result<(), FlowError> {
        match self.default_arg.clone() {
            Some(arg) => self.set(&arg, value),
            None => Err(FlowError::UnknownInput {
                id: self.id,
                arg: "<default>".to_string(),
            }),
        }
    }
}
