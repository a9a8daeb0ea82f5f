// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! `ProcessGraph`: the node registry and both traversal disciplines.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde_json::Value;

use crate::errors::FlowError;
use crate::flow::node::GraphNode;
use crate::flow::{algorithms, epoch_now, persist, NodeId};
use crate::flow::{Input, Inputs, NodeHandle, NodeOptions, OverrideFn, Version};
use crate::observability::messages::graph::{
    BatchCompleted, BatchItemFailed, BatchItemSkipped, BatchStarted, RunCompleted, RunStarted,
};
use crate::observability::messages::node::{
    NodeCached, NodeRefreshing, NodeResourcesReleased, NodeStale, OverrideChangedOutput,
    OverrideUnchanged,
};
use crate::observability::messages::persistence::StateLoaded;
use crate::observability::messages::persistence::StateSaved;
use crate::observability::messages::StructuredLog;
use crate::processors::Constant;
use crate::traits::ProcessorSpec;
use crate::typing::ArgMap;

// `force` recomputes anything done before 100 years from now.
const FORCE_HORIZON_SECS: f64 = 100.0 * 365.0 * 24.0 * 60.0 * 60.0;

/// Information collected on items that fail during `process_batch`.
#[derive(Debug)]
pub struct BatchFailure<T> {
    pub item_index: usize,
    pub item: T,
    pub failed_node: NodeHandle,
    pub error: FlowError,
}

/// Returned by `process_batch`.
#[derive(Debug)]
pub struct BatchStats<T> {
    /// Number of items on which all nodes succeeded.
    pub completed: usize,
    pub failures: Vec<BatchFailure<T>>,
}

/// Knobs for `process_batch`.
pub struct BatchOptions<'a> {
    /// Nodes holding heavy resources; after each of these finishes its item
    /// column, all resources are released before moving on.
    pub release_resources_after: &'a [NodeHandle],
    /// If true, a failing item is quarantined and the rest of the batch
    /// continues; if false, the first processor failure aborts the batch.
    pub fault_tolerant: bool,
}

impl Default for BatchOptions<'_> {
    fn default() -> Self {
        BatchOptions {
            release_resources_after: &[],
            fault_tolerant: true,
        }
    }
}

/// An incremental DAG of processor nodes with cached, persisted results.
pub struct ProcessGraph {
    dry_run: bool,
    nodes: BTreeMap<NodeId, GraphNode>,
    // Kept alongside the per-node input maps for traversal planning.
    dependencies: BTreeMap<NodeId, BTreeSet<NodeId>>,
    auto_save_path: Option<PathBuf>,
}

impl Default for ProcessGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProcessGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessGraph")
            .field("dry_run", &self.dry_run)
            .field("node_ids", &self.nodes.keys().collect::<Vec<_>>())
            .field("dependencies", &self.dependencies)
            .field("auto_save_path", &self.auto_save_path)
            .finish()
    }
}

impl ProcessGraph {
    pub fn new() -> Self {
        ProcessGraph {
            dry_run: false,
            nodes: BTreeMap::new(),
            dependencies: BTreeMap::new(),
            auto_save_path: None,
        }
    }

    /// A graph that never instantiates processors, never calls `process`,
    /// and never writes state files. Useful for inspecting traversal plans.
    pub fn new_dry_run() -> Self {
        ProcessGraph {
            dry_run: true,
            ..Self::new()
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn node(&self, id: NodeId) -> Result<&GraphNode, FlowError> {
        self.nodes.get(&id).ok_or(FlowError::UnknownNode { id })
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut GraphNode, FlowError> {
        self.nodes.get_mut(&id).ok_or(FlowError::UnknownNode { id })
    }

    /// Adds a processor node with default options.
    pub fn add_node(
        &mut self,
        id: NodeId,
        spec: ProcessorSpec,
        inputs: Inputs,
    ) -> Result<NodeHandle, FlowError> {
        self.add_node_with(id, spec, inputs, NodeOptions::default())
    }

    /// Adds a processor node to the graph.
    ///
    /// Inputs that reference other nodes become dependencies; their current
    /// results are filled in when this node runs. The returned handle can be
    /// passed to other nodes as an input.
    pub fn add_node_with(
        &mut self,
        id: NodeId,
        spec: ProcessorSpec,
        inputs: Inputs,
        mut options: NodeOptions,
    ) -> Result<NodeHandle, FlowError> {
        if self.nodes.contains_key(&id) {
            return Err(FlowError::UnicityViolation { id });
        }

        let mut deps = BTreeSet::new();
        for input in inputs.0.values() {
            if let Input::Node(handle) = input {
                if !self.nodes.contains_key(&handle.id()) {
                    return Err(FlowError::UnknownNode { id: handle.id() });
                }
                deps.insert(handle.id());
            }
        }

        if options.force {
            options.invalidate_before = epoch_now() + FORCE_HORIZON_SECS;
        }

        self.dependencies.insert(id, deps);
        self.nodes
            .insert(id, GraphNode::new(id, spec, inputs, options, self.dry_run));
        Ok(NodeHandle(id))
    }

    /// Convenience for wrapping a value. The node is passive (always re-run,
    /// never invalidating dependents) and `set_value` writes its `value`
    /// input.
    pub fn add_constant_node(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<NodeHandle, FlowError> {
        self.add_node_with(
            id,
            Constant::spec(name),
            Inputs::new().literal("value", value),
            NodeOptions {
                passive: true,
                default_arg: Some("value".to_string()),
                ..NodeOptions::default()
            },
        )
    }

    /// Overwrites a named input with a literal value.
    pub fn set(
        &mut self,
        handle: NodeHandle,
        arg: &str,
        value: impl Into<Value>,
    ) -> Result<(), FlowError> {
        self.node_mut(handle.id())?.set(arg, value.into())
    }

    /// Overwrites the node's default argument (see `NodeOptions::default_arg`).
    pub fn set_value(&mut self, handle: NodeHandle, value: impl Into<Value>) -> Result<(), FlowError> {
        self.node_mut(handle.id())?.set_value(value.into())
    }

    /// Relabels the node's logic version, marking its cached result stale.
    pub fn set_version(
        &mut self,
        handle: NodeHandle,
        version: impl Into<Version>,
    ) -> Result<(), FlowError> {
        self.node_mut(handle.id())?.version = version.into();
        Ok(())
    }

    /// Installs a manual override applied whenever dependents read this node.
    pub fn set_override(&mut self, handle: NodeHandle, override_fn: OverrideFn) -> Result<(), FlowError> {
        self.node_mut(handle.id())?.override_fn = Some(override_fn);
        Ok(())
    }

    /// Drops one node's cached result.
    pub fn reset_node(&mut self, handle: NodeHandle) -> Result<(), FlowError> {
        self.node_mut(handle.id())?.reset();
        Ok(())
    }

    pub fn handle(&self, id: NodeId) -> Option<NodeHandle> {
        self.nodes.contains_key(&id).then_some(NodeHandle(id))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_name(&self, handle: NodeHandle) -> Option<&str> {
        self.nodes.get(&handle.id()).map(|node| node.name())
    }

    pub fn has_result(&self, handle: NodeHandle) -> bool {
        self.nodes
            .get(&handle.id())
            .map(|node| node.has_result())
            .unwrap_or(false)
    }

    /// The node's cached result, if any.
    pub fn result(&self, handle: NodeHandle) -> Option<&Value> {
        let node = self.nodes.get(&handle.id())?;
        node.has_result().then_some(&node.result)
    }

    pub fn result_timestamp(&self, handle: NodeHandle) -> Option<f64> {
        self.nodes.get(&handle.id())?.result_timestamp
    }

    pub fn compute_time(&self, handle: NodeHandle) -> Option<f64> {
        self.nodes.get(&handle.id())?.compute_time
    }

    pub fn version(&self, handle: NodeHandle) -> Option<&Version> {
        self.nodes.get(&handle.id()).map(|node| &node.version)
    }

    /// The dependency adjacency map: node id to the ids it depends on.
    pub fn dependency_map(&self) -> &BTreeMap<NodeId, BTreeSet<NodeId>> {
        &self.dependencies
    }

    /// Nodes no other node depends on.
    pub fn sinks(&self) -> Vec<NodeHandle> {
        let mut referenced: BTreeSet<NodeId> = BTreeSet::new();
        for deps in self.dependencies.values() {
            referenced.extend(deps.iter().copied());
        }
        self.nodes
            .keys()
            .filter(|id| !referenced.contains(id))
            .map(|id| NodeHandle(*id))
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn set_result_timestamp(&mut self, handle: NodeHandle, timestamp: f64) {
        if let Some(node) = self.nodes.get_mut(&handle.id()) {
            node.result_timestamp = Some(timestamp);
        }
    }

    /// Clears cached results on every node.
    pub fn reset(&mut self) {
        for node in self.nodes.values_mut() {
            node.reset();
        }
    }

    /// Finalizes and drops every processor instance, then clears cached
    /// results. Heavy state (models, VRAM) is freed here.
    pub async fn release_resources(&mut self) {
        for node in self.nodes.values_mut() {
            if let Some(mut processor) = node.processor.take() {
                NodeResourcesReleased {
                    node_id: node.id,
                    name: node.spec.name(),
                }
                .log();
                processor.finalize().await;
            }
            node.reset();
        }
    }

    /// Binds a state file and rehydrates any results already stored there.
    ///
    /// Must be called before any computation so cached in-memory results
    /// never shadow what is on disk. Node ids present in the file but not in
    /// the graph are skipped; the graph may have grown since the save.
    pub fn persist(&mut self, path: impl Into<PathBuf>) -> Result<(), FlowError> {
        let path = path.into();
        self.reset();
        if let Some(document) = persist::read_document(&path)? {
            let loaded = self.load_results_dict(&document);
            StateLoaded {
                path: &path,
                loaded,
                total: self.nodes.len(),
            }
            .log();
        }
        self.auto_save_path = Some(path);
        Ok(())
    }

    /// Current results keyed by string-encoded node id, in the persisted
    /// document shape.
    pub fn results_dict(&self) -> serde_json::Map<String, Value> {
        let mut results = serde_json::Map::new();
        for (id, node) in &self.nodes {
            if !node.has_result() {
                continue;
            }
            match serde_json::to_value(persist::to_record(node)) {
                Ok(record) => {
                    results.insert(id.to_string(), record);
                }
                Err(err) => {
                    tracing::error!(node_id = id, error = %err, "failed to serialize node record")
                }
            }
        }
        results
    }

    /// Rehydrates results from a persisted document. Returns how many nodes
    /// were loaded.
    pub fn load_results_dict(&mut self, results: &serde_json::Map<String, Value>) -> usize {
        let mut loaded = 0;
        for (id_key, record_value) in results {
            // Keys become strings in the on-disk document; parse back to ids.
            let node_id: NodeId = match id_key.parse() {
                Ok(id) => id,
                Err(_) => {
                    tracing::warn!(key = %id_key, "ignoring non-integer node id in state document");
                    continue;
                }
            };
            let Some(node) = self.nodes.get_mut(&node_id) else {
                continue;
            };
            match serde_json::from_value::<persist::PersistedNode>(record_value.clone()) {
                Ok(record) => {
                    persist::apply_record(node, &record);
                    loaded += 1;
                }
                Err(err) => {
                    tracing::warn!(node_id, error = %err, "ignoring malformed state record")
                }
            }
        }
        loaded
    }

    fn save_to(&self, path: &Path) -> Result<(), FlowError> {
        if self.dry_run {
            return Ok(());
        }
        let document = self.results_dict();
        StateSaved {
            path,
            node_count: document.len(),
        }
        .log();
        persist::write_document(path, &document)
    }

    // The result callback: fired after every refresh with a flag telling
    // whether the value actually changed.
    fn record_result(&mut self, id: NodeId, value_changed: bool) -> Result<(), FlowError> {
        tracing::debug!(node_id = id, value_changed, "node result recorded");
        if let Some(path) = self.auto_save_path.clone() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    /// The topological execution order for the subgraph reachable from
    /// `final_nodes`.
    pub fn execution_order(&self, final_nodes: &[NodeHandle]) -> Result<Vec<NodeId>, FlowError> {
        let mut targets = BTreeSet::new();
        for handle in final_nodes {
            if !self.nodes.contains_key(&handle.id()) {
                return Err(FlowError::UnknownNode { id: handle.id() });
            }
            targets.insert(handle.id());
        }
        algorithms::topo_sort_subgraph(&targets, &self.dependencies)
    }

    /// Runs every node reachable from `final_nodes` in dependency order and
    /// returns the last result. Nodes with trustworthy cached results are
    /// not recomputed.
    pub async fn run_upto(&mut self, final_nodes: &[NodeHandle]) -> Result<Value, FlowError> {
        let order = self.execution_order(final_nodes)?;
        RunStarted {
            target_count: final_nodes.len(),
            node_count: order.len(),
        }
        .log();
        let started = Instant::now();

        let mut last_result = Value::Null;
        for id in &order {
            last_result = self.run_node(*id).await?;
        }

        RunCompleted {
            node_count: order.len(),
            duration: started.elapsed(),
        }
        .log();
        Ok(last_result)
    }

    /// Runs a single node: refresh if stale, otherwise return the cache.
    /// Dependencies are NOT recursed into; traversals order them first.
    async fn run_node(&mut self, id: NodeId) -> Result<Value, FlowError> {
        if self.needs_update(id)? {
            NodeRefreshing {
                node_id: id,
                name: self.node(id)?.name(),
            }
            .log();
            self.refresh_result(id).await?;
        } else {
            NodeCached {
                node_id: id,
                name: self.node(id)?.name(),
            }
            .log();
        }
        Ok(self.node(id)?.result.clone())
    }

    /// The staleness rule. Evaluated strictly in this order: passive, no
    /// result, version change, timestamp cutoff, newer non-passive upstream.
    fn needs_update(&self, id: NodeId) -> Result<bool, FlowError> {
        let node = self.node(id)?;

        if node.passive {
            return Ok(true);
        }

        let Some(timestamp) = node.result_timestamp else {
            NodeStale {
                node_id: id,
                name: node.name(),
                reason: "no result".to_string(),
            }
            .log();
            return Ok(true);
        };

        if node.result_version != node.version {
            NodeStale {
                node_id: id,
                name: node.name(),
                reason: format!("version {} != {}", node.result_version, node.version),
            }
            .log();
            return Ok(true);
        }

        if timestamp < node.invalidate_before {
            NodeStale {
                node_id: id,
                name: node.name(),
                reason: format!("timestamp {} < {}", timestamp, node.invalidate_before),
            }
            .log();
            return Ok(true);
        }

        for input in node.inputs.values() {
            let Input::Node(handle) = input else {
                continue;
            };
            let Some(dep) = self.nodes.get(&handle.id()) else {
                continue;
            };
            if dep.passive {
                continue;
            }
            if let Some(dep_timestamp) = dep.result_timestamp {
                if dep_timestamp > timestamp {
                    NodeStale {
                        node_id: id,
                        name: node.name(),
                        reason: format!(
                            "dependency {} is newer: {} > {}",
                            dep.id, dep_timestamp, timestamp
                        ),
                    }
                    .log();
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }

    /// Resolves every input to a value; node references contribute their
    /// (possibly overridden) results.
    fn resolve_inputs(&mut self, id: NodeId) -> Result<ArgMap, FlowError> {
        let inputs: Vec<(String, Input)> = self
            .node(id)?
            .inputs
            .iter()
            .map(|(name, input)| (name.clone(), input.clone()))
            .collect();

        let mut args = ArgMap::new();
        for (name, input) in inputs {
            let value = match input {
                Input::Literal(value) => value,
                Input::Node(handle) => {
                    let dep = self.node(handle.id())?;
                    if !dep.has_result() {
                        return Err(FlowError::UpstreamNotComputed {
                            id: dep.id,
                            name: dep.name().to_string(),
                        });
                    }
                    self.overridden_result(handle.id())?
                }
            };
            args.insert(name, value);
        }
        Ok(args)
    }

    /// Resolved and validated arguments for a node's `process` call.
    fn filled_inputs(&mut self, id: NodeId) -> Result<ArgMap, FlowError> {
        let args = self.resolve_inputs(id)?;
        self.ensure_processor(id)?;

        let node = self.node(id)?;
        if let Some(processor) = &node.processor {
            processor
                .validate_args(&args)
                .map_err(|source| FlowError::TypeMismatch {
                    id,
                    name: node.name().to_string(),
                    source,
                })?;
        }
        Ok(args)
    }

    /// A node's result with any manual override applied. Sets the sticky
    /// override flag when the override changes the observed value.
    fn overridden_result(&mut self, id: NodeId) -> Result<Value, FlowError> {
        let node = self.node(id)?;
        if !node.has_result() {
            return Err(FlowError::UpstreamNotComputed {
                id,
                name: node.name().to_string(),
            });
        }
        let Some(override_fn) = node.override_fn.clone() else {
            return Ok(node.result.clone());
        };

        // The override receives the same filled-in inputs process() would.
        let args = self.filled_inputs(id)?;
        let node = self.node_mut(id)?;
        let new_result = override_fn(&node.result, &args);
        if new_result != node.result {
            node.was_overridden = true;
            OverrideChangedOutput {
                node_id: id,
                name: node.name(),
            }
            .log();
        } else {
            OverrideUnchanged {
                node_id: id,
                name: node.name(),
            }
            .log();
        }
        Ok(new_result)
    }

    fn ensure_processor(&mut self, id: NodeId) -> Result<(), FlowError> {
        let node = self.node_mut(id)?;
        if node.processor.is_none() {
            let name = node.spec.name().to_string();
            let processor = node
                .spec
                .instantiate(&node.constructor_args)
                .map_err(|error| FlowError::ProcessorFailure { id, name, error })?;
            node.processor = Some(processor);
        }
        Ok(())
    }

    /// Recomputes a node's result and stamps the cached-result fields.
    ///
    /// A failing `process` leaves the previous cached result untouched.
    async fn refresh_result(&mut self, id: NodeId) -> Result<(), FlowError> {
        if self.node(id)?.dry_run {
            // Processors are never instantiated under dry-run; the result is
            // recorded as null so traversal bookkeeping stays coherent.
            let node = self.node_mut(id)?;
            let prev_result = std::mem::replace(&mut node.result, Value::Null);
            node.compute_time = Some(0.0);
            node.result_timestamp = Some(epoch_now());
            node.result_version = node.version.clone();
            let changed = prev_result != Value::Null;
            return self.record_result(id, changed);
        }

        let args = self.filled_inputs(id)?;

        let node = self.node_mut(id)?;
        let name = node.spec.name().to_string();
        let mut processor = match node.processor.take() {
            // filled_inputs already instantiated it.
            Some(processor) => processor,
            None => node
                .spec
                .instantiate(&node.constructor_args)
                .map_err(|error| FlowError::ProcessorFailure {
                    id,
                    name: name.clone(),
                    error,
                })?,
        };

        let started = Instant::now();
        let outcome = processor.process(args).await;
        let elapsed = started.elapsed().as_secs_f64();

        let node = self.node_mut(id)?;
        node.processor = Some(processor);

        let result = outcome.map_err(|error| FlowError::ProcessorFailure { id, name, error })?;
        let prev_result = std::mem::replace(&mut node.result, result);
        node.compute_time = Some(elapsed);
        node.result_timestamp = Some(epoch_now());
        node.result_version = node.version.clone();
        let changed = prev_result != node.result;
        self.record_result(id, changed)
    }

    /// Runs the nodes breadth-first over a batch of items, for efficient
    /// resource management.
    ///
    /// The outer loop walks nodes in topological order; the inner loop walks
    /// items in input order, so whatever heavy state a node holds is
    /// amortized across all items before the next node runs.
    ///
    /// `prep_fn` is called before each (node, item) execution; it must call
    /// `persist` with a path derived from the item and should set per-item
    /// constants. `post_fn` runs after each item that completed the current
    /// node without error.
    pub async fn process_batch<T: Clone>(
        &mut self,
        batch_items: &[T],
        run_nodes: &[NodeHandle],
        prep_fn: &mut dyn FnMut(&mut ProcessGraph, usize, &T) -> Result<(), FlowError>,
        mut post_fn: Option<&mut dyn FnMut(&mut ProcessGraph, usize, &T)>,
        options: BatchOptions<'_>,
    ) -> Result<BatchStats<T>, FlowError> {
        let nodes_to_run = self.execution_order(run_nodes)?;
        BatchStarted {
            item_count: batch_items.len(),
            node_count: nodes_to_run.len(),
        }
        .log();

        let release_after: BTreeSet<NodeId> = options
            .release_resources_after
            .iter()
            .map(|handle| handle.id())
            .collect();

        let mut stats = BatchStats {
            completed: 0,
            failures: Vec::new(),
        };
        let mut poisoned: BTreeSet<usize> = BTreeSet::new();

        for (node_index, node_id) in nodes_to_run.iter().enumerate() {
            let is_last_node = node_index == nodes_to_run.len() - 1;

            for (item_index, item) in batch_items.iter().enumerate() {
                if poisoned.contains(&item_index) {
                    BatchItemSkipped { item_index }.log();
                    continue;
                }

                // Results must persist per item for breadth-first running:
                // each (node, item) step reloads that item's state file.
                self.auto_save_path = None;
                prep_fn(self, item_index, item)?;
                if self.auto_save_path.is_none() {
                    return Err(FlowError::PrepMissingPersist);
                }

                match self.run_node(*node_id).await {
                    Ok(_) => {}
                    Err(error @ FlowError::ProcessorFailure { .. }) if options.fault_tolerant => {
                        let name = self
                            .nodes
                            .get(node_id)
                            .map(|node| node.name().to_string())
                            .unwrap_or_default();
                        BatchItemFailed {
                            item_index,
                            node_id: *node_id,
                            name: &name,
                            error: &error,
                        }
                        .log();
                        poisoned.insert(item_index);
                        stats.failures.push(BatchFailure {
                            item_index,
                            item: item.clone(),
                            failed_node: NodeHandle(*node_id),
                            error,
                        });
                        continue;
                    }
                    Err(error) => return Err(error),
                }

                if is_last_node {
                    stats.completed += 1;
                }

                if let Some(post) = post_fn.as_mut() {
                    post(self, item_index, item);
                }
            }

            if release_after.contains(node_id) {
                // Free up resources for the next column after heavy nodes.
                self.release_resources().await;
            }
        }

        self.release_resources().await;
        BatchCompleted {
            completed: stats.completed,
            failed: stats.failures.len(),
        }
        .log();
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Processor;
    use crate::typing::{Signature, TypeSpec};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct SumInts {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Processor for SumInts {
        fn name(&self) -> &str {
            "sum_ints"
        }

        fn signature(&self) -> Signature {
            Signature::new()
                .required("a", TypeSpec::Int)
                .required("b", TypeSpec::Int)
        }

        async fn process(&mut self, args: ArgMap) -> anyhow::Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let a = args.get("a").and_then(Value::as_i64).unwrap_or(0);
            let b = args.get("b").and_then(Value::as_i64).unwrap_or(0);
            Ok(json!(a + b))
        }
    }

    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    fn sum_spec(calls: &Arc<AtomicUsize>) -> ProcessorSpec {
        let calls = calls.clone();
        ProcessorSpec::new("sum_ints", move |_ctor| {
            Ok(Box::new(SumInts {
                calls: calls.clone(),
            }) as Box<dyn Processor>)
        })
    }

    struct Inc {
        how_much: i64,
    }

    fn inc_spec() -> ProcessorSpec {
        ProcessorSpec::new("inc", |ctor: &ArgMap| {
            let how_much = ctor
                .get("how_much")
                .and_then(Value::as_i64)
                .ok_or_else(|| anyhow::anyhow!("missing 'how_much' constructor arg"))?;
            Ok(Box::new(Inc { how_much }) as Box<dyn Processor>)
        })
    }

    #[async_trait]
    impl Processor for Inc {
        fn name(&self) -> &str {
            "inc"
        }

        fn signature(&self) -> Signature {
            Signature::new().required("a", TypeSpec::Int)
        }

        async fn process(&mut self, args: ArgMap) -> anyhow::Result<Value> {
            let a = args.get("a").and_then(Value::as_i64).unwrap_or(0);
            Ok(json!(a + self.how_much))
        }
    }

    struct Decrement;

    #[async_trait]
    impl Processor for Decrement {
        fn name(&self) -> &str {
            "decrement"
        }

        fn signature(&self) -> Signature {
            Signature::new().required("a", TypeSpec::Int)
        }

        async fn process(&mut self, args: ArgMap) -> anyhow::Result<Value> {
            let a = args.get("a").and_then(Value::as_i64).unwrap_or(0);
            let result = a - 1;
            // Fail on reaching 0: with 10 nodes, starting at 10 fails.
            if result <= 0 {
                anyhow::bail!("test error");
            }
            Ok(json!(result))
        }
    }

    fn decrement_spec() -> ProcessorSpec {
        ProcessorSpec::new("decrement", |_ctor| {
            Ok(Box::new(Decrement) as Box<dyn Processor>)
        })
    }

    fn decrement_graph(num_nodes: usize) -> (ProcessGraph, Vec<NodeHandle>) {
        let mut graph = ProcessGraph::new();
        let first = graph.add_constant_node(1, "test_constant", 0).unwrap();
        let mut nodes = vec![first];
        for id in 2..=(num_nodes as NodeId) {
            let prev = *nodes.last().unwrap();
            nodes.push(
                graph
                    .add_node(id, decrement_spec(), Inputs::new().node("a", prev))
                    .unwrap(),
            );
        }
        (graph, nodes)
    }

    // Strips output_ts and time so results can be compared exactly.
    fn results_without_meta(graph: &ProcessGraph) -> Value {
        let mut doc = graph.results_dict();
        for record in doc.values_mut() {
            if let Some(object) = record.as_object_mut() {
                object.remove("meta");
            }
        }
        Value::Object(doc)
    }

    #[tokio::test]
    async fn test_simple_graph_execution() {
        let mut graph = ProcessGraph::new();
        let calls = counter();
        let node1 = graph
            .add_node(
                1,
                sum_spec(&calls),
                Inputs::new().literal("a", 1).literal("b", 2),
            )
            .unwrap();
        let node2 = graph
            .add_node_with(
                2,
                sum_spec(&calls),
                Inputs::new().node("a", node1).node("b", node1),
                NodeOptions {
                    version: 2.into(),
                    ..NodeOptions::default()
                },
            )
            .unwrap();

        // (1+2) + (1+2) = 6
        let result = graph.run_upto(&[node2]).await.unwrap();
        assert_eq!(result, json!(6));

        assert_eq!(
            results_without_meta(&graph),
            json!({
                "1": {"name": "sum_ints", "output": 3, "version": 0},
                "2": {"name": "sum_ints", "output": 6, "version": 2},
            })
        );
    }

    #[tokio::test]
    async fn test_compute_only_once() {
        let mut graph = ProcessGraph::new();
        let calls1 = counter();
        let calls2 = counter();
        let node1 = graph
            .add_node(
                1,
                sum_spec(&calls1),
                Inputs::new().literal("a", 1).literal("b", 2),
            )
            .unwrap();
        let node2 = graph
            .add_node_with(
                2,
                sum_spec(&calls2),
                Inputs::new().node("a", node1).literal("b", 3),
                NodeOptions {
                    invalidate_before: epoch_now() + 60.0 * 600.0,
                    ..NodeOptions::default()
                },
            )
            .unwrap();

        assert_eq!(graph.run_upto(&[node2]).await.unwrap(), json!(6));
        assert_eq!(calls1.load(Ordering::SeqCst), 1);
        assert_eq!(calls2.load(Ordering::SeqCst), 1);

        // node2's future invalidate_before keeps forcing it; node1 is cached.
        assert_eq!(graph.run_upto(&[node2]).await.unwrap(), json!(6));
        assert_eq!(calls1.load(Ordering::SeqCst), 1);
        assert_eq!(calls2.load(Ordering::SeqCst), 2);

        graph.reset();
        assert_eq!(graph.run_upto(&[node2]).await.unwrap(), json!(6));
        assert_eq!(calls1.load(Ordering::SeqCst), 2);
        assert_eq!(calls2.load(Ordering::SeqCst), 3);

        // Releasing drops results too; fresh processor instances recompute.
        graph.release_resources().await;
        assert_eq!(graph.run_upto(&[node2]).await.unwrap(), json!(6));
        assert_eq!(calls1.load(Ordering::SeqCst), 3);
        assert_eq!(calls2.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_dependency_updated() {
        let mut graph = ProcessGraph::new();
        let calls1 = counter();
        let calls2 = counter();
        let node1 = graph
            .add_node(
                1,
                sum_spec(&calls1),
                Inputs::new().literal("a", 1).literal("b", 2),
            )
            .unwrap();
        let node2 = graph
            .add_node(
                2,
                sum_spec(&calls2),
                Inputs::new().node("a", node1).literal("b", 3),
            )
            .unwrap();

        assert_eq!(graph.run_upto(&[node2]).await.unwrap(), json!(6));
        assert_eq!(calls1.load(Ordering::SeqCst), 1);
        assert_eq!(calls2.load(Ordering::SeqCst), 1);

        // Normally, no recomputation is done.
        assert_eq!(graph.run_upto(&[node2]).await.unwrap(), json!(6));
        assert_eq!(calls1.load(Ordering::SeqCst), 1);
        assert_eq!(calls2.load(Ordering::SeqCst), 1);

        // But if a dependency is newer, the dependent updates.
        let node2_ts = graph.result_timestamp(node2).unwrap();
        graph.set_result_timestamp(node1, node2_ts + 1.0);
        assert_eq!(graph.run_upto(&[node2]).await.unwrap(), json!(6));
        assert_eq!(calls1.load(Ordering::SeqCst), 1);
        assert_eq!(calls2.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_single_node_run() {
        let mut graph = ProcessGraph::new();
        let calls = counter();
        let node = graph
            .add_node(
                1,
                sum_spec(&calls),
                Inputs::new().literal("a", 1).literal("b", 2),
            )
            .unwrap();
        assert_eq!(graph.run_upto(&[node]).await.unwrap(), json!(3));
    }

    #[tokio::test]
    async fn test_duplicate_node_id() {
        let mut graph = ProcessGraph::new();
        let calls = counter();
        graph
            .add_node(
                1,
                sum_spec(&calls),
                Inputs::new().literal("a", 1).literal("b", 2),
            )
            .unwrap();
        let err = graph
            .add_node(
                1,
                sum_spec(&calls),
                Inputs::new().literal("a", 1).literal("b", 2),
            )
            .unwrap_err();
        assert!(matches!(err, FlowError::UnicityViolation { id: 1 }));
    }

    #[tokio::test]
    async fn test_unknown_upstream_handle_rejected() {
        let mut graph = ProcessGraph::new();
        let calls = counter();
        let err = graph
            .add_node(
                1,
                sum_spec(&calls),
                Inputs::new().node("a", NodeHandle(99)).literal("b", 2),
            )
            .unwrap_err();
        assert!(matches!(err, FlowError::UnknownNode { id: 99 }));
    }

    #[tokio::test]
    async fn test_type_validation() {
        let mut graph = ProcessGraph::new();
        let calls = counter();
        let node = graph
            .add_node(
                1,
                sum_spec(&calls),
                Inputs::new().literal("a", 1).literal("b", json!([2])),
            )
            .unwrap();
        let err = graph.run_upto(&[node]).await.unwrap_err();
        assert!(matches!(err, FlowError::TypeMismatch { id: 1, .. }));

        let node = graph
            .add_node(
                2,
                sum_spec(&calls),
                Inputs::new().literal("a", json!([1])).literal("b", 2),
            )
            .unwrap();
        let err = graph.run_upto(&[node]).await.unwrap_err();
        assert!(matches!(err, FlowError::TypeMismatch { id: 2, .. }));
    }

    #[tokio::test]
    async fn test_upstream_not_computed() {
        let mut graph = ProcessGraph::new();
        let calls = counter();
        let node1 = graph
            .add_node(
                1,
                sum_spec(&calls),
                Inputs::new().literal("a", 1).literal("b", 2),
            )
            .unwrap();
        let node2 = graph
            .add_node(
                2,
                sum_spec(&calls),
                Inputs::new().node("a", node1).literal("b", 3),
            )
            .unwrap();

        // Running node2 alone, without its dependency, is an error.
        let err = graph.run_node(node2.id()).await.unwrap_err();
        assert!(matches!(err, FlowError::UpstreamNotComputed { id: 1, .. }));
    }

    #[tokio::test]
    async fn test_constant_node() {
        let mut graph = ProcessGraph::new();
        let node1 = graph.add_constant_node(1, "test_constant", "hello").unwrap();
        assert_eq!(graph.run_upto(&[node1]).await.unwrap(), json!("hello"));

        graph.reset();
        graph.set_value(node1, "world").unwrap();
        assert_eq!(graph.run_upto(&[node1]).await.unwrap(), json!("world"));
    }

    #[tokio::test]
    async fn test_set_value_without_default_arg() {
        let mut graph = ProcessGraph::new();
        let calls = counter();
        let node = graph
            .add_node(
                1,
                sum_spec(&calls),
                Inputs::new().literal("a", 1).literal("b", 2),
            )
            .unwrap();
        assert!(matches!(
            graph.set_value(node, 5),
            Err(FlowError::UnknownInput { .. })
        ));
        assert!(matches!(
            graph.set(node, "c", 5),
            Err(FlowError::UnknownInput { .. })
        ));
    }

    #[tokio::test]
    async fn test_persistence_partial() {
        let mut graph = ProcessGraph::new();
        graph.add_constant_node(1, "test_constant", 2).unwrap();
        let const_node = graph.handle(1).unwrap();
        graph.run_upto(&[const_node]).await.unwrap();

        // Survive a JSON round trip, as the state file would.
        let serialized = serde_json::to_string(&graph.results_dict()).unwrap();
        let snapshot: serde_json::Map<String, Value> =
            serde_json::from_str(&serialized).unwrap();

        // The rebuilt graph has grown an extra node since the save.
        let mut graph = ProcessGraph::new();
        let const_node = graph.add_constant_node(1, "test_constant", 2).unwrap();
        let calls = counter();
        let sum_node = graph
            .add_node(
                2,
                sum_spec(&calls),
                Inputs::new().literal("a", 1).node("b", const_node),
            )
            .unwrap();
        graph.load_results_dict(&snapshot);
        assert_eq!(graph.run_upto(&[sum_node]).await.unwrap(), json!(3));
    }

    #[tokio::test]
    async fn test_persistence() {
        fn make_graph() -> (ProcessGraph, NodeHandle, Arc<AtomicUsize>) {
            let mut graph = ProcessGraph::new();
            let calls = counter();
            let node1 = graph
                .add_node(
                    2,
                    sum_spec(&calls),
                    Inputs::new().literal("a", 1).literal("b", 2),
                )
                .unwrap();
            let final_calls = counter();
            let node2 = graph
                .add_node(
                    3,
                    sum_spec(&final_calls),
                    Inputs::new().node("a", node1).node("b", node1),
                )
                .unwrap();
            (graph, node2, final_calls)
        }

        let (mut graph, final_node, _) = make_graph();
        let result = graph.run_upto(&[final_node]).await.unwrap();
        let results_dict = graph.results_dict();

        // Results dict should survive jsonification.
        let reloaded: serde_json::Map<String, Value> =
            serde_json::from_str(&serde_json::to_string(&results_dict).unwrap()).unwrap();

        // Remake the graph, load, and test.
        let (mut graph, final_node, final_calls) = make_graph();
        graph.load_results_dict(&reloaded);
        assert_eq!(results_dict, graph.results_dict());
        assert_eq!(result, graph.run_upto(&[final_node]).await.unwrap());
        // No new computation happened on the warm graph.
        assert_eq!(final_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_graph_structure() {
        let mut graph = ProcessGraph::new();
        let calls = counter();
        let node1 = graph
            .add_node(
                1,
                sum_spec(&calls),
                Inputs::new().literal("a", 1).literal("b", 2),
            )
            .unwrap();
        let node2 = graph
            .add_node(
                2,
                sum_spec(&calls),
                Inputs::new().node("a", node1).node("b", node1),
            )
            .unwrap();
        let node3 = graph
            .add_node(
                3,
                sum_spec(&calls),
                Inputs::new().node("a", node1).node("b", node2),
            )
            .unwrap();

        let expected: BTreeMap<NodeId, BTreeSet<NodeId>> = [
            (1, BTreeSet::new()),
            (2, BTreeSet::from([1])),
            (3, BTreeSet::from([1, 2])),
        ]
        .into_iter()
        .collect();
        assert_eq!(graph.dependency_map(), &expected);

        assert_eq!(graph.execution_order(&[node3]).unwrap(), vec![1, 2, 3]);
        assert_eq!(graph.execution_order(&[node2]).unwrap(), vec![1, 2]);
        assert_eq!(
            graph.execution_order(&[node2, node3]).unwrap(),
            vec![1, 2, 3]
        );
        assert_eq!(graph.sinks(), vec![node3]);
    }

    #[tokio::test]
    async fn test_node_with_constructor_args() {
        let mut graph = ProcessGraph::new();
        let node1 = graph
            .add_node_with(
                1,
                inc_spec(),
                Inputs::new().literal("a", 5),
                NodeOptions {
                    constructor_args: [("how_much".to_string(), json!(20))]
                        .into_iter()
                        .collect(),
                    ..NodeOptions::default()
                },
            )
            .unwrap();

        assert_eq!(graph.run_upto(&[node1]).await.unwrap(), json!(25));
    }

    #[tokio::test]
    async fn test_manual_override() {
        let mut graph = ProcessGraph::new();
        let calls = counter();
        let node1 = graph
            .add_node(
                1,
                sum_spec(&calls),
                Inputs::new().literal("a", 1).literal("b", 2),
            )
            .unwrap();
        let node2 = graph
            .add_node(
                2,
                sum_spec(&calls),
                Inputs::new().node("a", node1).literal("b", 3),
            )
            .unwrap();
        let node3 = graph
            .add_node(
                3,
                sum_spec(&calls),
                Inputs::new().node("a", node2).literal("b", 4),
            )
            .unwrap();
        assert_eq!(graph.run_upto(&[node3]).await.unwrap(), json!(10));

        graph
            .set_override(
                node2,
                Arc::new(|original: &Value, kwargs: &ArgMap| {
                    assert_eq!(original, &json!(6));
                    assert_eq!(kwargs.get("a"), Some(&json!(3)));
                    assert_eq!(kwargs.get("b"), Some(&json!(3)));
                    json!(7)
                }),
            )
            .unwrap();
        graph.reset_node(node3).unwrap();
        assert_eq!(graph.run_upto(&[node3]).await.unwrap(), json!(11));

        // The sticky flag surfaces in the persisted record.
        let doc = graph.results_dict();
        assert_eq!(doc["2"]["meta"]["overriden"], json!(true));
    }

    #[tokio::test]
    async fn test_recompute_new_version() {
        let mut graph = ProcessGraph::new();
        let calls1 = counter();
        let calls2 = counter();
        let node1 = graph
            .add_node(
                1,
                sum_spec(&calls1),
                Inputs::new().literal("a", 1).literal("b", 2),
            )
            .unwrap();
        let node2 = graph
            .add_node(
                2,
                sum_spec(&calls2),
                Inputs::new().node("a", node1).node("b", node1),
            )
            .unwrap();

        assert_eq!(graph.run_upto(&[node2]).await.unwrap(), json!(6));
        assert_eq!(calls2.load(Ordering::SeqCst), 1);

        // Simulate save and reload; same version means no recompute.
        let snapshot = graph.results_dict();
        graph.load_results_dict(&snapshot);
        assert_eq!(graph.run_upto(&[node2]).await.unwrap(), json!(6));
        assert_eq!(calls2.load(Ordering::SeqCst), 1);

        // Recompute when the version changes.
        let snapshot = graph.results_dict();
        graph.load_results_dict(&snapshot);
        graph.set_version(node2, 1).unwrap();
        assert_eq!(graph.run_upto(&[node2]).await.unwrap(), json!(6));
        assert_eq!(calls2.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_batch_process_needs_persist() {
        let (mut graph, nodes) = decrement_graph(10);
        let first = nodes[0];
        let last = *nodes.last().unwrap();

        let mut prep = move |g: &mut ProcessGraph, _index: usize, item: &i64| {
            g.set(first, "value", *item)
        };

        let err = graph
            .process_batch(
                &[11, 9, 5, 10],
                &[last],
                &mut prep,
                None,
                BatchOptions {
                    release_resources_after: &nodes,
                    fault_tolerant: true,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::PrepMissingPersist));
    }

    #[tokio::test]
    async fn test_batch_process() {
        let dir = tempfile::tempdir().unwrap();
        let (mut graph, nodes) = decrement_graph(10);
        let first = nodes[0];
        let last = *nodes.last().unwrap();

        let base = dir.path().to_path_buf();
        let mut prep = move |g: &mut ProcessGraph, index: usize, item: &i64| {
            g.set(first, "value", *item)?;
            g.persist(base.join(format!("persist{}", index)))
        };

        let stats = graph
            .process_batch(
                &[10, 9, 21, 5],
                &[last],
                &mut prep,
                None,
                BatchOptions {
                    release_resources_after: &nodes,
                    fault_tolerant: true,
                },
            )
            .await
            .unwrap();

        // Only 10 and 21 survive nine decrements without touching zero.
        assert_eq!(stats.completed, 2);
        let failed_items: BTreeSet<i64> = stats.failures.iter().map(|f| f.item).collect();
        assert_eq!(failed_items, BTreeSet::from([9, 5]));

        // Verify one of the computations by reloading its state file.
        graph.persist(dir.path().join("persist2")).unwrap();
        let doc = graph.results_dict();
        let outputs: Vec<Value> = nodes
            .iter()
            .map(|node| doc[&node.id().to_string()]["output"].clone())
            .collect();
        assert_eq!(
            outputs,
            vec![
                json!(21),
                json!(20),
                json!(19),
                json!(18),
                json!(17),
                json!(16),
                json!(15),
                json!(14),
                json!(13),
                json!(12)
            ]
        );
    }

    #[tokio::test]
    async fn test_batch_process_post_fn_runs_for_successful_items() {
        let dir = tempfile::tempdir().unwrap();
        let (mut graph, nodes) = decrement_graph(3);
        let first = nodes[0];
        let last = *nodes.last().unwrap();

        let base = dir.path().to_path_buf();
        let mut prep = move |g: &mut ProcessGraph, index: usize, item: &i64| {
            g.set(first, "value", *item)?;
            g.persist(base.join(format!("persist{}", index)))
        };

        let post_calls = counter();
        let post_counter = post_calls.clone();
        let mut post = move |_g: &mut ProcessGraph, _index: usize, _item: &i64| {
            post_counter.fetch_add(1, Ordering::SeqCst);
        };

        // Item 1 dies on the first decrement; item 10 completes all 3 nodes.
        let stats = graph
            .process_batch(
                &[10, 1],
                &[last],
                &mut prep,
                Some(&mut post),
                BatchOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(stats.completed, 1);
        assert_eq!(stats.failures.len(), 1);
        // post runs per successful (node, item) pair: 3 nodes for item 10,
        // plus the constant column for item 1 before it failed.
        assert_eq!(post_calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_batch_process_fail_fast() {
        let dir = tempfile::tempdir().unwrap();
        let (mut graph, nodes) = decrement_graph(5);
        let first = nodes[0];
        let last = *nodes.last().unwrap();

        let base = dir.path().to_path_buf();
        let mut prep = move |g: &mut ProcessGraph, index: usize, item: &i64| {
            g.set(first, "value", *item)?;
            g.persist(base.join(format!("persist{}", index)))
        };

        // Items 2 and 1 reach zero before the chain ends.
        let err = graph
            .process_batch(
                &[11, 2, 1, 10],
                &[last],
                &mut prep,
                None,
                BatchOptions {
                    release_resources_after: &nodes,
                    fault_tolerant: false,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::ProcessorFailure { .. }));
        assert!(err.to_string().contains("test error"));
    }

    #[tokio::test]
    async fn test_batch_process_fail_fast_no_failures() {
        let dir = tempfile::tempdir().unwrap();
        let (mut graph, nodes) = decrement_graph(5);
        let first = nodes[0];
        let last = *nodes.last().unwrap();

        let base = dir.path().to_path_buf();
        let mut prep = move |g: &mut ProcessGraph, index: usize, item: &i64| {
            g.set(first, "value", *item)?;
            g.persist(base.join(format!("persist{}", index)))
        };

        let stats = graph
            .process_batch(
                &[11, 10],
                &[last],
                &mut prep,
                None,
                BatchOptions {
                    release_resources_after: &nodes,
                    fault_tolerant: false,
                },
            )
            .await
            .unwrap();
        assert_eq!(stats.completed, 2);
        assert!(stats.failures.is_empty());
    }

    #[tokio::test]
    async fn test_passive_node_never_invalidates_dependents() {
        let mut graph = ProcessGraph::new();
        let node1 = graph.add_constant_node(1, "test_constant", 2).unwrap();
        let calls = counter();
        let node2 = graph
            .add_node(
                2,
                sum_spec(&calls),
                Inputs::new().node("a", node1).node("b", node1),
            )
            .unwrap();

        graph.run_upto(&[node2]).await.unwrap();
        assert_eq!(graph.result(node2), Some(&json!(4)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            results_without_meta(&graph),
            json!({
                "1": {"name": "test_constant", "output": 2, "version": 0},
                "2": {"name": "sum_ints", "output": 4, "version": 0},
            })
        );

        graph.set_value(node1, 3).unwrap();
        graph.run_upto(&[node2]).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(graph.result(node2), Some(&json!(4)));
        assert_eq!(
            results_without_meta(&graph),
            json!({
                // A passive node is always rerun...
                "1": {"name": "test_constant", "output": 3, "version": 0},
                // ...but it does not trigger dependent nodes to update.
                "2": {"name": "sum_ints", "output": 4, "version": 0},
            })
        );

        // When the dependent recomputes for any other reason, it sees the
        // new value of the passive node.
        graph.set_version(node2, 1).unwrap();
        graph.run_upto(&[node2]).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(graph.result(node2), Some(&json!(6)));
        assert_eq!(
            results_without_meta(&graph),
            json!({
                "1": {"name": "test_constant", "output": 3, "version": 0},
                "2": {"name": "sum_ints", "output": 6, "version": 1},
            })
        );
    }

    #[tokio::test]
    async fn test_dry_run_skips_processors_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut graph = ProcessGraph::new_dry_run();
        let calls = counter();
        let node = graph
            .add_node(
                1,
                sum_spec(&calls),
                Inputs::new().literal("a", 1).literal("b", 2),
            )
            .unwrap();
        graph.persist(&path).unwrap();

        let result = graph.run_upto(&[node]).await.unwrap();
        assert_eq!(result, Value::Null);
        assert!(graph.has_result(node));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_cycle_detection_via_manual_edge() {
        // Handles can only point at existing nodes, so a cycle cannot be
        // built through the public API; corrupt the adjacency directly.
        let mut graph = ProcessGraph::new();
        let calls = counter();
        let node1 = graph
            .add_node(
                1,
                sum_spec(&calls),
                Inputs::new().literal("a", 1).literal("b", 2),
            )
            .unwrap();
        let node2 = graph
            .add_node(
                2,
                sum_spec(&calls),
                Inputs::new().node("a", node1).literal("b", 3),
            )
            .unwrap();
        graph.dependencies.get_mut(&1).unwrap().insert(2);

        let err = graph.run_upto(&[node2]).await.unwrap_err();
        assert!(matches!(err, FlowError::CycleDetected));
    }
}
