// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, BTreeSet};

use crate::config::{InputSpec, NodeEntry, PipelineConfig, ProcessorRegistry};
use crate::errors::ValidationError;
use crate::flow::{algorithms, Inputs, NodeId, NodeOptions, ProcessGraph};
use crate::processors::Constant;

/// Builds a `ProcessGraph` from a validated pipeline definition.
///
/// Entries may reference each other in any order; nodes are added in
/// dependency order so every `{node: ID}` reference resolves to an existing
/// handle. `constant` entries get the engine's constant shim with their
/// configured display name, default passivity, and a `value` default arg.
pub fn build_graph(
    cfg: &PipelineConfig,
    registry: &ProcessorRegistry,
) -> Result<ProcessGraph, Box<dyn std::error::Error>> {
    let mut graph = if cfg.dry_run {
        ProcessGraph::new_dry_run()
    } else {
        ProcessGraph::new()
    };

    let by_id: BTreeMap<NodeId, &NodeEntry> =
        cfg.nodes.iter().map(|entry| (entry.id, entry)).collect();

    let mut deps: BTreeMap<NodeId, BTreeSet<NodeId>> = BTreeMap::new();
    for entry in &cfg.nodes {
        let refs = deps.entry(entry.id).or_default();
        for input in entry.inputs.values() {
            if let InputSpec::Ref(node_ref) = input {
                refs.insert(node_ref.node);
            }
        }
    }

    let all_ids: BTreeSet<NodeId> = by_id.keys().copied().collect();
    let order = algorithms::topo_sort_subgraph(&all_ids, &deps)?;

    for id in order {
        let entry = match by_id.get(&id) {
            Some(entry) => *entry,
            None => {
                return Err(ValidationError::UnresolvedDependency {
                    node_id: id,
                    missing_dependency: id,
                }
                .into())
            }
        };

        let is_constant = entry.processor == "constant";
        let spec = if is_constant {
            Constant::spec(entry.name.clone().unwrap_or_else(|| "constant".to_string()))
        } else {
            registry
                .spec_for(&entry.processor)
                .ok_or_else(|| ValidationError::UnknownProcessor {
                    node_id: id,
                    processor: entry.processor.clone(),
                })?
        };

        let mut inputs = Inputs::new();
        for (name, input) in &entry.inputs {
            inputs = match input {
                InputSpec::Ref(node_ref) => {
                    let handle = graph.handle(node_ref.node).ok_or_else(|| {
                        ValidationError::UnresolvedDependency {
                            node_id: id,
                            missing_dependency: node_ref.node,
                        }
                    })?;
                    inputs.node(name.clone(), handle)
                }
                InputSpec::Literal(value) => inputs.literal(name.clone(), value.clone()),
            };
        }

        let options = NodeOptions {
            version: entry.version.clone(),
            constructor_args: entry.constructor_args.clone(),
            invalidate_before: entry.invalidate_before,
            force: entry.force,
            passive: entry.passive.unwrap_or(is_constant),
            default_arg: entry
                .default_arg
                .clone()
                .or_else(|| is_constant.then(|| "value".to_string())),
            override_fn: None,
        };

        graph.add_node_with(id, spec, inputs, options)?;
    }

    Ok(graph)
}
