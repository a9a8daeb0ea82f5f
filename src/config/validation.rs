// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structural validation for pipeline definitions.
//!
//! Three checks run in order: node ids must be unique, every `{node: ID}`
//! reference must resolve, and the resulting graph must be acyclic. The
//! ordering matters: cycle detection walks the reference graph and needs
//! resolvable references first.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::{InputSpec, PipelineConfig};
use crate::errors::ValidationError;
use crate::flow::NodeId;

/// Validates a pipeline's node entries for structural integrity.
///
/// Returns every problem found, not just the first, so config authors can
/// fix a file in one pass.
pub fn validate_pipeline(cfg: &PipelineConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut seen: BTreeSet<NodeId> = BTreeSet::new();
    for entry in &cfg.nodes {
        if !seen.insert(entry.id) {
            errors.push(ValidationError::DuplicateNodeId { node_id: entry.id });
        }
    }

    let ids: BTreeSet<NodeId> = cfg.nodes.iter().map(|entry| entry.id).collect();
    for entry in &cfg.nodes {
        for input in entry.inputs.values() {
            if let InputSpec::Ref(node_ref) = input {
                if !ids.contains(&node_ref.node) {
                    errors.push(ValidationError::UnresolvedDependency {
                        node_id: entry.id,
                        missing_dependency: node_ref.node,
                    });
                }
            }
        }
    }

    // Cycle detection requires a resolvable reference graph.
    if errors.is_empty() {
        if let Some(cycle) = find_cycle(cfg) {
            errors.push(ValidationError::CyclicDependency { cycle });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// DFS cycle search returning the offending path, e.g. `[1, 2, 3, 1]`.
fn find_cycle(cfg: &PipelineConfig) -> Option<Vec<NodeId>> {
    let mut deps: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
    for entry in &cfg.nodes {
        let refs = deps.entry(entry.id).or_default();
        for input in entry.inputs.values() {
            if let InputSpec::Ref(node_ref) = input {
                refs.push(node_ref.node);
            }
        }
    }

    const UNVISITED: u8 = 0;
    const VISITING: u8 = 1;
    const VISITED: u8 = 2;

    fn dfs(
        node: NodeId,
        deps: &BTreeMap<NodeId, Vec<NodeId>>,
        state: &mut BTreeMap<NodeId, u8>,
        path: &mut Vec<NodeId>,
    ) -> Option<Vec<NodeId>> {
        match state.get(&node).copied().unwrap_or(UNVISITED) {
            VISITING => {
                // Back edge: slice the current path from the first visit.
                let start = path.iter().position(|n| *n == node).unwrap_or(0);
                let mut cycle: Vec<NodeId> = path[start..].to_vec();
                cycle.push(node);
                return Some(cycle);
            }
            VISITED => return None,
            _ => {}
        }

        state.insert(node, VISITING);
        path.push(node);
        if let Some(neighbors) = deps.get(&node) {
            for dep in neighbors {
                if let Some(cycle) = dfs(*dep, deps, state, path) {
                    return Some(cycle);
                }
            }
        }
        path.pop();
        state.insert(node, VISITED);
        None
    }

    let mut state: BTreeMap<NodeId, u8> = BTreeMap::new();
    let mut path: Vec<NodeId> = Vec::new();
    for node in deps.keys() {
        if state.get(node).copied().unwrap_or(UNVISITED) == UNVISITED {
            if let Some(cycle) = dfs(*node, &deps, &mut state, &mut path) {
                return Some(cycle);
            }
        }
    }
    None
}
