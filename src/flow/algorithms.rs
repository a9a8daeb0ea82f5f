// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Graph algorithms used by `ProcessGraph`.
//!
//! For this module a node is a [`NodeId`] and a graph is a mapping of node
//! to the set of nodes it depends on. Ordered containers keep the output
//! deterministic: among independent nodes, ascending id order wins, so tests
//! can assert exact sequences.

use std::collections::VecDeque;
use std::collections::{BTreeMap, BTreeSet};

use crate::errors::FlowError;
use crate::flow::NodeId;

/// Transitive closure over the dependency mapping, including `start_nodes`.
pub fn reachable(
    start_nodes: &BTreeSet<NodeId>,
    dependencies: &BTreeMap<NodeId, BTreeSet<NodeId>>,
) -> BTreeSet<NodeId> {
    let mut visited: BTreeSet<NodeId> = BTreeSet::new();
    let mut to_check: Vec<NodeId> = start_nodes.iter().copied().collect();

    while let Some(node) = to_check.pop() {
        visited.insert(node);
        if let Some(deps) = dependencies.get(&node) {
            for dep in deps {
                if !visited.contains(dep) {
                    to_check.push(*dep);
                }
            }
        }
    }

    visited
}

/// Kahn's algorithm over the full mapping. Fails if any node is left
/// unprocessed, which indicates a cycle.
fn topo_sort(dependencies: &BTreeMap<NodeId, BTreeSet<NodeId>>) -> Result<Vec<NodeId>, FlowError> {
    // All nodes: keys plus anything referenced only as a dependency.
    let mut nodes: BTreeSet<NodeId> = dependencies.keys().copied().collect();
    for deps in dependencies.values() {
        nodes.extend(deps.iter().copied());
    }

    let mut in_degree: BTreeMap<NodeId, usize> = nodes.iter().map(|n| (*n, 0)).collect();
    let mut reverse_graph: BTreeMap<NodeId, BTreeSet<NodeId>> = BTreeMap::new();

    for (node, deps) in dependencies {
        for dep in deps {
            reverse_graph.entry(*dep).or_default().insert(*node);
            if let Some(count) = in_degree.get_mut(node) {
                *count += 1;
            }
        }
    }

    // Start with in-degree 0 nodes, pop and decrement reverse-neighbors.
    let mut queue: VecDeque<NodeId> = nodes
        .iter()
        .filter(|n| in_degree.get(n) == Some(&0))
        .copied()
        .collect();
    let mut topo_order = Vec::with_capacity(nodes.len());

    while let Some(node) = queue.pop_front() {
        topo_order.push(node);
        if let Some(neighbors) = reverse_graph.get(&node) {
            for neighbor in neighbors {
                if let Some(count) = in_degree.get_mut(neighbor) {
                    *count -= 1;
                    if *count == 0 {
                        queue.push_back(*neighbor);
                    }
                }
            }
        }
    }

    if topo_order.len() != nodes.len() {
        return Err(FlowError::CycleDetected);
    }

    Ok(topo_order)
}

/// Topologically sorts the subgraph reachable from `start_nodes`.
///
/// Dependencies always appear before dependents. Nodes outside the closure
/// of `start_nodes` are excluded entirely.
pub fn topo_sort_subgraph(
    start_nodes: &BTreeSet<NodeId>,
    dependencies: &BTreeMap<NodeId, BTreeSet<NodeId>>,
) -> Result<Vec<NodeId>, FlowError> {
    let subgraph_nodes = reachable(start_nodes, dependencies);

    let mut subgraph: BTreeMap<NodeId, BTreeSet<NodeId>> = BTreeMap::new();
    for node in &subgraph_nodes {
        let deps = dependencies
            .get(node)
            .map(|deps| deps.intersection(&subgraph_nodes).copied().collect())
            .unwrap_or_default();
        subgraph.insert(*node, deps);
    }

    topo_sort(&subgraph)
}
