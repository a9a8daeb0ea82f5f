// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The incremental dependency-graph execution engine.
//!
//! A [`ProcessGraph`] owns a DAG of processor nodes, caches their results in
//! a human-readable JSON state file, and recomputes a node only when its
//! cached result can no longer be trusted (missing, older than a cutoff,
//! produced by an older version of the node logic, or staler than a
//! non-passive upstream).
//!
//! Two traversal disciplines are provided: `run_upto` walks one item's
//! dependency chain depth-first, while `process_batch` walks a whole batch
//! node-major so that the heavy resources a node holds are amortized across
//! every item before moving on.

pub mod algorithms;
pub mod graph;
pub mod node;
pub mod persist;

#[cfg(test)]
mod integration_tests;

pub use graph::{BatchFailure, BatchOptions, BatchStats, ProcessGraph};
pub use node::{Input, Inputs, NodeHandle, NodeOptions, OverrideFn, Version};

/// Nodes are identified by integers. Prefer counting up from 0; do not
/// reuse the id of a deleted node.
pub type NodeId = i64;

/// Seconds since the Unix epoch, as the engine stamps results.
pub(crate) fn epoch_now() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
