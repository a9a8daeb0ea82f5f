// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for per-node lifecycle events.
//!
//! Covers staleness decisions, result refreshes, manual overrides, and
//! resource release.

use std::fmt::{Display, Formatter};

use tracing::Span;

use crate::flow::NodeId;
use crate::observability::messages::StructuredLog;

/// A node's cached result can no longer be trusted and will be recomputed.
///
/// # Log Level
/// `info!` - Routine scheduling decision
///
/// # Example
/// ```
/// use graphmill::observability::messages::node::NodeStale;
///
/// let msg = NodeStale { node_id: 3, name: "transcriber", reason: "no result".to_string() };
/// tracing::info!("{}", msg);
/// ```
pub struct NodeStale<'a> {
    pub node_id: NodeId,
    pub name: &'a str,
    pub reason: String,
}

impl Display for NodeStale<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Needs update ({}): {} because {}",
            self.node_id, self.name, self.reason
        )
    }
}

impl StructuredLog for NodeStale<'_> {
    fn log(&self) {
        tracing::info!(
            node_id = self.node_id,
            name = self.name,
            reason = %self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "node_stale",
            span_name = name,
            node_id = self.node_id,
            node_name = self.name,
            reason = %self.reason,
        )
    }
}

/// A stale node is being recomputed.
///
/// # Log Level
/// `info!`
pub struct NodeRefreshing<'a> {
    pub node_id: NodeId,
    pub name: &'a str,
}

impl Display for NodeRefreshing<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Updating node ({}): {}", self.node_id, self.name)
    }
}

impl StructuredLog for NodeRefreshing<'_> {
    fn log(&self) {
        tracing::info!(node_id = self.node_id, name = self.name, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "node_refresh",
            span_name = name,
            node_id = self.node_id,
            node_name = self.name,
        )
    }
}

/// A node's cached result was served without recomputation.
///
/// # Log Level
/// `debug!` - High-volume on warm graphs
pub struct NodeCached<'a> {
    pub node_id: NodeId,
    pub name: &'a str,
}

impl Display for NodeCached<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Returning precomputed result for ({}): {}",
            self.node_id, self.name
        )
    }
}

impl StructuredLog for NodeCached<'_> {
    fn log(&self) {
        tracing::debug!(node_id = self.node_id, name = self.name, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "node_cached",
            span_name = name,
            node_id = self.node_id,
            node_name = self.name,
        )
    }
}

/// A manual override changed a node's output as seen by a dependent.
///
/// # Log Level
/// `warn!` - Overrides mask computed results and deserve attention
pub struct OverrideChangedOutput<'a> {
    pub node_id: NodeId,
    pub name: &'a str,
}

impl Display for OverrideChangedOutput<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Overriding has changed the output of {} ({})",
            self.node_id, self.name
        )
    }
}

impl StructuredLog for OverrideChangedOutput<'_> {
    fn log(&self) {
        tracing::warn!(node_id = self.node_id, name = self.name, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "override_changed",
            span_name = name,
            node_id = self.node_id,
            node_name = self.name,
        )
    }
}

/// A manual override ran but left the output unchanged.
///
/// # Log Level
/// `info!`
pub struct OverrideUnchanged<'a> {
    pub node_id: NodeId,
    pub name: &'a str,
}

impl Display for OverrideUnchanged<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Overriding has not changed the output of {} ({})",
            self.node_id, self.name
        )
    }
}

impl StructuredLog for OverrideUnchanged<'_> {
    fn log(&self) {
        tracing::info!(node_id = self.node_id, name = self.name, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "override_unchanged",
            span_name = name,
            node_id = self.node_id,
            node_name = self.name,
        )
    }
}

/// A node's processor instance is being finalized and dropped.
///
/// # Log Level
/// `info!`
pub struct NodeResourcesReleased<'a> {
    pub node_id: NodeId,
    pub name: &'a str,
}

impl Display for NodeResourcesReleased<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Releasing resources for node {}: {}",
            self.node_id, self.name
        )
    }
}

impl StructuredLog for NodeResourcesReleased<'_> {
    fn log(&self) {
        tracing::info!(node_id = self.node_id, name = self.name, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "node_release",
            span_name = name,
            node_id = self.node_id,
            node_name = self.name,
        )
    }
}

/// A persisted record carries a different processor name than the node
/// currently registered under that id.
///
/// # Log Level
/// `warn!` - Usually a deliberate refactor, but worth surfacing
pub struct NodeNameChanged<'a> {
    pub node_id: NodeId,
    pub stored: &'a str,
    pub current: &'a str,
}

impl Display for NodeNameChanged<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node {} has changed from {:?} to {:?}. Attempting to load anyway.",
            self.node_id, self.stored, self.current
        )
    }
}

impl StructuredLog for NodeNameChanged<'_> {
    fn log(&self) {
        tracing::warn!(
            node_id = self.node_id,
            stored = self.stored,
            current = self.current,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "node_name_changed",
            span_name = name,
            node_id = self.node_id,
            stored = self.stored,
            current = self.current,
        )
    }
}
