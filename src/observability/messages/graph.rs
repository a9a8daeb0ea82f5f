// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for graph run and batch lifecycle events.

use std::fmt::{Display, Formatter};
use std::time::Duration;

use tracing::Span;

use crate::flow::NodeId;
use crate::observability::messages::StructuredLog;

/// A depth-first run over the reachable subgraph has started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use graphmill::observability::messages::graph::RunStarted;
///
/// let msg = RunStarted { target_count: 1, node_count: 5 };
/// tracing::info!("{}", msg);
/// ```
pub struct RunStarted {
    pub target_count: usize,
    pub node_count: usize,
}

impl Display for RunStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Running graph up to {} target(s): {} nodes in traversal",
            self.target_count, self.node_count
        )
    }
}

impl StructuredLog for RunStarted {
    fn log(&self) {
        tracing::info!(
            target_count = self.target_count,
            node_count = self.node_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run_upto",
            span_name = name,
            target_count = self.target_count,
            node_count = self.node_count,
        )
    }
}

/// A depth-first run finished.
///
/// # Log Level
/// `info!`
pub struct RunCompleted {
    pub node_count: usize,
    pub duration: Duration,
}

impl Display for RunCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Graph run completed: {} nodes in {:?}",
            self.node_count, self.duration
        )
    }
}

impl StructuredLog for RunCompleted {
    fn log(&self) {
        tracing::info!(
            node_count = self.node_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run_completed",
            span_name = name,
            node_count = self.node_count,
            duration = ?self.duration,
        )
    }
}

/// A breadth-first batch traversal has started.
///
/// # Log Level
/// `info!`
pub struct BatchStarted {
    pub item_count: usize,
    pub node_count: usize,
}

impl Display for BatchStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processing batch of {} item(s) across {} node(s)",
            self.item_count, self.node_count
        )
    }
}

impl StructuredLog for BatchStarted {
    fn log(&self) {
        tracing::info!(
            item_count = self.item_count,
            node_count = self.node_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "process_batch",
            span_name = name,
            item_count = self.item_count,
            node_count = self.node_count,
        )
    }
}

/// An item is being skipped because an earlier node already failed for it.
///
/// # Log Level
/// `info!`
pub struct BatchItemSkipped {
    pub item_index: usize,
}

impl Display for BatchItemSkipped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Skipping item {} due to previous error", self.item_index)
    }
}

impl StructuredLog for BatchItemSkipped {
    fn log(&self) {
        tracing::info!(item_index = self.item_index, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("batch_item_skipped", span_name = name, item_index = self.item_index)
    }
}

/// A node failed while processing a batch item.
///
/// # Log Level
/// `warn!` - The batch continues when fault tolerant; the failure record
/// carries the full error either way
pub struct BatchItemFailed<'a> {
    pub item_index: usize,
    pub node_id: NodeId,
    pub name: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for BatchItemFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Error processing item {} for node {} ({}): {}",
            self.item_index, self.node_id, self.name, self.error
        )
    }
}

impl StructuredLog for BatchItemFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            item_index = self.item_index,
            node_id = self.node_id,
            name = self.name,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "batch_item_failed",
            span_name = name,
            item_index = self.item_index,
            node_id = self.node_id,
            node_name = self.name,
            error = %self.error,
        )
    }
}

/// A batch traversal finished.
///
/// # Log Level
/// `info!`
pub struct BatchCompleted {
    pub completed: usize,
    pub failed: usize,
}

impl Display for BatchCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Batch completed: {} item(s) succeeded, {} failed",
            self.completed, self.failed
        )
    }
}

impl StructuredLog for BatchCompleted {
    fn log(&self) {
        tracing::info!(completed = self.completed, failed = self.failed, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "batch_completed",
            span_name = name,
            completed = self.completed,
            failed = self.failed,
        )
    }
}
