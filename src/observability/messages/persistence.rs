// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for graph state persistence events.

use std::fmt::{Display, Formatter};
use std::path::Path;

use tracing::Span;

use crate::observability::messages::StructuredLog;

/// The graph state was serialized and written to disk.
///
/// # Log Level
/// `debug!` - Fires on every node result when auto-save is bound
pub struct StateSaved<'a> {
    pub path: &'a Path,
    pub node_count: usize,
}

impl Display for StateSaved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Saving graph state to {} ({} node(s))",
            self.path.display(),
            self.node_count
        )
    }
}

impl StructuredLog for StateSaved<'_> {
    fn log(&self) {
        tracing::debug!(
            path = %self.path.display(),
            node_count = self.node_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "state_saved",
            span_name = name,
            path = %self.path.display(),
            node_count = self.node_count,
        )
    }
}

/// Persisted results were rehydrated into the graph.
///
/// # Log Level
/// `info!`
pub struct StateLoaded<'a> {
    pub path: &'a Path,
    pub loaded: usize,
    pub total: usize,
}

impl Display for StateLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded nodes from {}: {} of {}",
            self.path.display(),
            self.loaded,
            self.total
        )
    }
}

impl StructuredLog for StateLoaded<'_> {
    fn log(&self) {
        tracing::info!(
            path = %self.path.display(),
            loaded = self.loaded,
            total = self.total,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "state_loaded",
            span_name = name,
            path = %self.path.display(),
            loaded = self.loaded,
            total = self.total,
        )
    }
}
