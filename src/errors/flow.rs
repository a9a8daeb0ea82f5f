// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised by the incremental graph engine.
//!
//! Every variant except [`FlowError::ProcessorFailure`] is fatal for the
//! traversal that raised it. `ProcessorFailure` wraps whatever a user
//! processor returned from `process()` and is the only class of error that
//! `process_batch` will quarantine when running fault-tolerant.

use std::path::PathBuf;

use thiserror::Error;

use crate::flow::NodeId;
use crate::typing::TypeMismatch;

/// Engine-originated errors for graph construction, traversal and persistence.
#[derive(Error, Debug)]
pub enum FlowError {
    /// A node id was registered twice. Freed ids must not be reused either.
    #[error("node id already added: {id}")]
    UnicityViolation { id: NodeId },

    /// The dependency graph contains at least one cycle.
    #[error("graph has at least one cycle, topological sort not possible")]
    CycleDetected,

    /// A handle or id does not refer to a node in this graph.
    #[error("node not found in graph: {id}")]
    UnknownNode { id: NodeId },

    /// `set` named an input that was not declared in `add_node`, or
    /// `set_value` was called on a node without a default argument.
    #[error("argument was not found in add_node for node {id}: {arg}")]
    UnknownInput { id: NodeId, arg: String },

    /// A node read an upstream dependency that has no computed result.
    #[error("dependent node was not run: id={id} {name}")]
    UpstreamNotComputed { id: NodeId, name: String },

    /// Argument validation rejected one or more inputs.
    #[error("error validating arguments for node {id} ({name}): {source}")]
    TypeMismatch {
        id: NodeId,
        name: String,
        source: TypeMismatch,
    },

    /// The batch prep hook returned without binding a persistence path.
    #[error("persist() must be called in the prep hook")]
    PrepMissingPersist,

    /// A user processor failed. The only error class subject to
    /// fault-tolerant batch handling.
    #[error("processor failed for node {id} ({name}): {error}")]
    ProcessorFailure {
        id: NodeId,
        name: String,
        error: anyhow::Error,
    },

    /// Reading or writing the persisted graph state failed.
    #[error("persistence failure at {path}: {message}")]
    Persistence { path: PathBuf, message: String },
}

impl FlowError {
    pub(crate) fn persistence(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        FlowError::Persistence {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
