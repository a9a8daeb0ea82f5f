// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

use crate::flow::NodeId;

/// Errors that can occur during pipeline configuration validation
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A circular dependency was detected between node entries
    CyclicDependency {
        /// The cycle path showing the circular dependency
        cycle: Vec<NodeId>,
    },
    /// A node input references a node id that doesn't exist
    UnresolvedDependency {
        /// The node that has the unresolved reference
        node_id: NodeId,
        /// The referenced id that couldn't be resolved
        missing_dependency: NodeId,
    },
    /// A node entry reuses an id
    DuplicateNodeId {
        /// The duplicate node id
        node_id: NodeId,
    },
    /// A node entry names a processor the registry doesn't know
    UnknownProcessor {
        node_id: NodeId,
        processor: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::CyclicDependency { cycle } => {
                let path: Vec<String> = cycle.iter().map(|id| id.to_string()).collect();
                write!(f, "Cyclic dependency detected: {}", path.join(" -> "))
            }
            ValidationError::UnresolvedDependency {
                node_id,
                missing_dependency,
            } => {
                write!(
                    f,
                    "Node {} references node {} which does not exist",
                    node_id, missing_dependency
                )
            }
            ValidationError::DuplicateNodeId { node_id } => {
                write!(f, "Duplicate node id: {}", node_id)
            }
            ValidationError::UnknownProcessor { node_id, processor } => {
                write!(
                    f,
                    "Node {} names unknown processor '{}'",
                    node_id, processor
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}
