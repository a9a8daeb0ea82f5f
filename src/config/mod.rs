// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod registry;
mod runtime;
mod validation;

#[cfg(test)]
mod integration_tests;

pub use loader::{load_and_validate_pipeline, load_pipeline, InputSpec, NodeEntry, NodeRef, PipelineConfig};
pub use registry::ProcessorRegistry;
pub use runtime::build_graph;
pub use validation::validate_pipeline;
