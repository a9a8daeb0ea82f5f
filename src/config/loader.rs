// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::flow::{NodeId, Version};
use crate::typing::ArgMap;

/// Main configuration structure for a pipeline definition.
///
/// A pipeline is a list of node entries loaded from a YAML file. Each entry
/// becomes one graph node; inputs are either literals or references to other
/// entries by id.
///
/// # Example
/// ```yaml
/// state: out/session_state.json
/// nodes:
///   - id: 1
///     processor: constant
///     name: source_path
///     inputs:
///       value: "media/session.mp4"
///   - id: 2
///     processor: change_case
///     constructor_args:
///       mode: upper
///     inputs:
///       text: {node: 1}
/// ```
#[derive(Debug, Deserialize)]
pub struct PipelineConfig {
    /// Skip processor instantiation, computation and state writes.
    #[serde(default)]
    pub dry_run: bool,
    /// Where the graph persists its results. Optional; without it results
    /// live only in memory.
    #[serde(default)]
    pub state: Option<PathBuf>,
    pub nodes: Vec<NodeEntry>,
}

/// Configuration for a single node in the pipeline.
///
/// # Fields
/// * `id` - Unique integer identifying the node
/// * `processor` - Processor name resolved through the registry ("constant"
///   is built in)
/// * `name` - Display name override, used by constants
/// * `version` - Logic version label; bump to force recomputation
/// * `passive` - Always re-run, never invalidate dependents (defaults to
///   true for constants, false otherwise)
/// * `force` - Always recompute this node
/// * `invalidate_before` - Epoch-seconds cutoff for stale results
/// * `default_arg` - Input written by `set_value`
/// * `constructor_args` - Passed to the processor factory once
/// * `inputs` - Literal values or `{node: ID}` references
#[derive(Debug, Deserialize)]
pub struct NodeEntry {
    pub id: NodeId,
    pub processor: String,
    pub name: Option<String>,
    #[serde(default)]
    pub version: Version,
    pub passive: Option<bool>,
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub invalidate_before: f64,
    pub default_arg: Option<String>,
    #[serde(default)]
    pub constructor_args: ArgMap,
    #[serde(default)]
    pub inputs: BTreeMap<String, InputSpec>,
}

/// A node input in the config: a `{node: ID}` reference or any literal.
///
/// Note the ambiguity this buys: a literal mapping whose only key is `node`
/// cannot be expressed, it will always parse as a reference.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InputSpec {
    Ref(NodeRef),
    Literal(Value),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeRef {
    pub node: NodeId,
}

/// Load a pipeline definition from a YAML file
pub fn load_pipeline<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let cfg: PipelineConfig = serde_yaml::from_str(&content)?;
    Ok(cfg)
}

/// Load and validate a pipeline definition from a YAML file
///
/// This function loads the configuration and validates the node entries to
/// ensure ids are unique, references resolve, and the graph is acyclic.
pub fn load_and_validate_pipeline<P: AsRef<Path>>(
    path: P,
) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    let cfg = load_pipeline(path)?;

    if let Err(validation_errors) = crate::config::validate_pipeline(&cfg) {
        let error_messages: Vec<String> = validation_errors.iter().map(|e| e.to_string()).collect();
        let combined_error = format!(
            "Pipeline validation failed:\n{}",
            error_messages.join("\n")
        );
        return Err(combined_error.into());
    }

    Ok(cfg)
}
