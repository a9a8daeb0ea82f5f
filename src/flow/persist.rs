// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Codec between graph nodes and the persisted JSON state document.
//!
//! The document is an object keyed by string-encoded node ids (a JSON
//! constraint; ids are parsed back to integers at load). Each record:
//!
//! ```json
//! {
//!   "name": "transcriber",
//!   "output": {"text": "..."},
//!   "version": 2,
//!   "meta": {"output_ts": 1723112000.5, "time": 4.2, "overriden": true, "passive": true}
//! }
//! ```
//!
//! `overriden` and `passive` appear only when set (the historical spelling
//! is kept for on-disk compatibility). A record-level `output_ts` is an
//! obsolete layout still accepted at load.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::FlowError;
use crate::flow::node::GraphNode;
use crate::flow::Version;
use crate::observability::messages::node::NodeNameChanged;
use crate::observability::messages::StructuredLog;

/// One node's persisted record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedNode {
    /// Processor name at save time; a mismatch at load warns and proceeds
    /// so processors can be renamed without losing cached results.
    pub name: String,
    pub output: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PersistedMeta>,
    /// Obsolete record-level timestamp, read for backward compatibility.
    #[serde(default, rename = "output_ts", skip_serializing)]
    pub legacy_output_ts: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistedMeta {
    pub output_ts: Option<f64>,
    pub time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overriden: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passive: Option<bool>,
}

pub(crate) fn to_record(node: &GraphNode) -> PersistedNode {
    PersistedNode {
        name: node.name().to_string(),
        output: node.result.clone(),
        version: Some(node.result_version.clone()),
        meta: Some(PersistedMeta {
            output_ts: node.result_timestamp,
            time: node.compute_time,
            overriden: node.was_overridden.then_some(true),
            passive: node.passive.then_some(true),
        }),
        legacy_output_ts: None,
    }
}

pub(crate) fn apply_record(node: &mut GraphNode, record: &PersistedNode) {
    if record.name != node.name() {
        NodeNameChanged {
            node_id: node.id,
            stored: &record.name,
            current: node.name(),
        }
        .log();
    }

    node.result = record.output.clone();
    // The saved version is the version of the stored result, not the node's
    // current version.
    if let Some(version) = &record.version {
        node.result_version = version.clone();
    }
    if let Some(legacy_ts) = record.legacy_output_ts {
        node.result_timestamp = Some(legacy_ts);
    }
    if let Some(meta) = &record.meta {
        node.result_timestamp = meta.output_ts;
        node.compute_time = meta.time;
        if let Some(overriden) = meta.overriden {
            node.was_overridden = overriden;
        }
    }
}

/// Reads a state document. A missing file is not an error; a malformed one is.
pub(crate) fn read_document(
    path: &Path,
) -> Result<Option<serde_json::Map<String, Value>>, FlowError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(FlowError::persistence(path, err)),
    };
    let value: Value =
        serde_json::from_str(&content).map_err(|err| FlowError::persistence(path, err))?;
    match value {
        Value::Object(map) => Ok(Some(map)),
        other => Err(FlowError::persistence(
            path,
            format!("expected a JSON object, found {}", other),
        )),
    }
}

/// Writes the state document atomically: serialize to a sibling temp file,
/// then rename over the target. A crash mid-write leaves either the previous
/// document or the new one, never a torn file.
pub(crate) fn write_document(
    path: &Path,
    document: &serde_json::Map<String, Value>,
) -> Result<(), FlowError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| FlowError::persistence(path, err))?;
        }
    }

    let content = serde_json::to_string(document).map_err(|err| FlowError::persistence(path, err))?;

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    fs::write(&tmp_path, content).map_err(|err| FlowError::persistence(&tmp_path, err))?;
    fs::rename(&tmp_path, path).map_err(|err| FlowError::persistence(path, err))?;
    Ok(())
}
