// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Engine-level persistence tests across graph restarts.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::flow::{Inputs, NodeHandle, ProcessGraph};
use crate::traits::{Processor, ProcessorSpec};
use crate::typing::{ArgMap, Signature, TypeSpec};

struct SlowSquare {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Processor for SlowSquare {
    fn name(&self) -> &str {
        "slow_square"
    }

    fn signature(&self) -> Signature {
        Signature::new().required("x", TypeSpec::Int)
    }

    async fn process(&mut self, args: ArgMap) -> anyhow::Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let x = args.get("x").and_then(Value::as_i64).unwrap_or(0);
        Ok(json!(x * x))
    }
}

fn square_spec(calls: &Arc<AtomicUsize>) -> ProcessorSpec {
    let calls = calls.clone();
    ProcessorSpec::new("slow_square", move |_ctor| {
        Ok(Box::new(SlowSquare {
            calls: calls.clone(),
        }) as Box<dyn Processor>)
    })
}

fn build(calls: &Arc<AtomicUsize>) -> (ProcessGraph, NodeHandle) {
    let mut graph = ProcessGraph::new();
    let root = graph
        .add_node(1, square_spec(calls), Inputs::new().literal("x", 6))
        .unwrap();
    let tail = graph
        .add_node(2, square_spec(calls), Inputs::new().node("x", root))
        .unwrap();
    (graph, tail)
}

#[tokio::test]
async fn test_auto_save_writes_state_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("state.json");

    let calls = Arc::new(AtomicUsize::new(0));
    let (mut graph, tail) = build(&calls);
    graph.persist(&path).unwrap();

    assert_eq!(graph.run_upto(&[tail]).await.unwrap(), json!(1296));
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // Both results are on disk, keyed by stringified id.
    let document: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(document["1"]["output"], json!(36));
    assert_eq!(document["2"]["output"], json!(1296));
    assert_eq!(document["2"]["name"], json!("slow_square"));
}

#[tokio::test]
async fn test_restart_resumes_without_recompute() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    let calls = Arc::new(AtomicUsize::new(0));
    {
        let (mut graph, tail) = build(&calls);
        graph.persist(&path).unwrap();
        graph.run_upto(&[tail]).await.unwrap();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // Simulated restart: same topology, state rehydrated from disk.
    let (mut graph, tail) = build(&calls);
    graph.persist(&path).unwrap();
    assert_eq!(graph.run_upto(&[tail]).await.unwrap(), json!(1296));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_interrupted_run_resumes_midway() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    let calls = Arc::new(AtomicUsize::new(0));
    {
        // First session only computes the root node.
        let mut graph = ProcessGraph::new();
        let root = graph
            .add_node(1, square_spec(&calls), Inputs::new().literal("x", 6))
            .unwrap();
        graph.persist(&path).unwrap();
        graph.run_upto(&[root]).await.unwrap();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Second session adds the tail; only the tail computes.
    let (mut graph, tail) = build(&calls);
    graph.persist(&path).unwrap();
    assert_eq!(graph.run_upto(&[tail]).await.unwrap(), json!(1296));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
