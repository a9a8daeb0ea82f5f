// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::time::Instant;

use graphmill::config::{build_graph, load_and_validate_pipeline, ProcessorRegistry};
use graphmill::flow::NodeId;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <pipeline.yaml> [target_node_id ...]", args[0]);
        eprintln!("Example: {} pipelines/session.yaml", args[0]);
        eprintln!("Example: {} pipelines/session.yaml 7 9", args[0]);
        std::process::exit(1);
    }

    let config_file = &args[1];
    let target_ids: Vec<NodeId> = args[2..]
        .iter()
        .filter_map(|raw| match raw.parse() {
            Ok(id) => Some(id),
            Err(_) => {
                eprintln!("Ignoring non-integer target id: {}", raw);
                None
            }
        })
        .collect();

    if let Err(e) = run_pipeline(config_file, &target_ids).await {
        eprintln!("Failed to execute {}: {}", config_file, e);
        std::process::exit(1);
    }
}

async fn run_pipeline(
    config_file: &str,
    target_ids: &[NodeId],
) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();

    let cfg = load_and_validate_pipeline(config_file)?;
    let registry = ProcessorRegistry::with_builtins();
    let mut graph = build_graph(&cfg, &registry)?;

    if let Some(state) = &cfg.state {
        graph.persist(state.clone())?;
    }

    // Without explicit targets, run up to every sink node.
    let targets = if target_ids.is_empty() {
        graph.sinks()
    } else {
        let mut handles = Vec::new();
        for id in target_ids {
            match graph.handle(*id) {
                Some(handle) => handles.push(handle),
                None => return Err(format!("no node with id {} in pipeline", id).into()),
            }
        }
        handles
    };

    println!("Pipeline: {}", config_file);
    println!(
        "Nodes: {} total, running up to {} target(s)",
        graph.node_count(),
        targets.len()
    );
    if cfg.dry_run {
        println!("Dry run: processors will not execute");
    }

    let execution_start = Instant::now();
    let result = graph.run_upto(&targets).await?;
    let execution_time = execution_start.elapsed();

    println!("\nResults:");
    for target in &targets {
        let name = graph.node_name(*target).unwrap_or("?");
        match graph.result(*target) {
            Some(value) => {
                println!("  {} ({}) -> {}", target.id(), name, value);
            }
            None => println!("  {} ({}) -> <no result>", target.id(), name),
        }
    }
    println!("\nLast result: {}", result);
    println!("Execution time: {:?}", execution_time);
    println!("Total time (including config load): {:?}", start_time.elapsed());

    graph.release_resources().await;
    Ok(())
}
