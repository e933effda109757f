use super::models::{MotifArgs, StatsArgs};
use crate::aggregator::{function_distributions, request_type_distributions};
use crate::codec::{motif_path, read_motifs, read_trace};
use crate::model::sort_motifs;
use crate::store::TraceStore;
use anyhow::{Context, Result};
use std::path::Path;

/// Print a binary trace file
pub fn inspect_trace(file_path: &Path, show_graph: bool) -> Result<()> {
    println!("Inspecting trace: {}", file_path.display());

    let trace = read_trace(file_path)
        .with_context(|| format!("Failed to read {}", file_path.display()))?;

    println!("✓ Valid trace file");
    println!("  Dataset:      {}", trace.dataset().human_readable());
    println!("  Base id:      {}", trace.base_id());
    println!("  Request type: {}", trace.request_type());
    if let Some(request) = trace.request() {
        println!("  Request:      {}", request);
    }
    println!("  Nodes:        {}", trace.nodes().len());
    println!("  Edges:        {}", trace.edges().len());
    println!("  Duration:     {} ns", trace.duration());

    if show_graph {
        println!();
        for node in trace.nodes() {
            println!(
                "  v {:>5} {:<10} {:>20} {}",
                node.index, node.variant, node.timestamp, node.name()
            );
        }
        for edge in trace.edges() {
            println!("  e {:>5} -> {:<5} {:>12} ns", edge.source, edge.destination, edge.duration);
        }
    }

    Ok(())
}

/// Print the motifs mined from one trace
pub fn display_motifs(args: &MotifArgs) -> Result<()> {
    let trace = read_trace(&args.trace)
        .with_context(|| format!("Failed to read {}", args.trace.display()))?;

    let path = match &args.motifs {
        Some(path) => path.clone(),
        None => motif_path(&args.motif_dir, trace.dataset(), trace.base_id()),
    };

    let mut motifs = read_motifs(&path, &trace)
        .with_context(|| format!("Failed to read motifs from {}", path.display()))?;
    if args.sorted {
        sort_motifs(&mut motifs);
    }

    println!("{} motifs in trace {} ({})", motifs.len(), trace.base_id(), path.display());
    for motif in &motifs {
        println!(
            "  pattern {:>5} | size {:>3} | start {:>20} | duration {:>12} ns | nodes {:?}",
            motif.motif_index(),
            motif.size(),
            motif.minimum_timestamp(),
            motif.duration(),
            motif.node_indices()
        );
    }

    Ok(())
}

/// Print duration statistics for a stored dataset
pub fn display_stats(args: &StatsArgs) -> Result<()> {
    let store = TraceStore::new(&args.trace_dir);
    let groups = store
        .load_dataset(args.dataset)
        .with_context(|| format!("Failed to load {} traces", args.dataset))?;

    println!("\n{}", "=".repeat(80));
    println!("{} TRACE DURATIONS", args.dataset.human_readable().to_uppercase());
    println!("{}", "=".repeat(80));
    for (request_type, dist) in request_type_distributions(groups.values().flatten()) {
        println!("{:<24} {}", request_type, dist.summary());
    }

    if args.functions {
        let functions = function_distributions(groups.values().flatten())
            .context("Failed to pair Entry/Exit nodes")?;
        println!("\nFUNCTION DURATIONS");
        println!("{}", "-".repeat(80));
        if functions.is_empty() {
            println!("(no Entry/Exit pairs in this dataset)");
        }
        for (function, dist) in functions {
            println!("{:<40} {}", function, dist.summary());
        }
    }
    println!("{}", "=".repeat(80));

    Ok(())
}

/// Display version information
pub fn display_version() {
    println!("trace-motifs v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Converts distributed-system traces into a canonical binary form");
    println!("and exports them for frequent-subgraph mining.");
}
