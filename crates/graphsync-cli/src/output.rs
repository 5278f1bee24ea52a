//! Terminal output formatting.

use colored::Colorize;
use graphsync_core::NodeDetail;
use graphsync_graph::sync::{IngestReport, ItemKind, SkipReason};
use serde_json::Value;

/// Print an ingestion report.
pub fn print_report(report: &IngestReport) {
    println!();
    println!("{:<8} {:>9} {:>9} {:>9} {:>9}", "", "attempted", "created", "merged", "skipped");
    for (name, counts) in [("Nodes", &report.nodes), ("Edges", &report.edges)] {
        println!(
            "{:<8} {:>9} {:>9} {:>9} {:>9}",
            name.bold(),
            counts.attempted,
            counts.created.to_string().green(),
            counts.merged.to_string().cyan(),
            counts.skipped.to_string().yellow()
        );
    }

    if report.is_complete() {
        println!("\n{}", "All records written.".green().bold());
        return;
    }

    println!("\n{}", "Skipped records".bold());
    for item in &report.skipped {
        let kind = match item.kind {
            ItemKind::Node => "node".cyan(),
            ItemKind::Edge => "edge".magenta(),
        };
        let reason = match &item.reason {
            SkipReason::Malformed(detail) => format!("malformed: {}", detail),
            SkipReason::WriteFailed(detail) => format!("write failed: {}", detail),
            SkipReason::UnresolvedEndpoint => "endpoint not found".to_string(),
        };
        println!(
            "  {} {} #{} {} {}",
            "•".dimmed(),
            kind,
            item.index,
            item.id.as_deref().unwrap_or("-"),
            reason.dimmed()
        );
    }
}

/// Print a node's labels and properties.
pub fn print_node_detail(detail: &NodeDetail) {
    println!("{} {}", detail.id.cyan().bold(), format!("[{}]", detail.labels.join(", ")).dimmed());
    println!("{}", "─".repeat(50));

    for (key, value) in &detail.properties {
        let rendered = match value {
            Value::Object(_) | Value::Array(_) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        println!("  {}: {}", key.bold(), rendered);
    }
}
