//! Example: Parse and inspect a Maya ASCII file.
//!
//! Run with: cargo run --example dump_ma -- scenes/box.ma [--json]

use std::env;

use anyhow::Context;
use mascii_core::ma::{parse_file, Statement};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("Usage: dump_ma <path-to-ma-file> [--json]");
        println!("\nExamples:");
        println!("  cargo run --example dump_ma -- scenes/box.ma");
        println!("  cargo run --example dump_ma -- scenes/box.ma --json > box.json");
        return Ok(());
    }

    let path = &args[1];
    let doc = parse_file(path).with_context(|| format!("Failed to parse {}", path))?;

    if args.iter().any(|a| a == "--json") {
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("=== {} ===", path);
    println!("Commands: {}", doc.len());
    println!("Errors: {}", doc.errors.len());
    println!("Warnings: {}", doc.warnings.len());

    println!("\n--- Requires ---");
    for requires in doc.requires() {
        println!("  {} {}", requires.plugin, requires.version);
    }

    println!("\n--- References ---");
    for file in doc.files().filter(|f| f.reference_node.is_some()) {
        println!(
            "  {} -> {} (namespace {})",
            file.reference_node.as_deref().unwrap_or_default(),
            file.path,
            file.namespace.as_deref().unwrap_or("-")
        );
    }

    println!("\n--- Nodes ---");
    for (node, attrs) in doc.node_attrs() {
        println!(
            "  {} {} ({} attributes)",
            node.node_type,
            node.name.as_deref().unwrap_or("<unnamed>"),
            attrs.len()
        );
        for record in attrs {
            println!(
                "       {} {} x{}",
                record.path,
                record.attr_type,
                record.values.len()
            );
        }
    }

    let merged = doc
        .statements
        .iter()
        .filter(|s| matches!(s, Statement::SetAttrContinuation { .. }))
        .count();
    println!("\nConnections: {}", doc.connections().count());
    println!("Merged continuations: {}", merged);

    if !doc.errors.is_empty() {
        println!("\n--- Errors ---");
        for error in &doc.errors {
            println!("  {}", error);
        }
    }
    for warning in &doc.warnings {
        println!("  warning (line {}): {}", warning.line, warning.message);
    }

    Ok(())
}
