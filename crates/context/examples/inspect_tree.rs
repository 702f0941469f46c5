//! Example: Run one detection pass over a tree dumped to JSON.
//!
//! Run with: cargo run -p veil-context --example inspect_tree -- tree.json

use veil_context::{classify, detect};
use veil_detect::SnapshotNode;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for debug output
    tracing_subscriber::fmt()
        .with_env_filter("veil_context=debug,veil_detect=trace")
        .init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: inspect_tree <tree.json>");
        std::process::exit(2);
    };

    let json = std::fs::read_to_string(&path)?;
    let root: SnapshotNode = serde_json::from_str(&json)?;

    println!("=== {} ({} nodes) ===", path, root.node_count());
    println!("Context: {}", classify(&root));
    println!("{}", serde_json::to_string_pretty(&detect(&root))?);

    Ok(())
}
