//! `hario inspect <path>`: show the schema each entry resolved to.

use anyhow::Result;
use hario_core::{HarLog, HarioConfig};
use std::collections::BTreeMap;
use std::path::Path;

use super::load_har;

fn print_inspection(log: &HarLog) {
    println!("HAR {} from {} {}", log.version, log.creator.name, log.creator.version);
    println!("  {:>5}  {:<18}  {:<7}  {}", "Entry", "Schema", "Method", "URL");
    println!("  {}  {}  {}  {}", "-----", "------------------", "-------", "---");
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for (i, resolved) in log.entries.iter().enumerate() {
        let request = resolved.entry().request();
        let schema = resolved.schema();
        println!(
            "  {:>5}  {:<18}  {:<7}  {}",
            i,
            format!("{}@{}", schema.name(), schema.version()),
            request.method,
            request.url
        );
        *counts.entry(schema.name()).or_default() += 1;
    }
    for (name, count) in counts {
        println!("{name}: {count} entries");
    }
}

pub fn run_inspect(cfg: &HarioConfig, path: &Path) -> Result<()> {
    let log = load_har(cfg, path)?;
    if log.is_empty() {
        println!("No entries.");
        return Ok(());
    }
    print_inspection(&log);
    Ok(())
}
