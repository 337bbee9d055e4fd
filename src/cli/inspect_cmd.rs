//! `montax inspect [FILE]` — summarize a persisted response artifact.

use crate::artifacts;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Inspect the named artifact, or the newest one under `logs/`.
pub fn run(file: Option<PathBuf>) -> Result<()> {
    let path = match file {
        Some(p) => p,
        None => artifacts::newest_response(Path::new(artifacts::DEFAULT_LOG_DIR))?,
    };

    let report = artifacts::inspect(&path)?;

    println!("File: {}", report.path.display());
    println!("Size: {} bytes", report.size_bytes);
    match report.total_pages {
        Some(total) => println!("Page Information: {total} total pages"),
        None => println!("Page Information: no page marker found"),
    }
    println!("Number of records found: {}", report.record_count);

    if !report.sample.is_empty() {
        println!();
        println!("Sample Records (first {}):", report.sample.len());
        for (i, r) in report.sample.iter().enumerate() {
            println!(
                "{}. Ticket: {}, Type: {}, Name: {}, Address: {}, Amount: {}",
                i + 1,
                r.ticket,
                r.record_type,
                r.taxpayer_name,
                r.address,
                r.amount
            );
        }
    }

    println!();
    println!("File inspection complete");
    Ok(())
}
