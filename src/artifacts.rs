//! Append-only artifact log of raw portal responses.
//!
//! Every successful response body is written verbatim to a timestamped HTML
//! file so a search can be re-inspected offline after the fact. The
//! `inspect` subcommand reads the newest (or a named) artifact back and
//! summarizes it without touching the network.

use crate::extract;
use anyhow::{bail, Context, Result};
use chrono::Local;
use std::path::{Path, PathBuf};

/// Default directory for response artifacts and log files.
pub const DEFAULT_LOG_DIR: &str = "logs";

const RESPONSE_PREFIX: &str = "response_";

/// Write one raw response body to `dir/response_<timestamp>.html`.
pub fn persist_response(dir: &Path, body: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create artifact dir {}", dir.display()))?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("{RESPONSE_PREFIX}{timestamp}.html"));
    std::fs::write(&path, body)
        .with_context(|| format!("failed to write artifact {}", path.display()))?;

    Ok(path)
}

/// Find the most recently modified response artifact under `dir`.
pub fn newest_response(dir: &Path) -> Result<PathBuf> {
    if !dir.exists() {
        bail!("no artifact directory at {}", dir.display());
    }

    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(RESPONSE_PREFIX) && n.ends_with(".html"))
                .unwrap_or(false)
        })
        .collect();

    if candidates.is_empty() {
        bail!("no response artifacts found in {}", dir.display());
    }

    candidates.sort_by_key(|p| {
        std::fs::metadata(p)
            .and_then(|m| m.modified())
            .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
    });

    Ok(candidates.pop().expect("non-empty"))
}

/// Summary of one persisted response, for the `inspect` subcommand.
#[derive(Debug)]
pub struct InspectionReport {
    pub path: PathBuf,
    pub size_bytes: usize,
    pub total_pages: Option<u32>,
    pub record_count: usize,
    /// Up to the first three records, for a quick sanity check.
    pub sample: Vec<extract::Record>,
}

/// Read an artifact back and summarize page info, record count, and a
/// 3-record sample. This is a debugging aid, not part of the search path.
pub fn inspect(path: &Path) -> Result<InspectionReport> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let page = extract::extract_page(&content, 1);
    let record_count = page.records.len();
    let sample = page.records.into_iter().take(3).collect();

    Ok(InspectionReport {
        path: path.to_path_buf(),
        size_bytes: content.len(),
        total_pages: page.total_pages,
        record_count,
        sample,
    })
}
