//! Tracing setup: stderr plus a timestamped log file under `logs/`.

use anyhow::{Context, Result};
use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing. Verbosity comes from repeated `-v` flags
/// (0 = warn, 1 = info, 2+ = debug); `RUST_LOG` overrides when set.
///
/// Returns the path of the log file for this run.
pub fn init(verbosity: u8, log_dir: &Path) -> Result<PathBuf> {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("montax={level}")));

    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log dir {}", log_dir.display()))?;
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = log_dir.join(format!("tax_search_{timestamp}.log"));
    let file = std::fs::File::create(&path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
        .init();

    Ok(path)
}
