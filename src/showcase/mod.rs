//! Log playback: encodes a flushed event log and hands it to an external
//! viewer via the browser, the same delegate-to-a-viewer approach as the
//! detector's host crate.

pub mod encoder;

pub use encoder::process_log_for_url;

use std::path::Path;

use anyhow::{Context, Result};

use crate::core::logger;

const SHOWCASE_BASE_URL: &str = "https://cyclewatch-viewer.example/?logs=";

/// Encodes `log_path` and opens it in the default browser.
pub fn showcase<P: AsRef<Path>>(log_path: P) -> Result<()> {
    let encoded = process_log_for_url(&log_path).context("failed to encode log file for viewer")?;
    let url = format!("{SHOWCASE_BASE_URL}{encoded}");
    webbrowser::open(&url).context("failed to open browser")?;
    Ok(())
}

/// Showcases the log file path recorded by the active `EventLogger`, if any.
pub fn showcase_current() -> Result<()> {
    let path = logger::current_log_path().ok_or_else(|| anyhow::anyhow!("no active log file"))?;
    showcase(path)
}
