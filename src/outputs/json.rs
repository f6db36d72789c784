//! JSON report of a pipeline run.
//!
//! Serializes the [`PipelineResult`] (counts, CSV path and the full table
//! listing) for consumption by other tools. Only written when a report path
//! is configured.

use crate::models::PipelineResult;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `result` as pretty-printed JSON to `path`, creating parent directories.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_report(result: &PipelineResult, path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(result)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create report dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!(records = result.db_content.len(), "Wrote JSON report");
    Ok(())
}
