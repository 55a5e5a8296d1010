//! CLI command handlers. Each command is in its own file.

mod bench;
mod inspect;
mod process;
mod worker;

pub use bench::run_bench;
pub use inspect::run_inspect;
pub use process::{run_process, ProcessOptions};
pub use worker::run_worker;

use anyhow::{Context, Result};
use hario_core::config::PipelineSettings;
use hario_core::{har, HarLog, HarioConfig, PipelineConfig, SchemaRegistry};
use std::path::Path;

use super::PipelineArgs;

/// Load and validate a HAR file with the configured depth limit.
fn load_har(cfg: &HarioConfig, path: &Path) -> Result<HarLog> {
    let registry = SchemaRegistry::standard()
        .to_builder()
        .max_depth(cfg.validation.max_depth)
        .build();
    let log = har::parse_path(path, &registry).with_context(|| format!("load HAR: {}", path.display()))?;
    tracing::info!(entries = log.len(), path = %path.display(), "loaded HAR");
    Ok(log)
}

/// `[pipeline]` settings with command-line overrides applied.
fn pipeline_settings(cfg: &HarioConfig, sizing: &PipelineArgs) -> PipelineSettings {
    let mut settings = cfg.pipeline.clone();
    if let Some(batch_size) = sizing.batch_size {
        settings.batch_size = batch_size;
    }
    if sizing.workers.is_some() {
        settings.max_workers = sizing.workers;
    }
    settings
}

fn pipeline_config(settings: PipelineSettings) -> Result<PipelineConfig> {
    PipelineConfig::try_from(settings).context("invalid pipeline settings")
}
