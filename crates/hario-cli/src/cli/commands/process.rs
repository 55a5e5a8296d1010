//! `hario process <path>`: print transformed entries as NDJSON.

use anyhow::{Context, Result};
use hario_core::transform::{domain, flatten, normalize_sizes, normalize_timings};
use hario_core::{HarioConfig, IdFn, Pipeline, Strategy};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::{load_har, pipeline_config, pipeline_settings};
use crate::cli::PipelineArgs;

#[derive(Debug, Default)]
pub struct ProcessOptions {
    pub strategy: Option<Strategy>,
    pub sizing: PipelineArgs,
    pub id_field: Option<String>,
    pub id_by: Vec<String>,
    pub normalize: bool,
    pub flatten: bool,
    pub domain: bool,
}

fn build_pipeline(cfg: &HarioConfig, opts: &ProcessOptions) -> Result<Pipeline> {
    let mut settings = pipeline_settings(cfg, &opts.sizing);
    if let Some(strategy) = opts.strategy {
        settings.strategy = strategy;
    }
    let id = if opts.id_by.is_empty() {
        IdFn::uuid()
    } else {
        IdFn::by_field(opts.id_by.iter().cloned())
    };
    let id_field = opts.id_field.clone().unwrap_or_else(|| cfg.id_field.clone());

    let mut builder = Pipeline::builder()
        .id(id, id_field)
        .config(pipeline_config(settings)?);
    if opts.normalize {
        builder = builder
            .transformer(normalize_sizes())
            .transformer(normalize_timings());
    }
    if opts.domain {
        builder = builder.transformer(domain("domain"));
    }
    // Flatten last so earlier steps still see nested paths.
    if opts.flatten {
        builder = builder.transformer(flatten());
    }
    Ok(builder.build())
}

pub async fn run_process(cfg: &HarioConfig, path: &Path, opts: ProcessOptions) -> Result<()> {
    let log = load_har(cfg, path)?;
    let pipeline = build_pipeline(cfg, &opts)?;
    tracing::debug!(chain = ?pipeline.chain(), strategy = %pipeline.config().strategy(), "processing");

    let records = log.entry_records().context("dump validated entries")?;
    let results = pipeline.process_async(records).await?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for record in &results {
        serde_json::to_writer(&mut out, record)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_shape_the_chain() {
        let cfg = HarioConfig::default();
        let opts = ProcessOptions {
            id_by: vec!["request.url".into()],
            normalize: true,
            flatten: true,
            domain: true,
            ..Default::default()
        };
        let pipeline = build_pipeline(&cfg, &opts).unwrap();
        let names: Vec<_> = pipeline.chain().names().collect();
        assert_eq!(
            names,
            [
                "set_id[by_field(request.url)]",
                "normalize_sizes",
                "normalize_timings",
                "domain",
                "flatten"
            ]
        );
    }

    #[test]
    fn overrides_beat_config() {
        let cfg = HarioConfig::default();
        let opts = ProcessOptions {
            strategy: Some(Strategy::Thread),
            sizing: PipelineArgs {
                batch_size: Some(5),
                workers: Some(2),
            },
            ..Default::default()
        };
        let pipeline = build_pipeline(&cfg, &opts).unwrap();
        assert_eq!(pipeline.config().strategy(), Strategy::Thread);
        assert_eq!(pipeline.config().batch_size(), 5);
        assert_eq!(pipeline.config().max_workers(), Some(2));
        assert_eq!(pipeline.chain().names().next(), Some("set_id[uuid]"));
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let opts = ProcessOptions {
            sizing: PipelineArgs {
                batch_size: Some(0),
                workers: None,
            },
            ..Default::default()
        };
        assert!(build_pipeline(&HarioConfig::default(), &opts).is_err());
    }
}
