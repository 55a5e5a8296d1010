//! CLI for the hario HAR processing pipeline.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use hario_core::config;
use hario_core::{HarioConfig, Strategy};
use std::path::PathBuf;

use commands::{run_bench, run_inspect, run_process, run_worker, ProcessOptions};

/// Top-level CLI for hario.
#[derive(Debug, Parser)]
#[command(name = "hario")]
#[command(about = "hario: validate and transform HAR captures", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Pipeline sizing shared by `process` and `bench`; unset values come from config.toml.
#[derive(Debug, Clone, Default, Args)]
pub struct PipelineArgs {
    /// Records per batch.
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,
    /// Worker threads or processes for the thread and process strategies.
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Validate a HAR file and print one transformed JSON record per line.
    Process {
        /// Path to the HAR file.
        path: PathBuf,

        /// Execution strategy: sequential, thread, process or async.
        #[arg(long)]
        strategy: Option<Strategy>,

        #[command(flatten)]
        sizing: PipelineArgs,

        /// Key that receives the record id (default from config, usually `id`).
        #[arg(long, value_name = "KEY")]
        id_field: Option<String>,

        /// Derive ids from these dotted paths instead of random UUIDs. Repeatable.
        #[arg(long = "id-by", value_name = "PATH")]
        id_by: Vec<String>,

        /// Replace negative sizes and timings with zero.
        #[arg(long)]
        normalize: bool,

        /// Flatten nested mappings into dotted keys.
        #[arg(long)]
        flatten: bool,

        /// Add the request host under `domain`.
        #[arg(long)]
        domain: bool,
    },

    /// Print the schema each entry of a HAR file resolves to.
    Inspect {
        /// Path to the HAR file.
        path: PathBuf,
    },

    /// Time every strategy on a HAR file and recommend one.
    Bench {
        /// Path to the HAR file.
        path: PathBuf,

        /// Runs per strategy; the fastest is reported.
        #[arg(long, default_value = "3", value_name = "N")]
        repeat: usize,

        #[command(flatten)]
        sizing: PipelineArgs,
    },

    /// Serve the process-parallel worker protocol on stdin/stdout.
    #[command(hide = true)]
    Worker,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            CliCommand::Process {
                path,
                strategy,
                sizing,
                id_field,
                id_by,
                normalize,
                flatten,
                domain,
            } => {
                let opts = ProcessOptions {
                    strategy,
                    sizing,
                    id_field,
                    id_by,
                    normalize,
                    flatten,
                    domain,
                };
                run_process(&load_config()?, &path, opts).await?
            }
            CliCommand::Inspect { path } => run_inspect(&load_config()?, &path)?,
            CliCommand::Bench {
                path,
                repeat,
                sizing,
            } => run_bench(&load_config()?, &path, repeat, sizing)?,
            CliCommand::Worker => run_worker().await?,
        }

        Ok(())
    }
}

fn load_config() -> Result<HarioConfig> {
    let cfg = config::load_or_init()?;
    tracing::debug!("loaded config: {:?}", cfg);
    Ok(cfg)
}

#[cfg(test)]
mod tests;
