use hario_core::logging;

mod cli;

use crate::cli::{Cli, CliCommand};
use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Workers keep stdout for the protocol and log to stderr only.
    if matches!(cli.command, CliCommand::Worker) {
        logging::init_logging_stderr();
    } else if let Err(err) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable, using stderr: {err:#}");
    }

    if let Err(err) = cli.run().await {
        eprintln!("hario error: {:#}", err);
        std::process::exit(1);
    }
}
