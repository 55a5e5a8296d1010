//! `hario worker`: the process-parallel worker loop.

use anyhow::{Context, Result};
use hario_core::pipeline::worker;
use std::io;

pub async fn run_worker() -> Result<()> {
    tokio::task::spawn_blocking(|| {
        let stdin = io::stdin();
        let stdout = io::stdout();
        worker::serve(stdin.lock(), stdout.lock())
    })
    .await
    .context("worker task join")?
}
