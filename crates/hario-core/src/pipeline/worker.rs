//! Worker process protocol: one JSON message per line.
//!
//! The parent first sends the chain description and waits for `ready`,
//! then sends one `chunk` per batch and reads back `done` or `failed`.
//! The worker exits when its stdin closes.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};

use crate::transform::{Chain, ChainSpec, StepError};
use crate::Record;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkerRequest {
    Chain { chain: ChainSpec },
    Chunk { index: usize, records: Vec<Record> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkerReply {
    Ready,
    Done {
        index: usize,
        records: Vec<Record>,
    },
    /// `record` is the failing record's position within the chunk.
    Failed {
        index: usize,
        record: usize,
        error: StepError,
    },
}

pub(crate) fn write_message<W: Write, T: Serialize>(output: &mut W, message: &T) -> std::io::Result<()> {
    serde_json::to_writer(&mut *output, message)?;
    output.write_all(b"\n")?;
    output.flush()
}

/// Serve requests from `input` until it is exhausted.
pub fn serve<R: BufRead, W: Write>(input: R, mut output: W) -> Result<()> {
    let mut chain: Option<Chain> = None;
    for (line_no, line) in input.lines().enumerate() {
        let line = line.context("reading worker request")?;
        if line.trim().is_empty() {
            continue;
        }
        let request: WorkerRequest =
            serde_json::from_str(&line).with_context(|| format!("decoding worker request on line {}", line_no + 1))?;
        let reply = match request {
            WorkerRequest::Chain { chain: spec } => {
                if chain.is_some() {
                    bail!("transformer chain received twice");
                }
                tracing::debug!(steps = spec.steps.len(), "worker received chain");
                chain = Some(Chain::from_spec(&spec));
                WorkerReply::Ready
            }
            WorkerRequest::Chunk { index, records } => {
                let Some(chain) = chain.as_ref() else {
                    bail!("chunk {index} received before the transformer chain");
                };
                apply_chunk(chain, index, records)
            }
        };
        write_message(&mut output, &reply).context("writing worker reply")?;
    }
    Ok(())
}

fn apply_chunk(chain: &Chain, index: usize, records: Vec<Record>) -> WorkerReply {
    let mut out = Vec::with_capacity(records.len());
    for (record, raw) in records.into_iter().enumerate() {
        match chain.apply(raw) {
            Ok(transformed) => out.push(transformed),
            Err(error) => return WorkerReply::Failed { index, record, error },
        }
    }
    WorkerReply::Done { index, records: out }
}
