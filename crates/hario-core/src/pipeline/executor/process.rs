//! Process-parallel executor.
//!
//! Each pool thread drives one long-lived child process speaking the
//! protocol in [`crate::pipeline::worker`]. The chain is sent once per
//! child as a [`ChainSpec`], so every step must be describable.

use std::io::{BufRead, BufReader, BufWriter};
use std::process::{Child, ChildStdin, ChildStdout, Stdio};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::pool::{run_pool, BatchWorker, Interrupt};
use super::Executor;
use crate::config::{Strategy, WorkerCommand};
use crate::pipeline::batch::Batch;
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::error::PipelineError;
use crate::pipeline::worker::{write_message, WorkerReply, WorkerRequest};
use crate::transform::{Chain, ChainSpec};
use crate::Record;

#[derive(Debug, Clone)]
pub struct ProcessPool {
    max_workers: usize,
    command: Option<WorkerCommand>,
}

impl ProcessPool {
    /// Without an explicit command the worker is resolved by [`WorkerCommand::from_env`].
    pub fn new(max_workers: usize, command: Option<WorkerCommand>) -> Self {
        Self {
            max_workers: max_workers.max(1),
            command,
        }
    }

    fn command(&self) -> Result<WorkerCommand, PipelineError> {
        match &self.command {
            Some(cmd) => Ok(cmd.clone()),
            None => WorkerCommand::from_env()
                .map_err(|e| PipelineError::Worker(format!("could not locate the worker executable: {e}"))),
        }
    }
}

impl Executor for ProcessPool {
    fn strategy(&self) -> Strategy {
        Strategy::Process
    }

    fn run(&self, batches: Vec<Batch>, chain: &Chain, cancel: &CancelToken) -> Result<Vec<Vec<Record>>, PipelineError> {
        let spec = chain.to_spec()?;
        if batches.is_empty() {
            return Ok(Vec::new());
        }
        let command = self.command()?;
        run_pool("process", batches, self.max_workers, cancel, move |slot| {
            let child = ChildWorker::spawn(&command, &spec, slot)?;
            Ok(Box::new(child) as Box<dyn BatchWorker>)
        })
    }
}

struct ChildWorker {
    /// Shared with the pool's interrupt so an abort can kill a busy child.
    child: Arc<Mutex<Child>>,
    stdin: Option<BufWriter<ChildStdin>>,
    stdout: BufReader<ChildStdout>,
    slot: usize,
}

impl ChildWorker {
    fn spawn(command: &WorkerCommand, spec: &ChainSpec, slot: usize) -> Result<Self, PipelineError> {
        let mut child = command
            .to_command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| PipelineError::Worker(format!("could not start `{command}`: {e}")))?;
        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(PipelineError::Worker("worker pipes unavailable".into()));
        };
        tracing::debug!(slot, pid = child.id(), "worker process started");
        let mut worker = Self {
            child: Arc::new(Mutex::new(child)),
            stdin: Some(BufWriter::new(stdin)),
            stdout: BufReader::new(stdout),
            slot,
        };
        let handshake = worker
            .send(&WorkerRequest::Chain { chain: spec.clone() })
            .and_then(|()| worker.receive());
        match handshake {
            Ok(WorkerReply::Ready) => Ok(worker),
            Ok(other) => {
                worker.abandon();
                Err(PipelineError::Worker(format!("expected ready, got {other:?}")))
            }
            Err(e) => {
                worker.abandon();
                Err(e)
            }
        }
    }

    fn child(&self) -> MutexGuard<'_, Child> {
        self.child.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn abandon(self) {
        let mut child = self.child();
        let _ = child.kill();
        let _ = child.wait();
    }

    fn send(&mut self, request: &WorkerRequest) -> Result<(), PipelineError> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| PipelineError::Worker("worker input already closed".into()))?;
        write_message(stdin, request).map_err(|e| PipelineError::Worker(format!("writing to worker {}: {e}", self.slot)))
    }

    fn receive(&mut self) -> Result<WorkerReply, PipelineError> {
        let mut line = String::new();
        let n = self
            .stdout
            .read_line(&mut line)
            .map_err(|e| PipelineError::Worker(format!("reading from worker {}: {e}", self.slot)))?;
        if n == 0 {
            return Err(PipelineError::Worker(format!("worker {} exited unexpectedly", self.slot)));
        }
        serde_json::from_str(&line).map_err(|e| PipelineError::Worker(format!("malformed reply from worker {}: {e}", self.slot)))
    }
}

impl BatchWorker for ChildWorker {
    fn run(&mut self, batch: Batch) -> Result<Vec<Record>, PipelineError> {
        let Batch { index, offset, records } = batch;
        self.send(&WorkerRequest::Chunk { index, records })?;
        match self.receive()? {
            WorkerReply::Done { index: got, records } if got == index => Ok(records),
            WorkerReply::Failed { index: got, record, error } if got == index => {
                Err(PipelineError::transform(offset + record, error))
            }
            other => Err(PipelineError::Worker(format!("unexpected reply for batch {index}: {other:?}"))),
        }
    }

    fn interrupt(&self) -> Option<Interrupt> {
        let child = Arc::clone(&self.child);
        let slot = self.slot;
        Some(Box::new(move || {
            let mut child = child.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(e) = child.kill() {
                tracing::debug!(slot, error = %e, "worker process already gone");
            }
        }))
    }

    fn shutdown(mut self: Box<Self>, aborted: bool) {
        // Closing stdin ends the worker loop.
        drop(self.stdin.take());
        let mut child = self.child();
        if aborted {
            let _ = child.kill();
        }
        match child.wait() {
            Ok(status) if !status.success() && !aborted => {
                tracing::warn!(slot = self.slot, %status, "worker process exited with failure");
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(slot = self.slot, error = %e, "could not reap worker process"),
        }
    }
}
