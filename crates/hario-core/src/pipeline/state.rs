use std::fmt;
use std::time::Instant;

use super::error::PipelineError;
use crate::config::Strategy;
use crate::Record;

/// Lifecycle of one `process` call. Any error moves the run to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Batching,
    Dispatching,
    Collecting,
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::Idle => "idle",
            RunState::Batching => "batching",
            RunState::Dispatching => "dispatching",
            RunState::Collecting => "collecting",
            RunState::Done => "done",
            RunState::Failed => "failed",
        };
        f.write_str(s)
    }
}

pub(crate) struct Run {
    state: RunState,
    strategy: Strategy,
    records: usize,
    started: Instant,
}

impl Run {
    pub(crate) fn start(strategy: Strategy, records: usize) -> Self {
        Self {
            state: RunState::Idle,
            strategy,
            records,
            started: Instant::now(),
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> RunState {
        self.state
    }

    pub(crate) fn advance(&mut self, next: RunState) {
        tracing::debug!(strategy = %self.strategy, from = %self.state, to = %next, "pipeline state");
        self.state = next;
    }

    /// Close the run with the executor's ordered batch outputs.
    pub(crate) fn complete(
        &mut self,
        outcome: Result<Vec<Vec<Record>>, PipelineError>,
    ) -> Result<Vec<Record>, PipelineError> {
        match outcome {
            Ok(batches) => {
                self.advance(RunState::Collecting);
                let out: Vec<Record> = batches.into_iter().flatten().collect();
                self.advance(RunState::Done);
                tracing::info!(
                    strategy = %self.strategy,
                    records = self.records,
                    elapsed_ms = self.started.elapsed().as_millis() as u64,
                    "pipeline run finished"
                );
                Ok(out)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    pub(crate) fn fail(&mut self, error: PipelineError) -> PipelineError {
        self.advance(RunState::Failed);
        tracing::warn!(strategy = %self.strategy, error = %error, "pipeline run failed");
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_ends_in_done() {
        let mut run = Run::start(Strategy::Sequential, 2);
        run.advance(RunState::Batching);
        run.advance(RunState::Dispatching);
        let out = run.complete(Ok(vec![vec![Record::new()], vec![Record::new()]])).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(run.state(), RunState::Done);
    }

    #[test]
    fn error_ends_in_failed() {
        let mut run = Run::start(Strategy::Thread, 1);
        run.advance(RunState::Dispatching);
        let err = run.complete(Err(PipelineError::Cancelled)).unwrap_err();
        assert!(matches!(err, PipelineError::Cancelled));
        assert_eq!(run.state(), RunState::Failed);
    }
}
