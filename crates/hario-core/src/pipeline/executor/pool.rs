//! Bounded worker pool shared by the thread and process executors.
//!
//! Batches sit in a shared queue; each pool thread owns one worker and pulls
//! batches until the queue is empty. Results come back over a channel tagged
//! with their batch index and are slotted into place, so completion order
//! never affects output order. The first failure or a cancel drains the
//! queue, interrupts workers still busy with a batch, and stops the
//! remaining threads.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::pipeline::batch::Batch;
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::error::PipelineError;
use crate::Record;

/// How often the collector re-checks the cancel token while waiting.
const CANCEL_POLL: Duration = Duration::from_millis(50);

/// Stops a worker from outside its pool thread.
pub(super) type Interrupt = Box<dyn Fn() + Send>;

/// Executes batches for one pool thread.
pub(super) trait BatchWorker {
    fn run(&mut self, batch: Batch) -> Result<Vec<Record>, PipelineError>;

    /// Handle the collector uses to cut short an in-flight batch on abort.
    fn interrupt(&self) -> Option<Interrupt> {
        None
    }

    /// Called once when the thread stops; `aborted` is set when the run failed or was cancelled.
    fn shutdown(self: Box<Self>, aborted: bool);
}

enum Message {
    Finished {
        index: usize,
        result: Result<Vec<Record>, PipelineError>,
    },
    /// The worker could not be started.
    Lost(PipelineError),
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Run `batches` on at most `max_workers` threads, each with a worker from `spawn`.
pub(super) fn run_pool<F>(
    name: &str,
    batches: Vec<Batch>,
    max_workers: usize,
    cancel: &CancelToken,
    spawn: F,
) -> Result<Vec<Vec<Record>>, PipelineError>
where
    F: Fn(usize) -> Result<Box<dyn BatchWorker>, PipelineError> + Send + Sync + 'static,
{
    let count = batches.len();
    if count == 0 {
        return Ok(Vec::new());
    }
    let work: Arc<Mutex<VecDeque<Batch>>> = Arc::new(Mutex::new(batches.into_iter().collect()));
    let abort_requested = Arc::new(AtomicBool::new(false));
    let interrupts: Arc<Mutex<Vec<Interrupt>>> = Arc::new(Mutex::new(Vec::new()));
    let spawn = Arc::new(spawn);
    let (tx, rx) = mpsc::channel();
    let num_workers = max_workers.clamp(1, count);
    tracing::debug!(pool = name, workers = num_workers, batches = count, "starting worker pool");

    let mut handles = Vec::with_capacity(num_workers);
    for slot in 0..num_workers {
        let work = Arc::clone(&work);
        let thread_tx = tx.clone();
        let abort = Arc::clone(&abort_requested);
        let thread_interrupts = Arc::clone(&interrupts);
        let cancel = cancel.clone();
        let spawn = Arc::clone(&spawn);
        let handle = std::thread::Builder::new()
            .name(format!("hario-{name}-{slot}"))
            .spawn(move || {
                let mut worker = match spawn(slot) {
                    Ok(worker) => worker,
                    Err(e) => {
                        let _ = thread_tx.send(Message::Lost(e));
                        return;
                    }
                };
                if let Some(interrupt) = worker.interrupt() {
                    lock(&thread_interrupts).push(interrupt);
                }
                loop {
                    if abort.load(Ordering::Relaxed) || cancel.is_cancelled() {
                        break;
                    }
                    let Some(batch) = lock(&work).pop_front() else {
                        break;
                    };
                    let index = batch.index;
                    let result = worker.run(batch);
                    let failed = result.is_err();
                    if thread_tx.send(Message::Finished { index, result }).is_err() || failed {
                        break;
                    }
                }
                worker.shutdown(abort.load(Ordering::Relaxed) || cancel.is_cancelled());
            });
        match handle {
            Ok(h) => handles.push(h),
            Err(e) => {
                let _ = tx.send(Message::Lost(PipelineError::Worker(format!("could not start pool thread: {e}"))));
                break;
            }
        }
    }
    drop(tx);

    let mut slots: Vec<Option<Vec<Record>>> = (0..count).map(|_| None).collect();
    let mut first_error: Option<PipelineError> = None;
    let mut received = 0usize;
    while received < count {
        if cancel.is_cancelled() {
            first_error = Some(PipelineError::Cancelled);
            break;
        }
        match rx.recv_timeout(CANCEL_POLL) {
            Ok(Message::Finished { index, result: Ok(records) }) => match slots.get_mut(index) {
                Some(slot) => {
                    *slot = Some(records);
                    received += 1;
                }
                None => {
                    first_error = Some(PipelineError::Worker(format!("result for unknown batch {index}")));
                    break;
                }
            },
            Ok(Message::Finished { result: Err(e), .. }) | Ok(Message::Lost(e)) => {
                first_error = Some(e);
                break;
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                first_error = Some(PipelineError::WorkerPanicked);
                break;
            }
        }
    }

    if first_error.is_some() {
        abort_requested.store(true, Ordering::Relaxed);
        let drained = {
            let mut queue = lock(&work);
            let n = queue.len();
            queue.clear();
            n
        };
        let interrupted = {
            let interrupts = lock(&interrupts);
            interrupts.iter().for_each(|interrupt| interrupt());
            interrupts.len()
        };
        tracing::debug!(pool = name, drained, interrupted, "aborting worker pool");
    }
    for h in handles {
        if h.join().is_err() && first_error.is_none() {
            first_error = Some(PipelineError::WorkerPanicked);
        }
    }
    if let Some(e) = first_error {
        return Err(e);
    }
    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| slot.ok_or_else(|| PipelineError::Worker(format!("batch {index} produced no result"))))
        .collect()
}
