use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Whole-call cancellation flag shared with the executors.
///
/// Executors check it between batches (between records for the async
/// strategy); a cancelled run fails with `PipelineError::Cancelled`.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
