//! Executor implementations.

use tokio::runtime::Handle;

use crate::ports::{Executor, Job};

/// Runs each job immediately on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn execute(&self, job: Job) {
        job();
    }
}

/// Spawns each job as a task on a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioExecutor {
    handle: Handle,
}

impl TokioExecutor {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Executor for the runtime this is called from.
    ///
    /// # Panics
    /// Outside a tokio runtime (see [`Handle::current`]).
    pub fn current() -> Self {
        Self::new(Handle::current())
    }
}

impl Executor for TokioExecutor {
    fn execute(&self, job: Job) {
        self.handle.spawn(async move { job() });
    }
}
