//! Executor port - 処理をどこで走らせるか
//!
//! zip は二つの branch をこの Executor 経由で起動する。
//! - TokioExecutor: runtime 上で並行に起動（本番用）
//! - InlineExecutor: 呼び出したスレッドでその場で起動（決定的なテスト用）

use std::sync::Arc;

use crate::impls::{InlineExecutor, TokioExecutor};

/// A unit of work handed to an [`Executor`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs jobs, possibly on other threads.
///
/// # Thread Safety
/// `Send + Sync` so one executor can be shared by many zip nodes.
pub trait Executor: Send + Sync {
    fn execute(&self, job: Job);
}

/// Executor for the calling context: the current tokio runtime when there is
/// one, inline otherwise.
pub fn ambient_executor() -> Arc<dyn Executor> {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => Arc::new(TokioExecutor::new(handle)),
        Err(_) => Arc::new(InlineExecutor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn outside_a_runtime_jobs_run_inline() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        ambient_executor().execute(Box::new(move || flag.store(true, Ordering::SeqCst)));
        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn inside_a_runtime_jobs_are_spawned() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let (tx, rx) = tokio::sync::oneshot::channel();
        ambient_executor().execute(Box::new(move || {
            flag.store(true, Ordering::SeqCst);
            let _ = tx.send(());
        }));
        // current_thread runtime: the job only runs once we yield below
        assert!(!ran.load(Ordering::SeqCst));

        rx.await.unwrap();
        assert!(ran.load(Ordering::SeqCst));
    }
}
