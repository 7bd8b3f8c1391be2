//! Task - 一度だけ結果を返す非同期計算
//!
//! `Task<T>` は `start(observer)` で起動され、observer はちょうど一回
//! `Option<T>` を受け取る。失敗・結果なしはすべて `None`（Absence）。
//!
//! # 二層構造
//! - **表層**: `Task<T>` と combinator（map / flat_map / compact_map / zip_with）
//! - **内部**: `Operation` trait を実装する operator struct（ops.rs, zip.rs）
//!
//! combinator は元の Task を消費して新しい Task を返すだけで、何も起動しない。
//! 起動は末端の `start` / `run` だけが行う。

mod ops;
mod unwind;
mod zip;

use std::panic;
use std::sync::Arc;

use tokio::sync::oneshot;

use crate::domain::Endpoint;
use crate::ports::{Executor, Session};

use self::ops::{Call, CompactMap, FlatMap, FromFn, Map, Ready};
use self::unwind::PanicSink;
use self::zip::Zip;

/// Receives the single result of a [`Task`].
pub type Observer<T> = Box<dyn FnOnce(Option<T>) + Send + 'static>;

/// The "start" capability every task node implements.
///
/// # Contract
/// - `start` must not block the calling thread.
/// - `observer` must be invoked exactly once, on any thread.
pub trait Operation: Send + 'static {
    type Output: Send + 'static;

    fn start(self: Box<Self>, observer: Observer<Self::Output>);
}

/// A lazy, single-shot asynchronous computation yielding `Option<T>`.
///
/// # 使用例
/// ```ignore
/// let titles = Task::from_endpoint(session.clone(), collections)
///     .compact_map(|cs| cs.into_iter().next())
///     .flat_map(move |c| Task::from_endpoint(session, episodes).map(move |eps| titles_of(&c, eps)))
///     .run()
///     .await;
/// ```
pub struct Task<T> {
    op: Box<dyn Operation<Output = T>>,
}

impl<T: Send + 'static> Task<T> {
    pub fn from_operation<O>(op: O) -> Self
    where
        O: Operation<Output = T>,
    {
        Self { op: Box::new(op) }
    }

    /// Leaf task from a closure that receives the observer.
    pub fn new<F>(start: F) -> Self
    where
        F: FnOnce(Observer<T>) + Send + 'static,
    {
        Self::from_operation(FromFn::new(start))
    }

    /// Already-completed task.
    pub fn ready(value: Option<T>) -> Self {
        Self::from_operation(Ready(value))
    }

    pub fn some(value: T) -> Self {
        Self::ready(Some(value))
    }

    pub fn none() -> Self {
        Self::ready(None)
    }

    /// Leaf task that performs `endpoint` through `session` when started.
    pub fn from_endpoint<S>(session: Arc<S>, endpoint: Endpoint<T>) -> Self
    where
        S: Session + ?Sized + 'static,
    {
        Self::from_operation(Call { session, endpoint })
    }

    /// Start the computation; `observer` fires once with the result.
    pub fn start<F>(self, observer: F)
    where
        F: FnOnce(Option<T>) + Send + 'static,
    {
        self.op.start(Box::new(observer));
    }

    pub(crate) fn start_boxed(self, observer: Observer<T>) {
        self.op.start(observer);
    }

    /// Start the computation and wait for its result.
    ///
    /// # Panics
    /// If an operation drops its observer without answering. That is a
    /// broken contract, not Absence. When the cause was a panic while
    /// starting a zip branch (for example a scripted session rejecting a
    /// request), that panic is re-raised here with its original message.
    pub async fn run(self) -> Option<T> {
        let (tx, rx) = oneshot::channel();
        let (sink, branch_panic) = PanicSink::new();
        PanicSink::scope(Some(sink), || {
            self.start(move |value| {
                // receiver gone = caller stopped waiting
                let _ = tx.send(value);
            })
        });
        match rx.await {
            Ok(value) => value,
            Err(_) => match branch_panic.await {
                Ok(payload) => panic::resume_unwind(payload),
                Err(_) => panic!("task dropped its observer without delivering a result"),
            },
        }
    }

    pub fn map<U, F>(self, f: F) -> Task<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        Task::from_operation(Map { upstream: self, f })
    }

    /// Sequential dependency: `f` builds the next task from this result.
    pub fn flat_map<U, F>(self, f: F) -> Task<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Task<U> + Send + 'static,
    {
        Task::from_operation(FlatMap { upstream: self, f })
    }

    pub fn compact_map<U, F>(self, f: F) -> Task<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Option<U> + Send + 'static,
    {
        Task::from_operation(CompactMap { upstream: self, f })
    }

    /// Run `self` and `other` concurrently and combine both results.
    ///
    /// Both branches are started through the ambient executor: the current
    /// tokio runtime if there is one, inline otherwise.
    pub fn zip_with<U, V, F>(self, other: Task<U>, combine: F) -> Task<V>
    where
        U: Send + 'static,
        V: Send + 'static,
        F: FnOnce(T, U) -> V + Send + 'static,
    {
        Task::from_operation(Zip::new(self, other, None, combine))
    }

    /// [`zip_with`](Self::zip_with) with an explicit executor for the branch starts.
    pub fn zip_with_on<U, V, F>(self, other: Task<U>, executor: Arc<dyn Executor>, combine: F) -> Task<V>
    where
        U: Send + 'static,
        V: Send + 'static,
        F: FnOnce(T, U) -> V + Send + 'static,
    {
        Task::from_operation(Zip::new(self, other, Some(executor), combine))
    }

    pub fn zip<U>(self, other: Task<U>) -> Task<(T, U)>
    where
        U: Send + 'static,
    {
        self.zip_with(other, |a, b| (a, b))
    }
}

impl<T> std::fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("output", &std::any::type_name::<T>())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod testing;
