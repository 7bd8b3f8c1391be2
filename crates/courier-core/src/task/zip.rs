//! Zip - 二つの Task を並行に起動して結果を合流させる
//!
//! # Join barrier
//! - 各 branch は自分の slot に結果を書いてから `remaining` を 1 減らす
//! - 0 にした branch だけが両方の slot を取り出して combine → observer
//! - observer は FnOnce なので二回呼ばれることはない
//!
//! どちらかが None なら結果は None（もう片方の完了は待つ）。
//! branch の起動中の panic は `PanicSink` 経由で `run` に届く。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::unwind::PanicSink;
use super::{Observer, Operation, Task};
use crate::ports::{Executor, ambient_executor};

pub(super) struct Zip<T, U, F> {
    left: Task<T>,
    right: Task<U>,
    executor: Option<Arc<dyn Executor>>,
    combine: F,
}

impl<T, U, F> Zip<T, U, F> {
    pub(super) fn new(left: Task<T>, right: Task<U>, executor: Option<Arc<dyn Executor>>, combine: F) -> Self {
        Self {
            left,
            right,
            executor,
            combine,
        }
    }
}

impl<T, U, V, F> Operation for Zip<T, U, F>
where
    T: Send + 'static,
    U: Send + 'static,
    V: Send + 'static,
    F: FnOnce(T, U) -> V + Send + 'static,
{
    type Output = V;

    fn start(self: Box<Self>, observer: Observer<V>) {
        let Zip {
            left,
            right,
            executor,
            combine,
        } = *self;
        // 起動時に決める（構築時は runtime の外かもしれない）
        let executor = executor.unwrap_or_else(ambient_executor);
        // branch の panic は run() に回す
        let sink = PanicSink::current();
        let join = Arc::new(Join::new(combine, observer));

        let left_join = Arc::clone(&join);
        let left_sink = sink.clone();
        executor.execute(Box::new(move || {
            PanicSink::catching(left_sink, move || {
                left.start(move |value| {
                    *lock(&left_join.left) = Some(value);
                    left_join.arrive();
                });
            });
        }));

        executor.execute(Box::new(move || {
            PanicSink::catching(sink, move || {
                right.start(move |value| {
                    *lock(&join.right) = Some(value);
                    join.arrive();
                });
            });
        }));
    }
}

struct Join<T, U, V, F> {
    remaining: AtomicUsize,
    left: Mutex<Option<Option<T>>>,
    right: Mutex<Option<Option<U>>>,
    finish: Mutex<Option<(F, Observer<V>)>>,
}

impl<T, U, V, F> Join<T, U, V, F>
where
    F: FnOnce(T, U) -> V,
{
    fn new(combine: F, observer: Observer<V>) -> Self {
        Self {
            remaining: AtomicUsize::new(2),
            left: Mutex::new(None),
            right: Mutex::new(None),
            finish: Mutex::new(Some((combine, observer))),
        }
    }

    fn arrive(&self) {
        // AcqRel: the last arrival must see the other branch's slot write
        if self.remaining.fetch_sub(1, Ordering::AcqRel) != 1 {
            return;
        }
        let left = lock(&self.left).take().flatten();
        let right = lock(&self.right).take().flatten();
        let Some((combine, observer)) = lock(&self.finish).take() else {
            return;
        };
        let value = match (left, right) {
            (Some(a), Some(b)) => Some(combine(a, b)),
            _ => None,
        };
        observer(value);
    }
}

fn lock<X>(mutex: &Mutex<X>) -> std::sync::MutexGuard<'_, X> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
