//! Unwind - zip の branch で起きた panic を `run` まで運ぶ
//!
//! branch は executor 上（別の tokio task）で起動されるので、そこで panic
//! すると observer が捨てられるだけで理由が消える。
//! - `run` は自分の `PanicSink` をスレッドローカルに置いてから start する
//! - zip は起動時にそれを拾い、branch の start を `catching` で包む
//! - branch の panic payload は sink 経由で `run` に届き、そこで再送出される
//!
//! sink が届くのは start の同期部分だけ（後から別スレッドで走る
//! continuation は対象外）。

use std::any::Any;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;

pub(crate) type Payload = Box<dyn Any + Send + 'static>;

/// One-shot destination for the first branch panic of a `run`.
#[derive(Clone)]
pub(crate) struct PanicSink(Arc<Mutex<Option<oneshot::Sender<Payload>>>>);

thread_local! {
    static CURRENT: RefCell<Option<PanicSink>> = const { RefCell::new(None) };
}

/// Puts the previous sink back, also while unwinding.
struct Restore(Option<PanicSink>);

impl Drop for Restore {
    fn drop(&mut self) {
        let previous = self.0.take();
        CURRENT.with(|current| *current.borrow_mut() = previous);
    }
}

impl PanicSink {
    pub(crate) fn new() -> (Self, oneshot::Receiver<Payload>) {
        let (tx, rx) = oneshot::channel();
        (Self(Arc::new(Mutex::new(Some(tx)))), rx)
    }

    /// The sink installed on this thread, if any.
    pub(crate) fn current() -> Option<Self> {
        CURRENT.with(|current| current.borrow().clone())
    }

    /// Run `f` with `sink` installed on this thread.
    pub(crate) fn scope<R>(sink: Option<Self>, f: impl FnOnce() -> R) -> R {
        let previous = CURRENT.with(|current| current.replace(sink));
        let _restore = Restore(previous);
        f()
    }

    /// Run `f` under `sink`; a panic is handed to the sink instead of
    /// unwinding further. Without a sink (or once it has fired) it keeps
    /// unwinding.
    pub(crate) fn catching(sink: Option<Self>, f: impl FnOnce()) {
        let result = panic::catch_unwind(AssertUnwindSafe(|| Self::scope(sink.clone(), f)));
        let Err(payload) = result else {
            return;
        };
        match sink.and_then(|sink| sink.take()) {
            Some(tx) => {
                if let Err(payload) = tx.send(payload) {
                    panic::resume_unwind(payload);
                }
            }
            None => panic::resume_unwind(payload),
        }
    }

    fn take(&self) -> Option<oneshot::Sender<Payload>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

/// Text of a panic payload, for assertions.
#[cfg(test)]
pub(crate) fn message(payload: &Payload) -> String {
    payload
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| payload.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_default()
}
