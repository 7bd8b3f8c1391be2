//! テスト用の手動 Task と記録用 observer。

use std::sync::{Arc, Mutex};

use super::{Observer, Task};

/// Handle to a task whose completion is fired by hand.
pub(crate) struct Trigger<T> {
    slot: Arc<Mutex<Option<Observer<T>>>>,
}

impl<T: Send + 'static> Trigger<T> {
    /// A task that parks its observer on start, and the handle that fires it.
    pub(crate) fn task() -> (Task<T>, Self) {
        let slot: Arc<Mutex<Option<Observer<T>>>> = Arc::new(Mutex::new(None));
        let parked = Arc::clone(&slot);
        let task = Task::new(move |observer| {
            *parked.lock().unwrap() = Some(observer);
        });
        (task, Self { slot })
    }

    pub(crate) fn is_started(&self) -> bool {
        self.slot.lock().unwrap().is_some()
    }

    pub(crate) fn fire(&self, value: Option<T>) {
        let observer = self
            .slot
            .lock()
            .unwrap()
            .take()
            .expect("trigger fired before its task was started");
        observer(value);
    }
}

/// Every value delivered to an observer, in order.
pub(crate) struct Deliveries<T>(Arc<Mutex<Vec<Option<T>>>>);

impl<T: Send + 'static> Deliveries<T> {
    pub(crate) fn start(task: Task<T>) -> Self {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        task.start(move |value| sink.lock().unwrap().push(value));
        Self(seen)
    }

    pub(crate) fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

impl<T: Clone> Deliveries<T> {
    pub(crate) fn all(&self) -> Vec<Option<T>> {
        self.0.lock().unwrap().clone()
    }

    /// The single delivered value.
    ///
    /// # Panics
    /// Unless exactly one value was delivered.
    pub(crate) fn only(&self) -> Option<T> {
        let all = self.all();
        assert_eq!(all.len(), 1, "expected exactly one delivery");
        all.into_iter().next().flatten()
    }
}
