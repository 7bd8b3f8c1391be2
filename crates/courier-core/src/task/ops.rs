//! Operator structs behind the sequential combinators.
//!
//! Each node owns its upstream task and its continuation; starting a node
//! starts the upstream with an observer that runs the continuation.

use std::marker::PhantomData;
use std::sync::Arc;

use super::{Observer, Operation, Task};
use crate::domain::Endpoint;
use crate::ports::{Exchange, Session};

pub(super) struct FromFn<F, T> {
    start: F,
    _marker: PhantomData<fn() -> T>,
}

impl<F, T> FromFn<F, T> {
    pub(super) fn new(start: F) -> Self {
        Self {
            start,
            _marker: PhantomData,
        }
    }
}

impl<F, T> Operation for FromFn<F, T>
where
    T: Send + 'static,
    F: FnOnce(Observer<T>) + Send + 'static,
{
    type Output = T;

    fn start(self: Box<Self>, observer: Observer<T>) {
        (self.start)(observer);
    }
}

pub(super) struct Ready<T>(pub(super) Option<T>);

impl<T: Send + 'static> Operation for Ready<T> {
    type Output = T;

    fn start(self: Box<Self>, observer: Observer<T>) {
        observer(self.0);
    }
}

pub(super) struct Call<S: ?Sized, T> {
    pub(super) session: Arc<S>,
    pub(super) endpoint: Endpoint<T>,
}

impl<S, T> Operation for Call<S, T>
where
    S: Session + ?Sized + 'static,
    T: Send + 'static,
{
    type Output = T;

    fn start(self: Box<Self>, observer: Observer<T>) {
        let Call { session, endpoint } = *self;
        tracing::debug!(request = %endpoint.request(), "dispatching");
        session.dispatch(Exchange::new(endpoint, observer));
    }
}

pub(super) struct Map<T, F> {
    pub(super) upstream: Task<T>,
    pub(super) f: F,
}

impl<T, U, F> Operation for Map<T, F>
where
    T: Send + 'static,
    U: Send + 'static,
    F: FnOnce(T) -> U + Send + 'static,
{
    type Output = U;

    fn start(self: Box<Self>, observer: Observer<U>) {
        let Map { upstream, f } = *self;
        upstream.start_boxed(Box::new(move |value: Option<T>| observer(value.map(f))));
    }
}

pub(super) struct FlatMap<T, F> {
    pub(super) upstream: Task<T>,
    pub(super) f: F,
}

impl<T, U, F> Operation for FlatMap<T, F>
where
    T: Send + 'static,
    U: Send + 'static,
    F: FnOnce(T) -> Task<U> + Send + 'static,
{
    type Output = U;

    fn start(self: Box<Self>, observer: Observer<U>) {
        let FlatMap { upstream, f } = *self;
        upstream.start_boxed(Box::new(move |value: Option<T>| match value {
            Some(value) => f(value).start_boxed(observer),
            None => observer(None),
        }));
    }
}

pub(super) struct CompactMap<T, F> {
    pub(super) upstream: Task<T>,
    pub(super) f: F,
}

impl<T, U, F> Operation for CompactMap<T, F>
where
    T: Send + 'static,
    U: Send + 'static,
    F: FnOnce(T) -> Option<U> + Send + 'static,
{
    type Output = U;

    fn start(self: Box<Self>, observer: Observer<U>) {
        let CompactMap { upstream, f } = *self;
        upstream.start_boxed(Box::new(move |value: Option<T>| observer(value.and_then(f))));
    }
}
