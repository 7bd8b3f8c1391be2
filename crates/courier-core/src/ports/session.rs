//! Session port - Endpoint を実行して結果を callback に返す
//!
//! # 二層構造
//! - **表層（Typed）**: `SessionExt::execute(&Endpoint<T>, callback)`
//! - **内部（Dyn）**: `Session::dispatch(Exchange)` - object-safe, type erasure
//!
//! `Exchange` は Endpoint<T> と observer を型消去して包んだもの。
//! 完了のさせ方は二通り：
//! - body の bytes から（endpoint の decode を通す）→ LiveSession
//! - 事前に用意した値から（checked downcast）→ ScriptedSession

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::domain::errors::ScriptError;
use crate::domain::{Endpoint, Request};
use crate::task::{Observer, Task};

/// Executes endpoints.
///
/// # Contract
/// `dispatch` must not block, and must complete the exchange exactly once
/// (dropping it without completing breaks the [`Task`](crate::Task) contract).
pub trait Session: Send + Sync {
    fn dispatch(&self, exchange: Exchange);
}

/// Typed convenience over [`Session::dispatch`].
pub trait SessionExt: Session {
    fn execute<T, F>(&self, endpoint: &Endpoint<T>, callback: F)
    where
        T: Send + 'static,
        F: FnOnce(Option<T>) + Send + 'static,
    {
        self.dispatch(Exchange::new(endpoint.clone(), Box::new(callback)));
    }

    /// Leaf [`Task`](crate::Task) for `endpoint`; same as
    /// [`Task::from_endpoint`](crate::Task::from_endpoint).
    fn task<T>(self: Arc<Self>, endpoint: Endpoint<T>) -> Task<T>
    where
        Self: 'static,
        T: Send + 'static,
    {
        Task::from_endpoint(self, endpoint)
    }
}

impl<S: Session + ?Sized> SessionExt for S {}

/// One pending request with its type-erased completion.
pub struct Exchange {
    request: Request,
    completion: Box<dyn Completion>,
}

impl Exchange {
    pub fn new<T: Send + 'static>(endpoint: Endpoint<T>, observer: Observer<T>) -> Self {
        Self {
            request: endpoint.request().clone(),
            completion: Box::new(Typed { endpoint, observer }),
        }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Type name of the decoded result, for diagnostics.
    pub fn output_type(&self) -> &'static str {
        self.completion.output_type()
    }

    /// Complete from a response body; `None` means the transport produced
    /// nothing.
    pub fn complete(self, body: Option<&[u8]>) {
        self.completion.with_body(body);
    }

    /// Complete from an already-decoded value, which must be an
    /// `Option<T>` for this exchange's `T`.
    ///
    /// On a type mismatch the observer is dropped unanswered and the error
    /// is returned.
    pub fn complete_with_value(self, value: Box<dyn Any + Send>) -> Result<(), ScriptError> {
        let expected = self.completion.output_type();
        self.completion
            .with_value(value)
            .map_err(|_| ScriptError::TypeMismatch {
                request: self.request,
                expected,
            })
    }
}

impl fmt::Debug for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exchange")
            .field("request", &self.request)
            .field("output", &self.output_type())
            .finish()
    }
}

trait Completion: Send {
    fn output_type(&self) -> &'static str;

    fn with_body(self: Box<Self>, body: Option<&[u8]>);

    fn with_value(self: Box<Self>, value: Box<dyn Any + Send>) -> Result<(), Box<dyn Any + Send>>;
}

struct Typed<T> {
    endpoint: Endpoint<T>,
    observer: Observer<T>,
}

impl<T: Send + 'static> Completion for Typed<T> {
    fn output_type(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn with_body(self: Box<Self>, body: Option<&[u8]>) {
        let value = body.and_then(|bytes| self.endpoint.decode(bytes));
        if value.is_none() && body.is_some() {
            tracing::debug!(request = %self.endpoint.request(), "response did not decode");
        }
        (self.observer)(value);
    }

    fn with_value(self: Box<Self>, value: Box<dyn Any + Send>) -> Result<(), Box<dyn Any + Send>> {
        let value = value.downcast::<Option<T>>()?;
        (self.observer)(*value);
        Ok(())
    }
}
