//! ScriptedSession - 台本どおりに応答するテスト用 Session
//!
//! # 実装詳細
//! - `Vec<Expectation>` を Mutex で保護（登録順に保持）
//! - dispatch: 等しい Request を持つ最初の期待を取り除き、その場で callback
//! - 見つからない / 型が違う → 記録してから panic（テストの設定ミスであって Absence ではない）
//! - verify: 記録した違反 → 未消費の期待、の順に確認
//!
//! callback を呼ぶ前に必ずロックを外す（flat_map の先で再入するため）。

use std::any::Any;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::errors::ScriptError;
use crate::domain::{Endpoint, Request};
use crate::ports::{Exchange, Session};

struct Expectation {
    request: Request,
    response: Box<dyn Any + Send>,
}

/// Test double that answers from pre-registered responses.
///
/// # 使用例
/// ```ignore
/// let session = Arc::new(
///     ScriptedSession::new()
///         .expecting(&collections, Some(vec![collection]))
///         .expecting(&episodes, Some(vec![episode])),
/// );
/// let title = pipeline(session.clone()).run().await;
/// session.verify();
/// ```
#[derive(Default)]
pub struct ScriptedSession {
    expectations: Mutex<Vec<Expectation>>,
    violations: Mutex<Vec<ScriptError>>,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`expect`](Self::expect).
    pub fn expecting<T: Send + 'static>(self, endpoint: &Endpoint<T>, response: Option<T>) -> Self {
        self.expect(endpoint, response);
        self
    }

    /// Register `response` as the answer to the next request equal to
    /// `endpoint`'s request.
    pub fn expect<T: Send + 'static>(&self, endpoint: &Endpoint<T>, response: Option<T>) {
        lock(&self.expectations).push(Expectation {
            request: endpoint.request().clone(),
            response: Box::new(response),
        });
    }

    /// Requests registered but not issued yet, in registration order.
    pub fn remaining(&self) -> Vec<Request> {
        lock(&self.expectations)
            .iter()
            .map(|e| e.request.clone())
            .collect()
    }

    /// Unmatched or mistyped requests seen so far, in order.
    pub fn violations(&self) -> Vec<ScriptError> {
        lock(&self.violations).clone()
    }

    /// The first recorded violation, else the unconsumed expectations.
    pub fn try_verify(&self) -> Result<(), ScriptError> {
        if let Some(violation) = lock(&self.violations).first() {
            return Err(violation.clone());
        }
        let remaining = self.remaining();
        if remaining.is_empty() {
            Ok(())
        } else {
            Err(ScriptError::Unconsumed(remaining))
        }
    }

    /// # Panics
    /// If a request was rejected, or any registered response was not
    /// consumed.
    pub fn verify(&self) {
        if let Err(e) = self.try_verify() {
            panic!("{e}");
        }
    }

    fn take(&self, request: &Request) -> Option<Box<dyn Any + Send>> {
        let mut expectations = lock(&self.expectations);
        let index = expectations.iter().position(|e| e.request == *request)?;
        Some(expectations.remove(index).response)
    }

    fn reject(&self, violation: ScriptError) -> ! {
        tracing::error!(error = %violation, "scripted session violation");
        lock(&self.violations).push(violation.clone());
        panic!("{violation}");
    }
}

fn lock<X>(mutex: &Mutex<X>) -> MutexGuard<'_, X> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Session for ScriptedSession {
    fn dispatch(&self, exchange: Exchange) {
        let Some(response) = self.take(exchange.request()) else {
            self.reject(ScriptError::Unmatched(exchange.request().clone()));
        };
        tracing::debug!(request = %exchange.request(), "scripted response");
        if let Err(e) = exchange.complete_with_value(response) {
            self.reject(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::SessionExt;
    use std::sync::Arc;
    use url::Url;

    fn endpoint(path: &str) -> Endpoint<String> {
        Endpoint::json(Url::parse(&format!("https://example.test/{path}")).unwrap())
    }

    fn answer(session: &ScriptedSession, endpoint: &Endpoint<String>) -> Option<String> {
        let got = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&got);
        session.execute(endpoint, move |v| *sink.lock().unwrap() = Some(v));
        // 同期的に callback される
        let value = got.lock().unwrap().take();
        value.expect("scripted session answers synchronously")
    }

    #[test]
    fn answers_and_consumes_expectation() {
        let a = endpoint("a");
        let session = ScriptedSession::new().expecting(&a, Some("A".to_string()));

        assert_eq!(answer(&session, &a), Some("A".to_string()));
        assert!(session.remaining().is_empty());
        session.verify();
    }

    #[test]
    fn scripted_absence_is_delivered_as_none() {
        let a = endpoint("a");
        let session = ScriptedSession::new().expecting(&a, None);
        assert_eq!(answer(&session, &a), None);
        session.verify();
    }

    #[test]
    fn matches_by_request_not_by_position() {
        let a = endpoint("a");
        let b = endpoint("b");
        let session = ScriptedSession::new()
            .expecting(&a, Some("A".to_string()))
            .expecting(&b, Some("B".to_string()));

        assert_eq!(answer(&session, &b), Some("B".to_string()));
        assert_eq!(answer(&session, &a), Some("A".to_string()));
        session.verify();
    }

    #[test]
    fn duplicate_requests_are_answered_in_registration_order() {
        let a = endpoint("a");
        let session = ScriptedSession::new()
            .expecting(&a, Some("first".to_string()))
            .expecting(&a, Some("second".to_string()));

        assert_eq!(answer(&session, &a), Some("first".to_string()));
        assert_eq!(session.remaining(), vec![a.request().clone()]);
        assert_eq!(answer(&session, &a), Some("second".to_string()));
    }

    #[test]
    #[should_panic(expected = "no scripted response for request: GET https://example.test/missing")]
    fn unmatched_request_panics() {
        let session = ScriptedSession::new().expecting(&endpoint("a"), Some("A".to_string()));
        answer(&session, &endpoint("missing"));
    }

    #[test]
    #[should_panic(expected = "wrong type")]
    fn response_of_another_type_panics() {
        let a = endpoint("a");
        let session = ScriptedSession::new();
        session.expect(&a.clone().map(|s| s.len()), Some(3usize));
        answer(&session, &a);
    }

    #[test]
    fn try_verify_reports_leftovers() {
        let a = endpoint("a");
        let session = ScriptedSession::new().expecting(&a, Some("A".to_string()));
        let err = session.try_verify().unwrap_err();
        assert!(matches!(err, ScriptError::Unconsumed(ref rest) if rest == &vec![a.request().clone()]));
    }

    #[test]
    #[should_panic(expected = "never issued")]
    fn verify_panics_on_leftovers() {
        ScriptedSession::new()
            .expecting(&endpoint("a"), Some("A".to_string()))
            .verify();
    }

    #[test]
    fn rejected_request_is_reported_by_verify() {
        let session = ScriptedSession::new();
        let missing = endpoint("missing");

        let rejected = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| answer(&session, &missing)));
        assert!(rejected.is_err());

        assert_eq!(session.violations().len(), 1);
        assert!(matches!(
            session.try_verify(),
            Err(ScriptError::Unmatched(ref request)) if request == missing.request()
        ));
    }
}
