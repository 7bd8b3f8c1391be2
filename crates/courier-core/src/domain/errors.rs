//! Errors - エラー型と分類
//!
//! Task / Endpoint 層には「結果なし（Absence）」しか存在しない。
//! ここにある型はその外側の境界でだけ使う：
//! - EndpointError: Endpoint の組み立て時（body の encode 失敗）
//! - TransportError: transport 実装の内部（LiveSession が None に潰す）
//! - ScriptError: ScriptedSession の期待違反（テストを止める）

use thiserror::Error;

use super::request::Request;

/// Failure while building an [`Endpoint`](super::Endpoint).
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failure reported by a [`Transport`](crate::ports::Transport).
///
/// Never crosses into the Task algebra; the live session logs it and
/// delivers `None`.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("unexpected status {status} for {request}")]
    Status {
        status: http::StatusCode,
        request: String,
    },

    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

/// Test-expectation violation raised by the scripted session.
///
/// This is not Absence: the scripted session panics with it so the test
/// stops at the offending request.
#[derive(Debug, Clone, Error)]
pub enum ScriptError {
    #[error("no scripted response for request: {0}")]
    Unmatched(Request),

    #[error("scripted response for {request} has the wrong type (expected Option<{expected}>)")]
    TypeMismatch {
        request: Request,
        expected: &'static str,
    },

    #[error("{} scripted request(s) were never issued: {}", .0.len(), render(.0))]
    Unconsumed(Vec<Request>),
}

fn render(requests: &[Request]) -> String {
    requests
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn unconsumed_lists_every_request() {
        let a = Request::get(Url::parse("https://example.test/a").unwrap());
        let b = Request::get(Url::parse("https://example.test/b").unwrap());

        let msg = ScriptError::Unconsumed(vec![a, b]).to_string();
        assert!(msg.starts_with("2 scripted request(s)"));
        assert!(msg.contains("GET https://example.test/a"));
        assert!(msg.contains("GET https://example.test/b"));
    }
}
