//! Request - transport に依存しないリクエスト記述
//!
//! 値オブジェクトとして比較できること（Eq / Hash）が重要：
//! ScriptedSession はこの等価性で期待レスポンスを引き当てる。

use std::fmt;

use bytes::Bytes;
use http::Method;
use url::Url;

/// A transport-agnostic description of one HTTP request.
///
/// Two requests are equal when method, URL (including query), headers and
/// body are all equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Request {
    method: Method,
    url: Url,
    headers: Vec<(String, String)>,
    body: Option<Bytes>,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Append a `name=value` pair to the URL's query string.
    pub fn with_query(mut self, name: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)?;
        if let Some(body) = &self.body {
            write!(f, " (+{} bytes)", body.len())?;
        }
        Ok(())
    }
}
