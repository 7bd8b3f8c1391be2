//! ReqwestTransport - reqwest による HTTP Transport
//!
//! 2xx 以外の status は `TransportError::Status` にする。
//! core はそれ以上 status を解釈しない。

use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::domain::Request;
use crate::domain::errors::TransportError;
use crate::ports::Transport;

/// Client-wide settings applied when the `reqwest::Client` is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportConfig {
    pub user_agent: String,

    /// Sent with every request, before per-request headers.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub default_headers: BTreeMap<String, String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("courier/", env!("CARGO_PKG_VERSION")).to_string(),
            default_headers: BTreeMap::new(),
        }
    }
}

/// Production [`Transport`] on top of `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        Self::with_config(&TransportConfig::default())
    }

    pub fn with_config(config: &TransportConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.default_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::Other(format!("invalid header name {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TransportError::Other(format!("invalid header value for {name:?}: {e}")))?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an already-configured client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &Request) -> Result<Bytes, TransportError> {
        let mut builder = self
            .client
            .request(request.method().clone(), request.url().clone());
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body() {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status,
                request: request.to_string(),
            });
        }
        Ok(response.bytes().await?)
    }
}
