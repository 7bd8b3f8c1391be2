//! Transport port - Request を送り、成功時の body を返す
//!
//! status code や error の中身は core では解釈しない。
//! 成功以外はすべて `Err` にして、LiveSession 側で None に潰す。

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::errors::TransportError;
use crate::domain::Request;

/// Sends a [`Request`] and returns the body of a successful response.
///
/// # Implementations
/// - [`ReqwestTransport`](crate::impls::ReqwestTransport): HTTP over `reqwest`
/// - test stubs
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &Request) -> Result<Bytes, TransportError>;
}
