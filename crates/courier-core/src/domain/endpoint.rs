//! Endpoint - リクエスト記述と decode 関数のペア
//!
//! decode は純粋関数で、失敗は None で表す（panic しない）。
//! 構築時に一度だけ作り、Arc で共有して毎回の実行で使い回す。

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::errors::EndpointError;
use super::request::Request;
use crate::typed::{JSON_CONTENT_TYPE, JsonCodec};

type Decode<T> = Arc<dyn Fn(&[u8]) -> Option<T> + Send + Sync>;

/// An immutable pairing of a [`Request`] with a response decoder.
///
/// # 使用例
/// ```ignore
/// let endpoint: Endpoint<Vec<Collection>> = Endpoint::json(base.join("collections.json")?);
/// let titles = endpoint.map(|cs| cs.into_iter().map(|c| c.title).collect::<Vec<_>>());
/// ```
pub struct Endpoint<T> {
    request: Request,
    decode: Decode<T>,
}

impl<T: 'static> Endpoint<T> {
    /// Build an endpoint from a request and an arbitrary pure decoder.
    pub fn new<F>(request: Request, decode: F) -> Self
    where
        F: Fn(&[u8]) -> Option<T> + Send + Sync + 'static,
    {
        Self {
            request,
            decode: Arc::new(decode),
        }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Run the decoder over a response body.
    pub fn decode(&self, body: &[u8]) -> Option<T> {
        (self.decode)(body)
    }

    /// Same request, decoder post-processed by `f` when decoding succeeds.
    pub fn map<U, F>(self, f: F) -> Endpoint<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let decode = self.decode;
        Endpoint {
            request: self.request,
            decode: Arc::new(move |body: &[u8]| decode(body).map(&f)),
        }
    }
}

impl<T: DeserializeOwned + 'static> Endpoint<T> {
    /// GET `url` and decode the whole body as JSON.
    pub fn json(url: Url) -> Self {
        let request = Request::get(url).with_header("Accept", JSON_CONTENT_TYPE);
        Self::new(request, JsonCodec::decode::<T>)
    }

    /// `method` `url` with a JSON-encoded `body`; the response is decoded as
    /// JSON too.
    pub fn json_body<B: Serialize + ?Sized>(
        method: Method,
        url: Url,
        body: &B,
    ) -> Result<Self, EndpointError> {
        let bytes = JsonCodec::encode(body)?;
        let request = Request::new(method, url)
            .with_header("Accept", JSON_CONTENT_TYPE)
            .with_header("Content-Type", JSON_CONTENT_TYPE)
            .with_body(bytes);
        Ok(Self::new(request, JsonCodec::decode::<T>))
    }
}

impl Endpoint<Bytes> {
    /// Raw body, no decoding.
    pub fn bytes(request: Request) -> Self {
        Self::new(request, |body| Some(Bytes::copy_from_slice(body)))
    }
}

impl<T> Clone for Endpoint<T> {
    fn clone(&self) -> Self {
        Self {
            request: self.request.clone(),
            decode: Arc::clone(&self.decode),
        }
    }
}

impl<T> fmt::Debug for Endpoint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("request", &self.request)
            .field("output", &std::any::type_name::<T>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Collection {
        id: String,
        title: String,
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn json_endpoint_is_a_get_with_accept_header() {
        let ep: Endpoint<Vec<Collection>> = Endpoint::json(url("https://example.test/collections.json"));
        assert_eq!(ep.request().method(), &Method::GET);
        assert_eq!(
            ep.request().headers(),
            &[("Accept".to_string(), JSON_CONTENT_TYPE.to_string())]
        );
        assert!(ep.request().body().is_none());
    }

    #[test]
    fn json_endpoint_decodes_body() {
        let ep: Endpoint<Vec<Collection>> = Endpoint::json(url("https://example.test/collections.json"));
        let decoded = ep.decode(br#"[{"id":"test","title":"Test"}]"#);
        assert_eq!(
            decoded,
            Some(vec![Collection {
                id: "test".to_string(),
                title: "Test".to_string()
            }])
        );
        assert_eq!(ep.decode(b"{"), None);
    }

    #[test]
    fn json_body_encodes_payload() {
        let body = Collection {
            id: "new".to_string(),
            title: "New".to_string(),
        };
        let ep: Endpoint<Collection> =
            Endpoint::json_body(Method::POST, url("https://example.test/collections"), &body).unwrap();

        let sent: Collection = serde_json::from_slice(ep.request().body().unwrap()).unwrap();
        assert_eq!(sent, body);
        assert!(
            ep.request()
                .headers()
                .contains(&("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()))
        );
    }

    #[test]
    fn map_keeps_request_and_propagates_failure() {
        let ep: Endpoint<Vec<Collection>> = Endpoint::json(url("https://example.test/collections.json"));
        let request = ep.request().clone();
        let count = ep.map(|cs| cs.len());

        assert_eq!(count.request(), &request);
        assert_eq!(count.decode(br#"[{"id":"a","title":"A"},{"id":"b","title":"B"}]"#), Some(2));
        assert_eq!(count.decode(b"oops"), None);
    }

    #[test]
    fn map_is_not_called_on_decode_failure() {
        let ep = Endpoint::new(Request::get(url("https://example.test/x")), |_| None::<u32>);
        let mapped = ep.map(|_| -> u32 { panic!("must not run") });
        assert_eq!(mapped.decode(b"anything"), None);
    }

    #[test]
    fn bytes_endpoint_returns_body_verbatim() {
        let ep = Endpoint::bytes(Request::get(url("https://example.test/raw")));
        assert_eq!(ep.decode(b"\x00\x01"), Some(Bytes::from_static(b"\x00\x01")));
    }
}
