//! LiveSession - Transport 越しに本物のリクエストを送る Session
//!
//! `dispatch` は transport 呼び出しを runtime に spawn してすぐ返る。
//! transport のエラーは warn で記録し、結果は None にする。

use std::sync::Arc;

use tokio::runtime::Handle;

use crate::ports::{Exchange, Session, Transport};

/// [`Session`] that performs requests through a [`Transport`].
///
/// # 使用例
/// ```ignore
/// let session: Arc<dyn Session> = Arc::new(LiveSession::new(ReqwestTransport::new()?));
/// let collections = Task::from_endpoint(session, catalog.collections()).run().await;
/// ```
pub struct LiveSession<Tr> {
    transport: Arc<Tr>,
    handle: Handle,
}

impl<Tr: Transport + 'static> LiveSession<Tr> {
    /// Session bound to the runtime this is called from.
    ///
    /// # Panics
    /// Outside a tokio runtime; use [`with_handle`](Self::with_handle) there.
    pub fn new(transport: Tr) -> Self {
        Self::with_handle(transport, Handle::current())
    }

    pub fn with_handle(transport: Tr, handle: Handle) -> Self {
        Self {
            transport: Arc::new(transport),
            handle,
        }
    }

    pub fn transport(&self) -> &Tr {
        &self.transport
    }
}

impl<Tr: Transport + 'static> Session for LiveSession<Tr> {
    fn dispatch(&self, exchange: Exchange) {
        let transport = Arc::clone(&self.transport);
        self.handle.spawn(async move {
            let body = match transport.send(exchange.request()).await {
                Ok(body) => Some(body),
                Err(e) => {
                    tracing::warn!(request = %exchange.request(), error = %e, "request failed");
                    None
                }
            };
            exchange.complete(body.as_deref());
        });
    }
}
