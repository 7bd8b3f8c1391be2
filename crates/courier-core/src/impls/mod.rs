//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **LiveSession**: Transport 越しに本物のリクエストを送る Session
//! - **ScriptedSession**: 台本どおりに応答するテスト用 Session
//! - **ReqwestTransport**: reqwest による HTTP Transport
//! - **InlineExecutor / TokioExecutor**: zip の branch 起動先

pub mod executor;
pub mod live;
pub mod reqwest_transport;
pub mod scripted;

// 主要な型を再エクスポート
pub use self::executor::{InlineExecutor, TokioExecutor};
pub use self::live::LiveSession;
pub use self::reqwest_transport::{ReqwestTransport, TransportConfig};
pub use self::scripted::ScriptedSession;
