//! courier-core
//!
//! Typed requests and callback-based task composition.
//!
//! # モジュール構成
//! - **domain**: 値オブジェクト（Request, Endpoint, errors）
//! - **task**: 非同期計算 `Task<T>` と combinator（map, flat_map, compact_map, zip_with）
//! - **ports**: 抽象化レイヤー（Session, Transport, Executor）
//! - **impls**: 実装（LiveSession, ScriptedSession, ReqwestTransport, executors）
//! - **typed**: JSON codec
//!
//! 失敗はすべて `None`（Absence）として Task の鎖を流れる。

pub mod domain;
pub mod impls;
pub mod ports;
pub mod task;
pub mod typed;

pub use self::domain::{Endpoint, Request};
pub use self::impls::{LiveSession, ReqwestTransport, ScriptedSession};
pub use self::ports::{Session, SessionExt};
pub use self::task::{Observer, Operation, Task};
