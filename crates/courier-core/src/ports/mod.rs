//! Ports - 抽象化レイヤー
//!
//! Task / Endpoint の外側にある能力をここで trait として定義し、
//! 実装（impls）と差し替えられるようにする。
//!
//! - **Session**: Endpoint を実行して decode 済みの結果を返す（本物 / 台本）
//! - **Transport**: Request を送って body の bytes を返す（LiveSession が使う）
//! - **Executor**: zip の各 branch をどこで起動するか

pub mod executor;
pub mod session;
pub mod transport;

// 主要な trait を再エクスポート
pub use self::executor::{Executor, Job, ambient_executor};
pub use self::session::{Exchange, Session, SessionExt};
pub use self::transport::Transport;
