//! Typed - 型付きの値と wire format の境界
//!
//! 今は JSON だけ。Endpoint の構築関数から使われる。

pub mod codec;

pub use self::codec::{JSON_CONTENT_TYPE, JsonCodec};
