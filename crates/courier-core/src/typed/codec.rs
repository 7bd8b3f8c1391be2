//! JsonCodec - 型付きの値と bytes の相互変換
//!
//! Endpoint の組み立て時にだけ使う薄い境界。
//! - encode: request body（失敗は EndpointError として呼び出し側へ）
//! - decode: response body（失敗は None = Absence）

use serde::Serialize;
use serde::de::DeserializeOwned;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// JSON (UTF-8, field-name keyed) codec used by the structured endpoint
/// constructors.
pub struct JsonCodec;

impl JsonCodec {
    pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(value)
    }

    /// Decode `bytes` as `T`.
    ///
    /// Malformed input is logged and reported as `None`.
    pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Option<T> {
        match serde_json::from_slice(bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(
                    target_type = std::any::type_name::<T>(),
                    error = %e,
                    "json decode failed"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: String,
        count: u32,
    }

    #[test]
    fn decodes_by_field_name() {
        let item: Option<Item> = JsonCodec::decode(br#"{"count": 2, "id": "a"}"#);
        assert_eq!(
            item,
            Some(Item {
                id: "a".to_string(),
                count: 2
            })
        );
    }

    #[test]
    fn mismatched_shape_is_absence() {
        let item: Option<Item> = JsonCodec::decode(br#"{"id": 7}"#);
        assert!(item.is_none());

        let item: Option<Item> = JsonCodec::decode(b"not json");
        assert!(item.is_none());
    }

    #[test]
    fn encode_writes_utf8_json() {
        let bytes = JsonCodec::encode(&Item {
            id: "b".to_string(),
            count: 1,
        })
        .unwrap();
        assert_eq!(std::str::from_utf8(&bytes).unwrap(), r#"{"id":"b","count":1}"#);
    }
}
