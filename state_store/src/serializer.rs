use std::{any::type_name, fmt::Debug};

use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};

pub struct JsonEncoder;

pub trait JsonEncode {
    fn encode<T: Serialize + Debug>(value: &T) -> Result<Vec<u8>>;
    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T>;
}

impl JsonEncode for JsonEncoder {
    fn encode<T: Serialize + Debug>(value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| {
            anyhow::anyhow!(
                "error serializing into json: {}, type: {}, value: {:?}",
                e,
                type_name::<T>(),
                value
            )
        })
    }

    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(|e| {
            anyhow::anyhow!(
                "error deserializing from json bytes: {}, type: {}, value: {}",
                e,
                type_name::<T>(),
                String::from_utf8_lossy(bytes)
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    struct Marker {
        name: String,
    }

    #[test]
    fn test_decode_error_names_the_target_type() {
        let err = JsonEncoder::decode::<Marker>(b"{\"nom\": 1}").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Marker"), "{msg}");
        assert!(msg.contains("{\"nom\": 1}"), "{msg}");
    }
}
