use crate::traits::Serializer;
use goat_core::{GoatError, GoatResult};

/// Pretty-printed JSON at the storage boundary
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl JsonSerializer {
    /// Convenience for text-valued stores.
    pub fn to_text<T: serde::Serialize>(&self, data: &T) -> GoatResult<String> {
        serde_json::to_string_pretty(data).map_err(|e| GoatError::Serialization(e.to_string()))
    }

    pub fn from_text<T: serde::de::DeserializeOwned>(&self, text: &str) -> GoatResult<T> {
        serde_json::from_str(text).map_err(|e| GoatError::Serialization(e.to_string()))
    }
}

impl<T: serde::Serialize + serde::de::DeserializeOwned + Send + Sync> Serializer<T>
    for JsonSerializer
{
    fn serialize(&self, data: &T) -> GoatResult<Vec<u8>> {
        serde_json::to_vec_pretty(data).map_err(|e| GoatError::Serialization(e.to_string()))
    }

    fn deserialize(&self, bytes: &[u8]) -> GoatResult<T> {
        serde_json::from_slice(bytes).map_err(|e| GoatError::Serialization(e.to_string()))
    }
}
