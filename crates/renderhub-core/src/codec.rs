//! JSON encoding of persisted records.
//!
//! Records are stored as indented JSON documents. Enum values are written as
//! strings and field names follow the portal's existing PascalCase layout, so
//! records written by older portal versions keep decoding.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Result, StoreError};

/// Encodes a record as indented JSON.
pub fn encode<T: Serialize>(name: &str, record: &T) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(record).map_err(|e| StoreError::serialization(name, e.to_string()))
}

/// Decodes a record previously written by [`encode`].
pub fn decode<T: DeserializeOwned>(name: &str, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::serialization(name, e.to_string()))
}
