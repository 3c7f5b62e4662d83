//! Record codec.
//!
//! Records are stored as JSON documents. Every shape uses `#[serde(default)]`
//! so rows written before a field existed still decode.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::utils::error::Result;

pub fn encode<T: Serialize>(record: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(record)?)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(bytes)?)
}
