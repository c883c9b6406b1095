//! JSON encoding of persisted well lists.

use super::{WellStoreError, WellStoreResult};
use crate::model::well::WellData;

/// Value decoded when the observed list key is absent.
pub const EMPTY_LIST_JSON: &str = "[]";

pub fn encode_wells(wells: &[WellData]) -> WellStoreResult<String> {
    serde_json::to_string(wells).map_err(WellStoreError::Encode)
}

/// Decodes the JSON array stored under `key`.
pub fn decode_wells(key: &'static str, json: &str) -> WellStoreResult<Vec<WellData>> {
    serde_json::from_str(json).map_err(|source| WellStoreError::Decode { key, source })
}
