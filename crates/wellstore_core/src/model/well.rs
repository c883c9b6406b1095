//! Well record model.
//!
//! # Responsibility
//! - Carry the optional well identifier used for find-and-replace matching.
//! - Preserve every other JSON field verbatim across encode/decode.
//!
//! # Invariants
//! - `id` is always serialized, as `null` when absent.
//! - The payload map never holds an `id` entry; identity lives in `id` only.
//! - Two absent ids are equal, so `None` matches records stored without an id.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of a monitored well.
pub type WellId = i32;

const ID_FIELD: &str = "id";

/// One monitored well's state.
///
/// The store only understands `id`; the rest of the object is owned by the
/// application layer and stored as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WellData {
    /// `None` matches only records that were also stored without an id.
    #[serde(default)]
    pub id: Option<WellId>,
    /// Private so an `id` key cannot sneak in and duplicate the identifier.
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl WellData {
    /// Creates an empty record with the given identifier.
    pub fn new(id: Option<WellId>) -> Self {
        Self {
            id,
            fields: Map::new(),
        }
    }

    /// Builder-style variant of [`WellData::set_field`].
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_field(key, value);
        self
    }

    /// Sets one payload field.
    ///
    /// Writing `id` through this method updates the identifier instead, so the
    /// encoded object never carries two `id` members. Non-integer or
    /// out-of-range values clear the identifier.
    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        if key == ID_FIELD {
            self.id = value.as_i64().and_then(|raw| WellId::try_from(raw).ok());
            return;
        }
        self.fields.insert(key, value);
    }

    /// Returns one payload field, if present.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Iterates payload fields in key order; `id` is not included.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Returns whether this record belongs to `well_id`.
    ///
    /// Plain `Option` equality: `None` matches a record stored without an id.
    pub fn matches_id(&self, well_id: Option<WellId>) -> bool {
        self.id == well_id
    }

    /// Decodes a single record from JSON text.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Encodes this record as compact JSON text.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::WellData;
    use serde_json::json;

    #[test]
    fn missing_id_decodes_as_none() {
        let well = WellData::from_json(r#"{"name":"north"}"#).unwrap();
        assert_eq!(well.id, None);
        assert_eq!(well.field("name"), Some(&json!("north")));
    }

    #[test]
    fn none_id_is_written_as_null() {
        let encoded = WellData::new(None).with_field("depth", 12.5).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value, json!({"id": null, "depth": 12.5}));
    }

    #[test]
    fn set_field_routes_id_to_identifier() {
        let mut well = WellData::new(None);
        well.set_field("id", 7);
        assert_eq!(well.id, Some(7));
        assert_eq!(well.fields().count(), 0);

        well.set_field("id", "not a number");
        assert_eq!(well.id, None);
    }

    #[test]
    fn id_payload_key_never_duplicates_identifier() {
        let well = WellData::new(Some(1)).with_field("id", 2).with_field("name", "A");
        let value: serde_json::Value = serde_json::from_str(&well.to_json().unwrap()).unwrap();
        assert_eq!(value, json!({"id": 2, "name": "A"}));
        assert_eq!(WellData::from_json(&well.to_json().unwrap()).unwrap(), well);
    }

    #[test]
    fn matches_id_uses_option_equality() {
        let anonymous = WellData::new(None);
        assert!(anonymous.matches_id(None));
        assert!(!anonymous.matches_id(Some(1)));
        assert!(!WellData::new(Some(1)).matches_id(None));
        assert!(WellData::new(Some(1)).matches_id(Some(1)));
        assert!(!WellData::new(Some(1)).matches_id(Some(2)));
    }
}
