//! Generic record representation shared by every entity type.
//!
//! A [`Record`] is one row of any form/table pair. The server-assigned
//! `id` is lifted out of the JSON body; every other field is kept as-is,
//! so unknown server fields survive deserializing and serializing a
//! `Record`. Forms build their request body from schema fields only.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::RecordId;

/// One record of a given entity type.
///
/// A record without an `id` is new (never persisted). A record with an
/// `id` mirrors server state as of the last fetch or save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    /// Build a new (unsaved) record from string field values.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let fields = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();
        Self { id: None, fields }
    }

    /// Attach a server identifier.
    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    /// `true` if the record has never been persisted.
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Render a field as display text.
    ///
    /// Strings are returned verbatim, numbers and booleans via their JSON
    /// representation. Missing or `null` fields render as an empty string.
    pub fn field_text(&self, name: &str) -> String {
        match self.fields.get(name) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// Overwrite one field with a string value.
    pub fn set_text(&mut self, name: &str, value: impl Into<String>) {
        self.fields
            .insert(name.to_string(), Value::String(value.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_is_lifted_out_of_fields() {
        let record: Record = serde_json::from_value(json!({
            "id": 12,
            "sr_code": "SR-001",
            "remarks": "ok",
        }))
        .unwrap();

        assert_eq!(record.id, Some(12));
        assert!(!record.fields.contains_key("id"));
        assert_eq!(record.field_text("sr_code"), "SR-001");
    }

    #[test]
    fn new_record_serializes_without_id() {
        let record = Record::from_pairs([("name", "Jane Doe")]);
        let value = serde_json::to_value(&record).unwrap();

        assert!(record.is_new());
        assert_eq!(value, json!({ "name": "Jane Doe" }));
    }

    #[test]
    fn unknown_server_fields_survive() {
        let record: Record = serde_json::from_value(json!({
            "id": 3,
            "created_at": "2024-06-01T08:00:00Z",
            "counselor": 7,
        }))
        .unwrap();
        let back = serde_json::to_value(&record).unwrap();

        assert_eq!(back["created_at"], "2024-06-01T08:00:00Z");
        assert_eq!(back["counselor"], 7);
        assert_eq!(back["id"], 3);
    }

    #[test]
    fn field_text_renders_scalars() {
        let record: Record = serde_json::from_value(json!({
            "age": 15,
            "enrolled": true,
            "notes": null,
        }))
        .unwrap();

        assert_eq!(record.field_text("age"), "15");
        assert_eq!(record.field_text("enrolled"), "true");
        assert_eq!(record.field_text("notes"), "");
        assert_eq!(record.field_text("missing"), "");
    }
}
