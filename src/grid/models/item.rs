//! # Items
//!
//! One value record within a column's sequence for a given patient.
//! Each item carries a client-side key that survives re-sorts and reloads of
//! the server id, so sync outcomes can find their item again.

use crate::grid::error::PatientId;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};

/// A JSON object record as exchanged with the API
pub type Record = Map<String, Value>;

/// Record keys that are never shown as form inputs
pub const RESERVED_FIELDS: &[&str] = &[
    "id",
    "patient",
    "patient_id",
    "episode_id",
    "consistency_token",
    "created",
    "updated",
    "created_by_id",
    "updated_by_id",
];

static NEXT_ITEM_KEY: AtomicU64 = AtomicU64::new(1);

/// Client-side identity of an item (never sent to the server)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey(u64);

impl ItemKey {
    pub fn next() -> Self {
        Self(NEXT_ITEM_KEY.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    key: ItemKey,
    record: Record,
    placeholder: bool,
}

impl Item {
    pub fn new(record: Record) -> Self {
        Self {
            key: ItemKey::next(),
            record,
            placeholder: false,
        }
    }

    /// The trailing "add" item of a multi-valued column: `{patient: <id>}`
    pub fn placeholder(patient_id: PatientId) -> Self {
        let mut record = Record::new();
        record.insert("patient".to_string(), Value::from(patient_id));
        Self {
            key: ItemKey::next(),
            record,
            placeholder: true,
        }
    }

    /// An empty record for a single-valued column the server sent no value for
    pub fn empty_for(patient_id: PatientId) -> Self {
        let mut item = Self::placeholder(patient_id);
        item.placeholder = false;
        item
    }

    pub fn key(&self) -> ItemKey {
        self.key
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub fn id(&self) -> Option<i64> {
        self.record.get("id").and_then(Value::as_i64)
    }

    pub fn set_id(&mut self, id: i64) {
        self.record.insert("id".to_string(), Value::from(id));
    }

    /// A real item whose create has not been confirmed by the server
    pub fn is_pending(&self) -> bool {
        !self.placeholder && self.id().is_none()
    }

    /// Replace the record, turning a placeholder into a real item
    ///
    /// An id the server already assigned survives a record that lacks one.
    pub fn replace_record(&mut self, record: Record) {
        let id = self.id();
        self.record = record;
        self.placeholder = false;
        if let (Some(id), None) = (id, self.id()) {
            self.set_id(id);
        }
    }

    /// Display text of a field, empty when absent
    pub fn field_text(&self, name: &str) -> String {
        self.record.get(name).map(value_text).unwrap_or_default()
    }

    /// Non-reserved keys in record order
    pub fn visible_fields(&self) -> Vec<String> {
        self.record
            .keys()
            .filter(|key| !RESERVED_FIELDS.contains(&key.as_str()))
            .cloned()
            .collect()
    }
}

/// Plain text of a JSON value: strings unquoted, null empty
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
