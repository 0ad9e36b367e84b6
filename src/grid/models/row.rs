//! # Rows
//!
//! One row per patient: column name to an ordered item sequence. Storage is
//! normalized on construction so that every single-valued column holds exactly
//! one item and every multi-valued column ends with a placeholder.

use crate::grid::error::{GridError, PatientId};
use crate::grid::models::column::{Column, LOCATION_COLUMN};
use crate::grid::models::item::{Item, ItemKey, Record};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    patient_id: PatientId,
    cells: HashMap<String, Vec<Item>>,
}

impl Row {
    /// Build a row from a patient record, normalizing every schema column
    pub fn from_record(record: &Record, columns: &[Column]) -> Result<Self, GridError> {
        let patient_id = record
            .get("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| GridError::MalformedPayload("patient row without an id".to_string()))?;

        let cells = columns
            .iter()
            .map(|column| {
                let items = normalize_cell(patient_id, column, record.get(&column.name));
                (column.name.clone(), items)
            })
            .collect();

        Ok(Self { patient_id, cells })
    }

    pub fn patient_id(&self) -> PatientId {
        self.patient_id
    }

    pub fn items(&self, column: &str) -> &[Item] {
        self.cells.get(column).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn items_mut(&mut self, column: &str) -> &mut Vec<Item> {
        self.cells.entry(column.to_string()).or_default()
    }

    pub fn item_count(&self, column: &str) -> usize {
        self.items(column).len()
    }

    pub fn item_index(&self, column: &str, key: ItemKey) -> Option<usize> {
        self.items(column).iter().position(|item| item.key() == key)
    }

    pub fn location_key(&self) -> LocationKey {
        match self.items(LOCATION_COLUMN).first() {
            Some(location) => LocationKey {
                category: location.field_text("category"),
                hospital: location.field_text("hospital"),
                ward: location.field_text("ward"),
                bed: location.field_text("bed"),
            },
            None => LocationKey::default(),
        }
    }
}

fn normalize_cell(patient_id: PatientId, column: &Column, value: Option<&Value>) -> Vec<Item> {
    if column.single {
        let record = match value {
            Some(Value::Object(record)) => Some(record.clone()),
            // Some servers still send singletons as one-element lists
            Some(Value::Array(values)) => values.first().and_then(Value::as_object).cloned(),
            _ => None,
        };
        return vec![record.map(Item::new).unwrap_or_else(|| Item::empty_for(patient_id))];
    }

    let mut items: Vec<Item> = match value {
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(|value| match value {
                Value::Object(record) => Some(Item::new(record.clone())),
                other => {
                    tracing::debug!(
                        "Skipping non-object {} entry of patient {}: {}",
                        column.name,
                        patient_id,
                        other
                    );
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    };
    items.push(Item::placeholder(patient_id));
    items
}

/// Row ordering key: category, hospital, ward, bed
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct LocationKey {
    pub category: String,
    pub hospital: String,
    pub ward: String,
    pub bed: String,
}

/// Stable ascending sort by location
pub fn sort_rows(rows: &mut [Row]) {
    rows.sort_by(compare_rows);
}

pub fn compare_rows(a: &Row, b: &Row) -> Ordering {
    a.location_key().cmp(&b.location_key())
}
