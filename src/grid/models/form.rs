//! # Modal Working Copy
//!
//! The uncommitted copy of the selected item (or of the new patient) that a
//! modal edits. It remembers its target by patient id and item key, so a
//! re-sort while the modal is open cannot redirect the commit.

use crate::grid::error::PatientId;
use crate::grid::models::column::{default_title, Column, DEMOGRAPHICS_COLUMN, LOCATION_COLUMN};
use crate::grid::models::item::{value_text, Item, ItemKey, Record};
use serde_json::Value;

/// Field used when neither the schema nor the record names any field
pub const DEFAULT_FIELD: &str = "name";

/// Inputs of the add-new modal: (column, field, label)
pub const ADD_PATIENT_FIELDS: &[(&str, &str, &str)] = &[
    (DEMOGRAPHICS_COLUMN, "name", "Name"),
    (DEMOGRAPHICS_COLUMN, "hospital_number", "Hospital number"),
    (LOCATION_COLUMN, "category", "Category"),
    (LOCATION_COLUMN, "hospital", "Hospital"),
    (LOCATION_COLUMN, "ward", "Ward"),
    (LOCATION_COLUMN, "bed", "Bed"),
];

/// Which modal the working copy belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalTarget {
    /// Global add-new modal
    NewPatient,
    /// Column modal (edit) on an existing row item
    Item {
        patient_id: PatientId,
        column: String,
        item_key: ItemKey,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    /// Record key the input writes to
    pub name: String,
    pub label: String,
    pub value: String,
    pub lookup_list: Option<String>,
    /// Sub-record of the add template the field belongs to
    pub group: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkingCopy {
    target: ModalTarget,
    base: Record,
    fields: Vec<FormField>,
    focus: Option<usize>,
}

impl WorkingCopy {
    /// Working copy of a row item, one input per column field
    pub fn for_item(patient_id: PatientId, column: &Column, item: &Item) -> Self {
        let fields = if !column.fields.is_empty() {
            column
                .fields
                .iter()
                .map(|field| FormField {
                    name: field.name.clone(),
                    label: field.title(),
                    value: item.field_text(&field.name),
                    lookup_list: field
                        .lookup_list
                        .clone()
                        .or_else(|| column.option_list.clone()),
                    group: None,
                })
                .collect()
        } else {
            let mut names = item.visible_fields();
            if names.is_empty() {
                names.push(DEFAULT_FIELD.to_string());
            }
            names
                .into_iter()
                .map(|name| FormField {
                    label: default_title(&name),
                    value: item.field_text(&name),
                    lookup_list: column.option_list.clone(),
                    group: None,
                    name,
                })
                .collect()
        };

        Self {
            target: ModalTarget::Item {
                patient_id,
                column: column.name.clone(),
                item_key: item.key(),
            },
            base: item.record().clone(),
            fields,
            focus: None,
        }
    }

    /// Working copy of the blank `{location: {}, demographics: {}}` template
    pub fn for_new_patient() -> Self {
        let fields = ADD_PATIENT_FIELDS
            .iter()
            .map(|(group, name, label)| FormField {
                name: name.to_string(),
                label: label.to_string(),
                value: String::new(),
                lookup_list: None,
                group: Some(group.to_string()),
            })
            .collect();

        Self {
            target: ModalTarget::NewPatient,
            base: Record::new(),
            fields,
            focus: None,
        }
    }

    /// Working copy for the delete confirmation (no inputs)
    pub fn for_delete(patient_id: PatientId, column: &Column, item: &Item) -> Self {
        let mut working_copy = Self::for_item(patient_id, column, item);
        working_copy.fields.clear();
        working_copy
    }

    pub fn target(&self) -> &ModalTarget {
        &self.target
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn base(&self) -> &Record {
        &self.base
    }

    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    /// Focus the first input (modal opened)
    pub fn focus_first(&mut self) {
        self.focus = if self.fields.is_empty() { None } else { Some(0) };
    }

    /// Drop focus (modal closed)
    pub fn blur(&mut self) {
        self.focus = None;
    }

    pub fn focus_next(&mut self) {
        if let Some(index) = self.focus {
            self.focus = Some((index + 1) % self.fields.len());
        }
    }

    pub fn focus_previous(&mut self) {
        if let Some(index) = self.focus {
            let len = self.fields.len();
            self.focus = Some((index + len - 1) % len);
        }
    }

    pub fn focused_field(&self) -> Option<&FormField> {
        self.focus.and_then(|index| self.fields.get(index))
    }

    pub fn insert_char(&mut self, ch: char) -> bool {
        match self.focused_field_mut() {
            Some(field) => {
                field.value.push(ch);
                true
            }
            None => false,
        }
    }

    pub fn backspace(&mut self) -> bool {
        match self.focused_field_mut() {
            Some(field) => field.value.pop().is_some(),
            None => false,
        }
    }

    pub fn set_focused_value(&mut self, value: &str) -> bool {
        match self.focused_field_mut() {
            Some(field) if field.value != value => {
                field.value = value.to_string();
                true
            }
            _ => false,
        }
    }

    fn focused_field_mut(&mut self) -> Option<&mut FormField> {
        let index = self.focus?;
        self.fields.get_mut(index)
    }

    /// The edited record: the original with changed inputs written back
    ///
    /// Untouched inputs keep their original JSON type; edited ones become
    /// strings, and an emptied input becomes null.
    pub fn to_record(&self) -> Record {
        let mut record = self.base.clone();
        for field in &self.fields {
            let original = record.get(&field.name).map(value_text).unwrap_or_default();
            if original == field.value {
                continue;
            }
            let value = if field.value.is_empty() {
                Value::Null
            } else {
                Value::String(field.value.clone())
            };
            record.insert(field.name.clone(), value);
        }
        record
    }

    /// The new patient payload built from the add-new inputs
    pub fn to_patient_template(&self) -> Record {
        let mut template = Record::new();
        template.insert(LOCATION_COLUMN.to_string(), Value::Object(Record::new()));
        template.insert(DEMOGRAPHICS_COLUMN.to_string(), Value::Object(Record::new()));

        for field in &self.fields {
            let Some(group) = field.group.as_deref() else {
                continue;
            };
            if field.value.is_empty() {
                continue;
            }
            if let Some(Value::Object(sub_record)) = template.get_mut(group) {
                sub_record.insert(field.name.clone(), Value::String(field.value.clone()));
            }
        }
        template
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(value: Value) -> Item {
        Item::new(value.as_object().cloned().unwrap())
    }

    #[test]
    fn opened_modal_should_focus_first_input() {
        let column = Column::new("location", true).with_fields(&["ward", "bed"]);
        let mut working_copy =
            WorkingCopy::for_item(1, &column, &item(json!({"ward": "9", "bed": 2})));
        assert_eq!(working_copy.focus(), None);

        working_copy.focus_first();
        assert_eq!(working_copy.focused_field().unwrap().name, "ward");
        working_copy.blur();
        assert_eq!(working_copy.focus(), None);
    }

    #[test]
    fn fields_should_fall_back_to_record_keys_then_default() {
        let column = Column::new("diagnosis", false);
        let working_copy =
            WorkingCopy::for_item(1, &column, &item(json!({"id": 3, "condition": "Sepsis"})));
        let names: Vec<_> = working_copy.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["condition"]);

        let placeholder = Item::placeholder(1);
        let working_copy = WorkingCopy::for_item(1, &column, &placeholder);
        assert_eq!(working_copy.fields()[0].name, DEFAULT_FIELD);
    }

    #[test]
    fn focus_should_cycle_through_inputs() {
        let column = Column::new("location", true).with_fields(&["ward", "bed"]);
        let mut working_copy = WorkingCopy::for_item(1, &column, &item(json!({})));
        working_copy.focus_first();
        working_copy.focus_next();
        assert_eq!(working_copy.focus(), Some(1));
        working_copy.focus_next();
        assert_eq!(working_copy.focus(), Some(0));
        working_copy.focus_previous();
        assert_eq!(working_copy.focus(), Some(1));
    }

    #[test]
    fn to_record_should_keep_untouched_values_and_write_edits() {
        let column = Column::new("location", true).with_fields(&["ward", "bed"]);
        let mut working_copy =
            WorkingCopy::for_item(1, &column, &item(json!({"id": 4, "ward": "9", "bed": 2})));
        working_copy.focus_first();
        working_copy.backspace();
        working_copy.insert_char('7');

        let record = working_copy.to_record();
        assert_eq!(record.get("ward"), Some(&json!("7")));
        assert_eq!(record.get("bed"), Some(&json!(2)));
        assert_eq!(record.get("id"), Some(&json!(4)));
    }

    #[test]
    fn emptied_input_should_become_null() {
        let column = Column::new("location", true).with_fields(&["ward"]);
        let mut working_copy = WorkingCopy::for_item(1, &column, &item(json!({"ward": "9"})));
        working_copy.focus_first();
        working_copy.backspace();
        assert_eq!(working_copy.to_record().get("ward"), Some(&Value::Null));
    }

    #[test]
    fn patient_template_should_group_inputs() {
        let mut working_copy = WorkingCopy::for_new_patient();
        working_copy.focus_first();
        for ch in "Ann".chars() {
            working_copy.insert_char(ch);
        }
        // Name, Hospital number, Category
        working_copy.focus_next();
        working_copy.focus_next();
        for ch in "inpatient".chars() {
            working_copy.insert_char(ch);
        }

        assert_eq!(
            Value::Object(working_copy.to_patient_template()),
            json!({
                "location": {"category": "inpatient"},
                "demographics": {"name": "Ann"}
            })
        );
    }

    #[test]
    fn blank_patient_template_should_have_empty_sub_records() {
        let working_copy = WorkingCopy::for_new_patient();
        assert_eq!(
            Value::Object(working_copy.to_patient_template()),
            json!({"location": {}, "demographics": {}})
        );
    }
}
