//! # Column Schema
//!
//! Columns and option lists as delivered by `GET schema/`. Immutable after load.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the column whose edits can reorder rows
pub const LOCATION_COLUMN: &str = "location";

/// Name of the demographics column filled by the add-new modal
pub const DEMOGRAPHICS_COLUMN: &str = "demographics";

/// One `[value, synonym]` pair of an option list
pub type OptionEntry = (String, Option<String>);

/// A field rendered as one input of a column's modal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Option list used to complete this field
    #[serde(default)]
    pub lookup_list: Option<String>,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            lookup_list: None,
        }
    }

    pub fn title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| default_title(&self.name))
    }
}

/// A named clinical or demographic field, single- or multi-valued
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub single: bool,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    /// Maximum number of items shown while the cell is collapsed
    #[serde(default)]
    pub list_limit: Option<usize>,
    /// Option list holding the enumerated values of this column
    #[serde(default)]
    pub option_list: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
}

impl Column {
    pub fn new(name: impl Into<String>, single: bool) -> Self {
        Self {
            name: name.into(),
            single,
            title: None,
            icon: None,
            list_limit: None,
            option_list: None,
            fields: Vec::new(),
        }
    }

    pub fn with_fields(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|name| FieldSchema::new(*name)).collect();
        self
    }

    pub fn with_option_list(mut self, list: impl Into<String>) -> Self {
        self.option_list = Some(list.into());
        self
    }

    pub fn with_list_limit(mut self, limit: usize) -> Self {
        self.list_limit = Some(limit);
        self
    }

    /// Header title, derived from the name when the schema gives none
    pub fn title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| default_title(&self.name))
    }

    pub fn is_location(&self) -> bool {
        self.name == LOCATION_COLUMN
    }
}

/// Payload of `GET schema/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub columns: Vec<Column>,
    #[serde(default)]
    pub option_lists: BTreeMap<String, Vec<OptionEntry>>,
}

impl Schema {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }
}

/// `microbiology_test` becomes `Microbiology Test`
pub fn default_title(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
