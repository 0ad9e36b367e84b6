//! # Models
//!
//! Plain data of the grid: schema columns, items, rows, option lists and the
//! working copy edited by modals.

pub mod column;
pub mod form;
pub mod item;
pub mod option_lists;
pub mod row;

pub use column::{
    Column, FieldSchema, OptionEntry, Schema, DEMOGRAPHICS_COLUMN, LOCATION_COLUMN,
};
pub use form::{FormField, ModalTarget, WorkingCopy};
pub use item::{value_text, Item, ItemKey, Record};
pub use option_lists::{OptionLists, TEST_CATEGORY_PREFIX};
pub use row::{sort_rows, LocationKey, Row};
