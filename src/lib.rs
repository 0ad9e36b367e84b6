//! # Wardline - Terminal Patient-List Grid
//!
//! A keyboard-driven grid for ward patient lists, backed by a REST API.
//! Patients are rows sorted by location, schema columns hold one or many
//! items, and edits are synchronized in the background per item.
//!
//! - [`config`]: INI profiles and environment overrides
//! - [`cmd_args`]: command-line flags
//! - [`grid`]: models, view model, commands, rendering and the sync queue

pub mod cmd_args;
pub mod config;
pub mod grid;

pub use grid::*;
