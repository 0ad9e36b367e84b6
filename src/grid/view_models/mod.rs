//! # ViewModel Module
//!
//! The grid's single state object, split into focused responsibilities:
//! loading (core), cursor movement, modals, and CRUD commits with their sync
//! outcomes.

mod core;
mod crud_manager;
mod cursor_manager;
mod modal_manager;


pub use core::{ViewModel, DEFAULT_TERMINAL_SIZE};
