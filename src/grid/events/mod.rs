//! # Events Module
//!
//! Re-exports the state types and view events shared across the grid.

pub mod types;
pub mod view_events;

pub use types::{GridCursor, InteractionState, MousePosition};
pub use view_events::ViewEvent;
