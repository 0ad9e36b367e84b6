//! # Command Context
//!
//! Read-only view of the grid handed to commands for relevance checks.

use crate::grid::events::{GridCursor, InteractionState};
use crate::grid::view_models::ViewModel;

/// Read-only snapshot of ViewModel state for commands
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModelSnapshot {
    pub interaction_state: InteractionState,
    pub cursor: GridCursor,
    pub row_count: usize,
    pub column_count: usize,
    /// Current column is single-valued
    pub current_column_single: bool,
    /// Selected item is the trailing "add" placeholder
    pub current_item_placeholder: bool,
    pub terminal_dimensions: (u16, u16),
}

impl ViewModelSnapshot {
    /// Create snapshot from current ViewModel state
    pub fn from_view_model(view_model: &ViewModel) -> Self {
        Self {
            interaction_state: view_model.state(),
            cursor: view_model.cursor(),
            row_count: view_model.row_count(),
            column_count: view_model.column_count(),
            current_column_single: view_model.current_column().is_some_and(|c| c.single),
            current_item_placeholder: view_model
                .current_item()
                .is_some_and(|item| item.is_placeholder()),
            terminal_dimensions: view_model.terminal_size(),
        }
    }

    /// True when the cursor points at an existing item
    pub fn has_selection(&self) -> bool {
        self.row_count > 0 && self.column_count > 0
    }
}

/// Base context available to all commands
pub struct CommandContext {
    pub state: ViewModelSnapshot,
}

impl CommandContext {
    pub fn new(state: ViewModelSnapshot) -> Self {
        Self { state }
    }

    pub fn interaction_state(&self) -> InteractionState {
        self.state.interaction_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_of_empty_grid_should_have_no_selection() {
        let view_model = ViewModel::new();
        let snapshot = ViewModelSnapshot::from_view_model(&view_model);

        assert_eq!(snapshot.interaction_state, InteractionState::Normal);
        assert_eq!(snapshot.cursor, GridCursor::zero());
        assert!(!snapshot.has_selection());
        assert_eq!(snapshot.terminal_dimensions, (80, 24));
    }
}
