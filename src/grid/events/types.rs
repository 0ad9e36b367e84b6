//! # Core Event Types
//!
//! Common types shared by commands, the view model and the renderer:
//! the interaction state, the keyboard cursor and the mouse hover position.

/// Interaction state of the grid (mutually exclusive)
///
/// Gates which key events are dispatched and which modal is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Normal,
    /// Global add-new modal is open
    Adding,
    /// Column modal is open on the selected item
    Editing,
    /// Delete confirmation modal is open on the selected item
    Deleting,
}

impl InteractionState {
    /// True when a modal dialog is visible
    pub fn is_modal(&self) -> bool {
        !matches!(self, InteractionState::Normal)
    }

    /// True when the modal carries an editable form
    pub fn has_form(&self) -> bool {
        matches!(self, InteractionState::Adding | InteractionState::Editing)
    }

    /// Status bar label
    pub fn label(&self) -> &'static str {
        match self {
            InteractionState::Normal => "NORMAL",
            InteractionState::Adding => "ADDING",
            InteractionState::Editing => "EDITING",
            InteractionState::Deleting => "DELETING",
        }
    }
}

/// Keyboard cursor: (row index, column index, item index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GridCursor {
    pub rix: usize,
    pub cix: usize,
    pub iix: usize,
}

impl GridCursor {
    pub fn new(rix: usize, cix: usize, iix: usize) -> Self {
        Self { rix, cix, iix }
    }

    pub fn zero() -> Self {
        Self::default()
    }
}

/// Mouse hover position, tracked independently of the keyboard cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MousePosition {
    pub rix: usize,
    pub cix: usize,
}

impl MousePosition {
    pub fn new(rix: usize, cix: usize) -> Self {
        Self { rix, cix }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_should_be_normal() {
        assert_eq!(InteractionState::default(), InteractionState::Normal);
        assert!(!InteractionState::Normal.is_modal());
    }

    #[test]
    fn only_adding_and_editing_should_have_forms() {
        assert!(InteractionState::Adding.has_form());
        assert!(InteractionState::Editing.has_form());
        assert!(!InteractionState::Deleting.has_form());
        assert!(InteractionState::Deleting.is_modal());
    }
}
