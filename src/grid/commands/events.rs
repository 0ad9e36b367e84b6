//! # Command Events
//!
//! Events produced by commands that describe what should happen.
//! Commands produce these events, and the controller applies them to the ViewModel.
//! Commands suggest, the controller decides.

/// Events that commands can produce to request changes
#[derive(Debug, Clone, PartialEq)]
pub enum CommandEvent {
    /// Request cursor movement within the grid
    CursorMoveRequested { direction: MovementDirection },

    /// Open the column modal on the selected item
    EditRequested,

    /// Open the global add-new modal
    AddRequested,

    /// Open the delete confirmation on the selected item
    DeleteRequested,

    /// Close any modal and discard the working copy
    CancelRequested,

    /// Commit the open form
    CommitRequested,

    /// Commit the open form, then edit the new trailing item
    CommitAndAddNextRequested,

    /// Confirm the open delete dialog
    ConfirmDeleteRequested,

    /// Type a character into the focused input
    FormCharRequested { ch: char },

    /// Remove the last character of the focused input
    FormBackspaceRequested,

    /// Move focus between inputs
    FormFocusRequested { direction: FocusDirection },

    /// Complete the focused input from its option list
    FormCompleteRequested,

    /// Re-fetch the patient list
    ReloadRequested,

    /// Request to quit application
    QuitRequested,

    /// No action needed
    NoAction,
}

/// Direction for cursor movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementDirection {
    Left,
    Right,
    Up,
    Down,
}

/// Direction for form focus movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusDirection {
    Next,
    Previous,
}

impl CommandEvent {
    /// Create a cursor move event
    pub fn cursor_move(direction: MovementDirection) -> Self {
        Self::CursorMoveRequested { direction }
    }

    /// Create a form input event
    pub fn form_char(ch: char) -> Self {
        Self::FormCharRequested { ch }
    }

    /// Create a form focus event
    pub fn form_focus(direction: FocusDirection) -> Self {
        Self::FormFocusRequested { direction }
    }
}
