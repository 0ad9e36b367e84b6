//! # Command System
//!
//! Commands map key events to semantic [`CommandEvent`]s. Each command decides
//! its own relevance from a read-only [`CommandContext`]; the registry runs the
//! first relevant one and the controller applies the resulting events.

use anyhow::Result;
use crossterm::event::KeyEvent;

pub mod context;
pub mod events;
pub mod grid_actions;
pub mod modal;
pub mod navigation;

pub use context::{CommandContext, ViewModelSnapshot};
pub use events::{CommandEvent, FocusDirection, MovementDirection};
pub use grid_actions::*;
pub use modal::*;
pub use navigation::*;

/// A key binding plus the events it produces
pub trait Command {
    /// Whether this command handles the event in the current state
    fn is_relevant(&self, context: &CommandContext, event: &KeyEvent) -> bool;

    /// Produce the events for a relevant key
    fn execute(&self, event: KeyEvent, context: &CommandContext) -> Result<Vec<CommandEvent>>;

    fn name(&self) -> &'static str;
}

/// Type alias for command collection to reduce complexity
pub type CommandCollection = Vec<Box<dyn Command>>;

/// Registry that holds all available commands
pub struct CommandRegistry {
    commands: CommandCollection,
}

impl CommandRegistry {
    /// Create new command registry with default commands
    pub fn new() -> Self {
        let mut registry = Self {
            commands: Vec::new(),
        };

        registry.register_default_commands();
        registry
    }

    fn register_default_commands(&mut self) {
        self.add_command(Box::new(AppTerminateCommand));

        // Modal commands come before grid commands so that a form owns its keys
        self.add_command(Box::new(CancelModalCommand));
        self.add_command(Box::new(DeleteConfirmationCommand));
        self.add_command(Box::new(CommitAndAddNextCommand));
        self.add_command(Box::new(CommitFormCommand));
        self.add_command(Box::new(FormFocusCommand));
        self.add_command(Box::new(FormCompleteCommand));
        self.add_command(Box::new(FormBackspaceCommand));
        self.add_command(Box::new(FormCharCommand));

        self.add_command(Box::new(MoveCursorCommand));
        self.add_command(Box::new(EditItemCommand));
        self.add_command(Box::new(DeleteItemCommand));
        self.add_command(Box::new(AddPatientCommand));
        self.add_command(Box::new(ReloadCommand));
    }

    /// Add a command to the registry
    pub fn add_command(&mut self, command: Box<dyn Command>) {
        self.commands.push(command);
    }

    /// Process a key event through all commands
    ///
    /// Returns the events of the first relevant command, or none.
    pub fn process_event(
        &self,
        event: KeyEvent,
        context: &CommandContext,
    ) -> Result<Vec<CommandEvent>> {
        for command in &self.commands {
            if command.is_relevant(context, &event) {
                tracing::debug!("Key {:?} handled by {}", event.code, command.name());
                return command.execute(event, context);
            }
        }
        Ok(vec![])
    }

    /// Get all commands (for testing/debugging)
    pub fn commands(&self) -> &CommandCollection {
        &self.commands
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::events::{GridCursor, InteractionState};
    use crossterm::event::{KeyCode, KeyModifiers};

    fn context(state: InteractionState) -> CommandContext {
        CommandContext::new(ViewModelSnapshot {
            interaction_state: state,
            cursor: GridCursor::zero(),
            row_count: 3,
            column_count: 3,
            current_column_single: false,
            current_item_placeholder: false,
            terminal_dimensions: (80, 24),
        })
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn backspace_should_delete_in_grid_but_edit_in_form() {
        let registry = CommandRegistry::new();

        let events = registry
            .process_event(key(KeyCode::Backspace), &context(InteractionState::Normal))
            .unwrap();
        assert_eq!(events, vec![CommandEvent::DeleteRequested]);

        let events = registry
            .process_event(key(KeyCode::Backspace), &context(InteractionState::Editing))
            .unwrap();
        assert_eq!(events, vec![CommandEvent::FormBackspaceRequested]);
    }

    #[test]
    fn letters_should_be_typed_in_forms_not_interpreted() {
        let registry = CommandRegistry::new();
        for ch in ['q', 'n', 'j', 'r'] {
            let events = registry
                .process_event(key(KeyCode::Char(ch)), &context(InteractionState::Adding))
                .unwrap();
            assert_eq!(events, vec![CommandEvent::form_char(ch)]);
        }
    }

    #[test]
    fn arrows_should_move_focus_in_forms() {
        let registry = CommandRegistry::new();
        let events = registry
            .process_event(key(KeyCode::Down), &context(InteractionState::Editing))
            .unwrap();
        assert_eq!(events, vec![CommandEvent::form_focus(FocusDirection::Next)]);

        let events = registry
            .process_event(key(KeyCode::Down), &context(InteractionState::Normal))
            .unwrap();
        assert_eq!(
            events,
            vec![CommandEvent::cursor_move(MovementDirection::Down)]
        );
    }

    #[test]
    fn unbound_keys_should_produce_no_events() {
        let registry = CommandRegistry::new();
        let events = registry
            .process_event(key(KeyCode::F(5)), &context(InteractionState::Normal))
            .unwrap();
        assert!(events.is_empty());

        let events = registry
            .process_event(key(KeyCode::Char('x')), &context(InteractionState::Deleting))
            .unwrap();
        assert!(events.is_empty());
    }
}
