//! # Grid Action Commands
//!
//! Keys that act on the selected item from `normal` state, plus application
//! lifecycle keys.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{Command, CommandContext, CommandEvent};
use crate::grid::events::InteractionState;

fn is_normal(context: &CommandContext) -> bool {
    context.interaction_state() == InteractionState::Normal
}

fn is_unmodified_char(event: &KeyEvent, ch: char) -> bool {
    event.code == KeyCode::Char(ch)
        && !event
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

/// Edit the selected item (Enter)
pub struct EditItemCommand;

impl Command for EditItemCommand {
    fn is_relevant(&self, context: &CommandContext, event: &KeyEvent) -> bool {
        is_normal(context) && event.code == KeyCode::Enter && context.state.has_selection()
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::EditRequested])
    }

    fn name(&self) -> &'static str {
        "EditItem"
    }
}

/// Ask to delete the selected item (Delete or Backspace)
///
/// Single-valued columns and the "add" placeholder cannot be deleted; the key
/// is consumed without effect there.
pub struct DeleteItemCommand;

impl Command for DeleteItemCommand {
    fn is_relevant(&self, context: &CommandContext, event: &KeyEvent) -> bool {
        is_normal(context) && matches!(event.code, KeyCode::Delete | KeyCode::Backspace)
    }

    fn execute(&self, _event: KeyEvent, context: &CommandContext) -> Result<Vec<CommandEvent>> {
        let state = &context.state;
        if !state.has_selection() || state.current_column_single || state.current_item_placeholder
        {
            return Ok(vec![]);
        }
        Ok(vec![CommandEvent::DeleteRequested])
    }

    fn name(&self) -> &'static str {
        "DeleteItem"
    }
}

/// Open the add-new patient modal (n)
pub struct AddPatientCommand;

impl Command for AddPatientCommand {
    fn is_relevant(&self, context: &CommandContext, event: &KeyEvent) -> bool {
        is_normal(context) && is_unmodified_char(event, 'n')
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::AddRequested])
    }

    fn name(&self) -> &'static str {
        "AddPatient"
    }
}

/// Re-fetch the patient list (r)
pub struct ReloadCommand;

impl Command for ReloadCommand {
    fn is_relevant(&self, context: &CommandContext, event: &KeyEvent) -> bool {
        is_normal(context) && is_unmodified_char(event, 'r')
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::ReloadRequested])
    }

    fn name(&self) -> &'static str {
        "Reload"
    }
}

/// Terminate application (Ctrl+C anywhere, q in normal state)
pub struct AppTerminateCommand;

impl Command for AppTerminateCommand {
    fn is_relevant(&self, context: &CommandContext, event: &KeyEvent) -> bool {
        let ctrl_c = matches!(event.code, KeyCode::Char('c'))
            && event.modifiers.contains(KeyModifiers::CONTROL);
        ctrl_c || (is_normal(context) && is_unmodified_char(event, 'q'))
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::QuitRequested])
    }

    fn name(&self) -> &'static str {
        "AppTerminate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::commands::ViewModelSnapshot;
    use crate::grid::events::GridCursor;

    fn create_test_context(state: InteractionState) -> CommandContext {
        CommandContext::new(ViewModelSnapshot {
            interaction_state: state,
            cursor: GridCursor::zero(),
            row_count: 1,
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
    fn enter_should_request_edit_in_normal_state() {
        let context = create_test_context(InteractionState::Normal);
        assert!(EditItemCommand.is_relevant(&context, &key(KeyCode::Enter)));
        assert_eq!(
            EditItemCommand.execute(key(KeyCode::Enter), &context).unwrap(),
            vec![CommandEvent::EditRequested]
        );
    }

    #[test]
    fn enter_should_not_edit_an_empty_grid() {
        let mut context = create_test_context(InteractionState::Normal);
        context.state.row_count = 0;
        assert!(!EditItemCommand.is_relevant(&context, &key(KeyCode::Enter)));
    }

    #[test]
    fn delete_on_real_multi_item_should_request_delete() {
        let context = create_test_context(InteractionState::Normal);
        for code in [KeyCode::Delete, KeyCode::Backspace] {
            assert!(DeleteItemCommand.is_relevant(&context, &key(code)));
            assert_eq!(
                DeleteItemCommand.execute(key(code), &context).unwrap(),
                vec![CommandEvent::DeleteRequested]
            );
        }
    }

    #[test]
    fn delete_on_placeholder_should_do_nothing() {
        let mut context = create_test_context(InteractionState::Normal);
        context.state.current_item_placeholder = true;
        assert!(DeleteItemCommand
            .execute(key(KeyCode::Delete), &context)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn delete_on_single_column_should_do_nothing() {
        let mut context = create_test_context(InteractionState::Normal);
        context.state.current_column_single = true;
        assert!(DeleteItemCommand
            .execute(key(KeyCode::Backspace), &context)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn q_should_quit_only_in_normal_state() {
        let q = key(KeyCode::Char('q'));
        assert!(AppTerminateCommand.is_relevant(&create_test_context(InteractionState::Normal), &q));
        assert!(!AppTerminateCommand.is_relevant(&create_test_context(InteractionState::Editing), &q));
    }

    #[test]
    fn ctrl_c_should_quit_in_any_state() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        for state in [InteractionState::Normal, InteractionState::Adding] {
            assert!(AppTerminateCommand.is_relevant(&create_test_context(state), &ctrl_c));
        }
    }

    #[test]
    fn add_and_reload_should_need_normal_state() {
        let adding = create_test_context(InteractionState::Adding);
        assert!(!AddPatientCommand.is_relevant(&adding, &key(KeyCode::Char('n'))));
        assert!(!ReloadCommand.is_relevant(&adding, &key(KeyCode::Char('r'))));

        let normal = create_test_context(InteractionState::Normal);
        assert!(AddPatientCommand.is_relevant(&normal, &key(KeyCode::Char('n'))));
        assert!(ReloadCommand.is_relevant(&normal, &key(KeyCode::Char('r'))));
    }
}
