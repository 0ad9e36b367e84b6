//! # Modal Commands
//!
//! Keys handled while a modal is open: form editing in `adding`/`editing`,
//! confirmation in `deleting`, and escape everywhere.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{Command, CommandContext, CommandEvent, FocusDirection};
use crate::grid::events::InteractionState;

fn has_form(context: &CommandContext) -> bool {
    context.interaction_state().has_form()
}

fn has_control(event: &KeyEvent) -> bool {
    event
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

/// Close the modal and discard the working copy (Esc)
pub struct CancelModalCommand;

impl Command for CancelModalCommand {
    fn is_relevant(&self, context: &CommandContext, event: &KeyEvent) -> bool {
        context.interaction_state().is_modal() && event.code == KeyCode::Esc
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::CancelRequested])
    }

    fn name(&self) -> &'static str {
        "CancelModal"
    }
}

/// Commit the form (Enter)
pub struct CommitFormCommand;

impl Command for CommitFormCommand {
    fn is_relevant(&self, context: &CommandContext, event: &KeyEvent) -> bool {
        has_form(context) && event.code == KeyCode::Enter
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::CommitRequested])
    }

    fn name(&self) -> &'static str {
        "CommitForm"
    }
}

/// Commit and immediately edit the next new item (Ctrl+N)
pub struct CommitAndAddNextCommand;

impl Command for CommitAndAddNextCommand {
    fn is_relevant(&self, context: &CommandContext, event: &KeyEvent) -> bool {
        context.interaction_state() == InteractionState::Editing
            && event.code == KeyCode::Char('n')
            && event.modifiers.contains(KeyModifiers::CONTROL)
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::CommitAndAddNextRequested])
    }

    fn name(&self) -> &'static str {
        "CommitAndAddNext"
    }
}

/// Answer the delete confirmation (Enter/y confirms, n cancels)
pub struct DeleteConfirmationCommand;

impl Command for DeleteConfirmationCommand {
    fn is_relevant(&self, context: &CommandContext, event: &KeyEvent) -> bool {
        context.interaction_state() == InteractionState::Deleting
            && !has_control(event)
            && matches!(
                event.code,
                KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('n')
            )
    }

    fn execute(&self, event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        match event.code {
            KeyCode::Char('n') => Ok(vec![CommandEvent::CancelRequested]),
            _ => Ok(vec![CommandEvent::ConfirmDeleteRequested]),
        }
    }

    fn name(&self) -> &'static str {
        "DeleteConfirmation"
    }
}

/// Move focus between inputs (Tab/Down forward, Shift+Tab/Up back)
pub struct FormFocusCommand;

impl Command for FormFocusCommand {
    fn is_relevant(&self, context: &CommandContext, event: &KeyEvent) -> bool {
        has_form(context)
            && matches!(
                event.code,
                KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up
            )
    }

    fn execute(&self, event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        let direction = match event.code {
            KeyCode::BackTab | KeyCode::Up => FocusDirection::Previous,
            KeyCode::Tab if event.modifiers.contains(KeyModifiers::SHIFT) => {
                FocusDirection::Previous
            }
            _ => FocusDirection::Next,
        };
        Ok(vec![CommandEvent::form_focus(direction)])
    }

    fn name(&self) -> &'static str {
        "FormFocus"
    }
}

/// Complete the focused input from its option list (Right)
pub struct FormCompleteCommand;

impl Command for FormCompleteCommand {
    fn is_relevant(&self, context: &CommandContext, event: &KeyEvent) -> bool {
        has_form(context) && event.code == KeyCode::Right
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::FormCompleteRequested])
    }

    fn name(&self) -> &'static str {
        "FormComplete"
    }
}

/// Delete the last character of the focused input (Backspace)
pub struct FormBackspaceCommand;

impl Command for FormBackspaceCommand {
    fn is_relevant(&self, context: &CommandContext, event: &KeyEvent) -> bool {
        has_form(context) && event.code == KeyCode::Backspace
    }

    fn execute(&self, _event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(vec![CommandEvent::FormBackspaceRequested])
    }

    fn name(&self) -> &'static str {
        "FormBackspace"
    }
}

/// Type into the focused input
pub struct FormCharCommand;

impl Command for FormCharCommand {
    fn is_relevant(&self, context: &CommandContext, event: &KeyEvent) -> bool {
        has_form(context) && matches!(event.code, KeyCode::Char(_)) && !has_control(event)
    }

    fn execute(&self, event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        match event.code {
            KeyCode::Char(ch) => Ok(vec![CommandEvent::form_char(ch)]),
            _ => Ok(vec![]),
        }
    }

    fn name(&self) -> &'static str {
        "FormChar"
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
            column_count: 1,
            current_column_single: false,
            current_item_placeholder: false,
            terminal_dimensions: (80, 24),
        })
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn escape_should_cancel_every_modal() {
        for state in [
            InteractionState::Adding,
            InteractionState::Editing,
            InteractionState::Deleting,
        ] {
            assert!(CancelModalCommand.is_relevant(&create_test_context(state), &key(KeyCode::Esc)));
        }
        assert!(!CancelModalCommand.is_relevant(
            &create_test_context(InteractionState::Normal),
            &key(KeyCode::Esc)
        ));
    }

    #[test]
    fn delete_dialog_should_answer_y_and_n() {
        let context = create_test_context(InteractionState::Deleting);
        assert_eq!(
            DeleteConfirmationCommand
                .execute(key(KeyCode::Char('y')), &context)
                .unwrap(),
            vec![CommandEvent::ConfirmDeleteRequested]
        );
        assert_eq!(
            DeleteConfirmationCommand
                .execute(key(KeyCode::Char('n')), &context)
                .unwrap(),
            vec![CommandEvent::CancelRequested]
        );
        assert!(!CommitFormCommand.is_relevant(&context, &key(KeyCode::Enter)));
    }

    #[test]
    fn typing_should_target_the_form() {
        let context = create_test_context(InteractionState::Editing);
        let event = KeyEvent::new(KeyCode::Char('Q'), KeyModifiers::SHIFT);
        assert!(FormCharCommand.is_relevant(&context, &event));
        assert_eq!(
            FormCharCommand.execute(event, &context).unwrap(),
            vec![CommandEvent::form_char('Q')]
        );
    }

    #[test]
    fn ctrl_n_should_commit_and_add_next_only_while_editing() {
        let ctrl_n = KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL);
        assert!(CommitAndAddNextCommand
            .is_relevant(&create_test_context(InteractionState::Editing), &ctrl_n));
        assert!(!CommitAndAddNextCommand
            .is_relevant(&create_test_context(InteractionState::Adding), &ctrl_n));
        assert!(!FormCharCommand.is_relevant(&create_test_context(InteractionState::Editing), &ctrl_n));
    }

    #[test]
    fn focus_keys_should_pick_a_direction() {
        let context = create_test_context(InteractionState::Adding);
        assert_eq!(
            FormFocusCommand.execute(key(KeyCode::Tab), &context).unwrap(),
            vec![CommandEvent::form_focus(FocusDirection::Next)]
        );
        assert_eq!(
            FormFocusCommand
                .execute(key(KeyCode::BackTab), &context)
                .unwrap(),
            vec![CommandEvent::form_focus(FocusDirection::Previous)]
        );
        assert_eq!(
            FormFocusCommand.execute(key(KeyCode::Up), &context).unwrap(),
            vec![CommandEvent::form_focus(FocusDirection::Previous)]
        );
    }
}
