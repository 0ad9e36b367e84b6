//! # Navigation Commands
//!
//! Grid cursor movement with h,j,k,l and the arrow keys. Only active in
//! `normal` state; inside a form the arrows belong to the form.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{Command, CommandContext, CommandEvent, MovementDirection};
use crate::grid::events::InteractionState;

fn is_plain(event: &KeyEvent) -> bool {
    !event
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

fn direction_for(event: &KeyEvent) -> Option<MovementDirection> {
    match event.code {
        KeyCode::Char('h') | KeyCode::Left => Some(MovementDirection::Left),
        KeyCode::Char('l') | KeyCode::Right => Some(MovementDirection::Right),
        KeyCode::Char('k') | KeyCode::Up => Some(MovementDirection::Up),
        KeyCode::Char('j') | KeyCode::Down => Some(MovementDirection::Down),
        _ => None,
    }
}

/// Move the grid cursor (h/j/k/l or arrows)
pub struct MoveCursorCommand;

impl Command for MoveCursorCommand {
    fn is_relevant(&self, context: &CommandContext, event: &KeyEvent) -> bool {
        context.interaction_state() == InteractionState::Normal
            && is_plain(event)
            && direction_for(event).is_some()
    }

    fn execute(&self, event: KeyEvent, _context: &CommandContext) -> Result<Vec<CommandEvent>> {
        Ok(direction_for(&event)
            .map(CommandEvent::cursor_move)
            .into_iter()
            .collect())
    }

    fn name(&self) -> &'static str {
        "MoveCursor"
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
            row_count: 2,
            column_count: 2,
            current_column_single: false,
            current_item_placeholder: false,
            terminal_dimensions: (80, 24),
        })
    }

    #[test]
    fn vi_keys_and_arrows_should_map_to_the_same_direction() {
        let context = create_test_context(InteractionState::Normal);
        let cmd = MoveCursorCommand;

        for (code, direction) in [
            (KeyCode::Char('h'), MovementDirection::Left),
            (KeyCode::Left, MovementDirection::Left),
            (KeyCode::Char('j'), MovementDirection::Down),
            (KeyCode::Down, MovementDirection::Down),
            (KeyCode::Char('k'), MovementDirection::Up),
            (KeyCode::Up, MovementDirection::Up),
            (KeyCode::Char('l'), MovementDirection::Right),
            (KeyCode::Right, MovementDirection::Right),
        ] {
            let event = KeyEvent::new(code, KeyModifiers::NONE);
            assert!(cmd.is_relevant(&context, &event));
            assert_eq!(
                cmd.execute(event, &context).unwrap(),
                vec![CommandEvent::cursor_move(direction)]
            );
        }
    }

    #[test]
    fn movement_should_not_be_relevant_in_a_modal() {
        let cmd = MoveCursorCommand;
        let event = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE);

        for state in [
            InteractionState::Adding,
            InteractionState::Editing,
            InteractionState::Deleting,
        ] {
            assert!(!cmd.is_relevant(&create_test_context(state), &event));
        }
    }

    #[test]
    fn control_modified_keys_should_not_move() {
        let context = create_test_context(InteractionState::Normal);
        let event = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::CONTROL);
        assert!(!MoveCursorCommand.is_relevant(&context, &event));
    }
}
