//! # Modal Management
//!
//! Opening and closing modals, and editing the working copy while a form is
//! open. Committing lives in the CRUD manager.

use crate::grid::commands::FocusDirection;
use crate::grid::events::{InteractionState, ViewEvent};
use crate::grid::models::WorkingCopy;
use crate::grid::view_models::core::ViewModel;

impl ViewModel {
    /// Open the column modal on the selected item (`normal` -> `editing`)
    pub fn begin_edit(&mut self) -> bool {
        if self.state != InteractionState::Normal {
            return false;
        }
        let (Some(row), Some(column), Some(item)) =
            (self.current_row(), self.current_column(), self.current_item())
        else {
            return false;
        };

        let working_copy = WorkingCopy::for_item(row.patient_id(), column, item);
        tracing::debug!(
            "Editing {} of patient {} at {:?}",
            column.name,
            row.patient_id(),
            self.cursor
        );
        self.open_modal(InteractionState::Editing, working_copy);
        true
    }

    /// Open the global add-new modal (`normal` -> `adding`)
    pub fn begin_add(&mut self) -> bool {
        if self.state != InteractionState::Normal {
            return false;
        }
        tracing::debug!("Adding a new patient");
        self.open_modal(InteractionState::Adding, WorkingCopy::for_new_patient());
        true
    }

    /// Open the delete confirmation (`normal` -> `deleting`)
    ///
    /// Only a real item of a multi-valued column can be deleted; anything else
    /// is a no-op.
    pub fn begin_delete(&mut self) -> bool {
        if self.state != InteractionState::Normal {
            return false;
        }
        let (Some(row), Some(column), Some(item)) =
            (self.current_row(), self.current_column(), self.current_item())
        else {
            return false;
        };
        if column.single || item.is_placeholder() {
            return false;
        }

        let working_copy = WorkingCopy::for_delete(row.patient_id(), column, item);
        self.open_modal(InteractionState::Deleting, working_copy);
        true
    }

    /// Escape: discard the working copy and return to `normal`
    pub fn cancel_modal(&mut self) {
        if self.state.is_modal() {
            tracing::debug!("Cancelled {}", self.state.label());
            self.close_modal();
        }
    }

    pub fn form_insert_char(&mut self, ch: char) {
        if self.edit_form(|working_copy| working_copy.insert_char(ch)) {
            self.emit_view_event([ViewEvent::ModalChanged]);
        }
    }

    pub fn form_backspace(&mut self) {
        if self.edit_form(WorkingCopy::backspace) {
            self.emit_view_event([ViewEvent::ModalChanged]);
        }
    }

    pub fn form_move_focus(&mut self, direction: FocusDirection) {
        let moved = self.edit_form(|working_copy| {
            let before = working_copy.focus();
            match direction {
                FocusDirection::Next => working_copy.focus_next(),
                FocusDirection::Previous => working_copy.focus_previous(),
            }
            working_copy.focus() != before
        });
        if moved {
            self.emit_view_event([ViewEvent::ModalChanged]);
        }
    }

    /// Complete the focused input with the first matching option list entry
    pub fn form_complete(&mut self) {
        let completion = self
            .working_copy
            .as_ref()
            .filter(|_| self.state.has_form())
            .and_then(WorkingCopy::focused_field)
            .and_then(|field| {
                let list = field.lookup_list.as_deref()?;
                self.option_lists.complete(list, &field.value)
            })
            .map(str::to_string);

        if let Some(completion) = completion {
            if self.edit_form(|working_copy| working_copy.set_focused_value(&completion)) {
                self.emit_view_event([ViewEvent::ModalChanged]);
            }
        }
    }

    fn edit_form<F>(&mut self, edit: F) -> bool
    where
        F: FnOnce(&mut WorkingCopy) -> bool,
    {
        if !self.state.has_form() {
            return false;
        }
        self.working_copy.as_mut().is_some_and(edit)
    }

    pub(super) fn open_modal(&mut self, state: InteractionState, mut working_copy: WorkingCopy) {
        working_copy.focus_first();
        self.working_copy = Some(working_copy);
        self.state = state;
        self.emit_view_event([ViewEvent::ModalChanged, ViewEvent::StatusBarUpdateRequired]);
    }

    /// Blur, drop the working copy and return to `normal`
    pub(super) fn close_modal(&mut self) -> Option<WorkingCopy> {
        let mut working_copy = self.working_copy.take();
        if let Some(working_copy) = working_copy.as_mut() {
            working_copy.blur();
        }
        self.state = InteractionState::Normal;
        self.emit_view_event([ViewEvent::ModalChanged, ViewEvent::StatusBarUpdateRequired]);
        working_copy
    }
}
