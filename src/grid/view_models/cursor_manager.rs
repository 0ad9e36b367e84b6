//! # Cursor Management
//!
//! Keyboard cursor movement over (row, column, item) and mouse hover tracking.
//! The cursor never leaves `[0, rows) x [0, columns) x [0, items)`.

use crate::grid::commands::MovementDirection;
use crate::grid::events::{GridCursor, InteractionState, MousePosition, ViewEvent};
use crate::grid::view_models::core::ViewModel;

impl ViewModel {
    /// Move the cursor one step
    ///
    /// Left/right change column and reset the item index. Up/down walk the
    /// current cell's items and cross into the neighbouring row at the list
    /// boundary: up lands on the previous row's last item, down on the next
    /// row's first item. Rows do not wrap.
    pub fn move_cursor(&mut self, direction: MovementDirection) {
        if self.rows.is_empty() || self.columns.is_empty() {
            return;
        }

        let GridCursor { rix, cix, iix } = self.cursor;
        let next = match direction {
            MovementDirection::Left => GridCursor::new(rix, cix.saturating_sub(1), 0),
            MovementDirection::Right => {
                GridCursor::new(rix, (cix + 1).min(self.columns.len() - 1), 0)
            }
            MovementDirection::Up => {
                if iix > 0 {
                    GridCursor::new(rix, cix, iix - 1)
                } else if rix > 0 {
                    let last = self.item_count(rix - 1, cix).saturating_sub(1);
                    GridCursor::new(rix - 1, cix, last)
                } else {
                    self.cursor
                }
            }
            MovementDirection::Down => {
                if iix + 1 < self.item_count(rix, cix) {
                    GridCursor::new(rix, cix, iix + 1)
                } else if rix + 1 < self.rows.len() {
                    GridCursor::new(rix + 1, cix, 0)
                } else {
                    self.cursor
                }
            }
        };

        self.set_cursor(next);
    }

    /// Select an item directly (mouse click); ignored while a modal is open
    pub fn select_item(&mut self, rix: usize, cix: usize, iix: usize) {
        if self.state != InteractionState::Normal {
            return;
        }
        self.set_cursor(GridCursor::new(rix, cix, iix));
    }

    /// Track the mouse; never changes the keyboard cursor or the state
    pub fn set_mouse_hover(&mut self, position: Option<MousePosition>) {
        if self.mouse != position {
            self.mouse = position;
            self.emit_view_event([ViewEvent::HoverChanged]);
        }
    }

    pub(super) fn set_cursor(&mut self, cursor: GridCursor) {
        let previous = self.cursor;
        self.cursor = cursor;
        self.clamp_cursor();
        if self.cursor != previous {
            tracing::trace!("Cursor moved {:?} -> {:?}", previous, self.cursor);
            self.emit_view_event([ViewEvent::CursorMoved]);
        }
    }

    /// Pull the cursor back inside the grid after rows or items changed
    pub(super) fn clamp_cursor(&mut self) {
        let rix = self.cursor.rix.min(self.rows.len().saturating_sub(1));
        let cix = self.cursor.cix.min(self.columns.len().saturating_sub(1));
        let iix = self
            .cursor
            .iix
            .min(self.item_count(rix, cix).saturating_sub(1));
        self.cursor = GridCursor::new(rix, cix, iix);
    }
}
