//! # View Events
//!
//! Emitted by the view model whenever state that affects the rendered frame
//! changes. The controller collects them after each handler and re-renders.

/// What changed since the last render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    /// Schema or patient data was (re)loaded
    FullRedrawRequired,
    /// Row content changed in place
    GridContentChanged,
    /// Rows were re-sorted and may have moved
    RowsReordered,
    /// Keyboard cursor moved
    CursorMoved,
    /// Mouse hover moved
    HoverChanged,
    /// A modal opened, closed or its form changed
    ModalChanged,
    StatusBarUpdateRequired,
}
