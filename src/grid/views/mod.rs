//! # Views Module
//!
//! Pure frame rendering plus the terminal painter.

pub mod frame;
pub mod grid_view;
pub mod terminal_renderer;

pub use frame::{display_width, fit_width, Frame, FrameLine, HitRegion, Span, SpanStyle};
pub use grid_view::{item_summary, record_summary, render_grid, GridSnapshot, PLACEHOLDER_TEXT};
pub use terminal_renderer::{TerminalRenderer, ViewRenderer};
