//! # I/O Abstraction Layer
//!
//! Trait abstractions for input and output streams so the controller can run
//! against a real terminal or against scripted test streams.
//!
//! ```text
//! Production:  AppController ──▶ TerminalEventStream ──▶ crossterm::event::read()
//!                            ──▶ TerminalRenderStream ──▶ crossterm::execute!()
//!
//! Testing:     AppController ──▶ MockEventStream     ──▶ VecDeque<Event>
//!                            ──▶ MockRenderStream    ──▶ Vec<RenderCommand>
//! ```

use anyhow::Result;
use crossterm::event::Event;
use std::io::Write;
use std::time::Duration;

pub mod mock;
pub mod terminal;

pub use mock::{MockEventStream, MockRenderStream, RenderCommand};
pub use terminal::{TerminalEventStream, TerminalRenderStream};

/// Type alias for terminal size (width, height)
pub type TerminalSize = (u16, u16);

/// Input event stream abstraction
pub trait EventStream: Send {
    /// Check if events are available within the timeout
    fn poll(&mut self, timeout: Duration) -> Result<bool>;

    /// Read the next available event
    ///
    /// This should only be called after poll() returns true.
    fn read(&mut self) -> Result<Event>;
}

/// Output render stream abstraction
pub trait RenderStream: Write + Send {
    fn clear_screen(&mut self) -> Result<()>;

    /// Move cursor to specific position (column, row)
    fn move_cursor(&mut self, x: u16, y: u16) -> Result<()>;

    fn hide_cursor(&mut self) -> Result<()>;

    fn show_cursor(&mut self) -> Result<()>;

    /// Get terminal size as (width, height)
    fn get_size(&self) -> Result<TerminalSize>;

    fn enter_alternate_screen(&mut self) -> Result<()>;

    fn leave_alternate_screen(&mut self) -> Result<()>;

    fn enable_raw_mode(&mut self) -> Result<()>;

    fn disable_raw_mode(&mut self) -> Result<()>;

    /// Start reporting mouse clicks and movement as events
    fn enable_mouse_capture(&mut self) -> Result<()>;

    fn disable_mouse_capture(&mut self) -> Result<()>;
}
