//! # Terminal Streams
//!
//! crossterm-backed streams used outside of tests. The renderer enables
//! mouse capture through them so the grid receives clicks and hover.

use super::{EventStream, RenderStream, TerminalSize};
use anyhow::Result;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};
use std::io::{self, Write};
use std::time::Duration;

/// Key, mouse and resize events from the tty
pub struct TerminalEventStream;

impl TerminalEventStream {
    pub fn new() -> Self {
        Self
    }
}

impl EventStream for TerminalEventStream {
    fn poll(&mut self, timeout: Duration) -> Result<bool> {
        event::poll(timeout).map_err(anyhow::Error::from)
    }

    fn read(&mut self) -> Result<Event> {
        event::read().map_err(anyhow::Error::from)
    }
}

/// Frame output; stdout unless a writer is given
pub struct TerminalRenderStream<W: Write> {
    writer: W,
}

impl TerminalRenderStream<io::Stdout> {
    pub fn new() -> Self {
        Self {
            writer: io::stdout(),
        }
    }
}

impl<W: Write> TerminalRenderStream<W> {
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> Write for TerminalRenderStream<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl<W: Write + Send> RenderStream for TerminalRenderStream<W> {
    fn clear_screen(&mut self) -> Result<()> {
        execute!(self.writer, terminal::Clear(terminal::ClearType::All))
            .map_err(anyhow::Error::from)
    }

    fn move_cursor(&mut self, x: u16, y: u16) -> Result<()> {
        execute!(self.writer, cursor::MoveTo(x, y)).map_err(anyhow::Error::from)
    }

    fn hide_cursor(&mut self) -> Result<()> {
        execute!(self.writer, cursor::Hide).map_err(anyhow::Error::from)
    }

    fn show_cursor(&mut self) -> Result<()> {
        execute!(self.writer, cursor::Show).map_err(anyhow::Error::from)
    }

    fn get_size(&self) -> Result<TerminalSize> {
        terminal::size().map_err(anyhow::Error::from)
    }

    fn enter_alternate_screen(&mut self) -> Result<()> {
        execute!(self.writer, EnterAlternateScreen).map_err(anyhow::Error::from)
    }

    fn leave_alternate_screen(&mut self) -> Result<()> {
        execute!(self.writer, LeaveAlternateScreen).map_err(anyhow::Error::from)
    }

    fn enable_raw_mode(&mut self) -> Result<()> {
        terminal::enable_raw_mode().map_err(anyhow::Error::from)
    }

    fn disable_raw_mode(&mut self) -> Result<()> {
        terminal::disable_raw_mode().map_err(anyhow::Error::from)
    }

    fn enable_mouse_capture(&mut self) -> Result<()> {
        execute!(self.writer, EnableMouseCapture).map_err(anyhow::Error::from)
    }

    fn disable_mouse_capture(&mut self) -> Result<()> {
        execute!(self.writer, DisableMouseCapture).map_err(anyhow::Error::from)
    }
}

impl Default for TerminalEventStream {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for TerminalRenderStream<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}
