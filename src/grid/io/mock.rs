//! # Headless Streams
//!
//! Scripted key/mouse input and recorded terminal output, so controller and
//! renderer tests run without a tty.

use super::{EventStream, RenderStream, TerminalSize};
use anyhow::Result;
use crossterm::event::Event;
use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Replays scripted events; polls true while any remain
pub struct MockEventStream {
    events: VecDeque<Event>,
}

impl MockEventStream {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn push_event(&mut self, event: Event) {
        self.events.push_back(event);
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl EventStream for MockEventStream {
    fn poll(&mut self, _timeout: Duration) -> Result<bool> {
        Ok(!self.events.is_empty())
    }

    fn read(&mut self) -> Result<Event> {
        self.events
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("No events available"))
    }
}

/// One call made on a `MockRenderStream`
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    ClearScreen,
    MoveCursor(u16, u16),
    HideCursor,
    ShowCursor,
    GetSize,
    EnterAlternateScreen,
    LeaveAlternateScreen,
    EnableRawMode,
    DisableRawMode,
    EnableMouseCapture,
    DisableMouseCapture,
    Write(Vec<u8>),
    Flush,
}

type CommandHistory = Arc<Mutex<Vec<RenderCommand>>>;

/// Records every command and keeps the written bytes
pub struct MockRenderStream {
    commands: CommandHistory,
    buffer: Vec<u8>,
    terminal_size: TerminalSize,
}

impl MockRenderStream {
    pub fn new() -> Self {
        Self::with_size((80, 24))
    }

    pub fn with_size(size: TerminalSize) -> Self {
        Self {
            commands: Arc::new(Mutex::new(Vec::new())),
            buffer: Vec::new(),
            terminal_size: size,
        }
    }

    pub fn get_commands(&self) -> Vec<RenderCommand> {
        self.history().clone()
    }

    pub fn clear_commands(&mut self) {
        self.history().clear();
        self.buffer.clear();
    }

    pub fn has_command(&self, command: &RenderCommand) -> bool {
        self.history().contains(command)
    }

    /// Written bytes as a lossy string (text and escape sequences)
    pub fn get_buffer_string(&self) -> String {
        String::from_utf8_lossy(&self.buffer).to_string()
    }

    fn history(&self) -> MutexGuard<'_, Vec<RenderCommand>> {
        self.commands.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, command: RenderCommand) {
        self.history().push(command);
    }
}

impl Default for MockRenderStream {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for MockRenderStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        self.record(RenderCommand::Write(buf.to_vec()));
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.record(RenderCommand::Flush);
        Ok(())
    }
}

impl RenderStream for MockRenderStream {
    fn clear_screen(&mut self) -> Result<()> {
        self.record(RenderCommand::ClearScreen);
        self.buffer.clear();
        Ok(())
    }

    fn move_cursor(&mut self, x: u16, y: u16) -> Result<()> {
        self.record(RenderCommand::MoveCursor(x, y));
        Ok(())
    }

    fn hide_cursor(&mut self) -> Result<()> {
        self.record(RenderCommand::HideCursor);
        Ok(())
    }

    fn show_cursor(&mut self) -> Result<()> {
        self.record(RenderCommand::ShowCursor);
        Ok(())
    }

    fn get_size(&self) -> Result<TerminalSize> {
        self.record(RenderCommand::GetSize);
        Ok(self.terminal_size)
    }

    fn enter_alternate_screen(&mut self) -> Result<()> {
        self.record(RenderCommand::EnterAlternateScreen);
        Ok(())
    }

    fn leave_alternate_screen(&mut self) -> Result<()> {
        self.record(RenderCommand::LeaveAlternateScreen);
        Ok(())
    }

    fn enable_raw_mode(&mut self) -> Result<()> {
        self.record(RenderCommand::EnableRawMode);
        Ok(())
    }

    fn disable_raw_mode(&mut self) -> Result<()> {
        self.record(RenderCommand::DisableRawMode);
        Ok(())
    }

    fn enable_mouse_capture(&mut self) -> Result<()> {
        self.record(RenderCommand::EnableMouseCapture);
        Ok(())
    }

    fn disable_mouse_capture(&mut self) -> Result<()> {
        self.record(RenderCommand::DisableMouseCapture);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn mock_event_stream_should_poll_until_drained() {
        let mut stream = MockEventStream::new(vec![Event::Key(KeyEvent::new(
            KeyCode::Char('j'),
            KeyModifiers::NONE,
        ))]);
        assert!(stream.poll(Duration::from_millis(0)).unwrap());
        assert!(stream.read().is_ok());
        assert!(!stream.poll(Duration::from_millis(0)).unwrap());
        assert!(stream.read().is_err());
    }

    #[test]
    fn mock_render_stream_should_record_commands() {
        let mut stream = MockRenderStream::new();
        stream.enable_mouse_capture().unwrap();
        write!(stream, "Ann").unwrap();
        assert!(stream.has_command(&RenderCommand::EnableMouseCapture));
        assert_eq!(stream.get_buffer_string(), "Ann");
        assert_eq!(stream.get_size().unwrap(), (80, 24));
    }
}
