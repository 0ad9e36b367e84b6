//! # Terminal Renderer
//!
//! Paints [`Frame`]s onto a [`RenderStream`]. Lines identical to the previous
//! frame are skipped unless a full redraw was requested.

use crate::grid::io::{RenderStream, TerminalRenderStream};
use crate::grid::views::frame::{Frame, FrameLine, SpanStyle};
use anyhow::Result;
use crossterm::{
    cursor::MoveTo,
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};

// Helper macro to convert crossterm errors to anyhow errors
macro_rules! queue_term {
    ($($arg:expr),* $(,)?) => {
        queue!($($arg),*).map_err(anyhow::Error::from)
    };
}

macro_rules! execute_term {
    ($($arg:expr),* $(,)?) => {
        execute!($($arg),*).map_err(anyhow::Error::from)
    };
}

/// Trait for rendering views
pub trait ViewRenderer {
    /// Prepare the terminal (alternate screen, raw mode, mouse capture)
    fn initialize(&mut self) -> Result<()>;

    /// Paint a frame; `full` forces every line to be redrawn
    fn render_frame(&mut self, frame: &Frame, full: bool) -> Result<()>;

    /// Restore the terminal on exit
    fn cleanup(&mut self) -> Result<()>;
}

pub struct TerminalRenderer<RS: RenderStream = TerminalRenderStream<io::Stdout>> {
    render_stream: RS,
    terminal_size: (u16, u16),
    last_frame: Option<Frame>,
}

impl TerminalRenderer<TerminalRenderStream<io::Stdout>> {
    pub fn new() -> Result<Self> {
        Self::with_render_stream(TerminalRenderStream::new())
    }
}

impl<RS: RenderStream> TerminalRenderer<RS> {
    pub fn with_render_stream(render_stream: RS) -> Result<Self> {
        let terminal_size = render_stream.get_size()?;
        Ok(Self {
            render_stream,
            terminal_size,
            last_frame: None,
        })
    }

    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    pub fn update_size(&mut self, width: u16, height: u16) {
        self.terminal_size = (width, height);
        self.last_frame = None;
    }

    pub fn render_stream(&self) -> &RS {
        &self.render_stream
    }

    pub fn render_stream_mut(&mut self) -> &mut RS {
        &mut self.render_stream
    }

    fn apply_style(&mut self, style: SpanStyle) -> Result<()> {
        let out = &mut self.render_stream;
        match style {
            SpanStyle::Plain | SpanStyle::Modal => {}
            SpanStyle::Header => queue_term!(out, SetAttribute(Attribute::Bold))?,
            SpanStyle::Selected => queue_term!(out, SetAttribute(Attribute::Reverse))?,
            SpanStyle::Hover => queue_term!(out, SetBackgroundColor(Color::DarkGrey))?,
            SpanStyle::Placeholder | SpanStyle::Muted => {
                queue_term!(out, SetForegroundColor(Color::DarkGrey))?
            }
            SpanStyle::Pending => queue_term!(out, SetAttribute(Attribute::Italic))?,
            SpanStyle::ModalTitle => queue_term!(
                out,
                SetForegroundColor(Color::Cyan),
                SetAttribute(Attribute::Bold)
            )?,
            SpanStyle::ModalFocused => queue_term!(out, SetForegroundColor(Color::Yellow))?,
            SpanStyle::Status => queue_term!(
                out,
                SetBackgroundColor(Color::Blue),
                SetForegroundColor(Color::White)
            )?,
        }
        Ok(())
    }

    fn render_line(&mut self, y: u16, line: &FrameLine) -> Result<()> {
        queue_term!(self.render_stream, MoveTo(0, y))?;
        for span in &line.spans {
            self.apply_style(span.style)?;
            queue_term!(
                self.render_stream,
                Print(&span.text),
                SetAttribute(Attribute::Reset),
                ResetColor
            )?;
        }
        queue_term!(self.render_stream, Clear(ClearType::UntilNewLine))?;
        Ok(())
    }
}

impl<RS: RenderStream> ViewRenderer for TerminalRenderer<RS> {
    fn initialize(&mut self) -> Result<()> {
        self.render_stream.enter_alternate_screen()?;
        self.render_stream.enable_raw_mode()?;
        self.render_stream.enable_mouse_capture()?;
        self.render_stream.hide_cursor()?;
        self.render_stream.clear_screen()?;
        self.last_frame = None;
        Ok(())
    }

    fn render_frame(&mut self, frame: &Frame, full: bool) -> Result<()> {
        self.render_stream.hide_cursor()?;
        let previous = if full { None } else { self.last_frame.take() };
        if previous.is_none() {
            execute_term!(self.render_stream, Clear(ClearType::All))?;
        }

        let mut painted = 0;
        for (y, line) in frame.lines.iter().enumerate() {
            let unchanged = previous
                .as_ref()
                .and_then(|previous| previous.lines.get(y))
                .is_some_and(|old| old == line);
            if !unchanged {
                self.render_line(y as u16, line)?;
                painted += 1;
            }
        }
        tracing::trace!("render_frame: painted {} of {} lines", painted, frame.lines.len());

        match frame.cursor {
            Some((x, y)) => {
                self.render_stream.move_cursor(x, y)?;
                self.render_stream.show_cursor()?;
            }
            None => self.render_stream.hide_cursor()?,
        }
        self.render_stream.flush()?;
        self.last_frame = Some(frame.clone());
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        self.render_stream.show_cursor()?;
        self.render_stream.disable_mouse_capture()?;
        self.render_stream.disable_raw_mode()?;
        self.render_stream.leave_alternate_screen()?;
        self.render_stream.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::io::{MockRenderStream, RenderCommand};
    use crate::grid::views::frame::Span;

    fn frame(lines: &[&str]) -> Frame {
        let mut frame = Frame::new(20, lines.len() as u16);
        for text in lines {
            let mut line = FrameLine::new();
            line.push(Span::plain(*text));
            frame.lines.push(line);
        }
        frame
    }

    fn renderer() -> TerminalRenderer<MockRenderStream> {
        TerminalRenderer::with_render_stream(MockRenderStream::with_size((20, 3))).unwrap()
    }

    #[test]
    fn initialize_should_enable_raw_mode_and_mouse_capture() {
        let mut renderer = renderer();
        renderer.initialize().unwrap();
        let stream = renderer.render_stream();
        assert!(stream.has_command(&RenderCommand::EnterAlternateScreen));
        assert!(stream.has_command(&RenderCommand::EnableRawMode));
        assert!(stream.has_command(&RenderCommand::EnableMouseCapture));
    }

    #[test]
    fn render_frame_should_write_line_text() {
        let mut renderer = renderer();
        renderer.render_frame(&frame(&["Ann", "Bea"]), true).unwrap();
        let output = renderer.render_stream().get_buffer_string();
        assert!(output.contains("Ann"));
        assert!(output.contains("Bea"));
    }

    #[test]
    fn unchanged_lines_should_not_be_repainted() {
        let mut renderer = renderer();
        renderer.render_frame(&frame(&["Ann", "Bea"]), true).unwrap();
        renderer.render_stream_mut().clear_commands();
        renderer.render_frame(&frame(&["Ann", "Cat"]), false).unwrap();
        let output = renderer.render_stream().get_buffer_string();
        assert!(!output.contains("Ann"));
        assert!(output.contains("Cat"));
    }

    #[test]
    fn frame_cursor_should_be_shown_at_its_position() {
        let mut renderer = renderer();
        let mut frame = frame(&["Name: Ann"]);
        frame.cursor = Some((9, 0));
        renderer.render_frame(&frame, true).unwrap();
        let stream = renderer.render_stream();
        assert!(stream.has_command(&RenderCommand::MoveCursor(9, 0)));
        assert!(stream.has_command(&RenderCommand::ShowCursor));
    }

    #[test]
    fn cleanup_should_restore_the_terminal() {
        let mut renderer = renderer();
        renderer.cleanup().unwrap();
        let stream = renderer.render_stream();
        assert!(stream.has_command(&RenderCommand::DisableMouseCapture));
        assert!(stream.has_command(&RenderCommand::LeaveAlternateScreen));
    }
}
