//! # Frames
//!
//! Terminal-independent output of `render_grid`: styled lines, the hit
//! regions used to map mouse positions back to items, and where the terminal
//! cursor should sit.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Visual role of a span; the terminal renderer maps roles to colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanStyle {
    Plain,
    Header,
    Selected,
    Hover,
    Placeholder,
    /// Created locally, not yet confirmed by the server
    Pending,
    Muted,
    Modal,
    ModalTitle,
    ModalFocused,
    Status,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: SpanStyle,
}

impl Span {
    pub fn new(text: impl Into<String>, style: SpanStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, SpanStyle::Plain)
    }

    pub fn width(&self) -> usize {
        self.text.width()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameLine {
    pub spans: Vec<Span>,
}

impl FrameLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, span: Span) {
        self.spans.push(span);
    }

    pub fn width(&self) -> usize {
        self.spans.iter().map(Span::width).sum()
    }

    /// Unstyled text of the line
    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

/// Screen area of one rendered item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitRegion {
    pub y: u16,
    pub x_start: u16,
    /// Exclusive
    pub x_end: u16,
    pub rix: usize,
    pub cix: usize,
    pub iix: usize,
}

impl HitRegion {
    pub fn contains(&self, x: u16, y: u16) -> bool {
        self.y == y && self.x_start <= x && x < self.x_end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    pub lines: Vec<FrameLine>,
    pub hit_regions: Vec<HitRegion>,
    /// Terminal cursor position (x, y) when an input has focus
    pub cursor: Option<(u16, u16)>,
}

impl Frame {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            lines: Vec::new(),
            hit_regions: Vec::new(),
            cursor: None,
        }
    }

    /// Item under a screen position
    pub fn hit_test(&self, x: u16, y: u16) -> Option<&HitRegion> {
        self.hit_regions.iter().find(|region| region.contains(x, y))
    }

    /// Unstyled text of every line, newline separated
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(FrameLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Control characters never reach the terminal; each shows as one space
fn printable(ch: char) -> char {
    if ch.is_control() {
        ' '
    } else {
        ch
    }
}

/// Display columns `text` takes once passed through `fit_width`
pub fn display_width(text: &str) -> usize {
    text.chars()
        .map(|ch| printable(ch).width().unwrap_or(0))
        .sum()
}

/// Cut `text` to at most `width` display columns and pad it to exactly `width`
pub fn fit_width(text: &str, width: usize) -> String {
    let mut fitted = String::new();
    let mut used = 0;
    for ch in text.chars().map(printable) {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > width {
            break;
        }
        fitted.push(ch);
        used += ch_width;
    }
    fitted.push_str(&" ".repeat(width - used));
    fitted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_width_should_truncate_and_pad() {
        assert_eq!(fit_width("Pneumonia", 5), "Pneum");
        assert_eq!(fit_width("Flu", 5), "Flu  ");
        // Wide characters take two columns
        assert_eq!(fit_width("病院病院", 5), "病院 ");
    }

    #[test]
    fn fit_width_should_blank_control_characters() {
        assert_eq!(fit_width("a\nb", 4), "a b ");
        assert_eq!(fit_width("x\t\u{1b}[2J", 6), "x  [2J");
        assert_eq!(display_width("a\r\nb"), 4);
    }

    #[test]
    fn hit_test_should_find_the_region_under_the_mouse() {
        let mut frame = Frame::new(40, 10);
        frame.hit_regions.push(HitRegion {
            y: 2,
            x_start: 12,
            x_end: 24,
            rix: 0,
            cix: 1,
            iix: 0,
        });
        assert_eq!(frame.hit_test(12, 2).map(|r| r.cix), Some(1));
        assert!(frame.hit_test(24, 2).is_none());
        assert!(frame.hit_test(13, 3).is_none());
    }
}
