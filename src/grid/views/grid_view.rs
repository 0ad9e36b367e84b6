//! # Grid View
//!
//! `render_grid` is a pure function from a [`GridSnapshot`] to a [`Frame`].
//! It is called after every handler that changed state; nothing here touches
//! the terminal.
//!
//! ```text
//! ┌ header: column titles ─────────────────────────────┐
//! │ row block (height = tallest visible cell)          │
//! │ ─────────────────────────────────────────────────  │
//! │ ...                                                │
//! └ status line ───────────────────────────────────────┘
//! ```
//!
//! Columns are at least `MIN_COLUMN_WIDTH` wide and scroll horizontally to keep
//! the cursor column visible. Rows scroll vertically to keep the cursor row
//! visible. A cell whose column has a `list_limit` is collapsed to that many
//! items unless it belongs to the cursor row.

use crate::grid::events::{GridCursor, InteractionState, MousePosition};
use crate::grid::models::{
    Column, Item, ModalTarget, OptionLists, Record, Row, WorkingCopy,
};
use crate::grid::models::item::RESERVED_FIELDS;
use crate::grid::view_models::ViewModel;
use crate::grid::views::frame::{
    display_width, fit_width, Frame, FrameLine, HitRegion, Span, SpanStyle,
};
use unicode_width::UnicodeWidthStr;

pub const MIN_COLUMN_WIDTH: usize = 12;

/// Text shown for the trailing "add" item
pub const PLACEHOLDER_TEXT: &str = "+ add";

const MODAL_MAX_WIDTH: usize = 60;
const MODAL_MIN_WIDTH: usize = 24;

/// Everything `render_grid` reads
#[derive(Debug, Clone)]
pub struct GridSnapshot<'a> {
    pub columns: &'a [Column],
    pub rows: &'a [Row],
    pub option_lists: &'a OptionLists,
    pub cursor: GridCursor,
    pub mouse: Option<MousePosition>,
    pub state: InteractionState,
    pub working_copy: Option<&'a WorkingCopy>,
    pub status_message: Option<&'a str>,
    pub in_flight: usize,
    pub terminal_size: (u16, u16),
}

impl<'a> GridSnapshot<'a> {
    pub fn from_view_model(view_model: &'a ViewModel) -> Self {
        Self {
            columns: view_model.columns(),
            rows: view_model.rows(),
            option_lists: view_model.option_lists(),
            cursor: view_model.cursor(),
            mouse: view_model.mouse(),
            state: view_model.state(),
            working_copy: view_model.working_copy(),
            status_message: view_model.status_message(),
            in_flight: view_model.in_flight() + view_model.pending_sync_requests().len(),
            terminal_size: view_model.terminal_size(),
        }
    }
}

/// Horizontal and vertical geometry of one frame
#[derive(Debug, Clone, Copy)]
struct Layout {
    column_width: usize,
    first_column: usize,
    visible_columns: usize,
    body_height: usize,
}

impl Layout {
    fn new(snapshot: &GridSnapshot) -> Self {
        let (width, height) = snapshot.terminal_size;
        let column_count = snapshot.columns.len().max(1);
        let column_width = (width as usize / column_count).max(MIN_COLUMN_WIDTH);
        let visible_columns = (width as usize / column_width).clamp(1, column_count);
        let first_column = if snapshot.cursor.cix < visible_columns {
            0
        } else {
            snapshot.cursor.cix + 1 - visible_columns
        };

        Self {
            column_width,
            first_column,
            visible_columns,
            // Header and status line
            body_height: (height as usize).saturating_sub(2),
        }
    }

    fn visible_column_range(&self, column_count: usize) -> std::ops::Range<usize> {
        self.first_column..(self.first_column + self.visible_columns).min(column_count)
    }
}

/// One display line of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellLine {
    Item(usize),
    /// Collapsed remainder; clicking it selects the first hidden item
    More { hidden: usize, first_hidden: usize },
}

fn cell_lines(column: &Column, row: &Row, expanded: bool) -> Vec<CellLine> {
    let count = row.item_count(&column.name);
    match column.list_limit {
        Some(limit) if !expanded && count > limit => (0..limit)
            .map(CellLine::Item)
            .chain(std::iter::once(CellLine::More {
                hidden: count - limit,
                first_hidden: limit,
            }))
            .collect(),
        _ => (0..count).map(CellLine::Item).collect(),
    }
}

/// Display lines of a row block, without its separator
fn row_height(snapshot: &GridSnapshot, layout: &Layout, rix: usize) -> usize {
    let row = &snapshot.rows[rix];
    let expanded = rix == snapshot.cursor.rix;
    layout
        .visible_column_range(snapshot.columns.len())
        .map(|cix| cell_lines(&snapshot.columns[cix], row, expanded).len())
        .max()
        .unwrap_or(0)
        .max(1)
}

/// First row to draw so that the cursor row ends inside the body
fn first_visible_row(heights: &[usize], cursor_row: usize, body_height: usize) -> usize {
    let mut used = 0;
    let mut start = cursor_row + 1;
    while start > 0 {
        let height = heights[start - 1];
        if used + height > body_height && start - 1 != cursor_row {
            break;
        }
        used += height;
        start -= 1;
    }
    start
}

/// Display text of a record: its field values, synonyms applied
///
/// Test names are prefixed with the category of the option list they came
/// from.
pub fn record_summary(column: &Column, record: &Record, option_lists: &OptionLists) -> String {
    let names: Vec<&str> = if column.fields.is_empty() {
        record
            .keys()
            .map(String::as_str)
            .filter(|key| !RESERVED_FIELDS.contains(key))
            .collect()
    } else {
        column.fields.iter().map(|field| field.name.as_str()).collect()
    };

    names
        .into_iter()
        .filter_map(|name| record.get(name))
        .map(crate::grid::models::value_text)
        .filter(|text| !text.is_empty())
        .map(|text| {
            let display = option_lists.synonym(&text);
            match option_lists.test_category(&text) {
                Some(category) => format!("{category}: {display}"),
                None => display.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" / ")
}

pub fn item_summary(column: &Column, item: &Item, option_lists: &OptionLists) -> String {
    if item.is_placeholder() {
        PLACEHOLDER_TEXT.to_string()
    } else {
        record_summary(column, item.record(), option_lists)
    }
}

fn item_style(snapshot: &GridSnapshot, item: &Item, rix: usize, cix: usize, iix: usize) -> SpanStyle {
    if snapshot.cursor == GridCursor::new(rix, cix, iix) {
        SpanStyle::Selected
    } else if snapshot.mouse == Some(MousePosition::new(rix, cix)) {
        SpanStyle::Hover
    } else if item.is_placeholder() {
        SpanStyle::Placeholder
    } else if item.is_pending() {
        SpanStyle::Pending
    } else {
        SpanStyle::Plain
    }
}

fn render_header(snapshot: &GridSnapshot, layout: &Layout) -> FrameLine {
    let mut line = FrameLine::new();
    for cix in layout.visible_column_range(snapshot.columns.len()) {
        let title = snapshot.columns[cix].title();
        line.push(Span::new(
            fit_width(&title, layout.column_width),
            SpanStyle::Header,
        ));
    }
    line
}

fn render_row_block(
    snapshot: &GridSnapshot,
    layout: &Layout,
    rix: usize,
    top: usize,
    frame: &mut Frame,
) {
    let row = &snapshot.rows[rix];
    let expanded = rix == snapshot.cursor.rix;
    let columns = layout.visible_column_range(snapshot.columns.len());
    let cells: Vec<(usize, Vec<CellLine>)> = columns
        .clone()
        .map(|cix| (cix, cell_lines(&snapshot.columns[cix], row, expanded)))
        .collect();
    let height = row_height(snapshot, layout, rix);
    let text_width = layout.column_width.saturating_sub(1);

    for offset in 0..height {
        let y = top + offset;
        let mut line = FrameLine::new();
        for (position, (cix, lines)) in cells.iter().enumerate() {
            let column = &snapshot.columns[*cix];
            let x = position * layout.column_width;
            let (text, style, iix) = match lines.get(offset) {
                Some(CellLine::Item(iix)) => {
                    let item = &row.items(&column.name)[*iix];
                    let text = item_summary(column, item, snapshot.option_lists);
                    (text, item_style(snapshot, item, rix, *cix, *iix), Some(*iix))
                }
                Some(CellLine::More {
                    hidden,
                    first_hidden,
                }) => (format!("… +{hidden} more"), SpanStyle::Muted, Some(*first_hidden)),
                None => (String::new(), SpanStyle::Plain, None),
            };

            line.push(Span::new(fit_width(&text, text_width), style));
            line.push(Span::plain(" "));
            if let Some(iix) = iix {
                frame.hit_regions.push(HitRegion {
                    y: y as u16,
                    x_start: x as u16,
                    x_end: (x + layout.column_width) as u16,
                    rix,
                    cix: *cix,
                    iix,
                });
            }
        }
        frame.lines.push(line);
    }
}

fn render_status(snapshot: &GridSnapshot, width: usize) -> FrameLine {
    let mut status = format!(
        " {} | {} patients",
        snapshot.state.label(),
        snapshot.rows.len()
    );
    if snapshot.in_flight > 0 {
        status.push_str(&format!(" | syncing {}", snapshot.in_flight));
    }
    if let Some(message) = snapshot.status_message {
        status.push_str(" | ");
        status.push_str(message);
    }

    let mut line = FrameLine::new();
    line.push(Span::new(fit_width(&status, width), SpanStyle::Status));
    line
}

fn modal_column<'a>(snapshot: &GridSnapshot<'a>, working_copy: &WorkingCopy) -> Option<&'a Column> {
    match working_copy.target() {
        ModalTarget::Item { column, .. } => snapshot.columns.iter().find(|c| &c.name == column),
        ModalTarget::NewPatient => None,
    }
}

/// Modal box lines and the focused input's cursor offset (x, line)
fn render_modal(
    snapshot: &GridSnapshot,
    working_copy: &WorkingCopy,
    box_width: usize,
) -> (Vec<(String, SpanStyle)>, Option<(usize, usize)>) {
    let column = modal_column(snapshot, working_copy);
    let column_title = column.map(Column::title).unwrap_or_default();
    let title = match snapshot.state {
        InteractionState::Adding => "Add patient".to_string(),
        InteractionState::Deleting => format!("Delete {column_title}"),
        _ => format!("Edit {column_title}"),
    };

    let inner = box_width.saturating_sub(4);
    let mut content: Vec<(String, SpanStyle)> = Vec::new();
    let mut cursor = None;

    if snapshot.state == InteractionState::Deleting {
        let summary = column
            .map(|c| record_summary(c, working_copy.base(), snapshot.option_lists))
            .unwrap_or_default();
        content.push((format!("Delete \"{summary}\"?"), SpanStyle::Modal));
        content.push((String::new(), SpanStyle::Modal));
        content.push(("enter/y delete   esc/n cancel".to_string(), SpanStyle::Muted));
    } else {
        let label_width = working_copy
            .fields()
            .iter()
            .map(|field| field.label.width())
            .max()
            .unwrap_or(0);
        for (index, field) in working_copy.fields().iter().enumerate() {
            let focused = working_copy.focus() == Some(index);
            let text = format!("{:>label_width$}: {}", field.label, field.value);
            if focused {
                let x = (label_width + 2 + display_width(&field.value)).min(inner);
                cursor = Some((x, content.len()));
            }
            let style = if focused {
                SpanStyle::ModalFocused
            } else {
                SpanStyle::Modal
            };
            content.push((text, style));
        }
        content.push((String::new(), SpanStyle::Modal));
        let hint = if snapshot.state == InteractionState::Editing {
            "enter save  ctrl-n save+next  tab next  → complete  esc cancel"
        } else {
            "enter save  tab next  esc cancel"
        };
        content.push((hint.to_string(), SpanStyle::Muted));
    }

    let mut lines = Vec::with_capacity(content.len() + 2);
    let top_rule = "─".repeat(box_width.saturating_sub(title.width() + 5));
    lines.push((
        fit_width(&format!("┌─ {title} {top_rule}┐"), box_width),
        SpanStyle::ModalTitle,
    ));
    for (text, style) in content {
        lines.push((format!("│ {} │", fit_width(&text, inner)), style));
    }
    lines.push((
        format!("└{}┘", "─".repeat(box_width.saturating_sub(2))),
        SpanStyle::Modal,
    ));

    // Content starts below the title border, after "│ "
    let cursor = cursor.map(|(x, line)| (x + 2, line + 1));
    (lines, cursor)
}

fn overlay_modal(snapshot: &GridSnapshot, working_copy: &WorkingCopy, frame: &mut Frame) {
    let width = frame.width as usize;
    let height = frame.height as usize;
    let box_width = width
        .saturating_sub(4)
        .min(MODAL_MAX_WIDTH)
        .max(MODAL_MIN_WIDTH.min(width));

    let (lines, cursor) = render_modal(snapshot, working_copy, box_width);
    let top = height.saturating_sub(lines.len()) / 2;
    let left = width.saturating_sub(box_width) / 2;

    for (offset, (text, style)) in lines.into_iter().enumerate() {
        let y = top + offset;
        if y >= frame.lines.len() {
            break;
        }
        let mut line = FrameLine::new();
        line.push(Span::plain(" ".repeat(left)));
        line.push(Span::new(text, style));
        let right = width.saturating_sub(left + box_width);
        line.push(Span::plain(" ".repeat(right)));
        frame.lines[y] = line;
        frame.hit_regions.retain(|region| region.y as usize != y);
    }

    frame.cursor = cursor.map(|(x, line)| ((left + x) as u16, (top + line) as u16));
}

/// Render the whole screen
pub fn render_grid(snapshot: &GridSnapshot) -> Frame {
    let (width, height) = snapshot.terminal_size;
    let mut frame = Frame::new(width, height);
    let layout = Layout::new(snapshot);

    frame.lines.push(render_header(snapshot, &layout));

    if snapshot.rows.is_empty() {
        let mut line = FrameLine::new();
        line.push(Span::new(
            fit_width(" No patients. Press n to add one.", width as usize),
            SpanStyle::Muted,
        ));
        frame.lines.push(line);
    } else {
        // Each block is followed by a one-line separator
        let heights: Vec<usize> = (0..snapshot.rows.len())
            .map(|rix| row_height(snapshot, &layout, rix) + 1)
            .collect();
        let cursor_row = snapshot.cursor.rix.min(snapshot.rows.len() - 1);
        let start = first_visible_row(&heights, cursor_row, layout.body_height);
        let body_end = 1 + layout.body_height;

        for rix in start..snapshot.rows.len() {
            let top = frame.lines.len();
            if top >= body_end {
                break;
            }
            render_row_block(snapshot, &layout, rix, top, &mut frame);
            let mut separator = FrameLine::new();
            separator.push(Span::new("─".repeat(width as usize), SpanStyle::Muted));
            frame.lines.push(separator);
        }

        frame.lines.truncate(body_end);
        frame.hit_regions.retain(|region| (region.y as usize) < body_end);
    }

    while frame.lines.len() + 1 < height as usize {
        frame.lines.push(FrameLine::new());
    }
    frame.lines.push(render_status(snapshot, width as usize));

    if let (true, Some(working_copy)) = (snapshot.state.is_modal(), snapshot.working_copy) {
        overlay_modal(snapshot, working_copy, &mut frame);
    }
    frame
}
