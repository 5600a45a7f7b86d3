//! Tape pane rendering
//!
//! Cells are shown as a hex dump, sixteen to a row, with the cell under the
//! data pointer highlighted. The pane scrolls to keep the pointer's row in
//! view.

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub const CELLS_PER_ROW: usize = 16;

/// Render the tape pane
pub fn render_tape_pane(
    frame: &mut Frame,
    area: Rect,
    tape: &[u8],
    data_ptr: usize,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(format!(" Tape (ptr {} / {} cells) ", data_ptr, tape.len()))
        .borders(Borders::ALL)
        .border_style(border_style);

    if tape.is_empty() {
        let paragraph = Paragraph::new("(not started)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let total_rows = tape.len().div_ceil(CELLS_PER_ROW);
    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    let pointer_row = data_ptr / CELLS_PER_ROW;

    if pointer_row < *scroll_offset {
        *scroll_offset = pointer_row;
    } else if pointer_row >= *scroll_offset + visible_height {
        *scroll_offset = pointer_row + 1 - visible_height;
    }
    *scroll_offset = (*scroll_offset).min(total_rows.saturating_sub(1));

    let lines: Vec<Line> = tape
        .chunks(CELLS_PER_ROW)
        .enumerate()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|(row, cells)| {
            let base = row * CELLS_PER_ROW;
            let mut spans = vec![Span::styled(
                format!("{:06x} ", base),
                Style::default().fg(DEFAULT_THEME.comment),
            )];
            for (i, &cell) in cells.iter().enumerate() {
                let style = if base + i == data_ptr {
                    Style::default()
                        .bg(DEFAULT_THEME.pointer_bg)
                        .fg(Color::Black)
                        .add_modifier(Modifier::BOLD)
                } else if cell != 0 {
                    Style::default().fg(DEFAULT_THEME.nonzero_cell)
                } else {
                    Style::default().fg(DEFAULT_THEME.comment)
                };
                spans.push(Span::styled(format!("{:02x}", cell), style));
                spans.push(Span::raw(" "));
            }
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
