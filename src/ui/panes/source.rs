//! Source pane rendering with instruction highlighting
//!
//! Shows the program with instructions colored by kind, comments dimmed, and
//! the character under the program counter highlighted. The pane scrolls to
//! keep the current line in view.

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn instruction_style(c: char) -> Style {
    match c {
        '[' | ']' => Style::default().fg(DEFAULT_THEME.loop_bracket),
        ',' | '.' | ':' => Style::default().fg(DEFAULT_THEME.io),
        '+' | '-' | '<' | '>' => Style::default().fg(DEFAULT_THEME.arithmetic),
        '@' => Style::default()
            .fg(DEFAULT_THEME.error)
            .add_modifier(Modifier::BOLD),
        _ => Style::default().fg(DEFAULT_THEME.comment),
    }
}

/// Lines of `source` without their line terminators
pub(crate) fn source_lines(source: &str) -> impl Iterator<Item = &str> {
    source
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Line and column of the character at `index`
pub(crate) fn locate(source: &str, index: usize) -> (usize, usize) {
    let mut line = 0;
    let mut col = 0;
    for (i, c) in source.chars().enumerate() {
        if i == index {
            break;
        }
        if c == '\n' {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
    }
    (line, col)
}

/// Render the source pane
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    source: &str,
    prog_ptr: usize,
    instruction_count: usize,
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
        .title(format!(
            " Program (pc {}, {} instructions) ",
            prog_ptr, instruction_count
        ))
        .borders(Borders::ALL)
        .border_style(border_style);

    let (current_line, current_col) = locate(source, prog_ptr);
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    // Keep the current line inside the window
    if current_line < *scroll_offset {
        *scroll_offset = current_line;
    } else if current_line >= *scroll_offset + visible_height {
        *scroll_offset = current_line + 1 - visible_height;
    }

    let lines: Vec<Line> = source_lines(source)
        .enumerate()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|(line_no, text)| {
            let gutter = Span::styled(
                format!("{:>4} ", line_no + 1),
                Style::default().fg(DEFAULT_THEME.comment),
            );
            let mut spans = vec![gutter];
            for (col, c) in text.chars().enumerate() {
                let mut style = instruction_style(c);
                if line_no == current_line && col == current_col {
                    style = style
                        .bg(DEFAULT_THEME.cursor_bg)
                        .fg(Color::Black)
                        .add_modifier(Modifier::BOLD);
                }
                spans.push(Span::styled(c.to_string(), style));
            }
            let line = Line::from(spans);
            if line_no == current_line {
                line.style(Style::default().bg(DEFAULT_THEME.current_line_bg))
            } else {
                line
            }
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
