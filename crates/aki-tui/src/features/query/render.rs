//! Query screen view.

use aki_core::records::Record;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use unicode_width::UnicodeWidthStr;

use super::state::{NO_DATA_MESSAGE, QueryState};
use crate::common::{sanitize_for_display, truncate_start_with_ellipsis, truncate_with_ellipsis};

pub const TITLE: &str = "MySQL Terminal - Secure Database Access";
const OPTIONS_LABEL: &str = "[Options]";
const INPUT_WIDTH: u16 = 30;

/// Everything the query screen shows besides its own state.
pub struct QueryView<'a> {
    pub state: &'a QueryState,
    pub collection: &'a str,
    pub signed_in_as: Option<&'a str>,
    /// Cursor is only placed when no overlay has focus.
    pub focused: bool,
}

pub fn render_query(frame: &mut Frame, view: &QueryView<'_>, area: Rect) {
    let [title, prompt, loading, table, message, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    render_title(frame, title);
    render_prompt(frame, view, prompt);

    if view.state.loading {
        frame.render_widget(
            Paragraph::new(Span::styled("Loading...", Style::default().fg(Color::Green))),
            loading,
        );
    }

    if let Some(records) = view.state.results.as_ref().filter(|r| !r.is_empty()) {
        render_table(frame, records, view.state.scroll, table);
    }

    let message_line = if let Some(error) = &view.state.error {
        Some(Line::styled(error.as_str(), Style::default().fg(Color::Red)))
    } else if view.state.results.as_ref().is_some_and(Vec::is_empty) {
        Some(Line::styled(NO_DATA_MESSAGE, Style::default().fg(Color::Yellow)))
    } else {
        None
    };
    if let Some(line) = message_line {
        frame.render_widget(Paragraph::new(line), message);
    }

    render_footer(frame, view, footer);
}

fn render_title(frame: &mut Frame, area: Rect) {
    let bar = Style::default().bg(Color::DarkGray).fg(Color::Gray);
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(" ● ", bar.fg(Color::Green)),
            Span::styled(TITLE, bar),
        ]))
        .style(bar),
        area,
    );
}

fn render_prompt(frame: &mut Frame, view: &QueryView<'_>, area: Rect) {
    let prompt_text = format!(
        "SELECT * FROM {} WHERE username = ",
        sanitize_for_display(view.collection)
    );
    let prompt_width = ("mysql> ".width() + prompt_text.width()) as u16;
    let options_width = OPTIONS_LABEL.width() as u16;

    let text_row = Rect::new(area.x, area.y + 1, area.width, 1);
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                "mysql> ",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(prompt_text, Style::default().fg(Color::White)),
        ])),
        text_row,
    );

    let input_x = area.x + prompt_width;
    let available = area
        .width
        .saturating_sub(prompt_width + options_width + 2);
    let input_area = Rect::new(input_x, area.y, INPUT_WIDTH.min(available), 3);
    if input_area.width >= 3 {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White));
        let inner = block.inner(input_area);
        frame.render_widget(block, input_area);

        let field = &view.state.username;
        let line = if field.is_empty() {
            Line::styled("Enter username", Style::default().fg(Color::DarkGray))
        } else {
            Line::styled(
                truncate_start_with_ellipsis(field.value(), inner.width.saturating_sub(1) as usize),
                Style::default().fg(Color::White),
            )
        };
        frame.render_widget(Paragraph::new(line), inner);

        if view.focused {
            let before = field.display_before_cursor(false).width() as u16;
            let x = inner.x + before.min(inner.width.saturating_sub(1));
            frame.set_cursor_position(Position::new(x, inner.y));
        }
    }

    let options_area = Rect::new(
        area.x + area.width.saturating_sub(options_width),
        text_row.y,
        options_width.min(area.width),
        1,
    );
    frame.render_widget(
        Paragraph::new(Span::styled(
            OPTIONS_LABEL,
            Style::default().fg(Color::Cyan),
        )),
        options_area,
    );
}

fn render_table(frame: &mut Frame, records: &[Record], scroll: usize, area: Rect) {
    let header = Row::new(
        Record::HEADERS
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD))),
    )
    .style(Style::default().fg(Color::Green));

    // Borders take two columns, spacing one between each pair
    let column_width = (area.width.saturating_sub(2 + 5) / 6) as usize;
    let rows = records.iter().skip(scroll).map(|record| {
        Row::new(record.cells().into_iter().map(|cell| {
            Cell::from(truncate_with_ellipsis(
                &sanitize_for_display(cell),
                column_width,
            ))
        }))
    });

    let widths = [Constraint::Ratio(1, 6); 6];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White)),
        );
    frame.render_widget(table, area);
}

fn render_footer(frame: &mut Frame, view: &QueryView<'_>, area: Rect) {
    let mut spans = vec![Span::styled(
        "Enter: execute • Ctrl+O/F2: options • ↑↓: scroll • Ctrl+C: quit",
        Style::default().fg(Color::DarkGray),
    )];
    if let Some(who) = view.signed_in_as {
        spans.push(Span::styled("  │  ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(
            sanitize_for_display(who),
            Style::default().fg(Color::Green),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
