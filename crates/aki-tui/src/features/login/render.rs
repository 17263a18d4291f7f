//! Login screen view.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use unicode_width::UnicodeWidthStr;

use super::state::{LoginFocus, LoginState};
use crate::common::{TextField, truncate_start_with_ellipsis};

const LOGO: [&str; 6] = [
    "           _  _______ ",
    "     /\\   | |/ /_   _|",
    "    /  \\  | ' /  | |  ",
    "   / /\\ \\ |  <   | |  ",
    "  / ____ \\| . \\ _| |_ ",
    " /_/    \\_\\_|\\_\\_____|",
];

const FORM_WIDTH: u16 = 40;

pub fn render_login(frame: &mut Frame, state: &LoginState, area: Rect) {
    let [_, logo, _, heading, _, email_label, email, password_label, password, _, button, _, status, _] =
        Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(LOGO.len() as u16),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .areas(area);

    let green = Style::default().fg(Color::Green);
    let logo_lines: Vec<Line> = LOGO.iter().map(|l| Line::styled(*l, green)).collect();
    frame.render_widget(
        Paragraph::new(logo_lines).alignment(Alignment::Center),
        logo,
    );

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("mysql> ", green.add_modifier(Modifier::BOLD)),
            Span::styled("AUTHENTICATION REQUIRED", green),
        ]))
        .alignment(Alignment::Center),
        heading,
    );

    let form_x = |row: Rect| centered(row, FORM_WIDTH);

    frame.render_widget(Paragraph::new(Span::styled("Email:", green)), form_x(email_label));
    render_field(
        frame,
        form_x(email),
        &state.email,
        "Enter your email",
        false,
        state.focus == LoginFocus::Email,
    );

    frame.render_widget(
        Paragraph::new(Span::styled("Password:", green)),
        form_x(password_label),
    );
    render_field(
        frame,
        form_x(password),
        &state.password,
        "Enter your password",
        true,
        state.focus == LoginFocus::Password,
    );

    let button_style = if !state.can_submit() {
        Style::default().fg(Color::DarkGray)
    } else if state.focus == LoginFocus::Submit {
        Style::default()
            .fg(Color::Black)
            .bg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    frame.render_widget(
        Paragraph::new(Span::styled("[ Login ]", button_style)).alignment(Alignment::Center),
        button,
    );

    let status_line = if let Some(error) = &state.error {
        Line::styled(error.as_str(), Style::default().fg(Color::Red))
    } else if state.loading {
        Line::styled("Authenticating...", green)
    } else {
        Line::styled(
            "Tab: next field • Enter: login • Ctrl+C: quit",
            Style::default().fg(Color::DarkGray),
        )
    };
    frame.render_widget(
        Paragraph::new(status_line).alignment(Alignment::Center),
        status,
    );
}

fn centered(row: Rect, width: u16) -> Rect {
    let width = width.min(row.width);
    Rect::new(
        row.x + (row.width.saturating_sub(width)) / 2,
        row.y,
        width,
        row.height,
    )
}

fn render_field(
    frame: &mut Frame,
    area: Rect,
    field: &TextField,
    placeholder: &str,
    masked: bool,
    focused: bool,
) {
    let border = if focused { Color::Green } else { Color::White };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let max_width = inner.width.saturating_sub(1) as usize;
    let line = if field.is_empty() {
        Line::styled(placeholder, Style::default().fg(Color::DarkGray))
    } else {
        Line::styled(
            truncate_start_with_ellipsis(&field.display(masked), max_width),
            Style::default().fg(Color::White),
        )
    };
    frame.render_widget(Paragraph::new(line), inner);

    if focused {
        let before = field.display_before_cursor(masked).width() as u16;
        let x = inner.x + before.min(inner.width.saturating_sub(1));
        frame.set_cursor_position(Position::new(x, inner.y));
    }
}
