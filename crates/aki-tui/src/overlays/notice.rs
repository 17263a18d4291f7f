//! Modal notice (e.g. a failed logout). Dismissed with Enter or Esc.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Paragraph, Wrap};

use super::OverlayUpdate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeState {
    pub message: String,
}

impl NoticeState {
    pub fn open(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        use super::render_utils::{InputHint, OverlayConfig, render_overlay};

        let hints = [InputHint::new("Enter", "dismiss")];
        let layout = render_overlay(
            frame,
            area,
            &OverlayConfig {
                title: "Notice",
                border_color: Color::Red,
                width: 44,
                height: 6,
                hints: &hints,
            },
        );
        frame.render_widget(
            Paragraph::new(self.message.as_str())
                .style(Style::default().fg(Color::White))
                .wrap(Wrap { trim: true }),
            layout.body,
        );
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> OverlayUpdate {
        match key.code {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => OverlayUpdate::close(),
            _ => OverlayUpdate::stay(),
        }
    }
}
