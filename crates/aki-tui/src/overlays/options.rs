//! Options menu (Ctrl+O / F2 on the query screen).

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{List, ListItem, ListState};

use super::{OverlayRequest, OverlayUpdate};
use crate::effects::UiEffect;

/// Notice shown when "Add New Data" has no page to open.
pub const ADD_DATA_UNAVAILABLE: &str = "Add-data page is not configured";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsItem {
    AddNewData,
    Logout,
}

impl OptionsItem {
    pub const ALL: [OptionsItem; 2] = [OptionsItem::AddNewData, OptionsItem::Logout];

    pub fn label(self) -> &'static str {
        match self {
            OptionsItem::AddNewData => "Add New Data",
            OptionsItem::Logout => "Logout",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OptionsState {
    pub selected: usize,
}

impl OptionsState {
    pub fn open() -> Self {
        Self::default()
    }

    pub fn selected_item(&self) -> OptionsItem {
        OptionsItem::ALL[self.selected.min(OptionsItem::ALL.len() - 1)]
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        render_options(frame, self, area);
    }

    pub fn handle_key(&mut self, key: KeyEvent, add_data_url: Option<&str>) -> OverlayUpdate {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc | KeyCode::F(2) => OverlayUpdate::close(),
            KeyCode::Char('o') if ctrl => OverlayUpdate::close(),
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                OverlayUpdate::stay()
            }
            KeyCode::Down => {
                if self.selected + 1 < OptionsItem::ALL.len() {
                    self.selected += 1;
                }
                OverlayUpdate::stay()
            }
            KeyCode::Enter => match self.selected_item() {
                OptionsItem::AddNewData => match add_data_url {
                    Some(url) => OverlayUpdate::close().with_ui_effects(vec![
                        UiEffect::OpenBrowser {
                            url: url.to_string(),
                        },
                    ]),
                    None => OverlayUpdate::open(OverlayRequest::Notice(
                        ADD_DATA_UNAVAILABLE.to_string(),
                    )),
                },
                OptionsItem::Logout => {
                    OverlayUpdate::close().with_ui_effects(vec![UiEffect::Logout])
                }
            },
            _ => OverlayUpdate::stay(),
        }
    }
}

fn render_options(frame: &mut Frame, state: &OptionsState, area: Rect) {
    use super::render_utils::{InputHint, OverlayConfig, render_overlay};

    let hints = [InputHint::new("Enter", "select"), InputHint::new("Esc", "close")];
    let layout = render_overlay(
        frame,
        area,
        &OverlayConfig {
            title: "Options",
            border_color: Color::Cyan,
            width: 32,
            height: OptionsItem::ALL.len() as u16 + 3,
            hints: &hints,
        },
    );

    let items: Vec<ListItem> = OptionsItem::ALL
        .iter()
        .map(|item| ListItem::new(item.label()))
        .collect();
    let list = List::new(items)
        .highlight_style(
            Style::default()
                .bg(Color::Cyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    let mut list_state = ListState::default();
    list_state.select(Some(state.selected));
    frame.render_stateful_widget(list, layout.body, &mut list_state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlays::OverlayTransition;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_add_new_data_opens_browser() {
        let mut state = OptionsState::open();
        let update = state.handle_key(key(KeyCode::Enter), Some("https://example.com/add"));

        assert!(matches!(update.transition, OverlayTransition::Close));
        assert!(matches!(
            update.effects.as_slice(),
            [UiEffect::OpenBrowser { url }] if url == "https://example.com/add"
        ));
    }

    #[test]
    fn test_add_new_data_without_url_shows_notice() {
        let mut state = OptionsState::open();
        let update = state.handle_key(key(KeyCode::Enter), None);

        assert!(matches!(
            update.transition,
            OverlayTransition::Open(OverlayRequest::Notice(ref m)) if m == ADD_DATA_UNAVAILABLE
        ));
    }

    #[test]
    fn test_logout_item() {
        let mut state = OptionsState::open();
        state.handle_key(key(KeyCode::Down), None);
        state.handle_key(key(KeyCode::Down), None);
        assert_eq!(state.selected_item(), OptionsItem::Logout);

        let update = state.handle_key(key(KeyCode::Enter), None);

        assert!(matches!(update.transition, OverlayTransition::Close));
        assert!(matches!(update.effects.as_slice(), [UiEffect::Logout]));
    }

    #[test]
    fn test_toggle_keys_close() {
        let mut state = OptionsState::open();
        let update = state.handle_key(KeyEvent::new(KeyCode::Char('o'), KeyModifiers::CONTROL), None);
        assert!(matches!(update.transition, OverlayTransition::Close));
        let update = state.handle_key(key(KeyCode::F(2)), None);
        assert!(matches!(update.transition, OverlayTransition::Close));
    }
}
