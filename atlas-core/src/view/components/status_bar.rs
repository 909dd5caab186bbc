//! src/view/components/status_bar.rs
//!
//! Bottom line: input mode and current path on the left, key hints on the
//! right.

use ratatui::{
    prelude::*,
    widgets::{Paragraph, Widget},
};

use crate::{
    controller::app_controller::AppController,
    model::ui_state::UIMode,
    view::tree::ViewKind,
};

pub struct StatusBar;

impl StatusBar {
    pub fn render(frame: &mut Frame<'_>, app: &AppController, area: Rect) {
        let palette = app.theme().palette();

        let mode_str = match app.ui().mode {
            UIMode::Browse => "BROWSE",
            UIMode::Search => "SEARCH",
            UIMode::Prompt => "GO TO",
        };
        let left_text = format!(" {mode_str} │ {}", app.current_path());

        let hints = match (app.ui().mode, app.surface().visible()) {
            (UIMode::Search, _) => "Enter/Esc done • Ctrl+U clear",
            (UIMode::Prompt, _) => "Enter go • Esc cancel",
            (UIMode::Browse, ViewKind::Home) => "/ search • r region • : go to • ? help • q quit",
            (UIMode::Browse, ViewKind::Detail) => "Esc back • b/f history • ? help • q quit",
        };
        let right_text = format!("{hints} ");

        let [left, right] =
            Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)])
                .areas(area);

        Paragraph::new(left_text)
            .style(palette.status_bar())
            .alignment(Alignment::Left)
            .render(left, frame.buffer_mut());

        Paragraph::new(right_text)
            .style(palette.status_bar())
            .alignment(Alignment::Right)
            .render(right, frame.buffer_mut());
    }
}
