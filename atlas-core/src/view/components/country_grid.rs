//! ``src/view/components/country_grid.rs``
//! ============================================================================
//! # CountryGrid: the Home card grid
//!
//! Paints the Home container as fixed-size cards, scrolled so the focused
//! card stays on screen, and reports where each card landed so clicks can
//! be mapped back to an activation.

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::{
    util::humanize::truncate,
    view::{
        home::clamp_card_width,
        theme::Palette,
        tree::{Activation, ViewContainer, ViewNode, ViewStatus},
    },
};

/// Border plus title, population, region and capital.
pub const CARD_HEIGHT: u16 = 6;

pub struct CountryGrid {
    card_width: u16,
    columns: usize,
}

impl CountryGrid {
    pub fn new(card_width: u16, columns: usize) -> Self {
        Self {
            card_width: clamp_card_width(card_width),
            columns: columns.max(1),
        }
    }

    /// First grid row to paint so that `focus` is visible.
    pub fn first_row(&self, focus: usize, visible_rows: usize) -> usize {
        let focus_row = focus / self.columns;
        focus_row.saturating_sub(visible_rows.saturating_sub(1))
    }

    pub fn render(
        &self,
        frame: &mut Frame<'_>,
        view: &ViewContainer,
        palette: &Palette,
        area: Rect,
    ) -> Vec<(Rect, Activation)> {
        match view.status() {
            ViewStatus::Ready => self.render_cards(frame, view, palette, area),
            ViewStatus::Loading => {
                render_message(frame, area, "Loading countries…", palette.dim());
                Vec::new()
            }
            ViewStatus::Empty => {
                render_message(
                    frame,
                    area,
                    "No countries match your search.",
                    palette.dim(),
                );
                Vec::new()
            }
            ViewStatus::Failed(message) => {
                render_message(
                    frame,
                    area,
                    &format!("{message}  (F5 to retry)"),
                    palette.label().fg(palette.error),
                );
                Vec::new()
            }
            ViewStatus::Idle => Vec::new(),
        }
    }

    fn render_cards(
        &self,
        frame: &mut Frame<'_>,
        view: &ViewContainer,
        palette: &Palette,
        area: Rect,
    ) -> Vec<(Rect, Activation)> {
        let visible_rows = usize::from((area.height / CARD_HEIGHT).max(1));
        let first_row = self.first_row(view.focus(), visible_rows);
        let width = self.card_width.min(area.width);
        let mut hits = Vec::new();

        for (index, node) in view.targets().enumerate() {
            let ViewNode::Card(card) = node else {
                continue;
            };
            let row = index / self.columns;
            if row < first_row {
                continue;
            }
            if row >= first_row + visible_rows {
                break;
            }

            let column = (index % self.columns) as u16;
            let rect = Rect {
                x: area.x + column * width,
                y: area.y + (row - first_row) as u16 * CARD_HEIGHT,
                width,
                height: CARD_HEIGHT,
            }
            .intersection(area);
            if rect.is_empty() {
                continue;
            }

            let focused = index == view.focus();
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(if focused {
                    BorderType::Thick
                } else {
                    BorderType::Rounded
                })
                .border_style(if focused {
                    palette.focused_border()
                } else {
                    palette.border()
                });

            let inner = usize::from(width.saturating_sub(2));
            let title = truncate(&format!("{} {}", card.flag, card.name), inner);
            let lines = vec![
                Line::from(Span::styled(title, palette.title())),
                field_line("Population", &card.population, inner, palette),
                field_line("Region", &card.region, inner, palette),
                field_line("Capital", &card.capital, inner, palette),
            ];

            frame.render_widget(
                Paragraph::new(lines).block(block).style(palette.base()),
                rect,
            );
            if let Some(activation) = node.activation() {
                hits.push((rect, activation));
            }
        }

        hits
    }
}

fn field_line<'a>(label: &'a str, value: &str, width: usize, palette: &Palette) -> Line<'a> {
    let value = truncate(value, width.saturating_sub(label.len() + 2));
    Line::from(vec![
        Span::styled(label, palette.label()),
        Span::styled(": ", palette.label()),
        Span::styled(value, palette.dim()),
    ])
}

fn render_message(frame: &mut Frame<'_>, area: Rect, text: &str, style: ratatui::style::Style) {
    let y = area.y + area.height / 2;
    let line = Rect {
        x: area.x,
        y,
        width: area.width,
        height: 1,
    }
    .intersection(area);
    frame.render_widget(
        Paragraph::new(text.to_string())
            .style(style)
            .alignment(Alignment::Center),
        line,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_row_keeps_focus_visible() {
        let grid = CountryGrid::new(32, 3);
        assert_eq!(grid.first_row(0, 4), 0);
        assert_eq!(grid.first_row(11, 4), 0);
        // row 4 needs the window to start at row 1
        assert_eq!(grid.first_row(12, 4), 1);
        assert_eq!(grid.first_row(30, 1), 10);
    }
}
