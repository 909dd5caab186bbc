//! Key binding reference, grouped by where the keys apply
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::view::{theme::Palette, ui::centered_rect};

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Browsing",
        &[
            ("←↑↓→ Tab", "Move between cards and links"),
            ("Enter Space", "Open the focused country"),
            ("Click", "Open a card or border country, pick a region, or switch theme"),
            ("Esc", "Dismiss message, close overlay, or go back to the list"),
        ],
    ),
    (
        "Filtering",
        &[
            ("/", "Search by name (Enter or Esc to leave)"),
            ("Ctrl+U", "Clear the search box"),
            ("r", "Pick a region"),
        ],
    ),
    (
        "Navigation",
        &[
            (":", "Go to a path, e.g. /BEL"),
            ("g", "Go to the country list"),
            ("b Alt+←", "History back"),
            ("f Alt+→", "History forward"),
            ("F5", "Reload the country list"),
        ],
    ),
    (
        "Application",
        &[
            ("t", "Toggle light/dark theme"),
            ("? h", "Toggle this help"),
            ("q Ctrl+C", "Quit"),
        ],
    ),
];

pub struct HelpOverlay;

impl HelpOverlay {
    pub fn render(frame: &mut Frame<'_>, palette: &Palette, area: Rect) {
        let overlay_area = centered_rect(70, 80, area);
        frame.render_widget(Clear, overlay_area);

        let mut lines = Vec::new();
        for (title, keys) in SECTIONS {
            lines.push(Line::from(Span::styled(*title, palette.title())));
            for (key, description) in *keys {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {key:<14}"), palette.label().fg(palette.warning)),
                    Span::styled(*description, palette.base()),
                ]));
            }
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            "Press ? or Esc to close",
            palette.dim(),
        )));

        let help = Paragraph::new(Text::from(lines))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Help ")
                    .title_alignment(Alignment::Center)
                    .border_style(palette.focused_border())
                    .style(palette.base()),
            )
            .wrap(Wrap { trim: false });

        frame.render_widget(help, overlay_area);
    }
}
