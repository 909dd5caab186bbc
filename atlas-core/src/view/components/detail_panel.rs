//! ``src/view/components/detail_panel.rs``
//! ============================================================================
//! # DetailPanel: one country, top to bottom
//!
//! Headings and fields take a row each. Consecutive links share a row and
//! wrap like tags, which is how the border countries read.

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::view::{
    theme::Palette,
    tree::{Activation, ViewContainer, ViewNode, ViewStatus},
};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Cell {
    text: String,
    style: Style,
    /// Target index and activation for links.
    target: Option<(usize, Activation)>,
}

type Row = Vec<Cell>;

pub struct DetailPanel;

impl DetailPanel {
    pub fn render(
        frame: &mut Frame<'_>,
        view: &ViewContainer,
        palette: &Palette,
        area: Rect,
    ) -> Vec<(Rect, Activation)> {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(palette.border())
            .style(palette.base());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if view.status().is_loading() {
            frame.render_widget(
                Paragraph::new("Loading country…")
                    .style(palette.dim())
                    .alignment(Alignment::Center),
                Rect {
                    y: inner.y + inner.height / 2,
                    height: 1.min(inner.height),
                    ..inner
                },
            );
            return Vec::new();
        }

        let mut rows = layout_rows(view, palette, inner.width);
        if let ViewStatus::Failed(message) = view.status() {
            let at = rows.len().min(1);
            rows.insert(at, Vec::new());
            rows.insert(
                at + 1,
                vec![Cell {
                    text: message.clone(),
                    style: palette.label().fg(palette.error),
                    target: None,
                }],
            );
        }

        let focused_row = rows
            .iter()
            .position(|row| {
                row.iter()
                    .any(|cell| matches!(&cell.target, Some((i, _)) if *i == view.focus()))
            })
            .unwrap_or(0);
        let offset = focused_row.saturating_sub(usize::from(inner.height.saturating_sub(1)));

        let mut hits = Vec::new();
        for (line, row) in rows.iter().skip(offset).enumerate() {
            if line >= usize::from(inner.height) {
                break;
            }
            let y = inner.y + line as u16;
            let mut x = inner.x;

            for cell in row {
                let width =
                    (cell.text.chars().count() as u16).min(inner.right().saturating_sub(x));
                if width == 0 {
                    break;
                }
                let rect = Rect {
                    x,
                    y,
                    width,
                    height: 1,
                };
                let style = match &cell.target {
                    Some((index, _)) if *index == view.focus() => palette.focused_border(),
                    _ => cell.style,
                };
                let text = Line::from(Span::styled(cell.text.as_str(), style));
                frame.render_widget(Paragraph::new(text), rect);
                if let Some((_, activation)) = &cell.target {
                    hits.push((rect, activation.clone()));
                }
                x = x.saturating_add(width + 1);
            }
        }
        hits
    }
}

fn layout_rows(view: &ViewContainer, palette: &Palette, width: u16) -> Vec<Row> {
    let mut rows: Vec<Row> = Vec::new();
    let mut target = 0;
    let mut in_links = false;

    for node in view.nodes() {
        match node {
            ViewNode::Heading(text) => {
                if !rows.is_empty() {
                    rows.push(Vec::new());
                }
                rows.push(vec![Cell {
                    text: text.clone(),
                    style: palette.title(),
                    target: None,
                }]);
                in_links = false;
            }
            ViewNode::Field { label, value } => {
                rows.push(vec![
                    Cell {
                        text: format!("{label}:"),
                        style: palette.label(),
                        target: None,
                    },
                    Cell {
                        text: value.clone(),
                        style: palette.base(),
                        target: None,
                    },
                ]);
                in_links = false;
            }
            ViewNode::Link { label, activation } => {
                let cell = Cell {
                    text: format!("[ {label} ]"),
                    style: palette.selection(),
                    target: Some((target, activation.clone())),
                };
                target += 1;

                let fits = rows.last().is_some_and(|row| {
                    let used: usize = row.iter().map(|c| c.text.chars().count() + 1).sum();
                    used + cell.text.chars().count() <= usize::from(width)
                });
                match rows.last_mut() {
                    Some(row) if in_links && fits => row.push(cell),
                    _ => rows.push(vec![cell]),
                }
                in_links = true;
            }
            // Cards only appear on Home.
            ViewNode::Card(_) => {}
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::country::CountryCode, view::theme::MOCHA};

    fn link(code: &str) -> ViewNode {
        ViewNode::link(code, Activation::ShowCountry(CountryCode::from(code)))
    }

    #[test]
    fn test_links_share_rows_until_full() {
        let mut view = ViewContainer::default();
        view.replace(
            ViewStatus::Ready,
            vec![
                ViewNode::link("← Back", Activation::GoHome),
                ViewNode::Heading("Border Countries".into()),
                link("FRA"),
                link("DEU"),
                link("ITA"),
            ],
        );

        // "[ FRA ]" is 7 wide, two fit in 16 columns
        let rows = layout_rows(&view, &MOCHA, 16);
        let sizes: Vec<usize> = rows.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![1, 0, 1, 2, 1]);
    }
}
