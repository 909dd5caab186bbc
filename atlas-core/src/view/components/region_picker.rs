//! Region picker overlay
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
};

use crate::{
    model::country::Region,
    view::{theme::Palette, tree::Activation, ui::centered_rect},
};

pub struct RegionPicker;

impl RegionPicker {
    /// Paints the picker and returns one click target per region row.
    pub fn render(
        frame: &mut Frame<'_>,
        selected: Region,
        cursor: usize,
        palette: &Palette,
        area: Rect,
    ) -> Vec<(Rect, Activation)> {
        let mut overlay_area = centered_rect(30, 40, area);
        // one row per region plus borders
        overlay_area.height = (Region::ALL.len() as u16 + 2).min(area.height);
        frame.render_widget(Clear, overlay_area);

        let items: Vec<ListItem<'_>> = Region::ALL
            .iter()
            .map(|region| {
                let marker = if *region == selected { "● " } else { "  " };
                let name = if *region == Region::All {
                    "All regions"
                } else {
                    region.as_str()
                };
                ListItem::new(format!("{marker}{name}"))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Filter by Region ")
                    .title_alignment(Alignment::Center)
                    .border_style(palette.focused_border())
                    .style(palette.base()),
            )
            .highlight_style(palette.selection().fg(palette.highlight));

        let mut state = ListState::default().with_selected(Some(cursor));
        frame.render_stateful_widget(list, overlay_area, &mut state);

        // Rows only line up with regions when the list is not scrolled.
        let rows = overlay_area.height.saturating_sub(2);
        if usize::from(rows) < Region::ALL.len() || overlay_area.width < 3 {
            return Vec::new();
        }
        Region::ALL
            .iter()
            .enumerate()
            .map(|(i, region)| {
                let row = Rect {
                    x: overlay_area.x + 1,
                    y: overlay_area.y + 1 + i as u16,
                    width: overlay_area.width - 2,
                    height: 1,
                };
                (row, Activation::PickRegion(*region))
            })
            .collect()
    }
}
