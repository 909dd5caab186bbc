//! ``src/view/components/input_prompt_overlay.rs``
//! ============================================================================
//! # InputPromptOverlay: go-to-path prompt

use ratatui::{
    Frame,
    layout::{Alignment, Position, Rect},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::{
    model::ui_state::TextInput,
    view::{theme::Palette, ui::centered_rect},
};

pub struct InputPromptOverlay;

impl InputPromptOverlay {
    #[allow(clippy::cast_possible_truncation)]
    pub fn render(frame: &mut Frame<'_>, input: &TextInput, palette: &Palette, area: Rect) {
        let mut overlay_area = centered_rect(50, 10, area);
        overlay_area.height = overlay_area.height.max(3).min(area.height);
        frame.render_widget(Clear, overlay_area);

        let input_block = Block::default()
            .borders(Borders::ALL)
            .title(" Go to ")
            .title_alignment(Alignment::Center)
            .border_style(palette.focused_border())
            .style(palette.base());

        frame.render_widget(
            Paragraph::new(input.as_str())
                .block(input_block)
                .style(palette.base()),
            overlay_area,
        );

        frame.set_cursor_position(Position::new(
            overlay_area.x + input.cursor_column() as u16 + 1,
            overlay_area.y + 1,
        ));

        let help_area = Rect {
            x: overlay_area.x,
            y: overlay_area.y + overlay_area.height,
            width: overlay_area.width,
            height: 1,
        };
        if help_area.bottom() <= area.bottom() {
            frame.render_widget(
                Paragraph::new("Path like /BEL • Enter to go • Esc to cancel")
                    .style(palette.dim())
                    .alignment(Alignment::Center),
                help_area,
            );
        }
    }
}
