//! src/view/components/notification_overlay.rs
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use tracing::trace;

use crate::{
    model::ui_state::{Notification, NotificationLevel},
    view::theme::Palette,
};

pub struct NotificationOverlay;

impl NotificationOverlay {
    /// Banner area at the top of `screen`; errors get an extra line.
    pub fn area(screen: Rect, level: NotificationLevel) -> Rect {
        let height = if level == NotificationLevel::Error { 5 } else { 4 };
        let width = (screen.width * 60 / 100).max(20).min(screen.width);
        Rect {
            x: screen.x + (screen.width - width) / 2,
            y: screen.y + 1,
            width,
            height,
        }
        .intersection(screen)
    }

    pub fn render(
        frame: &mut Frame<'_>,
        notification: &Notification,
        palette: &Palette,
        area: Rect,
    ) {
        trace!(level = ?notification.level, "Rendering notification");
        frame.render_widget(Clear, area);

        let (color, title, icon) = match notification.level {
            NotificationLevel::Info => (palette.accent, "Info", "ℹ"),
            NotificationLevel::Warning => (palette.warning, "Warning", "⚠"),
            NotificationLevel::Error => (palette.error, "Error", "✕"),
            NotificationLevel::Success => (palette.success, "Success", "✓"),
        };
        let border_style = Style::default().fg(color);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {icon} {title} "))
            .title_style(border_style.bold())
            .border_style(border_style)
            .style(palette.base());

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [message_area, dismiss_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(inner);

        frame.render_widget(
            Paragraph::new(notification.message.as_str())
                .style(palette.base())
                .wrap(Wrap { trim: true }),
            message_area,
        );

        let dismiss_text = if notification.auto_dismiss_ms.is_some() {
            "Auto-dismissing... Press any key to dismiss"
        } else {
            "Press any key to dismiss"
        };
        frame.render_widget(
            Paragraph::new(dismiss_text)
                .style(palette.dim().add_modifier(Modifier::ITALIC))
                .alignment(Alignment::Center),
            dismiss_area,
        );
    }
}
