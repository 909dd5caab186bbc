//! src/view/ui.rs
//! ============================================================
//! Frame renderer. Reads the controller's session, UI state and
//! surface and paints one frame; never mutates application state.
//! Every painted activation target is remembered so a mouse click
//! can be mapped back to what it would activate.

use std::time::{Duration, Instant};

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use tracing::{instrument, trace};

use crate::{
    controller::app_controller::AppController,
    model::ui_state::{UIMode, UIOverlay},
    view::{
        components::{
            country_grid::CountryGrid, detail_panel::DetailPanel, help_overlay::HelpOverlay,
            input_prompt_overlay::InputPromptOverlay, notification_overlay::NotificationOverlay,
            region_picker::RegionPicker, status_bar::StatusBar,
        },
        tree::{Activation, ViewKind},
    },
};

const APP_TITLE: &str = " Where in the world?";

pub struct UIRenderer {
    cache: LayoutCache,
    hits: Vec<(Rect, Activation)>,
    stats: RenderStats,
}

#[derive(Default)]
struct LayoutCache {
    screen: Rect,
    home: Option<Areas>,
    detail: Option<Areas>,
    hit: u64,
    miss: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Areas {
    header: Rect,
    controls: Rect,
    body: Rect,
    status: Rect,
}

#[derive(Debug, Default)]
pub struct RenderStats {
    pub frames: u64,
    pub slow: u64,
    pub total: Duration,
}

impl Default for UIRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl UIRenderer {
    pub fn new() -> Self {
        Self {
            cache: LayoutCache::default(),
            hits: Vec::new(),
            stats: RenderStats::default(),
        }
    }

    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    /// Activation painted under a terminal cell in the last frame.
    pub fn hit_test(&self, column: u16, row: u16) -> Option<Activation> {
        let cell = Position::new(column, row);
        self.hits
            .iter()
            .rev()
            .find(|(rect, _)| rect.contains(cell))
            .map(|(_, activation)| activation.clone())
    }

    #[instrument(level = "trace", skip_all)]
    pub fn render(&mut self, f: &mut Frame<'_>, app: &AppController) {
        let start = Instant::now();
        let screen = f.area();
        let palette = app.theme().palette();
        let kind = app.surface().visible();
        let areas = self.layout(screen, kind);

        f.render_widget(Block::default().style(palette.base()), screen);
        self.hits.clear();

        self.draw_header(f, app, areas.header);
        match kind {
            ViewKind::Home => {
                self.draw_controls(f, app, areas.controls);
                let grid = CountryGrid::new(app.card_width(), app.columns());
                let hits = grid.render(f, &app.surface().home, palette, areas.body);
                self.hits.extend(hits);
            }
            ViewKind::Detail => {
                let hits = DetailPanel::render(f, &app.surface().detail, palette, areas.body);
                self.hits.extend(hits);
            }
        }
        StatusBar::render(f, app, areas.status);
        self.draw_overlays(f, app, screen);

        let elapsed = start.elapsed();
        self.stats.total += elapsed;
        self.stats.frames += 1;
        if elapsed.as_millis() > 16 {
            self.stats.slow += 1;
        }
        trace!(targets = self.hits.len(), ?elapsed, "Frame rendered");
    }

    fn draw_header(&mut self, f: &mut Frame<'_>, app: &AppController, area: Rect) {
        let palette = app.theme().palette();
        let toggle = format!("☾ {} (t) ", app.theme().current().toggle_label());
        let toggle_width = toggle.chars().count() as u16;

        let [title, control] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(toggle_width)])
                .areas(area);

        f.render_widget(
            Paragraph::new(APP_TITLE).style(palette.title().bg(palette.surface)),
            title,
        );
        f.render_widget(
            Paragraph::new(toggle)
                .style(palette.label().bg(palette.surface))
                .alignment(Alignment::Right),
            control,
        );
        self.hits.push((control, Activation::ToggleTheme));
    }

    /// Search box, region control and result counter.
    fn draw_controls(&mut self, f: &mut Frame<'_>, app: &AppController, area: Rect) {
        let palette = app.theme().palette();
        let ui = app.ui();
        let session = app.session();

        let [search_area, region_area, counter_area] = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Length(22),
            Constraint::Length(22),
        ])
        .areas(area);

        let searching = ui.mode == UIMode::Search;
        let search_block = Block::default()
            .borders(Borders::ALL)
            .title(" Search ")
            .border_style(if searching {
                palette.focused_border()
            } else {
                palette.border()
            });
        let search_text = if ui.search.as_str().is_empty() && !searching {
            Line::from(Span::styled("Search for a country… (/)", palette.dim()))
        } else {
            Line::from(Span::styled(ui.search.as_str(), palette.base()))
        };
        f.render_widget(Paragraph::new(search_text).block(search_block), search_area);
        if searching {
            f.set_cursor_position(Position::new(
                search_area.x + 1 + ui.search.cursor_column() as u16,
                search_area.y + 1,
            ));
        }

        let region_block = Block::default()
            .borders(Borders::ALL)
            .border_style(if ui.overlay == UIOverlay::RegionPicker {
                palette.focused_border()
            } else {
                palette.border()
            });
        f.render_widget(
            Paragraph::new(format!("{} ▾", session.selected_region.label()))
                .style(palette.base())
                .block(region_block),
            region_area,
        );
        self.hits.push((region_area, Activation::OpenRegionPicker));

        let home = &app.surface().home;
        let counter = format!(
            "{} of {} countries",
            home.target_count(),
            app.store().collection().len()
        );
        let counter_block = Block::default()
            .borders(Borders::TOP | Borders::BOTTOM)
            .border_style(palette.border());
        f.render_widget(
            Paragraph::new(counter)
                .style(palette.dim())
                .alignment(Alignment::Right)
                .block(counter_block),
            counter_area,
        );
    }

    fn draw_overlays(&mut self, f: &mut Frame<'_>, app: &AppController, screen: Rect) {
        let palette = app.theme().palette();
        let ui = app.ui();

        let mut overlay_hits = Vec::new();
        match ui.overlay {
            UIOverlay::Help => HelpOverlay::render(f, palette, screen),
            UIOverlay::RegionPicker => {
                overlay_hits = RegionPicker::render(
                    f,
                    app.session().selected_region,
                    ui.region_cursor,
                    palette,
                    screen,
                );
            }
            UIOverlay::None => {}
        }

        if ui.mode == UIMode::Prompt {
            InputPromptOverlay::render(f, &ui.prompt, palette, screen);
        }

        if let Some(notification) = &ui.notification {
            let area = NotificationOverlay::area(screen, notification.level);
            NotificationOverlay::render(f, notification, palette, area);
        }

        // Overlays cover the view, so clicks under them must not fire.
        if ui.overlay != UIOverlay::None || ui.mode == UIMode::Prompt {
            self.hits.clear();
            self.hits.extend(overlay_hits);
        }
    }

    fn layout(&mut self, screen: Rect, kind: ViewKind) -> Areas {
        if self.cache.screen != screen {
            self.cache.screen = screen;
            self.cache.home = None;
            self.cache.detail = None;
        }

        let slot = match kind {
            ViewKind::Home => &mut self.cache.home,
            ViewKind::Detail => &mut self.cache.detail,
        };
        if let Some(areas) = *slot {
            self.cache.hit += 1;
            return areas;
        }

        self.cache.miss += 1;
        let controls_height = if kind == ViewKind::Home { 3 } else { 0 };
        let [header, controls, body, status] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(controls_height),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(screen);

        let areas = Areas {
            header,
            controls,
            body: body.inner(Margin::new(1, 0)),
            status,
        };
        *slot = Some(areas);
        areas
    }
}

/// Sub-rectangle of `area` taking the given percentages, centered.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(area);

    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(middle);
    center
}

impl RenderStats {
    pub fn fps(&self) -> f64 {
        if self.frames > 0 && !self.total.is_zero() {
            self.frames as f64 / self.total.as_secs_f64()
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::scripted::ScriptedApi,
        cache::data_store::DataStore,
        config::{CacheConfig, UiConfig},
        controller::actions::Action,
        model::country::{CountryCode, Region, fixtures::country},
        prefs::MemoryPreferenceStore,
        view::theme::{Theme, ThemeManager},
    };
    use ratatui::{Terminal, backend::TestBackend};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(usize::from(buffer.area.width))
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test]
    async fn test_home_frame_and_click() {
        let api = Arc::new(ScriptedApi::new(vec![
            country("BEL", "Belgium", "Europe"),
            country("KEN", "Kenya", "Africa"),
        ]));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let store = Arc::new(DataStore::new(api, CacheConfig::default()));
        let theme = ThemeManager::load(Arc::new(MemoryPreferenceStore::new()), Theme::Dark);
        let mut app = AppController::new(store, theme, tx, &UiConfig::default());
        app.start("/");
        let loaded = rx.recv().await.unwrap();
        app.dispatch(Action::TaskResult(loaded));
        app.dispatch(Action::Resize(100, 30));

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let mut renderer = UIRenderer::new();
        terminal.draw(|f| renderer.render(f, &app)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Where in the world?"));
        assert!(text.contains("Light Mode"));
        assert!(text.contains("Belgium"));
        assert!(text.contains("2 of 2 countries"));

        // first card sits just below the header and the controls
        assert_eq!(
            renderer.hit_test(3, 6),
            Some(Activation::ShowCountry(CountryCode::from("BEL")))
        );
        assert_eq!(renderer.hit_test(0, 0), None);
    }

    #[tokio::test]
    async fn test_header_controls_and_region_rows_are_clickable() {
        let api = Arc::new(ScriptedApi::new(vec![
            country("BEL", "Belgium", "Europe"),
            country("KEN", "Kenya", "Africa"),
        ]));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let store = Arc::new(DataStore::new(api, CacheConfig::default()));
        let theme = ThemeManager::load(Arc::new(MemoryPreferenceStore::new()), Theme::Dark);
        let mut app = AppController::new(store, theme, tx, &UiConfig::default());
        app.start("/");
        let loaded = rx.recv().await.unwrap();
        app.dispatch(Action::TaskResult(loaded));
        app.dispatch(Action::Resize(100, 30));

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let mut renderer = UIRenderer::new();
        terminal.draw(|f| renderer.render(f, &app)).unwrap();

        // toggle sits at the right end of the header, region box left of the counter
        assert_eq!(renderer.hit_test(99, 0), Some(Activation::ToggleTheme));
        let region = renderer.hit_test(60, 2);
        assert_eq!(region, Some(Activation::OpenRegionPicker));

        app.dispatch(Action::Activate(Activation::OpenRegionPicker));
        assert_eq!(app.ui().overlay, UIOverlay::RegionPicker);
        terminal.draw(|f| renderer.render(f, &app)).unwrap();

        // cards under the picker no longer respond, its rows do
        assert_eq!(renderer.hit_test(3, 6), None);
        let africa = renderer.hit_test(40, 11);
        assert_eq!(africa, Some(Activation::PickRegion(Region::Africa)));

        app.dispatch(Action::Activate(Activation::PickRegion(Region::Africa)));
        assert_eq!(app.ui().overlay, UIOverlay::None);
        assert_eq!(app.session().selected_region, Region::Africa);
        assert_eq!(app.surface().home.target_count(), 1);

        app.dispatch(Action::Activate(Activation::ToggleTheme));
        assert_eq!(app.theme().current(), Theme::Light);
    }

    #[test]
    fn test_centered_rect_is_inside() {
        let area = Rect::new(0, 0, 100, 40);
        let center = centered_rect(50, 50, area);
        assert_eq!(center, Rect::new(25, 10, 50, 20));
    }
}
