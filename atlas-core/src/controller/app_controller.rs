//! ``src/controller/app_controller.rs``
//! ============================================================================
//! # AppController
//!
//! Owns the session, the router and the rendered surface, and is the only
//! place any of them change. Network work is spawned onto tokio and comes
//! back as a [`TaskResult`]; results for a view the user has already left
//! are dropped here before they can touch the surface.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument, warn};

use crate::{
    cache::data_store::{DataStore, LoadOutcome},
    config::UiConfig,
    controller::{
        actions::{Action, FocusMove},
        event_loop::{DetailPayload, InputContext, TaskResult},
        router::{HOME_PATH, Route, Router, resolve_route},
    },
    error::FetchError,
    model::{
        country::{CountryCode, Region},
        session_state::SessionState,
        ui_state::{RedrawFlag, TextInput, UIMode, UIOverlay, UIState},
    },
    view::{
        detail,
        home::{self, HomeInput},
        theme::ThemeManager,
        tree::{Activation, ActivationHandler, Surface, ViewKind},
    },
};

pub struct AppController {
    session: SessionState,
    ui: UIState,
    surface: Surface,
    router: Router,
    store: Arc<DataStore>,
    theme: ThemeManager,
    task_tx: UnboundedSender<TaskResult>,
    card_width: u16,
    columns: usize,
}

impl AppController {
    pub fn new(
        store: Arc<DataStore>,
        theme: ThemeManager,
        task_tx: UnboundedSender<TaskResult>,
        ui_config: &UiConfig,
    ) -> Self {
        Self {
            session: SessionState::new(),
            ui: UIState::new(),
            surface: Surface::default(),
            router: Router::default(),
            store,
            theme,
            task_tx,
            card_width: home::clamp_card_width(ui_config.card_width),
            columns: 1,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn ui(&self) -> &UIState {
        &self.ui
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn theme(&self) -> &ThemeManager {
        &self.theme
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    pub fn current_path(&self) -> &str {
        self.router.current_path()
    }

    pub const fn card_width(&self) -> u16 {
        self.card_width
    }

    pub fn input_context(&self) -> InputContext {
        InputContext {
            mode: self.ui.mode,
            overlay: self.ui.overlay,
            has_notification: self.ui.notification.is_some(),
        }
    }

    /// Enter the first route. An empty or malformed path lands on Home.
    pub fn start(&mut self, initial_path: &str) {
        info!(initial_path, "Starting session");
        self.navigate(initial_path);
    }

    /// Apply one action. Returns `false` when the application should exit.
    pub fn dispatch(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => {
                info!("Quit requested");
                return false;
            }
            Action::NoOp | Action::Click { .. } => return true,
            Action::Tick => {
                self.ui.update_notification();
                return true;
            }
            Action::TaskResult(result) => self.apply_task_result(result),

            Action::Navigate(path) => self.navigate(&path),
            Action::HistoryBack => {
                if let Some(route) = self.router.back() {
                    self.enter_route(route);
                }
            }
            Action::HistoryForward => {
                if let Some(route) = self.router.forward() {
                    self.enter_route(route);
                }
            }
            Action::Activate(activation) => self.on_activate(&activation),
            Action::ActivateFocused => {
                if let Some(activation) = self.surface.active().focused_activation() {
                    self.on_activate(&activation);
                }
            }
            Action::MoveFocus(direction) => self.move_focus(direction),

            Action::BeginSearch => {
                if self.surface.visible() != ViewKind::Home {
                    self.navigate(HOME_PATH);
                }
                self.ui.begin_search();
            }
            Action::InputChar(ch) => self.edit_input(|input| input.insert_char(ch)),
            Action::InputBackspace => self.edit_input(|input| {
                input.delete_char_before();
            }),
            Action::InputClear => self.edit_input(|input| input.clear()),
            Action::InputCursorLeft => self.edit_input(|input| input.move_left()),
            Action::InputCursorRight => self.edit_input(|input| input.move_right()),
            Action::EndInput => self.ui.end_input(),
            Action::OpenPrompt => self.ui.begin_prompt(),
            Action::SubmitPrompt => self.submit_prompt(),

            Action::OpenRegionPicker => self.ui.open_region_picker(self.session.selected_region),
            Action::RegionCursor(delta) => self.ui.move_region_cursor(delta),
            Action::ConfirmRegion => {
                let region = self.ui.highlighted_region();
                self.ui.close_overlay();
                self.select_region(region);
            }
            Action::SelectRegion(region) => self.select_region(region),

            Action::ToggleHelp => self.ui.toggle_help(),
            Action::CloseOverlay => self.ui.close_overlay(),
            Action::Escape => self.escape(),
            Action::ToggleTheme => {
                self.theme.toggle();
            }
            Action::Reload => self.reload(),
            Action::Resize(width, _) => {
                self.columns = home::grid_columns(width.saturating_sub(2), self.card_width);
            }
        }

        self.ui.request_redraw(RedrawFlag::All);
        true
    }

    /// Push `path` and switch to whatever it resolves to.
    pub fn navigate(&mut self, path: &str) {
        let route = self.router.navigate(path);
        self.enter_route(route);
    }

    #[instrument(level = "info", skip(self))]
    fn enter_route(&mut self, route: Route) {
        let generation = self.session.enter_route(route.clone());
        match route {
            Route::Home => {
                self.surface.show(ViewKind::Home);
                self.start_home();
            }
            Route::Detail(code) => {
                // The search box lives on Home; keys must not edit it from here.
                if self.ui.mode == UIMode::Search {
                    self.ui.end_input();
                }
                self.surface.show(ViewKind::Detail);
                self.start_detail(code, generation);
            }
        }
    }

    fn start_home(&mut self) {
        if !self.store.is_populated() && !self.session.is_fetching {
            self.session.home_error = None;
            self.spawn_collection_load(false);
        }
        self.render_home();
    }

    fn render_home(&mut self) -> bool {
        let collection = self.store.collection();
        let input = HomeInput {
            collection: &collection,
            query: &self.session.search_query,
            region: self.session.selected_region,
            is_fetching: self.session.is_fetching,
            error: self.session.home_error.as_ref(),
        };
        home::render_home(&mut self.surface, &input)
    }

    fn spawn_collection_load(&mut self, forced: bool) {
        self.session.is_fetching = true;
        let store = self.store.clone();
        let tx = self.task_tx.clone();

        tokio::spawn(async move {
            let result = if forced {
                store.reload().await
            } else {
                store.load_all().await
            };
            if tx.send(TaskResult::CountriesLoaded { result, forced }).is_err() {
                debug!("Controller gone, dropping collection result");
            }
        });
    }

    fn start_detail(&mut self, code: CountryCode, generation: u64) {
        detail::render_loading(&mut self.surface);

        let store = self.store.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = match store.fetch_detail(&code).await {
                Ok(country) => {
                    let border_names = store.resolve_names(&country.borders).await;
                    Ok(DetailPayload {
                        country,
                        border_names,
                    })
                }
                Err(e) => Err(e),
            };
            let message = TaskResult::DetailLoaded {
                generation,
                code,
                result,
            };
            if tx.send(message).is_err() {
                debug!("Controller gone, dropping detail result");
            }
        });
    }

    fn apply_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::CountriesLoaded { result, forced } => {
                self.apply_collection_result(result, forced);
            }
            TaskResult::DetailLoaded {
                generation,
                code,
                result,
            } => self.apply_detail_result(generation, &code, result),
        }
    }

    fn apply_collection_result(&mut self, result: Result<LoadOutcome, FetchError>, forced: bool) {
        match result {
            // Another fetch owns the flag and will report on its own.
            Ok(LoadOutcome::InFlight) => return,
            Ok(outcome) => {
                self.session.is_fetching = false;
                self.session.home_error = None;
                if forced {
                    if let LoadOutcome::Fetched(count) = outcome {
                        self.ui.show_success(format!("Loaded {count} countries"));
                    }
                }
            }
            Err(err) => {
                self.session.is_fetching = false;
                if self.store.is_populated() {
                    self.ui.show_error(err.user_message());
                }
                self.session.home_error = Some(err);
            }
        }

        if self.session.current_route.is_home() {
            self.render_home();
        } else {
            debug!("Home not active, collection result kept for later");
        }
    }

    fn apply_detail_result(
        &mut self,
        generation: u64,
        code: &CountryCode,
        result: Result<DetailPayload, FetchError>,
    ) {
        if !self.session.is_current_generation(generation) {
            debug!(
                %code,
                generation,
                current = self.session.generation,
                "Discarding stale detail result"
            );
            return;
        }

        match result {
            Ok(payload) => {
                detail::render_country(&mut self.surface, &payload.country, &payload.border_names);
            }
            Err(err) => {
                warn!(%code, error = %err, "Detail lookup failed");
                detail::render_error(&mut self.surface, code, &err);
            }
        }
    }

    fn edit_input(&mut self, edit: impl FnOnce(&mut TextInput)) {
        let mode = self.ui.mode;
        if let Some(input) = self.ui.active_input_mut() {
            edit(input);
        }
        if mode == UIMode::Search {
            self.apply_search_input();
        }
    }

    /// Re-filter from the search box text. Never fetches.
    fn apply_search_input(&mut self) {
        let raw = self.ui.search.as_str().to_string();
        if self.session.set_search_query(&raw) {
            self.surface.home.set_focus(0);
            self.render_home();
        }
    }

    fn select_region(&mut self, region: Region) {
        if self.session.set_region(region) {
            info!(region = region.as_str(), "Region selected");
            self.surface.home.set_focus(0);
            self.render_home();
        }
    }

    fn submit_prompt(&mut self) {
        let path = self.ui.prompt.as_str().trim().to_string();
        self.ui.end_input();
        if resolve_route(&path).is_none() {
            self.ui.show_warning(format!("{path} is not a country path, showing all countries"));
        }
        self.navigate(&path);
    }

    fn reload(&mut self) {
        if self.session.is_fetching {
            self.ui.show_info("Already loading countries");
            return;
        }
        self.session.home_error = None;
        self.spawn_collection_load(true);
        self.ui.show_info("Reloading countries");
        if self.session.current_route.is_home() {
            self.render_home();
        }
    }

    fn escape(&mut self) {
        if self.ui.dismiss_notification() {
            return;
        }
        if self.ui.overlay != UIOverlay::None {
            self.ui.close_overlay();
            return;
        }
        if !self.session.current_route.is_home() {
            self.navigate(HOME_PATH);
        }
    }

    fn move_focus(&mut self, direction: FocusMove) {
        let on_home = self.surface.visible() == ViewKind::Home;
        let row = if on_home { self.columns } else { 1 };
        let view = self.surface.active_mut();

        match direction {
            FocusMove::Left | FocusMove::Prev => view.move_focus(-1),
            FocusMove::Right | FocusMove::Next => view.move_focus(1),
            FocusMove::Up => view.move_focus(-(row as isize)),
            FocusMove::Down => view.move_focus(row as isize),
            FocusMove::First => view.set_focus(0),
            FocusMove::Last => view.set_focus(usize::MAX),
        }
    }

    /// Grid columns used for Up/Down on Home.
    pub const fn columns(&self) -> usize {
        self.columns
    }
}

impl ActivationHandler for AppController {
    fn on_activate(&mut self, activation: &Activation) {
        debug!(?activation, "Activation");
        match activation {
            Activation::ShowCountry(code) => self.navigate(&code.path()),
            Activation::GoHome => self.navigate(HOME_PATH),
            Activation::ToggleTheme => {
                self.theme.toggle();
            }
            Activation::OpenRegionPicker => {
                self.ui.open_region_picker(self.session.selected_region);
            }
            Activation::PickRegion(region) => {
                self.ui.close_overlay();
                self.select_region(*region);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::scripted::ScriptedApi,
        config::CacheConfig,
        model::country::fixtures::country,
        prefs::MemoryPreferenceStore,
        view::theme::Theme,
    };
    use tokio::sync::mpsc;

    fn controller(api: Arc<ScriptedApi>) -> (AppController, mpsc::UnboundedReceiver<TaskResult>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let store = Arc::new(DataStore::new(api, CacheConfig::default()));
        let theme = ThemeManager::load(Arc::new(MemoryPreferenceStore::new()), Theme::Dark);
        (
            AppController::new(store, theme, tx, &UiConfig::default()),
            rx,
        )
    }

    #[tokio::test]
    async fn test_theme_toggle_keeps_route_and_filter() {
        let api = Arc::new(ScriptedApi::new(vec![country("FRA", "France", "Europe")]));
        let (mut app, mut rx) = controller(api);
        app.start("/");
        let loaded = rx.recv().await.unwrap();
        app.dispatch(Action::TaskResult(loaded));
        app.dispatch(Action::SelectRegion(Region::Europe));

        app.dispatch(Action::ToggleTheme);
        assert_eq!(app.theme().current(), Theme::Light);
        assert_eq!(app.session().selected_region, Region::Europe);
        assert_eq!(app.session().current_route, Route::Home);
    }

    #[tokio::test]
    async fn test_prompt_with_malformed_path_lands_home() {
        let api = Arc::new(ScriptedApi::default());
        let (mut app, _rx) = controller(api);
        app.start("/");

        app.dispatch(Action::OpenPrompt);
        for ch in "xy".chars() {
            app.dispatch(Action::InputChar(ch));
        }
        app.dispatch(Action::SubmitPrompt);

        assert_eq!(app.current_path(), "/");
        assert_eq!(app.session().current_route, Route::Home);
        assert!(app.ui().notification.is_some());
    }

    #[tokio::test]
    async fn test_narrow_card_width_matches_painted_grid() {
        let api = Arc::new(ScriptedApi::default());
        let (tx, _rx) = mpsc::unbounded_channel();
        let store = Arc::new(DataStore::new(api, CacheConfig::default()));
        let theme = ThemeManager::load(Arc::new(MemoryPreferenceStore::new()), Theme::Dark);
        let ui = UiConfig {
            card_width: 3,
            ..UiConfig::default()
        };
        let mut app = AppController::new(store, theme, tx, &ui);

        assert_eq!(app.card_width(), home::MIN_CARD_WIDTH);
        app.dispatch(Action::Resize(98, 40));
        // every column the focus math counts fits inside the grid area
        assert_eq!(app.columns(), 12);
        assert!(app.columns() as u16 * app.card_width() <= 96);
    }

    #[tokio::test]
    async fn test_focus_moves_by_grid_row() {
        let world = (0..6)
            .map(|i| country(&format!("C{i:02}"), &format!("Country {i}"), "Asia"))
            .collect();
        let api = Arc::new(ScriptedApi::new(world));
        let (mut app, mut rx) = controller(api);
        app.start("/");
        let loaded = rx.recv().await.unwrap();
        app.dispatch(Action::TaskResult(loaded));

        // 3 columns of 32 cells inside a 100-cell grid
        app.dispatch(Action::Resize(98, 40));
        assert_eq!(app.columns(), 3);
        app.dispatch(Action::MoveFocus(FocusMove::Down));
        assert_eq!(app.surface().home.focus(), 3);
        app.dispatch(Action::MoveFocus(FocusMove::Left));
        assert_eq!(app.surface().home.focus(), 2);
    }
}
