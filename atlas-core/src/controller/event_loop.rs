//! ``src/controller/event_loop.rs``
//! ============================================================================
//! # Event loop
//!
//! Merges three sources into one stream of [`Action`]s:
//! - terminal input (crossterm `EventStream`), mapped according to the
//!   current input mode and overlay
//! - results of background fetch tasks
//! - a periodic tick for notification expiry

use std::time::Duration;

use crossterm::event::{
    Event as TermEvent, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
    MouseEvent, MouseEventKind,
};
use futures::StreamExt;
use indexmap::IndexMap;
use tokio::{
    sync::mpsc,
    time::{Interval, MissedTickBehavior},
};
use tracing::{debug, info, trace};

use crate::{
    cache::data_store::LoadOutcome,
    controller::{
        actions::{Action, FocusMove},
        router::HOME_PATH,
    },
    error::FetchError,
    model::{
        country::{Country, CountryCode},
        ui_state::{UIMode, UIOverlay},
    },
};

/// Detail lookup result: the country plus its resolved border names.
#[derive(Debug, Clone)]
pub struct DetailPayload {
    pub country: Country,
    pub border_names: IndexMap<CountryCode, String>,
}

/// Completion of a background task.
#[derive(Debug, Clone)]
pub enum TaskResult {
    /// Bulk listing settled.
    CountriesLoaded {
        result: Result<LoadOutcome, FetchError>,
        /// Started by an explicit reload.
        forced: bool,
    },

    /// Detail lookup settled. Applied only if `generation` is still current.
    DetailLoaded {
        generation: u64,
        code: CountryCode,
        result: Result<DetailPayload, FetchError>,
    },
}

/// What the key mapper needs to know about the UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputContext {
    pub mode: UIMode,
    pub overlay: UIOverlay,
    pub has_notification: bool,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LoopMetrics {
    pub terminal_events: u64,
    pub tasks: u64,
    pub ticks: u64,
}

pub struct EventLoop {
    task_rx: mpsc::UnboundedReceiver<TaskResult>,
    event_stream: EventStream,
    ticker: Interval,
    metrics: LoopMetrics,
}

impl EventLoop {
    pub fn new(task_rx: mpsc::UnboundedReceiver<TaskResult>, tick_rate: Duration) -> Self {
        info!(?tick_rate, "Initializing event loop");
        let mut ticker = tokio::time::interval(tick_rate);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        Self {
            task_rx,
            event_stream: EventStream::new(),
            ticker,
            metrics: LoopMetrics::default(),
        }
    }

    pub fn metrics(&self) -> LoopMetrics {
        self.metrics
    }

    /// Wait for the next action. `None` once every source is closed.
    pub async fn next_action(&mut self, ctx: InputContext) -> Option<Action> {
        tokio::select! {
            Some(Ok(event)) = self.event_stream.next() => {
                self.metrics.terminal_events += 1;
                trace!("Terminal event received: {:?}", event);
                Some(map_terminal_event(event, ctx))
            }

            Some(task_result) = self.task_rx.recv() => {
                self.metrics.tasks += 1;
                debug!("Task result received");
                Some(Action::TaskResult(task_result))
            }

            _ = self.ticker.tick() => {
                self.metrics.ticks += 1;
                Some(Action::Tick)
            }

            else => {
                info!("Event loop terminated - no more events");
                None
            }
        }
    }
}

pub fn map_terminal_event(event: TermEvent, ctx: InputContext) -> Action {
    match event {
        TermEvent::Key(key) if key.kind == KeyEventKind::Press => map_key(key, ctx),

        TermEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            ..
        }) => Action::Click { column, row },

        TermEvent::Mouse(MouseEvent {
            kind: MouseEventKind::ScrollDown,
            ..
        }) => Action::MoveFocus(FocusMove::Down),

        TermEvent::Mouse(MouseEvent {
            kind: MouseEventKind::ScrollUp,
            ..
        }) => Action::MoveFocus(FocusMove::Up),

        TermEvent::Resize(width, height) => Action::Resize(width, height),

        _ => Action::NoOp,
    }
}

/// Key → action for the given UI context.
pub fn map_key(key: KeyEvent, ctx: InputContext) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    match ctx.mode {
        UIMode::Search => return map_search_key(key),
        UIMode::Prompt => return map_prompt_key(key),
        UIMode::Browse => {}
    }

    match ctx.overlay {
        UIOverlay::Help => match key.code {
            KeyCode::Esc | KeyCode::Char('?' | 'h' | 'q') | KeyCode::Enter => {
                Action::CloseOverlay
            }
            _ => Action::NoOp,
        },
        UIOverlay::RegionPicker => map_region_picker_key(key),
        UIOverlay::None => map_browse_key(key, ctx),
    }
}

fn map_browse_key(key: KeyEvent, ctx: InputContext) -> Action {
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Esc => Action::Escape,

        KeyCode::Char('/') => Action::BeginSearch,
        KeyCode::Char(':') => Action::OpenPrompt,
        KeyCode::Char('r') => Action::OpenRegionPicker,
        KeyCode::Char('t') => Action::ToggleTheme,
        KeyCode::Char('?' | 'h') => Action::ToggleHelp,
        KeyCode::F(5) => Action::Reload,

        KeyCode::Left if alt => Action::HistoryBack,
        KeyCode::Right if alt => Action::HistoryForward,
        KeyCode::Backspace | KeyCode::Char('b') => Action::HistoryBack,
        KeyCode::Char('f') => Action::HistoryForward,
        KeyCode::Char('g') => Action::Navigate(HOME_PATH.to_string()),

        KeyCode::Enter | KeyCode::Char(' ') => Action::ActivateFocused,

        KeyCode::Left => Action::MoveFocus(FocusMove::Left),
        KeyCode::Right => Action::MoveFocus(FocusMove::Right),
        KeyCode::Up => Action::MoveFocus(FocusMove::Up),
        KeyCode::Down => Action::MoveFocus(FocusMove::Down),
        KeyCode::Tab => Action::MoveFocus(FocusMove::Next),
        KeyCode::BackTab => Action::MoveFocus(FocusMove::Prev),
        KeyCode::Home => Action::MoveFocus(FocusMove::First),
        KeyCode::End => Action::MoveFocus(FocusMove::Last),

        _ if ctx.has_notification => Action::Escape,
        _ => Action::NoOp,
    }
}

fn map_search_key(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Enter | KeyCode::Esc | KeyCode::Down | KeyCode::Tab => Action::EndInput,
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::InputClear,
        KeyCode::Char(c) => Action::InputChar(c),
        KeyCode::Backspace => Action::InputBackspace,
        KeyCode::Left => Action::InputCursorLeft,
        KeyCode::Right => Action::InputCursorRight,
        _ => Action::NoOp,
    }
}

fn map_prompt_key(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Enter => Action::SubmitPrompt,
        KeyCode::Esc => Action::EndInput,
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::InputClear,
        KeyCode::Char(c) => Action::InputChar(c),
        KeyCode::Backspace => Action::InputBackspace,
        KeyCode::Left => Action::InputCursorLeft,
        KeyCode::Right => Action::InputCursorRight,
        _ => Action::NoOp,
    }
}

fn map_region_picker_key(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Action::RegionCursor(-1),
        KeyCode::Down | KeyCode::Char('j') => Action::RegionCursor(1),
        KeyCode::Enter | KeyCode::Char(' ') => Action::ConfirmRegion,
        KeyCode::Esc | KeyCode::Char('r' | 'q') => Action::CloseOverlay,
        _ => Action::NoOp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctx(mode: UIMode, overlay: UIOverlay) -> InputContext {
        InputContext {
            mode,
            overlay,
            has_notification: false,
        }
    }

    #[test]
    fn test_browse_keys() {
        let browse = ctx(UIMode::Browse, UIOverlay::None);
        assert!(matches!(map_key(key(KeyCode::Char('q')), browse), Action::Quit));
        assert!(matches!(map_key(key(KeyCode::Char('/')), browse), Action::BeginSearch));
        assert!(matches!(map_key(key(KeyCode::Enter), browse), Action::ActivateFocused));
        assert!(matches!(map_key(key(KeyCode::Char(' ')), browse), Action::ActivateFocused));
        assert!(matches!(
            map_key(key(KeyCode::Char('g')), browse),
            Action::Navigate(path) if path == "/"
        ));
        assert!(matches!(
            map_key(KeyEvent::new(KeyCode::Left, KeyModifiers::ALT), browse),
            Action::HistoryBack
        ));
        assert!(matches!(
            map_key(key(KeyCode::Left), browse),
            Action::MoveFocus(FocusMove::Left)
        ));
    }

    #[test]
    fn test_search_mode_types_letters() {
        let search = ctx(UIMode::Search, UIOverlay::None);
        assert!(matches!(map_key(key(KeyCode::Char('q')), search), Action::InputChar('q')));
        assert!(matches!(map_key(key(KeyCode::Esc), search), Action::EndInput));
        assert!(matches!(
            map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), search),
            Action::Quit
        ));
    }

    #[test]
    fn test_region_picker_keys() {
        let picker = ctx(UIMode::Browse, UIOverlay::RegionPicker);
        assert!(matches!(map_key(key(KeyCode::Down), picker), Action::RegionCursor(1)));
        assert!(matches!(map_key(key(KeyCode::Enter), picker), Action::ConfirmRegion));
        assert!(matches!(map_key(key(KeyCode::Esc), picker), Action::CloseOverlay));
    }

    #[test]
    fn test_left_click_maps_to_cell() {
        let event = TermEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 12,
            row: 7,
            modifiers: KeyModifiers::NONE,
        });
        assert!(matches!(
            map_terminal_event(event, InputContext::default()),
            Action::Click { column: 12, row: 7 }
        ));
    }
}
