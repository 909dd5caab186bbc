//! UI state: input mode, overlays, text inputs and notifications

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use compact_str::CompactString;

use crate::model::country::Region;

/// Atomic redraw flags for lock-free UI updates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RedrawFlag {
    Main = 1,
    StatusBar = 2,
    Overlay = 4,
    Notification = 8,
    All = 15,
}

impl RedrawFlag {
    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Where typed characters go.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum UIMode {
    #[default]
    Browse = 0,
    /// Typing into the search box.
    Search = 1,
    /// Typing a raw path into the go-to prompt.
    Prompt = 2,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum UIOverlay {
    #[default]
    None = 0,
    Help = 1,
    RegionPicker = 2,
}

/// Notification levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NotificationLevel {
    Info = 0,
    Success = 1,
    Warning = 2,
    Error = 3,
}

/// Compact notification with timestamp
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: CompactString,
    pub level: NotificationLevel,
    pub timestamp: Instant,
    pub auto_dismiss_ms: Option<u32>,
}

/// Single-line editable text with a byte cursor on a char boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    pub text: CompactString,
    pub cursor: usize,
}

impl TextInput {
    pub fn clear(&mut self) {
        self.text = CompactString::new("");
        self.cursor = 0;
    }

    pub fn set(&mut self, text: impl Into<CompactString>) {
        self.text = text.into();
        self.cursor = self.text.len();
    }

    pub fn insert_char(&mut self, ch: char) {
        let mut input_str = self.text.to_string();
        input_str.insert(self.cursor, ch);
        self.text = input_str.into();
        self.cursor += ch.len_utf8();
    }

    pub fn delete_char_before(&mut self) -> bool {
        let Some((char_pos, _)) = self.text[..self.cursor].char_indices().next_back() else {
            return false;
        };
        let mut input_str = self.text.to_string();
        input_str.remove(char_pos);
        self.text = input_str.into();
        self.cursor = char_pos;
        true
    }

    pub fn move_left(&mut self) {
        if let Some((pos, _)) = self.text[..self.cursor].char_indices().next_back() {
            self.cursor = pos;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(ch) = self.text[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }

    /// Cursor position in characters, for placing the terminal cursor.
    pub fn cursor_column(&self) -> usize {
        self.text[..self.cursor].chars().count()
    }

    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }
}

#[derive(Debug)]
pub struct UIState {
    pub redraw_flags: AtomicU32,

    pub mode: UIMode,
    pub overlay: UIOverlay,

    /// Raw search box text; the session keeps the normalized query.
    pub search: TextInput,
    /// Go-to-path prompt text.
    pub prompt: TextInput,

    /// Highlighted row of the region picker.
    pub region_cursor: usize,

    pub notification: Option<Notification>,
}

impl Default for UIState {
    fn default() -> Self {
        Self::new()
    }
}

impl UIState {
    pub fn new() -> Self {
        Self {
            redraw_flags: AtomicU32::new(u32::from(RedrawFlag::All.bits())),
            mode: UIMode::Browse,
            overlay: UIOverlay::None,
            search: TextInput::default(),
            prompt: TextInput::default(),
            region_cursor: 0,
            notification: None,
        }
    }

    #[inline]
    pub fn request_redraw(&self, flag: RedrawFlag) {
        self.redraw_flags
            .fetch_or(u32::from(flag.bits()), Ordering::Relaxed);
    }

    #[inline]
    pub fn needs_redraw(&self) -> bool {
        self.redraw_flags.load(Ordering::Relaxed) != 0
    }

    #[inline]
    pub fn clear_redraw(&self) {
        self.redraw_flags.store(0, Ordering::Relaxed);
    }

    pub fn show_notification(
        &mut self,
        message: impl Into<CompactString>,
        level: NotificationLevel,
        auto_dismiss_ms: Option<u32>,
    ) {
        self.notification = Some(Notification {
            message: message.into(),
            level,
            timestamp: Instant::now(),
            auto_dismiss_ms,
        });
        self.request_redraw(RedrawFlag::Notification);
    }

    #[inline]
    pub fn show_info(&mut self, message: impl Into<CompactString>) {
        self.show_notification(message, NotificationLevel::Info, Some(3000));
    }

    #[inline]
    pub fn show_success(&mut self, message: impl Into<CompactString>) {
        self.show_notification(message, NotificationLevel::Success, Some(2000));
    }

    #[inline]
    pub fn show_warning(&mut self, message: impl Into<CompactString>) {
        self.show_notification(message, NotificationLevel::Warning, Some(5000));
    }

    #[inline]
    pub fn show_error(&mut self, message: impl Into<CompactString>) {
        self.show_notification(message, NotificationLevel::Error, None);
    }

    pub fn dismiss_notification(&mut self) -> bool {
        if self.notification.take().is_some() {
            self.request_redraw(RedrawFlag::Notification);
            return true;
        }
        false
    }

    // Auto-dismiss notifications
    pub fn update_notification(&mut self) -> bool {
        if let Some(notification) = &self.notification
            && let Some(auto_dismiss_ms) = notification.auto_dismiss_ms
            && notification.timestamp.elapsed().as_millis() > u128::from(auto_dismiss_ms)
        {
            self.notification = None;
            self.request_redraw(RedrawFlag::Notification);
            return true;
        }
        false
    }

    /// The buffer typed characters go to in the current mode.
    pub fn active_input_mut(&mut self) -> Option<&mut TextInput> {
        match self.mode {
            UIMode::Search => Some(&mut self.search),
            UIMode::Prompt => Some(&mut self.prompt),
            UIMode::Browse => None,
        }
    }

    /// Enter search mode, keeping whatever was typed last time.
    pub fn begin_search(&mut self) {
        self.mode = UIMode::Search;
        self.search.cursor = self.search.text.len();
        self.request_redraw(RedrawFlag::All);
    }

    /// Open the go-to prompt, pre-filled with `/`.
    pub fn begin_prompt(&mut self) {
        self.mode = UIMode::Prompt;
        self.prompt.set("/");
        self.request_redraw(RedrawFlag::All);
    }

    pub fn end_input(&mut self) {
        self.mode = UIMode::Browse;
        self.request_redraw(RedrawFlag::All);
    }

    /// Takes keyboard input away from any text field.
    pub fn open_region_picker(&mut self, current: Region) {
        self.mode = UIMode::Browse;
        self.region_cursor = Region::ALL.iter().position(|r| *r == current).unwrap_or(0);
        self.overlay = UIOverlay::RegionPicker;
        self.request_redraw(RedrawFlag::Overlay);
    }

    pub fn move_region_cursor(&mut self, delta: isize) {
        let len = Region::ALL.len() as isize;
        self.region_cursor = (self.region_cursor as isize + delta).rem_euclid(len) as usize;
        self.request_redraw(RedrawFlag::Overlay);
    }

    pub fn highlighted_region(&self) -> Region {
        Region::ALL
            .get(self.region_cursor)
            .copied()
            .unwrap_or_default()
    }

    pub fn close_overlay(&mut self) {
        self.overlay = UIOverlay::None;
        self.request_redraw(RedrawFlag::All);
    }

    pub fn toggle_help(&mut self) {
        self.overlay = if self.overlay == UIOverlay::Help {
            UIOverlay::None
        } else {
            UIOverlay::Help
        };
        self.request_redraw(RedrawFlag::All);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_editing() {
        let mut input = TextInput::default();
        for ch in "Côte".chars() {
            input.insert_char(ch);
        }
        assert_eq!(input.as_str(), "Côte");

        input.move_left();
        input.move_left();
        assert!(input.delete_char_before());
        assert_eq!(input.as_str(), "Cte");
        assert_eq!(input.cursor, 1);
        assert_eq!(input.cursor_column(), 1);

        input.clear();
        assert!(!input.delete_char_before());
    }

    #[test]
    fn test_active_input_follows_mode() {
        let mut ui = UIState::new();
        assert!(ui.active_input_mut().is_none());

        ui.begin_prompt();
        ui.active_input_mut().unwrap().insert_char('x');
        assert_eq!(ui.prompt.as_str(), "/x");
        assert!(ui.search.as_str().is_empty());

        ui.begin_search();
        ui.open_region_picker(Region::All);
        assert_eq!(ui.mode, UIMode::Browse);
        assert!(ui.active_input_mut().is_none());
    }

    #[test]
    fn test_region_cursor_wraps() {
        let mut ui = UIState::new();
        ui.open_region_picker(Region::Oceania);
        assert_eq!(ui.highlighted_region(), Region::Oceania);

        ui.move_region_cursor(1);
        assert_eq!(ui.highlighted_region(), Region::All);
        ui.move_region_cursor(-1);
        assert_eq!(ui.highlighted_region(), Region::Oceania);
    }

    #[test]
    fn test_atomic_operations() {
        let ui_state = UIState::new();
        ui_state.clear_redraw();
        assert!(!ui_state.needs_redraw());

        ui_state.request_redraw(RedrawFlag::Main);
        assert!(ui_state.needs_redraw());
    }

    #[test]
    fn test_notifications() {
        let mut ui = UIState::new();
        ui.show_error("boom");
        assert!(!ui.update_notification());
        assert!(ui.dismiss_notification());
        assert!(ui.notification.is_none());
    }
}
