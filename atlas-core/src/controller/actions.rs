//! src/controller/actions.rs
//! ============================================================================
//! # Actions: Centralized Application Commands
//!
//! Defines the `Action` enum, which represents all possible user inputs and
//! internal events that the application can respond to. Raw terminal events
//! are mapped to actions by the event loop; the controller is the only
//! consumer.

use crate::{
    controller::event_loop::TaskResult, model::country::Region, view::tree::Activation,
};

/// Direction for moving keyboard focus across activation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusMove {
    Left,
    Right,
    /// One grid row up on Home, one target back on Detail.
    Up,
    Down,
    Next,
    Prev,
    First,
    Last,
}

#[derive(Debug, Clone)]
pub enum Action {
    /// Fire an activation target (from a mouse click hit test).
    Activate(Activation),

    /// Fire the target that has keyboard focus.
    ActivateFocused,

    /// Start typing into the search box.
    BeginSearch,

    /// Mouse click at a terminal cell; resolved against the last frame.
    Click { column: u16, row: u16 },

    /// Close the open overlay.
    CloseOverlay,

    /// Apply the highlighted region in the picker.
    ConfirmRegion,

    /// Context-dependent escape: notification, overlay, then leave detail.
    Escape,

    /// Finish typing without submitting (search keeps its text).
    EndInput,

    HistoryBack,

    HistoryForward,

    InputBackspace,

    InputChar(char),

    InputClear,

    InputCursorLeft,

    InputCursorRight,

    MoveFocus(FocusMove),

    /// Push a path through the router.
    Navigate(String),

    /// Event consumed, nothing to do.
    NoOp,

    OpenPrompt,

    OpenRegionPicker,

    Quit,

    /// Refetch the country list even if one is loaded.
    Reload,

    /// Move the region picker highlight.
    RegionCursor(isize),

    Resize(u16, u16),

    SelectRegion(Region),

    /// Submit the go-to prompt.
    SubmitPrompt,

    /// A result from a background task.
    TaskResult(TaskResult),

    /// An internal tick event for periodic updates.
    Tick,

    ToggleHelp,

    ToggleTheme,
}
