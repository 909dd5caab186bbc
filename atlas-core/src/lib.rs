pub mod error;

pub mod config;

pub mod logging;

pub mod prefs;

pub mod api {
    pub mod client;
    pub use client::{CountryApi, RestCountriesClient};

    #[cfg(any(test, feature = "test-util"))]
    pub mod scripted;
}

pub mod cache {
    pub mod cache_manager;

    pub mod data_store;
    pub use data_store::{DataStore, LoadOutcome};
}

pub mod controller {

    pub mod actions;
    pub use actions::Action;

    pub mod app_controller;
    pub use app_controller::AppController;

    pub mod event_loop;
    pub use event_loop::{EventLoop, TaskResult};

    pub mod router;
    pub use router::{Route, Router};
}

pub mod model {
    pub mod country;
    pub use country::{Country, CountryCode, Region};

    pub mod filter;

    pub mod session_state;
    pub use session_state::SessionState;

    pub mod ui_state;
    pub use ui_state::{Notification, NotificationLevel, RedrawFlag, UIMode, UIOverlay, UIState};
}

pub mod view {
    pub mod detail;

    pub mod home;

    pub mod theme;

    pub mod tree;

    pub mod ui;

    pub mod components {
        pub mod country_grid;
        pub use country_grid::CountryGrid;
        pub mod detail_panel;
        pub use detail_panel::DetailPanel;
        pub mod help_overlay;
        pub use help_overlay::HelpOverlay;
        pub mod input_prompt_overlay;
        pub use input_prompt_overlay::InputPromptOverlay;
        pub mod notification_overlay;
        pub use notification_overlay::NotificationOverlay;
        pub mod region_picker;
        pub use region_picker::RegionPicker;
        pub mod status_bar;
        pub use status_bar::StatusBar;
    }
}

pub mod util {
    pub mod humanize;
}

pub use error::{AppError, FetchError};
