//! src/view/theme.rs
//! ============================================================================
//! # Light/Dark palettes
//!
//! Both palettes are Catppuccin flavours: Mocha for dark, Latte for light.
//! https://github.com/catppuccin/catppuccin
//!
//! The active theme is persisted under [`THEME_KEY`] and is independent of
//! routing and filter state.

use std::{str::FromStr, sync::Arc};

use ratatui::style::{Color, Modifier, Style};
use tracing::{debug, info, instrument, warn};

use crate::prefs::PreferenceStore;

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Label of the toggle control: names the mode a toggle would switch to.
    pub const fn toggle_label(self) -> &'static str {
        match self {
            Self::Light => "Dark Mode",
            Self::Dark => "Light Mode",
        }
    }

    pub const fn palette(self) -> &'static Palette {
        match self {
            Self::Light => &LATTE,
            Self::Dark => &MOCHA,
        }
    }

    /// Guess from `COLORFGBG` (`"fg;bg"`, set by many terminals). Background
    /// index 7 or 15 is a light terminal; anything else, or no variable, is
    /// dark.
    pub fn from_colorfgbg(value: Option<&str>) -> Self {
        let background = value
            .and_then(|v| v.rsplit(';').next())
            .and_then(|bg| bg.trim().parse::<u8>().ok());

        match background {
            Some(7 | 15) => Self::Light,
            _ => Self::Dark,
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub surface: Color,
    pub foreground: Color,
    pub muted: Color,
    pub accent: Color,
    pub highlight: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
}

pub const MOCHA: Palette = Palette {
    background: Color::Rgb(30, 30, 46),    // Base
    surface: Color::Rgb(69, 71, 90),       // Surface1
    foreground: Color::Rgb(205, 214, 244), // Text
    muted: Color::Rgb(127, 132, 156),      // Overlay1
    accent: Color::Rgb(137, 220, 235),     // Sky
    highlight: Color::Rgb(203, 166, 247),  // Mauve
    success: Color::Rgb(166, 227, 161),    // Green
    warning: Color::Rgb(249, 226, 175),    // Yellow
    error: Color::Rgb(243, 139, 168),      // Red
};

pub const LATTE: Palette = Palette {
    background: Color::Rgb(239, 241, 245), // Base
    surface: Color::Rgb(188, 192, 204),    // Surface1
    foreground: Color::Rgb(76, 79, 105),   // Text
    muted: Color::Rgb(140, 143, 161),      // Overlay1
    accent: Color::Rgb(4, 165, 229),       // Sky
    highlight: Color::Rgb(136, 57, 239),   // Mauve
    success: Color::Rgb(64, 160, 43),      // Green
    warning: Color::Rgb(223, 142, 29),     // Yellow
    error: Color::Rgb(210, 15, 57),        // Red
};

impl Palette {
    pub fn base(&self) -> Style {
        Style::default().bg(self.background).fg(self.foreground)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn focused_border(&self) -> Style {
        Style::default().fg(self.highlight).add_modifier(Modifier::BOLD)
    }

    pub fn title(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn label(&self) -> Style {
        Style::default().fg(self.foreground).add_modifier(Modifier::BOLD)
    }

    pub fn dim(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn selection(&self) -> Style {
        Style::default().bg(self.surface).fg(self.foreground)
    }

    pub fn status_bar(&self) -> Style {
        Style::default().bg(self.surface).fg(self.foreground)
    }
}

/// Current theme plus where it is persisted.
pub struct ThemeManager {
    current: Theme,
    store: Arc<dyn PreferenceStore>,
}

impl ThemeManager {
    /// Stored preference if present and valid, else `fallback`.
    #[instrument(level = "debug", skip(store))]
    pub fn load(store: Arc<dyn PreferenceStore>, fallback: Theme) -> Self {
        let current = match store.get(THEME_KEY) {
            Some(raw) => raw.parse::<Theme>().unwrap_or_else(|e| {
                warn!(error = %e, "Stored theme invalid, using {}", fallback.as_str());
                fallback
            }),
            None => {
                debug!("No stored theme, using {}", fallback.as_str());
                fallback
            }
        };
        info!(theme = current.as_str(), "Theme applied");
        Self { current, store }
    }

    /// First-run default taken from the terminal environment.
    pub fn detect(store: Arc<dyn PreferenceStore>) -> Self {
        let colorfgbg = std::env::var("COLORFGBG").ok();
        Self::load(store, Theme::from_colorfgbg(colorfgbg.as_deref()))
    }

    pub const fn current(&self) -> Theme {
        self.current
    }

    pub const fn palette(&self) -> &'static Palette {
        self.current.palette()
    }

    /// Flip and persist. A failed write keeps the new theme for this session.
    pub fn toggle(&mut self) -> Theme {
        self.current = self.current.toggled();
        if let Err(e) = self.store.set(THEME_KEY, self.current.as_str()) {
            warn!(error = %e, "Could not persist theme");
        }
        info!(theme = self.current.as_str(), "Theme toggled");
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::MemoryPreferenceStore;

    #[test]
    fn test_colorfgbg_detection() {
        assert_eq!(Theme::from_colorfgbg(Some("0;15")), Theme::Light);
        assert_eq!(Theme::from_colorfgbg(Some("0;default;7")), Theme::Light);
        assert_eq!(Theme::from_colorfgbg(Some("15;0")), Theme::Dark);
        assert_eq!(Theme::from_colorfgbg(Some("garbage")), Theme::Dark);
        assert_eq!(Theme::from_colorfgbg(None), Theme::Dark);
    }

    #[test]
    fn test_stored_preference_wins() {
        let store = Arc::new(MemoryPreferenceStore::new());
        store.set(THEME_KEY, "light").unwrap();

        let manager = ThemeManager::load(store, Theme::Dark);
        assert_eq!(manager.current(), Theme::Light);
        assert_eq!(manager.current().toggle_label(), "Dark Mode");
    }

    #[test]
    fn test_toggle_persists() {
        let store = Arc::new(MemoryPreferenceStore::new());
        let mut manager = ThemeManager::load(store.clone(), Theme::Dark);
        assert_eq!(manager.current().toggle_label(), "Light Mode");

        assert_eq!(manager.toggle(), Theme::Light);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("light"));
    }
}
