//! ``src/view/tree.rs``
//! ============================================================================
//! # Retained view tree
//!
//! The Home and Detail renderers do not paint; they build [`ViewNode`]s into
//! a [`ViewContainer`] and the terminal painter draws whatever is there.
//! Activation targets carry their [`Activation`] inside the node, so
//! replacing a container's nodes also drops every handler the previous
//! render registered.

use crate::{
    error::FetchError,
    model::country::{Country, CountryCode, Region},
    util::humanize::format_population,
};

/// What activating a target asks for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Activation {
    /// Open a country's detail route.
    ShowCountry(CountryCode),
    /// Return to the list.
    GoHome,
    /// Header control.
    ToggleTheme,
    OpenRegionPicker,
    /// A row of the region picker.
    PickRegion(Region),
}

/// Receiver of activations (mouse click, Enter, Space).
pub trait ActivationHandler {
    fn on_activate(&mut self, activation: &Activation);
}

/// Status of one top-level view. One value at a time, so loading, error and
/// empty states cannot overlap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ViewStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    /// Data loaded, nothing matched.
    Empty,
    Failed(String),
}

impl ViewStatus {
    pub fn failed(err: &FetchError) -> Self {
        Self::Failed(err.user_message().to_string())
    }

    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// One summary card on the Home grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryCard {
    pub code: CountryCode,
    pub flag: String,
    pub name: String,
    pub population: String,
    pub region: String,
    pub capital: String,
}

impl CountryCard {
    pub fn from_country(country: &Country) -> Self {
        Self {
            code: country.code.clone(),
            flag: country
                .flag
                .clone()
                .unwrap_or_else(|| country.code.to_string()),
            name: country.common_name().to_string(),
            population: format_population(country.population),
            region: country.region.clone(),
            capital: country.capital_label().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewNode {
    Card(CountryCard),
    Heading(String),
    Field { label: &'static str, value: String },
    /// Labelled activation target: back button, border-country tag.
    Link { label: String, activation: Activation },
}

impl ViewNode {
    pub fn field(label: &'static str, value: impl Into<String>) -> Self {
        Self::Field {
            label,
            value: value.into(),
        }
    }

    pub fn link(label: impl Into<String>, activation: Activation) -> Self {
        Self::Link {
            label: label.into(),
            activation,
        }
    }

    pub fn activation(&self) -> Option<Activation> {
        match self {
            Self::Card(card) => Some(Activation::ShowCountry(card.code.clone())),
            Self::Link { activation, .. } => Some(activation.clone()),
            Self::Heading(_) | Self::Field { .. } => None,
        }
    }

    pub fn is_target(&self) -> bool {
        matches!(self, Self::Card(_) | Self::Link { .. })
    }
}

/// Nodes of one top-level view plus its status and keyboard focus.
#[derive(Debug, Clone, Default)]
pub struct ViewContainer {
    status: ViewStatus,
    nodes: Vec<ViewNode>,
    /// Index into the activation targets, not into `nodes`.
    focus: usize,
    renders: u64,
}

impl ViewContainer {
    pub fn status(&self) -> &ViewStatus {
        &self.status
    }

    pub fn nodes(&self) -> &[ViewNode] {
        &self.nodes
    }

    /// How many times content was replaced.
    pub const fn renders(&self) -> u64 {
        self.renders
    }

    /// Swap in new content. The previous nodes, and with them every
    /// activation they carried, are dropped.
    pub fn replace(&mut self, status: ViewStatus, nodes: Vec<ViewNode>) {
        self.status = status;
        self.nodes = nodes;
        self.renders += 1;
        self.clamp_focus();
    }

    /// Clear content and status, as at the start of a request cycle.
    pub fn reset(&mut self, status: ViewStatus) {
        self.replace(status, Vec::new());
        self.focus = 0;
    }

    pub fn targets(&self) -> impl Iterator<Item = &ViewNode> {
        self.nodes.iter().filter(|n| n.is_target())
    }

    pub fn target_count(&self) -> usize {
        self.targets().count()
    }

    pub const fn focus(&self) -> usize {
        self.focus
    }

    pub fn set_focus(&mut self, index: usize) {
        self.focus = index;
        self.clamp_focus();
    }

    /// Move focus by `delta` targets, stopping at either end.
    pub fn move_focus(&mut self, delta: isize) {
        let count = self.target_count();
        if count == 0 {
            self.focus = 0;
            return;
        }
        self.focus = self.focus.saturating_add_signed(delta).min(count - 1);
    }

    pub fn focused_activation(&self) -> Option<Activation> {
        self.targets().nth(self.focus).and_then(ViewNode::activation)
    }

    /// Fire the focused target at `handler`. Returns whether anything fired.
    pub fn activate_focused(&self, handler: &mut dyn ActivationHandler) -> bool {
        match self.focused_activation() {
            Some(activation) => {
                handler.on_activate(&activation);
                true
            }
            None => false,
        }
    }

    fn clamp_focus(&mut self) {
        let count = self.target_count();
        self.focus = if count == 0 { 0 } else { self.focus.min(count - 1) };
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewKind {
    #[default]
    Home,
    Detail,
}

/// Both top-level views; exactly one is visible.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    pub home: ViewContainer,
    pub detail: ViewContainer,
    visible: ViewKind,
}

impl Surface {
    pub const fn visible(&self) -> ViewKind {
        self.visible
    }

    pub fn show(&mut self, kind: ViewKind) {
        self.visible = kind;
    }

    pub fn is_visible(&self, kind: ViewKind) -> bool {
        self.visible == kind
    }

    pub fn active(&self) -> &ViewContainer {
        match self.visible {
            ViewKind::Home => &self.home,
            ViewKind::Detail => &self.detail,
        }
    }

    pub fn active_mut(&mut self) -> &mut ViewContainer {
        match self.visible {
            ViewKind::Home => &mut self.home,
            ViewKind::Detail => &mut self.detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<Activation>);

    impl ActivationHandler for Recorder {
        fn on_activate(&mut self, activation: &Activation) {
            self.0.push(activation.clone());
        }
    }

    fn link(code: &str) -> ViewNode {
        ViewNode::link(code, Activation::ShowCountry(CountryCode::from(code)))
    }

    #[test]
    fn test_focus_skips_non_targets() {
        let mut view = ViewContainer::default();
        view.replace(
            ViewStatus::Ready,
            vec![
                ViewNode::Heading("Borders".into()),
                link("FRA"),
                ViewNode::field("Region", "Europe"),
                link("DEU"),
            ],
        );

        view.move_focus(1);
        let mut recorder = Recorder::default();
        assert!(view.activate_focused(&mut recorder));
        assert_eq!(
            recorder.0,
            vec![Activation::ShowCountry(CountryCode::from("DEU"))]
        );

        view.move_focus(5);
        assert_eq!(view.focus(), 1);
        view.move_focus(-5);
        assert_eq!(view.focus(), 0);
    }

    #[test]
    fn test_replace_drops_previous_targets() {
        let mut view = ViewContainer::default();
        view.replace(ViewStatus::Ready, vec![link("FRA"), link("DEU")]);
        view.set_focus(1);

        view.replace(ViewStatus::Ready, vec![link("JPN")]);
        assert_eq!(view.target_count(), 1);
        assert_eq!(view.focus(), 0);
        assert_eq!(
            view.focused_activation(),
            Some(Activation::ShowCountry(CountryCode::from("JPN")))
        );

        view.reset(ViewStatus::Loading);
        let mut recorder = Recorder::default();
        assert!(!view.activate_focused(&mut recorder));
        assert!(recorder.0.is_empty());
        assert_eq!(view.renders(), 3);
    }
}
