//! ``src/controller/router.rs``
//! ============================================================================
//! # Router: location path → Route
//!
//! The router wraps a [`Navigator`] (the in-process history stack) and turns
//! its current path into a [`Route`]. Programmatic navigation and history
//! back/forward both resolve through [`resolve_route`], so a path means the
//! same thing no matter how the user arrived at it.

use tracing::{debug, instrument, warn};

use crate::model::country::CountryCode;

pub const HOME_PATH: &str = "/";

/// Resolved application location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Detail(CountryCode),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Self::Home => HOME_PATH.to_string(),
            Self::Detail(code) => code.path(),
        }
    }

    pub const fn is_home(&self) -> bool {
        matches!(self, Self::Home)
    }
}

/// Map a path to a route. `None` means the path is malformed and the caller
/// should normalize to `/`.
///
/// Accepted: `/`, `/index.html`, and `/{code}` where `code` is exactly three
/// characters (uppercased for lookup).
pub fn resolve_route(path: &str) -> Option<Route> {
    match path {
        "" | HOME_PATH | "/index.html" => Some(Route::Home),
        _ => path
            .strip_prefix('/')
            .filter(|segment| !segment.contains(|c: char| c == '/' || c.is_whitespace()))
            .and_then(CountryCode::parse)
            .map(Route::Detail),
    }
}

/// Address-bar capability the router drives.
pub trait Navigator {
    /// Push a new entry; any forward history is discarded.
    fn push_path(&mut self, path: &str);

    fn current_path(&self) -> &str;

    /// Step back. Returns `false` at the oldest entry.
    fn go_back(&mut self) -> bool;

    /// Step forward. Returns `false` at the newest entry.
    fn go_forward(&mut self) -> bool;
}

/// In-memory history with a cursor, browser style.
#[derive(Debug, Clone)]
pub struct HistoryStack {
    entries: Vec<String>,
    cursor: usize,
}

impl HistoryStack {
    pub fn new(initial: &str) -> Self {
        Self {
            entries: vec![initial.to_string()],
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(HOME_PATH)
    }
}

impl Navigator for HistoryStack {
    fn push_path(&mut self, path: &str) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(path.to_string());
        self.cursor = self.entries.len() - 1;
    }

    fn current_path(&self) -> &str {
        &self.entries[self.cursor]
    }

    fn go_back(&mut self) -> bool {
        if self.can_go_back() {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    fn go_forward(&mut self) -> bool {
        if self.can_go_forward() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }
}

pub struct Router<N: Navigator = HistoryStack> {
    navigator: N,
}

impl<N: Navigator> Router<N> {
    pub fn new(navigator: N) -> Self {
        Self { navigator }
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn current_path(&self) -> &str {
        self.navigator.current_path()
    }

    /// Push `path` and dispatch it.
    #[instrument(level = "debug", skip(self))]
    pub fn navigate(&mut self, path: &str) -> Route {
        self.navigator.push_path(path);
        self.handle_route()
    }

    /// Resolve the navigator's current path. Malformed paths push `/`, which
    /// always resolves, so the recursion ends after one step.
    pub fn handle_route(&mut self) -> Route {
        let path = self.navigator.current_path().to_string();
        match resolve_route(&path) {
            Some(route) => {
                debug!(%path, ?route, "Route resolved");
                route
            }
            None => {
                warn!(%path, "Malformed path, redirecting home");
                self.navigate(HOME_PATH)
            }
        }
    }

    /// History back. `None` when there is nowhere to go.
    pub fn back(&mut self) -> Option<Route> {
        self.navigator.go_back().then(|| self.handle_route())
    }

    /// History forward. `None` when there is nowhere to go.
    pub fn forward(&mut self) -> Option<Route> {
        self.navigator.go_forward().then(|| self.handle_route())
    }
}

impl Default for Router<HistoryStack> {
    fn default() -> Self {
        Self::new(HistoryStack::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(code: &str) -> Route {
        Route::Detail(CountryCode::from(code))
    }

    #[test]
    fn test_resolve_route() {
        assert_eq!(resolve_route("/"), Some(Route::Home));
        assert_eq!(resolve_route("/index.html"), Some(Route::Home));
        assert_eq!(resolve_route("/FRA"), Some(detail("FRA")));
        assert_eq!(resolve_route("/fra"), Some(detail("FRA")));
        assert_eq!(resolve_route("/xy"), None);
        assert_eq!(resolve_route("/FRAN"), None);
        assert_eq!(resolve_route("/FRA/extra"), None);
        assert_eq!(resolve_route("/a/b"), None);
        assert_eq!(resolve_route("FRA"), None);
    }

    #[test]
    fn test_navigate_normalizes_malformed_paths() {
        let mut router: Router = Router::default();

        assert_eq!(router.navigate("/xy"), Route::Home);
        assert_eq!(router.current_path(), "/");
        // "/" then "/xy" then the redirect to "/"
        assert_eq!(router.navigator().len(), 3);
    }

    #[test]
    fn test_back_and_forward_use_same_resolution() {
        let mut router: Router = Router::default();
        router.navigate("/FRA");
        router.navigate("/deu");

        assert_eq!(router.back(), Some(detail("FRA")));
        assert_eq!(router.back(), Some(Route::Home));
        assert_eq!(router.back(), None);
        assert_eq!(router.forward(), Some(detail("FRA")));
        assert_eq!(router.forward(), Some(detail("DEU")));
        assert_eq!(router.forward(), None);
    }

    #[test]
    fn test_push_discards_forward_history() {
        let mut history = HistoryStack::default();
        history.push_path("/FRA");
        history.push_path("/DEU");
        assert!(history.go_back());
        history.push_path("/JPN");

        assert_eq!(history.current_path(), "/JPN");
        assert!(!history.can_go_forward());
        assert_eq!(history.len(), 3);
    }
}
