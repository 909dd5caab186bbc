//! ``src/model/session_state.rs``
//! ============================================================================
//! # SessionState
//!
//! Everything the user has chosen during this session that affects what the
//! views show. Only `AppController` mutates it.

use crate::{
    controller::router::Route,
    error::FetchError,
    model::{country::Region, filter::normalize_query},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Trimmed, lowercased search text.
    pub search_query: String,
    pub selected_region: Region,
    /// A bulk fetch started by this session is outstanding.
    pub is_fetching: bool,
    /// Failure of the most recent bulk fetch, cleared when a new one starts.
    pub home_error: Option<FetchError>,
    pub current_route: Route,
    /// Bumped on every route change; task results carrying an older value
    /// are discarded.
    pub generation: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            search_query: String::new(),
            selected_region: Region::All,
            is_fetching: false,
            home_error: None,
            current_route: Route::Home,
            generation: 0,
        }
    }

    /// Store `raw` normalized. Returns whether the stored query changed.
    pub fn set_search_query(&mut self, raw: &str) -> bool {
        let normalized = normalize_query(raw);
        if normalized == self.search_query {
            return false;
        }
        self.search_query = normalized;
        true
    }

    pub fn set_region(&mut self, region: Region) -> bool {
        if region == self.selected_region {
            return false;
        }
        self.selected_region = region;
        true
    }

    /// Switch to `route` and return the new generation.
    pub fn enter_route(&mut self, route: Route) -> u64 {
        self.current_route = route;
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    pub fn is_current_generation(&self, generation: u64) -> bool {
        self.generation == generation
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::country::CountryCode;

    #[test]
    fn test_search_query_is_normalized() {
        let mut session = SessionState::new();
        assert!(session.set_search_query("  FrA "));
        assert_eq!(session.search_query, "fra");
        assert!(!session.set_search_query("fra"));
    }

    #[test]
    fn test_enter_route_bumps_generation() {
        let mut session = SessionState::new();
        let first = session.enter_route(Route::Detail(CountryCode::from("AAA")));
        let second = session.enter_route(Route::Detail(CountryCode::from("BBB")));

        assert!(second > first);
        assert!(!session.is_current_generation(first));
        assert!(session.is_current_generation(second));
    }
}
