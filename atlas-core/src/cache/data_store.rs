//! `src/cache/data_store.rs`
//! ============================================================================
//! # DataStore: the session's country collection
//!
//! Holds the bulk listing behind an `ArcSwap`, so readers always see either
//! the previous collection or the complete new one. Only [`DataStore::load_all`]
//! and [`DataStore::reload`] write it, and at most one bulk fetch runs at a
//! time.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use arc_swap::ArcSwap;
use indexmap::IndexMap;
use tracing::{debug, info, instrument, warn};

use crate::{
    api::client::CountryApi,
    cache::cache_manager::NameCache,
    config::CacheConfig,
    error::{FetchError, ResolutionError},
    model::country::{Country, CountryCode},
};

/// What a call to [`DataStore::load_all`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A request was made and the collection replaced.
    Fetched(usize),
    /// The collection was already populated; nothing was requested.
    Cached(usize),
    /// Another bulk fetch is outstanding; nothing was requested.
    InFlight,
}

/// Clears the in-flight flag when the fetch future finishes or is dropped.
struct FetchingGuard<'a>(&'a AtomicBool);

impl Drop for FetchingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct DataStore {
    api: Arc<dyn CountryApi>,
    collection: ArcSwap<Vec<Country>>,
    fetching: AtomicBool,
    names: NameCache,
}

impl DataStore {
    pub fn new(api: Arc<dyn CountryApi>, cache_config: CacheConfig) -> Self {
        Self {
            api,
            collection: ArcSwap::from_pointee(Vec::new()),
            fetching: AtomicBool::new(false),
            names: NameCache::with_config(cache_config),
        }
    }

    /// Current collection snapshot. Empty until the first successful fetch.
    pub fn collection(&self) -> Arc<Vec<Country>> {
        self.collection.load_full()
    }

    pub fn is_populated(&self) -> bool {
        !self.collection.load().is_empty()
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching.load(Ordering::Acquire)
    }

    pub fn names(&self) -> &NameCache {
        &self.names
    }

    /// Fetch the bulk listing unless it is already loaded or being loaded.
    pub async fn load_all(&self) -> Result<LoadOutcome, FetchError> {
        let loaded = self.collection.load().len();
        if loaded > 0 {
            return Ok(LoadOutcome::Cached(loaded));
        }
        self.fetch_collection().await
    }

    /// Fetch the bulk listing even if one is loaded. On failure the previous
    /// collection stays in place.
    pub async fn reload(&self) -> Result<LoadOutcome, FetchError> {
        self.fetch_collection().await
    }

    #[instrument(level = "info", skip(self))]
    async fn fetch_collection(&self) -> Result<LoadOutcome, FetchError> {
        if self
            .fetching
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Bulk fetch already in flight, skipping");
            return Ok(LoadOutcome::InFlight);
        }
        let _guard = FetchingGuard(&self.fetching);

        match self.api.fetch_all().await {
            Ok(mut countries) => {
                let mut seen = HashSet::with_capacity(countries.len());
                countries.retain(|c| seen.insert(c.code.clone()));

                let count = countries.len();
                self.collection.store(Arc::new(countries));
                info!(count, "Country collection loaded");
                Ok(LoadOutcome::Fetched(count))
            }
            Err(e) => {
                warn!(error = %e, "Bulk country fetch failed");
                Err(e)
            }
        }
    }

    pub fn find_by_code(&self, code: &str) -> Option<Country> {
        self.collection
            .load()
            .iter()
            .find(|c| c.code.as_str().eq_ignore_ascii_case(code))
            .cloned()
    }

    /// Single-country detail lookup.
    pub async fn fetch_detail(&self, code: &CountryCode) -> Result<Country, FetchError> {
        self.api.fetch_detail(code).await
    }

    /// Display names for `codes`, in input order.
    ///
    /// Uses the loaded collection when there is one; otherwise the name cache
    /// and then one batch request for whatever is missing. Any code that
    /// cannot be resolved maps to itself. Never fails.
    #[instrument(level = "debug", skip_all, fields(count = codes.len()))]
    pub async fn resolve_names(&self, codes: &[CountryCode]) -> IndexMap<CountryCode, String> {
        if codes.is_empty() {
            return IndexMap::new();
        }

        let collection = self.collection.load_full();
        if !collection.is_empty() {
            return codes
                .iter()
                .map(|code| {
                    let name = collection
                        .iter()
                        .find(|c| &c.code == code)
                        .map_or_else(|| code.to_string(), |c| c.common_name().to_string());
                    (code.clone(), name)
                })
                .collect();
        }

        let (cached, missing) = self.names.get_many(codes).await;
        let mut resolved: HashMap<CountryCode, String> = cached
            .into_iter()
            .map(|(code, name)| (code, name.to_string()))
            .collect();

        if !missing.is_empty() {
            match self.api.fetch_names(&missing).await {
                Ok(entries) => {
                    for entry in entries {
                        self.names.insert(entry.code.clone(), &entry.name.common).await;
                        resolved.insert(entry.code, entry.name.common);
                    }
                }
                Err(source) => {
                    let err = ResolutionError::new(&missing, source);
                    warn!(error = %err, "Border name lookup failed, showing raw codes");
                }
            }
        }

        codes
            .iter()
            .map(|code| {
                let name = resolved
                    .get(code)
                    .cloned()
                    .unwrap_or_else(|| code.to_string());
                (code.clone(), name)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::scripted::ScriptedApi;
    use crate::model::country::fixtures::country;

    fn store_with(api: Arc<ScriptedApi>) -> DataStore {
        DataStore::new(api, CacheConfig::default())
    }

    fn world() -> Vec<Country> {
        vec![
            country("FRA", "France", "Europe"),
            country("DEU", "Germany", "Europe"),
            country("FRA", "France (duplicate)", "Europe"),
        ]
    }

    fn codes(raw: &[&str]) -> Vec<CountryCode> {
        raw.iter().map(|c| CountryCode::from(*c)).collect()
    }

    #[tokio::test]
    async fn test_load_all_fetches_once() {
        let api = Arc::new(ScriptedApi::new(world()));
        let store = store_with(api.clone());

        assert_eq!(store.load_all().await, Ok(LoadOutcome::Fetched(2)));
        assert_eq!(store.load_all().await, Ok(LoadOutcome::Cached(2)));
        assert_eq!(api.all_calls(), 1);
        assert_eq!(store.find_by_code("fra").unwrap().name.common, "France");
        assert!(!store.is_fetching());
    }

    #[tokio::test]
    async fn test_concurrent_load_is_skipped() {
        let api = Arc::new(ScriptedApi::new(world()));
        let gate = api.hold_all();
        let store = Arc::new(store_with(api.clone()));

        let first = tokio::spawn({
            let store = store.clone();
            async move { store.load_all().await }
        });
        while api.all_calls() == 0 {
            tokio::task::yield_now().await;
        }

        assert!(store.is_fetching());
        assert_eq!(store.load_all().await, Ok(LoadOutcome::InFlight));

        gate.notify_one();
        assert_eq!(first.await.unwrap(), Ok(LoadOutcome::Fetched(2)));
        assert_eq!(api.all_calls(), 1);
        assert!(!store.is_fetching());
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_collection() {
        let api = Arc::new(ScriptedApi::new(world()));
        let store = store_with(api.clone());
        store.load_all().await.unwrap();

        api.set_fail_all(true);
        assert!(store.reload().await.is_err());
        assert_eq!(store.collection().len(), 2);
        assert!(!store.is_fetching());
    }

    #[tokio::test]
    async fn test_failed_first_load_leaves_store_empty() {
        let api = Arc::new(ScriptedApi::new(world()));
        api.set_fail_all(true);
        let store = store_with(api.clone());

        assert!(store.load_all().await.is_err());
        assert!(!store.is_populated());

        api.set_fail_all(false);
        assert_eq!(store.load_all().await, Ok(LoadOutcome::Fetched(2)));
    }

    #[tokio::test]
    async fn test_resolve_names_uses_loaded_collection() {
        let api = Arc::new(ScriptedApi::new(world()));
        let store = store_with(api.clone());
        store.load_all().await.unwrap();

        let names = store.resolve_names(&codes(&["DEU", "XXX"])).await;
        assert_eq!(names[&CountryCode::from("DEU")], "Germany");
        assert_eq!(names[&CountryCode::from("XXX")], "XXX");
        assert_eq!(api.names_calls(), 0);
    }

    #[tokio::test]
    async fn test_resolve_names_batches_and_caches() {
        let api = Arc::new(ScriptedApi::new(world()));
        let store = store_with(api.clone());

        let names = store.resolve_names(&codes(&["DEU", "FRA"])).await;
        assert_eq!(
            names.values().cloned().collect::<Vec<_>>(),
            ["Germany", "France"]
        );

        store.resolve_names(&codes(&["FRA"])).await;
        assert_eq!(api.names_calls(), 1);
    }

    #[tokio::test]
    async fn test_resolve_names_degrades_to_codes() {
        let api = Arc::new(ScriptedApi::new(world()));
        api.set_fail_names(true);
        let store = store_with(api.clone());

        let names = store.resolve_names(&codes(&["XXX"])).await;
        assert_eq!(names.len(), 1);
        assert_eq!(names[&CountryCode::from("XXX")], "XXX");

        // failures are not cached
        api.set_fail_names(false);
        store.resolve_names(&codes(&["DEU"])).await;
        assert_eq!(api.names_calls(), 2);
    }
}
