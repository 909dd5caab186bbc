//! ``src/api/scripted.rs``
//! ============================================================================
//! # In-memory `CountryApi`
//!
//! Serves a fixed country list and lets the caller script failures and hold
//! responses back until released. Used by the test suites to drive the view
//! pipeline through loading, failure and out-of-order completion.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::api::client::CountryApi;
use crate::error::FetchError;
use crate::model::country::{Country, CountryCode, CountryNameEntry};

const GATE_ALL: &str = "*all*";

#[derive(Default)]
pub struct ScriptedApi {
    countries: Vec<Country>,
    fail_all: AtomicBool,
    fail_detail: AtomicBool,
    fail_names: AtomicBool,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    all_calls: AtomicUsize,
    detail_calls: AtomicUsize,
    names_calls: AtomicUsize,
}

impl ScriptedApi {
    pub fn new(countries: Vec<Country>) -> Self {
        Self {
            countries,
            ..Self::default()
        }
    }

    pub fn set_fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_detail(&self, fail: bool) {
        self.fail_detail.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_names(&self, fail: bool) {
        self.fail_names.store(fail, Ordering::SeqCst);
    }

    /// Hold the bulk listing until the returned handle is notified.
    pub fn hold_all(&self) -> Arc<Notify> {
        self.gate(GATE_ALL)
    }

    /// Hold the detail lookup for `code` until the returned handle is notified.
    pub fn hold_detail(&self, code: &str) -> Arc<Notify> {
        self.gate(code)
    }

    fn gate(&self, key: &str) -> Arc<Notify> {
        self.gates
            .lock()
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Notify::new()))
            .clone()
    }

    async fn wait_for(&self, key: &str) {
        let gate = self.gates.lock().get(key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    pub fn all_calls(&self) -> usize {
        self.all_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    pub fn names_calls(&self) -> usize {
        self.names_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CountryApi for ScriptedApi {
    async fn fetch_all(&self) -> Result<Vec<Country>, FetchError> {
        self.all_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_for(GATE_ALL).await;

        if self.fail_all.load(Ordering::SeqCst) {
            return Err(FetchError::status("/all", 500));
        }
        Ok(self.countries.clone())
    }

    async fn fetch_detail(&self, code: &CountryCode) -> Result<Country, FetchError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_for(code.as_str()).await;

        if self.fail_detail.load(Ordering::SeqCst) {
            return Err(FetchError::transport(format!("/alpha/{code}"), "connection reset"));
        }
        self.countries
            .iter()
            .find(|c| &c.code == code)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(code.to_string()))
    }

    async fn fetch_names(&self, codes: &[CountryCode]) -> Result<Vec<CountryNameEntry>, FetchError> {
        self.names_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_names.load(Ordering::SeqCst) {
            return Err(FetchError::transport("/alpha", "scripted failure"));
        }
        Ok(self
            .countries
            .iter()
            .filter(|c| codes.contains(&c.code))
            .map(|c| CountryNameEntry {
                code: c.code.clone(),
                name: c.name.clone(),
            })
            .collect())
    }
}
