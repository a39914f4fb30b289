//! In-memory collaborators for driving the selector end to end

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;

use release_query::release::cache::{CacheEntry, CacheKey, CacheStore};
use release_query::release::error::{CacheError, FetchError};
use release_query::release::fetcher::FeedFetcher;

/// Fetcher serving a fixed payload and recording requests
pub struct StaticFetcher {
    payload: Vec<u8>,
    calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedFetcher for &StaticFetcher {
    async fn fetch(&self, source_url: &str) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(source_url.to_string());
        Ok(self.payload.clone())
    }
}

/// Fetcher that must never be reached
pub struct UnreachableFetcher;

#[async_trait]
impl FeedFetcher for UnreachableFetcher {
    async fn fetch(&self, source_url: &str) -> Result<Vec<u8>, FetchError> {
        panic!("unexpected fetch of {}", source_url);
    }
}

/// Cache store backed by a map, counting every access
#[derive(Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<CacheKey, CacheEntry>>,
    accesses: Cell<usize>,
}

impl MemoryStore {
    pub fn with_entry(source: &str, payload: &[u8], stored_at: DateTime<Utc>) -> Self {
        let store = Self::default();
        let key = CacheKey::for_source(source);
        store.entries.borrow_mut().insert(
            key.clone(),
            CacheEntry {
                key,
                payload: payload.to_vec(),
                stored_at,
            },
        );
        store
    }

    pub fn entry(&self, source: &str) -> Option<CacheEntry> {
        self.entries
            .borrow()
            .get(&CacheKey::for_source(source))
            .cloned()
    }

    pub fn accesses(&self) -> usize {
        self.accesses.get()
    }

    fn touch(&self) {
        self.accesses.set(self.accesses.get() + 1);
    }
}

impl CacheStore for &MemoryStore {
    fn stored_at(&self, key: &CacheKey) -> Result<Option<DateTime<Utc>>, CacheError> {
        self.touch();
        Ok(self.entries.borrow().get(key).map(|entry| entry.stored_at))
    }

    fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError> {
        self.touch();
        Ok(self
            .entries
            .borrow()
            .get(key)
            .map(|entry| entry.payload.clone()))
    }

    fn put(&self, entry: &CacheEntry) -> Result<(), CacheError> {
        self.touch();
        self.entries
            .borrow_mut()
            .insert(entry.key.clone(), entry.clone());
        Ok(())
    }
}

/// Build a feed payload where each release carries the given asset file names
pub fn feed(releases: &[(&str, Vec<&str>)]) -> Vec<u8> {
    let releases: Vec<_> = releases
        .iter()
        .map(|(tag, files)| {
            let assets: Vec<_> = files
                .iter()
                .map(|file| {
                    json!({
                        "name": file,
                        "browser_download_url": asset_url(tag, file),
                    })
                })
                .collect();
            json!({ "tag_name": tag, "assets": assets })
        })
        .collect();
    serde_json::to_vec(&releases).unwrap()
}

pub fn asset_url(tag: &str, file: &str) -> String {
    format!("https://github.com/owner/app/releases/download/{}/{}", tag, file)
}
