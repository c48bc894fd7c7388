// keydrop/src/keys.rs
// License key pool fetch & allocation

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use reqwest::{header, Client};

use crate::error::{FulfillmentError, Result};
use crate::order::ProductCategory;

/// Case-sensitive token that marks masterclass keys in the pool
pub const MASTERCLASS_KEY_MARKER: &str = "Masterclass";

// ═══════════════════════════════════════════════════════════════════════════════
// KEY POOL SOURCE
// ═══════════════════════════════════════════════════════════════════════════════

#[async_trait]
pub trait KeySource: Send + Sync {
    /// Full pool in its original line order
    async fn fetch_keys(&self) -> Result<Vec<String>>;
}

/// Split a newline-delimited key list, trimming and dropping blank lines.
pub fn parse_key_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Plain-text key list served over HTTPS, re-fetched on every claim.
pub struct HttpKeySource {
    url: String,
    http_client: Client,
}

impl HttpKeySource {
    pub fn new(url: impl Into<String>, http_client: Client) -> Self {
        Self {
            url: url.into(),
            http_client,
        }
    }
}

#[async_trait]
impl KeySource for HttpKeySource {
    async fn fetch_keys(&self) -> Result<Vec<String>> {
        let resp = self
            .http_client
            .get(&self.url)
            .header(header::CACHE_CONTROL, "no-cache, no-store")
            .header(header::PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| FulfillmentError::Fetch(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(FulfillmentError::Fetch(format!("status {}", resp.status())));
        }

        let text = resp
            .text()
            .await
            .map_err(|e| FulfillmentError::Fetch(e.to_string()))?;

        Ok(parse_key_list(&text))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// KEY ALLOCATOR
// ═══════════════════════════════════════════════════════════════════════════════

/// How concurrent claims are serialized against the used-key set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClaimMode {
    /// Scan and record under one lock: a key is handed out at most once.
    #[default]
    Atomic,
    /// Read the used set up front, record after the fetch. Overlapping
    /// claims can hand out the same key twice.
    Unguarded,
}

impl ClaimMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "atomic" => Some(ClaimMode::Atomic),
            "unguarded" => Some(ClaimMode::Unguarded),
            _ => None,
        }
    }
}

pub fn key_matches(key: &str, category: ProductCategory) -> bool {
    let marked = key.contains(MASTERCLASS_KEY_MARKER);
    match category {
        ProductCategory::Masterclass => marked,
        ProductCategory::Standard => !marked,
    }
}

fn first_unused(keys: &[String], category: ProductCategory, used: &HashSet<String>) -> Option<String> {
    keys.iter()
        .filter(|k| key_matches(k, category))
        .find(|k| !used.contains(k.as_str()))
        .cloned()
}

/// Hands out pool keys, remembering every key issued in this process.
pub struct KeyAllocator {
    source: Arc<dyn KeySource>,
    used: Mutex<HashSet<String>>,
    mode: ClaimMode,
}

impl KeyAllocator {
    pub fn new(source: Arc<dyn KeySource>, mode: ClaimMode) -> Self {
        Self {
            source,
            used: Mutex::new(HashSet::new()),
            mode,
        }
    }

    pub fn issued_count(&self) -> usize {
        self.used_keys().len()
    }

    pub fn is_issued(&self, key: &str) -> bool {
        self.used_keys().contains(key)
    }

    fn used_keys(&self) -> MutexGuard<'_, HashSet<String>> {
        // insert-only set: a poisoned guard still holds a consistent view
        self.used.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Claim the first unused pool key for `category`.
    pub async fn claim(&self, category: ProductCategory) -> Result<String> {
        let key = match self.mode {
            ClaimMode::Atomic => {
                let keys = self.source.fetch_keys().await?;
                let mut used = self.used_keys();
                let key = first_unused(&keys, category, &used);
                if let Some(key) = &key {
                    used.insert(key.clone());
                }
                key
            }
            ClaimMode::Unguarded => {
                let seen = self.used_keys().clone();
                let keys = self.source.fetch_keys().await?;
                let key = first_unused(&keys, category, &seen);
                if let Some(key) = &key {
                    self.used_keys().insert(key.clone());
                }
                key
            }
        };

        match key {
            Some(key) => {
                tracing::info!(?category, "[KEYS] issued key ({} issued so far)", self.issued_count());
                Ok(key)
            }
            None => {
                tracing::warn!(?category, "[KEYS] pool exhausted");
                Err(FulfillmentError::NoKeyAvailable { category })
            }
        }
    }
}
