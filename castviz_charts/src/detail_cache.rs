// Copyright 2025 the Castviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyed cache for fire-and-forget detail fetches (e.g. episode details for a selected cell).
//!
//! A key is fetched at most once: `request` only calls the fetcher when the key is absent, and
//! failures are remembered as [`DetailEntry::Unavailable`] rather than retried.

use core::fmt::Display;
use core::hash::Hash;

use hashbrown::HashMap;
use tracing::{debug, warn};

/// State of one cached key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DetailEntry<T> {
    /// A fetch is in flight.
    Pending,
    /// The fetch succeeded.
    Ready(T),
    /// The fetch failed; the key is not fetched again unless retried explicitly.
    Unavailable,
}

/// Keyed detail cache.
#[derive(Clone, Debug)]
pub struct DetailCache<K, T> {
    entries: HashMap<K, DetailEntry<T>>,
}

impl<K, T> Default for DetailCache<K, T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone + core::fmt::Debug, T> DetailCache<K, T> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a key.
    pub fn get(&self, key: &K) -> Option<&DetailEntry<T>> {
        self.entries.get(key)
    }

    /// Returns the value for `key` if it is ready.
    pub fn ready(&self, key: &K) -> Option<&T> {
        match self.entries.get(key) {
            Some(DetailEntry::Ready(v)) => Some(v),
            _ => None,
        }
    }

    /// Number of known keys, in any state.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no key was ever requested.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Starts a fetch for `key` unless the key is already pending, ready or unavailable.
    ///
    /// Returns `true` if `fetch` was called.
    pub fn request(&mut self, key: K, fetch: impl FnOnce(&K)) -> bool {
        if self.entries.contains_key(&key) {
            return false;
        }
        debug!(?key, "fetching detail");
        fetch(&key);
        self.entries.insert(key, DetailEntry::Pending);
        true
    }

    /// Merges a fetch result.
    ///
    /// Results for keys that are not pending (never requested, or already settled) are dropped.
    pub fn complete<E: Display>(&mut self, key: &K, result: Result<T, E>) {
        let Some(entry) = self.entries.get_mut(key) else {
            debug!(?key, "dropping result for unrequested key");
            return;
        };
        if !matches!(entry, DetailEntry::Pending) {
            return;
        }
        *entry = match result {
            Ok(value) => DetailEntry::Ready(value),
            Err(err) => {
                warn!(?key, error = %err, "detail fetch failed");
                DetailEntry::Unavailable
            }
        };
    }

    /// Re-requests an unavailable key. Returns `true` if `fetch` was called.
    pub fn retry(&mut self, key: &K, fetch: impl FnOnce(&K)) -> bool {
        match self.entries.get_mut(key) {
            Some(entry @ DetailEntry::Unavailable) => {
                fetch(key);
                *entry = DetailEntry::Pending;
                true
            }
            _ => false,
        }
    }
}
