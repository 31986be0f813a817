use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use taskkit_model::Ttl;
use tokio::time::Instant;

use super::key::CacheKey;

/// In-memory keyed entry storage with a ttl policy.
///
/// Cloning yields another handle to the same entries.
pub(crate) struct Store<V> {
    inner: Arc<RwLock<StoreInner<V>>>,
    ttl: Ttl,
}

struct StoreInner<V> {
    entries: HashMap<CacheKey, Entry<V>>,
}

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

impl<V> Clone for Store<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            ttl: self.ttl,
        }
    }
}

impl<V> Store<V> {
    pub fn new(ttl: Ttl) -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreInner {
                entries: HashMap::new(),
            })),
            ttl,
        }
    }

    pub fn ttl(&self) -> Ttl {
        self.ttl
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreInner<V>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreInner<V>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `value` under `key`, replacing any previous entry.
    pub fn insert(&self, key: CacheKey, value: V, now: Instant) {
        let mut inner = self.write();
        inner.entries.insert(
            key,
            Entry {
                value,
                stored_at: now,
            },
        );
    }

    /// Mutate the value stored under `key` in place, keeping its timestamp.
    pub fn modify(&self, key: &CacheKey, f: impl FnOnce(&mut V)) {
        let mut inner = self.write();
        if let Some(entry) = inner.entries.get_mut(key) {
            f(&mut entry.value);
        }
    }

    /// Remove the entry under `key`. Returns `true` if one existed.
    pub fn remove(&self, key: &CacheKey) -> bool {
        let mut inner = self.write();
        inner.entries.remove(key).is_some()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut inner = self.write();
        inner.entries.clear();
    }

    /// Drop entries that can no longer be reused at `now`. Returns how many were dropped.
    pub fn purge_expired(&self, now: Instant) -> usize {
        let ttl = self.ttl;
        let mut inner = self.write();

        let before = inner.entries.len();
        inner
            .entries
            .retain(|_, entry| ttl.is_live(entry.stored_at, now));
        before - inner.entries.len()
    }

    /// Number of recorded entries, expired ones included.
    pub fn len(&self) -> usize {
        let inner = self.read();
        inner.entries.len()
    }
}

impl<V: Clone> Store<V> {
    /// Live value under `key`, if any.
    pub fn lookup(&self, key: &CacheKey, now: Instant) -> Option<V> {
        let inner = self.read();
        inner
            .entries
            .get(key)
            .filter(|entry| self.ttl.is_live(entry.stored_at, now))
            .map(|entry| entry.value.clone())
    }

    /// Live value under `key`, or the value built by `make` and stored at `now`.
    ///
    /// `make` runs while the write lock is held, so for a vacant key exactly one caller builds the
    /// value. It must not call back into the same store.
    pub fn get_or_insert_with(&self, key: CacheKey, now: Instant, make: impl FnOnce() -> V) -> V {
        let mut inner = self.write();

        if let Some(entry) = inner.entries.get(&key)
            && self.ttl.is_live(entry.stored_at, now)
        {
            return entry.value.clone();
        }

        let value = make();
        inner.entries.insert(
            key,
            Entry {
                value: value.clone(),
                stored_at: now,
            },
        );
        value
    }
}
