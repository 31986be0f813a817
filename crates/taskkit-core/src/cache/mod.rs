//! Keyed memoization with a ttl policy.
//!
//! Both wrappers key entries by the structural digest of the argument list ([`cache_key`]) and
//! reuse an entry while [`Ttl::is_live`] holds:
//! - [`CachedFn`] wraps a synchronous function and stores its return value;
//! - [`CachedAsync`] wraps an async function. While a call is pending, identical calls share the one
//!   in-flight future. Once it resolves, the entry collapses to the resolved value and keeps its
//!   first timestamp.
//!
//! Caches are explicit objects: they live as long as the caller keeps them and share nothing
//! with other instances.
mod key;
mod store;

pub use key::{CacheKey, cache_key};

use std::future::Future;

use futures::FutureExt;
use futures::future::Shared;
use serde::Serialize;
use taskkit_model::Ttl;
use tokio::time::Instant;
use tracing::trace;

use crate::error::CoreError;
use store::Store;

/// Keyed memoizer for a synchronous function.
pub struct CachedFn<F, R> {
    func: F,
    store: Store<R>,
}

/// Wrap `func` in a [`CachedFn`] with the given ttl policy.
pub fn cached<F, A, R>(func: F, ttl: impl Into<Ttl>) -> CachedFn<F, R>
where
    F: Fn(A) -> R,
    A: Serialize,
    R: Clone,
{
    CachedFn::new(func, ttl)
}

impl<F, R: Clone> CachedFn<F, R> {
    pub fn new(func: F, ttl: impl Into<Ttl>) -> Self {
        Self {
            func,
            store: Store::new(ttl.into()),
        }
    }

    /// Return the live cached value for `args`, or invoke the function and record its result.
    pub fn call<A>(&self, args: A) -> Result<R, CoreError>
    where
        F: Fn(A) -> R,
        A: Serialize,
    {
        let key = cache_key(&args)?;
        let now = Instant::now();

        if let Some(value) = self.store.lookup(&key, now) {
            trace!(target: "taskkit_core::cache", %key, "cache hit");
            return Ok(value);
        }

        trace!(target: "taskkit_core::cache", %key, "cache miss");
        let value = (self.func)(args);
        self.store.insert(key, value.clone(), now);
        Ok(value)
    }

    /// Drop the entry recorded for `args`. Returns `true` if one existed.
    pub fn invalidate<A: Serialize + ?Sized>(&self, args: &A) -> Result<bool, CoreError> {
        Ok(self.store.remove(&cache_key(args)?))
    }

    /// Drop entries that can no longer be reused. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        self.store.purge_expired(Instant::now())
    }

    pub fn clear(&self) {
        self.store.clear()
    }

    /// Number of recorded entries, expired ones included.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ttl(&self) -> Ttl {
        self.store.ttl()
    }
}

/// Cache slot of an async call: either still in flight or resolved.
enum Slot<Fut: Future> {
    Pending(Shared<Fut>),
    Ready(Fut::Output),
}

impl<Fut> Clone for Slot<Fut>
where
    Fut: Future,
    Fut::Output: Clone,
{
    fn clone(&self) -> Self {
        match self {
            Slot::Pending(shared) => Slot::Pending(shared.clone()),
            Slot::Ready(value) => Slot::Ready(value.clone()),
        }
    }
}

/// Keyed memoizer for an async function.
pub struct CachedAsync<F, Fut: Future> {
    func: F,
    store: Store<Slot<Fut>>,
}

/// Wrap `func` in a [`CachedAsync`] with the given ttl policy.
pub fn cached_async<F, A, Fut>(func: F, ttl: impl Into<Ttl>) -> CachedAsync<F, Fut>
where
    F: Fn(A) -> Fut,
    A: Serialize,
    Fut: Future,
    Fut::Output: Clone,
{
    CachedAsync::new(func, ttl)
}

impl<F, Fut> CachedAsync<F, Fut>
where
    Fut: Future,
    Fut::Output: Clone,
{
    pub fn new(func: F, ttl: impl Into<Ttl>) -> Self {
        Self {
            func,
            store: Store::new(ttl.into()),
        }
    }

    /// Return a future for the call with `args`.
    ///
    /// A live resolved entry resolves immediately, and a live pending entry is shared.
    /// Otherwise the function is invoked and its future is recorded before being returned.
    /// The invocation happens under the cache lock, so racing misses on the same key invoke the
    /// function once; the function must not call back into this cache.
    pub fn call<A>(&self, args: A) -> Result<impl Future<Output = Fut::Output>, CoreError>
    where
        F: Fn(A) -> Fut,
        A: Serialize,
    {
        let key = cache_key(&args)?;
        let now = Instant::now();

        let slot = match self.store.lookup(&key, now) {
            Some(slot) => {
                trace!(target: "taskkit_core::cache", %key, "cache hit");
                slot
            }
            None => self.store.get_or_insert_with(key.clone(), now, || {
                trace!(target: "taskkit_core::cache", %key, "cache miss");
                Slot::Pending((self.func)(args).shared())
            }),
        };

        let store = self.store.clone();
        Ok(async move {
            match slot {
                Slot::Ready(value) => value,
                Slot::Pending(shared) => {
                    let value = shared.clone().await;
                    store.modify(&key, |slot| {
                        if let Slot::Pending(current) = &*slot
                            && current.ptr_eq(&shared)
                        {
                            *slot = Slot::Ready(value.clone());
                        }
                    });
                    value
                }
            }
        })
    }

    /// Drop the entry recorded for `args`. Returns `true` if one existed.
    pub fn invalidate<A: Serialize + ?Sized>(&self, args: &A) -> Result<bool, CoreError> {
        Ok(self.store.remove(&cache_key(args)?))
    }

    /// Drop entries that can no longer be reused. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        self.store.purge_expired(Instant::now())
    }

    pub fn clear(&self) {
        self.store.clear()
    }

    /// Number of recorded entries, expired ones included.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ttl(&self) -> Ttl {
        self.store.ttl()
    }

    #[cfg(test)]
    fn is_pending<A: Serialize>(&self, args: &A) -> bool {
        let key = cache_key(args).unwrap();
        matches!(
            self.store.lookup(&key, Instant::now()),
            Some(Slot::Pending(_))
        )
    }
}
