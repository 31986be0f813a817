use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Expiry policy for keyed cache entries.
///
/// Serialized as optional milliseconds: `null` keeps entries forever, `0` disables reuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<u64>", into = "Option<u64>")]
pub enum Ttl {
    /// No ttl configured; entries never expire.
    #[default]
    Forever,
    /// Zero ttl; an entry is recorded but never reused.
    Never,
    /// Entries are reused while younger than the duration.
    For(Duration),
}

impl Ttl {
    /// Build a policy from an optional millisecond value.
    pub fn from_millis(ms: Option<u64>) -> Self {
        match ms {
            None => Ttl::Forever,
            Some(0) => Ttl::Never,
            Some(ms) => Ttl::For(Duration::from_millis(ms)),
        }
    }

    /// Returns `true` if an entry stored at `stored_at` may still be reused at `now`.
    ///
    /// Generic over the instant type so callers can pass either `std` or `tokio` instants.
    pub fn is_live<I>(&self, stored_at: I, now: I) -> bool
    where
        I: Into<Instant>,
    {
        match self {
            Ttl::Forever => true,
            Ttl::Never => false,
            Ttl::For(ttl) => now.into().saturating_duration_since(stored_at.into()) < *ttl,
        }
    }

    /// Optional milliseconds, the inverse of [`Ttl::from_millis`].
    ///
    /// Saturates at `u64::MAX`, and a non-zero duration never maps to `0`.
    pub fn as_millis(&self) -> Option<u64> {
        match self {
            Ttl::Forever => None,
            Ttl::Never => Some(0),
            Ttl::For(ttl) => Some(u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)),
        }
    }
}

impl From<Option<u64>> for Ttl {
    fn from(ms: Option<u64>) -> Self {
        Ttl::from_millis(ms)
    }
}

impl From<Ttl> for Option<u64> {
    fn from(ttl: Ttl) -> Self {
        ttl.as_millis()
    }
}

impl From<Duration> for Ttl {
    fn from(ttl: Duration) -> Self {
        if ttl.is_zero() {
            Ttl::Never
        } else {
            Ttl::For(ttl)
        }
    }
}
