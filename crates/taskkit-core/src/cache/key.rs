use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::CoreError;

/// Structural digest of a call's argument list.
///
/// Two argument lists produce the same key iff they serialize to the same JSON value.
/// Position matters: `(1, 2)` and `(2, 1)` are different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the cache key for `args`.
///
/// Arguments go through `serde_json::Value` first so that map-like inputs hash the same
/// regardless of their iteration order.
pub fn cache_key<A>(args: &A) -> Result<CacheKey, CoreError>
where
    A: Serialize + ?Sized,
{
    let value = serde_json::to_value(args)?;
    let bytes = serde_json::to_vec(&value)?;
    Ok(CacheKey(hex::encode(Sha256::digest(&bytes))))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    use serde::Serialize;

    #[derive(Serialize)]
    struct Query<'a> {
        page: u32,
        tags: Vec<&'a str>,
    }

    #[test]
    fn structurally_equal_args_share_a_key() {
        let a = cache_key(&(1, "x", Query { page: 2, tags: vec!["a"] })).unwrap();
        let b = cache_key(&(1, "x", Query { page: 2, tags: vec!["a"] })).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn argument_order_matters() {
        assert_ne!(cache_key(&(1, 2)).unwrap(), cache_key(&(2, 1)).unwrap());
    }

    #[test]
    fn map_iteration_order_is_irrelevant() {
        let mut left = HashMap::new();
        let mut right = HashMap::new();
        for i in 0..32 {
            left.insert(format!("k{i}"), i);
        }
        for i in (0..32).rev() {
            right.insert(format!("k{i}"), i);
        }

        assert_eq!(cache_key(&left).unwrap(), cache_key(&right).unwrap());
    }

    #[test]
    fn unserializable_args_surface_as_key_error() {
        let mut bad = HashMap::new();
        bad.insert((1, 2), "tuple keys are not valid JSON object keys");

        assert!(matches!(cache_key(&bad), Err(CoreError::Key(_))));
    }
}
