use serde::{Deserialize, Serialize};

use crate::{ModelError, TimeoutMs};

const DEFAULT_LIMIT: usize = 4;
const DEFAULT_RETRIES: u32 = 1;

/// Declarative policy for running a batch of tasks.
///
/// Every task is bounded by `timeout_ms` per attempt, retried up to `retries` extra times,
/// and at most `limit` tasks are in flight at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunPolicy {
    /// Maximum number of simultaneously in-flight tasks.
    pub limit: usize,
    /// Additional attempts after the first failure (total attempts = `retries + 1`).
    pub retries: u32,
    /// Per-attempt deadline.
    ///
    /// If `None`, attempts run until they settle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<TimeoutMs>,
}

impl RunPolicy {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: TimeoutMs) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Reject configurations the runner cannot honor.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.limit == 0 {
            return Err(ModelError::InvalidLimit(self.limit));
        }
        Ok(())
    }
}

impl Default for RunPolicy {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            retries: DEFAULT_RETRIES,
            timeout_ms: None,
        }
    }
}
