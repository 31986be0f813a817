use thiserror::Error;

/// Failure to configure or install the global subscriber.
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown log format {0:?} (expected text or json)")]
    InvalidFormat(String),
    #[error("invalid log filter directive {0:?}")]
    InvalidLogLevel(String),
    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized,
    #[error("failed to install tracing subscriber: {0}")]
    InitializationFailed(String),
}
