use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to derive cache key: {0}")]
    Key(#[from] serde_json::Error),

    #[error("invalid run policy: {0}")]
    Policy(#[from] taskkit_model::ModelError),
}
