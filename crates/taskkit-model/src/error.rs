use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid concurrency limit: {0} (must be at least 1)")]
    InvalidLimit(usize),
}
