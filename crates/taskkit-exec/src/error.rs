use std::time::Duration;

use thiserror::Error;

/// Failure of a wrapped task or of the wrapper itself.
///
/// `Task` carries the underlying task error unmodified; every other variant is produced by the wrapper.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecError<E> {
    #[error("{message}")]
    Timeout { message: String, after: Duration },
    #[error("task failed: {0}")]
    Task(E),
    #[error("invalid concurrency limit: {0} (must be at least 1)")]
    InvalidLimit(usize),
    #[error("task aborted: {0}")]
    Aborted(String),
}

impl<E> ExecError<E> {
    pub(crate) fn timed_out(after: Duration) -> Self {
        ExecError::Timeout {
            message: format!("task timed out after {}ms", after.as_millis()),
            after,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ExecError::Timeout { .. })
    }

    /// The underlying task error, if this failure came from the task.
    pub fn into_task(self) -> Option<E> {
        match self {
            ExecError::Task(e) => Some(e),
            _ => None,
        }
    }
}

impl<E> ExecError<ExecError<E>> {
    /// Collapse a wrapper error around another wrapper error.
    pub fn flatten(self) -> ExecError<E> {
        match self {
            ExecError::Task(inner) => inner,
            ExecError::Timeout { message, after } => ExecError::Timeout { message, after },
            ExecError::InvalidLimit(limit) => ExecError::InvalidLimit(limit),
            ExecError::Aborted(reason) => ExecError::Aborted(reason),
        }
    }
}

impl<E> From<taskkit_model::ModelError> for ExecError<E> {
    fn from(e: taskkit_model::ModelError) -> Self {
        match e {
            taskkit_model::ModelError::InvalidLimit(limit) => ExecError::InvalidLimit(limit),
        }
    }
}
