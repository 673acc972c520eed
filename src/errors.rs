// Error types for timer instrumentation
// Duplicate starts and finishes without a start are call-site mistakes;
// they are returned to the caller and never abort the process.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("duplicated timer {0}")]
    Duplicate(String),
    #[error("{0} timer does not start")]
    NotStarted(String),
}

impl TimerError {
    /// Name of the timer the error refers to.
    pub fn name(&self) -> &str {
        match self {
            TimerError::Duplicate(name) | TimerError::NotStarted(name) => name,
        }
    }
}
