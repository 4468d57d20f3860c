//! Animation error types

use thiserror::Error;

/// Errors reported by a display sink
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The display field has been torn down by its host
    #[error("Display sink is no longer available")]
    Unavailable,

    /// Writing the text failed; the next tick may succeed
    #[error("Display sink I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for SinkError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::BrokenPipe => SinkError::Unavailable,
            _ => SinkError::Io(err.to_string()),
        }
    }
}

/// Errors reported when validating an [`AnimatorConfig`](crate::AnimatorConfig)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A zero tick interval would fire continuously
    #[error("Tick interval must be at least 1ms")]
    ZeroInterval,

    /// `steps` must be positive to animate at all
    #[error("Steps must be at least 1 (got {0})")]
    StepsOutOfRange(i64),
}

/// Result type for sink operations
pub type Result<T> = std::result::Result<T, SinkError>;
