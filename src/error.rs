//! Error types for the tracking core.

/// Top-level error type for the tracking core.
#[derive(Debug, thiserror::Error)]
pub enum HangarError {
    /// Schedule descriptor decoding or validation error.
    #[error("schedule error: {0}")]
    Schedule(String),

    /// Action history snapshot error.
    #[error("history error: {0}")]
    History(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, HangarError>;
