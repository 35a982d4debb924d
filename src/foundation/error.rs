/// Convenience result type used across haze.
pub type HazeResult<T> = Result<T, HazeError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Only [`HazeError::Precondition`] is expected to reach effect authors during normal use: it
/// marks a caller bug (negative blur radius, progressive intensity outside `[0, 1]`, ...).
/// Capability and surface errors are recovered inside the compositing pipeline by falling back or
/// skipping a frame.
#[derive(thiserror::Error, Debug)]
pub enum HazeError {
    /// Invalid caller-provided parameter.
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// A platform capability was requested but is unavailable or failed at runtime.
    #[error("capability unavailable: {0}")]
    Capability(String),

    /// Offscreen surface allocation or recording failed.
    #[error("surface error: {0}")]
    Surface(String),

    /// Background blur job failed or was discarded.
    #[error("job error: {0}")]
    Job(String),

    /// Invalid engine configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HazeError {
    /// Build a [`HazeError::Precondition`] value.
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Build a [`HazeError::Capability`] value.
    pub fn capability(msg: impl Into<String>) -> Self {
        Self::Capability(msg.into())
    }

    /// Build a [`HazeError::Surface`] value.
    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }

    /// Build a [`HazeError::Job`] value.
    pub fn job(msg: impl Into<String>) -> Self {
        Self::Job(msg.into())
    }

    /// Build a [`HazeError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`HazeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for errors the pipeline treats as "not ready, retry next frame".
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Surface(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
