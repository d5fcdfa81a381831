use std::path::PathBuf;

/// Convenience result type used across capflow.
pub type CapResult<T> = Result<T, CapError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Cosmetic configuration problems (unknown style id, malformed color, unknown easing name) never
/// reach this type; they resolve through documented fallbacks instead.
#[derive(thiserror::Error, Debug)]
pub enum CapError {
    /// Invalid caller-provided data (timings, options, frame sizes).
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while rasterizing or persisting a frame.
    #[error("render error: {0}")]
    Render(String),

    /// An external tool exited unsuccessfully or reported a fatal diagnostic.
    #[error("{tool} failed ({status}): {stderr}")]
    Process {
        /// Program that was invoked.
        tool: String,
        /// Exit status description, or `timeout`.
        status: String,
        /// Trimmed stderr output.
        stderr: String,
    },

    /// A declared input file does not exist.
    #[error("missing input: {}", path.display())]
    MissingInput {
        /// Path that was expected to exist.
        path: PathBuf,
    },

    /// The job observed its cancellation flag.
    #[error("cancelled")]
    Cancelled,

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CapError {
    /// Build a [`CapError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CapError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`CapError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`CapError::MissingInput`] value.
    pub fn missing_input(path: impl Into<PathBuf>) -> Self {
        Self::MissingInput { path: path.into() }
    }

    /// Build a [`CapError::Process`] value.
    pub fn process(
        tool: impl Into<String>,
        status: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::Process {
            tool: tool.into(),
            status: status.into(),
            stderr: stderr.into(),
        }
    }

    /// Return `true` for [`CapError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
