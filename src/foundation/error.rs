/// Convenience result type used across pictor.
pub type PictorResult<T> = Result<T, PictorError>;

/// Top-level error taxonomy used by the picture and shipout APIs.
#[derive(thiserror::Error, Debug)]
pub enum PictorError {
    /// Invalid user-provided data (scene files, requests, geometry).
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid or inconsistent settings.
    #[error("configuration error: {0}")]
    Config(String),

    /// An external program ran but exited unsuccessfully.
    #[error("{tool} exited with status {status}")]
    ToolInvocation {
        /// Settings key of the program (`tex`, `dvips`, `gs`, ...).
        tool: String,
        /// Exit status reported by the process (`-1` when killed by a signal).
        status: i32,
    },

    /// An external program could not be started at all.
    #[error("could not launch {description} ('{tool}'): {message}")]
    Launch {
        /// Settings key of the program.
        tool: String,
        /// Human readable program description.
        description: String,
        /// Underlying spawn error.
        message: String,
    },

    /// A node failed to draw itself or write its label output.
    #[error("draw error: {0}")]
    Draw(String),

    /// A viewer could not be started or signalled.
    #[error("viewer unavailable: {0}")]
    ViewerUnavailable(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PictorError {
    /// Build a [`PictorError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PictorError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`PictorError::ToolInvocation`] value.
    pub fn tool(tool: impl Into<String>, status: i32) -> Self {
        Self::ToolInvocation {
            tool: tool.into(),
            status,
        }
    }

    /// Build a [`PictorError::Draw`] value.
    pub fn draw(msg: impl Into<String>) -> Self {
        Self::Draw(msg.into())
    }

    /// Build a [`PictorError::ViewerUnavailable`] value.
    pub fn viewer(msg: impl Into<String>) -> Self {
        Self::ViewerUnavailable(msg.into())
    }
}

impl From<std::io::Error> for PictorError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(anyhow::Error::new(err))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
