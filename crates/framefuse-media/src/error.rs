//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

use framefuse_models::CompositionError;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while fetching inputs or rendering a composition.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("Render failed: {message}")]
    RenderFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("Render timed out after {0} seconds")]
    Timeout(u64),

    #[error("Renderer reported success but output file is missing: {0}")]
    OutputMissing(PathBuf),

    #[error("Download failed: {message}")]
    DownloadFailed { message: String },

    #[error(transparent)]
    Graph(#[from] CompositionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create a render failure error.
    pub fn render_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::RenderFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create a download failure error.
    pub fn download_failed(message: impl Into<String>) -> Self {
        Self::DownloadFailed {
            message: message.into(),
        }
    }

    /// Diagnostic text suitable for an error response `details` field.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            MediaError::RenderFailed { stderr, .. } => stderr.as_deref(),
            _ => None,
        }
    }
}
