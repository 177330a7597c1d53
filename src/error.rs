//! Error types for the viewer core.

use thiserror::Error;

/// Errors that can occur while building or driving a viewer.
#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Viewer is not mounted: {0} requested before the viewport was ready")]
    NotMounted(&'static str),

    #[error("Terminal error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for viewer operations.
pub type ViewerResult<T> = Result<T, ViewerError>;
