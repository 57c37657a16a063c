//! Crate-level error type

use thiserror::Error;

use crate::config::ConfigError;
use crate::render::RenderError;

/// Errors surfaced to the host by `Visualization`
#[derive(Error, Debug)]
pub enum VisualizationError {
    /// Settings failed to load or validate
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Drawing context failure
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// The session was already torn down
    #[error("Visualization is not running")]
    NotRunning,
}

/// Result type for visualization operations
pub type VisualizationResult<T> = Result<T, VisualizationError>;
