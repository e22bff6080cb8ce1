//! Error types for the highlighter core.

use doc_model::HighlightId;
use std::io;

/// Failures surfaced by the [`Highlighter`](crate::Highlighter) controller.
///
/// Conditions that are expected during normal interaction (collapsed
/// selections, unmounted pages, missing viewports) are not errors; those paths
/// return `None` or do nothing.
#[derive(Debug, thiserror::Error)]
pub enum HighlighterError {
    #[error("viewer container is not available")]
    ContainerUnavailable,

    #[error("highlighter has not been initialized")]
    NotInitialized,

    #[error("unknown highlight: {0}")]
    UnknownHighlight(HighlightId),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for configuration key {key}")]
    InvalidValue { key: String, value: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HighlighterError>;
