//! Composition error taxonomy shared across the request and graph layers.

use thiserror::Error;

/// Errors detected while resolving or assembling a composition.
///
/// These all happen before any renderer invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionError {
    /// Canvas format could not be resolved to positive dimensions.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// A parameter combination cannot produce a valid graph.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Unrecognized layout name in strict mode.
    #[error("Unsupported layout: {0}")]
    UnsupportedLayout(String),
}
