//! Application state.

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub http: reqwest::Client,
    /// Bounds concurrent FFmpeg processes.
    pub render_permits: Arc<Semaphore>,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: ApiConfig) -> Self {
        let render_permits = Arc::new(Semaphore::new(config.max_concurrent_renders));
        Self {
            config,
            http: reqwest::Client::new(),
            render_permits,
        }
    }
}
