//! API configuration.

use std::path::PathBuf;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Directory where rendered files and scratch inputs live
    pub uploads_dir: PathBuf,
    /// Base URL used in response links; derived from the request host when unset
    pub public_base_url: Option<String>,
    /// Hard per-render timeout in seconds
    pub render_timeout_secs: u64,
    /// Maximum renders running at once
    pub max_concurrent_renders: usize,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Rate limit requests per second
    pub rate_limit_rps: u32,
    /// Max request body size (multipart uploads carry whole videos)
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Reject unknown layout names instead of falling back to overlay
    pub strict_layouts: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            uploads_dir: PathBuf::from("uploads"),
            public_base_url: None,
            render_timeout_secs: 300,
            max_concurrent_renders: default_render_slots(),
            cors_origins: vec!["*".to_string()],
            rate_limit_rps: 10,
            max_body_size: 200 * 1024 * 1024, // 200MB
            environment: "development".to_string(),
            strict_layouts: false,
        }
    }
}

fn default_render_slots() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            uploads_dir: std::env::var("UPLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.uploads_dir),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .ok()
                .map(|s| s.trim_end_matches('/').to_string()),
            render_timeout_secs: std::env::var("RENDER_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.render_timeout_secs),
            max_concurrent_renders: std::env::var("MAX_CONCURRENT_RENDERS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_concurrent_renders),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            rate_limit_rps: std::env::var("RATE_LIMIT_RPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.rate_limit_rps),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            strict_layouts: std::env::var("STRICT_LAYOUTS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.strict_layouts),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 8080);
        assert!(config.max_concurrent_renders > 0);
        assert!(!config.is_production());
        assert!(!config.strict_layouts);
    }
}
