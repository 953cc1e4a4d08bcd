//! Encoding settings for rendered output.

use serde::{Deserialize, Serialize};

/// Encoder parameters passed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// Video codec (e.g. libx264)
    pub codec: String,
    /// Encoder preset
    pub preset: String,
    /// Constant rate factor (quality, lower = better)
    pub crf: u8,
    /// Audio codec; `copy` passes audio through untouched
    pub audio_codec: String,
    /// Maximum output duration in seconds
    pub duration_cap_secs: f64,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            codec: "libx264".to_string(),
            preset: "fast".to_string(),
            crf: 23,
            audio_codec: "copy".to_string(),
            duration_cap_secs: 60.0,
        }
    }
}

impl EncodingConfig {
    pub fn with_duration_cap(mut self, secs: f64) -> Self {
        self.duration_cap_secs = secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_renderer_flags() {
        let config = EncodingConfig::default();
        assert_eq!(config.codec, "libx264");
        assert_eq!(config.preset, "fast");
        assert_eq!(config.crf, 23);
        assert_eq!(config.audio_codec, "copy");
        assert!((config.duration_cap_secs - 60.0).abs() < f64::EPSILON);
    }
}
