//! Tuning parameters for labeling, tracking and compositing.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Resolution of the time-of-flight depth stream.
pub const DEPTH_WIDTH: usize = 512;
pub const DEPTH_HEIGHT: usize = 424;

/// Packed colour drawn at the centroid of every painted component.
pub const DEFAULT_MARKER_COLOR: u32 = 0x00FF_FFFF;

/// Configuration shared by all stages of [`ConnectedComponentLabeling`].
///
/// Missing YAML keys fall back to [`Default`].
///
/// [`ConnectedComponentLabeling`]: crate::ConnectedComponentLabeling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelingConfig {
    // ------------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------------
    /// Frames whose resolution differs are skipped.
    pub width: usize,
    pub height: usize,
    /// Depth-difference cutoff (meters) for drivers that do not pass one.
    pub default_threshold: f32,

    // ------------------------------------------------------------------------
    // Filtering
    // ------------------------------------------------------------------------
    /// Components with at most this many pixels are dropped as noise.
    pub min_component_pixels: u32,
    /// Far and large relative to the scene average means background.
    pub background_depth_factor: f32,
    pub background_size_factor: f32,

    // ------------------------------------------------------------------------
    // Tracking
    // ------------------------------------------------------------------------
    /// Per-axis centroid distance (pixels, exclusive) for a cross-frame match.
    pub match_distance: u32,
    /// Minimum min/max ratio (exclusive) of average depths for a match.
    pub depth_similarity: f32,

    // ------------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------------
    pub marker_color: u32,
}

impl Default for LabelingConfig {
    fn default() -> Self {
        Self {
            width: DEPTH_WIDTH,
            height: DEPTH_HEIGHT,
            default_threshold: 0.01,
            min_component_pixels: 100,
            background_depth_factor: 0.85,
            background_size_factor: 0.85,
            match_distance: 25,
            depth_similarity: 0.95,
            marker_color: DEFAULT_MARKER_COLOR,
        }
    }
}

impl LabelingConfig {
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        serde_yml::from_str(yaml).context("Failed to parse labeling config")
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_yaml(&yaml)?;
        log::info!("Loaded labeling config from {}", path.display());
        Ok(config)
    }

    pub fn to_yaml(&self) -> anyhow::Result<String> {
        serde_yml::to_string(self).context("Failed to serialize labeling config")
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Panics on values the pipeline cannot work with.
    pub fn validate(&self) {
        assert!(
            self.width > 0 && self.height > 0,
            "frame size must be non-zero, got {}x{}",
            self.width,
            self.height
        );
        assert!(
            self.pixel_count() < u32::MAX as usize,
            "frame has too many pixels for u32 labels: {}",
            self.pixel_count()
        );
        assert!(
            self.default_threshold > 0.0,
            "default_threshold must be positive, got {}",
            self.default_threshold
        );
        assert!(
            self.match_distance > 0,
            "match_distance must be positive, got {}",
            self.match_distance
        );
        for (name, value) in [
            ("depth_similarity", self.depth_similarity),
            ("background_depth_factor", self.background_depth_factor),
            ("background_size_factor", self.background_size_factor),
        ] {
            assert!(
                value > 0.0 && value <= 1.0,
                "{} must be in (0, 1], got {}",
                name,
                value
            );
        }
        assert!(
            self.marker_color != 0,
            "marker_color 0 is indistinguishable from unpainted pixels"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_sensor() {
        let config = LabelingConfig::default();
        assert_eq!((config.width, config.height), (512, 424));
        assert_eq!(config.min_component_pixels, 100);
        config.validate();
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = LabelingConfig::from_yaml("width: 64\nheight: 48\nmatch_distance: 10\n")
            .expect("valid yaml");
        assert_eq!(config.width, 64);
        assert_eq!(config.height, 48);
        assert_eq!(config.match_distance, 10);
        assert_eq!(config.depth_similarity, 0.95);
        assert_eq!(config.marker_color, DEFAULT_MARKER_COLOR);
    }

    #[test]
    fn yaml_round_trip() {
        let config = LabelingConfig {
            min_component_pixels: 42,
            ..Default::default()
        };
        let yaml = config.to_yaml().expect("serializable");
        assert_eq!(LabelingConfig::from_yaml(&yaml).expect("valid yaml"), config);
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        assert!(LabelingConfig::from_yaml("width: [1, 2]").is_err());
    }

    #[test]
    #[should_panic(expected = "depth_similarity must be in (0, 1]")]
    fn validate_rejects_ratio_above_one() {
        LabelingConfig {
            depth_similarity: 1.5,
            ..Default::default()
        }
        .validate();
    }
}
