//! Cross-frame identity by centroid proximity and depth similarity.
//!
//! There is no motion model and no optimal assignment: each current component
//! takes the guid of the last previous component it resembles, and several
//! current components may inherit the same guid.

use crate::config::LabelingConfig;
use crate::geometry::ComponentGeometry;

/// Thresholds deciding whether two components are "the same" object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchCriteria {
    /// Exclusive per-axis centroid distance in pixels.
    pub max_centroid_offset: u32,
    /// Exclusive lower bound on `min(depth) / max(depth)`.
    pub min_depth_ratio: f32,
}

impl MatchCriteria {
    pub fn from_config(config: &LabelingConfig) -> Self {
        Self {
            max_centroid_offset: config.match_distance,
            min_depth_ratio: config.depth_similarity,
        }
    }

    pub fn matches(&self, current: &ComponentGeometry, previous: &ComponentGeometry) -> bool {
        current.centroid_x.abs_diff(previous.centroid_x) < self.max_centroid_offset
            && current.centroid_y.abs_diff(previous.centroid_y) < self.max_centroid_offset
            && depth_ratio(current.average_depth, previous.average_depth) > self.min_depth_ratio
    }
}

impl Default for MatchCriteria {
    fn default() -> Self {
        Self::from_config(&LabelingConfig::default())
    }
}

/// `min / max` of two depths; 0 when neither is positive.
fn depth_ratio(a: f32, b: f32) -> f32 {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    if hi <= 0.0 {
        return 0.0;
    }
    lo / hi
}

/// Geometry of the most recent frame, carried to the next one.
#[derive(Debug, Default)]
pub struct TrackerState {
    /// `None` until the first frame has been tracked.
    components: Option<Vec<ComponentGeometry>>,
}

impl TrackerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies guids from matching components of the previous frame into
    /// `current`, then keeps `current` as the new previous frame. Returns how
    /// many current components inherited a guid.
    pub fn track(
        &mut self,
        mut current: Vec<ComponentGeometry>,
        criteria: &MatchCriteria,
    ) -> usize {
        let mut inherited = 0;
        if let Some(previous) = self.components.as_deref() {
            for component in current.iter_mut() {
                let mut matched = false;
                for candidate in previous {
                    if criteria.matches(component, candidate) {
                        component.guid = candidate.guid;
                        matched = true;
                    }
                }
                inherited += matched as usize;
            }
        }
        self.components = Some(current);
        inherited
    }

    /// Geometry of the last tracked frame, empty before the first one.
    pub fn components(&self) -> &[ComponentGeometry] {
        self.components.as_deref().unwrap_or(&[])
    }

    pub fn has_history(&self) -> bool {
        self.components.is_some()
    }

    pub fn clear(&mut self) {
        self.components = None;
    }
}
