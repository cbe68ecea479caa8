//! Noise and background rejection, and painting of the components frame.

use common::Buffer2;

use crate::config::LabelingConfig;
use crate::frame::Frame;
use crate::geometry::{ComponentGeometry, Guid};

/// Painted instead of a guid colour that would read as unpainted or as a marker.
const FALLBACK_COLOR: u32 = 0x0080_8080;

/// Deterministic packed `0x00RRGGBB` colour for a guid. Never 0 and never
/// `marker_color`.
pub fn guid_color(guid: Guid, marker_color: u32) -> u32 {
    // Fibonacci hashing spreads consecutive guids over the colour cube.
    let color = guid.get().wrapping_mul(0x9E37_79B9) >> 8;
    if color == 0 || color == marker_color {
        FALLBACK_COLOR
    } else {
        color
    }
}

/// Averages the background test compares against.
///
/// The unlabeled rest of the frame counts as one more region of zero depth,
/// so a few small blobs in an otherwise empty view stay foreground while a
/// wall filling most of the view does not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneStatistics {
    pub average_depth: f32,
    pub average_pixel_count: f32,
}

impl SceneStatistics {
    /// `None` for a frame without components.
    pub fn compute(components: &[ComponentGeometry], frame_pixels: usize) -> Option<Self> {
        if components.is_empty() {
            return None;
        }
        let regions = (components.len() + 1) as f64;
        let depth_sum: f64 = components.iter().map(|c| c.average_depth as f64).sum();
        Some(Self {
            average_depth: (depth_sum / regions) as f32,
            average_pixel_count: (frame_pixels as f64 / regions) as f32,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Too small; its pixels are cleared from the label map.
    Rejected,
    /// Large and far; left unpainted.
    Background,
    Foreground,
}

pub fn classify(
    component: &ComponentGeometry,
    scene: &SceneStatistics,
    config: &LabelingConfig,
) -> Classification {
    if component.pixel_count <= config.min_component_pixels {
        return Classification::Rejected;
    }
    let far = component.average_depth > config.background_depth_factor * scene.average_depth;
    let large = component.pixel_count as f32
        > config.background_size_factor * scene.average_pixel_count;
    if far && large {
        Classification::Background
    } else {
        Classification::Foreground
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompositeCounts {
    pub foreground: usize,
    pub background: usize,
    pub rejected: usize,
}

/// Overwrites every pixel of `output`: foreground components in their guid
/// colour with the centroid marked, everything else 0. Pixels of rejected
/// components are also reset to 0 in `labels`.
pub fn composite(
    labels: &mut Buffer2<u32>,
    components: &[ComponentGeometry],
    config: &LabelingConfig,
    output: &mut Frame,
) -> CompositeCounts {
    debug_assert_eq!(labels.len(), output.pixel_count());

    let Some(scene) = SceneStatistics::compute(components, labels.len()) else {
        output.fill_u32(0);
        return CompositeCounts::default();
    };

    let mut counts = CompositeCounts::default();
    let classes: Vec<Classification> = components
        .iter()
        .map(|component| {
            let class = classify(component, &scene, config);
            match class {
                Classification::Foreground => counts.foreground += 1,
                Classification::Background => counts.background += 1,
                Classification::Rejected => counts.rejected += 1,
            }
            class
        })
        .collect();
    let colors: Vec<u32> = components
        .iter()
        .map(|component| guid_color(component.guid, config.marker_color))
        .collect();

    for (idx, label) in labels.pixels_mut().iter_mut().enumerate() {
        if *label == 0 {
            output.set_pixel_u32(idx, 0);
            continue;
        }
        let component = *label as usize - 1;
        match classes[component] {
            Classification::Foreground => output.set_pixel_u32(idx, colors[component]),
            Classification::Background => output.set_pixel_u32(idx, 0),
            Classification::Rejected => {
                *label = 0;
                output.set_pixel_u32(idx, 0);
            }
        }
    }

    let width = labels.width();
    for (component, class) in components.iter().zip(&classes) {
        if *class == Classification::Foreground {
            output.set_pixel_u32(component.centroid_index(width), config.marker_color);
        }
    }

    counts
}
