//! Connected component labeling of depth maps.
//!
//! Two pixels are adjacent when they touch (8-connectivity) and both carry a
//! valid depth closer than `threshold`. Labeling runs in three passes over a
//! flat equivalence table:
//! 1. Raster pass assigning provisional labels from the causal neighbours
//!    (west, north, north-west, north-east) and recording merges
//! 2. Collapse every merge chain to its root
//! 3. Rewrite pixels to contiguous labels `1..=num_labels` in scan order
//!
//! Every equivalence entry points at a strictly smaller label, so chains
//! always terminate.


use common::Buffer2;

use crate::frame::Frame;

// ============================================================================
// Adjacency predicate
// ============================================================================

/// Zero marks "no reading"; NaN and infinities are treated the same way.
#[inline]
pub fn is_valid_depth(depth: f32) -> bool {
    depth != 0.0 && depth.is_finite()
}

/// Whether a neighbour sample lies on the same surface as a valid `current`
/// sample. A difference equal to the threshold is not connected.
#[inline]
pub fn depths_connected(neighbor: f32, current: f32, threshold: f32) -> bool {
    is_valid_depth(neighbor) && (neighbor - current).abs() < threshold
}

/// Linear indices of the already visited neighbours of `(x, y)`, in the
/// fixed order west, north, north-west, north-east.
#[inline]
fn causal_neighbors(x: usize, y: usize, width: usize) -> [Option<usize>; 4] {
    let idx = y * width + x;
    let has_west = x > 0;
    let has_north = y > 0;
    let has_east = x + 1 < width;
    [
        has_west.then(|| idx - 1),
        has_north.then(|| idx - width),
        (has_west && has_north).then(|| idx - width - 1),
        (has_east && has_north).then(|| idx - width + 1),
    ]
}

// ============================================================================
// Equivalence table
// ============================================================================

/// Root of `label`, halving the path on the way.
fn find_root(equivalences: &mut [u32], mut label: u32) -> u32 {
    loop {
        let parent = equivalences[label as usize];
        if parent == 0 {
            return label;
        }
        let grandparent = equivalences[parent as usize];
        if grandparent != 0 {
            equivalences[label as usize] = grandparent;
        }
        label = parent;
    }
}

/// Records that `a` and `b` belong to the same component (smaller root wins).
fn record_equivalence(equivalences: &mut [u32], a: u32, b: u32) {
    let root_a = find_root(equivalences, a);
    let root_b = find_root(equivalences, b);
    if root_a != root_b {
        let (smaller, larger) = if root_a < root_b {
            (root_a, root_b)
        } else {
            (root_b, root_a)
        };
        equivalences[larger as usize] = smaller;
    }
}

// ============================================================================
// Passes
// ============================================================================

/// Pass 1. Writes provisional labels and records merges; returns the number
/// of labels minted (labels are `1..=minted`).
///
/// `equivalences` must be zeroed and hold at least `depth.len() + 1` entries.
pub(crate) fn label_provisional(
    depth: &Buffer2<f32>,
    threshold: f32,
    labels: &mut Buffer2<u32>,
    equivalences: &mut [u32],
) -> u32 {
    let width = depth.width();
    let height = depth.height();
    debug_assert!(labels.matches_dimensions(width, height));
    debug_assert!(equivalences.len() > depth.len());

    let mut minted = 0u32;

    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            let z = depth[idx];
            if !is_valid_depth(z) {
                labels[idx] = 0;
                continue;
            }

            let mut compatible = [0u32; 4];
            let mut min_label = 0u32;
            for (slot, neighbor) in causal_neighbors(x, y, width).into_iter().enumerate() {
                let Some(n) = neighbor else { continue };
                if depths_connected(depth[n], z, threshold) {
                    let label = labels[n];
                    compatible[slot] = label;
                    if min_label == 0 || label < min_label {
                        min_label = label;
                    }
                }
            }

            if min_label == 0 {
                minted += 1;
                min_label = minted;
            }
            labels[idx] = min_label;

            for label in compatible {
                if label > min_label {
                    record_equivalence(equivalences, label, min_label);
                }
            }
        }
    }

    minted
}

/// Pass 2. Points every entry in `1..=minted` straight at its root; roots
/// stay 0. Resolving an already resolved table leaves it unchanged.
pub(crate) fn resolve_equivalences(equivalences: &mut [u32], minted: u32) {
    for label in 1..=minted as usize {
        let mut root = equivalences[label];
        if root == 0 {
            continue;
        }
        // Targets are smaller than `label`, so they were resolved already.
        while equivalences[root as usize] != 0 {
            root = equivalences[root as usize];
        }
        equivalences[label] = root;
    }
}

/// Pass 3. Rewrites labels to `1..=N` in order of first sighting; returns N.
///
/// `canonical` must be zeroed over every root index.
pub(crate) fn relabel_canonical(
    labels: &mut [u32],
    equivalences: &[u32],
    canonical: &mut [u32],
) -> u32 {
    let mut num_labels = 0u32;
    for label in labels.iter_mut().filter(|l| **l != 0) {
        let root = match equivalences[*label as usize] {
            0 => *label,
            root => root,
        };
        let slot = &mut canonical[root as usize];
        if *slot == 0 {
            num_labels += 1;
            *slot = num_labels;
        }
        *label = *slot;
    }
    num_labels
}

// ============================================================================
// Scratch
// ============================================================================

/// Per-stream buffers for labeling, sized to the frame resolution once and
/// reused across frames.
#[derive(Debug)]
pub struct LabelingScratch {
    depth: Buffer2<f32>,
    labels: Buffer2<u32>,
    /// Indexed by provisional label; 0 = root.
    equivalences: Vec<u32>,
    /// Root label -> contiguous label.
    canonical: Vec<u32>,
    /// Provisional labels minted by the last frame; bounds the entries to clear.
    minted: u32,
    num_labels: u32,
}

impl LabelingScratch {
    pub fn new(width: usize, height: usize) -> Self {
        let table_len = width * height + 1;
        Self {
            depth: Buffer2::new_default(width, height),
            labels: Buffer2::new_default(width, height),
            equivalences: vec![0; table_len],
            canonical: vec![0; table_len],
            minted: 0,
            num_labels: 0,
        }
    }

    /// Reallocates when the resolution changed, otherwise keeps everything.
    pub fn reset(&mut self, width: usize, height: usize) {
        if self.labels.matches_dimensions(width, height) {
            return;
        }
        log::debug!(
            "Resizing labeling scratch from {}x{} to {}x{}",
            self.labels.width(),
            self.labels.height(),
            width,
            height
        );
        *self = Self::new(width, height);
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.labels.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.labels.height()
    }

    /// Copies the samples of a validated depth frame.
    pub fn load_depth(&mut self, frame: &Frame) {
        debug_assert_eq!(frame.pixel_count(), self.depth.len());
        for (dst, src) in self.depth.pixels_mut().iter_mut().zip(frame.depth_samples()) {
            *dst = src;
        }
    }

    /// Runs all three passes over the loaded depth and returns the number of
    /// components.
    pub fn label(&mut self, threshold: f32) -> u32 {
        let used = self.minted as usize;
        self.equivalences[..=used].fill(0);
        self.canonical[..=used].fill(0);

        self.minted = label_provisional(
            &self.depth,
            threshold,
            &mut self.labels,
            &mut self.equivalences,
        );
        resolve_equivalences(&mut self.equivalences, self.minted);
        self.num_labels = relabel_canonical(
            self.labels.pixels_mut(),
            &self.equivalences,
            &mut self.canonical,
        );
        self.num_labels
    }

    #[inline]
    pub fn depth(&self) -> &Buffer2<f32> {
        &self.depth
    }

    #[inline]
    pub fn depth_mut(&mut self) -> &mut Buffer2<f32> {
        &mut self.depth
    }

    #[inline]
    pub fn labels(&self) -> &Buffer2<u32> {
        &self.labels
    }

    #[inline]
    pub fn labels_mut(&mut self) -> &mut Buffer2<u32> {
        &mut self.labels
    }

    /// Number of components found by the last [`label`](Self::label) call.
    #[inline]
    pub fn num_labels(&self) -> u32 {
        self.num_labels
    }
}
