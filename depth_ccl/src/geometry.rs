//! Per-component pixel statistics.

use std::fmt;
use std::num::NonZeroU32;

use common::Buffer2;
use rand::Rng;

/// Persistent identity of a tracked component. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Guid(NonZeroU32);

impl Guid {
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Self)
    }

    /// Draws a uniformly random non-zero guid.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        loop {
            if let Some(value) = NonZeroU32::new(rng.random()) {
                return Self(value);
            }
        }
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0.get())
    }
}

/// Statistics of one labeled component of a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentGeometry {
    /// Contiguous label `1..=N` of this component within its frame.
    pub label: u32,
    pub pixel_count: u32,
    pub sum_x: u64,
    pub sum_y: u64,
    /// `floor(sum / pixel_count)` per axis.
    pub centroid_x: u32,
    pub centroid_y: u32,
    /// Meters.
    pub sum_depth: f64,
    pub average_depth: f32,
    pub guid: Guid,
}

impl ComponentGeometry {
    /// Linear index of the centroid pixel in a frame of the given width.
    #[inline]
    pub fn centroid_index(&self, width: usize) -> usize {
        self.centroid_y as usize * width + self.centroid_x as usize
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    pixel_count: u32,
    sum_x: u64,
    sum_y: u64,
    sum_depth: f64,
    guid: Option<Guid>,
}

/// Accumulates geometry for labels `1..=num_labels`; entry `i` describes label
/// `i + 1`. A guid is minted the first time a label is seen, so an empty label
/// map mints nothing.
pub fn aggregate<R: Rng>(
    labels: &Buffer2<u32>,
    depth: &Buffer2<f32>,
    num_labels: u32,
    rng: &mut R,
) -> Vec<ComponentGeometry> {
    debug_assert!(labels.matches_dimensions(depth.width(), depth.height()));

    let width = labels.width();
    let mut accumulators = vec![Accumulator::default(); num_labels as usize];

    for (idx, &label) in labels.pixels().iter().enumerate() {
        if label == 0 {
            continue;
        }
        let acc = &mut accumulators[label as usize - 1];
        if acc.guid.is_none() {
            acc.guid = Some(Guid::random(rng));
        }
        acc.pixel_count += 1;
        acc.sum_x += (idx % width) as u64;
        acc.sum_y += (idx / width) as u64;
        acc.sum_depth += depth[idx] as f64;
    }

    accumulators
        .into_iter()
        .zip(1u32..)
        .filter_map(|(acc, label)| {
            let guid = acc.guid?;
            let count = acc.pixel_count as u64;
            Some(ComponentGeometry {
                label,
                pixel_count: acc.pixel_count,
                sum_x: acc.sum_x,
                sum_y: acc.sum_y,
                centroid_x: (acc.sum_x / count) as u32,
                centroid_y: (acc.sum_y / count) as u32,
                sum_depth: acc.sum_depth,
                average_depth: (acc.sum_depth / count as f64) as f32,
                guid,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn guid_is_never_zero() {
        assert!(Guid::new(0).is_none());
        assert_eq!(Guid::new(5).map(Guid::get), Some(5));

        let mut rng = StdRng::seed_from_u64(1);
        assert!((0..1000).all(|_| Guid::random(&mut rng).get() != 0));
    }

    #[test]
    fn empty_label_map_mints_nothing() {
        let labels = Buffer2::new_default(4, 4);
        let depth = Buffer2::new_default(4, 4);
        let mut rng = StdRng::seed_from_u64(1);

        assert!(aggregate(&labels, &depth, 0, &mut rng).is_empty());
    }

    #[test]
    fn centroid_and_depth_are_means() {
        // 1 1 .
        // 1 . 2
        let labels = Buffer2::new(3, 2, vec![1, 1, 0, 1, 0, 2]);
        let depth = Buffer2::new(3, 2, vec![1.0, 2.0, 0.0, 3.0, 0.0, 4.0]);
        let mut rng = StdRng::seed_from_u64(1);

        let geometry = aggregate(&labels, &depth, 2, &mut rng);

        assert_eq!(geometry.len(), 2);
        let first = &geometry[0];
        assert_eq!(first.label, 1);
        assert_eq!(first.pixel_count, 3);
        assert_eq!((first.sum_x, first.sum_y), (1, 1));
        // floor(1/3) on both axes
        assert_eq!((first.centroid_x, first.centroid_y), (0, 0));
        assert_eq!(first.sum_depth, 6.0);
        assert_eq!(first.average_depth, 2.0);

        let second = &geometry[1];
        assert_eq!(second.label, 2);
        assert_eq!(second.pixel_count, 1);
        assert_eq!((second.centroid_x, second.centroid_y), (2, 1));
        assert_eq!(second.centroid_index(3), 5);
        assert_eq!(second.average_depth, 4.0);
        assert_ne!(first.guid, second.guid);
    }

    #[test]
    fn block_centroid_is_its_center() {
        let mut labels = Buffer2::new_default(20, 20);
        let mut depth = Buffer2::new_default(20, 20);
        for y in 3..8 {
            for x in 10..15 {
                labels[(x, y)] = 1;
                depth[(x, y)] = 1.5;
            }
        }
        let mut rng = StdRng::seed_from_u64(1);

        let geometry = aggregate(&labels, &depth, 1, &mut rng);

        assert_eq!(geometry[0].pixel_count, 25);
        assert_eq!((geometry[0].centroid_x, geometry[0].centroid_y), (12, 5));
        assert_eq!(geometry[0].average_depth, 1.5);
    }
}
