//! Per-stream labeling and tracking instance.


use common::Buffer2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::compositor;
use crate::config::LabelingConfig;
use crate::frame::{Frame, FrameError, FrameResult, FrameRole};
use crate::geometry::{self, ComponentGeometry};
use crate::labeling::LabelingScratch;
use crate::tracker::{MatchCriteria, TrackerState};

/// Bytes per element of both the depth and the components frame.
const BYTES_PER_PIXEL: usize = 4;

/// Outcome of one processed frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameSummary {
    /// Components found before filtering.
    pub components: usize,
    /// Painted components.
    pub retained: usize,
    pub background: usize,
    /// Dropped for being too small.
    pub rejected: usize,
    /// Components that kept a guid from the previous frame.
    pub inherited: usize,
}

/// Segments depth frames into components and tracks them across frames.
///
/// Keep one instance per depth stream: the instance owns the previous frame's
/// geometry, and calls on the same instance must not overlap.
///
/// # Example
///
/// ```rust,ignore
/// let mut ccl = ConnectedComponentLabeling::new();
/// let mut components = Frame::new(512, 424, 4);
/// ccl.apply(Some(&depth), Some(&mut components), 0.01);
/// for component in ccl.components() {
///     println!("{} at ({}, {})", component.guid, component.centroid_x, component.centroid_y);
/// }
/// ```
#[derive(Debug)]
pub struct ConnectedComponentLabeling {
    config: LabelingConfig,
    criteria: MatchCriteria,
    scratch: LabelingScratch,
    tracker: TrackerState,
    rng: StdRng,
}

impl Default for ConnectedComponentLabeling {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectedComponentLabeling {
    pub fn new() -> Self {
        Self::with_config(LabelingConfig::default())
    }

    pub fn with_config(config: LabelingConfig) -> Self {
        config.validate();
        Self {
            criteria: MatchCriteria::from_config(&config),
            scratch: LabelingScratch::new(config.width, config.height),
            tracker: TrackerState::new(),
            rng: StdRng::from_os_rng(),
            config,
        }
    }

    /// Makes guid minting reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn config(&self) -> &LabelingConfig {
        &self.config
    }

    /// Labels `depth`, tracks its components and paints them into
    /// `components`.
    ///
    /// Does nothing, leaving `components` untouched, when either frame is
    /// missing or does not match the configured resolution with 4-byte
    /// pixels. Use [`try_apply`](Self::try_apply) to learn why.
    pub fn apply(&mut self, depth: Option<&Frame>, components: Option<&mut Frame>, threshold: f32) {
        if let Err(err) = self.try_apply(depth, components, threshold) {
            log::debug!("Skipping frame: {}", err);
        }
    }

    pub fn try_apply(
        &mut self,
        depth: Option<&Frame>,
        components: Option<&mut Frame>,
        threshold: f32,
    ) -> FrameResult<FrameSummary> {
        let depth = depth.ok_or(FrameError::Missing(FrameRole::Depth))?;
        let output = components.ok_or(FrameError::Missing(FrameRole::Components))?;
        let (width, height) = (self.config.width, self.config.height);
        depth.validate(FrameRole::Depth, width, height, BYTES_PER_PIXEL)?;
        output.validate(FrameRole::Components, width, height, BYTES_PER_PIXEL)?;

        self.scratch.reset(width, height);
        self.scratch.load_depth(depth);
        let num_labels = self.scratch.label(threshold);

        let geometry = geometry::aggregate(
            self.scratch.labels(),
            self.scratch.depth(),
            num_labels,
            &mut self.rng,
        );
        let inherited = self.tracker.track(geometry, &self.criteria);

        let counts = compositor::composite(
            self.scratch.labels_mut(),
            self.tracker.components(),
            &self.config,
            output,
        );

        let summary = FrameSummary {
            components: num_labels as usize,
            retained: counts.foreground,
            background: counts.background,
            rejected: counts.rejected,
            inherited,
        };
        log::trace!(
            "{} components: {} retained, {} background, {} rejected, {} tracked",
            summary.components,
            summary.retained,
            summary.background,
            summary.rejected,
            summary.inherited
        );
        Ok(summary)
    }

    /// Geometry of every component of the last processed frame, indexed by
    /// `label - 1`, including rejected and background ones.
    pub fn components(&self) -> &[ComponentGeometry] {
        self.tracker.components()
    }

    /// Label map of the last processed frame; rejected components are 0.
    pub fn labels(&self) -> &Buffer2<u32> {
        self.scratch.labels()
    }

    /// Forgets tracked identities, e.g. after the stream restarted.
    pub fn reset(&mut self) {
        self.tracker.clear();
    }
}
