//! Replays a synthetic depth stream through the labeling pipeline and logs
//! the tracked components of every frame.
//!
//! Usage: `ccl_replay [config.yaml] [frame_count]`

use anyhow::Context;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use depth_ccl::{ConnectedComponentLabeling, Frame, LabelingConfig};

const WALL_DEPTH: f32 = 3.0;
const SPECKS_PER_FRAME: usize = 40;

/// A box sliding across the view in front of the wall.
struct MovingBox {
    x: i64,
    y: i64,
    size: usize,
    depth: f32,
    velocity: (i64, i64),
}

impl MovingBox {
    fn advance(&mut self, width: usize, height: usize) {
        let max_x = (width - self.size) as i64;
        let max_y = (height - self.size) as i64;
        self.x += self.velocity.0;
        self.y += self.velocity.1;
        if self.x < 0 || self.x > max_x {
            self.velocity.0 = -self.velocity.0;
            self.x = self.x.clamp(0, max_x);
        }
        if self.y < 0 || self.y > max_y {
            self.velocity.1 = -self.velocity.1;
            self.y = self.y.clamp(0, max_y);
        }
    }

    fn draw(&self, depth: &mut [f32], width: usize) {
        let (x0, y0) = (self.x as usize, self.y as usize);
        for y in y0..y0 + self.size {
            depth[y * width + x0..y * width + x0 + self.size].fill(self.depth);
        }
    }
}

fn render(boxes: &[MovingBox], config: &LabelingConfig, rng: &mut StdRng) -> Frame {
    let (width, height) = (config.width, config.height);
    let mut depth = vec![WALL_DEPTH; width * height];
    for moving in boxes {
        moving.draw(&mut depth, width);
    }
    // Dropouts and flying pixels, as a time-of-flight sensor produces them.
    for _ in 0..SPECKS_PER_FRAME {
        let idx = rng.random_range(0..depth.len());
        depth[idx] = if rng.random_bool(0.5) {
            0.0
        } else {
            rng.random_range(0.5..WALL_DEPTH)
        };
    }
    Frame::from_depth(width, height, &depth)
}

fn main() -> anyhow::Result<()> {
    common::setup_logging("info");

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => LabelingConfig::load(&path)?,
        None => LabelingConfig::default(),
    };
    let frame_count: usize = match args.next() {
        Some(count) => count
            .parse()
            .with_context(|| format!("Invalid frame count: {}", count))?,
        None => 60,
    };
    anyhow::ensure!(
        config.width >= 160 && config.height >= 160,
        "replay needs at least a 160x160 frame, got {}x{}",
        config.width,
        config.height
    );

    let mut rng = StdRng::seed_from_u64(0x5EED);
    let mut boxes = vec![
        MovingBox {
            x: 40,
            y: 40,
            size: 48,
            depth: 1.0,
            velocity: (6, 3),
        },
        MovingBox {
            x: config.width as i64 - 120,
            y: config.height as i64 - 100,
            size: 32,
            depth: 1.6,
            velocity: (-4, -5),
        },
    ];

    let mut ccl = ConnectedComponentLabeling::with_config(config.clone());
    let mut output = Frame::new(config.width, config.height, 4);

    for frame_index in 0..frame_count {
        let depth = render(&boxes, &config, &mut rng);
        let summary = ccl.try_apply(Some(&depth), Some(&mut output), config.default_threshold)?;
        log::info!(
            "frame {:3}: {} components, {} painted, {} background, {} noise, {} tracked",
            frame_index,
            summary.components,
            summary.retained,
            summary.background,
            summary.rejected,
            summary.inherited
        );
        for component in ccl
            .components()
            .iter()
            .filter(|c| c.pixel_count > config.min_component_pixels)
        {
            log::debug!(
                "  guid {} at ({}, {}), {} px, {:.2} m",
                component.guid,
                component.centroid_x,
                component.centroid_y,
                component.pixel_count,
                component.average_depth
            );
        }

        for moving in boxes.iter_mut() {
            moving.advance(config.width, config.height);
        }
    }

    Ok(())
}
