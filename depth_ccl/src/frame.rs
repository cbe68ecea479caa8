//! Fixed-size image buffer exchanged with the acquisition and display side.
//!
//! Depth frames carry native-endian `f32` meters (0 = no reading), component
//! frames carry native-endian packed `0x00RRGGBB` colours (0 = unpainted).

use std::fmt;

use bytemuck::{bytes_of, cast_slice, pod_read_unaligned};

/// Which of the two frames handed to the pipeline a check refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRole {
    Depth,
    Components,
}

impl fmt::Display for FrameRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameRole::Depth => f.write_str("depth"),
            FrameRole::Components => f.write_str("components"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("{0} frame is missing")]
    Missing(FrameRole),
    #[error(
        "{} frame is {}x{}, expected {}x{}",
        .role, .actual.0, .actual.1, .expected.0, .expected.1
    )]
    Dimensions {
        role: FrameRole,
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[error("{role} frame has {actual} bytes per pixel, expected {expected}")]
    PixelSize {
        role: FrameRole,
        expected: usize,
        actual: usize,
    },
    #[error("{role} frame buffer holds {actual} bytes, expected {expected}")]
    BufferLength {
        role: FrameRole,
        expected: usize,
        actual: usize,
    },
}

pub type FrameResult<T> = Result<T, FrameError>;

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub bytes_per_pixel: usize,
    pub data: Vec<u8>,
}

impl Frame {
    /// Allocates a zeroed frame.
    pub fn new(width: usize, height: usize, bytes_per_pixel: usize) -> Self {
        Self {
            width,
            height,
            bytes_per_pixel,
            data: vec![0; width * height * bytes_per_pixel],
        }
    }

    /// Packs `width * height` depth samples (meters) into a 4-byte frame.
    pub fn from_depth(width: usize, height: usize, depth: &[f32]) -> Self {
        assert_eq!(
            depth.len(),
            width * height,
            "depth length must equal width * height"
        );
        Self {
            width,
            height,
            bytes_per_pixel: 4,
            data: cast_slice::<f32, u8>(depth).to_vec(),
        }
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Checks the frame against the expected resolution and element size.
    pub fn validate(
        &self,
        role: FrameRole,
        width: usize,
        height: usize,
        bytes_per_pixel: usize,
    ) -> FrameResult<()> {
        if self.width != width || self.height != height {
            return Err(FrameError::Dimensions {
                role,
                expected: (width, height),
                actual: (self.width, self.height),
            });
        }
        if self.bytes_per_pixel != bytes_per_pixel {
            return Err(FrameError::PixelSize {
                role,
                expected: bytes_per_pixel,
                actual: self.bytes_per_pixel,
            });
        }
        let expected = width * height * bytes_per_pixel;
        if self.data.len() != expected {
            return Err(FrameError::BufferLength {
                role,
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    /// Depth samples in raster order. The buffer is not required to be
    /// `f32`-aligned.
    pub fn depth_samples(&self) -> impl Iterator<Item = f32> + '_ {
        self.data.chunks_exact(4).map(pod_read_unaligned::<f32>)
    }

    #[inline]
    pub fn depth_at(&self, index: usize) -> f32 {
        pod_read_unaligned(&self.data[index * 4..index * 4 + 4])
    }

    #[inline]
    pub fn pixel_u32(&self, index: usize) -> u32 {
        pod_read_unaligned(&self.data[index * 4..index * 4 + 4])
    }

    #[inline]
    pub fn set_pixel_u32(&mut self, index: usize, value: u32) {
        self.data[index * 4..index * 4 + 4].copy_from_slice(bytes_of(&value));
    }

    /// Sets every 4-byte element to `value`.
    pub fn fill_u32(&mut self, value: u32) {
        for chunk in self.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(bytes_of(&value));
        }
    }
}
