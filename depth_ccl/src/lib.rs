//! Segmentation and tracking stage for depth-camera frames.
//!
//! A depth frame is split into blobs of pixels whose depths are close to
//! their neighbours, every blob gets a persistent guid across frames, and the
//! result is painted into a packed-colour components frame for live display.
//!
//! ```rust,ignore
//! use depth_ccl::{ConnectedComponentLabeling, Frame};
//!
//! let mut ccl = ConnectedComponentLabeling::new();
//! let mut components = Frame::new(512, 424, 4);
//! for depth in stream {
//!     ccl.apply(Some(&depth), Some(&mut components), 0.01);
//! }
//! ```

pub mod compositor;
pub mod config;
pub mod frame;
pub mod geometry;
pub mod labeling;
pub mod pipeline;
pub mod tracker;

pub use compositor::guid_color;
pub use config::LabelingConfig;
pub use frame::{Frame, FrameError, FrameResult, FrameRole};
pub use geometry::{ComponentGeometry, Guid};
pub use pipeline::{ConnectedComponentLabeling, FrameSummary};
pub use tracker::{MatchCriteria, TrackerState};
