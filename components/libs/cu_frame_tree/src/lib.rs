//! Time-varying rigid transform tree.
//!
//! Every [`CoordinateFrame`] records a bounded history of its transform relative to its parent.
//! The [`FrameTree`] answers "where is this pose from frame A in frame B at time T?" by
//! interpolating each edge's history and composing the edges along the path between frames.
//!
//! Frames live in an arena and point to their parent by [`FrameIndex`]. Lookups that cannot be
//! answered yet (no sample close enough in time, frames in separate trees) come back as errors
//! for which [`TransformError::is_lookup_miss`] is true.

pub mod config;
pub mod error;
pub mod frame;
pub mod history;
pub mod interpolation;
pub mod resolve;
pub mod time;
pub mod transform;
pub mod tree;

use compact_str::CompactString;

/// Frame identifier strings
pub type FrameIdString = CompactString;

pub use config::{read_configuration, read_configuration_str, FrameLimits, FrameTreeConfig};
pub use error::{TransformError, TransformResult};
pub use frame::{display_name, CoordinateFrame, FrameIndex};
pub use history::{Bracket, TimeAndTransform, TransformHistory};
pub use interpolation::{interpolate_stamped, interpolate_transform};
pub use time::{Duration, Time, MAX_DURATION};
pub use transform::{Pose, RigidTransform};
pub use tree::{Ancestors, FrameTree};

pub use glam::{DMat4, DQuat, DVec3};
