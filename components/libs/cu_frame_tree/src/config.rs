//! Configuration of the frame tree: history limits and lookup tolerance.
//! The configuration is serialized in the RON format, durations are given in nanoseconds.
//!
//! ```ron
//! (
//!     default_limits: (max_storage_time: 10000000000, max_capacity: 10000),
//!     default_max_delta: 500000000,
//!     frames: {
//!         "imu": (max_storage_time: 1000000000, max_capacity: 2000),
//!     },
//! )
//! ```

use crate::error::{TransformError, TransformResult};
use crate::time::{Duration, MAX_DURATION};
use ron::extensions::Extensions;
use ron::Options;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::read_to_string;
use std::path::Path;

/// Bounds of a single frame's transform history.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct FrameLimits {
    /// Maximum span between the oldest and the newest retained sample.
    pub max_storage_time: Duration,
    /// Maximum number of retained samples.
    pub max_capacity: usize,
}

impl FrameLimits {
    pub const DEFAULT_MAX_STORAGE_TIME: Duration = Duration::from_secs(10);
    pub const DEFAULT_MAX_CAPACITY: usize = 10_000;

    pub fn new(max_storage_time: Duration, max_capacity: usize) -> Self {
        Self {
            max_storage_time,
            max_capacity,
        }
    }
}

impl Default for FrameLimits {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_STORAGE_TIME, Self::DEFAULT_MAX_CAPACITY)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FrameTreeConfig {
    /// Limits given to frames without an entry in `frames`.
    #[serde(default)]
    pub default_limits: FrameLimits,
    /// Tolerance used by id-based lookups when the caller does not give one.
    #[serde(default = "default_max_delta")]
    pub default_max_delta: Duration,
    /// Per-frame overrides, keyed by frame id.
    #[serde(default)]
    pub frames: HashMap<String, FrameLimits>,
}

fn default_max_delta() -> Duration {
    MAX_DURATION
}

impl Default for FrameTreeConfig {
    fn default() -> Self {
        Self {
            default_limits: FrameLimits::default(),
            default_max_delta: default_max_delta(),
            frames: HashMap::new(),
        }
    }
}

impl FrameTreeConfig {
    /// History limits a newly created frame with this id gets.
    pub fn limits_for(&self, frame_id: &str) -> FrameLimits {
        self.frames
            .get(frame_id)
            .copied()
            .unwrap_or(self.default_limits)
    }

    fn get_options() -> Options {
        Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .with_default_extension(Extensions::UNWRAP_NEWTYPES)
    }

    pub fn serialize_ron(&self) -> TransformResult<String> {
        let pretty = ron::ser::PrettyConfig::default();
        Self::get_options()
            .to_string_pretty(self, pretty)
            .map_err(|e| TransformError::Config(e.to_string()))
    }

    pub fn deserialize_ron(ron: &str) -> TransformResult<Self> {
        Self::get_options()
            .from_str(ron)
            .map_err(|e| TransformError::Config(format!("Syntax error in config: {e}")))
    }
}

/// Read a frame tree configuration from a file.
pub fn read_configuration(config_filename: impl AsRef<Path>) -> TransformResult<FrameTreeConfig> {
    let path = config_filename.as_ref();
    let config_content = read_to_string(path).map_err(|e| {
        TransformError::Config(format!(
            "Failed to read configuration file {}: {e}",
            path.display()
        ))
    })?;
    read_configuration_str(&config_content)
}

/// Read a frame tree configuration from a string.
pub fn read_configuration_str(config_content: &str) -> TransformResult<FrameTreeConfig> {
    FrameTreeConfig::deserialize_ron(config_content)
}
