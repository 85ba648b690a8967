//! Coordinate frames: the nodes of the transform tree.

use crate::config::FrameLimits;
use crate::history::{Bracket, TransformHistory};
use crate::time::{Duration, Time};
use crate::transform::RigidTransform;
use crate::FrameIdString;
use log::debug;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt::{Display, Formatter};

/// Stable handle of a frame inside a [`crate::FrameTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FrameIndex(pub(crate) u32);

impl FrameIndex {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl Display for FrameIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named 3D coordinate frame with an optional parent and a history of transforms from this
/// frame to its parent.
///
/// Frames only know their parent. Children are implicit: any frame whose parent is this one.
#[derive(Clone, Debug, Serialize)]
pub struct CoordinateFrame {
    id: FrameIdString,
    parent: Option<FrameIndex>,
    history: TransformHistory,
}

impl CoordinateFrame {
    pub(crate) fn new(id: FrameIdString, parent: Option<FrameIndex>, limits: &FrameLimits) -> Self {
        Self {
            id,
            parent,
            history: TransformHistory::new(limits.max_storage_time, limits.max_capacity),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent(&self) -> Option<FrameIndex> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Reparent this frame. Moving to a different parent drops the whole history since the
    /// samples were relative to the previous parent. Returns true if the history was cleared.
    ///
    /// Acyclicity is checked by [`crate::FrameTree::set_parent`], which is the public entry point.
    pub(crate) fn set_parent(&mut self, parent: FrameIndex) -> bool {
        let cleared = match self.parent {
            Some(current) if current != parent => {
                self.history.clear();
                debug!(
                    "frame {} moved from parent {current} to {parent}, history cleared",
                    self.display_name()
                );
                true
            }
            _ => false,
        };
        self.parent = Some(parent);
        cleared
    }

    pub fn history(&self) -> &TransformHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut TransformHistory {
        &mut self.history
    }

    /// Record the transform from this frame to its parent at `time`.
    pub fn add_transform(&mut self, time: Time, transform: RigidTransform) {
        self.history.insert(time, transform);
    }

    pub fn find_bracket(&self, time: Time, max_delta: Duration) -> Option<Bracket> {
        self.history.find_bracket(time, max_delta)
    }

    pub fn max_storage_time(&self) -> Duration {
        self.history.max_storage_time()
    }

    pub fn set_max_storage_time(&mut self, max_storage_time: Duration) {
        self.history.set_max_storage_time(max_storage_time);
    }

    pub fn max_capacity(&self) -> usize {
        self.history.max_capacity()
    }

    pub fn set_max_capacity(&mut self, max_capacity: usize) {
        self.history.set_max_capacity(max_capacity);
    }

    pub fn display_name(&self) -> Cow<'_, str> {
        display_name(&self.id)
    }
}

/// Display-friendly rendition of a frame id: quoted when it is empty or starts or ends with
/// whitespace, verbatim otherwise. Only meant for humans, never for lookups.
pub fn display_name(frame_id: &str) -> Cow<'_, str> {
    if frame_id.is_empty()
        || frame_id.starts_with(char::is_whitespace)
        || frame_id.ends_with(char::is_whitespace)
    {
        Cow::Owned(format!("\"{frame_id}\""))
    } else {
        Cow::Borrowed(frame_id)
    }
}
