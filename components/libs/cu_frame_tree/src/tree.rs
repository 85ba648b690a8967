use crate::config::{FrameLimits, FrameTreeConfig};
use crate::error::{TransformError, TransformResult};
use crate::frame::{CoordinateFrame, FrameIndex};
use crate::time::Time;
use crate::transform::RigidTransform;
use crate::FrameIdString;
use log::{debug, warn};
use std::collections::HashMap;

/// Arena owning every coordinate frame of a forest.
///
/// Frames are addressed by a stable [`FrameIndex`] and only store the index of their parent,
/// so ancestor walks are plain index chases. Frames are never removed: an index handed out by
/// a tree stays valid for the lifetime of that tree.
///
/// The tree is not internally synchronized. It is meant to be fed and queried from a single
/// update loop; share it across threads behind a lock.
///
/// # Example
/// ```
/// use cu_frame_tree::{FrameTree, Pose, RigidTransform, Time, MAX_DURATION};
/// use glam::DVec3;
///
/// let mut tree = FrameTree::new();
/// tree.add_transform("base", "sensor", Time(0), RigidTransform::from_translation(DVec3::Z))
///     .unwrap();
///
/// let base = tree.frame_index("base").unwrap();
/// let sensor = tree.frame_index("sensor").unwrap();
/// let pose = tree
///     .resolve_local(base, &Pose::IDENTITY, sensor, Time(0), MAX_DURATION)
///     .unwrap();
/// assert!(pose.position.abs_diff_eq(DVec3::Z, 1e-12));
/// ```
#[derive(Clone, Debug, Default)]
pub struct FrameTree {
    pub(crate) frames: Vec<CoordinateFrame>,
    frame_indices: HashMap<FrameIdString, FrameIndex>,
    config: FrameTreeConfig,
}

impl FrameTree {
    pub fn new() -> Self {
        Self::with_config(FrameTreeConfig::default())
    }

    pub fn with_config(config: FrameTreeConfig) -> Self {
        Self {
            frames: Vec::new(),
            frame_indices: HashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &FrameTreeConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// All frames, in creation order.
    pub fn frames(&self) -> impl Iterator<Item = (FrameIndex, &CoordinateFrame)> + '_ {
        self.frames
            .iter()
            .enumerate()
            .map(|(i, frame)| (FrameIndex(i as u32), frame))
    }

    pub fn frame_index(&self, frame_id: &str) -> Option<FrameIndex> {
        self.frame_indices.get(frame_id).copied()
    }

    pub fn frame(&self, index: FrameIndex) -> TransformResult<&CoordinateFrame> {
        self.frames
            .get(index.index())
            .ok_or_else(|| TransformError::FrameNotFound(index.to_string()))
    }

    pub fn frame_mut(&mut self, index: FrameIndex) -> TransformResult<&mut CoordinateFrame> {
        self.frames
            .get_mut(index.index())
            .ok_or_else(|| TransformError::FrameNotFound(index.to_string()))
    }

    pub fn frame_by_id(&self, frame_id: &str) -> TransformResult<&CoordinateFrame> {
        self.frame(self.require_frame(frame_id)?)
    }

    pub(crate) fn require_frame(&self, frame_id: &str) -> TransformResult<FrameIndex> {
        self.frame_index(frame_id)
            .ok_or_else(|| TransformError::FrameNotFound(frame_id.to_string()))
    }

    /// Index of the frame `frame_id`, creating it as a root when it does not exist yet.
    /// New frames take their history limits from the configuration.
    pub fn get_or_create_frame(&mut self, frame_id: &str) -> FrameIndex {
        if let Some(index) = self.frame_index(frame_id) {
            return index;
        }
        let limits = self.config.limits_for(frame_id);
        self.push_frame(frame_id, limits)
    }

    /// Create `frame_id` with explicit history limits, or return the existing frame untouched.
    pub fn get_or_create_frame_with_limits(
        &mut self,
        frame_id: &str,
        limits: FrameLimits,
    ) -> FrameIndex {
        match self.frame_index(frame_id) {
            Some(index) => index,
            None => self.push_frame(frame_id, limits),
        }
    }

    fn push_frame(&mut self, frame_id: &str, limits: FrameLimits) -> FrameIndex {
        let index = FrameIndex(self.frames.len() as u32);
        let id = FrameIdString::from(frame_id);
        let frame = CoordinateFrame::new(id.clone(), None, &limits);
        debug!("new frame {} {index}", frame.display_name());
        self.frames.push(frame);
        self.frame_indices.insert(id, index);
        index
    }

    /// Create (or find) `frame_id` and attach it to `parent` when one is given.
    pub fn add_frame(
        &mut self,
        frame_id: &str,
        parent: Option<FrameIndex>,
    ) -> TransformResult<FrameIndex> {
        if let Some(parent) = parent {
            self.frame(parent)?;
        }
        let index = self.get_or_create_frame(frame_id);
        if let Some(parent) = parent {
            self.set_parent(index, parent)?;
        }
        Ok(index)
    }

    /// Attach `child` to `parent`. Switching to a different parent clears the child's history.
    /// Returns true if the history was cleared.
    ///
    /// Fails with [`TransformError::CyclicTransformTree`] if `parent` is `child` itself or one
    /// of its descendants; the tree is left unchanged in that case.
    pub fn set_parent(&mut self, child: FrameIndex, parent: FrameIndex) -> TransformResult<bool> {
        self.frame(parent)?;
        self.frame(child)?;
        if parent == child || self.has_ancestor(parent, child) {
            let err = TransformError::CyclicTransformTree {
                frame: self.frames[child.index()].id().to_string(),
                parent: self.frames[parent.index()].id().to_string(),
            };
            warn!("{err}");
            return Err(err);
        }
        Ok(self.frames[child.index()].set_parent(parent))
    }

    /// Record the transform from `child_id` to `parent_id` at `time`, creating both frames if
    /// needed and (re)attaching the child to the parent first.
    pub fn add_transform(
        &mut self,
        parent_id: &str,
        child_id: &str,
        time: Time,
        transform: RigidTransform,
    ) -> TransformResult<()> {
        let parent = self.get_or_create_frame(parent_id);
        let child = self.get_or_create_frame(child_id);
        self.set_parent(child, parent)?;
        self.frames[child.index()].add_transform(time, transform);
        Ok(())
    }

    /// Walk up the parents of `frame`, nearest first. `frame` itself is not included.
    pub fn ancestors(&self, frame: FrameIndex) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.frames.get(frame.index()).and_then(|f| f.parent()),
        }
    }

    /// Search the ancestors of `frame` (excluding itself) for the frame named `frame_id`.
    pub fn find_ancestor(&self, frame: FrameIndex, frame_id: &str) -> Option<FrameIndex> {
        self.ancestors(frame)
            .find(|ancestor| self.frames[ancestor.index()].id() == frame_id)
    }

    /// True if `ancestor` is a strict ancestor of `frame`.
    pub fn has_ancestor(&self, frame: FrameIndex, ancestor: FrameIndex) -> bool {
        self.ancestors(frame).any(|a| a == ancestor)
    }

    /// The top-most frame above `frame`, or `frame` itself when it has no parent.
    pub fn root(&self, frame: FrameIndex) -> FrameIndex {
        self.ancestors(frame).last().unwrap_or(frame)
    }
}

/// Iterator over the ancestors of a frame, see [`FrameTree::ancestors`].
pub struct Ancestors<'a> {
    tree: &'a FrameTree,
    next: Option<FrameIndex>,
}

impl Iterator for Ancestors<'_> {
    type Item = FrameIndex;

    fn next(&mut self) -> Option<FrameIndex> {
        let current = self.next?;
        self.next = self
            .tree
            .frames
            .get(current.index())
            .and_then(|f| f.parent());
        Some(current)
    }
}
