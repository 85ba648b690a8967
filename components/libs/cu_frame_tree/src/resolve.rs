//! Pose resolution between frames of a [`FrameTree`].
//!
//! A common naming convention for the results is `dst_T_src`, read right to left as "the
//! transform that moves a point from `src` into `dst`".

use crate::error::{TransformError, TransformResult};
use crate::frame::FrameIndex;
use crate::interpolation::interpolate_transform;
use crate::time::{Duration, Time};
use crate::transform::{Pose, RigidTransform};
use crate::tree::FrameTree;
use glam::DMat4;
use log::{error, trace};

impl FrameTree {
    /// Compute `parent_T_child`, the matrix taking points from `child` to `parent` at `time`,
    /// by composing the interpolated transform of every edge between them.
    ///
    /// Fails with a lookup miss as soon as one edge has no sample within `max_delta` of
    /// `time`. `parent` must be `child` or one of its ancestors: reaching a root first fails
    /// with [`TransformError::NotAnAncestor`], which means the caller skipped the ancestry check.
    pub fn edge_matrix(
        &self,
        parent: FrameIndex,
        child: FrameIndex,
        time: Time,
        max_delta: Duration,
    ) -> TransformResult<DMat4> {
        self.frame(parent)?;
        self.frame(child)?;

        let mut out = DMat4::IDENTITY;
        let mut edge = RigidTransform::identity();
        let mut current = child;
        while current != parent {
            let frame = &self.frames[current.index()];
            let Some(next) = frame.parent() else {
                let err = TransformError::NotAnAncestor {
                    parent: self.frames[parent.index()].id().to_string(),
                    child: self.frames[child.index()].id().to_string(),
                };
                error!("{err}");
                return Err(err);
            };

            let bracket = frame.find_bracket(time, max_delta).ok_or_else(|| {
                TransformError::TransformTimeNotAvailable {
                    frame: frame.id().to_string(),
                    time,
                }
            })?;
            interpolate_transform(&mut edge, &bracket.lower, &bracket.upper, time);
            trace!(
                "edge {} -> {next} at {time}: bracket [{}, {}]",
                frame.display_name(),
                bracket.lower.time,
                bracket.upper.time
            );
            out = *edge.matrix() * out;
            current = next;
        }
        Ok(out)
    }

    /// Move `input` from `child` to `parent` at `time`, or from `parent` to `child` when
    /// `invert` is set.
    pub fn apply_edge(
        &self,
        input: &Pose,
        parent: FrameIndex,
        child: FrameIndex,
        invert: bool,
        time: Time,
        max_delta: Duration,
    ) -> TransformResult<Pose> {
        let mut matrix = self.edge_matrix(parent, child, time, max_delta)?;
        if invert {
            matrix = matrix.inverse();
        }
        let moved = matrix * *RigidTransform::from_pose(input).matrix();
        Ok(RigidTransform::from_matrix_unscaled(&moved).pose())
    }

    /// Transform `input`, expressed in `src`, into `dst` at `time`, along the shortest path
    /// through the tree: straight up, straight down, or up to the lowest common ancestor and
    /// back down.
    ///
    /// `max_delta` is how far `time` may lie outside an edge's recorded history and still be
    /// clamped to its oldest or newest sample.
    pub fn resolve_local(
        &self,
        dst: FrameIndex,
        input: &Pose,
        src: FrameIndex,
        time: Time,
        max_delta: Duration,
    ) -> TransformResult<Pose> {
        self.frame(dst)?;
        self.frame(src)?;

        if src == dst {
            return Ok(*input);
        }
        if self.has_ancestor(src, dst) {
            return self.apply_edge(input, dst, src, false, time, max_delta);
        }
        if self.has_ancestor(dst, src) {
            return self.apply_edge(input, src, dst, true, time, max_delta);
        }

        let candidates = std::iter::once(src).chain(self.ancestors(src));
        for candidate in candidates {
            if self.has_ancestor(dst, candidate) {
                let common = self.apply_edge(input, candidate, src, false, time, max_delta)?;
                return self.apply_edge(&common, candidate, dst, true, time, max_delta);
            }
        }

        Err(TransformError::NoCommonAncestor {
            from: self.frames[src.index()].id().to_string(),
            to: self.frames[dst.index()].id().to_string(),
        })
    }

    /// Transform `input` from `src` into `root` at `src_time`, then from `root` into `dst` at
    /// `dst_time`.
    ///
    /// Used to compare data captured at different times through a frame considered fixed
    /// over that interval, typically a world or odometry frame.
    #[allow(clippy::too_many_arguments)]
    pub fn resolve(
        &self,
        dst: FrameIndex,
        input: &Pose,
        root: FrameIndex,
        src: FrameIndex,
        dst_time: Time,
        src_time: Time,
        max_delta: Duration,
    ) -> TransformResult<Pose> {
        let in_root = self.resolve_local(root, input, src, src_time, max_delta)?;
        self.resolve_local(dst, &in_root, root, dst_time, max_delta)
    }

    /// [`FrameTree::resolve_local`] by frame ids. Without a `max_delta`, the configured
    /// default tolerance applies.
    pub fn lookup_pose(
        &self,
        dst_id: &str,
        src_id: &str,
        input: &Pose,
        time: Time,
        max_delta: Option<Duration>,
    ) -> TransformResult<Pose> {
        let dst = self.require_frame(dst_id)?;
        let src = self.require_frame(src_id)?;
        let max_delta = max_delta.unwrap_or(self.config().default_max_delta);
        self.resolve_local(dst, input, src, time, max_delta)
    }

    /// `dst_T_src` at `time` by frame ids.
    pub fn lookup_transform(
        &self,
        dst_id: &str,
        src_id: &str,
        time: Time,
        max_delta: Option<Duration>,
    ) -> TransformResult<RigidTransform> {
        let pose = self.lookup_pose(dst_id, src_id, &Pose::IDENTITY, time, max_delta)?;
        Ok(RigidTransform::from_pose(&pose))
    }
}
