use bincode::de::Decoder;
use bincode::enc::Encoder;
use bincode::error::{DecodeError, EncodeError};
use bincode::{Decode, Encode};
use glam::{DMat4, DQuat, DVec3};
use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// A position and orientation expressed in some coordinate frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: DVec3,
    pub orientation: DQuat,
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: DVec3::ZERO,
        orientation: DQuat::IDENTITY,
    };

    pub fn new(position: DVec3, orientation: DQuat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn from_position(position: DVec3) -> Self {
        Self::new(position, DQuat::IDENTITY)
    }

    pub fn approx_eq(&self, other: &Pose, epsilon: f64) -> bool {
        self.position.abs_diff_eq(other.position, epsilon)
            && quat_approx_eq(self.orientation, other.orientation, epsilon)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Encode for Pose {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        self.position.to_array().encode(encoder)?;
        self.orientation.to_array().encode(encoder)
    }
}

impl<Context> Decode<Context> for Pose {
    fn decode<D: Decoder<Context = Context>>(decoder: &mut D) -> Result<Self, DecodeError> {
        let position: [f64; 3] = Decode::decode(decoder)?;
        let orientation: [f64; 4] = Decode::decode(decoder)?;
        Ok(Self::new(
            DVec3::from_array(position),
            DQuat::from_array(orientation),
        ))
    }
}

/// RigidTransform represents a 3D rigid transformation (translation + rotation, no scale or
/// shear). The equivalent 4x4 homogeneous matrix `T * R` is kept alongside and refreshed on
/// every mutation so chain composition can multiply matrices directly.
///
/// The rotation is renormalized whenever it is set, composed or interpolated.
///
/// # Example
/// ```
/// use cu_frame_tree::RigidTransform;
/// use glam::{DQuat, DVec3};
///
/// let lift = RigidTransform::from_translation(DVec3::new(0.0, 0.0, 1.0));
/// let turn = RigidTransform::from_rotation(DQuat::from_rotation_z(std::f64::consts::FRAC_PI_2));
///
/// // apply `turn` first, then `lift`
/// let both = RigidTransform::compose(&lift, &turn);
/// let p = both.transform_point(DVec3::X);
/// assert!(p.abs_diff_eq(DVec3::new(0.0, 1.0, 1.0), 1e-12));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(from = "TransformRepr", into = "TransformRepr")]
pub struct RigidTransform {
    translation: DVec3,
    rotation: DQuat,
    matrix: DMat4,
}

/// On-the-wire shape of a transform: the cached matrix is never stored.
#[derive(Serialize, Deserialize)]
struct TransformRepr {
    translation: [f64; 3],
    /// x, y, z, w
    rotation: [f64; 4],
}

impl From<TransformRepr> for RigidTransform {
    fn from(repr: TransformRepr) -> Self {
        Self::new(
            DVec3::from_array(repr.translation),
            DQuat::from_array(repr.rotation),
        )
    }
}

impl From<RigidTransform> for TransformRepr {
    fn from(tf: RigidTransform) -> Self {
        Self {
            translation: tf.translation.to_array(),
            rotation: tf.rotation.to_array(),
        }
    }
}

impl RigidTransform {
    pub fn identity() -> Self {
        Self {
            translation: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
            matrix: DMat4::IDENTITY,
        }
    }

    /// Build a transform from a translation and a rotation. The rotation must not be
    /// zero-length; it is normalized here.
    pub fn new(translation: DVec3, rotation: DQuat) -> Self {
        let rotation = rotation.normalize();
        Self {
            translation,
            rotation,
            matrix: DMat4::from_rotation_translation(rotation, translation),
        }
    }

    pub fn from_translation(translation: DVec3) -> Self {
        Self::new(translation, DQuat::IDENTITY)
    }

    pub fn from_rotation(rotation: DQuat) -> Self {
        Self::new(DVec3::ZERO, rotation)
    }

    pub fn from_pose(pose: &Pose) -> Self {
        Self::new(pose.position, pose.orientation)
    }

    /// Decompose a homogeneous matrix, discarding any scale component.
    pub fn from_matrix_unscaled(matrix: &DMat4) -> Self {
        let (_scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self::new(translation, rotation)
    }

    pub fn translation(&self) -> DVec3 {
        self.translation
    }

    pub fn rotation(&self) -> DQuat {
        self.rotation
    }

    /// The cached homogeneous matrix.
    pub fn matrix(&self) -> &DMat4 {
        &self.matrix
    }

    pub fn to_matrix(&self) -> DMat4 {
        self.matrix
    }

    pub fn set(&mut self, translation: DVec3, rotation: DQuat) -> &mut Self {
        self.translation = translation;
        self.rotation = rotation.normalize();
        self.matrix = DMat4::from_rotation_translation(self.rotation, self.translation);
        self
    }

    pub fn set_pose(&mut self, pose: &Pose) -> &mut Self {
        self.set(pose.position, pose.orientation)
    }

    pub fn set_matrix_unscaled(&mut self, matrix: &DMat4) -> &mut Self {
        *self = Self::from_matrix_unscaled(matrix);
        self
    }

    pub fn copy_from(&mut self, other: &RigidTransform) -> &mut Self {
        *self = *other;
        self
    }

    /// Write this transform into `out` as a position + orientation.
    pub fn to_pose(&self, out: &mut Pose) {
        out.position = self.translation;
        out.orientation = self.rotation;
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.translation, self.rotation)
    }

    /// `a * b`: the transform that applies `b` first, then `a`.
    pub fn compose(a: &RigidTransform, b: &RigidTransform) -> RigidTransform {
        RigidTransform::new(
            a.translation + a.rotation * b.translation,
            a.rotation * b.rotation,
        )
    }

    /// The transform undoing `self`.
    pub fn inverse(&self) -> RigidTransform {
        let rotation = self.rotation.conjugate();
        RigidTransform::new(-(rotation * self.translation), rotation)
    }

    /// Write into `out` the transform at `fraction` between `a` (0.0) and `b` (1.0).
    /// Translation is interpolated linearly, rotation spherically.
    ///
    /// `fraction` must already be clamped to `[0, 1]`.
    pub fn interpolate(out: &mut RigidTransform, a: &RigidTransform, b: &RigidTransform, fraction: f64) {
        debug_assert!(
            (0.0..=1.0).contains(&fraction),
            "interpolation fraction {fraction} outside [0, 1]"
        );
        let translation = a.translation.lerp(b.translation, fraction);
        let rotation = a.rotation.slerp(b.rotation, fraction);
        out.set(translation, rotation);
    }

    pub fn transform_point(&self, point: DVec3) -> DVec3 {
        self.matrix.transform_point3(point)
    }

    pub fn approx_eq(&self, other: &RigidTransform, epsilon: f64) -> bool {
        self.translation.abs_diff_eq(other.translation, epsilon)
            && quat_approx_eq(self.rotation, other.rotation, epsilon)
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl PartialEq for RigidTransform {
    fn eq(&self, other: &Self) -> bool {
        self.translation == other.translation && self.rotation == other.rotation
    }
}

impl Mul for RigidTransform {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        RigidTransform::compose(&self, &rhs)
    }
}

impl Mul for &RigidTransform {
    type Output = RigidTransform;

    fn mul(self, rhs: Self) -> Self::Output {
        RigidTransform::compose(self, rhs)
    }
}

impl Encode for RigidTransform {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        self.translation.to_array().encode(encoder)?;
        self.rotation.to_array().encode(encoder)
    }
}

impl<Context> Decode<Context> for RigidTransform {
    fn decode<D: Decoder<Context = Context>>(decoder: &mut D) -> Result<Self, DecodeError> {
        let translation: [f64; 3] = Decode::decode(decoder)?;
        let rotation: [f64; 4] = Decode::decode(decoder)?;
        Ok(Self::new(
            DVec3::from_array(translation),
            DQuat::from_array(rotation),
        ))
    }
}

// q and -q encode the same rotation.
fn quat_approx_eq(a: DQuat, b: DQuat, epsilon: f64) -> bool {
    a.abs_diff_eq(b, epsilon) || a.abs_diff_eq(-b, epsilon)
}
