use crate::history::TimeAndTransform;
use crate::time::{self, Time};
use crate::transform::RigidTransform;

/// Fraction of the way `time` sits between the two samples, clamped to `[0, 1]`.
fn clamped_fraction(lower: &TimeAndTransform, upper: &TimeAndTransform, time: Time) -> f64 {
    time::percent_of(lower.time, upper.time, time).clamp(0.0, 1.0)
}

/// Interpolate both the time and the transform between two samples.
///
/// Translation is interpolated linearly and rotation spherically. A `time` outside
/// `[lower.time, upper.time]` is clamped to the nearest sample. When both samples share the
/// same timestamp, `upper` is copied as-is.
///
/// # Arguments
/// * `out` - Receives the interpolated sample
/// * `lower` - The sample at the earlier time
/// * `upper` - The sample at the later time
/// * `time` - The time to interpolate at
pub fn interpolate_stamped(
    out: &mut TimeAndTransform,
    lower: &TimeAndTransform,
    upper: &TimeAndTransform,
    time: Time,
) {
    if lower.time == upper.time {
        *out = *upper;
        return;
    }

    let fraction = clamped_fraction(lower, upper, time);
    out.time = time::interpolate(lower.time, upper.time, fraction);
    RigidTransform::interpolate(&mut out.transform, &lower.transform, &upper.transform, fraction);
}

/// Same as [`interpolate_stamped`], only producing the transform.
pub fn interpolate_transform(
    out: &mut RigidTransform,
    lower: &TimeAndTransform,
    upper: &TimeAndTransform,
    time: Time,
) {
    if lower.time == upper.time {
        out.copy_from(&upper.transform);
        return;
    }

    let fraction = clamped_fraction(lower, upper, time);
    RigidTransform::interpolate(out, &lower.transform, &upper.transform, fraction);
}
