use approx::assert_relative_eq;
use cu_frame_tree::{
    Duration, FrameLimits, FrameTree, FrameTreeConfig, Pose, RigidTransform, Time,
    TransformError, MAX_DURATION,
};
use glam::{DQuat, DVec3};
use std::f64::consts::FRAC_PI_2;

const ONE_SECOND: Time = Time(1_000_000_000);

fn sensor_on_base() -> FrameTree {
    let mut tree = FrameTree::new();
    tree.add_transform(
        "base",
        "sensor",
        Time(0),
        RigidTransform::from_translation(DVec3::new(0.0, 0.0, 1.0)),
    )
    .unwrap();
    tree
}

#[test]
fn sensor_origin_in_base_at_sample_time() {
    let tree = sensor_on_base();
    let base = tree.frame_index("base").unwrap();
    let sensor = tree.frame_index("sensor").unwrap();

    let out = tree
        .resolve_local(base, &Pose::IDENTITY, sensor, Time(0), Duration::ZERO)
        .unwrap();
    assert_relative_eq!(out.position.x, 0.0);
    assert_relative_eq!(out.position.y, 0.0);
    assert_relative_eq!(out.position.z, 1.0);
}

#[test]
fn single_sample_without_tolerance_fails_later() {
    let tree = sensor_on_base();
    let base = tree.frame_index("base").unwrap();
    let sensor = tree.frame_index("sensor").unwrap();

    let err = tree
        .resolve_local(base, &Pose::IDENTITY, sensor, ONE_SECOND, Duration::ZERO)
        .unwrap_err();
    assert!(matches!(err, TransformError::TransformTimeNotAvailable { .. }));
    assert!(err.is_lookup_miss());
}

#[test]
fn single_sample_with_tolerance_is_clamped() {
    let tree = sensor_on_base();
    let base = tree.frame_index("base").unwrap();
    let sensor = tree.frame_index("sensor").unwrap();

    for tolerance in [Duration::from_secs(1), Duration::from_secs(5), MAX_DURATION] {
        let out = tree
            .resolve_local(base, &Pose::IDENTITY, sensor, ONE_SECOND, tolerance)
            .unwrap();
        assert!(out.position.abs_diff_eq(DVec3::new(0.0, 0.0, 1.0), 1e-12));
    }
}

#[test]
fn chain_matches_manual_composition() {
    // a (root) <- b <- c, with two samples per edge so the query time interpolates
    let mut tree = FrameTree::new();
    let b_in_a = [
        RigidTransform::new(DVec3::new(1.0, 0.0, 0.0), DQuat::IDENTITY),
        RigidTransform::new(DVec3::new(3.0, 0.0, 0.0), DQuat::from_rotation_z(FRAC_PI_2)),
    ];
    let c_in_b = [
        RigidTransform::new(DVec3::new(0.0, 1.0, 0.0), DQuat::from_rotation_x(0.2)),
        RigidTransform::new(DVec3::new(0.0, 2.0, 1.0), DQuat::from_rotation_x(0.6)),
    ];
    for (i, t) in [Time(0), ONE_SECOND].into_iter().enumerate() {
        tree.add_transform("a", "b", t, b_in_a[i]).unwrap();
        tree.add_transform("b", "c", t, c_in_b[i]).unwrap();
    }

    let query = Time(250_000_000);
    let mut b_at = RigidTransform::identity();
    let mut c_at = RigidTransform::identity();
    RigidTransform::interpolate(&mut b_at, &b_in_a[0], &b_in_a[1], 0.25);
    RigidTransform::interpolate(&mut c_at, &c_in_b[0], &c_in_b[1], 0.25);
    let expected = RigidTransform::compose(&b_at, &c_at);

    let input = Pose::new(DVec3::new(0.5, -0.5, 2.0), DQuat::from_rotation_y(0.3));
    let (a, c) = (tree.frame_index("a").unwrap(), tree.frame_index("c").unwrap());
    let out = tree
        .resolve_local(a, &input, c, query, Duration::ZERO)
        .unwrap();
    let manual = RigidTransform::compose(&expected, &RigidTransform::from_pose(&input)).pose();
    assert!(out.approx_eq(&manual, 1e-9));

    let looked_up = tree.lookup_transform("a", "c", query, None).unwrap();
    assert!(looked_up.approx_eq(&expected, 1e-9));
}

#[test]
fn reparenting_invalidates_lookups_until_new_samples() {
    let mut tree = sensor_on_base();
    tree.add_transform("world", "mount", Time(0), RigidTransform::identity())
        .unwrap();
    let sensor = tree.frame_index("sensor").unwrap();
    let mount = tree.frame_index("mount").unwrap();

    assert!(tree.set_parent(sensor, mount).unwrap());
    let err = tree
        .lookup_pose("mount", "sensor", &Pose::IDENTITY, Time(0), None)
        .unwrap_err();
    assert!(err.is_lookup_miss());

    tree.add_transform(
        "mount",
        "sensor",
        Time(0),
        RigidTransform::from_translation(DVec3::Y),
    )
    .unwrap();
    let pose = tree
        .lookup_pose("world", "sensor", &Pose::IDENTITY, Time(0), None)
        .unwrap();
    assert!(pose.position.abs_diff_eq(DVec3::Y, 1e-12));
}

#[test]
fn configured_tolerance_applies_to_id_lookups() {
    let config = FrameTreeConfig {
        default_limits: FrameLimits::default(),
        default_max_delta: Duration::from_millis(100),
        frames: Default::default(),
    };
    let mut tree = FrameTree::with_config(config);
    tree.add_transform("map", "robot", Time(0), RigidTransform::identity())
        .unwrap();

    assert!(tree
        .lookup_transform("map", "robot", Time(100_000_000), None)
        .is_ok());
    assert!(tree
        .lookup_transform("map", "robot", Time(100_000_001), None)
        .is_err());
    // an explicit tolerance overrides the configured one
    assert!(tree
        .lookup_transform("map", "robot", Time(100_000_001), Some(MAX_DURATION))
        .is_ok());
}
