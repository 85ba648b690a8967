use cu_frame_tree::{FrameTree, Pose, RigidTransform, Time, MAX_DURATION};
use glam::{DQuat, DVec3};

fn main() {
    let mut tree = FrameTree::new();

    // world -> robot, sampled twice while the robot drives forward
    tree.add_transform(
        "world",
        "robot",
        Time::from_secs(1),
        RigidTransform::from_translation(DVec3::new(1.0, 2.0, 0.0)),
    )
    .expect("Failed to add world_to_robot transform");
    tree.add_transform(
        "world",
        "robot",
        Time::from_secs(2),
        RigidTransform::from_translation(DVec3::new(2.0, 2.0, 0.0)),
    )
    .expect("Failed to add world_to_robot transform");

    // robot -> camera, a fixed mount looking left
    tree.add_transform(
        "robot",
        "camera",
        Time::from_secs(1),
        RigidTransform::new(
            DVec3::new(0.2, 0.0, 0.3),
            DQuat::from_rotation_z(std::f64::consts::FRAC_PI_2),
        ),
    )
    .expect("Failed to add robot_to_camera transform");

    let time = Time(1_500_000_000);
    match tree.lookup_transform("world", "camera", time, None) {
        Ok(t) => {
            println!("Transform from camera to world at {time}:");
            let p = t.translation();
            println!("Translation: [{}, {}, {}]", p.x, p.y, p.z);
        }
        Err(e) => {
            println!("Error looking up transform: {e}");
        }
    }

    let world = tree.frame_index("world").expect("world frame");
    let camera = tree.frame_index("camera").expect("camera frame");
    let target = Pose::from_position(DVec3::new(1.0, 0.0, 0.0));
    match tree.resolve_local(world, &target, camera, time, MAX_DURATION) {
        Ok(pose) => println!("Target seen by the camera is at {} in world", pose.position),
        Err(e) => println!("Error resolving target: {e}"),
    }
}
