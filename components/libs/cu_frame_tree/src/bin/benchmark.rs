use clap::Parser;
use cu_frame_tree::{
    read_configuration, Duration, FrameTree, FrameTreeConfig, Pose, RigidTransform, Time,
};
use glam::{DQuat, DVec3};
use log::{info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::path::PathBuf;
use std::time::Instant;

/// Frame tree resolution benchmark.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of frames in each of the two branches below the root.
    #[arg(long, default_value_t = 50)]
    depth: usize,

    /// Number of samples recorded on every edge.
    #[arg(long, default_value_t = 100)]
    samples: u64,

    /// Number of resolutions to time.
    #[arg(long, default_value_t = 10_000)]
    lookups: u32,

    /// Optional RON configuration for the tree.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
}

const SAMPLE_PERIOD: Duration = Duration::from_millis(10);

fn main() {
    let args = Args::parse();
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .expect("Failed to initialize the logger");

    let config = match &args.config {
        Some(path) => read_configuration(path).expect("Failed to read the configuration"),
        None => FrameTreeConfig::default(),
    };
    let mut tree = FrameTree::with_config(config);

    // root -> left1 -> ... -> leftN and root -> right1 -> ... -> rightN
    info!(
        "Setting up 2 branches of {} frames with {} samples per edge",
        args.depth, args.samples
    );
    for branch in ["left", "right"] {
        for i in 0..args.depth {
            let parent = if i == 0 {
                "root".to_string()
            } else {
                format!("{branch}{i}")
            };
            let child = format!("{branch}{}", i + 1);
            for s in 0..args.samples {
                let angle = s as f64 * 0.01;
                let transform = RigidTransform::new(
                    DVec3::new(0.1, angle.sin(), 0.0),
                    DQuat::from_rotation_z(angle),
                );
                tree.add_transform(&parent, &child, Time(0) + SAMPLE_PERIOD * s, transform)
                    .expect("Failed to add transform");
            }
        }
    }

    let src = tree
        .frame_index(&format!("left{}", args.depth))
        .expect("Missing left leaf");
    let dst = tree
        .frame_index(&format!("right{}", args.depth))
        .expect("Missing right leaf");
    let max_delta = tree.config().default_max_delta;
    let end = Time(0) + SAMPLE_PERIOD * args.samples;

    info!("Resolving leaf to leaf across the root, {} lookups", args.lookups);
    let start = Instant::now();
    let mut resolved = 0u32;
    for i in 0..args.lookups {
        let time = Time(u64::from(i) * 7_919_000 % end.as_nanos().max(1));
        if tree
            .resolve_local(dst, &Pose::IDENTITY, src, time, max_delta)
            .is_ok()
        {
            resolved += 1;
        }
    }
    let elapsed = start.elapsed();
    info!("  {resolved}/{} resolved in {elapsed:?}", args.lookups);
    info!("  Avg: {:?} per lookup", elapsed / args.lookups.max(1));

    let root = tree.frame_index("root").expect("Missing root");
    info!("Resolving through the root with different source and destination times");
    let mut resolved = 0u32;
    let start = Instant::now();
    for i in 0..args.lookups {
        let src_time = Time(u64::from(i) * 7_919_000 % end.as_nanos().max(1));
        let dst_time = src_time + SAMPLE_PERIOD;
        if tree
            .resolve(
                dst,
                &Pose::IDENTITY,
                root,
                src,
                dst_time,
                src_time,
                max_delta,
            )
            .is_ok()
        {
            resolved += 1;
        }
    }
    let elapsed = start.elapsed();
    info!("  {resolved}/{} resolved in {elapsed:?}", args.lookups);
    info!("  Avg: {:?} per lookup", elapsed / args.lookups.max(1));
}
