use clap::Parser;
use roadstream::{
    config::RoadConfig,
    physics::BodyRegistry,
    render::{DrawRecorder, Lighting},
    road::{RoadStreamer, DEFAULT_LANE_TOLERANCE},
};
use tracing::{debug, info, warn};

/// Headless drive along the streamed road, checking the window every frame
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to road.toml configuration file
    #[arg(short, long, default_value = "./road.toml")]
    config: String,

    /// Override log level (trace|debug|info|warn|error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 3600)]
    frames: u32,

    /// Player speed along the road in m/s
    #[arg(short, long, default_value_t = 30.0)]
    speed: f32,

    /// Frame time in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,

    /// Fixed seed for terrain and lane highlights
    #[arg(long)]
    seed: Option<u32>,

    /// Write the final window's terrain as a Wavefront OBJ file
    #[arg(long)]
    export_obj: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let (mut config, load_error) = match RoadConfig::load(&args.config) {
        Ok(config) => (config, None),
        Err(e) => (RoadConfig::default(), Some(e)),
    };
    if let Some(seed) = args.seed {
        config.terrain.seed = Some(seed);
        config.highlight.seed = Some(seed as u64);
    }

    // Initialize tracing
    let log_level = args.log_level.clone().unwrap_or_else(|| config.logging.level.clone());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));
    if config.logging.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("Starting roadstream headless drive");
    match load_error {
        Some(e) => warn!("Failed to load config from {}: {}, using defaults", args.config, e),
        None => info!("Configuration loaded from: {}", args.config),
    }
    config.validate()?;
    info!(
        "Road: {} lanes x {:.2}m, window of {} segments, {:?} eviction",
        config.road.num_lanes, config.road.lane_width, config.road.window_size, config.road.eviction
    );

    let mut physics = BodyRegistry::new();
    let mut streamer = RoadStreamer::from_config(config, &mut physics)?;
    let mut recorder = DrawRecorder::new();
    let lighting = Lighting::default();

    let segment_length = streamer.segment_length();
    let expected_bodies = streamer.body_count();
    let mut player_y = 0.0_f32;
    let mut evictions = 0usize;
    let mut rebuilds = 0usize;
    let mut highlight_changes = 0usize;
    let mut triangles = 0usize;

    for frame in 0..args.frames {
        player_y += args.speed * args.dt as f32;

        let update = streamer.update(args.dt, player_y, &mut physics);
        evictions += update.evicted;
        rebuilds += update.rebuilt as usize;
        if let Some(lane) = update.highlight_changed {
            highlight_changes += 1;
            let center = streamer.layout().center_of_lane(lane);
            debug!(
                "Frame {}: lane {} highlighted (center x={:.3}, maps back to {:?})",
                frame,
                lane,
                center,
                streamer.layout().lane_at(center, DEFAULT_LANE_TOLERANCE)
            );
        }

        recorder.clear();
        streamer.render(&mut recorder, &lighting);
        triangles = recorder.triangle_count();

        check_window(&streamer, segment_length, frame)?;
        if physics.len() != expected_bodies {
            return Err(format!(
                "frame {}: {} live colliders, expected {}",
                frame,
                physics.len(),
                expected_bodies
            )
            .into());
        }
    }

    info!("Drove {:.1}m in {:.1}s of game time", player_y, streamer.clock());
    info!(
        "Recycled {} segments ({} full rebuilds), {} highlight changes",
        evictions, rebuilds, highlight_changes
    );
    info!(
        "Window {:.1}..{:.1}, {} colliders live, {} created in total, {} triangles per frame",
        streamer.front_position(),
        streamer.back_position() + segment_length,
        physics.len(),
        physics.total_created(),
        triangles
    );
    info!("Highlight at player: {:?}", streamer.highlight_at_player());

    if let Some(path) = &args.export_obj {
        std::fs::write(path, streamer.export_obj())?;
        info!("Terrain window exported to {}", path);
    }

    streamer.shutdown(&mut physics);
    if !physics.is_empty() {
        warn!("{} colliders still live after shutdown", physics.len());
    }

    Ok(())
}

fn check_window(streamer: &RoadStreamer, segment_length: f32, frame: u32) -> Result<(), String> {
    let window_size = streamer.config().road.window_size;
    if streamer.len() != window_size {
        return Err(format!("frame {}: window holds {} segments, expected {}", frame, streamer.len(), window_size));
    }

    let ys: Vec<f32> = streamer.segments().map(|s| s.position_y()).collect();
    for pair in ys.windows(2) {
        if ((pair[1] - pair[0]) - segment_length).abs() > 1e-2 {
            return Err(format!("frame {}: gap between segments at y={:.3} and y={:.3}", frame, pair[0], pair[1]));
        }
    }
    Ok(())
}
