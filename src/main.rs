//! Chroma Player main entry point.
//!
//! Plays a frame-sequenced Chroma animation against the in-process effect
//! service, using:
//! - **bevy_ecs** for the entity/resource/system layout
//! - **configparser** for `config.ini`
//! - **serde_json** for animation files
//!
//! # Main Loop
//!
//! 1. Load configuration and build (or load) the animation
//! 2. Insert resources, spawn the animation entity, register observers
//! 3. Load and play the animation
//! 4. Each tick: advance [`WorldTime`], run the schedule, replay on completion
//! 5. Unload every animation before exit
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --preset random --frames 12
//! ```

use std::path::PathBuf;
use std::time::{Duration, Instant};

use bevy_ecs::prelude::*;
use clap::Parser;

use chroma_player::components::animation2d::{ChromaAnimation2D, ColorFrame2D};
use chroma_player::components::curve::AnimationCurve;
use chroma_player::events::animation::AnimationCompleteEvent;
use chroma_player::resources::asset::AnimationAsset2D;
use chroma_player::resources::chromaconfig::ChromaConfig;
use chroma_player::resources::device::{ChromaDevice2D, StandardGeometry};
use chroma_player::resources::effects::{ChromaEffects, LocalEffectService};
use chroma_player::resources::palette::{Preset, blank_frame, rgb};
use chroma_player::resources::worldtime::WorldTime;
use chroma_player::systems::animation2d::{
    load_chroma_animation, play_chroma_animation, play_chroma_animation_with_on_complete,
    unload_chroma_animations, update_chroma_animations,
};
use chroma_player::systems::time::update_world_time;

/// Chroma Player
#[derive(Parser)]
#[command(version, about = "Plays frame-sequenced Chroma animations")]
struct Cli {
    /// INI configuration file (default: ./config.ini).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Animation JSON file to play instead of a generated one.
    #[arg(long, value_name = "PATH")]
    animation: Option<PathBuf>,

    /// Preset used to generate frames: blue, green, red, orange, white, random, clear.
    #[arg(long, default_value = "random")]
    preset: Preset,

    /// Target device, overriding the config file.
    #[arg(long)]
    device: Option<ChromaDevice2D>,

    /// Number of generated frames.
    #[arg(long, default_value_t = 8)]
    frames: usize,

    /// Seed for random frames.
    #[arg(long)]
    seed: Option<u64>,

    /// Write the animation as JSON to this path before playing.
    #[arg(long, value_name = "PATH")]
    save: Option<PathBuf>,

    /// Playback speed multiplier applied to the world clock.
    #[arg(long, default_value_t = 1.0)]
    speed: f32,
}

/// Number of completed playbacks.
#[derive(Resource, Default)]
struct CompletedLoops(u32);

fn count_completed_loops(trigger: On<AnimationCompleteEvent>, mut loops: ResMut<CompletedLoops>) {
    loops.0 += 1;
    log::debug!("{:?} completed loop {}", trigger.event().entity, loops.0);
}

fn generate_frames(
    preset: Preset,
    device: ChromaDevice2D,
    count: usize,
    rng: &mut fastrand::Rng,
) -> Vec<ColorFrame2D> {
    let geometry = StandardGeometry;
    if preset == Preset::Clear {
        return vec![blank_frame(&geometry, device)];
    }
    (0..count.max(1))
        .map(|i| {
            // Solid presets blink: color on even frames, off on odd ones.
            if preset != Preset::Random && i % 2 == 1 {
                blank_frame(&geometry, device)
            } else {
                preset.frame(&geometry, device, rng)
            }
        })
        .collect()
}

fn build_animation(cli: &Cli, config: &ChromaConfig) -> Result<ChromaAnimation2D, String> {
    if let Some(path) = &cli.animation {
        let asset = AnimationAsset2D::load_from_file(path)?;
        let mut animation = ChromaAnimation2D::from_asset(&asset);
        animation.refresh_curve();
        return Ok(animation);
    }

    let device = cli.device.unwrap_or(config.device);
    let mut rng = match cli.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };
    let frames = generate_frames(cli.preset, device, cli.frames, &mut rng);
    let curve = AnimationCurve::from_times(
        (1..=frames.len()).map(|i| i as f32 * config.frame_time),
    );
    match cli.preset.color() {
        Some(color) => {
            let (red, green, blue) = rgb(color);
            log::info!(
                "Generated {} '{}' frames (#{:02x}{:02x}{:02x}) for {}",
                frames.len(),
                cli.preset,
                red,
                green,
                blue,
                device
            );
        }
        None => log::info!(
            "Generated {} '{}' frames for {}",
            frames.len(),
            cli.preset,
            device
        ),
    }
    Ok(ChromaAnimation2D::new(device)
        .with_frames(&frames)
        .with_curve(curve))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ChromaConfig::with_path(path),
        None => ChromaConfig::new(),
    };
    if let Err(e) = config.load_from_file() {
        if cli.config.is_some() {
            log::warn!("{}", e);
        } else {
            log::debug!("{}, using defaults", e);
        }
    }

    let mut animation = match build_animation(&cli, &config) {
        Ok(animation) => animation,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if let Some(path) = &cli.save {
        if let Err(e) = animation.to_asset().save_to_file(path) {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }

    log::info!(
        "{}: {} by {} ({})",
        config.title,
        config.description,
        config.author_name,
        config.author_contact
    );

    // --------------- ECS world + resources ---------------
    let service = LocalEffectService::new();
    let tick_interval = Duration::from_secs_f32(config.tick_interval());
    let loops = config.loops.max(1);

    let mut world = World::new();
    world.insert_resource(WorldTime::default().with_time_scale(cli.speed));
    world.insert_resource(ChromaEffects::new(service.clone()));
    world.insert_resource(CompletedLoops::default());
    world.insert_resource(config);
    world.add_observer(count_completed_loops);
    world.flush();

    let entity = world.spawn(animation).id();

    if let Err(e) = load_chroma_animation(&mut world, entity) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    let started = play_chroma_animation_with_on_complete(&mut world, entity, |finished| {
        log::info!(
            "First playback on {} finished ({} effects)",
            finished.device(),
            finished.effects().len()
        );
    });
    if let Err(e) = started {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let mut update = Schedule::default();
    update.add_systems(update_chroma_animations);

    // --------------- Main loop ---------------
    let mut last = Instant::now();
    loop {
        std::thread::sleep(tick_interval);
        let now = Instant::now();
        update_world_time(&mut world, now.duration_since(last).as_secs_f32());
        last = now;

        update.run(&mut world);

        let completed = world.resource::<CompletedLoops>().0;
        if completed >= loops {
            break;
        }
        let idle = world
            .get::<ChromaAnimation2D>(entity)
            .is_some_and(|a| !a.is_playing());
        if idle {
            log::info!("Replaying ({}/{})", completed + 1, loops);
            if let Err(e) = play_chroma_animation(&mut world, entity) {
                log::error!("{}", e);
                break;
            }
        }
    }

    unload_chroma_animations(&mut world);
    log::info!(
        "Played {} loops, {} effect activations, {} effects left on the service",
        world.resource::<CompletedLoops>().0,
        service.activations().len(),
        service.effect_count()
    );
}
