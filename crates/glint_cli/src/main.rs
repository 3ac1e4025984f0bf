//! Glint command line driver.
//!
//! Stands in for an interactive editor: builds the demo scene, requests a
//! render once per simulated display frame until the target iteration is
//! reached, and writes the final front buffer to an image file.

mod scene;

use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use glint_math::{Transform, Vec3};
use glint_renderer::{
    PrimitiveId, RenderScheduler, RenderSettings, RenderState, SchedulerConfig, World,
};

/// One simulated display refresh.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Render the Glint demo scene progressively and save it
#[derive(Parser, Debug)]
#[command(name = "glint", version, about)]
struct Args {
    /// Image width in pixels
    #[arg(short = 'W', long, default_value_t = 320)]
    width: u32,

    /// Image height in pixels
    #[arg(short = 'H', long, default_value_t = 180)]
    height: u32,

    /// Stop once this iteration is reached (overrides the settings file)
    #[arg(short, long)]
    iterations: Option<f32>,

    /// Worker threads (defaults to available cores, at most 8)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Output image; the format follows the extension
    #[arg(short, long, default_value = "glint.png")]
    output: PathBuf,

    /// JSON file with render settings; missing fields use defaults
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Intersect by linear scan instead of the BVH
    #[arg(long)]
    linear: bool,

    /// Seed for BVH construction and sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Sample every pixel from the first pass
    #[arg(long)]
    no_progressive: bool,

    /// Move the glass sphere once this iteration is reached, restarting
    /// the render
    #[arg(long)]
    nudge_after: Option<f32>,

    /// Image file to use as the ground texture
    #[arg(long)]
    ground_texture: Option<PathBuf>,
}

fn load_settings(args: &Args) -> Result<RenderSettings> {
    let mut settings = match &args.settings {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading settings {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing settings {}", path.display()))?
        }
        None => RenderSettings::default().with_target_iteration(64.0),
    };

    if let Some(iterations) = args.iterations {
        settings.target_iteration = iterations;
    }
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    if args.no_progressive {
        settings.extra_progressive = false;
    }
    Ok(settings)
}

/// Lift the movable object and rebuild, as an editor drag would.
fn nudge(
    scheduler: &mut RenderScheduler,
    world: &RwLock<World>,
    state: &RenderState,
    id: PrimitiveId,
) -> Result<()> {
    scheduler.signal_scene_change(state);

    let mut world = world.write().map_err(|_| anyhow!("world lock poisoned"))?;
    let primitive = world
        .primitive_mut(id)
        .ok_or_else(|| anyhow!("movable object {:?} is gone", id))?;
    let lifted = primitive.transform.translation() + Vec3::new(0.0, 0.4, 0.0);
    primitive.transform = Transform::from_translation(lifted);
    primitive.update();
    log::info!("Moved '{}' to {:?}, restarting render", primitive.name, lifted);

    world.rebuild_acceleration()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let settings = load_settings(&args)?;
    let mut config = SchedulerConfig::default();
    if let Some(threads) = args.threads {
        config.thread_count = threads;
    }

    let aspect_ratio = args.width as f32 / args.height.max(1) as f32;
    let seed = args.seed.unwrap_or(glint_renderer::DEFAULT_WORLD_SEED);
    let mut demo = scene::demo(aspect_ratio, seed, args.ground_texture.as_deref())
        .context("building demo scene")?;
    demo.world.set_use_bvh(!args.linear);
    log::info!(
        "Scene: {} primitives, {} intersection",
        demo.world.len(),
        if args.linear { "linear" } else { "BVH" }
    );

    let camera = Arc::new(RwLock::new(demo.camera));
    let world = Arc::new(RwLock::new(demo.world));
    let state = Arc::new(RenderState::new(args.width, args.height, settings)?);
    let mut scheduler = RenderScheduler::new(&config)?;
    log::info!(
        "Rendering {}x{} to iteration {} on {} threads",
        args.width,
        args.height,
        state.target_iteration(),
        scheduler.thread_count()
    );

    let start = Instant::now();
    let mut pending_nudge = args.nudge_after;
    let mut last_logged = 0.0;
    while !state.is_complete() {
        scheduler.request_render(&camera, &world, &state)?;
        thread::sleep(FRAME_INTERVAL);

        let iteration = state.iteration();
        if let Some(at) = pending_nudge {
            if iteration >= at {
                nudge(&mut scheduler, &world, &state, demo.movable)?;
                pending_nudge = None;
                last_logged = 0.0;
                continue;
            }
        }

        if iteration.floor() >= last_logged + 10.0 {
            last_logged = iteration.floor();
            log::info!(
                "Iteration {:.1}/{} ({:.2?} last pass)",
                iteration,
                state.target_iteration(),
                state.last_render_duration()
            );
        }
    }
    scheduler.wait();
    log::info!("Finished iteration {:.1} in {:.2?}", state.iteration(), start.elapsed());

    let front = state.front_buffer();
    image::save_buffer(&args.output, &front, args.width, args.height, image::ColorType::Rgb8)
        .with_context(|| format!("writing {}", args.output.display()))?;
    log::info!("Saved {}", args.output.display());

    Ok(())
}
