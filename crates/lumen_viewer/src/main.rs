use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use lumen_core::raster::vertices;
use lumen_core::TextureCache;
use lumen_math::Projection;
use lumen_tracer::{save_png, Encoding, IdleOutcome, Motion, Scene, Session};
use rand::rngs::StdRng;
use rand::SeedableRng;

mod cli;
mod demo;
mod logger;
mod settings;

use cli::Args;
use demo::{demo_camera, floor_texture, DemoGeometry};
use logger::init_logger;
use settings::Settings;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.log_level.clone().into());

    log::info!("Starting Lumen viewer");

    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(passes) = args.passes {
        settings.trace.max_passes = passes;
    }
    if args.linear {
        settings.encoding = Encoding::Linear;
    }

    let demo = DemoGeometry::build(settings.sphere_levels, args.obj.as_deref())?;
    let mut textures = TextureCache::new();
    let floor = floor_texture(&mut textures, args.texture.as_deref())?;
    let mut scene = demo.scene(floor)?;
    scene.configure(&settings.trace);
    if let Some(lighting) = settings.lighting {
        scene.set_lighting(lighting);
    }

    let mut session = Session::new(demo_camera(), args.width, args.height, settings.trace.clone());
    if args.orthographic {
        session.set_projection(Projection::Orthographic);
    }
    let mut rng = StdRng::seed_from_u64(args.seed);

    walk(&mut session, &scene, &mut rng, seconds("--walk", args.walk)?);
    log_draw_list(&session, &scene);

    let time_limit = args
        .time_limit
        .map(|limit| seconds("--time-limit", limit))
        .transpose()?;
    trace(&mut session, &scene, &mut rng, time_limit);

    save_png(session.renderer().buffer(), &args.output, settings.encoding)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;

    Ok(())
}

/// A non-negative, finite number of seconds from the command line.
fn seconds(flag: &str, value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value)
        .with_context(|| format!("Invalid {} value: {} seconds", flag, value))
}

/// Hold the forward key for `duration` the way an interactive host would.
fn walk(session: &mut Session, scene: &Scene, rng: &mut StdRng, duration: Duration) {
    if duration.is_zero() {
        return;
    }

    let start = Instant::now();
    let Some(end) = start.checked_add(duration) else {
        log::warn!("Walk of {:?} is too long, camera left in place", duration);
        return;
    };
    session.set_motion(Motion::FORWARD, true);
    session.idle(start, scene, rng);
    session.idle(end, scene, rng);
    session.set_motion(Motion::FORWARD, false);

    log::info!("Camera moved to {}", session.camera().position());
}

/// Summarize what the rasterizer would draw for the current camera.
fn log_draw_list(session: &Session, scene: &Scene) {
    let camera = session.camera();
    let items = scene.draw_items(camera.world_view(), camera.projection_matrix());

    let mut programs: BTreeMap<String, usize> = BTreeMap::new();
    let mut vertex_count = 0;
    for item in &items {
        *programs.entry(format!("{:?}", item.shader)).or_default() += 1;
        vertex_count += vertices(item.mesh).len();
    }
    log::info!(
        "{} draw items, {} vertices: {:?}",
        items.len(),
        vertex_count,
        programs
    );
}

fn trace(session: &mut Session, scene: &Scene, rng: &mut StdRng, time_limit: Option<Duration>) {
    let start = Instant::now();
    let deadline = time_limit.and_then(|limit| start.checked_add(limit));

    session.toggle_tracing();
    loop {
        let now = Instant::now();
        if deadline.is_some_and(|deadline| now >= deadline) {
            log::warn!("Time limit reached");
            break;
        }

        if let IdleOutcome::Traced(0) = session.idle(now, scene, rng) {
            if session.renderer().is_converged() {
                break;
            }
        }
    }
    session.toggle_tracing();

    log::info!(
        "Traced {} passes in {:.2} s",
        session.renderer().completed_passes(),
        start.elapsed().as_secs_f64()
    );
}
