//! Constellation CLI
//!
//! Animate a particle field in a window, or render it headless to PNG.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use constellation::prelude::*;

#[derive(Parser)]
#[command(name = "constellation")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Drifting particle field with proximity connections", long_about = None)]
struct Cli {
    /// JSON config file (overrides --preset)
    config: Option<PathBuf>,

    /// Named preset: constellation, starfield, dense, interactive
    #[arg(short, long, default_value = "constellation")]
    preset: String,

    /// Seed for a reproducible field
    #[arg(short, long)]
    seed: Option<u64>,

    /// Render headless and write a PNG here instead of opening a window
    #[arg(long)]
    png: Option<PathBuf>,

    /// Ticks to simulate before writing the PNG
    #[arg(long, default_value = "120")]
    frames: u32,

    /// Viewport size for headless rendering, as WIDTHxHEIGHT
    #[arg(long)]
    size: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("constellation=info")))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => FieldConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => FieldConfig::preset(&cli.preset)?,
    };
    if let Some(size) = &cli.size {
        let (w, h) = parse_size(size).with_context(|| format!("invalid --size '{size}'"))?;
        config = config.with_viewport(w, h);
    }

    match cli.png {
        Some(out) => render_png(config, cli.seed, cli.frames, &out),
        None => {
            constellation::viewer::run(config, cli.seed)?;
            Ok(())
        }
    }
}

fn render_png(config: FieldConfig, seed: Option<u64>, frames: u32, out: &Path) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let clock = Clock::new(config.step);
    let viewport = config.viewport;
    let mut field = ParticleField::new();
    field.initialize(config, &mut rng)?;

    let mut frame_loop = FrameLoop::new(field, clock);
    let subscription = frame_loop.subscribe();
    let mut target = RasterTarget::new(viewport.width.ceil() as u32, viewport.height.ceil() as u32);

    for _ in 0..frames.max(1) {
        frame_loop.tick_with(1.0 / 60.0, &mut target);
    }
    subscription.cancel();

    target
        .save_png(out)
        .with_context(|| format!("failed to write {}", out.display()))?;
    info!(path = %out.display(), frames, "wrote snapshot");
    Ok(())
}

fn parse_size(s: &str) -> Option<(f32, f32)> {
    let (w, h) = s.split_once('x')?;
    Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
}
