//! Skytrace command line renderer.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use skytrace_core::{presets, SceneDescription, ShadingMode};
use skytrace_renderer::render_scene;

/// Built-in scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Preset {
    /// Ground with diffuse, glass and metal spheres
    Demo,
    /// The random sphere field, with depth of field
    Spheres,
    /// One gray sphere in front of the camera
    Single,
}

/// Render a scene of spheres under a sky with a path tracer.
#[derive(Debug, Parser)]
#[command(name = "skytrace", version, about)]
struct Args {
    /// JSON scene description (overrides --preset)
    #[arg(short, long)]
    scene: Option<PathBuf>,

    /// Built-in scene to render when no --scene is given
    #[arg(short, long, value_enum, default_value_t = Preset::Demo)]
    preset: Preset,

    /// Output image (.png or .ppm)
    #[arg(short, long, default_value = "output.png")]
    output: PathBuf,

    /// Write the final scene description as JSON and exit
    #[arg(long)]
    dump_scene: Option<PathBuf>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Samples per pixel
    #[arg(long)]
    samples: Option<u32>,

    /// Maximum rays traced per path
    #[arg(long)]
    max_depth: Option<u32>,

    /// Seed for reproducible renders
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads (defaults to one per core)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Shade by surface normal instead of path tracing
    #[arg(long)]
    normals: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    /// Load the scene file or build the chosen preset.
    fn load_scene(&self) -> Result<SceneDescription> {
        if let Some(path) = &self.scene {
            return SceneDescription::load(path)
                .with_context(|| format!("Failed to load scene {}", path.display()));
        }

        Ok(match self.preset {
            Preset::Demo => presets::demo(),
            Preset::Single => presets::single_sphere(),
            Preset::Spheres => {
                let mut rng = match self.seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                presets::random_spheres(&mut rng)
            }
        })
    }

    /// Apply command line overrides on top of the scene's render settings.
    fn apply_overrides(&self, scene: &mut SceneDescription) {
        let render = &mut scene.render;
        if let Some(width) = self.width {
            render.width = width;
        }
        if let Some(height) = self.height {
            render.height = height;
        }
        if let Some(samples) = self.samples {
            render.samples_per_pixel = samples;
        }
        if let Some(max_depth) = self.max_depth {
            render.max_depth = max_depth;
        }
        if self.seed.is_some() {
            render.seed = self.seed;
        }
        if self.threads.is_some() {
            render.threads = self.threads;
        }
        if self.normals {
            render.shading = ShadingMode::Normals;
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.quiet {
        log::LevelFilter::Warn
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    log::info!("Starting Skytrace");

    let mut scene = args.load_scene()?;
    args.apply_overrides(&mut scene);
    scene.validate().context("Invalid scene")?;

    if let Some(path) = &args.dump_scene {
        let json = scene.to_json_string()?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write scene to {}", path.display()))?;
        log::info!("Wrote scene description to {}", path.display());
        return Ok(());
    }

    let output = render_scene(&scene).context("Render failed")?;
    output
        .image
        .save(&args.output)
        .with_context(|| format!("Failed to save image to {}", args.output.display()))?;

    log::info!(
        "Done: {} in {:.2?}",
        args.output.display(),
        output.stats.elapsed
    );
    Ok(())
}
