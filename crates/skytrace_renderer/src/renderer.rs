//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing bounded by a maximum depth
//! - Anti-aliasing via multi-sampling
//! - Parallel scanlines on a fixed-size rayon thread pool

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::{Camera, Color, Hittable, Ray, World};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use skytrace_core::{FrameBuffer, RenderSettings, SceneDescription, SceneError, ShadingMode};
use skytrace_math::{lerp, Interval};
use thiserror::Error;

/// Minimum ray parameter for a hit, to avoid self-intersection ("shadow acne").
pub const HIT_EPSILON: f32 = 1e-3;

/// Errors that can occur while setting up a render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid scene: {0}")]
    Scene(#[from] SceneError),

    #[error("Failed to build render thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Render configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum number of rays traced per path
    pub max_depth: u32,
    /// Path tracing or normal visualization
    pub shading: ShadingMode,
    /// Seed for per-row generators (None = entropy)
    pub seed: Option<u64>,
    /// Worker thread count (None = rayon default)
    pub threads: Option<usize>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::from(&RenderSettings::default())
    }
}

impl From<&RenderSettings> for RenderConfig {
    fn from(settings: &RenderSettings) -> Self {
        Self {
            samples_per_pixel: settings.samples_per_pixel,
            max_depth: settings.max_depth,
            shading: settings.shading,
            seed: settings.seed,
            threads: settings.threads,
        }
    }
}

/// Statistics gathered during a render.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderStats {
    pub elapsed: Duration,
    /// Camera rays traced
    pub samples: u64,
    /// Samples whose radiance was not finite and was replaced by black
    pub discarded_samples: u64,
}

/// A finished image together with its statistics.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub image: FrameBuffer,
    pub stats: RenderStats,
}

/// Compute the color seen by a ray.
///
/// This is the core path tracing function. It traces the ray through the
/// world, bouncing off surfaces and multiplying in each bounce's attenuation.
/// `depth` counts the rays already traced on this path; at `max_depth` the
/// path is cut off and contributes no light.
pub fn ray_color(
    ray: &Ray,
    world: &World,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    // If we've exceeded max depth, return black (no light)
    if depth >= config.max_depth {
        return Color::ZERO;
    }

    if ray.is_degenerate() {
        return Color::ZERO;
    }

    // Ray didn't hit anything - return the sky
    let Some(rec) = world.hit(ray, Interval::new(HIT_EPSILON, f32::INFINITY)) else {
        return sky_gradient(ray);
    };

    match world
        .material(rec.material)
        .and_then(|material| material.scatter(ray, &rec, rng))
    {
        Some(result) => {
            result.attenuation * ray_color(&result.scattered, world, depth + 1, config, rng)
        }
        // Ray was absorbed
        None => Color::ZERO,
    }
}

/// Color a primary ray by the normal of the surface it hits.
///
/// Front faces map the unit normal into [0, 1]; back faces and misses show
/// the sky.
pub fn normal_color(ray: &Ray, world: &World) -> Color {
    if ray.is_degenerate() {
        return Color::ZERO;
    }

    match world.hit(ray, Interval::new(0.0, f32::INFINITY)) {
        Some(rec) if rec.front_face => 0.5 * (rec.normal + Color::ONE),
        _ => sky_gradient(ray),
    }
}

/// Trace one camera ray with the configured shading mode.
pub fn trace(ray: &Ray, world: &World, config: &RenderConfig, rng: &mut dyn RngCore) -> Color {
    match config.shading {
        ShadingMode::PathTraced => ray_color(ray, world, 0, config, rng),
        ShadingMode::Normals => normal_color(ray, world),
    }
}

/// Compute sky gradient background.
///
/// Blends from white for rays pointing straight down to sky blue straight up.
pub fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.unit_direction();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    lerp(white, blue, a)
}

/// Render a single pixel with multi-sampling.
///
/// Returns the averaged color and the number of samples discarded because
/// their radiance was not finite. Discarded samples count as black.
pub fn render_pixel(
    camera: &Camera,
    world: &World,
    col: u32,
    row: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> (Color, u32) {
    let mut pixel_color = Color::ZERO;
    let mut discarded = 0;

    for _ in 0..config.samples_per_pixel {
        // Camera.get_ray already adds random offset for anti-aliasing
        let ray = camera.get_ray(col, row, rng);
        let sample = trace(&ray, world, config, rng);

        if sample.is_finite() {
            pixel_color += sample;
        } else {
            discarded += 1;
        }
    }

    // Average the samples
    (pixel_color / config.samples_per_pixel.max(1) as f32, discarded)
}

/// Generator for one scanline.
///
/// With a seed, each row gets its own deterministic stream, so the image
/// does not depend on which thread renders which row.
fn row_rng(seed: Option<u64>, row: u32) -> StdRng {
    match seed {
        Some(seed) => {
            StdRng::seed_from_u64(seed ^ (row as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
        }
        None => StdRng::from_entropy(),
    }
}

/// Render the entire world to a frame buffer.
///
/// Each scanline is an independent task on a dedicated thread pool and owns
/// its own random generator. The only shared mutable state is the progress
/// and statistics counters.
pub fn render(camera: &Camera, world: &World, config: &RenderConfig) -> RenderResult<RenderOutput> {
    if config.samples_per_pixel == 0 {
        return Err(SceneError::ZeroSamples.into());
    }
    if config.max_depth == 0 {
        return Err(SceneError::ZeroDepth.into());
    }

    let width = camera.image_width;
    let height = camera.image_height;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads.unwrap_or(0))
        .thread_name(|i| format!("skytrace-worker-{i}"))
        .build()?;

    log::info!(
        "Rendering {}x{} @ {} spp, max depth {}, {:?} shading, {} threads",
        width,
        height,
        config.samples_per_pixel,
        config.max_depth,
        config.shading,
        pool.current_num_threads()
    );

    let start = Instant::now();
    let rows_done = AtomicU32::new(0);
    let discarded = AtomicU64::new(0);
    let report_every = (height / 10).max(1);

    let rows: Vec<Vec<Color>> = pool.install(|| {
        (0..height)
            .into_par_iter()
            .map(|row| {
                let mut rng = row_rng(config.seed, row);
                let mut row_discarded = 0u64;

                let pixels: Vec<Color> = (0..width)
                    .map(|col| {
                        let (color, bad) = render_pixel(camera, world, col, row, config, &mut rng);
                        row_discarded += u64::from(bad);
                        color
                    })
                    .collect();

                discarded.fetch_add(row_discarded, Ordering::Relaxed);
                let done = rows_done.fetch_add(1, Ordering::Relaxed) + 1;
                log::debug!("rows rendered: {}/{}", done, height);
                if done % report_every == 0 || done == height {
                    log::info!("rows rendered: {}/{}", done, height);
                }

                pixels
            })
            .collect()
    });

    let mut image = FrameBuffer::new(width, height);
    for (row, pixels) in (0u32..).zip(rows) {
        for (col, color) in (0u32..).zip(pixels) {
            image.set_pixel(row, col, color);
        }
    }

    let stats = RenderStats {
        elapsed: start.elapsed(),
        samples: u64::from(width) * u64::from(height) * u64::from(config.samples_per_pixel),
        discarded_samples: discarded.into_inner(),
    };

    log::info!(
        "Rendered in {:.2?} ({:.2}M samples)",
        stats.elapsed,
        stats.samples as f64 / 1_000_000.0
    );
    if stats.discarded_samples > 0 {
        log::warn!(
            "{} samples had non-finite radiance and were treated as black",
            stats.discarded_samples
        );
    }

    Ok(RenderOutput { image, stats })
}

/// Validate a scene description, build it and render it.
pub fn render_scene(scene: &SceneDescription) -> RenderResult<RenderOutput> {
    let world = World::from_description(scene)?;
    let camera = Camera::from_settings(&scene.camera, scene.render.width, scene.render.height)?;
    render(&camera, &world, &RenderConfig::from(&scene.render))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HitRecord, Lambertian, MaterialId, Metal, Vec3};
    use skytrace_core::presets;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    /// Counts intersection queries and never reports a hit.
    struct Probe(Arc<AtomicUsize>);

    impl Hittable for Probe {
        fn hit(&self, _ray: &Ray, _ray_t: Interval) -> Option<HitRecord> {
            self.0.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    /// Always reports a hit with a material that does not exist.
    struct Phantom;

    impl Hittable for Phantom {
        fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
            Some(HitRecord::new(ray, ray_t.min + 1.0, -ray.unit_direction(), MaterialId(99)))
        }
    }

    fn config(samples_per_pixel: u32, max_depth: u32) -> RenderConfig {
        RenderConfig {
            samples_per_pixel,
            max_depth,
            shading: ShadingMode::PathTraced,
            seed: Some(42),
            threads: Some(2),
        }
    }

    fn single_sphere_render(max_depth: u32) -> FrameBuffer {
        let mut scene = presets::single_sphere();
        scene.render.width = 20;
        scene.render.height = 10;
        scene.render.samples_per_pixel = 1;
        scene.render.max_depth = max_depth;
        scene.render.seed = Some(7);
        scene.render.threads = Some(4);
        render_scene(&scene).unwrap().image
    }

    /// True if `c` lies on the white-to-blue sky line.
    fn is_sky(c: Color) -> bool {
        let t = (1.0 - c.x) / 0.5;
        (c.z - 1.0).abs() < 1e-4 && (c.y - (1.0 - 0.3 * t)).abs() < 1e-4 && (0.0..=1.0).contains(&t)
    }

    #[test]
    fn test_sky_gradient() {
        let up_color = sky_gradient(&Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0)));
        let down_color = sky_gradient(&Ray::new(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0)));

        assert!((up_color - Color::new(0.5, 0.7, 1.0)).length() < 1e-6);
        assert!((down_color - Color::ONE).length() < 1e-6);

        // Direction length does not matter
        let long = sky_gradient(&Ray::new(Vec3::ZERO, Vec3::new(0.0, 10.0, 10.0)));
        let short = sky_gradient(&Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.1, 0.1)));
        assert!((long - short).length() < 1e-6);
    }

    #[test]
    fn test_max_depth_returns_black_without_intersecting() {
        let queries = Arc::new(AtomicUsize::new(0));
        let mut world = World::new();
        world.add(Box::new(Probe(queries.clone())));
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let mut rng = StdRng::seed_from_u64(1);
        let config = config(1, 5);

        assert_eq!(ray_color(&ray, &world, 5, &config, &mut rng), Color::ZERO);
        assert_eq!(queries.load(Ordering::Relaxed), 0);

        // Below the limit the world is queried and the sky shows through
        let sky = ray_color(&ray, &world, 4, &config, &mut rng);
        assert_eq!(queries.load(Ordering::Relaxed), 1);
        assert_eq!(sky, sky_gradient(&ray));
    }

    #[test]
    fn test_empty_world_shows_sky() {
        let world = World::new();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.3, 0.5, -1.0));
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(ray_color(&ray, &world, 0, &config(1, 10), &mut rng), sky_gradient(&ray));
    }

    #[test]
    fn test_absorbed_ray_is_black() {
        // A hit whose material id is unknown absorbs the ray
        let mut world = World::new();
        world.add(Box::new(Phantom));
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(ray_color(&ray, &world, 0, &config(1, 10), &mut rng), Color::ZERO);
    }

    #[test]
    fn test_attenuation_multiplies_sky() {
        // Camera just above a huge mirror ball, looking straight down
        let mut world = World::new();
        let mirror = world.add_material(Metal::new(Color::splat(0.5), 0.0));
        world.add_sphere(Vec3::new(0.0, -1000.0, 0.0), 999.0, mirror).unwrap();

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Y);
        let mut rng = StdRng::seed_from_u64(1);
        let color = ray_color(&ray, &world, 0, &config(1, 10), &mut rng);

        // One bounce off the floor, then straight up into the sky
        assert!((color - 0.5 * Color::new(0.5, 0.7, 1.0)).length() < 1e-4);
    }

    #[test]
    fn test_degenerate_ray_is_black() {
        let world = World::new();
        let ray = Ray::new(Vec3::ZERO, Vec3::ZERO);
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(ray_color(&ray, &world, 0, &config(1, 10), &mut rng), Color::ZERO);
        assert_eq!(normal_color(&ray, &world), Color::ZERO);
    }

    #[test]
    fn test_normal_shading() {
        let mut world = World::new();
        let gray = world.add_material(Lambertian::new(Color::splat(0.5)));
        world.add_sphere(Vec3::new(0.0, 0.0, -1.0), 0.5, gray).unwrap();

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        // Front normal is +Z at the nearest point
        assert!((normal_color(&ray, &world) - Color::new(0.5, 0.5, 1.0)).length() < 1e-4);

        let miss = Ray::new(Vec3::ZERO, Vec3::Y);
        assert_eq!(normal_color(&miss, &world), sky_gradient(&miss));
    }

    #[test]
    fn test_render_pixel() {
        let world = World::from_description(&presets::single_sphere()).unwrap();
        let mut camera = Camera::new().with_resolution(10, 10);
        camera.initialize().unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        // Center pixel hits the sphere
        let (color, discarded) = render_pixel(&camera, &world, 5, 5, &config(4, 5), &mut rng);
        assert_eq!(discarded, 0);
        assert!(color.length() > 0.0);
        assert!(color.z <= 0.5 + 1e-4);
    }

    /// Camera inside a sphere whose albedo overflows every bounce.
    fn overflowing_world() -> World {
        let mut world = World::new();
        let hot = world.add_material(Lambertian::new(Color::splat(f32::INFINITY)));
        world.add_sphere(Vec3::ZERO, 10.0, hot).unwrap();
        world
    }

    #[test]
    fn test_non_finite_samples_are_discarded() {
        let world = overflowing_world();
        let camera = Camera::from_settings(&Default::default(), 4, 2).unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        let (color, discarded) = render_pixel(&camera, &world, 1, 1, &config(8, 3), &mut rng);
        assert!(color.is_finite());
        assert_eq!(color, Color::ZERO);
        assert_eq!(discarded, 8);
    }

    #[test]
    fn test_render_counts_discarded_samples() {
        let world = overflowing_world();
        let camera = Camera::from_settings(&Default::default(), 4, 2).unwrap();

        let output = render(&camera, &world, &config(3, 3)).unwrap();
        assert_eq!(output.stats.samples, 4 * 2 * 3);
        assert_eq!(output.stats.discarded_samples, 4 * 2 * 3);
        assert!(output.image.pixels().iter().all(|c| *c == Color::ZERO));
    }

    #[test]
    fn test_render_rejects_zero_samples() {
        let world = World::new();
        let camera = Camera::from_settings(&Default::default(), 4, 4).unwrap();
        assert!(matches!(
            render(&camera, &world, &config(0, 5)),
            Err(RenderError::Scene(SceneError::ZeroSamples))
        ));
    }

    /// With `max_depth = 1` only the primary ray is traced. A ray that hits
    /// the sphere would need a second ray to reach the sky, so `ray_color`
    /// cuts it off at `depth >= max_depth` and the silhouette is black. The
    /// gray silhouette appears from depth 2 on.
    #[test]
    fn test_single_sphere_depth_one() {
        let image = single_sphere_render(1);
        assert_eq!((image.width(), image.height()), (20, 10));

        // The first bounce is already past the depth budget
        for row in 4..=5 {
            for col in 9..=10 {
                assert_eq!(image.get(row, col), Color::ZERO);
            }
        }

        for row in 0..10 {
            assert!(is_sky(image.get(row, 0)), "left border row {row}");
            assert!(is_sky(image.get(row, 19)), "right border row {row}");
        }
        for col in 0..20 {
            assert!(is_sky(image.get(0, col)));
            assert!(is_sky(image.get(9, col)));
            // Top is bluer (less red) than bottom
            assert!(image.get(0, col).x < image.get(9, col).x);
        }
    }

    #[test]
    fn test_single_sphere_depth_two() {
        let image = single_sphere_render(2);

        // Center pixels: half of whatever sky the diffuse bounce reached
        for row in 4..=5 {
            for col in 9..=10 {
                let c = image.get(row, col);
                assert!((c.z - 0.5).abs() < 1e-4, "pixel ({row}, {col}) = {c}");
                assert!(c.x >= 0.25 - 1e-4 && c.x <= 0.5 + 1e-4);
                assert!(c.y >= 0.35 - 1e-4 && c.y <= 0.5 + 1e-4);
            }
        }

        // Border columns follow the sky blend, getting whiter towards the bottom
        for col in [0, 19] {
            assert!(is_sky(image.get(0, col)));
            assert!(image.get(0, col).x < image.get(4, col).x);
            assert!(image.get(4, col).x < image.get(9, col).x);
        }
    }

    #[test]
    fn test_seeded_render_is_reproducible() {
        let mut scene = presets::demo();
        scene.render.width = 16;
        scene.render.height = 8;
        scene.render.samples_per_pixel = 2;
        scene.render.max_depth = 8;
        scene.render.seed = Some(1234);

        scene.render.threads = Some(1);
        let a = render_scene(&scene).unwrap();
        scene.render.threads = Some(3);
        let b = render_scene(&scene).unwrap();

        assert_eq!(a.image, b.image);
        assert_eq!(a.stats.samples, 16 * 8 * 2);
        assert_eq!(a.stats.discarded_samples, 0);
    }

    #[test]
    fn test_normals_render() {
        let mut scene = presets::single_sphere();
        scene.render.width = 20;
        scene.render.height = 10;
        scene.render.samples_per_pixel = 1;
        scene.render.shading = ShadingMode::Normals;
        scene.render.seed = Some(3);

        let image = render_scene(&scene).unwrap().image;
        // Sphere center faces the camera: normal close to +Z
        let c = image.get(5, 10);
        assert!(c.z > 0.9);
        assert!(is_sky(image.get(0, 0)));
    }
}
