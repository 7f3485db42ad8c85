//! Skytrace Renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer for scenes of spheres under a procedural sky.
//! Camera rays are jittered per sample, bounced through diffuse, metal and
//! glass surfaces up to a depth budget, and averaged per pixel. Scanlines
//! are rendered in parallel on a rayon thread pool.

mod camera;
mod hittable;
mod material;
mod renderer;
mod sphere;
mod world;

pub use camera::Camera;
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{Dielectric, Lambertian, Material, MaterialId, Metal, ScatterResult};
pub use renderer::{
    normal_color, ray_color, render, render_pixel, render_scene, sky_gradient, trace,
    RenderConfig, RenderError, RenderOutput, RenderResult, RenderStats, HIT_EPSILON,
};
pub use sphere::Sphere;
pub use world::World;

/// Re-export common math and scene types
pub use skytrace_core::{FrameBuffer, SceneDescription, SceneError, ShadingMode};
pub use skytrace_math::{Color, Interval, Ray, Vec3};
