// Re-export glam for convenience
pub use glam::*;

// Skytrace math types
mod interval;
mod ray;
pub mod optics;
pub mod sampling;

pub use interval::Interval;
pub use ray::Ray;

/// RGB color with linear components, typically in [0, 1].
pub type Color = Vec3;

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a * (1.0 - t) + b * t
}
