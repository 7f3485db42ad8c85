//! Camera for ray generation.

use crate::Ray;
use rand::RngCore;
use skytrace_core::{CameraSettings, SceneError, SceneResult};
use skytrace_math::sampling::{random_in_unit_disk, sample_square};
use skytrace_math::Vec3;

/// Thin-lens camera that generates jittered rays for each pixel.
///
/// Configure with the `with_*` builders, then call [`Camera::initialize`]
/// before generating rays.
#[derive(Debug, Clone)]
pub struct Camera {
    // Image settings
    pub image_width: u32,
    pub image_height: u32,

    // Camera positioning
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,

    // Lens settings
    vfov: f32,          // Vertical field of view in degrees
    defocus_angle: f32, // Variation angle of rays through each pixel
    focus_dist: f32,    // Distance from camera to plane of perfect focus (0 = look-at distance)

    // Cached computed values (set by initialize())
    center: Vec3,
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        let defaults = CameraSettings::default();
        Self {
            image_width: 400,
            image_height: 225,
            look_from: defaults.look_from,
            look_at: defaults.look_at,
            vup: defaults.vup,
            vfov: defaults.vfov,
            defocus_angle: defaults.defocus_angle,
            focus_dist: defaults.focus_dist,
            // Cached values (initialized to defaults)
            center: Vec3::ZERO,
            pixel00_loc: Vec3::ZERO,
            pixel_delta_u: Vec3::ZERO,
            pixel_delta_v: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
            defocus_disk_u: Vec3::ZERO,
            defocus_disk_v: Vec3::ZERO,
        }
    }

    /// Build and initialize a camera from scene settings.
    pub fn from_settings(settings: &CameraSettings, width: u32, height: u32) -> SceneResult<Self> {
        let mut camera = Camera::new()
            .with_resolution(width, height)
            .with_position(settings.look_from, settings.look_at, settings.vup)
            .with_lens(settings.vfov, settings.defocus_angle, settings.focus_dist);
        camera.initialize()?;
        Ok(camera)
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, defocus_angle: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.defocus_angle = defocus_angle;
        self.focus_dist = focus_dist;
        self
    }

    fn settings(&self) -> CameraSettings {
        CameraSettings {
            look_from: self.look_from,
            look_at: self.look_at,
            vup: self.vup,
            vfov: self.vfov,
            defocus_angle: self.defocus_angle,
            focus_dist: self.focus_dist,
        }
    }

    /// Initialize the camera (must be called before generating rays).
    ///
    /// The viewport sits on the focal plane, so the defocus disk radius is
    /// `focus_dist * tan(defocus_angle / 2)` and every ray through a pixel
    /// converges on the same focal-plane point.
    pub fn initialize(&mut self) -> SceneResult<()> {
        if self.image_width == 0 || self.image_height == 0 {
            return Err(SceneError::InvalidResolution {
                width: self.image_width,
                height: self.image_height,
            });
        }
        let settings = self.settings();
        settings.validate()?;

        let focus_dist = settings.effective_focus_dist();
        self.center = self.look_from;

        // Calculate viewport dimensions
        let theta = self.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * focus_dist;
        let viewport_width = viewport_height * (self.image_width as f32 / self.image_height as f32);

        // Calculate camera basis vectors
        self.w = (self.look_from - self.look_at).normalize();
        self.u = self.vup.cross(self.w).normalize();
        self.v = self.w.cross(self.u);

        // Viewport edges: u runs right, v runs down the image
        let viewport_u = viewport_width * self.u;
        let viewport_v = -viewport_height * self.v;

        self.pixel_delta_u = viewport_u / self.image_width as f32;
        self.pixel_delta_v = viewport_v / self.image_height as f32;

        // Upper left corner of pixel (0, 0); jitter is added per sample
        self.pixel00_loc = self.center - focus_dist * self.w - viewport_u / 2.0 - viewport_v / 2.0;

        // Calculate defocus disk basis vectors
        let defocus_radius = focus_dist * (self.defocus_angle / 2.0).to_radians().tan();
        self.defocus_disk_u = self.u * defocus_radius;
        self.defocus_disk_v = self.v * defocus_radius;

        log::debug!(
            "Camera initialized: {}x{}, vfov {}, focus {:.3}, defocus radius {:.4}",
            self.image_width,
            self.image_height,
            self.vfov,
            focus_dist,
            defocus_radius
        );
        Ok(())
    }

    /// Generate a ray for pixel (col, row) with random sampling.
    ///
    /// Row 0 is the top of the image. The returned direction is unit length.
    pub fn get_ray(&self, col: u32, row: u32, rng: &mut dyn RngCore) -> Ray {
        let offset = sample_square(rng);

        let pixel_sample = self.pixel00_loc
            + ((col as f32) + offset.x) * self.pixel_delta_u
            + ((row as f32) + offset.y) * self.pixel_delta_v;

        let ray_origin = if self.defocus_angle <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };

        Ray::new(ray_origin, (pixel_sample - ray_origin).normalize_or_zero())
    }

    /// Sample a point on the defocus disk.
    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Vec3 {
        let p = random_in_unit_disk(rng);
        self.center + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
    }

    /// Right, up and back basis vectors.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.u, self.v, self.w)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
