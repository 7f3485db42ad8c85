//! Scene description types for Skytrace.
//!
//! A `SceneDescription` is plain data: camera placement, render settings,
//! a material table and a list of spheres that refer to materials by index.
//! It is renderer-agnostic and round-trips through JSON, so scenes can be
//! authored by hand or generated by the presets.

use std::path::Path;

use serde::{Deserialize, Serialize};
use skytrace_math::{Color, Vec3};
use thiserror::Error;

/// Errors raised while loading or validating a scene description.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Sphere radius must be positive and finite, got {0}")]
    InvalidRadius(f32),

    #[error("Sphere {0} has a non-finite center")]
    InvalidCenter(usize),

    #[error("Sphere {sphere} refers to material {material}, but only {count} materials exist")]
    UnknownMaterial {
        sphere: usize,
        material: usize,
        count: usize,
    },

    #[error("Invalid material {index}: {reason}")]
    InvalidMaterial { index: usize, reason: String },

    #[error("Image resolution must be non-zero, got {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },

    #[error("Samples per pixel must be at least 1")]
    ZeroSamples,

    #[error("Max depth must be at least 1")]
    ZeroDepth,

    #[error("Vertical field of view must be in (0, 180) degrees, got {0}")]
    InvalidFov(f32),

    #[error("Degenerate camera: {0}")]
    DegenerateCamera(String),

    #[error("Invalid lens: {0}")]
    InvalidLens(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scene parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// How radiance is computed for each camera ray.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadingMode {
    /// Full Monte Carlo path tracing
    #[default]
    PathTraced,
    /// Front-face normals mapped to RGB, for debugging geometry
    Normals,
}

/// Camera placement and lens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Eye position
    pub look_from: Vec3,
    /// Point the camera looks at
    pub look_at: Vec3,
    /// World up hint
    pub vup: Vec3,
    /// Vertical field of view in degrees
    pub vfov: f32,
    /// Aperture cone angle in degrees (0 disables depth of field)
    pub defocus_angle: f32,
    /// Distance to the plane of perfect focus (0 uses the look-at distance)
    pub focus_dist: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            defocus_angle: 0.0,
            focus_dist: 0.0,
        }
    }
}

impl CameraSettings {
    /// Focus distance with the "0 means look-at distance" rule applied.
    pub fn effective_focus_dist(&self) -> f32 {
        if self.focus_dist > 0.0 {
            self.focus_dist
        } else {
            (self.look_from - self.look_at).length()
        }
    }

    /// Check that the settings describe a usable camera.
    pub fn validate(&self) -> SceneResult<()> {
        if !(self.vfov > 0.0 && self.vfov < 180.0) {
            return Err(SceneError::InvalidFov(self.vfov));
        }

        let view = self.look_from - self.look_at;
        if !view.is_finite() || view.length_squared() < f32::EPSILON {
            return Err(SceneError::DegenerateCamera(
                "look_from and look_at coincide".to_string(),
            ));
        }
        if self.vup.cross(view).length_squared() < f32::EPSILON {
            return Err(SceneError::DegenerateCamera(
                "vup is parallel to the view direction".to_string(),
            ));
        }

        if !(self.defocus_angle >= 0.0 && self.defocus_angle < 180.0) {
            return Err(SceneError::InvalidLens(format!(
                "defocus angle must be in [0, 180), got {}",
                self.defocus_angle
            )));
        }
        if !(self.focus_dist >= 0.0 && self.focus_dist.is_finite()) {
            return Err(SceneError::InvalidLens(format!(
                "focus distance must be non-negative, got {}",
                self.focus_dist
            )));
        }

        Ok(())
    }
}

/// Image and sampling settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: u32,
    pub max_depth: u32,
    /// Fixed seed for reproducible renders (None = entropy)
    pub seed: Option<u64>,
    /// Worker thread count (None = one per core)
    pub threads: Option<usize>,
    pub shading: ShadingMode,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 400,
            height: 225,
            samples_per_pixel: 100,
            max_depth: 50,
            seed: None,
            threads: None,
            shading: ShadingMode::PathTraced,
        }
    }
}

impl RenderSettings {
    pub fn validate(&self) -> SceneResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SceneError::InvalidResolution {
                width: self.width,
                height: self.height,
            });
        }
        if self.samples_per_pixel == 0 {
            return Err(SceneError::ZeroSamples);
        }
        if self.max_depth == 0 {
            return Err(SceneError::ZeroDepth);
        }
        Ok(())
    }
}

/// A surface material, shared by index between any number of spheres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialDesc {
    Lambertian {
        albedo: Color,
    },
    Metal {
        albedo: Color,
        #[serde(default)]
        fuzz: f32,
    },
    Dielectric {
        ior: f32,
    },
}

impl MaterialDesc {
    fn validate(&self, index: usize) -> SceneResult<()> {
        let invalid = |reason: String| SceneError::InvalidMaterial { index, reason };

        match *self {
            MaterialDesc::Lambertian { albedo } | MaterialDesc::Metal { albedo, .. }
                if !albedo.is_finite() =>
            {
                Err(invalid(format!("albedo must be finite, got {albedo}")))
            }
            MaterialDesc::Metal { fuzz, .. } if !fuzz.is_finite() => {
                Err(invalid(format!("fuzz must be finite, got {fuzz}")))
            }
            MaterialDesc::Dielectric { ior } if !(ior > 0.0 && ior.is_finite()) => {
                Err(invalid(format!("index of refraction must be positive, got {ior}")))
            }
            _ => Ok(()),
        }
    }
}

/// A sphere placed in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphereDesc {
    pub center: Vec3,
    pub radius: f32,
    /// Index into `SceneDescription::materials`
    pub material: usize,
}

/// Complete description of a renderable scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    pub camera: CameraSettings,
    pub render: RenderSettings,
    pub materials: Vec<MaterialDesc>,
    pub spheres: Vec<SphereDesc>,
}

impl SceneDescription {
    /// Create an empty scene with default camera and render settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a material and return its index.
    pub fn add_material(&mut self, material: MaterialDesc) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    /// Add a sphere using a previously added material.
    pub fn add_sphere(&mut self, center: Vec3, radius: f32, material: usize) {
        self.spheres.push(SphereDesc {
            center,
            radius,
            material,
        });
    }

    /// Parse a scene from a JSON string.
    pub fn from_json_str(json: &str) -> SceneResult<Self> {
        let scene: SceneDescription = serde_json::from_str(json)?;
        log::debug!(
            "Parsed scene: {} materials, {} spheres",
            scene.materials.len(),
            scene.spheres.len()
        );
        Ok(scene)
    }

    /// Load a scene from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        log::info!("Loading scene from: {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialize the scene as pretty-printed JSON.
    pub fn to_json_string(&self) -> SceneResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every setting, material and sphere.
    ///
    /// Renders never fail midway, so anything that would produce a broken
    /// image is rejected here.
    pub fn validate(&self) -> SceneResult<()> {
        self.camera.validate()?;
        self.render.validate()?;

        for (index, material) in self.materials.iter().enumerate() {
            material.validate(index)?;
        }

        for (index, sphere) in self.spheres.iter().enumerate() {
            if !(sphere.radius > 0.0 && sphere.radius.is_finite()) {
                return Err(SceneError::InvalidRadius(sphere.radius));
            }
            if !sphere.center.is_finite() {
                return Err(SceneError::InvalidCenter(index));
            }
            if sphere.material >= self.materials.len() {
                return Err(SceneError::UnknownMaterial {
                    sphere: index,
                    material: sphere.material,
                    count: self.materials.len(),
                });
            }
        }

        Ok(())
    }
}
