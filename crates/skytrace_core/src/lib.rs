//! Skytrace Core - scene description and image output.
//!
//! This crate provides:
//!
//! - **Scene description**: `SceneDescription` with camera, render settings,
//!   a material table and the sphere list, loadable from JSON
//! - **Presets**: built-in scenes for quick renders and tests
//! - **Frame buffer**: linear color storage with gamma-corrected PNG/PPM output
//!
//! # Example
//!
//! ```ignore
//! use skytrace_core::SceneDescription;
//!
//! let scene = SceneDescription::load("scene.json")?;
//! println!("Loaded {} spheres, {} materials",
//!     scene.spheres.len(),
//!     scene.materials.len());
//! ```

pub mod framebuffer;
pub mod presets;
pub mod scene;

// Re-export commonly used types
pub use framebuffer::{FrameBuffer, FrameBufferError, PixelColor, DISPLAY_GAMMA};
pub use scene::{
    CameraSettings, MaterialDesc, RenderSettings, SceneDescription, SceneError, SceneResult,
    ShadingMode, SphereDesc,
};
