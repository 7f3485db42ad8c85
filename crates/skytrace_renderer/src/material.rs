//! Surface materials and the scatter protocol.
//!
//! Materials live in an arena owned by the [`World`](crate::World); surfaces
//! refer to them through a [`MaterialId`], so any number of spheres can share
//! one material without reference counting.

use crate::{hittable::HitRecord, Ray};
use rand::RngCore;
use skytrace_core::MaterialDesc;
use skytrace_math::optics::{reflect, reflectance, refract};
use skytrace_math::sampling::{gen_f32, random_unit_vector};
use skytrace_math::Color;

/// Scatter directions shorter than this fall back to the surface normal.
const DEGENERATE_SCATTER_LENGTH_SQUARED: f32 = 1e-3;

/// Index of a material in the world's material table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub usize);

/// Result of a successful scatter event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterResult {
    /// The continuing ray, leaving the hit point
    pub scattered: Ray,
    /// Fraction of the incoming light carried by `scattered`
    pub attenuation: Color,
}

/// Lambertian (diffuse) material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lambertian {
    albedo: Color,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }

    /// Scatter in a random direction on the hemisphere around the normal.
    ///
    /// Never absorbs.
    pub fn scatter(&self, rec: &HitRecord, rng: &mut dyn RngCore) -> ScatterResult {
        let mut scatter_direction = rec.normal + random_unit_vector(rng);

        // Catch degenerate scatter direction
        if scatter_direction.length_squared() < DEGENERATE_SCATTER_LENGTH_SQUARED {
            scatter_direction = rec.normal;
        }

        ScatterResult {
            scattered: Ray::new(rec.p, scatter_direction.normalize()),
            attenuation: self.albedo,
        }
    }
}

/// Metal (specular) material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough (clamped)
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    /// Mirror reflection perturbed by `fuzz`.
    ///
    /// Absorbs when the perturbed direction does not leave the surface.
    pub fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let reflected = reflect(ray_in.unit_direction(), rec.normal);
        let scattered_dir = reflected + self.fuzz * random_unit_vector(rng);

        // Only scatter if the reflected ray is in the same hemisphere as the normal
        if scattered_dir.dot(rec.normal) > 0.0 {
            Some(ScatterResult {
                scattered: Ray::new(rec.p, scattered_dir.normalize()),
                attenuation: self.albedo,
            })
        } else {
            None
        }
    }
}

/// Dielectric (glass) material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dielectric {
    /// Index of refraction
    ior: f32,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f32) -> Self {
        Self { ior }
    }

    /// Reflect or refract, choosing by Schlick reflectance.
    ///
    /// Never absorbs and never tints: attenuation is always white.
    pub fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> ScatterResult {
        let refraction_ratio = if rec.front_face {
            1.0 / self.ior
        } else {
            self.ior
        };

        let unit_direction = ray_in.unit_direction();
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

        // Check for total internal reflection
        let cannot_refract = refraction_ratio * sin_theta > 1.0;

        let direction = if cannot_refract
            || reflectance(cos_theta, refraction_ratio) > gen_f32(rng)
        {
            reflect(unit_direction, rec.normal)
        } else {
            refract(unit_direction, rec.normal, refraction_ratio)
        };

        ScatterResult {
            scattered: Ray::new(rec.p, direction.normalize_or_zero()),
            attenuation: Color::ONE,
        }
    }
}

/// A surface material. The set of variants is closed, so dispatch is a match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    Lambertian(Lambertian),
    Metal(Metal),
    Dielectric(Dielectric),
}

impl Material {
    /// Scatter an incoming ray.
    ///
    /// Returns the scattered ray and its attenuation, or `None` if the ray
    /// is absorbed.
    pub fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        match self {
            Material::Lambertian(m) => Some(m.scatter(rec, rng)),
            Material::Metal(m) => m.scatter(ray_in, rec, rng),
            Material::Dielectric(m) => Some(m.scatter(ray_in, rec, rng)),
        }
    }
}

impl From<Lambertian> for Material {
    fn from(m: Lambertian) -> Self {
        Material::Lambertian(m)
    }
}

impl From<Metal> for Material {
    fn from(m: Metal) -> Self {
        Material::Metal(m)
    }
}

impl From<Dielectric> for Material {
    fn from(m: Dielectric) -> Self {
        Material::Dielectric(m)
    }
}

impl From<MaterialDesc> for Material {
    fn from(desc: MaterialDesc) -> Self {
        match desc {
            MaterialDesc::Lambertian { albedo } => Lambertian::new(albedo).into(),
            MaterialDesc::Metal { albedo, fuzz } => Metal::new(albedo, fuzz).into(),
            MaterialDesc::Dielectric { ior } => Dielectric::new(ior).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use skytrace_math::Vec3;

    /// A front-face hit at the origin on a surface facing +Y.
    fn floor_hit() -> HitRecord {
        HitRecord {
            p: Vec3::ZERO,
            normal: Vec3::Y,
            material: MaterialId(0),
            t: 1.0,
            front_face: true,
        }
    }

    #[test]
    fn test_lambertian_never_absorbs() {
        let albedo = Color::new(0.2, 0.4, 0.6);
        let material = Material::from(Lambertian::new(albedo));
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Y);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..1000 {
            let result = material.scatter(&ray, &floor_hit(), &mut rng).unwrap();
            assert_eq!(result.attenuation, albedo);
            assert_eq!(result.scattered.origin, Vec3::ZERO);
            // Scattered into the upper hemisphere (or along it)
            assert!(result.scattered.direction.dot(Vec3::Y) >= 0.0);
            assert!((result.scattered.direction.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_metal_mirror_reflection() {
        let metal = Metal::new(Color::splat(0.9), 0.0);
        let ray = Ray::new(Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0));
        let mut rng = StdRng::seed_from_u64(1);

        let result = metal.scatter(&ray, &floor_hit(), &mut rng).unwrap();
        let expected = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert!((result.scattered.direction - expected).length() < 1e-5);
        assert_eq!(result.attenuation, Color::splat(0.9));
    }

    #[test]
    fn test_metal_grazing_ray_is_absorbed() {
        let metal = Metal::new(Color::ONE, 0.0);
        // Reflection stays exactly in the surface plane
        let ray = Ray::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::X);
        let mut rng = StdRng::seed_from_u64(1);

        assert!(metal.scatter(&ray, &floor_hit(), &mut rng).is_none());
    }

    #[test]
    fn test_metal_fuzz_clamped() {
        assert_eq!(Metal::new(Color::ONE, 3.0), Metal::new(Color::ONE, 1.0));
        assert_eq!(Metal::new(Color::ONE, -1.0), Metal::new(Color::ONE, 0.0));
    }

    #[test]
    fn test_dielectric_attenuation_is_white() {
        let mut rng = StdRng::seed_from_u64(7);

        for &ior in &[1.0, 1.33, 1.5, 2.4, 1.0 / 1.5] {
            let glass = Material::from(Dielectric::new(ior));
            for i in 0..20 {
                let x = i as f32 * 0.25;
                let ray = Ray::new(Vec3::new(-x, 1.0, 0.0), Vec3::new(x, -1.0, 0.0));
                let mut rec = floor_hit();

                let entering = glass.scatter(&ray, &rec, &mut rng).unwrap();
                assert_eq!(entering.attenuation, Color::ONE);

                rec.front_face = false;
                let exiting = glass.scatter(&ray, &rec, &mut rng).unwrap();
                assert_eq!(exiting.attenuation, Color::ONE);
            }
        }
    }

    #[test]
    fn test_dielectric_total_internal_reflection() {
        // Leaving glass at a steep angle must reflect
        let glass = Dielectric::new(1.5);
        let mut rec = floor_hit();
        rec.front_face = false;
        let ray = Ray::new(Vec3::new(-1.0, 0.2, 0.0), Vec3::new(1.0, -0.2, 0.0));
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..100 {
            let result = glass.scatter(&ray, &rec, &mut rng);
            assert!(result.scattered.direction.y > 0.0);
        }
    }

    #[test]
    fn test_dielectric_index_one_passes_straight_through() {
        // Matching indices at normal incidence: zero reflectance, no bending
        let glass = Dielectric::new(1.0);
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -2.0, 0.0));
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..100 {
            let result = glass.scatter(&ray, &floor_hit(), &mut rng);
            assert!((result.scattered.direction - Vec3::NEG_Y).length() < 1e-5);
        }
    }

    #[test]
    fn test_dielectric_reflects_at_schlick_rate() {
        let glass = Dielectric::new(1.5);
        let cos_theta = 0.31f32;
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
        let ray = Ray::new(Vec3::new(-sin_theta, cos_theta, 0.0), Vec3::new(sin_theta, -cos_theta, 0.0));
        let mut rng = StdRng::seed_from_u64(2024);

        let draws = 100_000;
        let reflected = (0..draws)
            .filter(|_| glass.scatter(&ray, &floor_hit(), &mut rng).scattered.direction.y > 0.0)
            .count();

        let fraction = reflected as f32 / draws as f32;
        let expected = reflectance(cos_theta, 1.0 / 1.5);
        assert!(
            (fraction - expected).abs() < 0.01,
            "reflected {fraction}, expected {expected}"
        );
    }

    #[test]
    fn test_from_description() {
        let material = Material::from(MaterialDesc::Metal {
            albedo: Color::ONE,
            fuzz: 0.25,
        });
        assert_eq!(material, Material::Metal(Metal::new(Color::ONE, 0.25)));

        let glass = Material::from(MaterialDesc::Dielectric { ior: 1.5 });
        assert_eq!(glass, Material::Dielectric(Dielectric::new(1.5)));
    }
}
