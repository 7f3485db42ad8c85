//! The renderable scene: a material arena plus the objects that use it.

use crate::{HitRecord, Hittable, HittableList, Material, MaterialId, Ray, Sphere};
use skytrace_core::{SceneDescription, SceneError, SceneResult};
use skytrace_math::{Interval, Vec3};

/// Materials and geometry, read-only once rendering starts.
///
/// Surfaces store a [`MaterialId`] into `materials`, so the world can be
/// shared across render threads without any synchronization.
#[derive(Default)]
pub struct World {
    materials: Vec<Material>,
    objects: HittableList,
}

impl World {
    /// Create an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a world from a scene description, validating it first.
    pub fn from_description(scene: &SceneDescription) -> SceneResult<Self> {
        scene.validate()?;

        let mut world = World::new();
        for material in &scene.materials {
            world.add_material(Material::from(*material));
        }
        for sphere in &scene.spheres {
            world.add_sphere(sphere.center, sphere.radius, MaterialId(sphere.material))?;
        }

        log::info!(
            "Built world: {} spheres, {} materials",
            world.object_count(),
            world.material_count()
        );
        Ok(world)
    }

    /// Add a material and return its id.
    pub fn add_material(&mut self, material: impl Into<Material>) -> MaterialId {
        self.materials.push(material.into());
        MaterialId(self.materials.len() - 1)
    }

    /// Add a sphere that uses an existing material.
    pub fn add_sphere(&mut self, center: Vec3, radius: f32, material: MaterialId) -> SceneResult<()> {
        if material.0 >= self.materials.len() {
            return Err(SceneError::UnknownMaterial {
                sphere: self.objects.len(),
                material: material.0,
                count: self.materials.len(),
            });
        }

        let sphere = Sphere::new(center, radius, material)?;
        self.objects.add(Box::new(sphere));
        Ok(())
    }

    /// Add an arbitrary hittable object.
    ///
    /// Hits on objects whose material id is unknown are treated as absorbing.
    pub fn add(&mut self, object: Box<dyn Hittable>) {
        self.objects.add(object);
    }

    /// Look up a material by id.
    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

impl Hittable for World {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        self.objects.hit(ray, ray_t)
    }
}
