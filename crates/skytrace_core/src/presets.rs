//! Built-in scenes.

use rand::RngCore;
use skytrace_math::sampling::{gen_f32, gen_range, random_vec3};
use skytrace_math::{Color, Vec3};

use crate::scene::{CameraSettings, MaterialDesc, RenderSettings, SceneDescription};

/// A single gray diffuse sphere in front of a camera at the origin.
pub fn single_sphere() -> SceneDescription {
    let mut scene = SceneDescription::new();
    let gray = scene.add_material(MaterialDesc::Lambertian {
        albedo: Color::splat(0.5),
    });
    scene.add_sphere(Vec3::new(0.0, 0.0, -1.0), 0.5, gray);
    scene
}

/// Ground plane with diffuse, hollow glass and brushed metal spheres.
pub fn demo() -> SceneDescription {
    let mut scene = SceneDescription {
        camera: CameraSettings {
            look_from: Vec3::new(-2.0, 2.0, 1.0),
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 20.0,
            defocus_angle: 10.0,
            focus_dist: 3.4,
        },
        ..Default::default()
    };

    let ground = scene.add_material(MaterialDesc::Lambertian {
        albedo: Color::new(0.8, 0.8, 0.0),
    });
    let center = scene.add_material(MaterialDesc::Lambertian {
        albedo: Color::new(0.1, 0.2, 0.5),
    });
    let glass = scene.add_material(MaterialDesc::Dielectric { ior: 1.5 });
    let bubble = scene.add_material(MaterialDesc::Dielectric { ior: 1.0 / 1.5 });
    let metal = scene.add_material(MaterialDesc::Metal {
        albedo: Color::new(0.8, 0.6, 0.2),
        fuzz: 0.3,
    });

    scene.add_sphere(Vec3::new(0.0, -100.5, -1.0), 100.0, ground);
    scene.add_sphere(Vec3::new(0.0, 0.0, -1.2), 0.5, center);
    scene.add_sphere(Vec3::new(-1.0, 0.0, -1.0), 0.5, glass);
    scene.add_sphere(Vec3::new(-1.0, 0.0, -1.0), 0.4, bubble);
    scene.add_sphere(Vec3::new(1.0, 0.0, -1.0), 0.5, metal);

    scene
}

/// The classic cover scene: a field of small random spheres around three
/// large feature spheres, with depth of field.
pub fn random_spheres(rng: &mut dyn RngCore) -> SceneDescription {
    let mut scene = SceneDescription {
        camera: CameraSettings {
            look_from: Vec3::new(13.0, 2.0, 3.0),
            look_at: Vec3::ZERO,
            vup: Vec3::Y,
            vfov: 20.0,
            defocus_angle: 0.6,
            focus_dist: 10.0,
        },
        render: RenderSettings {
            width: 1200,
            height: 675,
            samples_per_pixel: 500,
            max_depth: 50,
            ..Default::default()
        },
        ..Default::default()
    };

    let ground = scene.add_material(MaterialDesc::Lambertian {
        albedo: Color::splat(0.5),
    });
    scene.add_sphere(Vec3::new(0.0, -1000.0, 0.0), 1000.0, ground);

    // Small spheres share one glass material
    let glass = scene.add_material(MaterialDesc::Dielectric { ior: 1.5 });

    for a in -11..11 {
        for b in -11..11 {
            let center = Vec3::new(
                a as f32 + 0.9 * gen_f32(rng),
                0.2,
                b as f32 + 0.9 * gen_f32(rng),
            );

            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            let choose_mat = gen_f32(rng);
            let material = if choose_mat < 0.8 {
                // Diffuse
                let albedo = random_vec3(rng, 0.0, 1.0) * random_vec3(rng, 0.0, 1.0);
                scene.add_material(MaterialDesc::Lambertian { albedo })
            } else if choose_mat < 0.95 {
                // Metal
                let albedo = random_vec3(rng, 0.5, 1.0);
                let fuzz = gen_range(rng, 0.0, 0.5);
                scene.add_material(MaterialDesc::Metal { albedo, fuzz })
            } else {
                glass
            };
            scene.add_sphere(center, 0.2, material);
        }
    }

    scene.add_sphere(Vec3::new(0.0, 1.0, 0.0), 1.0, glass);

    let diffuse = scene.add_material(MaterialDesc::Lambertian {
        albedo: Color::new(0.4, 0.2, 0.1),
    });
    scene.add_sphere(Vec3::new(-4.0, 1.0, 0.0), 1.0, diffuse);

    let metal = scene.add_material(MaterialDesc::Metal {
        albedo: Color::new(0.7, 0.6, 0.5),
        fuzz: 0.0,
    });
    scene.add_sphere(Vec3::new(4.0, 1.0, 0.0), 1.0, metal);

    log::debug!(
        "Generated random scene: {} spheres, {} materials",
        scene.spheres.len(),
        scene.materials.len()
    );
    scene
}
