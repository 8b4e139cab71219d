//! Built-in demo scenes.
//!
//! Every builder returns the scene together with the camera it was composed
//! for. Random placement draws from a generator seeded by the settings, so
//! a seed reproduces the same layout.

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use umbra_core::{ImageTexture, Perlin, Texture};
use umbra_renderer::{Camera, Color, Material, MaterialId, Point3, PrimitiveId, Scene, Vec3, World};

use crate::settings::Settings;

const SKY: Color = Color::new(0.7, 0.8, 1.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneKind {
    /// Cornell box with a rotated box and a glass sphere
    CornellBox,
    /// Cornell box whose two boxes are smoke and fog
    CornellSmoke,
    /// Bouncing spheres with motion blur and depth of field
    RandomSpheres,
    /// Two checkered spheres
    TwoSpheres,
    /// Image-textured globe (needs a texture)
    Earth,
    /// Marble spheres
    PerlinSpheres,
    /// Five colored quads
    Quads,
    /// Marble spheres lit by a sphere and a quad
    SimpleLight,
    /// Everything at once
    FinalScene,
}

pub struct SceneSetup {
    pub scene: Scene,
    pub camera: Camera,
}

impl SceneKind {
    pub fn build(self, settings: &Settings) -> Result<SceneSetup> {
        let mut rng = StdRng::seed_from_u64(settings.seed);
        let texture = settings.texture.as_deref();

        let setup = match self {
            SceneKind::CornellBox => cornell_box(),
            SceneKind::CornellSmoke => cornell_smoke(&mut rng),
            SceneKind::RandomSpheres => random_spheres(&mut rng),
            SceneKind::TwoSpheres => two_spheres(&mut rng),
            SceneKind::Earth => {
                let path = texture.context("the earth scene needs --texture")?;
                earth(path)?
            }
            SceneKind::PerlinSpheres => perlin_spheres(&mut rng),
            SceneKind::Quads => quads(&mut rng),
            SceneKind::SimpleLight => simple_light(&mut rng),
            SceneKind::FinalScene => final_scene(&mut rng, texture)?,
        };

        log::info!(
            "Built {:?}: {} primitives, {} materials",
            self,
            setup.scene.world.primitive_count(),
            setup.scene.world.material_count()
        );
        Ok(setup)
    }
}

/// Apply the width and quality overrides from `settings`, keeping the
/// scene's aspect ratio.
pub fn configure_camera(mut camera: Camera, settings: &Settings) -> Camera {
    if let Some(width) = settings.width {
        let aspect = camera.image_width as f64 / camera.image_height as f64;
        camera = camera.with_aspect_ratio(aspect, width);
    }
    let spp = settings.samples_per_pixel.unwrap_or(camera.samples_per_pixel);
    let depth = settings.max_depth.unwrap_or(camera.max_depth);
    camera.with_quality(spp, depth)
}

/// Red, green and white walls with an open front, 555 units on a side.
/// Returns the walls and the white material.
fn cornell_walls(world: &mut World, ceiling: bool) -> (Vec<PrimitiveId>, MaterialId) {
    let red = world.add_material(Material::lambertian(Color::new(0.65, 0.05, 0.05)));
    let white = world.add_material(Material::lambertian(Color::new(0.73, 0.73, 0.73)));
    let green = world.add_material(Material::lambertian(Color::new(0.12, 0.45, 0.15)));

    let mut walls = vec![
        world.quad(Point3::new(555.0, 0.0, 0.0), Vec3::new(0.0, 555.0, 0.0), Vec3::new(0.0, 0.0, 555.0), green),
        world.quad(Point3::ZERO, Vec3::new(0.0, 555.0, 0.0), Vec3::new(0.0, 0.0, 555.0), red),
        world.quad(Point3::ZERO, Vec3::new(555.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 555.0), white),
        world.quad(Point3::new(0.0, 0.0, 555.0), Vec3::new(555.0, 0.0, 0.0), Vec3::new(0.0, 555.0, 0.0), white),
    ];
    if ceiling {
        walls.push(world.quad(
            Point3::new(555.0, 555.0, 555.0),
            Vec3::new(-555.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, -555.0),
            white,
        ));
    }

    (walls, white)
}

fn cornell_camera(width: u32, samples: u32, depth: u32) -> Camera {
    Camera::new()
        .with_aspect_ratio(1.0, width)
        .with_quality(samples, depth)
        .with_position(Point3::new(278.0, 278.0, -800.0), Point3::new(278.0, 278.0, 0.0), Vec3::Y)
        .with_lens(40.0, 0.0, 10.0)
        .with_background(Color::ZERO)
}

/// A box spanning `size`, turned about Y and then moved into place.
fn placed_box(world: &mut World, size: Point3, angle: f64, offset: Vec3, material: MaterialId) -> PrimitiveId {
    let cube = world.make_box(Point3::ZERO, size, material);
    let cube = world.rotate_y(cube, angle);
    world.translate(cube, offset)
}

fn cornell_box() -> SceneSetup {
    let mut world = World::new();
    let (mut objects, white) = cornell_walls(&mut world, true);

    objects.push(placed_box(
        &mut world,
        Point3::new(165.0, 330.0, 165.0),
        15.0,
        Vec3::new(265.0, 0.0, 295.0),
        white,
    ));

    let glass = world.add_material(Material::dielectric(1.5));
    objects.push(world.sphere(Point3::new(190.0, 90.0, 190.0), 90.0, glass));

    let light = world.add_material(Material::diffuse_light(Color::splat(15.0)));
    let lamp = world.quad(
        Point3::new(343.0, 554.0, 332.0),
        Vec3::new(-130.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -105.0),
        light,
    );
    objects.push(lamp);

    let root = world.list(objects);
    let lights = world.list([lamp]);

    SceneSetup {
        scene: Scene::new(world, root).with_lights(lights),
        camera: cornell_camera(400, 50, 5),
    }
}

fn cornell_smoke(rng: &mut StdRng) -> SceneSetup {
    let mut world = World::new();
    let (mut objects, white) = cornell_walls(&mut world, false);

    let light = world.add_material(Material::diffuse_light(Color::splat(7.0)));
    let lamp = world.quad(
        Point3::new(113.0, 554.0, 127.0),
        Vec3::new(330.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 305.0),
        light,
    );
    objects.push(lamp);
    objects.push(world.quad(
        Point3::new(0.0, 555.0, 0.0),
        Vec3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        white,
    ));

    let tall = placed_box(
        &mut world,
        Point3::new(165.0, 330.0, 165.0),
        15.0,
        Vec3::new(265.0, 0.0, 295.0),
        white,
    );
    let short = placed_box(
        &mut world,
        Point3::new(165.0, 165.0, 165.0),
        -18.0,
        Vec3::new(130.0, 0.0, 65.0),
        white,
    );
    objects.push(world.constant_medium(tall, 0.01, Color::ZERO));
    objects.push(world.constant_medium(short, 0.01, Color::ONE));

    let root = world.bvh(&objects, rng);
    let lights = world.list([lamp]);

    SceneSetup {
        scene: Scene::new(world, root).with_lights(lights),
        camera: cornell_camera(600, 200, 50),
    }
}

fn random_spheres(rng: &mut StdRng) -> SceneSetup {
    let mut world = World::new();
    let mut objects = Vec::new();

    let ground = world.add_material(Material::lambertian(Color::new(0.5, 0.5, 0.5)));
    objects.push(world.sphere(Point3::new(0.0, -1000.0, 0.0), 1000.0, ground));

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat: f64 = rng.gen();
            let center = Point3::new(a as f64 + 0.9 * rng.gen::<f64>(), 0.2, b as f64 + 0.9 * rng.gen::<f64>());

            if (center - Point3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            if choose_mat < 0.8 {
                let albedo = random_color(rng, 0.0, 1.0) * random_color(rng, 0.0, 1.0);
                let material = world.add_material(Material::lambertian(albedo));
                let center2 = center + Vec3::new(0.0, rng.gen_range(0.0..0.5), 0.0);
                objects.push(world.moving_sphere(center, center2, 0.2, material));
            } else if choose_mat < 0.95 {
                let albedo = random_color(rng, 0.5, 1.0);
                let fuzz = rng.gen_range(0.0..0.5);
                let material = world.add_material(Material::metal(albedo, fuzz));
                objects.push(world.sphere(center, 0.2, material));
            } else {
                let material = world.add_material(Material::dielectric(1.5));
                objects.push(world.sphere(center, 0.2, material));
            }
        }
    }

    let glass = world.add_material(Material::dielectric(1.5));
    objects.push(world.sphere(Point3::new(0.0, 1.0, 0.0), 1.0, glass));
    let brown = world.add_material(Material::lambertian(Color::new(0.4, 0.2, 0.1)));
    objects.push(world.sphere(Point3::new(-4.0, 1.0, 0.0), 1.0, brown));
    let bronze = world.add_material(Material::metal(Color::new(0.7, 0.6, 0.5), 0.0));
    objects.push(world.sphere(Point3::new(4.0, 1.0, 0.0), 1.0, bronze));

    let root = world.bvh(&objects, rng);

    SceneSetup {
        scene: Scene::new(world, root),
        camera: Camera::new()
            .with_aspect_ratio(16.0 / 9.0, 400)
            .with_quality(100, 50)
            .with_position(Point3::new(13.0, 2.0, 3.0), Point3::ZERO, Vec3::Y)
            .with_lens(20.0, 0.6, 10.0)
            .with_background(SKY),
    }
}

fn two_spheres(rng: &mut StdRng) -> SceneSetup {
    let mut world = World::new();
    let checker = Texture::checker(
        0.8,
        Color::new(0.2, 0.3, 0.1).into(),
        Color::new(0.9, 0.9, 0.9).into(),
    );
    let material = world.add_material(Material::lambertian(checker));

    let objects = [
        world.sphere(Point3::new(0.0, -10.0, 0.0), 10.0, material),
        world.sphere(Point3::new(0.0, 10.0, 0.0), 10.0, material),
    ];
    let root = world.bvh(&objects, rng);

    SceneSetup {
        scene: Scene::new(world, root),
        camera: sky_camera(Point3::new(13.0, 2.0, 3.0), Point3::ZERO),
    }
}

fn earth(texture: &Path) -> Result<SceneSetup> {
    let mut world = World::new();
    let image = ImageTexture::open(texture).with_context(|| format!("loading {}", texture.display()))?;
    let surface = world.add_material(Material::lambertian(Texture::image(image)));
    let globe = world.sphere(Point3::ZERO, 2.0, surface);

    Ok(SceneSetup {
        scene: Scene::new(world, globe),
        camera: sky_camera(Point3::new(12.0, 0.0, 0.0), Point3::ZERO),
    })
}

fn perlin_spheres(rng: &mut StdRng) -> SceneSetup {
    let mut world = World::new();
    let marble = world.add_material(Material::lambertian(Texture::noise(Perlin::new(rng), 4.0)));

    let objects = [
        world.sphere(Point3::new(0.0, -1000.0, 0.0), 1000.0, marble),
        world.sphere(Point3::new(0.0, 2.0, 0.0), 2.0, marble),
    ];
    let root = world.bvh(&objects, rng);

    SceneSetup {
        scene: Scene::new(world, root),
        camera: sky_camera(Point3::new(13.0, 2.0, 3.0), Point3::ZERO),
    }
}

fn quads(rng: &mut StdRng) -> SceneSetup {
    let mut world = World::new();
    let left_red = world.add_material(Material::lambertian(Color::new(1.0, 0.2, 0.2)));
    let back_green = world.add_material(Material::lambertian(Color::new(0.2, 1.0, 0.2)));
    let right_blue = world.add_material(Material::lambertian(Color::new(0.2, 0.2, 1.0)));
    let upper_orange = world.add_material(Material::lambertian(Color::new(1.0, 0.5, 0.0)));
    let lower_teal = world.add_material(Material::lambertian(Color::new(0.2, 0.8, 0.8)));

    let objects = [
        world.quad(Point3::new(-3.0, -2.0, 5.0), Vec3::new(0.0, 0.0, -4.0), Vec3::new(0.0, 4.0, 0.0), left_red),
        world.quad(Point3::new(-2.0, -2.0, 0.0), Vec3::new(4.0, 0.0, 0.0), Vec3::new(0.0, 4.0, 0.0), back_green),
        world.quad(Point3::new(3.0, -2.0, 1.0), Vec3::new(0.0, 0.0, 4.0), Vec3::new(0.0, 4.0, 0.0), right_blue),
        world.quad(Point3::new(-2.0, 3.0, 1.0), Vec3::new(4.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 4.0), upper_orange),
        world.quad(Point3::new(-2.0, -3.0, 5.0), Vec3::new(4.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -4.0), lower_teal),
    ];
    let root = world.bvh(&objects, rng);

    SceneSetup {
        scene: Scene::new(world, root),
        camera: Camera::new()
            .with_aspect_ratio(1.0, 400)
            .with_quality(100, 50)
            .with_position(Point3::new(0.0, 0.0, 9.0), Point3::ZERO, Vec3::Y)
            .with_lens(80.0, 0.0, 10.0)
            .with_background(SKY),
    }
}

fn simple_light(rng: &mut StdRng) -> SceneSetup {
    let mut world = World::new();
    let marble = world.add_material(Material::lambertian(Texture::noise(Perlin::new(rng), 4.0)));
    let light = world.add_material(Material::diffuse_light(Color::splat(4.0)));

    let bulb = world.sphere(Point3::new(0.0, 7.0, 0.0), 2.0, light);
    let panel = world.quad(Point3::new(3.0, 1.0, -2.0), Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0), light);
    let objects = [
        world.sphere(Point3::new(0.0, -1000.0, 0.0), 1000.0, marble),
        world.sphere(Point3::new(0.0, 2.0, 0.0), 2.0, marble),
        bulb,
        panel,
    ];
    let root = world.bvh(&objects, rng);
    let lights = world.list([bulb, panel]);

    SceneSetup {
        scene: Scene::new(world, root).with_lights(lights),
        camera: Camera::new()
            .with_aspect_ratio(16.0 / 9.0, 400)
            .with_quality(100, 50)
            .with_position(Point3::new(26.0, 3.0, 6.0), Point3::new(0.0, 2.0, 0.0), Vec3::Y)
            .with_lens(20.0, 0.0, 10.0)
            .with_background(Color::ZERO),
    }
}

fn final_scene(rng: &mut StdRng, texture: Option<&Path>) -> Result<SceneSetup> {
    let mut world = World::new();
    let mut objects = Vec::new();

    let ground = world.add_material(Material::lambertian(Color::new(0.48, 0.83, 0.53)));
    let boxes_per_side = 20;
    let mut boxes = Vec::with_capacity(boxes_per_side * boxes_per_side);
    for i in 0..boxes_per_side {
        for j in 0..boxes_per_side {
            let w = 100.0;
            let x0 = -1000.0 + i as f64 * w;
            let z0 = -1000.0 + j as f64 * w;
            let y1 = rng.gen_range(1.0..101.0);
            boxes.push(world.make_box(Point3::new(x0, 0.0, z0), Point3::new(x0 + w, y1, z0 + w), ground));
        }
    }
    objects.push(world.bvh(&boxes, rng));

    let light = world.add_material(Material::diffuse_light(Color::splat(7.0)));
    let lamp = world.quad(
        Point3::new(123.0, 554.0, 147.0),
        Vec3::new(300.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 265.0),
        light,
    );
    objects.push(lamp);

    let center1 = Point3::new(400.0, 400.0, 200.0);
    let orange = world.add_material(Material::lambertian(Color::new(0.7, 0.3, 0.1)));
    objects.push(world.moving_sphere(center1, center1 + Vec3::new(30.0, 0.0, 0.0), 50.0, orange));

    let glass = world.add_material(Material::dielectric(1.5));
    objects.push(world.sphere(Point3::new(260.0, 150.0, 45.0), 50.0, glass));
    let brushed = world.add_material(Material::metal(Color::new(0.8, 0.8, 0.9), 1.0));
    objects.push(world.sphere(Point3::new(0.0, 150.0, 145.0), 50.0, brushed));

    // Glass ball filled with blue fog.
    let boundary = world.sphere(Point3::new(360.0, 150.0, 145.0), 70.0, glass);
    objects.push(boundary);
    objects.push(world.constant_medium(boundary, 0.2, Color::new(0.2, 0.4, 0.9)));

    // Thin mist over everything.
    let boundary = world.sphere(Point3::ZERO, 5000.0, glass);
    objects.push(world.constant_medium(boundary, 0.0001, Color::ONE));

    let globe_texture = match texture {
        Some(path) => Texture::image(ImageTexture::open(path).with_context(|| format!("loading {}", path.display()))?),
        None => {
            log::warn!("No texture given; the globe is a checker instead");
            Texture::checker(20.0, Color::new(0.1, 0.2, 0.6).into(), Color::new(0.2, 0.6, 0.2).into())
        }
    };
    let globe = world.add_material(Material::lambertian(globe_texture));
    objects.push(world.sphere(Point3::new(400.0, 200.0, 400.0), 100.0, globe));

    let marble = world.add_material(Material::lambertian(Texture::noise(Perlin::new(rng), 0.1)));
    objects.push(world.sphere(Point3::new(220.0, 280.0, 300.0), 80.0, marble));

    let white = world.add_material(Material::lambertian(Color::new(0.73, 0.73, 0.73)));
    let foam: Vec<PrimitiveId> = (0..1000)
        .map(|_| {
            let center = random_color(rng, 0.0, 165.0);
            world.sphere(center, 10.0, white)
        })
        .collect();
    let foam = world.bvh(&foam, rng);
    let foam = world.rotate_y(foam, 15.0);
    objects.push(world.translate(foam, Vec3::new(-100.0, 270.0, 395.0)));

    let root = world.list(objects);
    let lights = world.list([lamp]);

    Ok(SceneSetup {
        scene: Scene::new(world, root).with_lights(lights),
        camera: Camera::new()
            .with_aspect_ratio(1.0, 400)
            .with_quality(250, 4)
            .with_position(Point3::new(478.0, 278.0, -600.0), Point3::new(278.0, 278.0, 0.0), Vec3::Y)
            .with_lens(40.0, 0.0, 10.0)
            .with_background(Color::ZERO),
    })
}

fn sky_camera(look_from: Point3, look_at: Point3) -> Camera {
    Camera::new()
        .with_aspect_ratio(16.0 / 9.0, 400)
        .with_quality(100, 50)
        .with_position(look_from, look_at, Vec3::Y)
        .with_lens(20.0, 0.0, 10.0)
        .with_background(SKY)
}

fn random_color(rng: &mut StdRng, min: f64, max: f64) -> Color {
    Color::new(rng.gen_range(min..max), rng.gen_range(min..max), rng.gen_range(min..max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_renderer::{render, Interval, Ray, RenderConfig};

    fn settings(scene: SceneKind) -> Settings {
        Settings {
            scene,
            seed: 3,
            ..Settings::default()
        }
    }

    #[test]
    fn test_all_scenes_build() {
        for kind in SceneKind::value_variants() {
            let result = kind.build(&settings(*kind));
            if *kind == SceneKind::Earth {
                assert!(result.is_err());
                continue;
            }
            let setup = result.unwrap();
            assert!(setup.scene.world.primitive_count() > 0, "{kind:?}");
        }
    }

    #[test]
    fn test_cornell_box_layout() {
        let setup = SceneKind::CornellBox.build(&settings(SceneKind::CornellBox)).unwrap();
        let scene = &setup.scene;
        let lights = scene.lights.unwrap();

        // The lamp is visible from the middle of the room, looking up.
        let mut rng = StdRng::seed_from_u64(1);
        let ray = Ray::new(Point3::new(230.0, 300.0, 240.0), Vec3::Y, 0.0);
        let rec = scene.hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng).unwrap();
        assert!((rec.p.y - 554.0).abs() < 1e-6);
        assert!(scene.world.pdf_value(lights, ray.origin(), Vec3::Y) > 0.0);

        let bbox = scene.world.bounding_box(scene.root);
        assert!(bbox.x.min <= 0.0 && bbox.x.max >= 555.0);
    }

    #[test]
    fn test_same_seed_same_layout() {
        let a = SceneKind::RandomSpheres.build(&settings(SceneKind::RandomSpheres)).unwrap();
        let b = SceneKind::RandomSpheres.build(&settings(SceneKind::RandomSpheres)).unwrap();
        assert_eq!(a.scene.world.primitive_count(), b.scene.world.primitive_count());
        assert_eq!(
            a.scene.world.bounding_box(a.scene.root),
            b.scene.world.bounding_box(b.scene.root)
        );
    }

    #[test]
    fn test_configure_camera_keeps_aspect() {
        let camera = Camera::new().with_aspect_ratio(16.0 / 9.0, 400).with_quality(100, 50);
        let overrides = Settings {
            width: Some(160),
            samples_per_pixel: Some(4),
            ..Settings::default()
        };

        let camera = configure_camera(camera, &overrides);
        assert_eq!(camera.image_width, 160);
        assert_eq!(camera.image_height, 90);
        assert_eq!(camera.samples_per_pixel, 4);
        assert_eq!(camera.max_depth, 50);
    }

    #[test]
    fn test_tiny_cornell_render() {
        let setup = SceneKind::CornellBox.build(&settings(SceneKind::CornellBox)).unwrap();
        let overrides = Settings {
            width: Some(8),
            samples_per_pixel: Some(1),
            max_depth: Some(3),
            ..Settings::default()
        };
        let camera = configure_camera(setup.camera, &overrides);

        let image = render(&camera, &setup.scene, &RenderConfig::default());
        assert_eq!((image.width, image.height), (8, 8));
        assert!(image.pixels.iter().all(|c| c.is_finite() && c.min_element() >= 0.0));
    }
}
