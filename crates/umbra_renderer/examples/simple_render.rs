//! Simple path tracer example.
//!
//! Renders a small Cornell box lit by a ceiling quad and saves it as PPM.

use rand::rngs::StdRng;
use rand::SeedableRng;
use umbra_renderer::{render, save_ppm, Camera, Color, Material, Point3, RenderConfig, Scene, Vec3, World};

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let start = std::time::Instant::now();
    let scene = build_scene();
    log::info!("Scene built in {:?}", start.elapsed());

    let camera = Camera::new()
        .with_resolution(200, 200)
        .with_quality(64, 20)
        .with_position(Point3::new(278.0, 278.0, -800.0), Point3::new(278.0, 278.0, 0.0), Vec3::Y)
        .with_lens(40.0, 0.0, 10.0);

    let start = std::time::Instant::now();
    let image = render(&camera, &scene, &RenderConfig::default());
    log::info!("Rendered in {:?}", start.elapsed());

    let filename = "simple_render.ppm";
    if let Err(err) = save_ppm(&image, filename) {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn build_scene() -> Scene {
    let mut world = World::new();
    let mut rng = StdRng::seed_from_u64(1);

    let red = world.add_material(Material::lambertian(Color::new(0.65, 0.05, 0.05)));
    let white = world.add_material(Material::lambertian(Color::new(0.73, 0.73, 0.73)));
    let green = world.add_material(Material::lambertian(Color::new(0.12, 0.45, 0.15)));
    let light = world.add_material(Material::diffuse_light(Color::splat(15.0)));
    let aluminum = world.add_material(Material::metal(Color::new(0.8, 0.85, 0.88), 0.0));

    let mut objects = vec![
        world.quad(Point3::new(555.0, 0.0, 0.0), Vec3::new(0.0, 555.0, 0.0), Vec3::new(0.0, 0.0, 555.0), green),
        world.quad(Point3::ZERO, Vec3::new(0.0, 555.0, 0.0), Vec3::new(0.0, 0.0, 555.0), red),
        world.quad(Point3::ZERO, Vec3::new(555.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 555.0), white),
        world.quad(
            Point3::new(555.0, 555.0, 555.0),
            Vec3::new(-555.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, -555.0),
            white,
        ),
        world.quad(Point3::new(0.0, 0.0, 555.0), Vec3::new(555.0, 0.0, 0.0), Vec3::new(0.0, 555.0, 0.0), white),
    ];

    let lamp = world.quad(
        Point3::new(343.0, 554.0, 332.0),
        Vec3::new(-130.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -105.0),
        light,
    );
    objects.push(lamp);

    let tall = world.make_box(Point3::ZERO, Point3::new(165.0, 330.0, 165.0), aluminum);
    let tall = world.rotate_y(tall, 15.0);
    objects.push(world.translate(tall, Vec3::new(265.0, 0.0, 295.0)));

    let short = world.make_box(Point3::ZERO, Point3::new(165.0, 165.0, 165.0), white);
    let short = world.rotate_y(short, -18.0);
    objects.push(world.translate(short, Vec3::new(130.0, 0.0, 65.0)));

    let root = world.bvh(&objects, &mut rng);
    let lights = world.list([lamp]);
    Scene::new(world, root).with_lights(lights)
}
