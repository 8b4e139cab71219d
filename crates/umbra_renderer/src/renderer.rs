//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with configurable depth
//! - Light importance sampling mixed 50/50 with the material's density
//! - Stratified anti-aliasing
//! - Parallel bucket rendering

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use umbra_math::{Color, Interval, Ray};

use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::material::Scatter;
use crate::pdf::Pdf;
use crate::{Camera, Scene};

/// Closest parameter accepted for a hit; keeps bounced rays off their own surface.
const SHADOW_EPSILON: f64 = 0.001;

/// Sampling densities below this are treated as zero.
const MIN_PDF: f64 = 1e-12;

/// Render configuration.
///
/// Image settings live on the [`Camera`]; this only controls scheduling.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Edge length of a bucket in pixels
    pub bucket_size: u32,
    /// Base seed; bucket `i` draws from a generator derived from `(seed, i)`
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            bucket_size: DEFAULT_BUCKET_SIZE,
            seed: 0,
        }
    }
}

/// Compute the color seen by a ray.
///
/// This is the core path tracing function. It traces the ray through
/// the scene, bouncing off surfaces and accumulating color.
pub fn ray_color(ray: &Ray, scene: &Scene, depth: u32, background: Color, rng: &mut dyn RngCore) -> Color {
    // If we've exceeded max depth, return black (no light)
    if depth == 0 {
        return Color::ZERO;
    }

    let Some(rec) = scene.hit(ray, Interval::new(SHADOW_EPSILON, f64::INFINITY), rng) else {
        return background;
    };

    let material = scene.world.material(rec.material);
    let emission = material.emitted(ray, &rec, rec.u, rec.v, rec.p);

    let Some(srec) = material.scatter(ray, &rec, rng) else {
        return emission;
    };

    let surface_pdf = match srec.scatter {
        Scatter::Specular(skip_pdf_ray) => {
            return emission + srec.attenuation * ray_color(&skip_pdf_ray, scene, depth - 1, background, rng);
        }
        Scatter::Sample(pdf) => pdf,
    };

    let light_pdf;
    let mixture;
    let pdf = match scene.lights {
        Some(lights) => {
            light_pdf = Pdf::hittable(&scene.world, lights, rec.p);
            mixture = Pdf::mixture(&light_pdf, &surface_pdf);
            &mixture
        }
        None => &surface_pdf,
    };

    let scattered = Ray::new(rec.p, pdf.generate(rng), ray.time());
    let pdf_value = pdf.value(scattered.direction());
    if !pdf_value.is_finite() || pdf_value < MIN_PDF {
        return emission;
    }

    let scattering_pdf = material.scattering_pdf(ray, &rec, &scattered);
    let sample_color = ray_color(&scattered, scene, depth - 1, background, rng);
    let color_from_scatter = (srec.attenuation * scattering_pdf * sample_color) / pdf_value;

    if !color_from_scatter.is_finite() {
        log::trace!("Discarding non-finite sample at {} (pdf {pdf_value})", rec.p);
        return emission;
    }

    emission + color_from_scatter
}

/// Render a single pixel with stratified multi-sampling.
pub fn render_pixel(camera: &Camera, scene: &Scene, x: u32, y: u32, rng: &mut dyn RngCore) -> Color {
    let mut pixel_color = Color::ZERO;
    let sqrt_spp = camera.sqrt_spp();

    for s_j in 0..sqrt_spp {
        for s_i in 0..sqrt_spp {
            let ray = camera.get_ray(x, y, s_i, s_j, rng);
            pixel_color += ray_color(&ray, scene, camera.max_depth, camera.background, rng);
        }
    }

    pixel_color * camera.samples_scale()
}

/// Linear radiance per pixel, row-major from the top-left corner.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width as usize) * (height as usize)],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.offset(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let offset = self.offset(x, y);
        self.pixels[offset] = color;
    }

    /// Copy a rendered bucket into place.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for local_y in 0..bucket.height {
            for local_x in 0..bucket.width {
                let color = result.pixels[(local_y * bucket.width + local_x) as usize];
                self.set(bucket.x + local_x, bucket.y + local_y, color);
            }
        }
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Seed for the generator of bucket `index`.
pub fn bucket_seed(seed: u64, index: usize) -> u64 {
    seed ^ (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Render the entire scene, buckets in parallel.
///
/// Initializes a copy of `camera`, so the caller does not have to. Output
/// depends only on the scene, camera and `config.seed`, not on scheduling.
pub fn render(camera: &Camera, scene: &Scene, config: &RenderConfig) -> ImageBuffer {
    let mut camera = camera.clone();
    camera.initialize();

    let buckets = generate_buckets(camera.image_width, camera.image_height, config.bucket_size);
    let total = buckets.len();
    let done = AtomicUsize::new(0);

    log::info!(
        "Rendering {}x{} at {} spp (depth {}) in {} buckets",
        camera.image_width,
        camera.image_height,
        camera.sqrt_spp() * camera.sqrt_spp(),
        camera.max_depth,
        total
    );

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| {
            let mut rng = StdRng::seed_from_u64(bucket_seed(config.seed, bucket.index));
            let pixels = render_bucket(bucket, &camera, scene, &mut rng);

            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            let step = (total / 10).max(1);
            if finished % step == 0 || finished == total {
                log::info!("Progress: {}/{} buckets ({}%)", finished, total, finished * 100 / total);
            }

            BucketResult::new(*bucket, pixels)
        })
        .collect();

    let mut image = ImageBuffer::new(camera.image_width, camera.image_height);
    for result in &results {
        image.write_bucket(result);
    }

    log::info!("Render complete");
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Material, World};
    use umbra_math::{Point3, Vec3};

    const BACKGROUND: Color = Color::new(0.7, 0.8, 1.0);

    /// A diffuse sphere under a quad light, with the light in the light list.
    fn lit_sphere_scene(albedo: Color) -> Scene {
        let mut world = World::new();
        let diffuse = world.add_material(Material::lambertian(albedo));
        let emitter = world.add_material(Material::diffuse_light(Color::splat(4.0)));

        let sphere = world.sphere(Point3::ZERO, 1.0, diffuse);
        // Facing down onto the sphere.
        let light = world.quad(Point3::new(-1.0, 3.0, 1.0), Vec3::new(0.0, 0.0, -2.0), Vec3::X * 2.0, emitter);
        let root = world.list([sphere, light]);
        let lights = world.list([light]);

        Scene::new(world, root).with_lights(lights)
    }

    #[test]
    fn test_miss_returns_background() {
        let scene = lit_sphere_scene(Color::splat(0.5));
        let mut rng = StdRng::seed_from_u64(42);

        let ray = Ray::new(Point3::new(0.0, 0.0, 10.0), Vec3::Z, 0.0);
        assert_eq!(ray_color(&ray, &scene, 10, BACKGROUND, &mut rng), BACKGROUND);
    }

    #[test]
    fn test_depth_zero_is_black() {
        let scene = lit_sphere_scene(Color::splat(0.5));
        let mut rng = StdRng::seed_from_u64(42);

        let ray = Ray::new(Point3::new(0.0, 0.0, 10.0), Vec3::Z, 0.0);
        assert_eq!(ray_color(&ray, &scene, 0, BACKGROUND, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_light_seen_directly() {
        let scene = lit_sphere_scene(Color::splat(0.5));
        let mut rng = StdRng::seed_from_u64(42);

        // From above the light looking down hits its back face: no emission.
        let ray = Ray::new(Point3::new(0.0, 5.0, 0.0), -Vec3::Y, 0.0);
        assert_eq!(ray_color(&ray, &scene, 10, Color::ZERO, &mut rng), Color::ZERO);

        // From below, the front face.
        let ray = Ray::new(Point3::new(0.0, 2.0, 0.0), Vec3::Y, 0.0);
        assert_eq!(ray_color(&ray, &scene, 10, Color::ZERO, &mut rng), Color::splat(4.0));
    }

    #[test]
    fn test_lit_sphere_is_finite_and_bright() {
        let scene = lit_sphere_scene(Color::splat(0.5));
        let mut rng = StdRng::seed_from_u64(42);

        // Aim at the top of the sphere, which faces the light.
        let ray = Ray::new(Point3::new(0.0, 1.5, 5.0), Vec3::new(0.0, -0.5, -5.0), 0.0);
        let n = 2000;
        let mut sum = Color::ZERO;
        for _ in 0..n {
            let c = ray_color(&ray, &scene, 10, Color::ZERO, &mut rng);
            assert!(c.is_finite());
            assert!(c.min_element() >= 0.0);
            sum += c;
        }
        let mean = sum / n as f64;
        assert!(mean.x > 0.05, "mean = {mean}");
    }

    #[test]
    fn test_black_lambertian_returns_emission_only() {
        let scene = lit_sphere_scene(Color::ZERO);
        let mut rng = StdRng::seed_from_u64(42);

        let ray = Ray::new(Point3::new(0.0, 1.5, 5.0), Vec3::new(0.0, -0.5, -5.0), 0.0);
        for _ in 0..100 {
            assert_eq!(ray_color(&ray, &scene, 10, BACKGROUND, &mut rng), Color::ZERO);
        }
    }

    #[test]
    fn test_without_lights_uses_material_pdf() {
        // An open white sphere under a bright sky, no light list.
        let mut world = World::new();
        let white = world.add_material(Material::lambertian(Color::ONE));
        let sphere = world.sphere(Point3::ZERO, 1.0, white);
        let scene = Scene::new(world, sphere);
        let mut rng = StdRng::seed_from_u64(42);

        // A white convex object under a uniform sky reflects the sky exactly.
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), -Vec3::Z, 0.0);
        for _ in 0..100 {
            let c = ray_color(&ray, &scene, 10, Color::ONE, &mut rng);
            assert!((c - Color::ONE).length() < 1e-9, "color = {c}");
        }
    }

    #[test]
    fn test_mirror_reflects_background() {
        let mut world = World::new();
        let mirror = world.add_material(Material::metal(Color::splat(0.5), 0.0));
        let floor = world.quad(Point3::new(-5.0, 0.0, 5.0), Vec3::X * 10.0, Vec3::new(0.0, 0.0, -10.0), mirror);
        let scene = Scene::new(world, floor);
        let mut rng = StdRng::seed_from_u64(42);

        let ray = Ray::new(Point3::new(0.0, 1.0, 1.0), Vec3::new(0.0, -1.0, -1.0), 0.0);
        let c = ray_color(&ray, &scene, 10, BACKGROUND, &mut rng);
        assert!((c - 0.5 * BACKGROUND).length() < 1e-12);
    }

    #[test]
    fn test_render_pixel_hits_sphere() {
        let scene = lit_sphere_scene(Color::splat(0.5));
        let mut camera = Camera::new()
            .with_resolution(10, 10)
            .with_quality(4, 5)
            .with_position(Point3::new(0.0, 0.0, 5.0), Point3::ZERO, Vec3::Y)
            .with_lens(30.0, 0.0, 5.0)
            .with_background(BACKGROUND);
        camera.initialize();

        let mut rng = StdRng::seed_from_u64(42);
        let color = render_pixel(&camera, &scene, 5, 5, &mut rng);
        assert!(color.is_finite());
        assert_ne!(color, BACKGROUND);
    }

    #[test]
    fn test_render_is_deterministic_per_seed() {
        let scene = lit_sphere_scene(Color::splat(0.5));
        let camera = Camera::new()
            .with_resolution(24, 16)
            .with_quality(4, 4)
            .with_position(Point3::new(0.0, 0.0, 5.0), Point3::ZERO, Vec3::Y)
            .with_lens(40.0, 0.0, 5.0)
            .with_background(BACKGROUND);
        let config = RenderConfig {
            bucket_size: 8,
            seed: 7,
        };

        let a = render(&camera, &scene, &config);
        let b = render(&camera, &scene, &config);
        assert_eq!(a.width, 24);
        assert_eq!(a.height, 16);
        assert_eq!(a.pixels, b.pixels);

        // Corners look past the sphere into the sky.
        assert!((a.get(0, 0) - BACKGROUND).length() < 1e-12);
        assert!(a.pixels.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_bucket_seeds_differ() {
        assert_ne!(bucket_seed(0, 0), bucket_seed(0, 1));
        assert_ne!(bucket_seed(0, 0), 0);
        assert_ne!(bucket_seed(1, 3), bucket_seed(2, 3));
    }
}
