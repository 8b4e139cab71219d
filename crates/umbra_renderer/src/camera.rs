//! Camera for ray generation.

use rand::{Rng, RngCore};
use umbra_math::{Color, Point3, Ray, Vec3};

use crate::sampling::random_in_unit_disk;

/// Pinhole or thin-lens camera producing stratified primary rays.
#[derive(Debug, Clone)]
pub struct Camera {
    // Image settings
    pub image_width: u32,
    pub image_height: u32,
    pub samples_per_pixel: u32,
    pub max_depth: u32,

    // Camera positioning
    look_from: Point3,
    look_at: Point3,
    vup: Vec3,

    // Lens settings
    vfov: f64,          // Vertical field of view in degrees
    defocus_angle: f64, // Variation angle of rays through each pixel
    focus_dist: f64,    // Distance from camera to plane of perfect focus

    /// Radiance returned by rays that escape the scene.
    pub background: Color,

    // Cached computed values (set by initialize())
    center: Point3,
    pixel00_loc: Point3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
    sqrt_spp: u32,
    recip_sqrt_spp: f64,
    samples_scale: f64,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self {
            image_width: 100,
            image_height: 100,
            samples_per_pixel: 10,
            max_depth: 10,
            look_from: Point3::ZERO,
            look_at: Point3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            defocus_angle: 0.0,
            focus_dist: 10.0,
            background: Color::ZERO,
            center: Point3::ZERO,
            pixel00_loc: Point3::ZERO,
            pixel_delta_u: Vec3::ZERO,
            pixel_delta_v: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
            defocus_disk_u: Vec3::ZERO,
            defocus_disk_v: Vec3::ZERO,
            sqrt_spp: 1,
            recip_sqrt_spp: 1.0,
            samples_scale: 1.0,
        }
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width.max(1);
        self.image_height = height.max(1);
        self
    }

    /// Set the width and derive the height from an aspect ratio (width / height).
    pub fn with_aspect_ratio(mut self, aspect_ratio: f64, width: u32) -> Self {
        self.image_width = width.max(1);
        self.image_height = ((self.image_width as f64 / aspect_ratio) as u32).max(1);
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples: u32, max_depth: u32) -> Self {
        self.samples_per_pixel = samples;
        self.max_depth = max_depth;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Point3, look_at: Point3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f64, defocus_angle: f64, focus_dist: f64) -> Self {
        self.vfov = vfov;
        self.defocus_angle = defocus_angle;
        self.focus_dist = focus_dist;
        self
    }

    /// Set background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    /// Initialize the camera (must be called before generating rays).
    pub fn initialize(&mut self) {
        self.sqrt_spp = ((self.samples_per_pixel as f64).sqrt() as u32).max(1);
        self.recip_sqrt_spp = 1.0 / self.sqrt_spp as f64;
        self.samples_scale = 1.0 / (self.sqrt_spp * self.sqrt_spp) as f64;

        self.center = self.look_from;

        // Calculate viewport dimensions
        let theta = self.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * self.focus_dist;
        let viewport_width = viewport_height * (self.image_width as f64 / self.image_height as f64);

        // Calculate camera basis vectors
        self.w = (self.look_from - self.look_at).normalize();
        self.u = self.vup.cross(self.w).normalize();
        self.v = self.w.cross(self.u);

        // Calculate viewport vectors
        let viewport_u = viewport_width * self.u;
        let viewport_v = -viewport_height * self.v;

        // Calculate pixel delta vectors
        self.pixel_delta_u = viewport_u / self.image_width as f64;
        self.pixel_delta_v = viewport_v / self.image_height as f64;

        // Calculate upper left pixel location
        let viewport_upper_left = self.center - self.focus_dist * self.w - viewport_u / 2.0 - viewport_v / 2.0;

        self.pixel00_loc = viewport_upper_left + 0.5 * (self.pixel_delta_u + self.pixel_delta_v);

        // Calculate defocus disk basis vectors
        let defocus_radius = self.focus_dist * (self.defocus_angle / 2.0).to_radians().tan();
        self.defocus_disk_u = self.u * defocus_radius;
        self.defocus_disk_v = self.v * defocus_radius;

        log::debug!(
            "Camera: {}x{}, {} strata per axis, vfov {}",
            self.image_width,
            self.image_height,
            self.sqrt_spp,
            self.vfov
        );
    }

    /// Generate a ray for pixel (i, j), jittered inside stratum (s_i, s_j).
    pub fn get_ray(&self, i: u32, j: u32, s_i: u32, s_j: u32, rng: &mut dyn RngCore) -> Ray {
        let offset = self.sample_square_stratified(s_i, s_j, rng);

        let pixel_sample = self.pixel00_loc
            + (i as f64 + offset.x) * self.pixel_delta_u
            + (j as f64 + offset.y) * self.pixel_delta_v;

        let ray_origin = if self.defocus_angle <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };

        let ray_direction = pixel_sample - ray_origin;
        let ray_time = rng.gen::<f64>();

        Ray::new(ray_origin, ray_direction, ray_time)
    }

    /// Random point in the `[-0.5, 0.5]` square, restricted to one stratum.
    fn sample_square_stratified(&self, s_i: u32, s_j: u32, rng: &mut dyn RngCore) -> Vec3 {
        let px = ((s_i as f64 + rng.gen::<f64>()) * self.recip_sqrt_spp) - 0.5;
        let py = ((s_j as f64 + rng.gen::<f64>()) * self.recip_sqrt_spp) - 0.5;
        Vec3::new(px, py, 0.0)
    }

    /// Sample a point on the defocus disk.
    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Point3 {
        let p = random_in_unit_disk(rng);
        self.center + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
    }

    /// Strata per axis; each pixel takes `sqrt_spp()²` samples.
    pub fn sqrt_spp(&self) -> u32 {
        self.sqrt_spp
    }

    /// Weight of a single sample in the pixel average.
    pub fn samples_scale(&self) -> f64 {
        self.samples_scale
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_camera_initialize() {
        let mut camera = Camera::new()
            .with_resolution(800, 600)
            .with_position(Point3::ZERO, Point3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 0.0, 1.0);

        camera.initialize();

        assert_eq!(camera.center, Point3::ZERO);
        assert!((camera.w - Vec3::Z).length() < 1e-12);
        assert!((camera.u - Vec3::X).length() < 1e-12);
        assert!((camera.v - Vec3::Y).length() < 1e-12);
    }

    #[test]
    fn test_aspect_ratio() {
        let camera = Camera::new().with_aspect_ratio(16.0 / 9.0, 400);
        assert_eq!(camera.image_width, 400);
        assert_eq!(camera.image_height, 225);

        // Never collapses to zero rows.
        let camera = Camera::new().with_aspect_ratio(1000.0, 10);
        assert_eq!(camera.image_height, 1);
    }

    #[test]
    fn test_stratification_grid() {
        for (spp, sqrt_spp) in [(0, 1), (1, 1), (3, 1), (4, 2), (10, 3), (100, 10)] {
            let mut camera = Camera::new().with_quality(spp, 5);
            camera.initialize();
            assert_eq!(camera.sqrt_spp(), sqrt_spp, "spp = {spp}");
            assert!((camera.samples_scale() - 1.0 / (sqrt_spp * sqrt_spp) as f64).abs() < 1e-15);
        }
    }

    #[test]
    fn test_center_ray_direction() {
        let mut camera = Camera::new()
            .with_resolution(101, 101)
            .with_position(Point3::ZERO, Point3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 0.0, 1.0);
        camera.initialize();

        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let ray = camera.get_ray(50, 50, 0, 0, &mut rng);
            assert_eq!(ray.origin(), Point3::ZERO);
            let d = ray.direction().normalize();
            assert!(d.z < -0.999, "direction = {d}");
            assert!((0.0..1.0).contains(&ray.time()));
        }
    }

    #[test]
    fn test_strata_stay_in_their_cell() {
        // 90 degree fov at focus distance 1: a 2x2 viewport, one pixel wide.
        let mut camera = Camera::new()
            .with_resolution(1, 1)
            .with_quality(4, 5)
            .with_position(Point3::ZERO, Point3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 0.0, 1.0);
        camera.initialize();
        assert_eq!(camera.sqrt_spp(), 2);

        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            // s_i = 1 is the right half, s_j = 0 is the top half.
            let d = camera.get_ray(0, 0, 1, 0, &mut rng).direction();
            assert!(d.x >= 0.0 && d.x <= 1.0);
            assert!(d.y >= 0.0 && d.y <= 1.0);
            assert!((d.z + 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_defocus_moves_origin_on_lens() {
        let mut camera = Camera::new()
            .with_resolution(10, 10)
            .with_position(Point3::new(0.0, 0.0, 5.0), Point3::ZERO, Vec3::Y)
            .with_lens(40.0, 10.0, 5.0);
        camera.initialize();

        let radius = 5.0 * (5.0_f64).to_radians().tan();
        let mut rng = StdRng::seed_from_u64(11);
        let mut moved = false;
        for _ in 0..50 {
            let ray = camera.get_ray(5, 5, 0, 0, &mut rng);
            let offset = ray.origin() - Point3::new(0.0, 0.0, 5.0);
            assert!(offset.z.abs() < 1e-12);
            assert!(offset.length() <= radius + 1e-12);
            moved |= offset.length() > 1e-6;
        }
        assert!(moved);
    }
}
