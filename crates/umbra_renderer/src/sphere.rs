//! Sphere primitive for ray tracing.

use std::f64::consts::PI;

use rand::RngCore;
use umbra_math::{Aabb, Interval, Onb, Point3, Ray, Vec3};

use crate::hittable::{HitRecord, Hittable};
use crate::sampling::{random_to_sphere, random_unit_vector};
use crate::world::{MaterialId, World};

/// A sphere primitive, optionally moving linearly over the shutter interval.
#[derive(Debug, Clone)]
pub struct Sphere {
    /// Center at time 0
    center: Point3,
    /// Displacement of the center between time 0 and time 1
    motion: Vec3,
    radius: f64,
    material: MaterialId,
    bbox: Aabb,
}

impl Sphere {
    /// Create a stationary sphere.
    pub fn new(center: Point3, radius: f64, material: MaterialId) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            motion: Vec3::ZERO,
            radius,
            material,
            bbox,
        }
    }

    /// Create a sphere whose center moves from `center1` (time 0) to `center2` (time 1).
    pub fn moving(center1: Point3, center2: Point3, radius: f64, material: MaterialId) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let box1 = Aabb::from_points(center1 - rvec, center1 + rvec);
        let box2 = Aabb::from_points(center2 - rvec, center2 + rvec);

        Self {
            center: center1,
            motion: center2 - center1,
            radius,
            material,
            bbox: Aabb::surrounding(&box1, &box2),
        }
    }

    /// Center position at `time`.
    pub fn center(&self, time: f64) -> Point3 {
        self.center + time * self.motion
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Analytic ray/sphere intersection.
    pub fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let center = self.center(ray.time());
        let oc = center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let outward_normal = (ray.at(root) - center) / self.radius;
        Some(HitRecord::new(
            ray,
            root,
            outward_normal,
            self.material,
            get_sphere_uv(outward_normal),
        ))
    }
}

/// Get the UV coordinates for a point on the unit sphere.
///
/// `u` is the angle around the Y axis from `-X`, `v` the angle from `-Y`
/// to `+Y`, both normalized to `[0, 1]`.
fn get_sphere_uv(p: Point3) -> (f64, f64) {
    let theta = (-p.y).acos();
    let phi = (-p.z).atan2(p.x) + PI;

    (phi / (2.0 * PI), theta / PI)
}

impl Hittable for Sphere {
    fn hit(&self, _world: &World, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Option<HitRecord> {
        self.intersect(ray, ray_t)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// Density of the cone subtended by the sphere as seen from `origin`.
    ///
    /// Uses the time-0 center. For a moving sphere this is only exact at
    /// time 0; moving light spheres are not sampled correctly. An origin on
    /// or inside the sphere has no cone, so the density is 0.
    fn pdf_value(&self, _world: &World, origin: Point3, direction: Vec3) -> f64 {
        let distance_squared = (self.center - origin).length_squared();
        if distance_squared <= self.radius * self.radius {
            return 0.0;
        }

        let probe = Ray::new(origin, direction, 0.0);
        if self.intersect(&probe, Interval::new(0.001, f64::INFINITY)).is_none() {
            return 0.0;
        }

        let cos_theta_max = (1.0 - self.radius * self.radius / distance_squared).sqrt();
        let solid_angle = 2.0 * PI * (1.0 - cos_theta_max);

        1.0 / solid_angle
    }

    /// Direction toward the time-0 center's subtended cone.
    fn random(&self, _world: &World, origin: Point3, rng: &mut dyn RngCore) -> Vec3 {
        let direction = self.center - origin;
        let distance_squared = direction.length_squared();
        if distance_squared <= self.radius * self.radius {
            return random_unit_vector(rng);
        }
        let uvw = Onb::from_w(direction);
        uvw.local(random_to_sphere(self.radius, distance_squared, rng))
    }
}
