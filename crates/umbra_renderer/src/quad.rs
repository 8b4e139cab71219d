//! Planar parallelogram primitive.

use rand::{Rng, RngCore};
use umbra_math::{Aabb, Interval, Point3, Ray, Vec3};

use crate::hittable::{HitRecord, Hittable};
use crate::world::{MaterialId, World};

/// Rays closer than this to parallel with the plane are treated as misses.
const PARALLEL_EPSILON: f64 = 1e-8;

/// Parallelogram spanned by edges `u` and `v` from corner `q`.
#[derive(Debug, Clone)]
pub struct Quad {
    q: Point3,
    u: Vec3,
    v: Vec3,
    /// `n / (n . n)` for projecting hit points onto the edge basis
    w: Vec3,
    normal: Vec3,
    /// Plane offset: `normal . p = d`
    d: f64,
    area: f64,
    material: MaterialId,
    bbox: Aabb,
}

impl Quad {
    pub fn new(q: Point3, u: Vec3, v: Vec3, material: MaterialId) -> Self {
        let n = u.cross(v);
        let normal = n.normalize();
        let d = normal.dot(q);
        let w = n / n.dot(n);
        let area = n.length();

        // Both diagonals, so the box covers any parallelogram.
        let bbox_diagonal1 = Aabb::from_points(q, q + u + v);
        let bbox_diagonal2 = Aabb::from_points(q + u, q + v);

        Self {
            q,
            u,
            v,
            w,
            normal,
            d,
            area,
            material,
            bbox: Aabb::surrounding(&bbox_diagonal1, &bbox_diagonal2),
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    /// Ray/plane intersection followed by the interior test in `(alpha, beta)`.
    pub fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let denom = self.normal.dot(ray.direction());

        // No hit if the ray is parallel to the plane.
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = (self.d - self.normal.dot(ray.origin())) / denom;
        if !ray_t.contains(t) {
            return None;
        }

        let planar_hitpt = ray.at(t) - self.q;
        let alpha = self.w.dot(planar_hitpt.cross(self.v));
        let beta = self.w.dot(self.u.cross(planar_hitpt));

        let unit = Interval::new(0.0, 1.0);
        if !unit.contains(alpha) || !unit.contains(beta) {
            return None;
        }

        Some(HitRecord::new(ray, t, self.normal, self.material, (alpha, beta)))
    }
}

impl Hittable for Quad {
    fn hit(&self, _world: &World, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Option<HitRecord> {
        self.intersect(ray, ray_t)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// `distance^2 / (cosine * area)`, the solid-angle density of a uniform
    /// point on the quad.
    fn pdf_value(&self, _world: &World, origin: Point3, direction: Vec3) -> f64 {
        let probe = Ray::new(origin, direction, 0.0);
        let Some(rec) = self.intersect(&probe, Interval::new(0.001, f64::INFINITY)) else {
            return 0.0;
        };

        let distance_squared = rec.t * rec.t * direction.length_squared();
        let cosine = (direction.dot(rec.normal) / direction.length()).abs();

        distance_squared / (cosine * self.area)
    }

    fn random(&self, _world: &World, origin: Point3, rng: &mut dyn RngCore) -> Vec3 {
        let p = self.q + rng.gen::<f64>() * self.u + rng.gen::<f64>() * self.v;
        p - origin
    }
}
