//! Instancing wrappers that move a primitive without copying it.
//!
//! Both wrappers carry rays into the child's object space, delegate, and
//! bring the hit back out. Light sampling goes through the same mapping so
//! a moved or rotated light can still be importance sampled.

use rand::RngCore;
use umbra_math::{AabbTransform, Aabb, DMat4, Interval, Point3, Ray, Vec3};

use crate::hittable::{HitRecord, Hittable};
use crate::world::{PrimitiveId, World};

/// Offsets a primitive by a fixed vector.
#[derive(Debug, Clone)]
pub struct Translate {
    object: PrimitiveId,
    offset: Vec3,
    bbox: Aabb,
}

impl Translate {
    pub fn new(world: &World, object: PrimitiveId, offset: Vec3) -> Self {
        Self {
            object,
            offset,
            bbox: world.bounding_box(object).translate(offset),
        }
    }
}

impl Hittable for Translate {
    fn hit(&self, world: &World, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord> {
        // Move the ray backwards by the offset
        let offset_ray = Ray::new(ray.origin() - self.offset, ray.direction(), ray.time());

        let mut rec = world.hit(self.object, &offset_ray, ray_t, rng)?;
        rec.p += self.offset;
        Some(rec)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn pdf_value(&self, world: &World, origin: Point3, direction: Vec3) -> f64 {
        world.pdf_value(self.object, origin - self.offset, direction)
    }

    fn random(&self, world: &World, origin: Point3, rng: &mut dyn RngCore) -> Vec3 {
        world.random(self.object, origin - self.offset, rng)
    }
}

/// Rotates a primitive about the world Y axis.
#[derive(Debug, Clone)]
pub struct RotateY {
    object: PrimitiveId,
    to_world: DMat4,
    to_object: DMat4,
    bbox: Aabb,
}

impl RotateY {
    /// `angle` is in degrees, counter-clockwise looking down `-Y`.
    pub fn new(world: &World, object: PrimitiveId, angle: f64) -> Self {
        let radians = angle.to_radians();
        let to_world = DMat4::from_rotation_y(radians);
        let to_object = DMat4::from_rotation_y(-radians);
        let bbox = to_world.transform_aabb(&world.bounding_box(object));

        Self {
            object,
            to_world,
            to_object,
            bbox,
        }
    }
}

impl Hittable for RotateY {
    fn hit(&self, world: &World, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord> {
        let rotated = Ray::new(
            self.to_object.transform_point3(ray.origin()),
            self.to_object.transform_vector3(ray.direction()),
            ray.time(),
        );

        let mut rec = world.hit(self.object, &rotated, ray_t, rng)?;
        rec.p = self.to_world.transform_point3(rec.p);
        rec.normal = self.to_world.transform_vector3(rec.normal);
        Some(rec)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn pdf_value(&self, world: &World, origin: Point3, direction: Vec3) -> f64 {
        world.pdf_value(
            self.object,
            self.to_object.transform_point3(origin),
            self.to_object.transform_vector3(direction),
        )
    }

    fn random(&self, world: &World, origin: Point3, rng: &mut dyn RngCore) -> Vec3 {
        let local = world.random(self.object, self.to_object.transform_point3(origin), rng);
        self.to_world.transform_vector3(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Material;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use umbra_math::Color;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_translate_hit() {
        let mut world = World::new();
        let mat = world.add_material(Material::lambertian(Color::ONE));
        let sphere = world.sphere(Point3::ZERO, 1.0, mat);
        let moved = world.translate(sphere, Vec3::new(10.0, 0.0, 0.0));
        let mut rng = StdRng::seed_from_u64(42);

        let ray = Ray::new(Point3::new(10.0, 0.0, -5.0), Vec3::Z, 0.0);
        let rec = world
            .hit(moved, &ray, Interval::new(0.001, f64::INFINITY), &mut rng)
            .unwrap();
        assert!((rec.t - 4.0).abs() < EPS);
        assert!((rec.p - Point3::new(10.0, 0.0, -1.0)).length() < EPS);
        assert!((rec.normal + Vec3::Z).length() < EPS);

        // Nothing is left at the old position.
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::Z, 0.0);
        assert!(world.hit(moved, &ray, Interval::new(0.001, f64::INFINITY), &mut rng).is_none());

        let bbox = world.bounding_box(moved);
        assert!((bbox.x.min - 9.0).abs() < EPS && (bbox.x.max - 11.0).abs() < EPS);
    }

    #[test]
    fn test_rotate_y_hit_and_normal() {
        let mut world = World::new();
        let mat = world.add_material(Material::lambertian(Color::ONE));
        // Quad facing +Z, spanning x in [0, 2].
        let quad = world.quad(Point3::new(0.0, -1.0, 0.0), Vec3::new(2.0, 0.0, 0.0), Vec3::Y * 2.0, mat);
        // Quarter turn: +X goes to -Z, +Z goes to +X.
        let rotated = world.rotate_y(quad, 90.0);
        let mut rng = StdRng::seed_from_u64(42);

        let ray = Ray::new(Point3::new(5.0, 0.0, -1.0), -Vec3::X, 0.0);
        let rec = world
            .hit(rotated, &ray, Interval::new(0.001, f64::INFINITY), &mut rng)
            .unwrap();

        assert!((rec.t - 5.0).abs() < EPS);
        assert!((rec.p - Point3::new(0.0, 0.0, -1.0)).length() < EPS);
        assert!((rec.normal - Vec3::X).length() < EPS);
        assert!(rec.front_face);
    }

    #[test]
    fn test_rotate_y_bbox_contains_rotated_corners() {
        let mut world = World::new();
        let mat = world.add_material(Material::lambertian(Color::ONE));
        let cube = world.make_box(Point3::ZERO, Point3::new(165.0, 330.0, 165.0), mat);
        let rotated = world.rotate_y(cube, 15.0);

        let bbox = world.bounding_box(rotated);
        let to_world = DMat4::from_rotation_y(15.0_f64.to_radians());
        for corner in world.bounding_box(cube).corners() {
            let p = to_world.transform_point3(corner);
            assert!(bbox.x.contains(p.x) && bbox.y.contains(p.y) && bbox.z.contains(p.z));
        }
        assert!((bbox.y.size() - world.bounding_box(cube).y.size()).abs() < 1e-6);
    }

    #[test]
    fn test_transformed_light_sampling() {
        let mut world = World::new();
        let light = world.add_material(Material::diffuse_light(Color::ONE));
        let quad = world.quad(Point3::new(-1.0, 0.0, -1.0), Vec3::X * 2.0, Vec3::Z * 2.0, light);
        let lifted = world.translate(quad, Vec3::new(0.0, 3.0, 0.0));
        let spun = world.rotate_y(lifted, 30.0);
        let mut rng = StdRng::seed_from_u64(42);

        // Straight up: distance 3, cosine 1, area 4.
        assert!((world.pdf_value(lifted, Point3::ZERO, Vec3::Y) - 9.0 / 4.0).abs() < EPS);
        assert!((world.pdf_value(spun, Point3::ZERO, Vec3::Y) - 9.0 / 4.0).abs() < EPS);

        for _ in 0..200 {
            let d = world.random(spun, Point3::ZERO, &mut rng);
            assert!(world.pdf_value(spun, Point3::ZERO, d) > 0.0);
            let rec = world
                .hit(spun, &Ray::new(Point3::ZERO, d, 0.0), Interval::new(0.001, f64::INFINITY), &mut rng)
                .unwrap();
            assert!((rec.t - 1.0).abs() < 1e-6);
        }
    }
}
