//! Homogeneous participating media (smoke, fog).

use rand::{Rng, RngCore};
use umbra_math::{Aabb, Interval, Ray, Vec3};

use crate::hittable::{HitRecord, Hittable};
use crate::world::{MaterialId, PrimitiveId, World};

/// Gap between the entry hit and the search for the exit hit.
const EXIT_OFFSET: f64 = 0.0001;

/// A volume of constant density bounded by another primitive.
///
/// The boundary must be closed and convex; rays are assumed to enter and
/// leave it once.
#[derive(Debug, Clone)]
pub struct ConstantMedium {
    boundary: PrimitiveId,
    neg_inv_density: f64,
    phase_function: MaterialId,
    bbox: Aabb,
}

impl ConstantMedium {
    pub fn new(world: &World, boundary: PrimitiveId, density: f64, phase_function: MaterialId) -> Self {
        Self {
            boundary,
            neg_inv_density: -1.0 / density,
            phase_function,
            bbox: world.bounding_box(boundary),
        }
    }
}

impl Hittable for ConstantMedium {
    fn hit(&self, world: &World, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord> {
        let entry = world.hit(self.boundary, ray, Interval::UNIVERSE, rng)?;
        let exit = world.hit(
            self.boundary,
            ray,
            Interval::new(entry.t + EXIT_OFFSET, f64::INFINITY),
            rng,
        )?;

        let mut t1 = entry.t.max(ray_t.min);
        let t2 = exit.t.min(ray_t.max);
        if t1 >= t2 {
            return None;
        }
        t1 = t1.max(0.0);

        let ray_length = ray.direction().length();
        let distance_inside_boundary = (t2 - t1) * ray_length;
        let hit_distance = self.neg_inv_density * rng.gen::<f64>().ln();

        if hit_distance > distance_inside_boundary {
            return None;
        }

        let t = t1 + hit_distance / ray_length;

        // Normal and face are arbitrary; the phase function ignores them.
        Some(HitRecord {
            p: ray.at(t),
            normal: Vec3::X,
            material: self.phase_function,
            u: 0.0,
            v: 0.0,
            t,
            front_face: true,
        })
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
