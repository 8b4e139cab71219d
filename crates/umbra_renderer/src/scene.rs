//! A world together with the root it renders and the lights it samples.

use rand::RngCore;
use umbra_math::{Interval, Ray};

use crate::hittable::HitRecord;
use crate::world::{PrimitiveId, World};

#[derive(Debug)]
pub struct Scene {
    pub world: World,
    /// Everything a camera ray can hit.
    pub root: PrimitiveId,
    /// Primitives to importance sample. Each should also be reachable from
    /// `root`, otherwise the light is sampled but never seen.
    pub lights: Option<PrimitiveId>,
}

impl Scene {
    pub fn new(world: World, root: PrimitiveId) -> Self {
        Self {
            world,
            root,
            lights: None,
        }
    }

    pub fn with_lights(mut self, lights: PrimitiveId) -> Self {
        self.lights = Some(lights);
        self
    }

    /// Closest hit against the scene root.
    #[inline]
    pub fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord> {
        self.world.hit(self.root, ray, ray_t, rng)
    }
}
