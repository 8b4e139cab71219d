//! Hittable trait, HitRecord, and the closed set of scene primitives.

use rand::{Rng, RngCore};
use umbra_math::{Aabb, Interval, Point3, Ray, Vec3};

use crate::bvh::Bvh;
use crate::medium::ConstantMedium;
use crate::quad::Quad;
use crate::sphere::Sphere;
use crate::transform::{RotateY, Translate};
use crate::world::{MaterialId, PrimitiveId, World};

/// Record of a ray-object intersection.
#[derive(Debug, Clone, Copy)]
pub struct HitRecord {
    /// Point of intersection
    pub p: Point3,
    /// Surface normal at intersection (always points against ray)
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: MaterialId,
    /// UV texture coordinates
    pub u: f64,
    pub v: f64,
    /// Parameter t where the intersection occurs
    pub t: f64,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
}

impl HitRecord {
    /// Build a record at parameter `t`, orienting `outward_normal` against the ray.
    pub fn new(ray: &Ray, t: f64, outward_normal: Vec3, material: MaterialId, (u, v): (f64, f64)) -> Self {
        let mut rec = Self {
            p: ray.at(t),
            normal: outward_normal,
            material,
            u,
            v,
            t,
            front_face: true,
        };
        rec.set_face_normal(ray, outward_normal);
        rec
    }

    /// Set the face normal based on ray direction and outward normal.
    ///
    /// `outward_normal` is assumed to have unit length.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        // If the ray and normal point in the same direction, we're inside
        self.front_face = ray.direction().dot(outward_normal) < 0.0;

        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Intersection and light-sampling contract shared by every primitive.
///
/// Wrappers and aggregates refer to their children by [`PrimitiveId`], so
/// every query receives the [`World`] that owns them.
pub trait Hittable: Send + Sync {
    /// Nearest intersection with `t` inside `ray_t`, if any.
    ///
    /// `rng` is the calling worker's generator; only volumes draw from it.
    fn hit(&self, world: &World, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord>;

    /// Box containing the object for every ray time in `[0, 1]`.
    fn bounding_box(&self) -> Aabb;

    /// Solid-angle density of sampling `direction` from `origin` toward this object.
    fn pdf_value(&self, _world: &World, _origin: Point3, _direction: Vec3) -> f64 {
        0.0
    }

    /// Direction from `origin` toward a random point on this object.
    fn random(&self, _world: &World, _origin: Point3, _rng: &mut dyn RngCore) -> Vec3 {
        Vec3::X
    }
}

/// A flat, unordered collection of primitives.
#[derive(Debug, Clone, Default)]
pub struct HittableList {
    objects: Vec<PrimitiveId>,
    bbox: Aabb,
}

impl HittableList {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            bbox: Aabb::EMPTY,
        }
    }

    /// Collect existing primitives of `world` into a list.
    pub fn from_objects(world: &World, objects: impl IntoIterator<Item = PrimitiveId>) -> Self {
        let mut list = Self::new();
        for id in objects {
            list.add(id, world.bounding_box(id));
        }
        list
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: PrimitiveId, bbox: Aabb) {
        self.bbox = Aabb::surrounding(&self.bbox, &bbox);
        self.objects.push(object);
    }

    pub fn objects(&self) -> &[PrimitiveId] {
        &self.objects
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Hittable for HittableList {
    fn hit(&self, world: &World, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord> {
        let mut closest: Option<HitRecord> = None;
        let mut closest_so_far = ray_t.max;

        for &object in &self.objects {
            let interval = Interval::new(ray_t.min, closest_so_far);
            if let Some(rec) = world.hit(object, ray, interval, rng) {
                closest_so_far = rec.t;
                closest = Some(rec);
            }
        }

        closest
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// Average density over the members, matching `random`'s uniform pick.
    fn pdf_value(&self, world: &World, origin: Point3, direction: Vec3) -> f64 {
        if self.objects.is_empty() {
            return 0.0;
        }

        let weight = 1.0 / self.objects.len() as f64;
        self.objects
            .iter()
            .map(|&object| weight * world.pdf_value(object, origin, direction))
            .sum()
    }

    fn random(&self, world: &World, origin: Point3, rng: &mut dyn RngCore) -> Vec3 {
        if self.objects.is_empty() {
            return Vec3::X;
        }

        let index = rng.gen_range(0..self.objects.len());
        world.random(self.objects[index], origin, rng)
    }
}

/// Every kind of object a [`World`] can hold.
#[derive(Debug, Clone)]
pub enum Primitive {
    Sphere(Sphere),
    Quad(Quad),
    List(HittableList),
    Bvh(Bvh),
    ConstantMedium(ConstantMedium),
    Translate(Translate),
    RotateY(RotateY),
}

macro_rules! dispatch {
    ($self:ident, $inner:ident => $body:expr) => {
        match $self {
            Primitive::Sphere($inner) => $body,
            Primitive::Quad($inner) => $body,
            Primitive::List($inner) => $body,
            Primitive::Bvh($inner) => $body,
            Primitive::ConstantMedium($inner) => $body,
            Primitive::Translate($inner) => $body,
            Primitive::RotateY($inner) => $body,
        }
    };
}

impl Hittable for Primitive {
    fn hit(&self, world: &World, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord> {
        dispatch!(self, p => p.hit(world, ray, ray_t, rng))
    }

    fn bounding_box(&self) -> Aabb {
        dispatch!(self, p => p.bounding_box())
    }

    fn pdf_value(&self, world: &World, origin: Point3, direction: Vec3) -> f64 {
        dispatch!(self, p => p.pdf_value(world, origin, direction))
    }

    fn random(&self, world: &World, origin: Point3, rng: &mut dyn RngCore) -> Vec3 {
        dispatch!(self, p => p.random(world, origin, rng))
    }
}

macro_rules! impl_from_primitive {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Primitive {
                fn from(p: $ty) -> Self {
                    Primitive::$variant(p)
                }
            }
        )*
    };
}

impl_from_primitive!(
    Sphere(Sphere),
    Quad(Quad),
    List(HittableList),
    Bvh(Bvh),
    ConstantMedium(ConstantMedium),
    Translate(Translate),
    RotateY(RotateY),
);
