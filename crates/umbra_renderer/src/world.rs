//! Arena that owns every primitive and material of a scene.
//!
//! Primitives reference each other (a BVH its leaves, a transform its child,
//! a medium its boundary) through [`PrimitiveId`] handles into the same
//! arena, and hit records name their surface through a [`MaterialId`].
//! Once built the arena is only read, so one `World` is shared by all
//! render threads.

use rand::RngCore;
use umbra_core::Texture;
use umbra_math::{Aabb, Interval, Point3, Ray, Vec3};

use crate::hittable::{HitRecord, Hittable, HittableList, Primitive};
use crate::{Bvh, ConstantMedium, Material, Quad, RotateY, Sphere, Translate};

/// Handle to a primitive stored in a [`World`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimitiveId(usize);

/// Handle to a material stored in a [`World`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(usize);

impl PrimitiveId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl MaterialId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct World {
    primitives: Vec<Primitive>,
    materials: Vec<Material>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn add(&mut self, primitive: impl Into<Primitive>) -> PrimitiveId {
        self.primitives.push(primitive.into());
        PrimitiveId(self.primitives.len() - 1)
    }

    /// Panics if `id` was not issued by this world.
    pub fn primitive(&self, id: PrimitiveId) -> &Primitive {
        &self.primitives[id.0]
    }

    /// Panics if `id` was not issued by this world.
    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.0]
    }

    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn hit(&self, id: PrimitiveId, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord> {
        self.primitive(id).hit(self, ray, ray_t, rng)
    }

    pub fn bounding_box(&self, id: PrimitiveId) -> Aabb {
        self.primitive(id).bounding_box()
    }

    pub fn pdf_value(&self, id: PrimitiveId, origin: Point3, direction: Vec3) -> f64 {
        self.primitive(id).pdf_value(self, origin, direction)
    }

    pub fn random(&self, id: PrimitiveId, origin: Point3, rng: &mut dyn RngCore) -> Vec3 {
        self.primitive(id).random(self, origin, rng)
    }

    // Scene-building shortcuts

    pub fn sphere(&mut self, center: Point3, radius: f64, material: MaterialId) -> PrimitiveId {
        self.add(Sphere::new(center, radius, material))
    }

    /// Sphere moving linearly from `center1` at time 0 to `center2` at time 1.
    pub fn moving_sphere(&mut self, center1: Point3, center2: Point3, radius: f64, material: MaterialId) -> PrimitiveId {
        self.add(Sphere::moving(center1, center2, radius, material))
    }

    pub fn quad(&mut self, q: Point3, u: Vec3, v: Vec3, material: MaterialId) -> PrimitiveId {
        self.add(Quad::new(q, u, v, material))
    }

    pub fn list(&mut self, objects: impl IntoIterator<Item = PrimitiveId>) -> PrimitiveId {
        let list = HittableList::from_objects(self, objects);
        self.add(list)
    }

    pub fn bvh(&mut self, objects: &[PrimitiveId], rng: &mut dyn RngCore) -> PrimitiveId {
        let bvh = Bvh::new(self, objects, rng);
        self.add(bvh)
    }

    pub fn translate(&mut self, object: PrimitiveId, offset: Vec3) -> PrimitiveId {
        let translated = Translate::new(self, object, offset);
        self.add(translated)
    }

    /// Rotate `object` about the Y axis by `angle` degrees.
    pub fn rotate_y(&mut self, object: PrimitiveId, angle: f64) -> PrimitiveId {
        let rotated = RotateY::new(self, object, angle);
        self.add(rotated)
    }

    /// Fill `boundary` with a participating medium of the given density.
    pub fn constant_medium(&mut self, boundary: PrimitiveId, density: f64, albedo: impl Into<Texture>) -> PrimitiveId {
        let phase_function = self.add_material(Material::isotropic(albedo));
        let medium = ConstantMedium::new(self, boundary, density, phase_function);
        self.add(medium)
    }

    /// Axis-aligned box with opposite corners `a` and `b`, as a list of six quads.
    pub fn make_box(&mut self, a: Point3, b: Point3, material: MaterialId) -> PrimitiveId {
        let min = a.min(b);
        let max = a.max(b);

        let dx = Vec3::new(max.x - min.x, 0.0, 0.0);
        let dy = Vec3::new(0.0, max.y - min.y, 0.0);
        let dz = Vec3::new(0.0, 0.0, max.z - min.z);

        let sides = [
            self.quad(Point3::new(min.x, min.y, max.z), dx, dy, material), // front
            self.quad(Point3::new(max.x, min.y, max.z), -dz, dy, material), // right
            self.quad(Point3::new(max.x, min.y, min.z), -dx, dy, material), // back
            self.quad(Point3::new(min.x, min.y, min.z), dz, dy, material), // left
            self.quad(Point3::new(min.x, max.y, max.z), dx, -dz, material), // top
            self.quad(Point3::new(min.x, min.y, min.z), dx, dz, material), // bottom
        ];

        self.list(sides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use umbra_math::Color;

    #[test]
    fn test_handles_are_sequential() {
        let mut world = World::new();
        let m0 = world.add_material(Material::lambertian(Color::ONE));
        let m1 = world.add_material(Material::dielectric(1.5));
        assert_eq!((m0.index(), m1.index()), (0, 1));

        let s = world.sphere(Point3::ZERO, 1.0, m0);
        let q = world.quad(Point3::ZERO, Vec3::X, Vec3::Y, m1);
        assert_eq!((s.index(), q.index()), (0, 1));
        assert_eq!(world.primitive_count(), 2);
        assert_eq!(world.material_count(), 2);
    }

    #[test]
    fn test_make_box_bounds_and_hits() {
        let mut world = World::new();
        let mat = world.add_material(Material::lambertian(Color::splat(0.73)));
        let cube = world.make_box(Point3::new(1.0, 2.0, 3.0), Point3::new(-1.0, 0.0, 0.0), mat);

        let bbox = world.bounding_box(cube);
        assert!((bbox.min() - Point3::new(-1.0, 0.0, 0.0)).length() < 1e-3);
        assert!((bbox.max() - Point3::new(1.0, 2.0, 3.0)).length() < 1e-3);

        let mut rng = StdRng::seed_from_u64(42);
        let t = Interval::new(0.001, f64::INFINITY);

        // Enter through the front (z = 3) and the top (y = 2).
        let from_front = Ray::new(Point3::new(0.0, 1.0, 10.0), -Vec3::Z, 0.0);
        let rec = world.hit(cube, &from_front, t, &mut rng).unwrap();
        assert!((rec.t - 7.0).abs() < 1e-9);
        assert!(rec.front_face);
        assert!((rec.normal - Vec3::Z).length() < 1e-9);

        let from_top = Ray::new(Point3::new(0.0, 5.0, 1.5), -Vec3::Y, 0.0);
        let rec = world.hit(cube, &from_top, t, &mut rng).unwrap();
        assert!((rec.t - 3.0).abs() < 1e-9);
        assert!(rec.front_face);
        assert!((rec.normal - Vec3::Y).length() < 1e-9);

        // From inside, the wall is seen from the back.
        let inside = Ray::new(Point3::new(0.0, 1.0, 1.5), Vec3::X, 0.0);
        let rec = world.hit(cube, &inside, t, &mut rng).unwrap();
        assert!((rec.t - 1.0).abs() < 1e-9);
        assert!(!rec.front_face);
        assert!((rec.normal + Vec3::X).length() < 1e-9);
    }

    #[test]
    fn test_constant_medium_adds_phase_material() {
        let mut world = World::new();
        let white = world.add_material(Material::lambertian(Color::ONE));
        let boundary = world.sphere(Point3::ZERO, 1.0, white);
        let fog = world.constant_medium(boundary, 0.5, Color::splat(0.2));

        assert_eq!(world.material_count(), 2);
        assert!(matches!(world.primitive(fog), Primitive::ConstantMedium(_)));
        assert!(matches!(world.material(MaterialId(1)), Material::Isotropic { .. }));
    }
}
