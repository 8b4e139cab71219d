//! Direction-sampling distributions for importance sampling.

use std::f64::consts::PI;

use rand::{Rng, RngCore};
use umbra_math::{Onb, Point3, Vec3};

use crate::sampling::{random_cosine_direction, random_unit_vector};
use crate::world::{PrimitiveId, World};

/// A probability density over directions, with a matching sampler.
///
/// Densities are in solid-angle measure. `'a` ties the primitive-directed
/// and mixture variants to the world and PDFs they borrow.
#[derive(Debug, Clone, Copy)]
pub enum Pdf<'a> {
    /// Uniform over the unit sphere.
    Sphere,
    /// Cosine-weighted about the basis' `w` axis.
    Cosine(Onb),
    /// Toward a primitive of `world`, as seen from `origin`.
    Hittable {
        world: &'a World,
        target: PrimitiveId,
        origin: Point3,
    },
    /// Equal-weight mixture of two densities.
    Mixture([&'a Pdf<'a>; 2]),
}

impl<'a> Pdf<'a> {
    /// Cosine-weighted density about the surface normal `w`.
    pub fn cosine(w: Vec3) -> Self {
        Pdf::Cosine(Onb::from_w(w))
    }

    pub fn hittable(world: &'a World, target: PrimitiveId, origin: Point3) -> Self {
        Pdf::Hittable {
            world,
            target,
            origin,
        }
    }

    pub fn mixture(p0: &'a Pdf<'a>, p1: &'a Pdf<'a>) -> Self {
        Pdf::Mixture([p0, p1])
    }

    /// Density of sampling `direction`.
    pub fn value(&self, direction: Vec3) -> f64 {
        match self {
            Pdf::Sphere => 1.0 / (4.0 * PI),
            Pdf::Cosine(uvw) => {
                let cosine_theta = direction.normalize().dot(uvw.w());
                (cosine_theta / PI).max(0.0)
            }
            Pdf::Hittable {
                world,
                target,
                origin,
            } => world.pdf_value(*target, *origin, direction),
            Pdf::Mixture([p0, p1]) => 0.5 * p0.value(direction) + 0.5 * p1.value(direction),
        }
    }

    /// Draw a direction distributed according to this density.
    pub fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        match self {
            Pdf::Sphere => random_unit_vector(rng),
            Pdf::Cosine(uvw) => uvw.local(random_cosine_direction(rng)),
            Pdf::Hittable {
                world,
                target,
                origin,
            } => world.random(*target, *origin, rng),
            Pdf::Mixture([p0, p1]) => {
                if rng.gen::<f64>() < 0.5 {
                    p0.generate(rng)
                } else {
                    p1.generate(rng)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Material;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use umbra_math::Color;

    #[test]
    fn test_sphere_pdf_is_uniform() {
        let pdf = Pdf::Sphere;
        assert!((pdf.value(Vec3::X) - 1.0 / (4.0 * PI)).abs() < 1e-15);
        assert_eq!(pdf.value(Vec3::new(-3.0, 2.0, 1.0)), pdf.value(Vec3::Y));
    }

    #[test]
    fn test_cosine_pdf_values() {
        let pdf = Pdf::cosine(Vec3::Y);
        assert!((pdf.value(Vec3::Y) - 1.0 / PI).abs() < 1e-12);
        assert!((pdf.value(Vec3::Y * 5.0) - 1.0 / PI).abs() < 1e-12);
        assert_eq!(pdf.value(-Vec3::Y), 0.0);
        assert!(pdf.value(Vec3::X).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_pdf_normalizes() {
        // With directions drawn uniformly over the hemisphere, the estimate
        // of the integral of value() is mean(value) * 2π and should be 1.
        let mut rng = StdRng::seed_from_u64(42);
        let normal = Vec3::new(1.0, 2.0, -0.5).normalize();
        let pdf = Pdf::cosine(normal);
        let n = 200_000;

        let mut sum = 0.0;
        for _ in 0..n {
            let mut d = random_unit_vector(&mut rng);
            if d.dot(normal) < 0.0 {
                d = -d;
            }
            sum += pdf.value(d);
        }
        let integral = sum / n as f64 * 2.0 * PI;
        assert!((integral - 1.0).abs() < 0.01, "integral = {integral}");
    }

    #[test]
    fn test_cosine_pdf_self_consistent() {
        // Sampling with generate() and weighting by 1/value() estimates the
        // hemisphere's solid angle: E[1/p] = ∫ 1 dω = 2π.
        let mut rng = StdRng::seed_from_u64(9);
        let pdf = Pdf::cosine(Vec3::Z);
        let n = 200_000;

        let mut accepted = 0usize;
        let mut sum = 0.0;
        for _ in 0..n {
            let d = pdf.generate(&mut rng);
            let p = pdf.value(d);
            assert!(p >= 0.0);
            // The 1/p tail is heavy near the horizon; cut it off.
            if p > 1e-3 {
                sum += 1.0 / p;
                accepted += 1;
            }
        }
        let estimate = sum / n as f64;
        assert!(accepted > n * 99 / 100);
        assert!((estimate - 2.0 * PI).abs() / (2.0 * PI) < 0.05, "estimate = {estimate}");
    }

    #[test]
    fn test_mixture_value_is_average() {
        let cosine = Pdf::cosine(Vec3::Z);
        let sphere = Pdf::Sphere;
        let mixture = Pdf::mixture(&cosine, &sphere);

        for d in [Vec3::Z, Vec3::new(1.0, 0.0, 1.0), -Vec3::Z] {
            let expected = 0.5 * cosine.value(d) + 0.5 * sphere.value(d);
            assert!((mixture.value(d) - expected).abs() < 1e-15);
        }
    }

    #[test]
    fn test_mixture_sampling_distribution() {
        // Components with disjoint support: a light straight above and a
        // cosine lobe about -Z. Half of all draws should land on each.
        let mut world = World::new();
        let light = world.add_material(Material::diffuse_light(Color::ONE));
        let quad = world.quad(Point3::new(-1.0, -1.0, 5.0), Vec3::X * 2.0, Vec3::Y * 2.0, light);

        let toward_light = Pdf::hittable(&world, quad, Point3::ZERO);
        let downward = Pdf::cosine(-Vec3::Z);
        let mixture = Pdf::mixture(&toward_light, &downward);

        let mut rng = StdRng::seed_from_u64(42);
        let n = 100_000;
        let mut up = 0usize;
        let mut up_pdf_sum = 0.0;
        for _ in 0..n {
            let d = mixture.generate(&mut rng);
            if d.z > 0.0 {
                up += 1;
                assert!(toward_light.value(d) > 0.0);
                up_pdf_sum += mixture.value(d) / toward_light.value(d);
            } else {
                assert!(downward.value(d) >= 0.0);
            }
        }

        let fraction = up as f64 / n as f64;
        assert!((fraction - 0.5).abs() < 0.01, "fraction toward light = {fraction}");
        // On the light's support the mixture density is half the light's.
        assert!((up_pdf_sum / up as f64 - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_mixture_of_cones_matches_components() {
        // Mean direction of the mixture is the average of the components'
        // mean directions.
        let a = Pdf::cosine(Vec3::X);
        let b = Pdf::cosine(Vec3::Y);
        let mixture = Pdf::mixture(&a, &b);

        let mut rng = StdRng::seed_from_u64(5);
        let n = 100_000;
        let mean = (0..n).fold(Vec3::ZERO, |acc, _| acc + mixture.generate(&mut rng)) / n as f64;

        // A cosine lobe's mean direction is (2/3) w.
        let expected = 0.5 * (2.0 / 3.0) * (Vec3::X + Vec3::Y);
        assert!((mean - expected).length() < 0.01, "mean = {mean}");
    }

    #[test]
    fn test_hittable_pdf_delegates() {
        let mut world = World::new();
        let light = world.add_material(Material::diffuse_light(Color::ONE));
        let quad = world.quad(Point3::new(-1.0, 3.0, -1.0), Vec3::X * 2.0, Vec3::Z * 2.0, light);
        let pdf = Pdf::hittable(&world, quad, Point3::ZERO);

        assert!((pdf.value(Vec3::Y) - 9.0 / 4.0).abs() < 1e-9);
        assert_eq!(pdf.value(-Vec3::Y), 0.0);

        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            assert!(pdf.value(pdf.generate(&mut rng)) > 0.0);
        }
    }
}
