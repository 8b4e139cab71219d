//! Random direction and point generators shared by materials, PDFs,
//! primitives and the camera.

use std::f64::consts::PI;

use rand::{Rng, RngCore};
use rand_distr::{Distribution, UnitBall, UnitDisc, UnitSphere};
use umbra_math::{DVec2, Vec3};

/// Uniformly distributed direction on the unit sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    let v: [f64; 3] = UnitSphere.sample(rng);
    Vec3::from(v)
}

/// Uniformly distributed point inside the unit ball.
pub fn random_in_unit_sphere(rng: &mut dyn RngCore) -> Vec3 {
    let v: [f64; 3] = UnitBall.sample(rng);
    Vec3::from(v)
}

/// Uniformly distributed point inside the unit disk, `z = 0`.
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    let v: [f64; 2] = UnitDisc.sample(rng);
    DVec2::from(v).extend(0.0)
}

/// Cosine-weighted direction in the local frame where `+Z` is the normal.
pub fn random_cosine_direction(rng: &mut dyn RngCore) -> Vec3 {
    let r1: f64 = rng.gen();
    let r2: f64 = rng.gen();

    let phi = 2.0 * PI * r1;
    let x = phi.cos() * r2.sqrt();
    let y = phi.sin() * r2.sqrt();
    let z = (1.0 - r2).sqrt();

    Vec3::new(x, y, z)
}

/// Direction inside the cone subtended by a sphere of `radius` whose center
/// lies `distance_squared` away along local `+Z`.
pub fn random_to_sphere(radius: f64, distance_squared: f64, rng: &mut dyn RngCore) -> Vec3 {
    let r1: f64 = rng.gen();
    let r2: f64 = rng.gen();
    let z = 1.0 + r2 * ((1.0 - radius * radius / distance_squared).sqrt() - 1.0);

    let phi = 2.0 * PI * r1;
    let x = phi.cos() * (1.0 - z * z).sqrt();
    let y = phi.sin() * (1.0 - z * z).sqrt();

    Vec3::new(x, y, z)
}
