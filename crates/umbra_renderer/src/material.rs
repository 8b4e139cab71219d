//! Surface and volume materials.
//!
//! A material answers three questions about a hit: how much light it emits,
//! how it redirects an incoming ray, and the physical density of scattering
//! into a given direction (independent of how that direction was sampled).

use std::f64::consts::PI;

use rand::{Rng, RngCore};
use umbra_core::Texture;
use umbra_math::{Color, Point3, Ray, Vec3};

use crate::hittable::HitRecord;
use crate::pdf::Pdf;
use crate::sampling::random_in_unit_sphere;

/// How a scattered ray continues.
#[derive(Debug, Clone, Copy)]
pub enum Scatter {
    /// Importance sample this density (diffuse surfaces, volumes).
    Sample(Pdf<'static>),
    /// Follow this ray exactly (mirrors, glass).
    Specular(Ray),
}

/// A material's response to an incoming ray.
#[derive(Debug, Clone, Copy)]
pub struct ScatterRecord {
    pub attenuation: Color,
    pub scatter: Scatter,
}

#[derive(Debug, Clone)]
pub enum Material {
    /// Ideal diffuse reflector.
    Lambertian { albedo: Texture },
    /// Mirror reflection blurred by `fuzz` in `[0, 1]`.
    Metal { albedo: Color, fuzz: f64 },
    /// Clear refractive material such as glass or water.
    Dielectric { refraction_index: f64 },
    /// Emitter; lights only its front face and never scatters.
    DiffuseLight { emit: Texture },
    /// Phase function of a participating medium, scattering uniformly.
    Isotropic { albedo: Texture },
}

impl Material {
    pub fn lambertian(albedo: impl Into<Texture>) -> Self {
        Material::Lambertian {
            albedo: albedo.into(),
        }
    }

    /// `fuzz` is clamped to `[0, 1]`.
    pub fn metal(albedo: Color, fuzz: f64) -> Self {
        Material::Metal {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    /// `refraction_index` is relative to the surrounding medium.
    pub fn dielectric(refraction_index: f64) -> Self {
        Material::Dielectric { refraction_index }
    }

    pub fn diffuse_light(emit: impl Into<Texture>) -> Self {
        Material::DiffuseLight { emit: emit.into() }
    }

    pub fn isotropic(albedo: impl Into<Texture>) -> Self {
        Material::Isotropic {
            albedo: albedo.into(),
        }
    }

    /// Scatter an incoming ray, or `None` if it is absorbed (or this is a light).
    pub fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        match self {
            Material::Lambertian { albedo } => Some(ScatterRecord {
                attenuation: albedo.value(rec.u, rec.v, rec.p),
                scatter: Scatter::Sample(Pdf::cosine(rec.normal)),
            }),

            // Fuzzed reflections that end up below the surface are kept.
            Material::Metal { albedo, fuzz } => {
                let reflected = reflect(ray_in.direction().normalize(), rec.normal);
                let direction = reflected + *fuzz * random_in_unit_sphere(rng);
                Some(ScatterRecord {
                    attenuation: *albedo,
                    scatter: Scatter::Specular(Ray::new(rec.p, direction, ray_in.time())),
                })
            }

            Material::Dielectric { refraction_index } => {
                let ri = if rec.front_face {
                    1.0 / refraction_index
                } else {
                    *refraction_index
                };

                let unit_direction = ray_in.direction().normalize();
                let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
                let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

                // Total internal reflection
                let cannot_refract = ri * sin_theta > 1.0;

                let direction = if cannot_refract || reflectance(cos_theta, ri) > rng.gen::<f64>() {
                    reflect(unit_direction, rec.normal)
                } else {
                    refract(unit_direction, rec.normal, ri)
                };

                Some(ScatterRecord {
                    attenuation: Color::ONE,
                    scatter: Scatter::Specular(Ray::new(rec.p, direction, ray_in.time())),
                })
            }

            Material::DiffuseLight { .. } => None,

            Material::Isotropic { albedo } => Some(ScatterRecord {
                attenuation: albedo.value(rec.u, rec.v, rec.p),
                scatter: Scatter::Sample(Pdf::Sphere),
            }),
        }
    }

    /// Physical density of scattering from `ray_in` into `scattered`.
    pub fn scattering_pdf(&self, _ray_in: &Ray, rec: &HitRecord, scattered: &Ray) -> f64 {
        match self {
            Material::Lambertian { .. } => {
                let cos_theta = rec.normal.dot(scattered.direction().normalize());
                (cos_theta / PI).max(0.0)
            }
            Material::Isotropic { .. } => 1.0 / (4.0 * PI),
            Material::Metal { .. } | Material::Dielectric { .. } | Material::DiffuseLight { .. } => 0.0,
        }
    }

    /// Light emitted at the hit point.
    pub fn emitted(&self, _ray_in: &Ray, rec: &HitRecord, u: f64, v: f64, p: Point3) -> Color {
        match self {
            Material::DiffuseLight { emit } if rec.front_face => emit.value(u, v, p),
            _ => Color::ZERO,
        }
    }
}

/// Reflect `v` about the normal `n`.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract the unit vector `uv` through a surface with normal `n`, where
/// `etai_over_etat` is the ratio of refractive indices.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f64) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

/// Schlick's approximation for reflectance.
#[inline]
pub fn reflectance(cosine: f64, refraction_index: f64) -> f64 {
    let r0 = (1.0 - refraction_index) / (1.0 + refraction_index);
    let r0 = r0 * r0;
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}
