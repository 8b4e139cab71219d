//! Umbra renderer - CPU path tracing
//!
//! A Monte Carlo path tracer for physically-based rendering. Scenes live in a
//! [`World`] arena of primitives and materials; the integrator mixes light
//! sampling with each material's own density.

mod bucket;
mod bvh;
mod camera;
mod hittable;
mod material;
mod medium;
mod output;
mod pdf;
mod quad;
mod renderer;
pub mod sampling;
mod scene;
mod sphere;
mod transform;
mod world;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::{Bvh, BvhChild, BvhNode};
pub use camera::Camera;
pub use hittable::{HitRecord, Hittable, HittableList, Primitive};
pub use material::{reflect, reflectance, refract, Material, Scatter, ScatterRecord};
pub use medium::ConstantMedium;
pub use output::{color_to_rgb8, linear_to_gamma, save_image, save_ppm, write_ppm, OutputError, OutputResult};
pub use pdf::Pdf;
pub use quad::Quad;
pub use renderer::{bucket_seed, ray_color, render, render_pixel, ImageBuffer, RenderConfig};
pub use scene::Scene;
pub use sphere::Sphere;
pub use transform::{RotateY, Translate};
pub use world::{MaterialId, PrimitiveId, World};

/// Re-export common math types from umbra_math
pub use umbra_math::{Aabb, Color, Interval, Point3, Ray, Vec3};
