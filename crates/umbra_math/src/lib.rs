//! Umbra math types.
//!
//! Everything is double precision: vectors are glam's `DVec3`, re-exported
//! under the names the renderer uses for positions, directions and colors.

pub use glam::{dvec3, DMat3, DMat4, DVec2, DVec3};

mod aabb;
mod interval;
mod onb;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use interval::Interval;
pub use onb::Onb;
pub use ray::Ray;
pub use transform::AabbTransform;

/// Position or direction in world space.
pub type Vec3 = DVec3;

/// A point in space. Same representation as [`Vec3`].
pub type Point3 = DVec3;

/// Linear RGB color.
pub type Color = DVec3;
