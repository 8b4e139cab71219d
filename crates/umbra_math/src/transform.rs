// Transform utilities for DMat4
//
// glam's DMat4 already provides transform_point3(), transform_vector3() and
// inverse(). This adds the bounding-box transform the BVH needs.

use crate::{Aabb, DMat4, Vec3};

/// Extension trait for transforming bounding boxes.
pub trait AabbTransform {
    /// Transform an axis-aligned bounding box.
    ///
    /// Computes the bounding box of all 8 transformed corners, since a
    /// rotated box is no longer axis aligned.
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;
}

impl AabbTransform for DMat4 {
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        let (result_min, result_max) = aabb.corners().iter().fold(
            (Vec3::splat(f64::INFINITY), Vec3::splat(f64::NEG_INFINITY)),
            |(lo, hi), &corner| {
                let p = self.transform_point3(corner);
                (lo.min(p), hi.max(p))
            },
        );

        Aabb::from_points(result_min, result_max)
    }
}
